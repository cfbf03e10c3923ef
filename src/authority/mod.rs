pub mod gateway;
pub mod token;
pub mod vault;

pub use gateway::{AuthorityGateway, IssueParams, IssuedCredentials, RawCertificate};
pub use token::VaultToken;
pub use vault::VaultAuthority;
