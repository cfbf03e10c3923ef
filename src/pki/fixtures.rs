//! rcgen-backed certificate fixtures for unit tests.

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, date_time_ymd};

pub(crate) type Ymd = (i32, u8, u8);

pub(crate) fn pem_for(common_name: &str, not_before: Ymd, not_after: Ymd) -> String {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    self_signed(dn, not_before, not_after)
}

pub(crate) fn pem_without_common_name() -> String {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::OrganizationName, "No Name Inc");
    self_signed(dn, (2020, 1, 1), (2030, 1, 1))
}

fn self_signed(dn: DistinguishedName, not_before: Ymd, not_after: Ymd) -> String {
    let key = KeyPair::generate().unwrap();
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name = dn;
    params.not_before = date_time_ymd(not_before.0, not_before.1, not_before.2);
    params.not_after = date_time_ymd(not_after.0, not_after.1, not_after.2);
    params.self_signed(&key).unwrap().pem()
}
