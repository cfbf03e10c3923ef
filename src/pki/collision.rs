use super::certificate::CertificateRecord;

/// Outcome of the duplicate common name check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueDecision {
    Allow,
    /// A live name was found but `force` was set; carries the serial that
    /// collided so it can be logged.
    AllowWithWarning { existing_serial: String },
    Deny { existing_serial: String },
}

/// Decides whether `candidate` may be issued against `inventory`.
///
/// `inventory` must be the authority's complete listing. The comparison is
/// case-sensitive, and every record counts, revoked and expired ones
/// included. The first match settles the decision.
pub fn may_issue(inventory: &[CertificateRecord], candidate: &str, force: bool) -> IssueDecision {
    let Some(existing) = inventory.iter().find(|r| r.common_name() == candidate) else {
        return IssueDecision::Allow;
    };

    let existing_serial = existing.serial().to_string();
    if force {
        IssueDecision::AllowWithWarning { existing_serial }
    } else {
        IssueDecision::Deny { existing_serial }
    }
}
