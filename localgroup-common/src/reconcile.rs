// ABOUTME: decides whether the target account must be added to its group.
// ABOUTME: matches by literal domain-qualified name, with no case folding and no sid lookup.

use crate::principal::{GroupMembership, Target};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Member,
    Missing,
}

pub fn reconcile(target: &Target, membership: &GroupMembership) -> Verdict {
    if membership.contains(&target.account) {
        Verdict::Member
    } else {
        Verdict::Missing
    }
}
