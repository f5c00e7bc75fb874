// ABOUTME: provides one-shot inspection and enforcement of local group membership for operators.
// ABOUTME: applies the same user-only snapshot and literal-name rule as the daemon.

use anyhow::Context;
use localgroup_common::{reconcile, GroupDirectory, GroupMembership, Member, Principal, Target, Verdict};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MembersReport {
    pub group: String,
    pub members: Vec<Member>,
    pub complete: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CheckReport {
    pub account: Principal,
    pub group: String,
    pub member: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnsureAction {
    None,
    Added,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EnsureReport {
    pub account: Principal,
    pub group: String,
    pub action: EnsureAction,
}

pub fn whoami<D: GroupDirectory>(directory: &D) -> anyhow::Result<Principal> {
    directory.current_principal().context("resolve current principal")
}

pub fn members<D: GroupDirectory>(directory: &D, group: &str) -> anyhow::Result<MembersReport> {
    let enumeration = directory
        .local_group_members(group)
        .with_context(|| format!("enumerate members of {group}"))?;
    let complete = !enumeration.is_partial();

    Ok(MembersReport {
        group: group.to_string(),
        members: enumeration.members,
        complete,
    })
}

pub fn check<D: GroupDirectory>(directory: &D, target: &Target) -> anyhow::Result<CheckReport> {
    let member = is_member(directory, target)?;

    Ok(CheckReport {
        account: target.account.clone(),
        group: target.group.clone(),
        member,
    })
}

pub fn ensure<D: GroupDirectory>(directory: &D, target: &Target) -> anyhow::Result<EnsureReport> {
    let action = if is_member(directory, target)? {
        EnsureAction::None
    } else {
        directory
            .add_local_group_member(&target.account, &target.group)
            .with_context(|| format!("add {} to {}", target.account, target.group))?;
        EnsureAction::Added
    };

    Ok(EnsureReport {
        account: target.account.clone(),
        group: target.group.clone(),
        action,
    })
}

fn is_member<D: GroupDirectory>(directory: &D, target: &Target) -> anyhow::Result<bool> {
    let enumeration = directory
        .local_group_members(&target.group)
        .with_context(|| format!("enumerate members of {}", target.group))?;
    let snapshot = GroupMembership::from_members(enumeration.members);
    Ok(reconcile(target, &snapshot) == Verdict::Member)
}

#[cfg(test)]
mod tests {
    use super::*;
    use localgroup_common::memory::InMemoryDirectory;
    use localgroup_common::AccountKind;

    fn admins() -> InMemoryDirectory {
        InMemoryDirectory::new().with_current("HOST\\svc").with_group(
            "Administrators",
            vec![
                Member::user("CORP\\bob"),
                Member {
                    principal: Principal::new("CORP\\alice"),
                    kind: AccountKind::Group,
                },
            ],
        )
    }

    #[test]
    fn whoami_reports_current_principal() {
        assert_eq!(whoami(&admins()).unwrap().as_str(), "HOST\\svc");
    }

    #[test]
    fn whoami_failure_has_context() {
        let err = whoami(&InMemoryDirectory::new()).unwrap_err();
        assert!(format!("{err:#}").contains("resolve current principal"));
    }

    #[test]
    fn members_lists_every_entry_with_kind() {
        let report = members(&admins(), "Administrators").unwrap();
        assert_eq!(report.members.len(), 2);
        assert!(report.complete);

        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["members"][1]["kind"], "group");
    }

    #[test]
    fn members_reports_partial_listing() {
        let dir = admins().with_hidden_entries(1);
        assert!(!members(&dir, "Administrators").unwrap().complete);
    }

    #[test]
    fn check_ignores_non_user_entries_with_same_name() {
        let report = check(&admins(), &Target::new("CORP\\alice", "Administrators")).unwrap();
        assert!(!report.member);
    }

    #[test]
    fn ensure_adds_only_when_missing() {
        let dir = admins();
        let target = Target::new("CORP\\carol", "Administrators");

        let first = ensure(&dir, &target).unwrap();
        let second = ensure(&dir, &target).unwrap();

        assert_eq!(first.action, EnsureAction::Added);
        assert_eq!(second.action, EnsureAction::None);
        assert_eq!(dir.additions().len(), 1);
    }

    #[test]
    fn ensure_surfaces_add_failure() {
        let dir = admins().fail_additions(5);
        let err = ensure(&dir, &Target::new("CORP\\carol", "Administrators")).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("add CORP\\carol to Administrators"));
        assert!(msg.contains("failed with code (5)"));
    }
}
