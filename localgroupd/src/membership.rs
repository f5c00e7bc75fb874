// ABOUTME: reads the target group's user members and adds the target account when it is missing.
// ABOUTME: os failures are logged here and turned into an empty snapshot or a false result.

use localgroup_common::{GroupDirectory, GroupMembership, Principal, Target};
use tracing::{debug, error, info, warn};

pub fn read<D: GroupDirectory>(directory: &D, group: &str) -> GroupMembership {
    let enumeration = match directory.local_group_members(group) {
        Ok(e) => e,
        Err(err) => {
            error!("{err}");
            return GroupMembership::default();
        }
    };

    if enumeration.is_partial() {
        warn!(
            returned = enumeration.members.len(),
            total = enumeration.total,
            "not all entries of group {group} have been enumerated"
        );
    }

    let snapshot = GroupMembership::from_members(enumeration.members);
    debug!(group, users = snapshot.len(), "read group membership");
    snapshot
}

pub fn add<D: GroupDirectory>(directory: &D, identity: &Principal, target: &Target) -> bool {
    match directory.add_local_group_member(&target.account, &target.group) {
        Ok(()) => {
            info!("{identity} account {} added to group {}", target.account, target.group);
            true
        }
        Err(err) => {
            error!("{err}");
            error!("{identity} failed to add account {} to group {}", target.account, target.group);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{dispatch_with_writer, CapturedLogs};
    use localgroup_common::memory::InMemoryDirectory;
    use localgroup_common::{AccountKind, Member};

    #[test]
    fn read_filters_non_user_entries() {
        let dir = InMemoryDirectory::new().with_group(
            "Administrators",
            vec![
                Member::user("CORP\\bob"),
                Member {
                    principal: Principal::new("CORP\\Domain Admins"),
                    kind: AccountKind::Group,
                },
            ],
        );

        let snapshot = read(&dir, "Administrators");
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains(&Principal::new("CORP\\bob")));
    }

    #[test]
    fn read_failure_yields_empty_snapshot_and_error_line() {
        let logs = CapturedLogs::default();
        let dir = InMemoryDirectory::new().fail_enumeration(2220);

        let snapshot = tracing::dispatcher::with_default(&dispatch_with_writer("info", logs.clone()), || {
            read(&dir, "Administrators")
        });

        assert!(snapshot.is_empty());
        assert!(logs.contents().contains("NetLocalGroupGetMembers failed with code (2220)"));
    }

    #[test]
    fn missing_group_yields_empty_snapshot() {
        let logs = CapturedLogs::default();
        let dir = InMemoryDirectory::new();

        let snapshot = tracing::dispatcher::with_default(&dispatch_with_writer("info", logs.clone()), || {
            read(&dir, "Nope")
        });

        assert!(snapshot.is_empty());
        assert!(logs.contents().contains("no group found: Nope"));
    }

    #[test]
    fn partial_enumeration_warns_but_keeps_entries() {
        let logs = CapturedLogs::default();
        let dir = InMemoryDirectory::new()
            .with_group("Administrators", vec![Member::user("CORP\\bob")])
            .with_hidden_entries(2);

        let snapshot = tracing::dispatcher::with_default(&dispatch_with_writer("info", logs.clone()), || {
            read(&dir, "Administrators")
        });

        assert_eq!(snapshot.len(), 1);
        let out = logs.contents();
        assert!(out.contains("WARN"));
        assert!(out.contains("not all entries of group Administrators have been enumerated"));
    }

    #[test]
    fn add_failure_logs_code_and_names() {
        let logs = CapturedLogs::default();
        let dir = InMemoryDirectory::new()
            .with_group("Administrators", vec![Member::user("CORP\\bob")])
            .fail_additions(5);
        let target = Target::new("CORP\\alice", "Administrators");

        let added = tracing::dispatcher::with_default(&dispatch_with_writer("info", logs.clone()), || {
            add(&dir, &Principal::new("HOST\\svc"), &target)
        });

        assert!(!added);
        let out = logs.contents();
        assert!(out.contains("NetLocalGroupAddMembers failed with code (5)"));
        assert!(out.contains("HOST\\svc failed to add account CORP\\alice to group Administrators"));
    }
}
