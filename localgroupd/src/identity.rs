// ABOUTME: reports which account the daemon is running as.
// ABOUTME: a failed lookup is logged and yields an empty principal used only in log lines.

use localgroup_common::{GroupDirectory, Principal};
use tracing::{error, info};

pub fn report<D: GroupDirectory>(directory: &D) -> Principal {
    let identity = match directory.current_principal() {
        Ok(p) => p,
        Err(err) => {
            error!("{err}");
            Principal::default()
        }
    };
    info!("you are {identity}");
    identity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{dispatch_with_writer, CapturedLogs};
    use localgroup_common::memory::InMemoryDirectory;

    #[test]
    fn logs_resolved_identity() {
        let logs = CapturedLogs::default();
        let dir = InMemoryDirectory::new().with_current("HOST\\svc");

        let identity = tracing::dispatcher::with_default(&dispatch_with_writer("info", logs.clone()), || report(&dir));

        assert_eq!(identity.as_str(), "HOST\\svc");
        assert!(logs.contents().contains("you are HOST\\svc"));
    }

    #[test]
    fn lookup_failure_is_not_fatal() {
        let logs = CapturedLogs::default();
        let dir = InMemoryDirectory::new();

        let identity = tracing::dispatcher::with_default(&dispatch_with_writer("info", logs.clone()), || report(&dir));

        assert!(identity.is_empty());
        let out = logs.contents();
        assert!(out.contains("ERROR"));
        assert!(out.contains("GetUserNameExW failed with code (1332)"));
    }
}
