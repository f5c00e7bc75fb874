// ABOUTME: declares the platform seam for identity lookup, local group enumeration and membership changes.
// ABOUTME: every os failure is reported with the failing call, its numeric code and the resolved message.

use crate::principal::{Member, Principal};

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("{call} failed with code ({code}): {message}")]
    Os {
        call: &'static str,
        code: u32,
        message: String,
    },
    #[error("no group found: {0}")]
    NoGroup(String),
    #[error("{0}")]
    Unsupported(String),
}

/// Raw result of enumerating a local group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumeration {
    pub members: Vec<Member>,
    /// Entry count the os reported as available; larger than `members.len()`
    /// when the listing was cut short.
    pub total: usize,
}

impl Enumeration {
    pub fn complete(members: Vec<Member>) -> Self {
        let total = members.len();
        Self { members, total }
    }

    pub fn is_partial(&self) -> bool {
        self.members.len() != self.total
    }
}

/// Blocking access to the host's account directory.
pub trait GroupDirectory {
    /// Domain-qualified name of the account this process runs as.
    fn current_principal(&self) -> Result<Principal, DirectoryError>;

    fn local_group_members(&self, group: &str) -> Result<Enumeration, DirectoryError>;

    fn add_local_group_member(&self, account: &Principal, group: &str) -> Result<(), DirectoryError>;
}

impl<T: GroupDirectory + ?Sized> GroupDirectory for &T {
    fn current_principal(&self) -> Result<Principal, DirectoryError> {
        (**self).current_principal()
    }

    fn local_group_members(&self, group: &str) -> Result<Enumeration, DirectoryError> {
        (**self).local_group_members(group)
    }

    fn add_local_group_member(&self, account: &Principal, group: &str) -> Result<(), DirectoryError> {
        (**self).add_local_group_member(account, group)
    }
}
