// ABOUTME: provides an in-process group directory that records every enumeration and add call.
// ABOUTME: lets the daemon and cli exercise reconciliation without touching the host's accounts.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::directory::{DirectoryError, Enumeration, GroupDirectory};
use crate::principal::{Member, Principal};

#[derive(Debug, Default)]
struct State {
    current: Option<Principal>,
    groups: BTreeMap<String, Vec<Member>>,
    hidden_entries: usize,
    enumeration_error: Option<u32>,
    add_error: Option<u32>,
    enumerations: usize,
    additions: Vec<(Principal, String)>,
}

/// Cloneable handle; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<Mutex<State>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current(self, principal: impl Into<Principal>) -> Self {
        self.lock().current = Some(principal.into());
        self
    }

    pub fn with_group(self, group: &str, members: Vec<Member>) -> Self {
        self.lock().groups.insert(group.to_string(), members);
        self
    }

    /// Report `count` extra entries as available but never return them.
    pub fn with_hidden_entries(self, count: usize) -> Self {
        self.lock().hidden_entries = count;
        self
    }

    pub fn fail_enumeration(self, code: u32) -> Self {
        self.lock().enumeration_error = Some(code);
        self
    }

    pub fn fail_additions(self, code: u32) -> Self {
        self.lock().add_error = Some(code);
        self
    }

    pub fn enumerations(&self) -> usize {
        self.lock().enumerations
    }

    pub fn additions(&self) -> Vec<(Principal, String)> {
        self.lock().additions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl GroupDirectory for InMemoryDirectory {
    fn current_principal(&self) -> Result<Principal, DirectoryError> {
        self.lock().current.clone().ok_or(DirectoryError::Os {
            call: "GetUserNameExW",
            code: 1332,
            message: "No mapping between account names and security IDs was done.".to_string(),
        })
    }

    fn local_group_members(&self, group: &str) -> Result<Enumeration, DirectoryError> {
        let mut state = self.lock();
        state.enumerations += 1;

        if let Some(code) = state.enumeration_error {
            return Err(DirectoryError::Os {
                call: "NetLocalGroupGetMembers",
                code,
                message: "simulated enumeration failure".to_string(),
            });
        }

        let members = state
            .groups
            .get(group)
            .cloned()
            .ok_or_else(|| DirectoryError::NoGroup(group.to_string()))?;
        let total = members.len() + state.hidden_entries;
        Ok(Enumeration { members, total })
    }

    fn add_local_group_member(&self, account: &Principal, group: &str) -> Result<(), DirectoryError> {
        let mut state = self.lock();
        state.additions.push((account.clone(), group.to_string()));

        if let Some(code) = state.add_error {
            return Err(DirectoryError::Os {
                call: "NetLocalGroupAddMembers",
                code,
                message: "simulated add failure".to_string(),
            });
        }

        match state.groups.get_mut(group) {
            Some(members) => {
                members.push(Member::user(account.clone()));
                Ok(())
            }
            None => Err(DirectoryError::NoGroup(group.to_string())),
        }
    }
}
