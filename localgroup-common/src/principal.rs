// ABOUTME: models domain-qualified principals, enumerated group members and the daemon target.
// ABOUTME: membership snapshots keep only user accounts, in the order the os returned them.

use std::fmt;

use serde::Serialize;

/// A `DOMAIN\name` account identifier, compared as a literal string.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn from_parts(domain: &str, name: &str) -> Self {
        Self(format!("{domain}\\{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn domain(&self) -> Option<&str> {
        self.0.split_once('\\').map(|(domain, _)| domain)
    }

    /// Account name without its domain; the whole string when unqualified.
    pub fn account_name(&self) -> &str {
        match self.0.split_once('\\') {
            Some((_, name)) => name,
            None => &self.0,
        }
    }

    pub fn is_qualified(&self) -> bool {
        match self.0.split_once('\\') {
            Some((domain, name)) => !domain.is_empty() && !name.is_empty(),
            None => false,
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Principal {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Classification of a group member, following the os sid-use values.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    User,
    Group,
    Domain,
    Alias,
    WellKnownGroup,
    DeletedAccount,
    Invalid,
    Unknown,
    Computer,
    Label,
    LogonSession,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Member {
    pub principal: Principal,
    pub kind: AccountKind,
}

impl Member {
    pub fn user(principal: impl Into<Principal>) -> Self {
        Self {
            principal: principal.into(),
            kind: AccountKind::User,
        }
    }
}

/// User accounts of a local group as observed in a single poll.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct GroupMembership(Vec<Principal>);

impl GroupMembership {
    pub fn from_members<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Member>,
    {
        Self(
            members
                .into_iter()
                .filter(|m| m.kind == AccountKind::User)
                .map(|m| m.principal)
                .collect(),
        )
    }

    pub fn contains(&self, account: &Principal) -> bool {
        self.0.iter().any(|p| p == account)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Principal> {
        self.0.iter()
    }
}

/// The account that must stay in the local group for the lifetime of the daemon.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Target {
    pub account: Principal,
    pub group: String,
}

impl Target {
    pub fn new(account: impl Into<Principal>, group: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            group: group.into(),
        }
    }
}
