// ABOUTME: defines the shared principal, membership and directory types used by localgroupd and localgroupctl.
// ABOUTME: keeps the reconciliation rule pure so both binaries make the same membership decision.

mod directory;
mod principal;
mod reconcile;

pub mod platform;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use directory::{DirectoryError, Enumeration, GroupDirectory};
pub use principal::{AccountKind, GroupMembership, Member, Principal, Target};
pub use reconcile::{reconcile, Verdict};
