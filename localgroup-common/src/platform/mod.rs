// ABOUTME: selects the host's group directory implementation at compile time.
// ABOUTME: netapi on windows, passwd/group database plus gpasswd on unix.

#[cfg(windows)]
mod netapi;
#[cfg(unix)]
mod posix;

#[cfg(windows)]
pub use netapi::NetApiDirectory as LocalDirectory;
#[cfg(unix)]
pub use posix::PosixDirectory as LocalDirectory;
