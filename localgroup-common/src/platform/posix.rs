// ABOUTME: implements the group directory over the passwd/group databases and the gpasswd tool.
// ABOUTME: qualifies local accounts with the short host name so names read as HOST\user.

use std::ffi::{CStr, CString};
use std::process::Command;

use crate::directory::{DirectoryError, Enumeration, GroupDirectory};
use crate::principal::{Member, Principal};

const INITIAL_BUFFER_BYTES: usize = 1024;
const MAX_BUFFER_BYTES: usize = 1024 * 1024;
const HOST_NAME_BYTES: usize = 256;

#[derive(Debug, Clone)]
pub struct PosixDirectory {
    gpasswd: String,
}

impl Default for PosixDirectory {
    fn default() -> Self {
        Self {
            gpasswd: "gpasswd".to_string(),
        }
    }
}

impl GroupDirectory for PosixDirectory {
    fn current_principal(&self) -> Result<Principal, DirectoryError> {
        let host = host_name()?;
        let uid = unsafe { libc::geteuid() };

        let mut buf = vec![0 as libc::c_char; INITIAL_BUFFER_BYTES];
        loop {
            let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::passwd = std::ptr::null_mut();
            let rc = unsafe { libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result) };

            if rc == libc::ERANGE && buf.len() < MAX_BUFFER_BYTES {
                buf.resize(buf.len() * 2, 0);
                continue;
            }
            if rc != 0 {
                return Err(errno_error("getpwuid_r", rc));
            }
            if result.is_null() {
                return Err(errno_error("getpwuid_r", libc::ENOENT));
            }

            let name = unsafe { CStr::from_ptr(pwd.pw_name) }.to_string_lossy();
            return Ok(Principal::from_parts(&host, &name));
        }
    }

    // Only supplementary members are listed; accounts whose primary gid is the
    // group do not appear in gr_mem.
    fn local_group_members(&self, group: &str) -> Result<Enumeration, DirectoryError> {
        let host = host_name()?;
        let c_group = CString::new(group)
            .map_err(|_| DirectoryError::Unsupported(format!("group name {group:?} contains a nul byte")))?;

        let mut buf = vec![0 as libc::c_char; INITIAL_BUFFER_BYTES];
        loop {
            let mut grp: libc::group = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::group = std::ptr::null_mut();
            let rc = unsafe {
                libc::getgrnam_r(c_group.as_ptr(), &mut grp, buf.as_mut_ptr(), buf.len(), &mut result)
            };

            if rc == libc::ERANGE && buf.len() < MAX_BUFFER_BYTES {
                buf.resize(buf.len() * 2, 0);
                continue;
            }
            if rc != 0 {
                return Err(errno_error("getgrnam_r", rc));
            }
            if result.is_null() {
                return Err(DirectoryError::NoGroup(group.to_string()));
            }

            let mut members = Vec::new();
            let mut cursor = grp.gr_mem;
            while !cursor.is_null() {
                let entry = unsafe { *cursor };
                if entry.is_null() {
                    break;
                }
                let name = unsafe { CStr::from_ptr(entry) }.to_string_lossy();
                members.push(Member::user(Principal::from_parts(&host, &name)));
                cursor = unsafe { cursor.add(1) };
            }

            return Ok(Enumeration::complete(members));
        }
    }

    fn add_local_group_member(&self, account: &Principal, group: &str) -> Result<(), DirectoryError> {
        let host = host_name()?;
        if let Some(domain) = account.domain() {
            if domain != host {
                return Err(DirectoryError::Unsupported(format!(
                    "{account} is not a local account of {host}"
                )));
            }
        }

        let output = Command::new(&self.gpasswd)
            .arg("-a")
            .arg(account.account_name())
            .arg(group)
            .output()
            .map_err(|err| DirectoryError::Os {
                call: "gpasswd",
                code: err.raw_os_error().map(|c| c as u32).unwrap_or(0),
                message: err.to_string(),
            })?;

        if !output.status.success() {
            return Err(DirectoryError::Os {
                call: "gpasswd",
                code: output.status.code().map(|c| c as u32).unwrap_or(u32::MAX),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

fn host_name() -> Result<String, DirectoryError> {
    let mut buf = vec![0u8; HOST_NAME_BYTES];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        return Err(errno_error("gethostname", err.raw_os_error().unwrap_or(0)));
    }

    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    let full = String::from_utf8_lossy(&buf[..end]);
    let short = full.split('.').next().unwrap_or_default();
    Ok(short.to_string())
}

fn errno_error(call: &'static str, code: i32) -> DirectoryError {
    DirectoryError::Os {
        call,
        code: code as u32,
        message: std::io::Error::from_raw_os_error(code).to_string(),
    }
}
