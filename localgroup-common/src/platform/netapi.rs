// ABOUTME: implements the group directory over the windows netapi and secur32 calls.
// ABOUTME: converts between rust strings and nul-terminated utf-16 at the ffi boundary.

use std::ffi::c_void;
use std::ptr;

use windows_sys::Win32::Foundation::{GetLastError, ERROR_MORE_DATA};
use windows_sys::Win32::NetworkManagement::NetManagement::{
    NetApiBufferFree, NetLocalGroupAddMembers, NetLocalGroupGetMembers, LOCALGROUP_MEMBERS_INFO_2,
    LOCALGROUP_MEMBERS_INFO_3,
};
use windows_sys::Win32::Security::Authentication::Identity::{GetUserNameExW, NameSamCompatible};
use windows_sys::Win32::Security::{
    SidTypeAlias, SidTypeComputer, SidTypeDeletedAccount, SidTypeDomain, SidTypeGroup,
    SidTypeInvalid, SidTypeLabel, SidTypeLogonSession, SidTypeUser, SidTypeWellKnownGroup,
    SID_NAME_USE,
};
use windows_sys::Win32::System::Diagnostics::Debug::{
    FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS,
};

use crate::directory::{DirectoryError, Enumeration, GroupDirectory};
use crate::principal::{AccountKind, Member, Principal};

const NERR_SUCCESS: u32 = 0;
const MAX_PREFERRED_LENGTH: u32 = u32::MAX;
const MEMBERS_INFO_LEVEL_2: u32 = 2;
const MEMBERS_INFO_LEVEL_3: u32 = 3;
const INITIAL_NAME_CHARS: u32 = 256;

#[derive(Debug, Clone, Copy, Default)]
pub struct NetApiDirectory;

impl GroupDirectory for NetApiDirectory {
    fn current_principal(&self) -> Result<Principal, DirectoryError> {
        let mut size = INITIAL_NAME_CHARS;
        loop {
            let mut buf = vec![0u16; size as usize];
            let ok = unsafe { GetUserNameExW(NameSamCompatible, buf.as_mut_ptr(), &mut size) };
            if ok != 0 {
                buf.truncate(size as usize);
                return Ok(Principal::new(String::from_utf16_lossy(&buf)));
            }

            let code = unsafe { GetLastError() };
            if code == ERROR_MORE_DATA && size as usize > buf.len() {
                continue;
            }
            return Err(os_error("GetUserNameExW", code));
        }
    }

    fn local_group_members(&self, group: &str) -> Result<Enumeration, DirectoryError> {
        let group_w = to_wide(group);
        let mut raw: *mut u8 = ptr::null_mut();
        let mut read = 0u32;
        let mut total = 0u32;

        let status = unsafe {
            NetLocalGroupGetMembers(
                ptr::null(),
                group_w.as_ptr(),
                MEMBERS_INFO_LEVEL_2,
                &mut raw,
                MAX_PREFERRED_LENGTH,
                &mut read,
                &mut total,
                ptr::null_mut(),
            )
        };
        let buffer = NetBuffer(raw);

        if status != NERR_SUCCESS {
            return Err(os_error("NetLocalGroupGetMembers", status));
        }
        if buffer.0.is_null() {
            return Err(DirectoryError::NoGroup(group.to_string()));
        }

        let entries = unsafe {
            std::slice::from_raw_parts(buffer.0 as *const LOCALGROUP_MEMBERS_INFO_2, read as usize)
        };
        let members = entries
            .iter()
            .map(|entry| Member {
                principal: Principal::new(unsafe { from_wide_ptr(entry.lgrmi2_domainandname) }),
                kind: account_kind(entry.lgrmi2_sidusage),
            })
            .collect();

        Ok(Enumeration {
            members,
            total: total as usize,
        })
    }

    fn add_local_group_member(&self, account: &Principal, group: &str) -> Result<(), DirectoryError> {
        let mut account_w = to_wide(account.as_str());
        let group_w = to_wide(group);
        let info = LOCALGROUP_MEMBERS_INFO_3 {
            lgrmi3_domainandname: account_w.as_mut_ptr(),
        };

        let status = unsafe {
            NetLocalGroupAddMembers(
                ptr::null(),
                group_w.as_ptr(),
                MEMBERS_INFO_LEVEL_3,
                (&info as *const LOCALGROUP_MEMBERS_INFO_3).cast(),
                1,
            )
        };

        if status != NERR_SUCCESS {
            return Err(os_error("NetLocalGroupAddMembers", status));
        }
        Ok(())
    }
}

/// Frees a netapi-allocated buffer on drop.
struct NetBuffer(*mut u8);

impl Drop for NetBuffer {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe {
                NetApiBufferFree(self.0 as *const c_void);
            }
        }
    }
}

fn account_kind(usage: SID_NAME_USE) -> AccountKind {
    match usage {
        SidTypeUser => AccountKind::User,
        SidTypeGroup => AccountKind::Group,
        SidTypeDomain => AccountKind::Domain,
        SidTypeAlias => AccountKind::Alias,
        SidTypeWellKnownGroup => AccountKind::WellKnownGroup,
        SidTypeDeletedAccount => AccountKind::DeletedAccount,
        SidTypeInvalid => AccountKind::Invalid,
        SidTypeComputer => AccountKind::Computer,
        SidTypeLabel => AccountKind::Label,
        SidTypeLogonSession => AccountKind::LogonSession,
        _ => AccountKind::Unknown,
    }
}

fn os_error(call: &'static str, code: u32) -> DirectoryError {
    DirectoryError::Os {
        call,
        code,
        message: error_message(code),
    }
}

fn error_message(code: u32) -> String {
    let mut buf = [0u16; 512];
    let len = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            ptr::null(),
            code,
            0,
            buf.as_mut_ptr(),
            buf.len() as u32,
            ptr::null(),
        )
    };
    if len == 0 {
        return format!("FormatMessage failed with error code ({})", unsafe { GetLastError() });
    }
    String::from_utf16_lossy(&buf[..len as usize]).trim_end().to_string()
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

unsafe fn from_wide_ptr(p: *const u16) -> String {
    if p.is_null() {
        return String::new();
    }
    let mut len = 0usize;
    while *p.add(len) != 0 {
        len += 1;
    }
    String::from_utf16_lossy(std::slice::from_raw_parts(p, len))
}
