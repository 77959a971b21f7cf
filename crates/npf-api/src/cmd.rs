// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The control-device command protocol: command numbers, the `ioctl(2)`
//! argument, wire request bodies, and the engine-reported error type.

use super::API_VERSION;
use crate::nat::NatPolicyDef;
use crate::rule::RprocDef;
use crate::rule::RuleDef;
use crate::table::TableDef;
use alloc::string::String;
use alloc::vec::Vec;
use core::ffi::c_int;
use core::fmt::Debug;
use serde::Deserialize;
use serde::Serialize;

/// The ioctl group claimed by the packet filter control node.
pub const NPF_IOC: u32 = 0x6e706600;
/// Serialized-command transport (load, flush, session transfer).
pub const IOC_NPF_CMD: i32 = NPF_IOC as i32 | 0x01;
/// Fixed-layout counter block read (see [`crate::stat`]).
pub const IOC_NPF_STATS: i32 = NPF_IOC as i32 | 0x02;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(C)]
pub enum NpfCmd {
    /// Atomically replace the active configuration.
    LoadConfig = 1,
    /// Atomically replace the active configuration with an empty one.
    FlushConfig = 2,
    /// Reserved: serialize the live connection-tracking table. No wire
    /// format is defined yet; the userland side refuses the call.
    SessionsSend = 10,
    /// Reserved: load a serialized connection-tracking table.
    SessionsRecv = 11,
}

impl TryFrom<c_int> for NpfCmd {
    type Error = ();

    fn try_from(num: c_int) -> Result<Self, Self::Error> {
        match num {
            1 => Ok(Self::LoadConfig),
            2 => Ok(Self::FlushConfig),
            10 => Ok(Self::SessionsSend),
            11 => Ok(Self::SessionsRecv),
            _ => Err(()),
        }
    }
}

/// Indicates that a command response has been written to the response
/// buffer (`resp_bytes`).
pub const NPF_CMD_RESP_COPY_OUT: u64 = 0x1;

/// The `ioctl(2)` argument passed when sending an [`NpfCmd`].
///
/// `repr(C)` for a stable layout across compilations. This is a generic
/// envelope; the command's actual request/response data is serialized
/// and deserialized by serde into the byte spans it carries.
#[derive(Debug)]
#[repr(C)]
pub struct NpfCmdIoctl {
    pub api_version: u64,
    pub cmd: NpfCmd,
    pub flags: u64,
    // Reserve some additional bytes in case we need them in the
    // future.
    pub reserved1: u64,
    pub req_bytes: *const u8,
    pub req_len: usize,
    pub resp_bytes: *mut u8,
    pub resp_len: usize,
    pub resp_len_actual: usize,
}

impl NpfCmdIoctl {
    /// Did the engine write a response payload for this command?
    ///
    /// On failure, a payload carries a serialized [`NpfError`] with more
    /// context than errno alone. It is only trustworthy when this flag
    /// is set.
    pub fn has_cmd_resp(&self) -> bool {
        (self.flags & NPF_CMD_RESP_COPY_OUT) != 0
    }

    /// Is this the expected API version?
    ///
    /// NOTE: This function is compiled twice: once for the userland
    /// client, again for the kernel engine. As long as [`API_VERSION`]
    /// is bumped when the API changes, this method returns `false`
    /// when user and kernel disagree.
    pub fn check_version(&self) -> bool {
        self.api_version == API_VERSION
    }
}

/// A failure reported by the engine itself, carried back across the
/// ioctl boundary as a serialized payload.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum NpfError {
    BadApiVersion { user: u64, kernel: u64 },
    BadName,
    BadRule(String),
    CopyinReq,
    CopyoutResp,
    DeserCmdErr(String),
    DeserCmdReq(String),

    /// The [`NpfCmdIoctl`] has `req_len == 0` but the specified `cmd`
    /// expects a request body. This can happen either by developer
    /// error or a hand-rolled, negligent/malicious ioctl.
    NoRequestBody,

    RespTooLarge { needed: usize, given: usize },
    SerCmdResp(String),
    System { errno: c_int, msg: String },
    TableIdInUse(u32),
    TableIdOutOfRange(u32),
}

impl NpfError {
    /// Convert to an errno value for the kernel side to return.
    pub fn to_errno(&self) -> c_int {
        match self {
            Self::BadApiVersion { .. } => libc::EPROTO,
            Self::BadName => libc::EINVAL,
            Self::BadRule(_) => libc::EINVAL,
            Self::CopyinReq => libc::EFAULT,
            Self::CopyoutResp => libc::EFAULT,
            Self::DeserCmdErr(_) => libc::ENOMSG,
            Self::DeserCmdReq(_) => libc::ENOMSG,
            Self::NoRequestBody => libc::EINVAL,
            Self::RespTooLarge { .. } => libc::ENOBUFS,
            Self::SerCmdResp(_) => libc::ENOMSG,
            Self::System { errno, .. } => *errno,
            Self::TableIdInUse(_) => libc::EEXIST,
            Self::TableIdOutOfRange(_) => libc::ERANGE,
        }
    }
}

/// A marker trait indicating a success response type that is returned
/// from a command and may be passed across the ioctl/API boundary.
pub trait CmdOk: Debug + Serialize {}

impl CmdOk for () {}

/// Indicates no meaningful response value on success.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NoResp {
    pub unused: u64,
}

impl CmdOk for NoResp {}

/// The entire configuration shipped by a load. The engine applies it
/// atomically: the active configuration is either fully replaced or
/// left untouched.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoadConfigReq {
    /// Root rules in transmission order; nested rules hang off their
    /// parent's `subrules`.
    pub rules: Vec<RuleDef>,
    pub tables: Vec<TableDef>,
    pub rprocs: Vec<RprocDef>,
    pub nat: Vec<NatPolicyDef>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FlushConfigReq {
    pub unused: u64,
}
