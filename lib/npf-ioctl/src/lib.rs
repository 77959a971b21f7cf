// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The userland side of the NPF control channel.
//!
//! [`NpfHdl`] owns one open handle to the control node and carries
//! serialized commands across the ioctl boundary. [`stats`] reads the
//! engine's counter block through its own short-lived handle, never
//! through a cached channel.

use npf_api::API_VERSION;
use npf_api::CmdOk;
use npf_api::FlushConfigReq;
use npf_api::IOC_NPF_CMD;
use npf_api::IOC_NPF_STATS;
use npf_api::LoadConfigReq;
use npf_api::NPF_STAT_COUNT;
use npf_api::NoResp;
use npf_api::NpfCmd;
use npf_api::NpfCmdIoctl;
pub use npf_api::NpfError;
use npf_api::StatsSnapshot;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Write;
use std::os::unix::io::AsRawFd;
use thiserror::Error;

/// Errors talking to the packet filter control node.
#[derive(Debug, Error)]
pub enum Error {
    /// The control node could not be opened at all.
    #[error("packet filter device unavailable: {0}")]
    DeviceUnavailable(std::io::Error),

    #[error("ioctl {0:?} failed: {1}")]
    Ioctl(NpfCmd, std::io::Error),

    #[error("stats read failed: {0}")]
    StatsRead(std::io::Error),

    #[error("request serialization failed for command {0:?}: {1}")]
    ReqSer(NpfCmd, postcard::Error),

    #[error("response deserialization failed for command {0:?}: {1}")]
    RespDeser(NpfCmd, postcard::Error),

    /// The engine processed the command and rejected it.
    #[error("command {0:?} failed: {1:?}")]
    Command(NpfCmd, NpfError),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

/// The handle used to carry commands to the packet filter engine.
///
/// There is no implicit close between commands: the handle lives until
/// it is dropped, which its owner ties to configuration lifetime.
#[derive(Debug)]
pub struct NpfHdl {
    device: File,
}

impl NpfHdl {
    pub const NPF_CTL: &'static str = "/dev/npf";

    /// Open a handle to the control node.
    pub fn open() -> Result<Self, Error> {
        Self::open_on(Self::NPF_CTL)
    }

    /// Open a handle to a control node on an arbitrary path.
    ///
    /// Opened read-write: loading a configuration is a write-shaped
    /// operation. The mode the engine actually demands is an ABI fact
    /// to confirm against its header.
    pub fn open_on(path: &str) -> Result<Self, Error> {
        let device = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(Error::DeviceUnavailable)?;
        Ok(NpfHdl { device })
    }

    /// Atomically replace the engine's active configuration.
    ///
    /// Every other consumer of the engine observes either the previous
    /// configuration or `req` in full, never a partial application.
    pub fn load_config(&self, req: &LoadConfigReq) -> Result<NoResp, Error> {
        run_cmd_ioctl(self.device.as_raw_fd(), NpfCmd::LoadConfig, Some(req))
    }

    /// Atomically replace the engine's active configuration with an
    /// empty one. Flushing an already-empty configuration succeeds.
    pub fn flush_config(&self) -> Result<NoResp, Error> {
        let req = FlushConfigReq { unused: 0 };
        run_cmd_ioctl(self.device.as_raw_fd(), NpfCmd::FlushConfig, Some(&req))
    }

    /// Serialize the engine's live connection-tracking table into
    /// `sink`, for warm migration across configuration reloads or host
    /// handoff.
    ///
    /// The wire format is not defined yet; until it is, this refuses
    /// the call rather than writing nothing and claiming success.
    pub fn sessions_send(&self, _sink: &mut dyn Write) -> Result<(), Error> {
        Err(Error::NotImplemented("sessions_send"))
    }

    /// Load a connection-tracking table previously captured by
    /// [`NpfHdl::sessions_send`] as the engine's active state.
    ///
    /// Counterpart stub to `sessions_send`; refuses the call until the
    /// wire format exists.
    pub fn sessions_recv(&self, _source: &mut dyn Read) -> Result<(), Error> {
        Err(Error::NotImplemented("sessions_recv"))
    }
}

/// Read the engine's counter block from the default control node.
///
/// Uses a handle scoped to this one read, independent of any cached
/// configuration channel; it is closed before returning on success and
/// failure alike.
pub fn stats() -> Result<StatsSnapshot, Error> {
    stats_on(NpfHdl::NPF_CTL)
}

/// Read the engine's counter block from a control node on an arbitrary
/// path.
pub fn stats_on(path: &str) -> Result<StatsSnapshot, Error> {
    // Dropping `device` closes the handle on every exit path.
    let device = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(Error::DeviceUnavailable)?;

    let mut block = [0u64; NPF_STAT_COUNT];
    let ret = unsafe {
        ioctl(device.as_raw_fd(), IOC_NPF_STATS as libc::c_int, block.as_mut_ptr())
    };

    if ret == -1 {
        return Err(Error::StatsRead(std::io::Error::last_os_error()));
    }

    Ok(StatsSnapshot::from_block(block))
}

pub fn run_cmd_ioctl<T, R>(
    dev: libc::c_int,
    cmd: NpfCmd,
    req: Option<&R>,
) -> Result<T, Error>
where
    T: CmdOk + DeserializeOwned,
    R: Serialize,
{
    let req_bytes = match req {
        Some(req) => {
            postcard::to_allocvec(req).map_err(|e| Error::ReqSer(cmd, e))?
        }
        None => Vec::new(),
    };

    // Large enough for every defined response, and for the serialized
    // error payload when the command fails.
    const RESP_CAPACITY: usize = 16 * 1024;
    let mut resp_buf = vec![0u8; RESP_CAPACITY];
    let mut rioctl = NpfCmdIoctl {
        api_version: API_VERSION,
        cmd,
        flags: 0,
        reserved1: 0,
        req_bytes: if req_bytes.is_empty() {
            core::ptr::null()
        } else {
            req_bytes.as_ptr()
        },
        req_len: req_bytes.len(),
        resp_bytes: resp_buf.as_mut_ptr(),
        resp_len: resp_buf.len(),
        resp_len_actual: 0,
    };

    let ret = unsafe { ioctl(dev, IOC_NPF_CMD as libc::c_int, &mut rioctl) };

    let len = rioctl.resp_len_actual.min(resp_buf.len());
    let resp = &resp_buf[..len];

    if ret == -1 {
        let os_err = std::io::Error::last_os_error();

        // Anytime a response payload is present it has more context
        // for the error than errno does.
        if rioctl.has_cmd_resp() {
            let cmd_err = postcard::from_bytes(resp).unwrap_or_else(|e| {
                NpfError::DeserCmdErr(e.to_string())
            });
            return Err(Error::Command(cmd, cmd_err));
        }

        return Err(Error::Ioctl(cmd, os_err));
    }

    postcard::from_bytes(resp).map_err(|e| Error::RespDeser(cmd, e))
}

unsafe fn ioctl<T>(
    fd: libc::c_int,
    req: libc::c_int,
    arg: *mut T,
) -> libc::c_int {
    // Most OSes define the request argument to be ulong_t rather than
    // int. Cast that away here so it compiles in both places.
    #[cfg(not(target_os = "illumos"))]
    let req = req as libc::c_ulong;

    unsafe { libc::ioctl(fd, req, arg) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_node_is_unavailable() {
        let err = NpfHdl::open_on("/dev/npf-test-nonesuch").unwrap_err();
        assert!(matches!(err, Error::DeviceUnavailable(_)));
    }

    #[test]
    fn stats_missing_node_is_unavailable() {
        let err = stats_on("/dev/npf-test-nonesuch").unwrap_err();
        assert!(matches!(err, Error::DeviceUnavailable(_)));
    }
}
