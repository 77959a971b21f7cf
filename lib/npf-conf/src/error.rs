// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors building or submitting a configuration.
///
/// Validation failures abort the current call with no partial mutation.
/// Nothing is retried automatically; device failures surface through
/// the transparent [`npf_ioctl::Error`] wrapper.
#[derive(Debug, Error)]
pub enum Error {
    #[error("interface {0:?} does not exist")]
    InvalidInterface(String),

    #[error("table id {0} exceeds NPF_MAX_TABLE_ID")]
    TableIdOutOfRange(u32),

    #[error("bad name: {0:?}")]
    BadName(String),

    #[error("parent rule does not belong to this configuration")]
    ParentNotFound,

    #[error("rule does not belong to this configuration")]
    RuleNotFound,

    /// The configuration was already destroyed; the handles it owned
    /// are gone.
    #[error("configuration already destroyed")]
    ConfigDestroyed,

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error(transparent)]
    Device(#[from] npf_ioctl::Error),
}
