// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The API vocabulary shared between the NPF userland control library
//! and the kernel engine: command numbers, the ioctl argument, the wire
//! representation of a configuration, the counter set, and the constant
//! surface forwarded to embedding scripts.
//!
//! Everything in this crate is a boundary artifact. The numeric values
//! of the flag sets, table types, and address families mirror the
//! engine's kernel header; this crate forwards them, it does not choose
//! them.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unreachable_patterns)]
#![deny(unused_must_use)]

#[macro_use]
extern crate alloc;

pub mod cmd;
pub mod ip;
pub mod nat;
pub mod rule;
pub mod stat;
pub mod table;

pub use cmd::*;
pub use ip::*;
pub use nat::*;
pub use rule::*;
pub use stat::*;
pub use table::*;

/// The overall version of the control API. Anytime a command, wire
/// type, or constant is added, removed, or modified, this number must
/// increment. No semantic meaning is attached to it other than as a
/// means to verify that the userland library and the kernel engine
/// were compiled for the same API. A u64 gives future wiggle room to
/// play bit games if needed.
pub const API_VERSION: u64 = 1;
