// Copyright takubokudori.
// This source code is licensed under the MIT or Apache-2.0 license.
//! # PveCtrl
//! A Proxmox VE controller library
//!
//! Builds resource paths such as `/nodes/pve/qemu/100/config` and sends them
//! to Proxmox either through its shell (`pvesh`) or its REST API.
//!
//! # Supported backends
//!
//! - `local`: runs [`pvesh`](https://pve.proxmox.com/pve-docs/pvesh.1.html) on this host.
//! - `openssh`: runs `pvesh` on a remote host through the `ssh` client.
//! - `https`: calls the [REST API](https://pve.proxmox.com/pve-docs/api-viewer/).
//!
//! # License
//!
//! This software is released under the MIT or Apache-2.0 License, see LICENSE-MIT or LICENSE-APACHE.
#[macro_use]
pub mod types;

#[macro_use]
pub mod params;

pub mod command;
#[cfg(feature = "https")]
pub mod https;
pub mod resource;

#[macro_use]
extern crate log;

pub use crate::{
    params::{ParamValue, Params},
    resource::{Backend, ProxmoxApi, Resource, ResourcePath, Verb},
    types::{ErrorKind, PveError, PveResult, ResourceError, Service},
};
use crate::types::Repr;
#[cfg(any(feature = "local", feature = "openssh"))]
use encoding_rs::Encoding;
#[cfg(any(feature = "local", feature = "openssh"))]
use log::Level;
use serde::Deserialize;
#[cfg(any(feature = "local", feature = "openssh"))]
use std::{borrow::Cow, process::Command};

pub(crate) fn deserialize<'a, T: Deserialize<'a>>(s: &'a str) -> PveResult<T> {
    serde_json::from_str(s)
        .map_err(|x| pveerr!(@r ErrorKind::UnexpectedResponse(x.to_string())))
}

/// Decodes command output. Invalid sequences are replaced.
#[cfg(any(feature = "local", feature = "openssh"))]
pub(crate) fn decode(encoding: &'static Encoding, b: &[u8]) -> String {
    match encoding.decode(b).0 {
        Cow::Owned(s) => s,
        Cow::Borrowed(s) => s.to_string(),
    }
}

/// Looks up an encoding such as `utf-8` or `shift_jis`.
#[cfg(any(feature = "local", feature = "openssh"))]
pub(crate) fn encoding_for_label(label: &str) -> PveResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        pveerr!(@r ErrorKind::InvalidParameter(format!(
            "Unknown encoding: {}",
            label
        )))
    })
}

/// Executes `cmd` and Returns `(stdout, stderr)`.
#[cfg(any(feature = "local", feature = "openssh"))]
pub(crate) fn exec_cmd(
    encoding: &'static Encoding,
    cmd: &mut Command,
) -> PveResult<(String, String)> {
    dbg_cmd(cmd);
    match cmd.output() {
        Ok(o) => Ok((decode(encoding, &o.stdout), decode(encoding, &o.stderr))),
        Err(x) => pveerr!(ErrorKind::ExecutionFailed(format!(
            "{}: {}",
            cmd.get_program().to_string_lossy(),
            x
        ))),
    }
}

#[cfg(any(feature = "local", feature = "openssh"))]
pub(crate) fn dbg_cmd(cmd: &Command) {
    if log_enabled!(Level::Debug) {
        let mut s = cmd.get_program().to_string_lossy().into_owned();
        for arg in cmd.get_args() {
            s.push(' ');
            s.push_str(&arg.to_string_lossy());
        }
        debug!("exec: {}", s);
    }
}

#[allow(dead_code)]
pub(crate) fn unknown_err<T: std::fmt::Display>(x: T) -> PveError {
    PveError::from(Repr::Unknown(x.to_string()))
}
