// Copyright takubokudori.
// This source code is licensed under the MIT or Apache-2.0 license.
//! Runs `pvesh` on this host.
use crate::{command::Execute, encoding_for_label, exec_cmd, types::*};
use encoding_rs::Encoding;
use std::process::Command;

#[derive(Clone, Debug)]
pub struct Local {
    encoding: &'static Encoding,
}

impl Default for Local {
    fn default() -> Self { Self::new() }
}

impl Local {
    pub fn new() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }

    /// Sets the encoding of the command output, e.g., `utf-8`.
    pub fn encoding(&mut self, label: &str) -> PveResult<&mut Self> {
        self.encoding = encoding_for_label(label)?;
        Ok(self)
    }

    pub fn cmd(&self, args: &[String]) -> PveResult<Command> {
        let (program, args) = args.split_first().ok_or_else(|| {
            pveerr!(@r ErrorKind::InvalidParameter("empty command".to_string()))
        })?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd)
    }
}

impl Execute for Local {
    fn exec(&self, args: &[String]) -> PveResult<(String, String)> {
        exec_cmd(self.encoding, &mut self.cmd(args)?)
    }
}
