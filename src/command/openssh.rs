// Copyright takubokudori.
// This source code is licensed under the MIT or Apache-2.0 license.
//! Runs `pvesh` on a remote host through the OpenSSH client.
//!
//! The client must be able to log in without prompting (keys or an agent).
use crate::{
    command::{sh_join, Execute},
    encoding_for_label, exec_cmd,
    types::*,
};
use encoding_rs::Encoding;
use std::process::Command;

#[derive(Clone, Debug)]
pub struct OpenSsh {
    executable_path: String,
    host: String,
    user: Option<String>,
    port: Option<u16>,
    options: Vec<String>,
    encoding: &'static Encoding,
}

impl OpenSsh {
    pub fn new<T: Into<String>>(host: T) -> Self {
        Self {
            executable_path: "ssh".to_string(),
            host: host.into(),
            user: None,
            port: None,
            options: vec!["BatchMode=yes".to_string()],
            encoding: encoding_rs::UTF_8,
        }
    }

    impl_setter!(
        /// Sets the path to ssh.
        executable_path: String
    );
    impl_setter!(host: String);
    impl_setter!(@opt user: String);
    impl_setter!(@opt port: u16);

    /// Adds an `-o` option, e.g., `ConnectTimeout=10`.
    pub fn option<T: Into<String>>(&mut self, option: T) -> &mut Self {
        self.options.push(option.into());
        self
    }

    /// Sets the encoding of the command output, e.g., `utf-8`.
    pub fn encoding(&mut self, label: &str) -> PveResult<&mut Self> {
        self.encoding = encoding_for_label(label)?;
        Ok(self)
    }

    fn destination(&self) -> String {
        match &self.user {
            Some(x) => format!("{}@{}", x, self.host),
            None => self.host.clone(),
        }
    }

    /// Builds the ssh invocation running `args` on the remote host.
    ///
    /// The remote shell sees `args` quoted, so values with spaces stay intact.
    pub fn cmd(&self, args: &[String]) -> PveResult<Command> {
        if args.is_empty() {
            return pveerr!(ErrorKind::InvalidParameter(
                "empty command".to_string()
            ));
        }
        if self.host.is_empty() {
            return pveerr!(ErrorKind::InvalidParameter(
                "host is not specified".to_string()
            ));
        }
        let mut cmd = Command::new(&self.executable_path);
        if let Some(x) = self.port {
            cmd.args(&["-p", &x.to_string()]);
        }
        for x in &self.options {
            cmd.args(&["-o", x]);
        }
        cmd.arg(self.destination());
        cmd.arg("--");
        cmd.arg(sh_join(args));
        Ok(cmd)
    }
}

impl Execute for OpenSsh {
    fn exec(&self, args: &[String]) -> PveResult<(String, String)> {
        exec_cmd(self.encoding, &mut self.cmd(args)?)
    }
}
