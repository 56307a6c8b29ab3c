// Copyright takubokudori.
// This source code is licensed under the MIT or Apache-2.0 license.
//! Shell backends.
//!
//! [`CommandBackend`] turns a request into a `pvesh` command line
//!
//! ```text
//! [sudo] pvesh <get|create|set|delete> <path> [-<name> <value>]... --output-format json
//! ```
//!
//! and hands it to an [`Execute`] implementation.
mod shell;

#[cfg(feature = "local")]
pub mod local;
#[cfg(feature = "openssh")]
pub mod openssh;

#[cfg(feature = "local")]
pub use local::*;
#[cfg(feature = "openssh")]
pub use openssh::*;
pub use shell::{sh_join, sh_quote, sh_split};

use crate::{
    params::{ParamValue, Params},
    resource::{Backend, ResourcePath, Verb},
    types::*,
};

/// Runs a command line somewhere.
pub trait Execute: Send + Sync {
    /// Executes `args` (program first) and returns `(stdout, stderr)`.
    fn exec(&self, args: &[String]) -> PveResult<(String, String)>;
}

impl<E: Execute + ?Sized> Execute for std::sync::Arc<E> {
    fn exec(&self, args: &[String]) -> PveResult<(String, String)> {
        (**self).exec(args)
    }
}

/// The guest agent's `exec` takes its argument vector as repeated `-command`.
const COMMAND_PARAM: &str = "command";

/// Flattens `params` into the `(name, value)` pairs sent by every backend.
///
/// Lists repeat their name. A `command` given as one string is split with
/// shell rules into one pair per word, so `"ls -l"` runs `ls` with `-l`
/// whether it goes through `pvesh` or the REST API.
pub fn request_pairs(params: &Params) -> PveResult<Vec<(String, String)>> {
    let mut ret = Vec::with_capacity(params.len());
    for (name, value) in params.iter() {
        let values = match value {
            ParamValue::Str(x) if name == COMMAND_PARAM => {
                let words = sh_split(x)?;
                if words.is_empty() {
                    return pveerr!(ErrorKind::InvalidParameter(format!(
                        "{} is empty",
                        COMMAND_PARAM
                    )));
                }
                words
            }
            x => x.to_strings(),
        };
        ret.extend(values.into_iter().map(|v| (name.to_string(), v)));
    }
    Ok(ret)
}

#[derive(Clone, Debug)]
pub struct CommandBackend<E> {
    executor: E,
    service: Service,
    sudo: bool,
}

impl<E: Execute> CommandBackend<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            service: Service::Pve,
            sudo: false,
        }
    }

    impl_setter!(
        /// Prefixes every command line with `sudo`.
        sudo: bool
    );
    impl_setter!(service: Service);

    pub fn executor(&self) -> &E { &self.executor }

    /// Builds the command line of a request.
    pub fn build_args(
        &self,
        verb: Verb,
        path: &ResourcePath,
        params: &Params,
    ) -> PveResult<Vec<String>> {
        let program = self.service.cli_program().ok_or_else(|| {
            pveerr!(@r ErrorKind::UnsupportedService(format!(
                "{} has no shell",
                self.service
            )))
        })?;
        let mut args = Vec::with_capacity(4 + params.len() * 2);
        if self.sudo {
            args.push("sudo".to_string());
        }
        args.push(program.to_string());
        args.push(verb.cli_word().to_string());
        args.push(path.to_string());
        for (name, value) in request_pairs(params)? {
            args.push(format!("-{}", name));
            args.push(value);
        }
        args.extend(
            self.service
                .cli_additional_options()
                .iter()
                .map(|x| x.to_string()),
        );
        Ok(args)
    }
}

impl<E: Execute> Backend for CommandBackend<E> {
    fn execute(
        &self,
        verb: Verb,
        path: &ResourcePath,
        params: &Params,
    ) -> PveResult<(String, String)> {
        let args = self.build_args(verb, path, params)?;
        self.executor.exec(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unused;

    impl Execute for Unused {
        fn exec(&self, _args: &[String]) -> PveResult<(String, String)> {
            unreachable!()
        }
    }

    fn build(b: &CommandBackend<Unused>, verb: Verb, path: &str, p: &Params) -> String {
        b.build_args(verb, &ResourcePath::from(path), p)
            .unwrap()
            .join(" ")
    }

    #[test]
    fn test_build_args() {
        let mut b = CommandBackend::new(Unused);
        assert_eq!(
            "pvesh get /nodes --output-format json",
            build(&b, Verb::Get, "nodes", &Params::new())
        );
        assert_eq!(
            "pvesh set /nodes/pve/qemu/100/config -onboot False -cores 2 --output-format json",
            build(
                &b,
                Verb::Put,
                "nodes/pve/qemu/100/config",
                &params! { "onboot" => false, "cores" => 2 }
            )
        );
        b.sudo(true);
        assert_eq!(
            "sudo pvesh delete /nodes/pve/qemu/100 --output-format json",
            build(&b, Verb::Delete, "nodes/pve/qemu/100", &Params::new())
        );
        b.sudo(false).service(Service::Pmg);
        assert_eq!(
            "pmgsh create /config/ruledb/rules -name spam",
            build(&b, Verb::Post, "config/ruledb/rules", &params! { "name" => "spam" })
        );
    }

    #[test]
    fn test_command_param() {
        let b = CommandBackend::new(Unused);
        let p = params! {
            "command" => "ls -l '/var/log'",
            "input-data" => "a b",
        };
        assert_eq!(
            vec![
                "pvesh", "create", "/nodes/pve/qemu/100/agent/exec",
                "-command", "ls", "-command", "-l", "-command", "/var/log",
                "-input-data", "a b",
                "--output-format", "json",
            ],
            b.build_args(
                Verb::Post,
                &ResourcePath::from("nodes/pve/qemu/100/agent/exec"),
                &p
            )
            .unwrap()
        );
        let p = params! { "command" => "echo 'oops" };
        assert!(b
            .build_args(Verb::Post, &ResourcePath::from("exec"), &p)
            .is_err());
    }

    #[test]
    fn test_empty_command_param() {
        let b = CommandBackend::new(Unused);
        for x in ["", "  \t "] {
            let e = b
                .build_args(Verb::Post, &ResourcePath::from("exec"), &params! { "command" => x })
                .unwrap_err();
            assert!(matches!(e.kind(), Some(ErrorKind::InvalidParameter(_))), "{:?}", x);
        }
        // An explicitly quoted empty word is kept.
        assert_eq!(
            vec![("command".to_string(), String::new())],
            request_pairs(&params! { "command" => "''" }).unwrap()
        );
    }

    #[test]
    fn test_request_pairs() {
        let p = params! {
            "command" => "cat /etc/hostname",
            "tags" => ["a", "b"],
            "onboot" => true,
        };
        assert_eq!(
            vec![
                ("command", "cat"),
                ("command", "/etc/hostname"),
                ("tags", "a"),
                ("tags", "b"),
                ("onboot", "True"),
            ],
            request_pairs(&p)
                .unwrap()
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_unsupported_service() {
        let mut b = CommandBackend::new(Unused);
        b.service(Service::Pbs);
        let e = b
            .build_args(Verb::Get, &ResourcePath::new(), &Params::new())
            .unwrap_err();
        assert!(matches!(e.kind(), Some(ErrorKind::UnsupportedService(_))));
    }
}
