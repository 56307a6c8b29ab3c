// Copyright takubokudori.
// This source code is licensed under the MIT or Apache-2.0 license.
//! Error types and the service enumeration shared by all backends.
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub struct PveError {
    repr: Repr,
}

/// `pveerr!(kind)` returns `Err(PveError)`, `pveerr!(@r kind)` returns the bare `PveError`.
#[macro_export]
macro_rules! pveerr {
    (@r $x:expr) => {
        $crate::types::PveError::from($x)
    };
    ($x:expr) => {
        Err($crate::types::PveError::from($x))
    };
}

/// Generates `&mut self` setters.
#[macro_export]
macro_rules! impl_setter {
    ($(#[$m:meta])* @opt $name:ident: String) => {
        $(#[$m])*
        pub fn $name<T: Into<String>>(&mut self, $name: Option<T>) -> &mut Self {
            self.$name = $name.map(Into::into);
            self
        }
    };
    ($(#[$m:meta])* @opt $name:ident: $t:ty) => {
        $(#[$m])*
        pub fn $name(&mut self, $name: Option<$t>) -> &mut Self {
            self.$name = $name;
            self
        }
    };
    ($(#[$m:meta])* $name:ident: String) => {
        $(#[$m])*
        pub fn $name<T: Into<String>>(&mut self, $name: T) -> &mut Self {
            self.$name = $name.into();
            self
        }
    };
    ($(#[$m:meta])* $name:ident: $t:ty) => {
        $(#[$m])*
        pub fn $name(&mut self, $name: $t) -> &mut Self {
            self.$name = $name;
            self
        }
    };
}

impl PveError {
    pub fn kind(&self) -> Option<&ErrorKind> {
        match &self.repr {
            Repr::Simple(x) => Some(x),
            Repr::Unknown(_) => None,
        }
    }

    /// Returns the resource error if the remote side reported a failure.
    pub fn resource_error(&self) -> Option<&ResourceError> {
        match self.kind() {
            Some(ErrorKind::Resource(x)) => Some(x),
            _ => None,
        }
    }

    #[inline]
    pub fn is_resource_error(&self) -> bool { self.resource_error().is_some() }
}

impl std::error::Error for PveError {}

impl fmt::Display for PveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Simple(x) => fmt::Display::fmt(x, f),
            Repr::Unknown(x) => write!(f, "Unknown error: {}", x),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub enum Repr {
    Simple(ErrorKind),
    Unknown(String),
}

#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub enum ErrorKind {
    /// The backend reported a failed request.
    Resource(ResourceError),
    ExecutionFailed(String),
    InvalidParameter(String),
    UnexpectedResponse(String),
    UnsupportedService(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(x) => fmt::Display::fmt(x, f),
            Self::ExecutionFailed(x) => write!(f, "Execution failed: {}", x),
            Self::InvalidParameter(x) => {
                write!(f, "Invalid parameter: {}", x)
            }
            Self::UnexpectedResponse(x) => {
                write!(f, "Unexpected response: {}", x)
            }
            Self::UnsupportedService(x) => {
                write!(f, "Unsupported service: {}", x)
            }
        }
    }
}

/// A request the remote side answered with a non-success status.
#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub struct ResourceError {
    /// Leading three-digit code of the status line, if any.
    pub status_code: Option<u16>,
    /// The last non-blank status line.
    pub reason: String,
    /// The whole status text including extra diagnostic lines.
    pub content: String,
    /// The payload sent along with the failure, if any.
    pub errors: Option<String>,
}

impl ResourceError {
    pub(crate) fn new(status_line: &str, content: &str, stdout: &str) -> Self {
        let status_code = status_line
            .split_whitespace()
            .next()
            .filter(|x| x.len() == 3)
            .and_then(|x| x.parse().ok());
        let errors = stdout.trim();
        Self {
            status_code,
            reason: status_line.to_string(),
            content: content.to_string(),
            errors: if errors.is_empty() {
                None
            } else {
                Some(errors.to_string())
            },
        }
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resource error: {}", self.reason)?;
        if let Some(x) = &self.errors {
            write!(f, " - {}", x)?;
        }
        Ok(())
    }
}

impl From<Repr> for PveError {
    fn from(repr: Repr) -> Self { Self { repr } }
}

impl From<ErrorKind> for PveError {
    fn from(e: ErrorKind) -> Self {
        Self {
            repr: Repr::Simple(e),
        }
    }
}

impl From<ResourceError> for PveError {
    fn from(e: ResourceError) -> Self { Self::from(ErrorKind::Resource(e)) }
}

pub type PveResult<T> = Result<T, PveError>;

/// Represents the Proxmox product a backend talks to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// Proxmox Virtual Environment.
    Pve,
    /// Proxmox Mail Gateway.
    Pmg,
    /// Proxmox Backup Server.
    Pbs,
}

impl Default for Service {
    fn default() -> Self { Self::Pve }
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pve => "pve",
            Self::Pmg => "pmg",
            Self::Pbs => "pbs",
        }
    }

    /// Returns the shell counterpart of the REST API, if the service has one.
    pub fn cli_program(&self) -> Option<&'static str> {
        match self {
            Self::Pve => Some("pvesh"),
            Self::Pmg => Some("pmgsh"),
            Self::Pbs => None,
        }
    }

    /// Options appended to every command line.
    pub fn cli_additional_options(&self) -> &'static [&'static str] {
        match self {
            Self::Pve => &["--output-format", "json"],
            Self::Pmg | Self::Pbs => &[],
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Self::Pve | Self::Pmg => 8006,
            Self::Pbs => 8007,
        }
    }

    pub fn token_prefix(&self) -> &'static str {
        match self {
            Self::Pve | Self::Pmg => "PVEAPIToken",
            Self::Pbs => "PBSAPIToken",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = PveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pve" => Ok(Self::Pve),
            "pmg" => Ok(Self::Pmg),
            "pbs" => Ok(Self::Pbs),
            x => pveerr!(ErrorKind::UnsupportedService(x.to_string())),
        }
    }
}
