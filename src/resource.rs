// Copyright takubokudori.
// This source code is licensed under the MIT or Apache-2.0 license.
//! Resource accessor.
//!
//! A [`Resource`] is an immutable resource path bound to a backend. Segments
//! are appended with [`Resource::segment`] or [`Resource::path`], each of which
//! returns a new accessor. Only the verb methods talk to the backend.
//!
//! ```no_run
//! use pvectrl::{command::{CommandBackend, Local}, params, resource::ProxmoxApi};
//!
//! let pve = ProxmoxApi::new(CommandBackend::new(Local::new()));
//! let storage = pve.segment("nodes").segment("pve").segment("storage").get();
//! pve.path("nodes/pve/qemu")
//!     .segment(100)
//!     .segment("config")
//!     .set(&params! { "memory" => 1024, "onboot" => true })
//!     .unwrap();
//! ```
use crate::{deserialize, params::Params, types::*};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fmt, str::FromStr, sync::Arc};

/// The last status line must match this for a request to succeed.
///
/// `pvesh` ends the line with `200 OK`, which must be a separate word:
/// `HTTP/1.1 200 OK` succeeds but `HTTP/1.1-200 OK` does not. A line starting
/// with any other 2xx code, such as `201 Created`, also succeeds.
pub const DEFAULT_SUCCESS_PATTERN: &str = r"(?:^|\s)200 OK$|^2\d\d(?:\s|$)";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// The action keyword passed to `pvesh`.
    pub fn cli_word(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "create",
            Self::Put => "set",
            Self::Delete => "delete",
        }
    }

    pub fn as_method(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method())
    }
}

impl FromStr for Verb {
    type Err = PveError;

    /// Accepts both HTTP methods and `pvesh` words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" | "create" => Ok(Self::Post),
            "put" | "set" => Ok(Self::Put),
            "delete" => Ok(Self::Delete),
            x => pveerr!(ErrorKind::InvalidParameter(format!("verb: {}", x))),
        }
    }
}

/// A slash-separated resource path such as `/nodes/pve/qemu/100`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    pub fn new() -> Self { Self::default() }

    /// Returns a new path with `segment` appended. Empty segments are ignored.
    pub fn join<T: Into<String>>(&self, segment: T) -> Self {
        let mut ret = self.clone();
        ret.push(segment.into());
        ret
    }

    fn push(&mut self, segment: String) {
        if !segment.is_empty() {
            self.segments.push(segment);
        }
    }

    pub fn segments(&self) -> &[String] { &self.segments }

    #[inline]
    pub fn is_root(&self) -> bool { self.segments.is_empty() }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for s in &self.segments {
            write!(f, "/{}", s)?;
        }
        Ok(())
    }
}

impl From<&str> for ResourcePath {
    fn from(s: &str) -> Self {
        let mut ret = Self::new();
        s.split('/').for_each(|x| ret.push(x.to_string()));
        ret
    }
}

/// Sends a request to Proxmox.
pub trait Backend: Send + Sync {
    /// Executes `verb` on `path` and returns `(stdout, stderr)`.
    ///
    /// The last non-blank line of stderr is the status line.
    fn execute(
        &self,
        verb: Verb,
        path: &ResourcePath,
        params: &Params,
    ) -> PveResult<(String, String)>;
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn execute(
        &self,
        verb: Verb,
        path: &ResourcePath,
        params: &Params,
    ) -> PveResult<(String, String)> {
        (**self).execute(verb, path, params)
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn execute(
        &self,
        verb: Verb,
        path: &ResourcePath,
        params: &Params,
    ) -> PveResult<(String, String)> {
        (**self).execute(verb, path, params)
    }
}

/// Decides whether a status text reports success.
#[derive(Clone, Debug)]
pub struct StatusMatcher {
    success: Regex,
}

impl Default for StatusMatcher {
    fn default() -> Self {
        Self {
            success: Regex::new(DEFAULT_SUCCESS_PATTERN)
                .expect("DEFAULT_SUCCESS_PATTERN is a valid regex"),
        }
    }
}

impl StatusMatcher {
    pub fn new(pattern: &str) -> PveResult<Self> {
        match Regex::new(pattern) {
            Ok(success) => Ok(Self { success }),
            Err(x) => pveerr!(ErrorKind::InvalidParameter(x.to_string())),
        }
    }

    pub fn pattern(&self) -> &str { self.success.as_str() }

    /// Checks the last non-blank line of `stderr`.
    ///
    /// Blank status text is a success.
    pub fn check(&self, stdout: &str, stderr: &str) -> PveResult<()> {
        let last = stderr.lines().map(str::trim).filter(|x| !x.is_empty()).last();
        match last {
            None => Ok(()),
            Some(x) if self.success.is_match(x) => Ok(()),
            Some(x) => Err(PveError::from(ResourceError::new(
                x,
                stderr.trim(),
                stdout,
            ))),
        }
    }
}

/// Entry point of the resource tree.
#[derive(Clone)]
pub struct ProxmoxApi {
    backend: Arc<dyn Backend>,
    status: Arc<StatusMatcher>,
}

impl fmt::Debug for ProxmoxApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxmoxApi")
            .field("success_pattern", &self.status.pattern())
            .finish()
    }
}

impl ProxmoxApi {
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            status: Arc::new(StatusMatcher::default()),
        }
    }

    /// Replaces the regex a status line must match to count as success.
    ///
    /// Accessors created before the call keep the old pattern.
    pub fn success_pattern(&mut self, pattern: &str) -> PveResult<&mut Self> {
        self.status = Arc::new(StatusMatcher::new(pattern)?);
        Ok(self)
    }

    pub fn root(&self) -> Resource {
        Resource {
            backend: self.backend.clone(),
            status: self.status.clone(),
            path: ResourcePath::new(),
        }
    }

    #[inline]
    pub fn segment<T: ToString>(&self, segment: T) -> Resource {
        self.root().segment(segment)
    }

    #[inline]
    pub fn path<T: AsRef<str>>(&self, path: T) -> Resource {
        self.root().path(path)
    }
}

/// A resource path bound to a backend.
#[derive(Clone)]
pub struct Resource {
    backend: Arc<dyn Backend>,
    status: Arc<StatusMatcher>,
    path: ResourcePath,
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Resource").field(&self.path.to_string()).finish()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

impl Resource {
    fn with_path(&self, path: ResourcePath) -> Self {
        Self {
            backend: self.backend.clone(),
            status: self.status.clone(),
            path,
        }
    }

    /// Appends one segment, e.g. a node name or a VM ID.
    pub fn segment<T: ToString>(&self, segment: T) -> Self {
        self.with_path(self.path.join(segment.to_string()))
    }

    /// Appends every non-empty part of a slash-separated path.
    pub fn path<T: AsRef<str>>(&self, path: T) -> Self {
        let mut p = self.path.clone();
        path.as_ref()
            .split('/')
            .for_each(|x| p.push(x.to_string()));
        self.with_path(p)
    }

    pub fn resource_path(&self) -> &ResourcePath { &self.path }

    /// Dispatches `verb` to the backend and decodes the payload.
    ///
    /// Returns `None` if the backend printed nothing.
    pub fn request(
        &self,
        verb: Verb,
        params: &Params,
    ) -> PveResult<Option<Value>> {
        debug!("{} {}", verb, self.path);
        let (stdout, stderr) = self.backend.execute(verb, &self.path, params)?;
        if let Err(x) = self.status.check(&stdout, &stderr) {
            warn!("{} {} failed: {}", verb, self.path, x);
            return Err(x);
        }
        if stdout.trim().is_empty() {
            return Ok(None);
        }
        deserialize(stdout.trim()).map(Some)
    }

    pub fn get(&self) -> PveResult<Option<Value>> {
        self.request(Verb::Get, &Params::new())
    }

    pub fn get_with(&self, params: &Params) -> PveResult<Option<Value>> {
        self.request(Verb::Get, params)
    }

    /// Same as `self.segment(segment).get()`.
    pub fn get_at<T: ToString>(&self, segment: T) -> PveResult<Option<Value>> {
        self.segment(segment).get()
    }

    /// Gets the payload as `T`.
    pub fn get_as<T: DeserializeOwned>(&self) -> PveResult<Option<T>> {
        match self.get()? {
            Some(x) => serde_json::from_value(x).map(Some).map_err(|x| {
                pveerr!(@r ErrorKind::UnexpectedResponse(x.to_string()))
            }),
            None => Ok(None),
        }
    }

    pub fn post(&self, params: &Params) -> PveResult<Option<Value>> {
        self.request(Verb::Post, params)
    }

    /// Alias of [`Resource::post`].
    #[inline]
    pub fn create(&self, params: &Params) -> PveResult<Option<Value>> {
        self.post(params)
    }

    pub fn put(&self, params: &Params) -> PveResult<Option<Value>> {
        self.request(Verb::Put, params)
    }

    /// Alias of [`Resource::put`].
    #[inline]
    pub fn set(&self, params: &Params) -> PveResult<Option<Value>> {
        self.put(params)
    }

    pub fn delete(&self) -> PveResult<Option<Value>> {
        self.request(Verb::Delete, &Params::new())
    }

    pub fn delete_with(&self, params: &Params) -> PveResult<Option<Value>> {
        self.request(Verb::Delete, params)
    }

    /// Same as `self.segment(segment).delete()`.
    pub fn delete_at<T: ToString>(
        &self,
        segment: T,
    ) -> PveResult<Option<Value>> {
        self.segment(segment).delete()
    }
}
