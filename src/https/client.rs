// Copyright takubokudori.
// This source code is licensed under the MIT or Apache-2.0 license.
//! HTTPS client of the `/api2/json` API.
use crate::{
    command::request_pairs,
    params::Params,
    resource::{Backend, ResourcePath, Verb},
    types::*,
    unknown_err,
};
use hyper::ext::ReasonPhrase;
use reqwest::{
    blocking::{Client, Request, Response},
    Method, StatusCode,
};
use serde_json::Value;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Https {
    host: String,
    port: Option<u16>,
    service: Service,
    base_path: String,
    verify_ssl: bool,
    timeout: Option<Duration>,
    proxy: Option<String>,
    token: Option<String>,
}

impl Https {
    pub fn new<T: Into<String>>(host: T) -> Self {
        Self {
            host: host.into(),
            port: None,
            service: Service::Pve,
            base_path: "/api2/json".to_string(),
            verify_ssl: true,
            timeout: None,
            proxy: None,
            token: None,
        }
    }

    impl_setter!(host: String);
    impl_setter!(
        /// Overrides the default port of the service.
        @opt port: u16
    );
    impl_setter!(service: Service);
    impl_setter!(base_path: String);
    impl_setter!(verify_ssl: bool);
    impl_setter!(@opt timeout: Duration);
    impl_setter!(@opt proxy: String);
    impl_setter!(
        /// Sets an API token, e.g., `root@pam!monitoring=aaaaaaaa-bbbb-cccc-dddd-ef0123456789`.
        @opt token: String
    );

    pub fn url(&self, path: &ResourcePath) -> String {
        format!(
            "https://{}:{}{}{}",
            self.host,
            self.port.unwrap_or_else(|| self.service.default_port()),
            self.base_path,
            path
        )
    }

    pub fn get_client(&self) -> PveResult<Client> {
        let mut builder = Client::builder()
            .danger_accept_invalid_certs(!self.verify_ssl);
        if let Some(x) = self.timeout {
            builder = builder.timeout(x);
        }
        if let Some(x) = &self.proxy {
            let proxy = reqwest::Proxy::all(x.as_str()).map_err(|e| {
                pveerr!(@r ErrorKind::InvalidParameter(e.to_string()))
            })?;
            builder = builder.proxy(proxy);
        }
        builder.build().map_err(unknown_err)
    }

    /// Builds the request without sending it.
    ///
    /// GET and DELETE carry `params` in the query string, POST and PUT in a form body.
    pub fn build_request(
        &self,
        client: &Client,
        verb: Verb,
        path: &ResourcePath,
        params: &Params,
    ) -> PveResult<Request> {
        let (method, in_body) = match verb {
            Verb::Get => (Method::GET, false),
            Verb::Post => (Method::POST, true),
            Verb::Put => (Method::PUT, true),
            Verb::Delete => (Method::DELETE, false),
        };
        let mut v = client.request(method, self.url(path));
        let pairs = request_pairs(params)?;
        if in_body {
            v = v.form(&pairs);
        } else if !pairs.is_empty() {
            v = v.query(&pairs);
        }
        if let Some(x) = &self.token {
            v = v.header(
                "Authorization",
                format!("{}={}", self.service.token_prefix(), x),
            );
        }
        v.build()
            .map_err(|x| pveerr!(@r ErrorKind::InvalidParameter(x.to_string())))
    }

    /// Maps an HTTP response onto `(stdout, stderr)`.
    ///
    /// stderr is the status line, built from `reason` when the server sent its
    /// own phrase and from the canonical reason otherwise. On success stdout is
    /// the `data` member of the body, otherwise the `errors` member or the raw
    /// body.
    pub fn handle_response(
        status: StatusCode,
        reason: Option<&str>,
        body: &str,
    ) -> PveResult<(String, String)> {
        let reason = reason
            .map(str::trim)
            .filter(|x| !x.is_empty())
            .or_else(|| status.canonical_reason())
            .unwrap_or("");
        let status_line = format!("{} {}", status.as_u16(), reason)
            .trim_end()
            .to_string();
        if !status.is_success() {
            let errors = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|x| x.get("errors").cloned())
                .filter(|x| !x.is_null())
                .map(|x| x.to_string())
                .unwrap_or_else(|| body.to_string());
            return Ok((errors, status_line));
        }
        if body.trim().is_empty() {
            return Ok((String::new(), status_line));
        }
        let v: Value = crate::deserialize(body)?;
        let stdout = match v.get("data") {
            None | Some(Value::Null) => String::new(),
            Some(x) => x.to_string(),
        };
        Ok((stdout, status_line))
    }
}

impl Backend for Https {
    fn execute(
        &self,
        verb: Verb,
        path: &ResourcePath,
        params: &Params,
    ) -> PveResult<(String, String)> {
        let client = self.get_client()?;
        let req = self.build_request(&client, verb, path, params)?;
        debug!("{} {}", req.method(), req.url());
        let resp = client.execute(req).map_err(|x| {
            pveerr!(@r ErrorKind::ExecutionFailed(x.to_string()))
        })?;
        let status = resp.status();
        let reason = reason_phrase(&resp);
        let body = resp.text().map_err(|x| {
            pveerr!(@r ErrorKind::UnexpectedResponse(x.to_string()))
        })?;
        Self::handle_response(status, reason.as_deref(), &body)
    }
}

/// The reason phrase the server sent, if it differs from the canonical one.
///
/// Proxmox puts the failure message there, e.g.,
/// `500 unable to find configuration file for VM 999`.
fn reason_phrase(resp: &Response) -> Option<String> {
    resp.extensions()
        .get::<ReasonPhrase>()
        .map(|x| String::from_utf8_lossy(x.as_bytes()).into_owned())
}
