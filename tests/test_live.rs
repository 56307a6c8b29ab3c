// Copyright takubokudori.
// This source code is licensed under the MIT or Apache-2.0 license.
//! Runs read-only requests against a real Proxmox host.
//!
//! These tests are ignored by default. To run them, write your configuration
//! to `tests/config.toml` and run `cargo test -- --ignored`.
//!
//! # config.toml example
//!
//! ```toml
//! node = "pve"
//!
//! [local]
//! sudo = true
//!
//! [openssh]
//! host = "pve.example.com"
//! user = "root"
//! port = 22
//!
//! [https]
//! host = "pve.example.com"
//! token = "root@pam!ci=aaaaaaaa-bbbb-cccc-dddd-ef0123456789"
//! verify_ssl = false
//! ```

#![cfg(all(feature = "local", feature = "openssh", feature = "https"))]


#[cfg(test)]
mod tests {
    use crate::test_cmd_util::init_logger;
    use pvectrl::{
        command::{CommandBackend, Local, OpenSsh},
        https::Https,
        ProxmoxApi,
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct LocalConfig {
        sudo: Option<bool>,
    }

    #[derive(Debug, Deserialize)]
    struct OpenSshConfig {
        host: String,
        user: Option<String>,
        port: Option<u16>,
        sudo: Option<bool>,
    }

    #[derive(Debug, Deserialize)]
    struct HttpsConfig {
        host: String,
        port: Option<u16>,
        token: Option<String>,
        verify_ssl: Option<bool>,
    }

    #[derive(Debug, Deserialize)]
    struct ConfigToml {
        node: String,
        local: Option<LocalConfig>,
        openssh: Option<OpenSshConfig>,
        https: Option<HttpsConfig>,
    }

    fn get_config() -> ConfigToml {
        init_logger();
        let x = std::fs::read_to_string("tests/config.toml")
            .expect("Failed to read config.toml");
        toml::from_str(&x).expect("Failed to parse config.toml")
    }

    fn test_read_only(pve: &ProxmoxApi, node: &str) {
        let version = pve.segment("version").get().unwrap().unwrap();
        assert!(version["version"].is_string());
        let nodes = pve.segment("nodes").get().unwrap().unwrap();
        assert!(nodes
            .as_array()
            .unwrap()
            .iter()
            .any(|x| x["node"] == node));
        pve.segment("nodes")
            .segment(node)
            .segment("qemu")
            .get()
            .unwrap();
        let e = pve
            .segment("nodes")
            .segment(node)
            .segment("pvectrl-no-such-resource")
            .get()
            .unwrap_err();
        assert!(e.is_resource_error(), "{}", e);
    }

    #[test]
    #[ignore]
    fn test_local() {
        let config = get_config();
        let c = config
            .local
            .as_ref()
            .expect("The configuration of local doesn't exist");
        let mut backend = CommandBackend::new(Local::new());
        backend.sudo(c.sudo.unwrap_or(false));
        test_read_only(&ProxmoxApi::new(backend), &config.node);
    }

    #[test]
    #[ignore]
    fn test_openssh() {
        let config = get_config();
        let c = config
            .openssh
            .as_ref()
            .expect("The configuration of openssh doesn't exist");
        let mut ssh = OpenSsh::new(&c.host);
        ssh.user(c.user.clone()).port(c.port);
        let mut backend = CommandBackend::new(ssh);
        backend.sudo(c.sudo.unwrap_or(false));
        test_read_only(&ProxmoxApi::new(backend), &config.node);
    }

    #[test]
    #[ignore]
    fn test_https() {
        let config = get_config();
        let c = config
            .https
            .as_ref()
            .expect("The configuration of https doesn't exist");
        let mut https = Https::new(&c.host);
        https
            .port(c.port)
            .token(c.token.clone())
            .verify_ssl(c.verify_ssl.unwrap_or(true));
        test_read_only(&ProxmoxApi::new(https), &config.node);
    }
}
