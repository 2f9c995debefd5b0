//! Application configuration.
//!
//! Every section and field has a default, so an empty file is a valid
//! configuration:
//!
//! ```toml
//! [attributes]
//! routing_result = "adroit.routing_result"
//! action = "adroit.action"
//! payload = "adroit.payload"
//! responder = "adroit.responder"
//!
//! [router]
//! base_url = "/"
//! default_target = "home"
//! listener = "action"
//!
//! [server]
//! addr = "127.0.0.1:3000"
//! ```

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::router::{PropertyRouter, RegexRouter};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub attributes: AttributeKeys,
    pub router: RouterConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Parses a TOML document.
    ///
    /// ```
    /// use adroit::Config;
    ///
    /// let config = Config::from_toml_str("[router]\ndefault_target = \"home\"").unwrap();
    /// assert_eq!(config.router.default_target.as_deref(), Some("home"));
    /// assert_eq!(config.attributes.action, "adroit.action");
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| ConfigError::Toml(e).into())
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

/// Request attribute keys the pipeline stages exchange state under.
///
/// All stages of one pipeline must use the same keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttributeKeys {
    pub routing_result: String,
    pub action: String,
    pub payload: String,
    pub responder: String,
}

impl Default for AttributeKeys {
    fn default() -> Self {
        Self {
            routing_result: "adroit.routing_result".to_owned(),
            action: "adroit.action".to_owned(),
            payload: "adroit.payload".to_owned(),
            responder: "adroit.responder".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    pub base_url: String,
    /// Target used when no route matches.
    pub default_target: Option<String>,
    /// Query parameter read by the property router.
    pub listener: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_url: "/".to_owned(),
            default_target: None,
            listener: "action".to_owned(),
        }
    }
}

impl RouterConfig {
    /// An empty regex router with the configured base URL and default target.
    pub fn regex_router(&self) -> RegexRouter {
        let router = RegexRouter::new(&self.base_url);
        match &self.default_target {
            Some(target) => router.with_default_target(target),
            None => router,
        }
    }

    pub fn property_router(&self) -> PropertyRouter {
        let router = PropertyRouter::new(&self.base_url).with_listener(&self.listener);
        match &self.default_target {
            Some(target) => router.with_default_target(target),
            None => router,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: "127.0.0.1:3000".to_owned() }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.addr.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::router::{Route, Router, RoutingResult};
    use crate::Request;

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::from_toml_str(
            r#"
            [attributes]
            action = "custom.action"

            [server]
            addr = "0.0.0.0:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.attributes.action, "custom.action");
        assert_eq!(config.attributes.payload, "adroit.payload");
        assert_eq!(config.server.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::from_toml_str("[router]\nbase = \"/\"").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Toml(_))));
    }

    #[test]
    fn missing_files_report_their_path() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn builds_routers() {
        let config = Config::from_toml_str("[router]\ndefault_target = \"home\"").unwrap();
        let router = config
            .router
            .regex_router()
            .with_route(Route::get().from("/about").to("about"))
            .unwrap();

        let RoutingResult::Matched(matched) = router.route(&Request::get("/missing")) else {
            panic!("expected the default target");
        };
        assert_eq!(matched.target().to_string(), "home");
        assert_eq!(config.router.property_router().listener(), "action");
    }
}
