//! Client configuration.
//!
//! There is no global client. A [`ClientConfig`] is built once, either from the environment or
//! through [`ClientConfig::builder`], and handed to whatever does the HTTP work.

use tracing::debug;

use crate::error::{Error, Result};
use crate::format::WireFormat;
use crate::value::Value;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8880;
pub const DEFAULT_PREFIX: &str = "default";
pub const DEFAULT_ACCEPT_ENCODING: &str = "deflate, gzip, identity";

const SCHEMA_KEY: &str = "_schema";
const FOREIGN_KEY: &str = "_foreign";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    host: String,
    port: u16,
    commit: bool,
    prefix: String,
    accept: WireFormat,
    accept_encoding: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            commit: false,
            prefix: normalize_prefix(Some(DEFAULT_PREFIX)),
            accept: WireFormat::Msgpack,
            accept_encoding: DEFAULT_ACCEPT_ENCODING.into(),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Read `XAPIAND_HOST`, `XAPIAND_PORT`, `XAPIAND_COMMIT`, and `XAPIAND_PREFIX`, falling back
    /// to the defaults for any that are unset.
    pub fn from_env() -> Result<ClientConfig> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), with variables read through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = ClientConfig::builder();
        if let Some(host) = lookup("XAPIAND_HOST") {
            builder = builder.host(host);
        }
        if let Some(port) = lookup("XAPIAND_PORT") {
            let port = port
                .trim()
                .parse()
                .map_err(|_| Error::BadConfig(format!("XAPIAND_PORT is not a port: {:?}", port)))?;
            builder = builder.port(port);
        }
        if let Some(commit) = lookup("XAPIAND_COMMIT") {
            builder = builder.commit(parse_flag("XAPIAND_COMMIT", &commit)?);
        }
        if let Some(prefix) = lookup("XAPIAND_PREFIX") {
            builder = builder.prefix(prefix);
        }
        let config = builder.build()?;
        debug!(
            host = %config.host,
            port = config.port,
            prefix = %config.prefix,
            "loaded client config"
        );
        Ok(config)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether writes ask the server to commit immediately.
    pub fn commit(&self) -> bool {
        self.commit
    }

    /// Index prefix, either empty or ending in `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Format asked for in the `Accept` header, and used for bodies with no explicit type.
    pub fn accept(&self) -> WireFormat {
        self.accept
    }

    pub fn accept_encoding(&self) -> &str {
        &self.accept_encoding
    }

    /// Place a body's `_schema` reference under the index prefix.
    ///
    /// `_schema` may be a path, or a map whose `_foreign` entry is a path. Either way the path
    /// has its slashes trimmed and the prefix put in front. Bodies without a `_schema` come back
    /// unchanged. The input is never modified.
    pub fn prefix_schema(&self, body: &Value) -> Value {
        let map = match body.as_map() {
            Some(map) if map.contains_key(SCHEMA_KEY) => map,
            _ => return body.clone(),
        };
        let mut map = map.clone();
        if let Some(schema) = map.get_mut(SCHEMA_KEY) {
            match schema {
                Value::Str(path) => *path = self.prefixed(path),
                Value::Map(schema) => {
                    if let Some(Value::Str(path)) = schema.get_mut(FOREIGN_KEY) {
                        *path = self.prefixed(path);
                    }
                }
                _ => (),
            }
        }
        Value::Map(map)
    }

    /// Apply [`prefix_schema`](Self::prefix_schema), then marshal and encode the body.
    pub fn encode_body(&self, body: &Value, format: WireFormat) -> Result<Vec<u8>> {
        let body = self.prefix_schema(body);
        let encoded = format.encode(&body)?;
        debug!(%format, bytes = encoded.len(), "encoded request body");
        Ok(encoded)
    }

    fn prefixed(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path.trim_matches('/'))
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
    host: String,
    port: Option<u16>,
    commit: bool,
    prefix: Option<String>,
    accept: WireFormat,
    accept_encoding: String,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        ClientConfigBuilder {
            host: DEFAULT_HOST.into(),
            port: None,
            commit: false,
            prefix: Some(DEFAULT_PREFIX.into()),
            accept: WireFormat::Msgpack,
            accept_encoding: DEFAULT_ACCEPT_ENCODING.into(),
        }
    }
}

impl ClientConfigBuilder {
    /// Server host. A `host:port` value also sets the port, overriding [`port`](Self::port).
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Use index names as given, with no prefix.
    pub fn no_prefix(mut self) -> Self {
        self.prefix = None;
        self
    }

    pub fn accept(mut self, accept: WireFormat) -> Self {
        self.accept = accept;
        self
    }

    pub fn accept_encoding(mut self, accept_encoding: impl Into<String>) -> Self {
        self.accept_encoding = accept_encoding.into();
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        let (host, port) = match self.host.split_once(':') {
            Some((host, port)) => {
                let port = port.parse().map_err(|_| {
                    Error::BadConfig(format!("bad port in host {:?}", self.host))
                })?;
                (host.to_string(), port)
            }
            None => (self.host.clone(), self.port.unwrap_or(DEFAULT_PORT)),
        };
        let host = if host.is_empty() {
            DEFAULT_HOST.to_string()
        } else {
            host
        };
        Ok(ClientConfig {
            host,
            port,
            commit: self.commit,
            prefix: normalize_prefix(self.prefix.as_deref()),
            accept: self.accept,
            accept_encoding: self.accept_encoding,
        })
    }
}

fn normalize_prefix(prefix: Option<&str>) -> String {
    match prefix.map(|p| p.trim_matches('/')) {
        Some(p) if !p.is_empty() => format!("{}/", p),
        _ => String::new(),
    }
}

fn parse_flag(name: &str, text: &str) -> Result<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::BadConfig(format!("{} is not a flag: {:?}", name, text))),
    }
}
