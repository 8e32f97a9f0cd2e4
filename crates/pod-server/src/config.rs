use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use pod_types::ensure_trailing_slash;
use pod_types::vocab::content_type::{N_TRIPLES, TURTLE};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ServerError, ServerResult};

/// Server settings, usually read from a TOML file. Missing keys take their
/// defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Public URL of the root container; request paths are appended to it.
    pub base_url: String,
    /// Directory holding the resources.
    pub root_path: PathBuf,
    /// Serialisation used when RDF has to be written and nobody asked for a
    /// specific type.
    pub default_rdf_type: String,
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
            base_url: "http://localhost:3000/".to_string(),
            root_path: PathBuf::from("./data"),
            default_rdf_type: TURTLE.to_string(),
            max_body_size: 64 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        let mut config: Self =
            toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check the settings, appending the trailing slash a base URL may lack.
    pub fn validate(&mut self) -> ServerResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ServerError::Config(format!("invalid base_url {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ServerError::Config(format!(
                "base_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ServerError::Config("base_url must name a host".into()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ServerError::Config("base_url cannot carry a query or fragment".into()));
        }
        if self.default_rdf_type != TURTLE && self.default_rdf_type != N_TRIPLES {
            return Err(ServerError::Config(format!(
                "default_rdf_type must be {TURTLE} or {N_TRIPLES}, got {}",
                self.default_rdf_type
            )));
        }
        if self.max_body_size == 0 {
            return Err(ServerError::Config("max_body_size must be positive".into()));
        }
        self.base_url = ensure_trailing_slash(&self.base_url);
        Ok(())
    }
}
