use std::{
    io,
    net::SocketAddr,
    path::{Path, PathBuf},
};

/// Default GraphQL endpoint path.
pub const DEFAULT_GRAPH_PATH: &str = "/graphql";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Configuration of the people graph server.
pub struct Config {
    /// Server bind settings
    pub network: NetworkConfig,
    /// GraphQL endpoint settings
    pub graph: GraphConfig,
    /// Records loaded at startup
    pub dataset: DatasetConfig,
    /// Health check endpoint settings
    pub health: HealthConfig,
}

impl Config {
    /// Loads the configuration file. A missing file is not an error and yields `None`.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Config>, ConfigError> {
        let path = path.as_ref();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        toml::from_str(&content).map(Some).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub listen_address: Option<SocketAddr>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Path of the GraphQL endpoint. Default: `/graphql`.
    pub path: Option<String>,
    /// Whether the schema answers introspection queries. Default: true.
    pub introspection: bool,
    /// Whether GET requests on the endpoint serve the GraphiQL IDE. Default: true.
    pub graphiql: bool,
}

impl GraphConfig {
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or(DEFAULT_GRAPH_PATH)
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            path: None,
            introspection: true,
            graphiql: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    /// JSON file with `people` and `hobbies` arrays. The built-in dataset is used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/health".to_string(),
        }
    }
}
