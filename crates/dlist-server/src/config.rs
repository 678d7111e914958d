//! Configuration for the Dlist server
//!
//! Everything comes from environment variables (a `.env` file is loaded by
//! the binary first). Unparsable optional values are logged and replaced by
//! their defaults; values the server cannot start without are errors.

use std::env;
use std::path::PathBuf;

use axum::http::HeaderValue;
use tracing::{info, warn};

use dlist_kb::Neo4jConfig;

use crate::error::{ServerError, ServerResult};

/// Which graph store backs the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphBackend {
    Neo4j,
    /// In-memory graph loaded from `GRAPH_SEED_FILE`.
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Log settings, read before the rest of the configuration so that
/// configuration warnings are already visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut logging = Self::default();
        if let Some(level) = lookup("LOG_LEVEL") {
            logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                _ => {
                    // stderr: the subscriber is not installed yet
                    eprintln!("Invalid LOG_FORMAT value: {}, using pretty", format);
                    LogFormat::Pretty
                }
            };
        }
        logging
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub bind_address: String,

    /// Graph store selection
    pub graph_backend: GraphBackend,

    /// Neo4j connection settings, used by the `neo4j` backend
    pub neo4j: Neo4jConfig,

    /// Seed file of the `memory` backend
    pub graph_seed_file: Option<PathBuf>,

    /// Directory of JSON poem snapshots used when the poem query fails
    pub fallback_poems_dir: PathBuf,

    /// Front-end origin allowed by CORS
    pub cors_origin: String,

    /// Upper bound for the `depth` of node-centered queries
    pub max_node_depth: u32,

    pub logging: LoggingConfig,
}

fn default_port() -> u16 {
    3001
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_fallback_dir() -> PathBuf {
    PathBuf::from("output_poems")
}

fn default_max_node_depth() -> u32 {
    6
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn load() -> ServerResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Start with defaults
        let mut config = Self::default();

        if let Some((key, port)) = lookup("PORT")
            .map(|p| ("PORT", p))
            .or_else(|| lookup("SERVER_PORT").map(|p| ("SERVER_PORT", p)))
        {
            config.port = port.trim().parse::<u16>().map_err(|_| {
                ServerError::ConfigError(format!("Invalid {} value: {}", key, port))
            })?;
        }

        if let Some(host) = lookup("SERVER_HOST") {
            config.bind_address = host;
        }

        if let Some(backend) = lookup("GRAPH_BACKEND") {
            config.graph_backend = match backend.to_lowercase().as_str() {
                "neo4j" => GraphBackend::Neo4j,
                "memory" => GraphBackend::Memory,
                _ => {
                    return Err(ServerError::ConfigError(format!(
                        "Unknown GRAPH_BACKEND value: {} (expected neo4j or memory)",
                        backend
                    )))
                }
            };
        }

        if let Some(uri) = lookup("NEO4J_URI") {
            config.neo4j.uri = uri;
        }
        if let Some(user) = lookup("NEO4J_USER") {
            config.neo4j.username = user;
        }
        if let Some(pass) = lookup("NEO4J_PASS") {
            config.neo4j.password = pass;
        }
        if let Some(database) = lookup("NEO4J_DATABASE").filter(|db| !db.is_empty()) {
            config.neo4j.database = Some(database);
        }
        if let Some(pool_size) = lookup("NEO4J_POOL_SIZE") {
            match pool_size.parse::<usize>() {
                Ok(size) if size > 0 => config.neo4j.pool_size = size,
                _ => warn!("Invalid NEO4J_POOL_SIZE value: {}", pool_size),
            }
        }

        if let Some(seed) = lookup("GRAPH_SEED_FILE").filter(|s| !s.is_empty()) {
            config.graph_seed_file = Some(PathBuf::from(seed));
        }

        if let Some(dir) = lookup("FALLBACK_POEMS_DIR").filter(|d| !d.is_empty()) {
            config.fallback_poems_dir = PathBuf::from(dir);
        }

        if let Some(origin) = lookup("CORS_ORIGIN") {
            config.cors_origin = origin;
        }

        if let Some(depth) = lookup("MAX_NODE_DEPTH") {
            match depth.parse::<u32>() {
                Ok(depth) => config.max_node_depth = depth,
                Err(_) => warn!("Invalid MAX_NODE_DEPTH value: {}", depth),
            }
        }

        config.logging = LoggingConfig::from_lookup(&lookup);

        config.validate()?;
        info!("Loaded server configuration");
        Ok(config)
    }

    fn validate(&self) -> ServerResult<()> {
        if self.max_node_depth == 0 {
            return Err(ServerError::ConfigError(
                "MAX_NODE_DEPTH must be at least 1".to_string(),
            ));
        }

        if self.graph_backend == GraphBackend::Memory && self.graph_seed_file.is_none() {
            return Err(ServerError::ConfigError(
                "GRAPH_BACKEND=memory requires GRAPH_SEED_FILE".to_string(),
            ));
        }

        if HeaderValue::from_str(&self.cors_origin).is_err() {
            return Err(ServerError::ConfigError(format!(
                "Invalid CORS_ORIGIN value: {}",
                self.cors_origin
            )));
        }

        if self.graph_backend == GraphBackend::Neo4j && self.neo4j.password == "password" {
            warn!("NEO4J_PASS not set - using the default password");
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            graph_backend: GraphBackend::Neo4j,
            neo4j: Neo4jConfig::default(),
            graph_seed_file: None,
            fallback_poems_dir: default_fallback_dir(),
            cors_origin: default_cors_origin(),
            max_node_depth: default_max_node_depth(),
            logging: LoggingConfig::default(),
        }
    }
}
