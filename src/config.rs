//! # Configuration Module
//!
//! Builds the [`Config`] value the client is constructed from. Values come from
//! the process environment and, when present, a local `KEY=VALUE` env file.
//! The env file is parsed into a map; the process environment is never written.
//!
//! Resolution order for each key is process environment first, then the file.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::errors::{ProbeError, ProbeResult};

/// Environment key holding the API credential
pub const API_KEY_VAR: &str = "PINECONE_API_KEY";

/// Environment key overriding the control-plane URL
pub const CONTROLLER_HOST_VAR: &str = "PINECONE_CONTROLLER_HOST";

pub const DEFAULT_CONTROLLER_HOST: &str = "https://api.pinecone.io";

/// Env file read when no other path is given on the command line
pub const DEFAULT_ENV_FILE: &str = ".env.local";

/// Settings needed to build a [`crate::PineconeClient`]
#[derive(Clone)]
pub struct Config {
    /// API credential. May be empty; the service rejects it on first use.
    pub api_key: String,
    /// Control-plane base URL, used to resolve index names to hosts
    pub controller_host: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &if self.api_key.is_empty() { "<empty>" } else { "<redacted>" })
            .field("controller_host", &self.controller_host)
            .finish()
    }
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            controller_host: DEFAULT_CONTROLLER_HOST.to_string(),
        }
    }

    pub fn with_controller_host(mut self, host: impl Into<String>) -> Self {
        self.controller_host = host.into();
        self
    }

    /// Load configuration from `env_file` and the process environment.
    ///
    /// A missing env file is not an error; resolution falls back to the
    /// process environment alone.
    pub fn load(env_file: &Path) -> ProbeResult<Self> {
        let file_vars = read_env_file(env_file)?;
        Ok(Self::from_lookup(&file_vars, |key| std::env::var(key).ok()))
    }

    /// Resolve configuration from parsed file entries and an environment lookup.
    pub fn from_lookup<F>(file_vars: &HashMap<String, String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |key: &str| lookup(key).or_else(|| file_vars.get(key).cloned());

        let api_key = resolve(API_KEY_VAR).unwrap_or_default();
        if api_key.is_empty() {
            warn!(key = API_KEY_VAR, "API credential is missing or empty");
        }

        let controller_host = resolve(CONTROLLER_HOST_VAR)
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTROLLER_HOST.to_string());

        Self {
            api_key,
            controller_host,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Parse a `KEY=VALUE` env file into a map without touching the process environment.
pub fn read_env_file(path: &Path) -> ProbeResult<HashMap<String, String>> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => {
            debug!(path = %path.display(), "Env file not found, using process environment only");
            return Ok(HashMap::new());
        }
        Err(e) => {
            return Err(ProbeError::Config(format!("{}: {}", path.display(), e)));
        }
    };

    let mut vars = HashMap::new();
    for entry in entries {
        let (key, value) = entry.map_err(|e| ProbeError::Config(format!("{}: {}", path.display(), e)))?;
        vars.insert(key, value);
    }

    debug!(path = %path.display(), count = vars.len(), "Loaded env file");
    Ok(vars)
}
