use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_OWNER_ID: &str = "default";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File { data_dir: PathBuf },
    Redis { redis_url: String },
    Postgres { database_url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    Memory,
    File,
    Redis,
    Postgres,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "file" => Ok(BackendKind::File),
            "redis" => Ok(BackendKind::Redis),
            "postgres" => Ok(BackendKind::Postgres),
            other => anyhow::bail!("STORE_BACKEND must be memory, file, redis or postgres, got {other:?}"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub backend: StoreBackend,
    pub owner_id: String,
    pub http_addr: String,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        Self::from_lookup(default_http_addr, |name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the process env.
    pub fn from_lookup<F>(default_http_addr: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind = lookup("STORE_BACKEND")
            .map(|value| value.parse::<BackendKind>())
            .transpose()?
            .unwrap_or(BackendKind::Memory);

        let backend = match kind {
            BackendKind::Memory => StoreBackend::Memory,
            BackendKind::File => StoreBackend::File {
                data_dir: lookup("DATA_DIR")
                    .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                    .into(),
            },
            BackendKind::Redis => StoreBackend::Redis {
                redis_url: lookup("REDIS_URL").context("REDIS_URL is required")?,
            },
            BackendKind::Postgres => StoreBackend::Postgres {
                database_url: lookup("DATABASE_URL").context("DATABASE_URL is required")?,
            },
        };

        let owner_id = lookup("OWNER_ID")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_OWNER_ID.to_string());
        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| default_http_addr.to_string());

        Ok(Self {
            backend,
            owner_id,
            http_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServiceConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServiceConfig::from_lookup("0.0.0.0:8080", |name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_to_memory_backend() {
        let config = config(&[]).unwrap();
        assert_eq!(config.backend, StoreBackend::Memory);
        assert_eq!(config.owner_id, "default");
        assert_eq!(config.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn file_backend_reads_data_dir() {
        let config = config(&[("STORE_BACKEND", "File"), ("DATA_DIR", "/var/lib/stock")]).unwrap();
        assert_eq!(
            config.backend,
            StoreBackend::File {
                data_dir: PathBuf::from("/var/lib/stock")
            }
        );
    }

    #[test]
    fn hosted_backends_require_urls() {
        let err = config(&[("STORE_BACKEND", "postgres")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let config = config(&[
            ("STORE_BACKEND", "redis"),
            ("REDIS_URL", "redis://127.0.0.1/"),
            ("OWNER_ID", "shop-7"),
        ])
        .unwrap();
        assert_eq!(config.owner_id, "shop-7");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(config(&[("STORE_BACKEND", "sqlite")]).is_err());
    }
}
