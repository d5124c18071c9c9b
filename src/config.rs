use std::net::SocketAddr;

use anyhow::{Context, Result};

use crate::domain::todo_item::SortPolicy;

/// `DATABASE_URL` value that selects the process-local store.
pub const MEMORY_STORE: &str = "memory";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub sort_policy: SortPolicy,
    /// Create the table on startup. When off, reads report the store as
    /// unavailable until the table exists.
    pub init_schema: bool,
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://todo_items.db".to_string());
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address")?;
        let sort_policy = match lookup("TODO_SORT_POLICY") {
            Some(raw) => raw
                .parse::<SortPolicy>()
                .map_err(anyhow::Error::msg)
                .context("invalid TODO_SORT_POLICY")?,
            None => SortPolicy::default(),
        };
        let init_schema = match lookup("TODO_INIT_SCHEMA") {
            Some(raw) => raw.parse::<bool>().context("TODO_INIT_SCHEMA must be true or false")?,
            None => true,
        };
        Ok(Self { database_url, bind_addr, sort_policy, init_schema })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_STORE
    }
}
