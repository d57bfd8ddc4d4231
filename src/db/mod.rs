//! MongoDB handle shared by the repositories, plus the connection status
//! reported by `/` and `/api/debug`.

use std::time::Duration;

use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};
use serde::Serialize;

use crate::{config::Config, errors::AppResult};

const MAX_POOL_SIZE: u32 = 10;
const MIN_POOL_SIZE: u32 = 2;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatabaseStatus {
    #[serde(rename = "conectada")]
    Connected,
    /// Connected at startup, but the last ping failed.
    #[serde(rename = "error")]
    Unreachable,
    /// Never connected; every module runs as a stand-in.
    #[serde(rename = "desconectada")]
    Disconnected,
}

#[derive(Clone)]
pub struct Database {
    inner: mongodb::Database,
}

impl Database {
    /// Connects and pings `config.mongo_db_name`.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.max_pool_size = Some(MAX_POOL_SIZE);
        options.min_pool_size = Some(MIN_POOL_SIZE);
        options.connect_timeout = Some(CONNECT_TIMEOUT);
        options.server_selection_timeout = Some(CONNECT_TIMEOUT);
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let database = Self {
            inner: Client::with_options(options)?.database(&config.mongo_db_name),
        };
        database.ping().await?;

        log::info!("Connected to MongoDB database '{}'", database.name());
        Ok(database)
    }

    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.inner.collection(name)
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.inner.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn status(database: Option<&Database>) -> DatabaseStatus {
        let Some(database) = database else {
            return DatabaseStatus::Disconnected;
        };
        match database.ping().await {
            Ok(()) => DatabaseStatus::Connected,
            Err(e) => {
                log::warn!("Database ping failed: {}", e);
                DatabaseStatus::Unreachable
            }
        }
    }
}
