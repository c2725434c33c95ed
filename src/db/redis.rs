use super::RecordStore;
use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, AsyncIter, Client};
use async_trait::async_trait;
use color_eyre::eyre::{Report, WrapErr};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Redis backend. Each record is a plain string value holding its JSON document.
///
/// One multiplexed connection is opened at startup and shared by every
/// clone; it reconnects on its own after an I/O error.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Opens the shared connection and checks the server answers a `PING`.
    pub async fn connect(url: &str) -> Result<Self, Report> {
        let client = Client::open(url).wrap_err_with(|| format!("invalid redis url {}", url))?;
        let mut conn = client
            .get_tokio_connection_manager()
            .await
            .wrap_err_with(|| format!("could not connect to redis at {}", url))?;
        let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        info!("Connected to redis at {}", url);
        Ok(Self { conn })
    }

    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait(?Send)]
impl RecordStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Report> {
        let value = self
            .conn()
            .get(key)
            .await
            .wrap_err_with(|| format!("redis GET {} failed", key))?;
        Ok(value)
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<String>, Report> {
        let pattern = format!("{}*", prefix);
        let mut conn = self.conn();

        // SCAN may hand out a key more than once while the keyspace rehashes.
        let mut keys = BTreeSet::new();
        {
            let mut iter: AsyncIter<String> = conn
                .scan_match(&pattern)
                .await
                .wrap_err_with(|| format!("redis SCAN {} failed", pattern))?;
            while let Some(key) = iter.next_item().await {
                keys.insert(key);
            }
        }
        debug!(pattern = pattern.as_str(), keys = keys.len(), "Scanned keys");
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Option<String>> = ::redis::cmd("MGET")
            .arg(keys.into_iter().collect::<Vec<_>>())
            .query_async(&mut conn)
            .await
            .wrap_err_with(|| format!("redis MGET for {} failed", pattern))?;
        // A key deleted between SCAN and MGET comes back as nil.
        Ok(values.into_iter().flatten().collect())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), Report> {
        self.conn()
            .set(key, value)
            .await
            .wrap_err_with(|| format!("redis SET {} failed", key))
    }

    async fn set_if_absent(&self, key: &str, value: String) -> Result<bool, Report> {
        self.conn()
            .set_nx(key, value)
            .await
            .wrap_err_with(|| format!("redis SETNX {} failed", key))
    }

    async fn delete(&self, key: &str) -> Result<bool, Report> {
        let removed: u64 = self
            .conn()
            .del(key)
            .await
            .wrap_err_with(|| format!("redis DEL {} failed", key))?;
        Ok(removed > 0)
    }
}
