//! Redis storage implementation
//!
//! Plain string keys: the URL maps to its timestamp via `GET`/`SET`/`MGET`.

use crate::storage::traits::{IndexError, IndexResult, KeyValueStore};

/// Redis index store
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    /// Creates a store for the given `redis://host:port/db` URL
    ///
    /// Connections are opened per operation; an unreachable server surfaces
    /// on first use.
    pub fn new(redis_url: &str) -> IndexResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    fn connection(&self) -> IndexResult<redis::Connection> {
        Ok(self.client.get_connection()?)
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> IndexResult<Option<String>> {
        let mut con = self.connection()?;
        let value: Option<String> = redis::cmd("GET").arg(key).query(&mut con)?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> IndexResult<()> {
        let mut con = self.connection()?;
        redis::cmd("SET").arg(key).arg(value).query::<()>(&mut con)?;
        Ok(())
    }

    fn get_many(&self, keys: &[String]) -> IndexResult<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut con = self.connection()?;
        let values: Vec<Option<String>> = redis::cmd("MGET").arg(keys).query(&mut con)?;

        if values.len() != keys.len() {
            return Err(IndexError::ShortRead {
                expected: keys.len(),
                got: values.len(),
            });
        }
        Ok(values)
    }

    fn set_many(&mut self, entries: &[(String, String)]) -> IndexResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut con = self.connection()?;
        let mut pipe = redis::pipe();
        for (key, value) in entries {
            pipe.cmd("SET").arg(key).arg(value).ignore();
        }
        pipe.query::<()>(&mut con)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
