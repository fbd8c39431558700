use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;
use uuid::Uuid;

use super::{SessionCv, SessionError, SessionStore};

/// Adds an entry only when its file hash is new to the session.
/// KEYS: entry list, hash set. ARGV: file hash, JSON entry, TTL seconds.
/// Both keys get the TTL refreshed either way. Returns 1 when the entry was pushed.
const ADD_SCRIPT: &str = r#"
local added = redis.call('SADD', KEYS[2], ARGV[1])
if added == 1 then
  redis.call('RPUSH', KEYS[1], ARGV[2])
end
redis.call('EXPIRE', KEYS[1], ARGV[3])
redis.call('EXPIRE', KEYS[2], ARGV[3])
return added
"#;

/// Sessions persisted in Redis: an ordered list of JSON entries plus a set of file
/// hashes that keeps the list free of duplicates. Every write refreshes the session TTL.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    ttl_secs: u64,
    add_script: redis::Script,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self {
            client,
            ttl_secs,
            add_script: redis::Script::new(ADD_SCRIPT),
        }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, SessionError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

pub(crate) fn session_key(session_id: Uuid) -> String {
    format!("cvrag:session:{session_id}:cvs")
}

pub(crate) fn hashes_key(session_id: Uuid) -> String {
    format!("cvrag:session:{session_id}:hashes")
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn add(&self, session_id: Uuid, cv: SessionCv) -> Result<bool, SessionError> {
        let entry = serde_json::to_string(&cv)?;
        let mut con = self.connection().await?;
        let added: i64 = self
            .add_script
            .key(session_key(session_id))
            .key(hashes_key(session_id))
            .arg(&cv.file_hash)
            .arg(entry)
            .arg(self.ttl_secs)
            .invoke_async(&mut con)
            .await?;

        if added == 1 {
            debug!("Session {session_id}: added {}", cv.file_hash);
        }
        Ok(added == 1)
    }

    async fn contains(&self, session_id: Uuid, file_hash: &str) -> Result<bool, SessionError> {
        let mut con = self.connection().await?;
        Ok(con.sismember(hashes_key(session_id), file_hash).await?)
    }

    async fn list(&self, session_id: Uuid) -> Result<Vec<SessionCv>, SessionError> {
        let mut con = self.connection().await?;
        let entries: Vec<String> = con.lrange(session_key(session_id), 0, -1).await?;
        entries
            .iter()
            .map(|e| serde_json::from_str(e).map_err(SessionError::from))
            .collect()
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), SessionError> {
        let mut con = self.connection().await?;
        let _: () = con
            .del(vec![session_key(session_id), hashes_key(session_id)])
            .await?;
        debug!("Session {session_id}: cleared");
        Ok(())
    }
}
