use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token_hash: String,
    pub user_id: String,
    pub token_type: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl Store {
    pub fn create_session(&self, session: &Session) -> Result<(), StoreError> {
        let key = keys::session_key(&session.token_hash);
        let index_key = keys::session_user_index_key(&session.user_id, &session.token_hash);
        let session_bytes = Self::serialize(session)?;

        let key_bytes = key.as_bytes().to_vec();
        let index_key_bytes = index_key.as_bytes().to_vec();
        self.sessions
            .transaction(move |tx| {
                tx.insert(key_bytes.as_slice(), session_bytes.as_slice())?;
                tx.insert(index_key_bytes.as_slice(), &[] as &[u8])?;
                Ok(())
            })
            .map_err(|e: sled::transaction::TransactionError<()>| match e {
                sled::transaction::TransactionError::Abort(()) => {
                    StoreError::Sled(sled::Error::Unsupported("transaction aborted".into()))
                }
                sled::transaction::TransactionError::Storage(se) => StoreError::Sled(se),
            })?;
        Ok(())
    }

    /// Returns None for expired or revoked sessions without deleting them;
    /// stale rows are swept by `cleanup_expired_sessions` on logout paths.
    pub fn get_session(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
        let key = keys::session_key(token_hash);
        let Some(raw) = self.sessions.get(key.as_bytes())? else {
            return Ok(None);
        };

        let session = Self::deserialize::<Session>(&raw)?;
        if session.revoked || session.expires_at <= Utc::now() {
            return Ok(None);
        }

        Ok(Some(session))
    }

    pub fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        let key = keys::session_key(token_hash);
        let raw = self.sessions.get(key.as_bytes())?;

        let session_key_bytes = key.as_bytes().to_vec();
        let index_key_bytes = raw
            .as_ref()
            .and_then(|r| Self::deserialize::<Session>(r).ok())
            .map(|session| {
                keys::session_user_index_key(&session.user_id, token_hash)
                    .as_bytes()
                    .to_vec()
            });

        self.sessions
            .transaction(move |tx| {
                if let Some(ref idx_key) = index_key_bytes {
                    tx.remove(idx_key.as_slice())?;
                }
                tx.remove(session_key_bytes.as_slice())?;
                Ok(())
            })
            .map_err(|e: sled::transaction::TransactionError<()>| match e {
                sled::transaction::TransactionError::Abort(()) => {
                    StoreError::Sled(sled::Error::Unsupported("transaction aborted".into()))
                }
                sled::transaction::TransactionError::Storage(se) => StoreError::Sled(se),
            })?;

        Ok(())
    }

    /// Sweep expired or revoked sessions, at most 1000 per call so a large
    /// backlog cannot stall the caller. Returns the number removed.
    pub fn cleanup_expired_sessions(&self) -> Result<u32, StoreError> {
        const MAX_BATCH_SIZE: usize = 1000;

        let mut expired = Vec::new();
        for item in self.sessions.iter() {
            let (k, v) = item?;
            let key_str = String::from_utf8_lossy(&k);
            if key_str.starts_with("user:") {
                continue;
            }
            let session: Session = Self::deserialize(&v)?;
            if session.expires_at <= Utc::now() || session.revoked {
                expired.push(session.token_hash);
                if expired.len() >= MAX_BATCH_SIZE {
                    break;
                }
            }
        }

        let count = expired.len() as u32;
        for token_hash in expired {
            self.delete_session(&token_hash)?;
        }

        Ok(count)
    }
}
