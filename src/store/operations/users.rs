use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::srs::types::Track;
use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub track: Track,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    pub fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let email_key = keys::user_email_index_key(&user.email);

        // Atomic compare-and-swap: only insert if the email key does not exist.
        // This prevents the race condition where two concurrent registrations
        // with the same email both pass the existence check.
        let cas_result = self
            .users
            .compare_and_swap(
                email_key.as_bytes(),
                None::<&[u8]>,
                Some(user.id.as_bytes().to_vec()),
            )
            .map_err(StoreError::Sled)?;

        if let Err(_current_value) = cas_result {
            return Err(StoreError::Conflict {
                entity: "user_email".to_string(),
                key: user.email.clone(),
            });
        }

        let user_key = keys::user_key(&user.id);
        let user_bytes = Self::serialize(user)?;
        if let Err(e) = self.users.insert(user_key.as_bytes(), user_bytes) {
            let _ = self.users.remove(email_key.as_bytes());
            return Err(StoreError::Sled(e));
        }

        Ok(())
    }

    pub fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let key = keys::user_key(user_id);
        match self.users.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let index_key = keys::user_email_index_key(email);
        let Some(user_id_raw) = self.users.get(index_key.as_bytes())? else {
            return Ok(None);
        };
        let user_id = match String::from_utf8(user_id_raw.to_vec()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid UTF-8 in user email index");
                return Ok(None);
            }
        };
        self.get_user_by_id(&user_id)
    }

    pub fn set_user_track(&self, user_id: &str, track: Track) -> Result<User, StoreError> {
        let mut user = self
            .get_user_by_id(user_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "user".to_string(),
                key: user_id.to_string(),
            })?;

        user.track = track;
        user.updated_at = Utc::now();

        let user_key = keys::user_key(&user.id);
        self.users
            .insert(user_key.as_bytes(), Self::serialize(&user)?)?;
        Ok(user)
    }

    pub fn get_user_track(&self, user_id: &str) -> Result<Track, StoreError> {
        Ok(self
            .get_user_by_id(user_id)?
            .map(|u| u.track)
            .unwrap_or_default())
    }
}
