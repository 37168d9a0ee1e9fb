use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// A reading group. The usefulness score is precomputed at import time
/// from corpus frequency; higher means more valuable to study.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingGroup {
    pub reading: String,
    pub usefulness_score: f64,
}

impl Store {
    pub fn upsert_group(&self, group: &ReadingGroup) -> Result<(), StoreError> {
        if group.reading.is_empty() {
            return Err(StoreError::Validation("group reading is empty".into()));
        }
        let key = keys::group_key(&group.reading);
        self.groups.insert(key.as_bytes(), Self::serialize(group)?)?;
        Ok(())
    }

    pub fn get_group(&self, reading: &str) -> Result<Option<ReadingGroup>, StoreError> {
        let key = keys::group_key(reading);
        match self.groups.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// All groups, most useful first.
    pub fn list_groups(&self) -> Result<Vec<ReadingGroup>, StoreError> {
        let mut groups = Vec::new();
        for item in self.groups.iter() {
            let (_, v) = item?;
            groups.push(Self::deserialize::<ReadingGroup>(&v)?);
        }
        groups.sort_by(|a, b| b.usefulness_score.total_cmp(&a.usefulness_score));
        Ok(groups)
    }

    pub fn list_readings(&self) -> Result<Vec<String>, StoreError> {
        let mut readings = Vec::new();
        for item in self.groups.iter() {
            let (k, _) = item?;
            match String::from_utf8(k.to_vec()) {
                Ok(reading) => readings.push(reading),
                Err(e) => tracing::warn!(error = %e, "Invalid UTF-8 group key"),
            }
        }
        Ok(readings)
    }
}
