use chrono::{DateTime, Utc};

use crate::srs::types::{MasteryLevel, MasteryRecord};
use crate::store::keys;
use crate::store::{Store, StoreError};

/// Bounded retries for the per-record compare-and-swap loop. Contention on
/// a single (user, kanji) key is limited to double-submits, so this is
/// generous.
const MAX_CAS_RETRIES: u32 = 20;

impl Store {
    pub fn get_record(
        &self,
        user_id: &str,
        kanji_id: &str,
    ) -> Result<Option<MasteryRecord>, StoreError> {
        let key = keys::mastery_record_key(user_id, kanji_id);
        match self.mastery_records.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn list_records(&self, user_id: &str) -> Result<Vec<MasteryRecord>, StoreError> {
        let prefix = keys::mastery_record_prefix(user_id);
        let mut records = Vec::new();
        for item in self.mastery_records.scan_prefix(prefix.as_bytes()) {
            let (_, v) = item?;
            records.push(Self::deserialize::<MasteryRecord>(&v)?);
        }
        Ok(records)
    }

    /// Lazily materialize a record at Unlearned so later eligibility and
    /// recommendation queries have a row to work with. Never overwrites an
    /// existing record; returns whichever record ends up stored.
    pub fn ensure_record(
        &self,
        user_id: &str,
        kanji_id: &str,
        now: DateTime<Utc>,
    ) -> Result<MasteryRecord, StoreError> {
        let key = keys::mastery_record_key(user_id, kanji_id);
        let fresh = MasteryRecord {
            user_id: user_id.to_string(),
            kanji_id: kanji_id.to_string(),
            mastery_level: MasteryLevel::Unlearned,
            test_streak: 0,
            last_tested_at: now,
        };
        let fresh_bytes = Self::serialize(&fresh)?;

        match self
            .mastery_records
            .compare_and_swap(key.as_bytes(), None::<&[u8]>, Some(fresh_bytes))
            .map_err(StoreError::Sled)?
        {
            Ok(()) => Ok(fresh),
            Err(cas_error) => match cas_error.current {
                Some(existing) => Self::deserialize(&existing),
                None => Err(StoreError::Conflict {
                    entity: "mastery_record".to_string(),
                    key,
                }),
            },
        }
    }

    /// Explicit write used by the study page: sets the level directly,
    /// preserving the streak of an existing record.
    pub fn upsert_record_level(
        &self,
        user_id: &str,
        kanji_id: &str,
        level: MasteryLevel,
        now: DateTime<Utc>,
    ) -> Result<MasteryRecord, StoreError> {
        let key = keys::mastery_record_key(user_id, kanji_id);

        for _ in 0..MAX_CAS_RETRIES {
            let current_raw = self.mastery_records.get(key.as_bytes())?;
            let next = match &current_raw {
                Some(raw) => {
                    let mut record: MasteryRecord = Self::deserialize(raw)?;
                    record.mastery_level = level;
                    record.last_tested_at = now;
                    record
                }
                None => MasteryRecord {
                    user_id: user_id.to_string(),
                    kanji_id: kanji_id.to_string(),
                    mastery_level: level,
                    test_streak: 0,
                    last_tested_at: now,
                },
            };
            let next_bytes = Self::serialize(&next)?;

            let swap = self
                .mastery_records
                .compare_and_swap(
                    key.as_bytes(),
                    current_raw.as_ref().map(|r| r.as_ref()),
                    Some(next_bytes),
                )
                .map_err(StoreError::Sled)?;

            if swap.is_ok() {
                return Ok(next);
            }
        }

        Err(StoreError::CasRetryExhausted {
            entity: "mastery_record".to_string(),
            key,
            attempts: MAX_CAS_RETRIES,
        })
    }

    /// Atomic read-modify-write of one record. The transform runs against
    /// the freshest stored value on every attempt, so two rapid submits for
    /// the same (user, kanji) cannot lose an update.
    ///
    /// Returns NotFound when the record was never created.
    pub fn update_record_cas<F>(
        &self,
        user_id: &str,
        kanji_id: &str,
        transform: F,
    ) -> Result<MasteryRecord, StoreError>
    where
        F: Fn(&MasteryRecord) -> MasteryRecord,
    {
        let key = keys::mastery_record_key(user_id, kanji_id);

        for _ in 0..MAX_CAS_RETRIES {
            let Some(current_raw) = self.mastery_records.get(key.as_bytes())? else {
                return Err(StoreError::NotFound {
                    entity: "mastery_record".to_string(),
                    key,
                });
            };
            let current: MasteryRecord = Self::deserialize(&current_raw)?;
            let next = transform(&current);
            let next_bytes = Self::serialize(&next)?;

            let swap = self
                .mastery_records
                .compare_and_swap(
                    key.as_bytes(),
                    Some(current_raw.as_ref()),
                    Some(next_bytes),
                )
                .map_err(StoreError::Sled)?;

            if swap.is_ok() {
                return Ok(next);
            }
        }

        Err(StoreError::CasRetryExhausted {
            entity: "mastery_record".to_string(),
            key,
            attempts: MAX_CAS_RETRIES,
        })
    }

    /// Decay sweep for trusted records: Known with a pinned streak of 7 and
    /// idle past the horizon get softened to 6 so they re-enter rotation.
    /// Returns how many records were softened.
    pub fn soften_trusted(
        &self,
        user_id: &str,
        idle_since: DateTime<Utc>,
    ) -> Result<u32, StoreError> {
        let mut softened = 0u32;
        for record in self.list_records(user_id)? {
            if record.mastery_level != MasteryLevel::Known
                || record.test_streak != 7
                || record.last_tested_at > idle_since
            {
                continue;
            }
            // Deliberately leaves last_tested_at alone: the record becomes
            // eligible immediately, not after another cooldown.
            self.update_record_cas(user_id, &record.kanji_id, |r| {
                let mut next = r.clone();
                if next.mastery_level == MasteryLevel::Known && next.test_streak == 7 {
                    next.test_streak = 6;
                }
                next
            })?;
            softened += 1;
        }
        Ok(softened)
    }
}
