use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// One imported kanji. Immutable after the content load; the reading group
/// a kanji belongs to is derived from `primary_onyomi`, never stored again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kanji {
    pub id: String,
    pub character: String,
    pub strokes: u32,
    pub grade: Option<u32>,
    pub freq_rank: Option<u32>,
    /// 5 = most basic, 1 = most advanced; None for off-list kanji.
    pub jlpt_level: Option<u8>,
    pub meanings: Vec<String>,
    pub onyomi: Vec<String>,
    pub kunyomi: Vec<String>,
    pub primary_onyomi: String,
    #[serde(default)]
    pub examples: Vec<ExampleWord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleWord {
    pub word: String,
    pub reading: String,
    pub meaning: String,
}

impl Store {
    pub fn upsert_kanji(&self, kanji: &Kanji) -> Result<(), StoreError> {
        if kanji.character.is_empty() {
            return Err(StoreError::Validation("kanji character is empty".into()));
        }
        if kanji.primary_onyomi.is_empty() {
            return Err(StoreError::Validation(format!(
                "kanji {} has no primary reading",
                kanji.character
            )));
        }

        let key = keys::kanji_key(&kanji.id);
        self.kanji.insert(key.as_bytes(), Self::serialize(kanji)?)?;

        let idx_key = keys::kanji_character_index_key(&kanji.character);
        self.kanji_by_character
            .insert(idx_key.as_bytes(), kanji.id.as_bytes())?;
        Ok(())
    }

    pub fn get_kanji(&self, kanji_id: &str) -> Result<Option<Kanji>, StoreError> {
        let key = keys::kanji_key(kanji_id);
        match self.kanji.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn get_kanji_by_character(&self, character: &str) -> Result<Option<Kanji>, StoreError> {
        let idx_key = keys::kanji_character_index_key(character);
        let Some(id_raw) = self.kanji_by_character.get(idx_key.as_bytes())? else {
            return Ok(None);
        };
        let kanji_id = match String::from_utf8(id_raw.to_vec()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid UTF-8 in kanji character index");
                return Ok(None);
            }
        };
        self.get_kanji(&kanji_id)
    }

    /// Full scan; the content set is a few thousand rows, loaded once.
    pub fn list_kanji(&self, jlpt_level: Option<u8>) -> Result<Vec<Kanji>, StoreError> {
        let mut out = Vec::new();
        for item in self.kanji.iter() {
            let (_, v) = item?;
            let kanji: Kanji = Self::deserialize(&v)?;
            if let Some(level) = jlpt_level {
                if kanji.jlpt_level != Some(level) {
                    continue;
                }
            }
            out.push(kanji);
        }
        Ok(out)
    }

    pub fn list_kanji_in_group(&self, reading: &str) -> Result<Vec<Kanji>, StoreError> {
        let mut out = Vec::new();
        for item in self.kanji.iter() {
            let (_, v) = item?;
            let kanji: Kanji = Self::deserialize(&v)?;
            if kanji.primary_onyomi == reading {
                out.push(kanji);
            }
        }
        Ok(out)
    }

    pub fn count_kanji(&self) -> usize {
        self.kanji.len()
    }
}
