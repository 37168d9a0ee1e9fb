use chrono::{Duration, Utc};

use kanji_backend::srs::types::{MasteryLevel, MasteryRecord};
use kanji_backend::store::operations::groups::ReadingGroup;
use kanji_backend::store::operations::kanji::{ExampleWord, Kanji};
use kanji_backend::store::Store;

pub fn seed_group(store: &Store, reading: &str, usefulness_score: f64) {
    store
        .upsert_group(&ReadingGroup {
            reading: reading.to_string(),
            usefulness_score,
        })
        .expect("seed group");
}

pub fn seed_kanji(
    store: &Store,
    id: &str,
    character: &str,
    reading: &str,
    jlpt_level: Option<u8>,
) -> Kanji {
    let kanji = Kanji {
        id: id.to_string(),
        character: character.to_string(),
        strokes: 6,
        grade: Some(2),
        freq_rank: Some(500),
        jlpt_level,
        meanings: vec!["seed meaning".to_string()],
        onyomi: vec![reading.to_string()],
        kunyomi: vec![],
        primary_onyomi: reading.to_string(),
        examples: vec![ExampleWord {
            word: format!("{character}語"),
            reading: "ごご".to_string(),
            meaning: "seed word".to_string(),
        }],
    };
    store.upsert_kanji(&kanji).expect("seed kanji");
    kanji
}

/// Write a record directly with a backdated timestamp so cooldown-gated
/// paths are exercisable without waiting.
pub fn seed_record(
    store: &Store,
    user_id: &str,
    kanji_id: &str,
    level: MasteryLevel,
    streak: i32,
    idle: Duration,
) {
    let now = Utc::now();
    store.ensure_record(user_id, kanji_id, now).expect("ensure record");
    store
        .update_record_cas(user_id, kanji_id, |r| MasteryRecord {
            mastery_level: level,
            test_streak: streak,
            last_tested_at: now - idle,
            ..r.clone()
        })
        .expect("backdate record");
}

/// Seed a review-eligible pool: `learning` + `known` kanji spread over a
/// handful of reading groups, all idle past the review cooldown. Returns
/// the kanji ids.
pub fn seed_review_pool(
    store: &Store,
    user_id: &str,
    learning: usize,
    known: usize,
) -> Vec<String> {
    let readings = ["コウ", "カ", "スイ", "セイ", "シン"];
    for (i, reading) in readings.iter().enumerate() {
        seed_group(store, reading, 100.0 - i as f64 * 10.0);
    }

    let mut ids = Vec::new();
    for i in 0..learning + known {
        let id = format!("pool-{i}");
        let reading = readings[i % readings.len()];
        seed_kanji(store, &id, &format!("字{i}"), reading, Some(5));
        let level = if i < learning {
            MasteryLevel::Learning
        } else {
            MasteryLevel::Known
        };
        seed_record(store, user_id, &id, level, 1, Duration::days(1));
        ids.push(id);
    }
    ids
}
