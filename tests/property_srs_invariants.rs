use std::collections::HashMap;

use chrono::Utc;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use kanji_backend::srs::batch::{
    select_review_batch, KNOWN_TARGET_MAX, KNOWN_TARGET_MIN, MIN_MULTIPLE_CHOICE, MIN_WRITE_IN,
    REVIEW_POOL_MIN,
};
use kanji_backend::srs::mastery::{
    apply_review_result, STREAK_CEILING, STREAK_FLOOR,
};
use kanji_backend::srs::recommend::{next_group, COMPLETION_CUTOFF_PCT};
use kanji_backend::srs::types::{
    GroupStats, MasteryLevel, MasteryRecord, QuestionFormat, ReviewBatch,
};
use kanji_backend::store::operations::kanji::Kanji;

fn record(level: MasteryLevel, streak: i32) -> MasteryRecord {
    MasteryRecord {
        user_id: "u1".to_string(),
        kanji_id: "k1".to_string(),
        mastery_level: level,
        test_streak: streak,
        last_tested_at: Utc::now(),
    }
}

fn pool_entry(id: usize, level: MasteryLevel) -> (MasteryRecord, Kanji) {
    let readings = ["コウ", "カ", "スイ", "セイ", "シン"];
    let reading = readings[id % readings.len()];
    let kanji_id = format!("k{id}");
    (
        MasteryRecord {
            user_id: "u1".to_string(),
            kanji_id: kanji_id.clone(),
            mastery_level: level,
            test_streak: 1,
            last_tested_at: Utc::now(),
        },
        Kanji {
            id: kanji_id,
            character: format!("字{id}"),
            strokes: 5,
            grade: None,
            freq_rank: None,
            jlpt_level: Some(5),
            meanings: vec![],
            onyomi: vec![reading.to_string()],
            kunyomi: vec![],
            primary_onyomi: reading.to_string(),
            examples: vec![],
        },
    )
}

fn readings() -> Vec<String> {
    ["コウ", "カ", "スイ", "セイ", "シン", "トウ", "ケン", "サン"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

proptest! {
    /// For any starting record and any answer sequence, the streak never
    /// leaves [-3, 7] and levels stay valid.
    #[test]
    fn pt_streak_always_bounded(
        start_level in 0u8..=2,
        start_streak in STREAK_FLOOR..=STREAK_CEILING,
        answers in proptest::collection::vec(any::<bool>(), 0..300),
    ) {
        let level = MasteryLevel::try_from(start_level).unwrap();
        let mut current = record(level, start_streak);
        for is_correct in answers {
            current = apply_review_result(&current, is_correct, Utc::now());
            prop_assert!((STREAK_FLOOR..=STREAK_CEILING).contains(&current.test_streak));
            // A Learning record can never rest at the ceiling: it either
            // promoted (streak reset) or never reached it.
            if current.test_streak == STREAK_CEILING {
                prop_assert_ne!(current.mastery_level, MasteryLevel::Learning);
            }
        }
    }

    /// A full 15-question batch always satisfies both format floors and
    /// the known-level quota, whatever the pool distribution and seed.
    #[test]
    fn pt_batch_floors_hold(
        learning in 13usize..40,
        known in 5usize..40,
        seed in any::<u64>(),
    ) {
        let mut pool = Vec::new();
        for i in 0..learning {
            pool.push(pool_entry(i, MasteryLevel::Learning));
        }
        for i in 0..known {
            pool.push(pool_entry(learning + i, MasteryLevel::Known));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let batch = select_review_batch(&pool, &readings(), &HashMap::new(), 15, &mut rng);
        let questions = match batch {
            ReviewBatch::Ready(q) => q,
            ReviewBatch::Insufficient { .. } => {
                return Err(TestCaseError::fail("pool was large enough"));
            }
        };

        prop_assert_eq!(questions.len(), 15);

        let mc = questions.iter().filter(|q| q.format == QuestionFormat::MultipleChoice).count();
        let wi = questions.iter().filter(|q| q.format == QuestionFormat::WriteIn).count();
        prop_assert!(mc >= MIN_MULTIPLE_CHOICE);
        prop_assert!(wi >= MIN_WRITE_IN);

        let known_count = questions.iter().filter(|q| q.mastery_level == MasteryLevel::Known).count();
        prop_assert!((KNOWN_TARGET_MIN..=KNOWN_TARGET_MAX).contains(&known_count));
    }

    /// Any pool below the minimum yields the insufficient outcome with an
    /// exact available count.
    #[test]
    fn pt_small_pools_are_insufficient(
        size in 0usize..REVIEW_POOL_MIN,
        seed in any::<u64>(),
    ) {
        let pool: Vec<_> = (0..size).map(|i| pool_entry(i, MasteryLevel::Learning)).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        match select_review_batch(&pool, &readings(), &HashMap::new(), 15, &mut rng) {
            ReviewBatch::Insufficient { available } => prop_assert_eq!(available, size),
            ReviewBatch::Ready(_) => return Err(TestCaseError::fail("expected insufficient")),
        }
    }

    /// A group at or past the completion cutoff is never the recommended
    /// group, no matter its usefulness.
    #[test]
    fn pt_finished_groups_never_recommended(
        usefulness in 0.0f64..1000.0,
        total in 1usize..50,
        fresh_usefulness in 0.1f64..1000.0,
    ) {
        let finished = GroupStats {
            reading: "済".to_string(),
            usefulness_score: usefulness,
            total,
            mastered: total,
            learning: 0,
        };
        let fresh = GroupStats {
            reading: "新".to_string(),
            usefulness_score: fresh_usefulness,
            total: 10,
            mastered: 0,
            learning: 0,
        };

        let best = next_group(&[finished, fresh]).unwrap();
        prop_assert_eq!(best.reading, "新");
        prop_assert!(best.completion_pct < COMPLETION_CUTOFF_PCT);
    }
}
