use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::srs::types::{MasteryLevel, MasteryRecord, QuestionFormat, ReviewBatch, TestQuestion};
use crate::store::operations::kanji::Kanji;

/// A review session refuses to start below this pool size.
pub const REVIEW_POOL_MIN: usize = 15;
pub const MIN_MULTIPLE_CHOICE: usize = 5;
pub const MIN_WRITE_IN: usize = 3;
/// Known-level quota per batch: a random draw in this range, capped by
/// what is actually available.
pub const KNOWN_TARGET_MIN: usize = 2;
pub const KNOWN_TARGET_MAX: usize = 5;

const DISTRACTOR_COUNT: usize = 2;
const HINT_LIMIT: usize = 2;

/// Compose a balanced review batch from the eligible pool.
///
/// The split between learning and known items is quota-based: a random
/// known-count in [2, 5], the rest learning. A short partition shrinks the
/// batch rather than being backfilled from the other side, so the ratio
/// bias is preserved. Formats start as a fair coin per question and are
/// then converted as needed to satisfy the hard floors (at least 5
/// multiple-choice, at least 3 write-in).
///
/// All randomness comes from the injected `rng`.
pub fn select_review_batch<R: Rng + ?Sized>(
    pool: &[(MasteryRecord, Kanji)],
    all_readings: &[String],
    known_by_reading: &HashMap<String, Vec<String>>,
    target_size: usize,
    rng: &mut R,
) -> ReviewBatch {
    if pool.len() < REVIEW_POOL_MIN {
        return ReviewBatch::Insufficient {
            available: pool.len(),
        };
    }

    let mut learning: Vec<&(MasteryRecord, Kanji)> = pool
        .iter()
        .filter(|(r, _)| r.mastery_level == MasteryLevel::Learning)
        .collect();
    let mut known: Vec<&(MasteryRecord, Kanji)> = pool
        .iter()
        .filter(|(r, _)| r.mastery_level == MasteryLevel::Known)
        .collect();

    let target_known = rng
        .gen_range(KNOWN_TARGET_MIN..=KNOWN_TARGET_MAX)
        .min(known.len())
        .min(target_size);
    let target_learning = target_size.saturating_sub(target_known).min(learning.len());

    learning.shuffle(rng);
    known.shuffle(rng);

    let mut selected: Vec<&(MasteryRecord, Kanji)> =
        Vec::with_capacity(target_learning + target_known);
    selected.extend(learning.into_iter().take(target_learning));
    selected.extend(known.into_iter().take(target_known));
    selected.shuffle(rng);

    let mut questions: Vec<TestQuestion> = selected
        .into_iter()
        .map(|(record, kanji)| {
            let format = if rng.gen_bool(0.5) {
                QuestionFormat::WriteIn
            } else {
                QuestionFormat::MultipleChoice
            };
            let choices = match format {
                QuestionFormat::MultipleChoice => {
                    build_choices(&kanji.primary_onyomi, all_readings, rng)
                }
                QuestionFormat::WriteIn => Vec::new(),
            };
            let hints = if record.mastery_level == MasteryLevel::Learning {
                known_by_reading
                    .get(&kanji.primary_onyomi)
                    .map(|peers| peers.iter().take(HINT_LIMIT).cloned().collect())
                    .unwrap_or_default()
            } else {
                Vec::new()
            };

            TestQuestion {
                kanji_id: kanji.id.clone(),
                character: kanji.character.clone(),
                mastery_level: record.mastery_level,
                format,
                choices,
                correct_answer: kanji.primary_onyomi.clone(),
                hints,
            }
        })
        .collect();

    enforce_format_floors(&mut questions, all_readings, rng);

    ReviewBatch::Ready(questions)
}

/// The correct reading plus two distinct distractors drawn from the group
/// reading universe, shuffled.
pub fn build_choices<R: Rng + ?Sized>(
    correct: &str,
    all_readings: &[String],
    rng: &mut R,
) -> Vec<String> {
    let distractor_pool: Vec<&String> = all_readings
        .iter()
        .filter(|r| r.as_str() != correct)
        .collect();

    let mut choices: Vec<String> = distractor_pool
        .choose_multiple(rng, DISTRACTOR_COUNT)
        .map(|r| (*r).clone())
        .collect();
    choices.push(correct.to_string());
    choices.shuffle(rng);
    choices
}

/// Convert questions from the over-represented format until both floors
/// hold. The multiple-choice floor is restored first; the write-in pass
/// afterwards can only eat into the multiple-choice surplus, never below
/// its floor (batches of at least 8 satisfy both).
fn enforce_format_floors<R: Rng + ?Sized>(
    questions: &mut [TestQuestion],
    all_readings: &[String],
    rng: &mut R,
) {
    let mc_count = questions
        .iter()
        .filter(|q| q.format == QuestionFormat::MultipleChoice)
        .count();
    if mc_count < MIN_MULTIPLE_CHOICE {
        let mut needed = MIN_MULTIPLE_CHOICE - mc_count;
        for question in questions.iter_mut() {
            if needed == 0 {
                break;
            }
            if question.format == QuestionFormat::WriteIn {
                question.format = QuestionFormat::MultipleChoice;
                question.choices = build_choices(&question.correct_answer, all_readings, rng);
                needed -= 1;
            }
        }
    }

    let write_in_count = questions
        .iter()
        .filter(|q| q.format == QuestionFormat::WriteIn)
        .count();
    if write_in_count < MIN_WRITE_IN {
        let mut needed = MIN_WRITE_IN - write_in_count;
        for question in questions.iter_mut() {
            if needed == 0 {
                break;
            }
            if question.format == QuestionFormat::MultipleChoice {
                question.format = QuestionFormat::WriteIn;
                question.choices.clear();
                needed -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn pool_entry(id: usize, level: MasteryLevel, reading: &str) -> (MasteryRecord, Kanji) {
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

    fn make_pool(learning: usize, known: usize) -> Vec<(MasteryRecord, Kanji)> {
        let readings = ["コウ", "カ", "スイ", "セイ", "シン"];
        let mut pool = Vec::new();
        for i in 0..learning {
            pool.push(pool_entry(i, MasteryLevel::Learning, readings[i % readings.len()]));
        }
        for i in 0..known {
            pool.push(pool_entry(
                learning + i,
                MasteryLevel::Known,
                readings[(learning + i) % readings.len()],
            ));
        }
        pool
    }

    fn readings() -> Vec<String> {
        ["コウ", "カ", "スイ", "セイ", "シン", "トウ", "ケン", "サン"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn pool_of_fourteen_is_insufficient() {
        let pool = make_pool(10, 4);
        let mut rng = StdRng::seed_from_u64(7);
        let batch = select_review_batch(&pool, &readings(), &HashMap::new(), 15, &mut rng);
        match batch {
            ReviewBatch::Insufficient { available } => assert_eq!(available, 14),
            ReviewBatch::Ready(_) => panic!("expected insufficient pool"),
        }
    }

    #[test]
    fn empty_pool_reports_zero_available() {
        let mut rng = StdRng::seed_from_u64(7);
        let batch = select_review_batch(&[], &readings(), &HashMap::new(), 15, &mut rng);
        match batch {
            ReviewBatch::Insufficient { available } => assert_eq!(available, 0),
            ReviewBatch::Ready(_) => panic!("expected insufficient pool"),
        }
    }

    #[test]
    fn full_batch_meets_format_floors_and_known_quota() {
        let pool = make_pool(12, 8);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let batch = select_review_batch(&pool, &readings(), &HashMap::new(), 15, &mut rng);
            let questions = match batch {
                ReviewBatch::Ready(q) => q,
                ReviewBatch::Insufficient { .. } => panic!("pool was large enough"),
            };
            assert_eq!(questions.len(), 15, "seed {seed}");

            let mc = questions
                .iter()
                .filter(|q| q.format == QuestionFormat::MultipleChoice)
                .count();
            let wi = questions
                .iter()
                .filter(|q| q.format == QuestionFormat::WriteIn)
                .count();
            assert!(mc >= MIN_MULTIPLE_CHOICE, "seed {seed}: {mc} multiple-choice");
            assert!(wi >= MIN_WRITE_IN, "seed {seed}: {wi} write-in");

            let known = questions
                .iter()
                .filter(|q| q.mastery_level == MasteryLevel::Known)
                .count();
            assert!((KNOWN_TARGET_MIN..=KNOWN_TARGET_MAX).contains(&known), "seed {seed}");
        }
    }

    #[test]
    fn batch_draws_only_from_the_pool() {
        let pool = make_pool(12, 8);
        let pool_ids: std::collections::HashSet<&str> =
            pool.iter().map(|(r, _)| r.kanji_id.as_str()).collect();
        let mut rng = StdRng::seed_from_u64(3);

        let ReviewBatch::Ready(questions) =
            select_review_batch(&pool, &readings(), &HashMap::new(), 15, &mut rng)
        else {
            panic!("pool was large enough");
        };

        let mut seen = std::collections::HashSet::new();
        for q in &questions {
            assert!(pool_ids.contains(q.kanji_id.as_str()));
            assert!(seen.insert(q.kanji_id.clone()), "duplicate {}", q.kanji_id);
        }
    }

    #[test]
    fn short_learning_partition_is_not_backfilled() {
        // 3 learning + 20 known: the known quota stays in [2, 5], so the
        // batch shrinks instead of being padded with extra known items.
        let pool = make_pool(3, 20);
        let mut rng = StdRng::seed_from_u64(11);

        let ReviewBatch::Ready(questions) =
            select_review_batch(&pool, &readings(), &HashMap::new(), 15, &mut rng)
        else {
            panic!("pool was large enough");
        };

        let learning = questions
            .iter()
            .filter(|q| q.mastery_level == MasteryLevel::Learning)
            .count();
        let known = questions.len() - learning;
        assert!(learning <= 3);
        assert!(known <= KNOWN_TARGET_MAX);
        assert!(questions.len() <= 8);
    }

    #[test]
    fn multiple_choice_options_are_well_formed() {
        let pool = make_pool(12, 8);
        let all = readings();
        let mut rng = StdRng::seed_from_u64(5);

        let ReviewBatch::Ready(questions) =
            select_review_batch(&pool, &all, &HashMap::new(), 15, &mut rng)
        else {
            panic!("pool was large enough");
        };

        for q in questions
            .iter()
            .filter(|q| q.format == QuestionFormat::MultipleChoice)
        {
            assert_eq!(q.choices.len(), 3);
            assert!(q.choices.contains(&q.correct_answer));
            let unique: std::collections::HashSet<&String> = q.choices.iter().collect();
            assert_eq!(unique.len(), 3, "duplicate options in {:?}", q.choices);
            for choice in &q.choices {
                assert!(all.contains(choice));
            }
        }

        for q in questions
            .iter()
            .filter(|q| q.format == QuestionFormat::WriteIn)
        {
            assert!(q.choices.is_empty());
        }
    }

    #[test]
    fn hints_attach_only_to_learning_questions() {
        let pool = make_pool(12, 8);
        let mut known_by_reading = HashMap::new();
        for reading in ["コウ", "カ", "スイ", "セイ", "シン"] {
            known_by_reading.insert(
                reading.to_string(),
                vec!["既1".to_string(), "既2".to_string(), "既3".to_string()],
            );
        }
        let mut rng = StdRng::seed_from_u64(9);

        let ReviewBatch::Ready(questions) =
            select_review_batch(&pool, &readings(), &known_by_reading, 15, &mut rng)
        else {
            panic!("pool was large enough");
        };

        for q in &questions {
            match q.mastery_level {
                MasteryLevel::Learning => {
                    assert_eq!(q.hints.len(), HINT_LIMIT);
                }
                _ => assert!(q.hints.is_empty()),
            }
        }
    }

    #[test]
    fn hints_are_omitted_when_no_known_peers_exist() {
        let pool = make_pool(12, 8);
        let mut rng = StdRng::seed_from_u64(13);

        let ReviewBatch::Ready(questions) =
            select_review_batch(&pool, &readings(), &HashMap::new(), 15, &mut rng)
        else {
            panic!("pool was large enough");
        };

        assert!(questions.iter().all(|q| q.hints.is_empty()));
    }
}
