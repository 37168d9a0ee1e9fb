use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::srs::config::SrsConfig;
use crate::srs::discovery::{self, PeerContext};
use crate::srs::eligibility::{self, DrillKind};
use crate::srs::types::{
    DiscoveryOutcome, GroupScore, GroupStats, LevelStats, MasteryLevel, MasteryRecord,
    OverviewStats, ReviewBatch, Track, VocabQuestion,
};
use crate::srs::{batch, level, mastery, recommend};
use crate::store::operations::kanji::Kanji;
use crate::store::{Store, StoreError};

/// Facade over the SRS core: every request-scoped operation the HTTP
/// layer needs, orchestrated against the store. Randomness and the clock
/// are injected per call so handlers stay thin and tests stay
/// deterministic.
pub struct SrsEngine {
    store: Arc<Store>,
    config: SrsConfig,
}

impl SrsEngine {
    pub fn new(config: SrsConfig, store: Arc<Store>) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SrsConfig {
        &self.config
    }

    /// Apply one graded review answer. NotFound when the item was never
    /// surfaced for this user; the CAS loop makes double-submits safe.
    pub fn submit_review_answer(
        &self,
        user_id: &str,
        kanji_id: &str,
        is_correct: bool,
        now: DateTime<Utc>,
    ) -> Result<MasteryRecord, StoreError> {
        self.store.update_record_cas(user_id, kanji_id, |record| {
            mastery::apply_review_result(record, is_correct, now)
        })
    }

    /// Apply one discovery answer: promotes Unlearned records on a correct
    /// answer and leaves everything else untouched.
    pub fn submit_discovery_answer(
        &self,
        user_id: &str,
        kanji_id: &str,
        is_correct: bool,
        now: DateTime<Utc>,
    ) -> Result<MasteryRecord, StoreError> {
        self.store.update_record_cas(user_id, kanji_id, |record| {
            mastery::apply_discovery_result(record, is_correct, now)
        })
    }

    pub fn review_batch<R: Rng + ?Sized>(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<ReviewBatch, StoreError> {
        let pool =
            eligibility::testable_records(&self.store, user_id, now, &self.config, DrillKind::Review)?;
        let readings = self.store.list_readings()?;
        let known_by_reading = self.known_characters_by_reading(user_id)?;

        Ok(batch::select_review_batch(
            &pool,
            &readings,
            &known_by_reading,
            self.config.review_batch_size,
            rng,
        ))
    }

    /// Cloze drill over the eligible pool, using the short vocab cooldown.
    /// Roughly 40% of the slots go to learning items; kanji without
    /// example words are skipped.
    pub fn vocab_batch<R: Rng + ?Sized>(
        &self,
        user_id: &str,
        limit: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Vec<VocabQuestion>, StoreError> {
        let pool =
            eligibility::testable_records(&self.store, user_id, now, &self.config, DrillKind::Vocab)?;
        if pool.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut learning: Vec<&(MasteryRecord, Kanji)> = pool
            .iter()
            .filter(|(r, _)| r.mastery_level == MasteryLevel::Learning)
            .collect();
        let mut known: Vec<&(MasteryRecord, Kanji)> = pool
            .iter()
            .filter(|(r, _)| r.mastery_level == MasteryLevel::Known)
            .collect();
        learning.shuffle(rng);
        known.shuffle(rng);

        let target_learning = ((limit as f64 * 0.4).ceil() as usize)
            .max(1)
            .min(limit)
            .min(learning.len());

        let mut selected: Vec<&(MasteryRecord, Kanji)> = Vec::with_capacity(limit);
        selected.extend(learning.iter().take(target_learning).copied());
        let remaining = limit - selected.len();
        selected.extend(known.iter().take(remaining).copied());
        if selected.len() < limit {
            selected.extend(learning.iter().skip(target_learning).copied());
            selected.truncate(limit);
        }

        let mut questions = Vec::with_capacity(selected.len());
        for (_, kanji) in selected {
            if let Some(question) = build_vocab_question(kanji) {
                questions.push(question);
            }
            if questions.len() >= limit {
                break;
            }
        }
        Ok(questions)
    }

    /// Unlearned kanji the user may discover next, gated on an established
    /// reading. Every surfaced candidate gets its record materialized at
    /// Unlearned so later answers and queries have a row to work with.
    pub fn discovery_batch(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<DiscoveryOutcome, StoreError> {
        let track = self.store.get_user_track(user_id)?;
        let current_level = self.current_level(user_id)?;
        let scope = match track {
            Track::Jlpt => Some(current_level),
            Track::Stat => None,
        };

        let records = self.records_by_kanji(user_id)?;
        let unlearned: Vec<Kanji> = self
            .store
            .list_kanji(scope)?
            .into_iter()
            .filter(|kanji| {
                records
                    .get(&kanji.id)
                    .map(|r| r.mastery_level == MasteryLevel::Unlearned)
                    .unwrap_or(true)
            })
            .collect();

        // Footholds are track-independent: any learned member of a group
        // opens the whole group for discovery.
        let mut peers: HashMap<String, PeerContext> = HashMap::new();
        for record in records.values() {
            if record.mastery_level == MasteryLevel::Unlearned {
                continue;
            }
            let Some(kanji) = self.store.get_kanji(&record.kanji_id)? else {
                continue;
            };
            let context = peers.entry(kanji.primary_onyomi.clone()).or_default();
            context.has_foothold = true;
            if record.mastery_level == MasteryLevel::Known {
                context.known_characters.push(kanji.character);
            }
        }

        let usefulness_by_reading: HashMap<String, f64> = self
            .store
            .list_groups()?
            .into_iter()
            .map(|g| (g.reading, g.usefulness_score))
            .collect();

        let candidates = discovery::discovery_candidates(
            &unlearned,
            &peers,
            &usefulness_by_reading,
            track,
            self.config.discovery_limit,
        );

        if candidates.is_empty() {
            return Ok(DiscoveryOutcome::Empty {
                track,
                level: current_level,
            });
        }

        for candidate in &candidates {
            self.store.ensure_record(user_id, &candidate.kanji_id, now)?;
        }

        Ok(DiscoveryOutcome::Ready(candidates))
    }

    pub fn next_group(&self, user_id: &str) -> Result<Option<GroupScore>, StoreError> {
        let track = self.store.get_user_track(user_id)?;
        let stats = self.group_stats(user_id, track)?;
        Ok(recommend::next_group(&stats))
    }

    pub fn rank_groups(&self, user_id: &str, count: usize) -> Result<Vec<GroupScore>, StoreError> {
        let track = self.store.get_user_track(user_id)?;
        let stats = self.group_stats(user_id, track)?;
        Ok(recommend::rank_groups(&stats, count))
    }

    /// Per-group progress counts for the listing pages, scoped by the
    /// user's track, most useful group first. Groups with no kanji in
    /// scope are dropped.
    pub fn group_listing(&self, user_id: &str) -> Result<Vec<GroupStats>, StoreError> {
        let track = self.store.get_user_track(user_id)?;
        let stats = self.group_stats(user_id, track)?;
        Ok(stats.into_iter().filter(|s| s.total > 0).collect())
    }

    pub fn current_level(&self, user_id: &str) -> Result<u8, StoreError> {
        let records = self.records_by_kanji(user_id)?;
        let mut per_level: HashMap<u8, LevelStats> = HashMap::new();

        for kanji in self.store.list_kanji(None)? {
            let Some(jlpt_level) = kanji.jlpt_level else {
                continue;
            };
            let stats = per_level.entry(jlpt_level).or_insert(LevelStats {
                level: jlpt_level,
                total: 0,
                mastered: 0,
                learning: 0,
            });
            stats.total += 1;
            match records.get(&kanji.id).map(|r| r.mastery_level) {
                Some(MasteryLevel::Known) => stats.mastered += 1,
                Some(MasteryLevel::Learning) => stats.learning += 1,
                _ => {}
            }
        }

        let stats: Vec<LevelStats> = per_level.into_values().collect();
        Ok(level::current_level(&stats))
    }

    pub fn overview(&self, user_id: &str) -> Result<OverviewStats, StoreError> {
        let total = self.store.count_kanji();
        let mut mastered = 0;
        let mut learning = 0;
        for record in self.store.list_records(user_id)? {
            match record.mastery_level {
                MasteryLevel::Known => mastered += 1,
                MasteryLevel::Learning => learning += 1,
                MasteryLevel::Unlearned => {}
            }
        }

        Ok(OverviewStats {
            mastered,
            learning,
            unlearned: total.saturating_sub(mastered + learning),
            total,
        })
    }

    /// The study page's explicit mastery write; the one sanctioned record
    /// mutation outside the state machine.
    pub fn set_mastery(
        &self,
        user_id: &str,
        character: &str,
        mastery_level: MasteryLevel,
        now: DateTime<Utc>,
    ) -> Result<MasteryRecord, StoreError> {
        let kanji = self
            .store
            .get_kanji_by_character(character)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "kanji".to_string(),
                key: character.to_string(),
            })?;
        self.store
            .upsert_record_level(user_id, &kanji.id, mastery_level, now)
    }

    fn records_by_kanji(
        &self,
        user_id: &str,
    ) -> Result<HashMap<String, MasteryRecord>, StoreError> {
        Ok(self
            .store
            .list_records(user_id)?
            .into_iter()
            .map(|record| (record.kanji_id.clone(), record))
            .collect())
    }

    fn known_characters_by_reading(
        &self,
        user_id: &str,
    ) -> Result<HashMap<String, Vec<String>>, StoreError> {
        let mut by_reading: HashMap<String, Vec<String>> = HashMap::new();
        for record in self.store.list_records(user_id)? {
            if record.mastery_level != MasteryLevel::Known {
                continue;
            }
            let Some(kanji) = self.store.get_kanji(&record.kanji_id)? else {
                continue;
            };
            by_reading
                .entry(kanji.primary_onyomi)
                .or_default()
                .push(kanji.character);
        }
        Ok(by_reading)
    }

    fn group_stats(&self, user_id: &str, track: Track) -> Result<Vec<GroupStats>, StoreError> {
        let scope = match track {
            Track::Jlpt => Some(self.current_level(user_id)?),
            Track::Stat => None,
        };

        let mut totals: HashMap<String, usize> = HashMap::new();
        let mut reading_by_kanji: HashMap<String, String> = HashMap::new();
        for kanji in self.store.list_kanji(scope)? {
            *totals.entry(kanji.primary_onyomi.clone()).or_default() += 1;
            reading_by_kanji.insert(kanji.id, kanji.primary_onyomi);
        }

        let mut mastered: HashMap<String, usize> = HashMap::new();
        let mut learning: HashMap<String, usize> = HashMap::new();
        for record in self.store.list_records(user_id)? {
            // Only records for in-scope kanji count toward group progress.
            let Some(reading) = reading_by_kanji.get(&record.kanji_id) else {
                continue;
            };
            match record.mastery_level {
                MasteryLevel::Known => *mastered.entry(reading.clone()).or_default() += 1,
                MasteryLevel::Learning => *learning.entry(reading.clone()).or_default() += 1,
                MasteryLevel::Unlearned => {}
            }
        }

        Ok(self
            .store
            .list_groups()?
            .into_iter()
            .map(|group| GroupStats {
                total: totals.get(&group.reading).copied().unwrap_or(0),
                mastered: mastered.get(&group.reading).copied().unwrap_or(0),
                learning: learning.get(&group.reading).copied().unwrap_or(0),
                reading: group.reading,
                usefulness_score: group.usefulness_score,
            })
            .collect())
    }
}

fn build_vocab_question(kanji: &Kanji) -> Option<VocabQuestion> {
    let example = kanji
        .examples
        .iter()
        .find(|example| example.word.contains(&kanji.character))?;

    Some(VocabQuestion {
        kanji_id: kanji.id.clone(),
        word_prompt: example.reading.clone(),
        blanked_word: example.word.replace(&kanji.character, "［？］"),
        correct_answer: kanji.character.clone(),
        meaning: example.meaning.clone(),
    })
}
