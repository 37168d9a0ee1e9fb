use chrono::{DateTime, Utc};

use crate::srs::config::SrsConfig;
use crate::srs::mastery::STREAK_CEILING;
use crate::srs::types::{MasteryLevel, MasteryRecord};
use crate::store::operations::kanji::Kanji;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillKind {
    Review,
    Vocab,
}

/// All records currently testable for a user, joined with their kanji.
///
/// Runs the trusted-decay sweep first: Known records pinned at streak 7
/// and idle past the horizon are softened to 6 so mastered items keep
/// resurfacing instead of retiring permanently.
///
/// Eligible afterwards: level Learning/Known, streak below the ceiling,
/// and idle at least one cooldown (the drill kind picks which cooldown).
/// Ordered weakest-and-stalest first: level ascending, then
/// last_tested_at ascending.
pub fn testable_records(
    store: &Store,
    user_id: &str,
    now: DateTime<Utc>,
    config: &SrsConfig,
    drill: DrillKind,
) -> Result<Vec<(MasteryRecord, Kanji)>, StoreError> {
    let softened = store.soften_trusted(user_id, now - config.trusted_horizon)?;
    if softened > 0 {
        tracing::debug!(user_id, softened, "Softened trusted records back into rotation");
    }

    let cooldown = match drill {
        DrillKind::Review => config.review_cooldown,
        DrillKind::Vocab => config.vocab_cooldown,
    };
    let cutoff = now - cooldown;

    let mut eligible = Vec::new();
    for record in store.list_records(user_id)? {
        if record.mastery_level == MasteryLevel::Unlearned {
            continue;
        }
        if record.test_streak >= STREAK_CEILING {
            continue;
        }
        if record.last_tested_at > cutoff {
            continue;
        }
        let Some(kanji) = store.get_kanji(&record.kanji_id)? else {
            tracing::warn!(kanji_id = %record.kanji_id, "Mastery record without kanji row");
            continue;
        };
        eligible.push((record, kanji));
    }

    eligible.sort_by(|(a, _), (b, _)| {
        a.mastery_level
            .cmp(&b.mastery_level)
            .then(a.last_tested_at.cmp(&b.last_tested_at))
    });

    Ok(eligible)
}
