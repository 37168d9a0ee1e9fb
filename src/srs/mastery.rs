use chrono::{DateTime, Utc};

use crate::srs::types::{MasteryLevel, MasteryRecord};

pub const STREAK_FLOOR: i32 = -3;
pub const STREAK_CEILING: i32 = 7;

/// Apply one graded review answer to a record.
///
/// Pure: the next record is a function of the current record and the
/// answer alone. The streak is clamped to [-3, 7] before the transition
/// table runs, and `last_tested_at` is always stamped.
pub fn apply_review_result(
    record: &MasteryRecord,
    is_correct: bool,
    now: DateTime<Utc>,
) -> MasteryRecord {
    let raw = if is_correct {
        record.test_streak + 1
    } else {
        record.test_streak - 1
    };
    let mut streak = raw.clamp(STREAK_FLOOR, STREAK_CEILING);
    let mut level = record.mastery_level;

    if level == MasteryLevel::Learning && streak >= STREAK_CEILING {
        // Learning -> Known
        level = MasteryLevel::Known;
        streak = 0;
    } else if level == MasteryLevel::Learning && streak <= STREAK_FLOOR {
        // Learning -> Unlearned
        level = MasteryLevel::Unlearned;
        streak = 0;
    } else if level == MasteryLevel::Known && streak >= STREAK_CEILING {
        // Known at ceiling: pinned, the record is now "trusted"
        streak = STREAK_CEILING;
    } else if level == MasteryLevel::Known && streak <= STREAK_FLOOR {
        // Known -> Learning
        level = MasteryLevel::Learning;
        streak = 0;
    }

    MasteryRecord {
        mastery_level: level,
        test_streak: streak,
        last_tested_at: now,
        ..record.clone()
    }
}

/// Apply one discovery answer.
///
/// Only an Unlearned record can change: a correct answer promotes it to
/// Learning with streak 1, a wrong answer leaves it untouched (no
/// penalty). Records already at Learning/Known are returned unchanged so
/// a duplicate discovery submit cannot clobber review progress.
pub fn apply_discovery_result(
    record: &MasteryRecord,
    is_correct: bool,
    now: DateTime<Utc>,
) -> MasteryRecord {
    if record.mastery_level != MasteryLevel::Unlearned || !is_correct {
        return record.clone();
    }

    MasteryRecord {
        mastery_level: MasteryLevel::Learning,
        test_streak: 1,
        last_tested_at: now,
        ..record.clone()
    }
}
