use crate::srs::types::{GroupScore, GroupStats};

/// Groups at or above this completion never get recommended.
pub const COMPLETION_CUTOFF_PCT: f64 = 95.0;

/// Completion dominates usefulness by a factor of 100 in the priority
/// formula: a partially-studied group always beats an untouched one, and
/// usefulness only breaks near-ties.
pub fn score_group(stats: &GroupStats) -> Option<GroupScore> {
    if stats.total == 0 {
        return None;
    }

    let points = (stats.mastered * 2 + stats.learning) as f64;
    let max_points = (stats.total * 2) as f64;
    let completion_pct = points / max_points * 100.0;

    let priority_score = if completion_pct >= COMPLETION_CUTOFF_PCT {
        0.0
    } else {
        completion_pct * 10.0 + stats.usefulness_score * 0.1
    };

    Some(GroupScore {
        reading: stats.reading.clone(),
        usefulness_score: stats.usefulness_score,
        priority_score,
        completion_pct,
    })
}

/// The single best group to study next, or None when nothing has positive
/// priority (all groups finished, empty, or worthless). Ties go to the
/// higher usefulness score so the result is independent of input order.
pub fn next_group(stats: &[GroupStats]) -> Option<GroupScore> {
    stats
        .iter()
        .filter_map(score_group)
        .filter(|score| score.priority_score > 0.0)
        .max_by(|a, b| {
            a.priority_score
                .total_cmp(&b.priority_score)
                .then(a.usefulness_score.total_cmp(&b.usefulness_score))
        })
}

/// Top-N scored groups for the dashboard, best first.
pub fn rank_groups(stats: &[GroupStats], count: usize) -> Vec<GroupScore> {
    let mut scored: Vec<GroupScore> = stats.iter().filter_map(score_group).collect();
    scored.sort_by(|a, b| {
        b.priority_score
            .total_cmp(&a.priority_score)
            .then(b.usefulness_score.total_cmp(&a.usefulness_score))
    });
    scored.truncate(count);
    scored
}
