use std::collections::HashMap;

use crate::srs::types::{DiscoveryCandidate, Track};
use crate::store::operations::kanji::Kanji;

/// What a user already holds in one reading group.
#[derive(Debug, Clone, Default)]
pub struct PeerContext {
    /// At least one member is at Learning or Known.
    pub has_foothold: bool,
    /// Characters of members at Known level, used as hint context.
    pub known_characters: Vec<String>,
}

/// Select unlearned kanji a user may discover next.
///
/// `unlearned` must already be scoped to the track (for jlpt: the user's
/// current level) and to items at mastery level 0, including items with no
/// record at all. Groups in which the user has no foothold (no member at
/// level >= 1) are dropped entirely: a new item is only ever introduced
/// through a reading the user can anchor it to.
///
/// Ordering: the stat track sorts by group usefulness descending; the
/// jlpt track keeps natural retrieval order, the level scope already being
/// its ordering principle.
pub fn discovery_candidates(
    unlearned: &[Kanji],
    peers: &HashMap<String, PeerContext>,
    usefulness_by_reading: &HashMap<String, f64>,
    track: Track,
    limit: usize,
) -> Vec<DiscoveryCandidate> {
    let mut candidates: Vec<DiscoveryCandidate> = unlearned
        .iter()
        .filter_map(|kanji| {
            let context = peers.get(&kanji.primary_onyomi)?;
            if !context.has_foothold {
                return None;
            }
            Some(DiscoveryCandidate {
                kanji_id: kanji.id.clone(),
                character: kanji.character.clone(),
                reading: kanji.primary_onyomi.clone(),
                jlpt_level: kanji.jlpt_level,
                known_peers: context.known_characters.clone(),
                usefulness_score: usefulness_by_reading
                    .get(&kanji.primary_onyomi)
                    .copied()
                    .unwrap_or(0.0),
            })
        })
        .collect();

    if track == Track::Stat {
        candidates.sort_by(|a, b| b.usefulness_score.total_cmp(&a.usefulness_score));
    }

    candidates.truncate(limit);
    candidates
}
