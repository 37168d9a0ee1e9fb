use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::cache::QueryKind;
use crate::response::{ok, AppError};
use crate::srs::types::MasteryLevel;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_groups))
        .route("/:reading", get(group_detail))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupListEntry {
    reading: String,
    usefulness_score: f64,
    total: usize,
    mastered: usize,
    learning: usize,
    unlearned: usize,
}

/// Group listing with per-user progress, scoped by the user's track.
/// Cached per user with a short TTL; every record or track mutation
/// invalidates it.
async fn list_groups(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if let Some(cached) = state.cache().get(&auth.user_id, QueryKind::Groups).await {
        return Ok(ok(cached));
    }

    let listing: Vec<GroupListEntry> = state
        .srs()
        .group_listing(&auth.user_id)?
        .into_iter()
        .map(|stats| GroupListEntry {
            unlearned: stats.unlearned(),
            reading: stats.reading,
            usefulness_score: stats.usefulness_score,
            total: stats.total,
            mastered: stats.mastered,
            learning: stats.learning,
        })
        .collect();

    let value = serde_json::to_value(&listing)
        .map_err(|e| AppError::internal(&format!("serialize group listing: {e}")))?;
    state
        .cache()
        .put(&auth.user_id, QueryKind::Groups, value.clone())
        .await;

    Ok(ok(value))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupMember {
    id: String,
    character: String,
    strokes: u32,
    jlpt_level: Option<u8>,
    meanings: Vec<String>,
    mastery_level: MasteryLevel,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupDetail {
    reading: String,
    usefulness_score: f64,
    total: usize,
    mastered: usize,
    learning: usize,
    unlearned: usize,
    members: Vec<GroupMember>,
}

async fn group_detail(
    auth: AuthUser,
    Path(reading): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let group = state
        .store()
        .get_group(&reading)?
        .ok_or_else(|| AppError::not_found("Reading group not found"))?;

    let mut members = Vec::new();
    let mut mastered = 0usize;
    let mut learning = 0usize;
    for kanji in state.store().list_kanji_in_group(&group.reading)? {
        let level = state
            .store()
            .get_record(&auth.user_id, &kanji.id)?
            .map(|r| r.mastery_level)
            .unwrap_or(MasteryLevel::Unlearned);
        match level {
            MasteryLevel::Known => mastered += 1,
            MasteryLevel::Learning => learning += 1,
            MasteryLevel::Unlearned => {}
        }
        members.push(GroupMember {
            id: kanji.id,
            character: kanji.character,
            strokes: kanji.strokes,
            jlpt_level: kanji.jlpt_level,
            meanings: kanji.meanings,
            mastery_level: level,
        });
    }

    let total = members.len();
    Ok(ok(GroupDetail {
        reading: group.reading,
        usefulness_score: group.usefulness_score,
        total,
        mastered,
        learning,
        unlearned: total.saturating_sub(mastered + learning),
        members,
    }))
}
