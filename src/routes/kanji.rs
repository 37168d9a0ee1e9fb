use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::response::{created, ok, AppError};
use crate::srs::types::MasteryRecord;
use crate::state::AppState;
use crate::store::operations::groups::ReadingGroup;
use crate::store::operations::kanji::{ExampleWord, Kanji};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/import", post(import_content))
        .route("/:character", get(get_kanji))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KanjiImport {
    character: String,
    strokes: u32,
    grade: Option<u32>,
    freq_rank: Option<u32>,
    jlpt_level: Option<u8>,
    #[serde(default)]
    meanings: Vec<String>,
    #[serde(default)]
    onyomi: Vec<String>,
    #[serde(default)]
    kunyomi: Vec<String>,
    primary_onyomi: String,
    #[serde(default)]
    examples: Vec<ExampleWord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupImport {
    reading: String,
    usefulness_score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportRequest {
    #[serde(default)]
    kanji: Vec<KanjiImport>,
    #[serde(default)]
    groups: Vec<GroupImport>,
}

/// One-time content load. Re-importing an existing character keeps its id
/// so mastery records stay attached.
async fn import_content(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let mut kanji_count = 0usize;
    for item in req.kanji {
        let id = match state.store().get_kanji_by_character(&item.character)? {
            Some(existing) => existing.id,
            None => uuid::Uuid::new_v4().to_string(),
        };
        state.store().upsert_kanji(&Kanji {
            id,
            character: item.character,
            strokes: item.strokes,
            grade: item.grade,
            freq_rank: item.freq_rank,
            jlpt_level: item.jlpt_level,
            meanings: item.meanings,
            onyomi: item.onyomi,
            kunyomi: item.kunyomi,
            primary_onyomi: item.primary_onyomi,
            examples: item.examples,
        })?;
        kanji_count += 1;
    }

    let mut group_count = 0usize;
    for group in req.groups {
        state.store().upsert_group(&ReadingGroup {
            reading: group.reading,
            usefulness_score: group.usefulness_score,
        })?;
        group_count += 1;
    }

    tracing::info!(kanji_count, group_count, "Content import complete");

    Ok(created(serde_json::json!({
        "kanji": kanji_count,
        "groups": group_count,
    })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KanjiDetail {
    #[serde(flatten)]
    kanji: Kanji,
    progress: Option<MasteryRecord>,
}

async fn get_kanji(
    auth: AuthUser,
    Path(character): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let kanji = state
        .store()
        .get_kanji_by_character(&character)?
        .ok_or_else(|| AppError::not_found("Kanji not found"))?;

    let progress = state.store().get_record(&auth.user_id, &kanji.id)?;

    Ok(ok(KanjiDetail { kanji, progress }))
}
