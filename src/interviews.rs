use axum::{
    extract::{Extension, Path},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Row};
use tracing::error;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extractor::AuthUser;
use crate::ledger::{self, ConsumeOutcome};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: i32,
    pub interview_id: Uuid,
    pub owner_id: i32,
    pub job_position: String,
    pub job_description: String,
    pub duration: String,
    pub interview_types: Value,
    pub questions: Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateInterviewRequest {
    pub job_position: String,
    pub job_description: String,
    pub duration: String,
    #[serde(default)]
    pub interview_types: Vec<String>,
    /// Question list produced by the external generation service; stored
    /// verbatim for the candidate session.
    #[serde(default)]
    pub questions: Value,
}

#[derive(Serialize)]
pub struct CreateInterviewResponse {
    pub interview_id: Uuid,
    pub remaining_credits: i32,
}

/// Creates an interview and spends one credit. The debit and the insert run
/// in one transaction, so a failed insert never costs a credit and two
/// requests racing on the last credit produce exactly one interview.
pub async fn create_interview(
    Extension(pool): Extension<PgPool>,
    AuthUser { user_id, .. }: AuthUser,
    Json(payload): Json<CreateInterviewRequest>,
) -> AppResult<Json<CreateInterviewResponse>> {
    if payload.job_position.trim().is_empty() {
        return Err(AppError::BadRequest("Job position required".into()));
    }

    let mut tx = pool.begin().await.map_err(|e| {
        error!(?e, "DB error opening transaction");
        AppError::Db(e)
    })?;

    let remaining = match ledger::consume_credit(&mut *tx, user_id).await.map_err(|e| {
        error!(?e, "DB error consuming credit");
        AppError::Db(e)
    })? {
        ConsumeOutcome::Consumed { remaining } => remaining,
        ConsumeOutcome::InsufficientCredit => {
            return Err(AppError::InsufficientCredit);
        }
    };

    let interview_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO interviews \
             (interview_id, owner_id, job_position, job_description, duration, interview_types, questions, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, 'scheduled')",
    )
    .bind(interview_id)
    .bind(user_id)
    .bind(payload.job_position.trim())
    .bind(&payload.job_description)
    .bind(&payload.duration)
    .bind(serde_json::json!(payload.interview_types))
    .bind(&payload.questions)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(?e, "DB error inserting interview");
        AppError::Db(e)
    })?;

    tx.commit().await.map_err(|e| {
        error!(?e, "DB error committing interview");
        AppError::Db(e)
    })?;

    Ok(Json(CreateInterviewResponse {
        interview_id,
        remaining_credits: remaining,
    }))
}

pub async fn list_interviews(
    Extension(pool): Extension<PgPool>,
    AuthUser { user_id, .. }: AuthUser,
) -> AppResult<Json<Vec<Interview>>> {
    let interviews = sqlx::query_as::<_, Interview>(
        "SELECT * FROM interviews WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        error!(?e, "DB error listing interviews");
        AppError::Db(e)
    })?;
    Ok(Json(interviews))
}

/// What a candidate joining through the share link is allowed to see.
#[derive(Serialize)]
pub struct InterviewJoinInfo {
    pub interview_id: Uuid,
    pub job_position: String,
    pub duration: String,
    pub interview_types: Value,
    pub questions: Value,
    pub status: String,
}

pub async fn get_interview(
    Extension(pool): Extension<PgPool>,
    Path(interview_id): Path<Uuid>,
) -> AppResult<Json<InterviewJoinInfo>> {
    let rec = sqlx::query(
        "SELECT interview_id, job_position, duration, interview_types, questions, status \
         FROM interviews WHERE interview_id = $1",
    )
    .bind(interview_id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        error!(?e, "DB error fetching interview");
        AppError::Db(e)
    })?;
    let rec = rec.ok_or(AppError::NotFound)?;
    Ok(Json(InterviewJoinInfo {
        interview_id: rec.get("interview_id"),
        job_position: rec.get("job_position"),
        duration: rec.get("duration"),
        interview_types: rec.get("interview_types"),
        questions: rec.get("questions"),
        status: rec.get("status"),
    }))
}
