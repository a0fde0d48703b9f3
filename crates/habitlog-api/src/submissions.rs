//! Handlers for `/submissions` and `/photo-usage`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/submissions` | Body: [`SubmitBody`]; one partial update (auto-save) |
//! | `GET`  | `/submissions` | `?student_id` required; optional `habit`, `month=YYYY-MM` |
//! | `GET`  | `/submissions/:id` | Single labeled view; 404 if unknown |
//! | `POST` | `/submissions/:id/approve` | Body: `{"approver_id":"..."}` |
//! | `POST` | `/submissions/:id/reject` | Body: `{"approver_id":"...","reason":"..."}` |
//! | `GET`  | `/photo-usage` | `?student_id&habit&month`; monthly quota indicator |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::NaiveDate;
use habitlog_core::{
  Error as CoreError,
  habit::Habit,
  store::{PhotoUsage, SubmissionQuery, SubmissionStore},
  submission::{PhotoRef, SubmissionPatch, SubmissionView},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Submit ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /submissions`.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub student_id: Uuid,
  /// Habit identifier, e.g. `"wake_up"`. Unknown values are rejected.
  pub habit:      String,
  pub date:       NaiveDate,
  pub note:       Option<String>,
  pub photo:      Option<PhotoRef>,
  /// Raw field values keyed by schema field name. Unknown keys are
  /// rejected, not dropped.
  #[serde(default)]
  pub fields:     BTreeMap<String, serde_json::Value>,
}

/// `POST /submissions` — returns the reconciled view after the merge.
pub async fn submit<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<SubmitBody>,
) -> Result<Json<SubmissionView>, ApiError>
where
  S: SubmissionStore,
{
  let habit: Habit = body.habit.parse()?;
  let view = store
    .submit(SubmissionPatch {
      student_id: body.student_id,
      habit,
      date: body.date,
      note: body.note,
      photo: body.photo,
      fields: body.fields,
    })
    .await?;
  Ok(Json(view))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub student_id: Uuid,
  pub habit:      Option<String>,
  /// Calendar month filter, `YYYY-MM`.
  pub month:      Option<String>,
}

/// `GET /submissions?student_id=<id>[&habit=...][&month=YYYY-MM]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<SubmissionView>>, ApiError>
where
  S: SubmissionStore,
{
  let query = SubmissionQuery {
    student_id: params.student_id,
    habit:      params
      .habit
      .as_deref()
      .map(|s| s.parse::<Habit>())
      .transpose()?,
    month:      params
      .month
      .as_deref()
      .map(str::parse)
      .transpose()?,
  };
  let views = store.list_submissions(&query).await?;
  Ok(Json(views))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /submissions/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SubmissionView>, ApiError>
where
  S: SubmissionStore,
{
  let view = store
    .get_submission(id)
    .await?
    .ok_or(ApiError(CoreError::SubmissionNotFound(id)))?;
  Ok(Json(view))
}

// ─── Approve / reject ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ApproveBody {
  pub approver_id: Uuid,
}

/// `POST /submissions/:id/approve`
pub async fn approve<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ApproveBody>,
) -> Result<Json<SubmissionView>, ApiError>
where
  S: SubmissionStore,
{
  let view = store.approve(id, body.approver_id).await?;
  Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
  pub approver_id: Uuid,
  pub reason:      String,
}

/// `POST /submissions/:id/reject`
pub async fn reject<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RejectBody>,
) -> Result<Json<SubmissionView>, ApiError>
where
  S: SubmissionStore,
{
  let view = store.reject(id, body.approver_id, body.reason).await?;
  Ok(Json(view))
}

// ─── Photo usage ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UsageParams {
  pub student_id: Uuid,
  pub habit:      String,
  /// Calendar month, `YYYY-MM`.
  pub month:      String,
}

/// `GET /photo-usage?student_id=<id>&habit=<habit>&month=YYYY-MM`
pub async fn photo_usage<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<UsageParams>,
) -> Result<Json<PhotoUsage>, ApiError>
where
  S: SubmissionStore,
{
  let habit: Habit = params.habit.parse()?;
  let month = params.month.parse()?;
  let usage = store.photo_usage(params.student_id, habit, month).await?;
  Ok(Json(usage))
}
