//! [`SqliteStore`] — the SQLite implementation of [`SubmissionStore`].
//!
//! Every write runs inside one IMMEDIATE transaction on the store's single
//! connection: the ledger row, its detail row, and the photo-quota
//! check-then-reserve commit or roll back together. Domain failures are
//! threaded out of the transaction closure as values, so the transaction
//! rolls back on drop and the caller still sees the structured error.

use std::path::Path;

use chrono::Utc;
use rusqlite::{
  OptionalExtension as _, TransactionBehavior, types::Value as SqlValue,
};
use uuid::Uuid;

use habitlog_core::{
  Result as CoreResult,
  approval::Approval,
  detail::HabitDetail,
  engine,
  habit::Habit,
  schema::{FieldKind, FieldValue, schema_for},
  store::{PhotoUsage, SubmissionQuery, SubmissionStore},
  submission::{Submission, SubmissionPatch, SubmissionView, YearMonth},
};

use crate::{
  Error, Result,
  encode::{
    RawSubmission, approval_columns, decode_time, detail_table, encode_date,
    encode_dt, encode_habit, encode_time, encode_uuid, month_bounds,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Tunables for the SQLite store.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
  /// Photo-bearing submissions allowed per (student, habit, month).
  pub photo_monthly_cap: u32,
}

impl Default for StoreOptions {
  fn default() -> Self {
    Self {
      photo_monthly_cap: 1,
    }
  }
}

/// A habitlog submission store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  options: StoreOptions,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(path, StoreOptions::default()).await
  }

  pub async fn open_with(
    path: impl AsRef<Path>,
    options: StoreOptions,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, options };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with(StoreOptions::default()).await
  }

  pub async fn open_in_memory_with(options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, options };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SQL helpers ─────────────────────────────────────────────────────────────

const SUBMISSION_COLUMNS: &str = "submission_id, student_id, habit, date, \
   primary_time, photo, note, status, approver_id, decided_at, \
   rejection_reason, created_at, updated_at";

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSubmission> {
  Ok(RawSubmission {
    submission_id:    row.get(0)?,
    student_id:       row.get(1)?,
    habit:            row.get(2)?,
    date:             row.get(3)?,
    primary_time:     row.get(4)?,
    photo:            row.get(5)?,
    note:             row.get(6)?,
    status:           row.get(7)?,
    approver_id:      row.get(8)?,
    decided_at:       row.get(9)?,
    rejection_reason: row.get(10)?,
    created_at:       row.get(11)?,
    updated_at:       row.get(12)?,
  })
}

fn submission_by_id(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawSubmission>> {
  conn
    .query_row(
      &format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE submission_id = ?1"
      ),
      rusqlite::params![id],
      row_to_raw,
    )
    .optional()
}

fn submission_by_key(
  conn: &rusqlite::Connection,
  student: &str,
  habit: &str,
  date: &str,
) -> rusqlite::Result<Option<RawSubmission>> {
  conn
    .query_row(
      &format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions
         WHERE student_id = ?1 AND habit = ?2 AND date = ?3"
      ),
      rusqlite::params![student, habit, date],
      row_to_raw,
    )
    .optional()
}

fn insert_submission(
  conn: &rusqlite::Connection,
  s: &Submission,
) -> rusqlite::Result<()> {
  let (status, approver, decided, reason) = approval_columns(&s.approval);
  conn.execute(
    "INSERT INTO submissions (
       submission_id, student_id, habit, date, primary_time, photo, note,
       status, approver_id, decided_at, rejection_reason,
       created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    rusqlite::params![
      encode_uuid(s.submission_id),
      encode_uuid(s.student_id),
      encode_habit(s.habit),
      encode_date(s.date),
      s.primary_time.map(encode_time),
      s.photo.as_ref().map(|p| p.0.as_str()),
      s.note.as_deref(),
      status,
      approver,
      decided,
      reason,
      encode_dt(s.created_at),
      encode_dt(s.updated_at),
    ],
  )?;
  Ok(())
}

fn update_submission(
  conn: &rusqlite::Connection,
  s: &Submission,
) -> rusqlite::Result<()> {
  let (status, approver, decided, reason) = approval_columns(&s.approval);
  conn.execute(
    "UPDATE submissions SET
       primary_time = ?2, photo = ?3, note = ?4,
       status = ?5, approver_id = ?6, decided_at = ?7, rejection_reason = ?8,
       updated_at = ?9
     WHERE submission_id = ?1",
    rusqlite::params![
      encode_uuid(s.submission_id),
      s.primary_time.map(encode_time),
      s.photo.as_ref().map(|p| p.0.as_str()),
      s.note.as_deref(),
      status,
      approver,
      decided,
      reason,
      encode_dt(s.updated_at),
    ],
  )?;
  Ok(())
}

fn insert_detail(
  conn: &rusqlite::Connection,
  submission_id: &str,
  habit: Habit,
) -> rusqlite::Result<()> {
  // Column defaults produce the all-unset detail row.
  conn.execute(
    &format!(
      "INSERT INTO {} (submission_id) VALUES (?1)",
      detail_table(habit)
    ),
    rusqlite::params![submission_id],
  )?;
  Ok(())
}

/// Raw column values of one detail row, aligned with the schema's fields.
enum RawField {
  Flag(bool),
  Text(Option<String>),
}

fn read_detail(
  conn: &rusqlite::Connection,
  habit: Habit,
  submission_id: &str,
) -> std::result::Result<HabitDetail, tokio_rusqlite::Error> {
  let schema = schema_for(habit);
  let columns: Vec<&str> = schema.fields.iter().map(|f| f.name).collect();
  let sql = format!(
    "SELECT {} FROM {} WHERE submission_id = ?1",
    columns.join(", "),
    detail_table(habit)
  );

  let values = conn
    .query_row(&sql, rusqlite::params![submission_id], |row| {
      let mut values = Vec::with_capacity(schema.fields.len());
      for (i, spec) in schema.fields.iter().enumerate() {
        values.push(match spec.kind {
          FieldKind::Bool => RawField::Flag(row.get(i)?),
          FieldKind::Enum(_) | FieldKind::Time => RawField::Text(row.get(i)?),
        });
      }
      Ok(values)
    })
    .optional()?;

  let Some(values) = values else {
    return Err(other(Error::Decode(format!(
      "missing detail row for submission {submission_id}"
    ))));
  };

  let mut detail = HabitDetail::empty(habit);
  for (spec, value) in schema.fields.iter().zip(values) {
    let field_value = match (spec.kind, value) {
      (FieldKind::Bool, RawField::Flag(b)) => FieldValue::Bool(b),
      (FieldKind::Enum(_), RawField::Text(Some(s))) => FieldValue::Choice(s),
      (FieldKind::Time, RawField::Text(Some(s))) => {
        FieldValue::Time(decode_time(&s).map_err(other)?)
      }
      (_, RawField::Text(None)) => continue,
      _ => {
        return Err(other(Error::Decode(format!(
          "column {} does not match its declared kind",
          spec.name
        ))));
      }
    };
    detail
      .set(spec.name, &field_value)
      .map_err(|e| other(Error::Decode(e.to_string())))?;
  }
  Ok(detail)
}

fn write_detail(
  conn: &rusqlite::Connection,
  submission_id: &str,
  detail: &HabitDetail,
) -> rusqlite::Result<()> {
  let habit = detail.habit();
  let schema = schema_for(habit);
  let mut assignments = Vec::with_capacity(schema.fields.len());
  let mut params: Vec<SqlValue> =
    vec![SqlValue::Text(submission_id.to_string())];

  for spec in schema.fields {
    params.push(match detail.get(spec.name) {
      Some(FieldValue::Bool(b)) => SqlValue::Integer(i64::from(b)),
      Some(FieldValue::Choice(s)) => SqlValue::Text(s),
      Some(FieldValue::Time(t)) => SqlValue::Text(encode_time(t)),
      None => SqlValue::Null,
    });
    assignments.push(format!("{} = ?{}", spec.name, params.len()));
  }

  let sql = format!(
    "UPDATE {} SET {} WHERE submission_id = ?1",
    detail_table(habit),
    assignments.join(", ")
  );
  conn.execute(&sql, rusqlite::params_from_iter(params))?;
  Ok(())
}

fn count_month_photos(
  conn: &rusqlite::Connection,
  student: &str,
  habit: &str,
  start: &str,
  end: &str,
) -> rusqlite::Result<u32> {
  conn.query_row(
    "SELECT COUNT(*) FROM submissions
     WHERE student_id = ?1 AND habit = ?2
       AND date >= ?3 AND date < ?4
       AND photo IS NOT NULL",
    rusqlite::params![student, habit, start, end],
    |row| row.get(0),
  )
}

/// Carry a backend error through the `tokio_rusqlite` closure boundary.
fn other(e: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

/// Fold a connection-level failure into the core taxonomy.
fn db_err(e: tokio_rusqlite::Error) -> habitlog_core::Error {
  Error::Database(e).into()
}

// ─── SubmissionStore impl ────────────────────────────────────────────────────

impl SubmissionStore for SqliteStore {
  async fn submit(
    &self,
    patch: SubmissionPatch,
  ) -> CoreResult<SubmissionView> {
    // Validation runs before the transaction: a bad payload never creates
    // or touches a row.
    let field_patch = engine::validate_fields(patch.habit, &patch.fields)?;

    let SubmissionPatch {
      student_id,
      habit,
      date,
      note,
      photo,
      ..
    } = patch;

    let now = Utc::now();
    let new_id = Uuid::new_v4();
    let cap = self.options.photo_monthly_cap;
    let month = YearMonth::of(date);
    let (month_start, month_end) = month_bounds(month);
    let student_str = encode_uuid(student_id);
    let habit_str = encode_habit(habit);
    let date_str = encode_date(date);

    let nested: CoreResult<(Submission, HabitDetail, Vec<&'static str>, bool)> =
      self
        .conn
        .call(move |conn| {
          let tx =
            conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

          let existing =
            submission_by_key(&tx, &student_str, habit_str, &date_str)?;
          let (mut submission, mut detail, created) = match existing {
            Some(raw) => {
              let submission = raw.into_submission().map_err(other)?;
              let detail = read_detail(
                &tx,
                habit,
                &encode_uuid(submission.submission_id),
              )?;
              (submission, detail, false)
            }
            None => {
              let submission = Submission {
                submission_id: new_id,
                student_id,
                habit,
                date,
                primary_time: None,
                photo: None,
                note: None,
                approval: Approval::Pending,
                created_at: now,
                updated_at: now,
              };
              insert_submission(&tx, &submission)?;
              insert_detail(&tx, &encode_uuid(new_id), habit)?;
              (submission, HabitDetail::empty(habit), true)
            }
          };

          let outcome = match engine::merge(
            &mut submission,
            &mut detail,
            &field_patch,
            note.as_deref(),
          ) {
            Ok(outcome) => outcome,
            Err(e) => return Ok(Err(e)),
          };

          if let Some(photo) = photo {
            if submission.photo.is_some() {
              return Ok(Err(habitlog_core::Error::PhotoAlreadySet(
                submission.submission_id,
              )));
            }
            let used = count_month_photos(
              &tx,
              &student_str,
              habit_str,
              &month_start,
              &month_end,
            )?;
            if used >= cap {
              return Ok(Err(habitlog_core::Error::PhotoQuotaExceeded {
                habit,
                month,
                cap,
              }));
            }
            submission.photo = Some(photo);
          }

          submission.updated_at = now;
          update_submission(&tx, &submission)?;
          write_detail(
            &tx,
            &encode_uuid(submission.submission_id),
            &detail,
          )?;
          tx.commit()?;

          Ok(Ok((submission, detail, outcome.skipped, created)))
        })
        .await
        .map_err(db_err)?;

    let (submission, detail, skipped, created) = nested?;
    if created {
      tracing::info!(
        submission = %submission.submission_id,
        habit = %submission.habit,
        date = %submission.date,
        "created submission"
      );
    }
    if !skipped.is_empty() {
      tracing::debug!(
        submission = %submission.submission_id,
        fields = ?skipped,
        "skipped write-once fields"
      );
    }
    Ok(SubmissionView::assemble(&submission, &detail))
  }

  async fn approve(
    &self,
    submission_id: Uuid,
    approver_id: Uuid,
  ) -> CoreResult<SubmissionView> {
    let decided_at = Utc::now();
    let id_str = encode_uuid(submission_id);

    let nested: CoreResult<(Submission, HabitDetail)> = self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(raw) = submission_by_id(&tx, &id_str)? else {
          return Ok(Err(habitlog_core::Error::SubmissionNotFound(
            submission_id,
          )));
        };
        let mut submission = raw.into_submission().map_err(other)?;

        submission.approval =
          match submission.approval.approve(approver_id, decided_at) {
            Ok(approval) => approval,
            Err(e) => return Ok(Err(e)),
          };
        submission.updated_at = decided_at;

        update_submission(&tx, &submission)?;
        let detail = read_detail(&tx, submission.habit, &id_str)?;
        tx.commit()?;
        Ok(Ok((submission, detail)))
      })
      .await
      .map_err(db_err)?;

    let (submission, detail) = nested?;
    tracing::info!(submission = %submission.submission_id, "submission approved");
    Ok(SubmissionView::assemble(&submission, &detail))
  }

  async fn reject(
    &self,
    submission_id: Uuid,
    approver_id: Uuid,
    reason: String,
  ) -> CoreResult<SubmissionView> {
    let decided_at = Utc::now();
    let id_str = encode_uuid(submission_id);

    let nested: CoreResult<(Submission, HabitDetail)> = self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(raw) = submission_by_id(&tx, &id_str)? else {
          return Ok(Err(habitlog_core::Error::SubmissionNotFound(
            submission_id,
          )));
        };
        let mut submission = raw.into_submission().map_err(other)?;

        submission.approval =
          match submission.approval.reject(approver_id, &reason, decided_at) {
            Ok(approval) => approval,
            Err(e) => return Ok(Err(e)),
          };
        submission.updated_at = decided_at;

        update_submission(&tx, &submission)?;
        let detail = read_detail(&tx, submission.habit, &id_str)?;
        tx.commit()?;
        Ok(Ok((submission, detail)))
      })
      .await
      .map_err(db_err)?;

    let (submission, detail) = nested?;
    tracing::info!(submission = %submission.submission_id, "submission rejected");
    Ok(SubmissionView::assemble(&submission, &detail))
  }

  async fn get_submission(
    &self,
    submission_id: Uuid,
  ) -> CoreResult<Option<SubmissionView>> {
    let id_str = encode_uuid(submission_id);

    let pair: Option<(Submission, HabitDetail)> = self
      .conn
      .call(move |conn| {
        let Some(raw) = submission_by_id(conn, &id_str)? else {
          return Ok(None);
        };
        let submission = raw.into_submission().map_err(other)?;
        let detail = read_detail(conn, submission.habit, &id_str)?;
        Ok(Some((submission, detail)))
      })
      .await
      .map_err(db_err)?;

    Ok(pair.map(|(s, d)| SubmissionView::assemble(&s, &d)))
  }

  async fn list_submissions(
    &self,
    query: &SubmissionQuery,
  ) -> CoreResult<Vec<SubmissionView>> {
    let student_str = encode_uuid(query.student_id);
    let habit_str = query.habit.map(encode_habit);
    let bounds = query.month.map(month_bounds);

    let pairs: Vec<(Submission, HabitDetail)> = self
      .conn
      .call(move |conn| {
        let mut sql = format!(
          "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE student_id = ?1"
        );
        let mut params: Vec<SqlValue> = vec![SqlValue::Text(student_str)];
        if let Some(habit) = habit_str {
          params.push(SqlValue::Text(habit.to_string()));
          sql.push_str(&format!(" AND habit = ?{}", params.len()));
        }
        if let Some((start, end)) = bounds {
          params.push(SqlValue::Text(start));
          sql.push_str(&format!(" AND date >= ?{}", params.len()));
          params.push(SqlValue::Text(end));
          sql.push_str(&format!(" AND date < ?{}", params.len()));
        }
        sql.push_str(" ORDER BY date, habit");

        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(rusqlite::params_from_iter(params), row_to_raw)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        drop(stmt);

        let mut pairs = Vec::with_capacity(raws.len());
        for raw in raws {
          let submission = raw.into_submission().map_err(other)?;
          let detail = read_detail(
            conn,
            submission.habit,
            &encode_uuid(submission.submission_id),
          )?;
          pairs.push((submission, detail));
        }
        Ok(pairs)
      })
      .await
      .map_err(db_err)?;

    Ok(
      pairs
        .iter()
        .map(|(s, d)| SubmissionView::assemble(s, d))
        .collect(),
    )
  }

  async fn photo_usage(
    &self,
    student_id: Uuid,
    habit: Habit,
    month: YearMonth,
  ) -> CoreResult<PhotoUsage> {
    let student_str = encode_uuid(student_id);
    let habit_str = encode_habit(habit);
    let (start, end) = month_bounds(month);
    let cap = self.options.photo_monthly_cap;

    let used = self
      .conn
      .call(move |conn| {
        Ok(count_month_photos(conn, &student_str, habit_str, &start, &end)?)
      })
      .await
      .map_err(db_err)?;

    Ok(PhotoUsage { used, cap })
  }
}
