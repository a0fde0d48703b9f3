//! SQL schema for the habitlog SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated
//! on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The detail tables mirror the field registry in `habitlog_core::schema`:
/// one table per habit category, one column per detail field, keyed 1:1 by
/// submission. Checklist fields are INTEGER 0/1 with a 0 default; enum and
/// time fields are nullable TEXT. The store's read/write SQL is generated
/// from the registry, so a column added here must be added there too (the
/// round-trip test in `tests.rs` catches drift).
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS submissions (
    submission_id    TEXT PRIMARY KEY,
    student_id       TEXT NOT NULL,
    habit            TEXT NOT NULL,   -- stable habit identifier, e.g. 'wake_up'
    date             TEXT NOT NULL,   -- ISO 8601 calendar date
    primary_time     TEXT,            -- HH:MM:SS
    photo            TEXT,            -- opaque storage reference
    note             TEXT,
    status           TEXT NOT NULL DEFAULT 'pending',
    approver_id      TEXT,
    decided_at       TEXT,            -- ISO 8601 UTC
    rejection_reason TEXT,            -- non-null iff status = 'rejected'
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    UNIQUE (student_id, habit, date)
);

CREATE TABLE IF NOT EXISTS wake_up_details (
    submission_id TEXT PRIMARY KEY REFERENCES submissions(submission_id),
    made_bed      INTEGER NOT NULL DEFAULT 0,
    tidied_room   INTEGER NOT NULL DEFAULT 0,
    bathed        INTEGER NOT NULL DEFAULT 0,
    had_breakfast INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS exercise_details (
    submission_id TEXT PRIMARY KEY REFERENCES submissions(submission_id),
    activity      TEXT,
    stretched     INTEGER NOT NULL DEFAULT 0,
    broke_sweat   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS worship_details (
    submission_id         TEXT PRIMARY KEY REFERENCES submissions(submission_id),
    fajr                  INTEGER NOT NULL DEFAULT 0,
    dhuhr                 INTEGER NOT NULL DEFAULT 0,
    asr                   INTEGER NOT NULL DEFAULT 0,
    maghrib               INTEGER NOT NULL DEFAULT 0,
    isha                  INTEGER NOT NULL DEFAULT 0,
    read_quran            INTEGER NOT NULL DEFAULT 0,
    morning_dhikr         INTEGER NOT NULL DEFAULT 0,
    evening_dhikr         INTEGER NOT NULL DEFAULT 0,
    attended_study_circle INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS study_details (
    submission_id        TEXT PRIMARY KEY REFERENCES submissions(submission_id),
    did_homework         INTEGER NOT NULL DEFAULT 0,
    revised_lessons      INTEGER NOT NULL DEFAULT 0,
    read_book            INTEGER NOT NULL DEFAULT 0,
    memorised_vocabulary INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS nutrition_details (
    submission_id     TEXT PRIMARY KEY REFERENCES submissions(submission_id),
    breakfast         TEXT,
    lunch             TEXT,
    dinner            TEXT,
    avoided_junk_food INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS community_details (
    submission_id   TEXT PRIMARY KEY REFERENCES submissions(submission_id),
    kind            TEXT,
    helped_at_home  INTEGER NOT NULL DEFAULT 0,
    helped_neighbor INTEGER NOT NULL DEFAULT 0,
    group_activity  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS sleep_early_details (
    submission_id  TEXT PRIMARY KEY REFERENCES submissions(submission_id),
    brushed_teeth  INTEGER NOT NULL DEFAULT 0,
    bedtime_prayer INTEGER NOT NULL DEFAULT 0,
    screen_free    INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS submissions_student_idx
    ON submissions(student_id, habit, date);
CREATE INDEX IF NOT EXISTS submissions_photo_idx
    ON submissions(student_id, habit)
    WHERE photo IS NOT NULL;

PRAGMA user_version = 1;
";
