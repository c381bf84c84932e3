//! SQL schema for the Forensica SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Analyses are written once and only ever removed by a full clear.
-- AUTOINCREMENT keeps ids from being reused after that clear.
CREATE TABLE IF NOT EXISTS analyses (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    modality      TEXT    NOT NULL,   -- 'photo' | 'video' | 'text' | 'audio'
    source        TEXT    NOT NULL,   -- 'HUMAN' | 'AI'
    score         INTEGER NOT NULL CHECK (score BETWEEN 0 AND 100),
    confidence    REAL    NOT NULL,
    justification TEXT    NOT NULL,
    created_at    TEXT    NOT NULL    -- RFC 3339 UTC, fixed width; server-assigned
);

-- analysis_id is not a foreign key: feedback may name an analysis that was
-- cleared or never existed.
CREATE TABLE IF NOT EXISTS feedback (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    analysis_id INTEGER NOT NULL,
    rating      INTEGER NOT NULL,
    is_correct  INTEGER NOT NULL      -- 0 | 1
);

CREATE INDEX IF NOT EXISTS analyses_modality_idx ON analyses(modality);
CREATE INDEX IF NOT EXISTS analyses_created_idx  ON analyses(created_at);
CREATE INDEX IF NOT EXISTS feedback_analysis_idx ON feedback(analysis_id);

PRAGMA user_version = 1;
";
