//! SQL schema for the Savory SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,   -- natural key; at most one row per email
    picture     TEXT NOT NULL DEFAULT '',
    role        TEXT NOT NULL,          -- 'GUEST' | 'MEMBER'
    created_at  TEXT NOT NULL,          -- RFC 3339 UTC, fixed precision
    modified_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    post_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    writer      TEXT NOT NULL CHECK (length(writer) BETWEEN 1 AND 10),
    title       TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 100),
    content     TEXT NOT NULL CHECK (length(content) >= 1),
    owner_id    INTEGER REFERENCES users(user_id),
    created_at  TEXT NOT NULL,
    modified_at TEXT NOT NULL,
    CHECK (modified_at >= created_at)
);

CREATE INDEX IF NOT EXISTS posts_created_idx ON posts(created_at, post_id);
CREATE INDEX IF NOT EXISTS posts_owner_idx   ON posts(owner_id);

PRAGMA user_version = 1;
";
