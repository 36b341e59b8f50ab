//! SQL schema for the Quill SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Credentials issued by the identity provider. Never joined against
-- accounts: the two tables stand in for separate systems.
CREATE TABLE IF NOT EXISTS identities (
    identity_id   TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS accounts (
    id          TEXT PRIMARY KEY,  -- identity_id of the matching identity
    email       TEXT NOT NULL UNIQUE,
    username    TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- Author columns are copies taken at write time, not references.
CREATE TABLE IF NOT EXISTS posts (
    post_id          TEXT PRIMARY KEY,
    post_title       TEXT NOT NULL,
    post_category    TEXT NOT NULL,
    post_content     TEXT NOT NULL,
    author_id        TEXT NOT NULL,
    author_name      TEXT NOT NULL,
    author_username  TEXT NOT NULL,
    created_at       TEXT NOT NULL   -- fixed-width RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS comments (
    id                   TEXT PRIMARY KEY,
    comment_content      TEXT NOT NULL,
    post_id              TEXT NOT NULL REFERENCES posts(post_id),
    user_id              TEXT NOT NULL,
    comment_author_name  TEXT NOT NULL,
    created_at           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS posts_created_idx  ON posts(created_at);
CREATE INDEX IF NOT EXISTS posts_category_idx ON posts(post_category);
CREATE INDEX IF NOT EXISTS posts_author_idx   ON posts(author_name);
CREATE INDEX IF NOT EXISTS comments_post_idx  ON comments(post_id);

PRAGMA user_version = 1;
";
