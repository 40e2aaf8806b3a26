//! Database schema and migrations.
//!
//! Migrations are applied in order; `schema_version` records which ones
//! have already run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    display_name      TEXT NOT NULL,
    email             TEXT UNIQUE COLLATE NOCASE,   -- NULL once deleted
    password          TEXT NOT NULL,                -- Argon2 hash or '!' (unusable)
    description       TEXT NOT NULL DEFAULT '',
    mail_verified     INTEGER NOT NULL DEFAULT 0,
    unverified_email  TEXT,                         -- pending address change
    activation_key    TEXT NOT NULL DEFAULT '',
    key_expires_at    TEXT,
    is_active         INTEGER NOT NULL DEFAULT 1,
    is_staff          INTEGER NOT NULL DEFAULT 0,
    deleted           INTEGER NOT NULL DEFAULT 0,
    deleted_at        TEXT,
    created_at        TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_display_name ON users(display_name);
"#,
    // v2: groups and memberships
    r#"
CREATE TABLE groups (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE group_members (
    group_id    INTEGER NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    joined_at   TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (group_id, user_id)
);

CREATE INDEX idx_group_members_user_id ON group_members(user_id);
"#,
    // v3: conversations
    r#"
CREATE TABLE conversations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    type        INTEGER NOT NULL DEFAULT 0,    -- 0 = one on one, 1 = multichat
    topic       TEXT,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE conversation_participants (
    conversation_id  INTEGER NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    user_id          INTEGER NOT NULL REFERENCES users(id),
    PRIMARY KEY (conversation_id, user_id)
);

CREATE INDEX idx_conversation_participants_user_id ON conversation_participants(user_id);

CREATE TABLE conversation_messages (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id  INTEGER NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    author_id        INTEGER NOT NULL REFERENCES users(id),
    content          TEXT NOT NULL,
    created_at       TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_conversation_messages_conversation_id ON conversation_messages(conversation_id);
"#,
];
