//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Polls table; one row per entity group
CREATE TABLE IF NOT EXISTS polls (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    owner TEXT NOT NULL,
    option_count INTEGER NOT NULL,
    total_votes INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- Poll options, numbered 1..N within a poll
CREATE TABLE IF NOT EXISTS options (
    poll_id INTEGER NOT NULL,
    id INTEGER NOT NULL,
    text TEXT NOT NULL,
    image TEXT,
    votes INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (poll_id, id)
);

-- Vote records, one per (poll, voter)
CREATE TABLE IF NOT EXISTS votes (
    poll_id INTEGER NOT NULL,
    voter TEXT NOT NULL,
    option_id INTEGER,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (poll_id, voter)
);

-- Poll id allocation
CREATE TABLE IF NOT EXISTS poll_ids (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    allocated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_polls_owner_created ON polls(owner, created_at);
"#;

// Poll queries
pub const SELECT_POLL_BY_ID: &str = r#"
SELECT id, name, owner, option_count, total_votes, created_at
FROM polls
WHERE id = ?1
"#;

pub const SELECT_POLLS_BY_OWNER: &str = r#"
SELECT id, name, owner, option_count, total_votes, created_at
FROM polls
WHERE owner = ?1
ORDER BY created_at DESC, id DESC
"#;

pub const UPSERT_POLL: &str = r#"
INSERT INTO polls (id, name, owner, option_count, total_votes, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT (id) DO UPDATE SET
    name = excluded.name,
    owner = excluded.owner,
    option_count = excluded.option_count,
    total_votes = excluded.total_votes,
    created_at = excluded.created_at
"#;

/// No-op write that takes the database write lock at the start of a
/// transaction, so two transactions never both hold read locks and then
/// deadlock on the upgrade.
pub const LOCK_POLL: &str = r#"
UPDATE polls SET total_votes = total_votes WHERE id = ?1
"#;

// Option queries
pub const SELECT_OPTION: &str = r#"
SELECT poll_id, id, text, image, votes
FROM options
WHERE poll_id = ?1 AND id = ?2
"#;

pub const UPSERT_OPTION: &str = r#"
INSERT INTO options (poll_id, id, text, image, votes)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (poll_id, id) DO UPDATE SET
    text = excluded.text,
    image = excluded.image,
    votes = excluded.votes
"#;

// Vote queries
pub const SELECT_VOTE: &str = r#"
SELECT poll_id, voter, option_id, updated_at
FROM votes
WHERE poll_id = ?1 AND voter = ?2
"#;

pub const UPSERT_VOTE: &str = r#"
INSERT INTO votes (poll_id, voter, option_id, updated_at)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT (poll_id, voter) DO UPDATE SET
    option_id = excluded.option_id,
    updated_at = excluded.updated_at
"#;

// Id allocation
pub const ALLOCATE_POLL_ID: &str = r#"
INSERT INTO poll_ids (allocated_at) VALUES (?1)
"#;

pub const PING: &str = "SELECT 1";
