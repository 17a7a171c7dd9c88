//! Storage layer for the session planner.
//!
//! Provides persistence for drills, user-defined components, in-progress
//! drafts and finalized sessions using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A draft has exactly one editor, so a single connection per process is enough.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in ISO 8601 format (e.g., `2026-10-19T18:30:00Z`)
//! and session dates as `YYYY-MM-DD`, so lexicographic order matches
//! chronological order.
//!
//! ## JSON Columns
//!
//! Drill tags, slot drill lists and whole drafts are stored as JSON text.
//! Drafts are a serialized `SessionDraft`; unknown fields are ignored on
//! load, so adding optional fields to the draft is backwards compatible.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use sp_core::{
    ComponentDefinition, ComponentId, Drill, DrillCatalog, DrillId, PlanSlot, SessionDraft,
    SessionMeta, SessionPlan, SessionStore, StoredSessionId, ValidationError, Weight,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A JSON column could not be encoded or decoded.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// A stored value failed domain validation.
    #[error("invalid stored value: {0}")]
    Validation(#[from] ValidationError),
    /// Failed to parse a stored date or timestamp.
    #[error("invalid date for {id}: {value}")]
    DateParse {
        id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

/// A saved session without its slots, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub id: StoredSessionId,
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub total_duration: i64,
    pub created_at: DateTime<Utc>,
    pub slot_count: usize,
}

/// A saved session with its full plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredSession {
    pub id: StoredSessionId,
    pub meta: SessionMeta,
    pub total_duration: i64,
    pub created_at: DateTime<Utc>,
    pub plan: SessionPlan,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS drills (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                difficulty TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]'
            );

            -- User-defined components merged over the built-in catalog
            CREATE TABLE IF NOT EXISTS components (
                id TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                default_weight REAL NOT NULL
            );

            -- data: serialized SessionDraft
            CREATE TABLE IF NOT EXISTS drafts (
                key TEXT PRIMARY KEY,
                updated_at TEXT NOT NULL,
                data TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                name TEXT,
                date TEXT,
                total_duration INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date);

            -- drills: JSON array of drill IDs in attachment order
            CREATE TABLE IF NOT EXISTS session_slots (
                session_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                component_id TEXT NOT NULL,
                duration INTEGER NOT NULL,
                drills TEXT NOT NULL,
                PRIMARY KEY (session_id, position),
                FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
            );
            ",
        )?;
        Ok(())
    }

    // ========== Drills ==========

    /// Inserts or replaces a drill.
    pub fn upsert_drill(&mut self, drill: &Drill) -> Result<(), DbError> {
        let tags = serde_json::to_string(&drill.tags)?;
        self.conn.execute(
            "
            INSERT INTO drills (id, name, duration_minutes, difficulty, tags)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                duration_minutes = excluded.duration_minutes,
                difficulty = excluded.difficulty,
                tags = excluded.tags
            ",
            params![
                drill.id.as_str(),
                drill.name,
                drill.duration_minutes,
                drill.difficulty.as_str(),
                tags,
            ],
        )?;
        Ok(())
    }

    /// Lists drills ordered by ID.
    pub fn list_drills(&self) -> Result<Vec<Drill>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, duration_minutes, difficulty, tags
            FROM drills
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], DrillRow::from_row)?;
        let mut drills = Vec::new();
        for row in rows {
            drills.push(row?.into_drill()?);
        }
        Ok(drills)
    }

    /// Fetches a single drill.
    pub fn get_drill(&self, id: &DrillId) -> Result<Option<Drill>, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT id, name, duration_minutes, difficulty, tags
                FROM drills
                WHERE id = ?
                ",
                [id.as_str()],
                DrillRow::from_row,
            )
            .optional()?;
        row.map(DrillRow::into_drill).transpose()
    }

    /// Deletes a drill. Returns whether it existed.
    ///
    /// Drafts and saved sessions keep their references.
    pub fn delete_drill(&mut self, id: &DrillId) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM drills WHERE id = ?", [id.as_str()])?;
        Ok(deleted > 0)
    }

    // ========== Components ==========

    /// Inserts or replaces a user-defined component.
    pub fn upsert_component(&mut self, definition: &ComponentDefinition) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO components (id, display_name, default_weight)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                default_weight = excluded.default_weight
            ",
            params![
                definition.id.as_str(),
                definition.display_name,
                definition.default_weight.value(),
            ],
        )?;
        Ok(())
    }

    /// Lists user-defined components ordered by ID.
    pub fn list_components(&self) -> Result<Vec<ComponentDefinition>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, display_name, default_weight FROM components ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let display_name: String = row.get(1)?;
            let weight: f64 = row.get(2)?;
            Ok((id, display_name, weight))
        })?;
        let mut components = Vec::new();
        for row in rows {
            let (id, display_name, weight) = row?;
            components.push(ComponentDefinition {
                id: ComponentId::new(id)?,
                display_name,
                default_weight: Weight::new(weight)?,
            });
        }
        Ok(components)
    }

    // ========== Drafts ==========

    /// Stores `draft` under `key`, replacing any previous draft.
    pub fn save_draft(&mut self, key: &str, draft: &SessionDraft) -> Result<(), DbError> {
        self.save_draft_at(key, draft, Utc::now())
    }

    fn save_draft_at(
        &mut self,
        key: &str,
        draft: &SessionDraft,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let data = serde_json::to_string(draft)?;
        self.conn.execute(
            "
            INSERT INTO drafts (key, updated_at, data)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                updated_at = excluded.updated_at,
                data = excluded.data
            ",
            params![key, format_timestamp(now), data],
        )?;
        tracing::debug!(key, "draft saved");
        Ok(())
    }

    /// Loads the draft stored under `key`.
    pub fn load_draft(&self, key: &str) -> Result<Option<SessionDraft>, DbError> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM drafts WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        data.map(|data| serde_json::from_str(&data).map_err(DbError::from))
            .transpose()
    }

    /// Deletes the draft stored under `key`. Returns whether it existed.
    pub fn delete_draft(&mut self, key: &str) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM drafts WHERE key = ?", [key])?;
        Ok(deleted > 0)
    }

    // ========== Sessions ==========

    /// Inserts a finalized session and its slots in one transaction.
    pub fn insert_session(
        &mut self,
        meta: &SessionMeta,
        total_duration: i64,
        plan: &SessionPlan,
    ) -> Result<StoredSessionId, DbError> {
        self.insert_session_at(meta, total_duration, plan, Utc::now())
    }

    fn insert_session_at(
        &mut self,
        meta: &SessionMeta,
        total_duration: i64,
        plan: &SessionPlan,
        now: DateTime<Utc>,
    ) -> Result<StoredSessionId, DbError> {
        let id = StoredSessionId::new(Uuid::new_v4().to_string())?;
        let date = meta.date.map(format_date);

        let tx = self.conn.transaction()?;
        tx.execute(
            "
            INSERT INTO sessions (id, name, date, total_duration, created_at)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                id.as_str(),
                meta.name,
                date,
                total_duration,
                format_timestamp(now)
            ],
        )?;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO session_slots (session_id, position, component_id, duration, drills)
                VALUES (?, ?, ?, ?, ?)
                ",
            )?;
            for (position, slot) in plan.slots.iter().enumerate() {
                let drills = serde_json::to_string(&slot.drills)?;
                stmt.execute(params![
                    id.as_str(),
                    i64::try_from(position).unwrap_or(i64::MAX),
                    slot.component_id.as_str(),
                    slot.duration,
                    drills,
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!(session_id = %id, slots = plan.slots.len(), "session stored");
        Ok(id)
    }

    /// Lists saved sessions, newest first.
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT s.id, s.name, s.date, s.total_duration, s.created_at, COUNT(sl.position)
            FROM sessions s
            LEFT JOIN session_slots sl ON sl.session_id = s.id
            GROUP BY s.id
            ORDER BY s.created_at DESC, s.id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            let header = SessionRow::from_row(row)?;
            let slot_count: i64 = row.get(5)?;
            Ok((header, slot_count))
        })?;
        let mut sessions = Vec::new();
        for row in rows {
            let (header, slot_count) = row?;
            let (id, meta, total_duration, created_at) = header.parse()?;
            sessions.push(SessionSummary {
                id,
                name: meta.name,
                date: meta.date,
                total_duration,
                created_at,
                slot_count: usize::try_from(slot_count).unwrap_or_default(),
            });
        }
        Ok(sessions)
    }

    /// Loads a saved session with its slots in order.
    pub fn load_session(&self, id: &str) -> Result<Option<StoredSession>, DbError> {
        let header = self
            .conn
            .query_row(
                "
                SELECT id, name, date, total_duration, created_at
                FROM sessions
                WHERE id = ?
                ",
                [id],
                SessionRow::from_row,
            )
            .optional()?;
        let Some(header) = header else {
            return Ok(None);
        };
        let (id, meta, total_duration, created_at) = header.parse()?;

        let mut stmt = self.conn.prepare(
            "
            SELECT component_id, duration, drills
            FROM session_slots
            WHERE session_id = ?
            ORDER BY position ASC
            ",
        )?;
        let rows = stmt.query_map([id.as_str()], |row| {
            let component_id: String = row.get(0)?;
            let duration: i64 = row.get(1)?;
            let drills: String = row.get(2)?;
            Ok((component_id, duration, drills))
        })?;
        let mut slots = Vec::new();
        for row in rows {
            let (component_id, duration, drills) = row?;
            slots.push(PlanSlot {
                component_id: ComponentId::new(component_id)?,
                duration,
                drills: serde_json::from_str(&drills)?,
            });
        }

        Ok(Some(StoredSession {
            id,
            meta,
            total_duration,
            created_at,
            plan: SessionPlan { slots },
        }))
    }
}

impl DrillCatalog for Database {
    fn drill(&self, id: &DrillId) -> Option<Drill> {
        match self.get_drill(id) {
            Ok(drill) => drill,
            Err(err) => {
                tracing::warn!(drill = %id, error = %err, "failed to read drill");
                None
            }
        }
    }
}

impl SessionStore for Database {
    type Error = DbError;

    fn save_session(
        &mut self,
        meta: &SessionMeta,
        total_duration: i64,
        plan: &SessionPlan,
    ) -> Result<StoredSessionId, Self::Error> {
        self.insert_session(meta, total_duration, plan)
    }
}

/// Raw drill columns before validation.
struct DrillRow {
    id: String,
    name: String,
    duration_minutes: i64,
    difficulty: String,
    tags: String,
}

impl DrillRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            duration_minutes: row.get(2)?,
            difficulty: row.get(3)?,
            tags: row.get(4)?,
        })
    }

    fn into_drill(self) -> Result<Drill, DbError> {
        Ok(Drill {
            id: DrillId::new(self.id)?,
            name: self.name,
            duration_minutes: self.duration_minutes,
            difficulty: self.difficulty.parse()?,
            tags: serde_json::from_str(&self.tags)?,
        })
    }
}

/// Raw session header columns before validation.
struct SessionRow {
    id: String,
    name: Option<String>,
    date: Option<String>,
    total_duration: i64,
    created_at: String,
}

impl SessionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            date: row.get(2)?,
            total_duration: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn parse(self) -> Result<(StoredSessionId, SessionMeta, i64, DateTime<Utc>), DbError> {
        let date = self
            .date
            .map(|value| {
                NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|source| {
                    DbError::DateParse {
                        id: self.id.clone(),
                        value,
                        source,
                    }
                })
            })
            .transpose()?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|source| DbError::DateParse {
                id: self.id.clone(),
                value: self.created_at.clone(),
                source,
            })?
            .with_timezone(&Utc);
        let meta = SessionMeta {
            name: self.name,
            date,
        };
        Ok((
            StoredSessionId::new(self.id)?,
            meta,
            self.total_duration,
            created_at,
        ))
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
