//! SQLite transcript store.
//!
//! Lets the CLI resume a conversation across runs. The router never touches the
//! store; the caller persists each turn after routing it.

use crate::error::AppError;
use crate::models::{Message, Role, SessionSummary};
use crate::session::Session;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

const DEFAULT_TITLE: &str = "New conversation";

pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    info!("Initializing database at: {}", db_url);

    let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);

    // every connection to an in-memory database is a separate database
    let max_connections = if db_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY(session_id) REFERENCES sessions(id)
        );
        "#,
    )
    .execute(&pool)
    .await?;

    info!("Database initialized and migrations applied.");

    Ok(pool)
}

// --- Sessions ---

/// Stores a new session together with its current transcript.
pub async fn create_session(pool: &SqlitePool, session: &Session) -> Result<(), AppError> {
    let created_at = Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO sessions (id, title, created_at) VALUES (?, ?, ?)")
        .bind(session.id())
        .bind(DEFAULT_TITLE)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

    for message in session.transcript() {
        sqlx::query(
            "INSERT INTO messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session.id())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn session_exists(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT id FROM sessions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Rebuilds a stored session.
pub async fn load_session(pool: &SqlitePool, id: &str) -> Result<Session, AppError> {
    if !session_exists(pool, id).await? {
        return Err(AppError::Validation(format!("Unknown session: {}", id)));
    }
    let messages = get_session_messages(pool, id).await?;
    Ok(Session::from_transcript(id, messages))
}

/// Lists stored sessions, newest first. The title is the first user message.
pub async fn list_sessions(pool: &SqlitePool) -> Result<Vec<SessionSummary>, AppError> {
    let sessions = sqlx::query_as::<_, SessionSummary>(
        r#"
        SELECT
            s.id,
            COALESCE(
                (SELECT m.content FROM messages m
                 WHERE m.session_id = s.id AND m.role = 'user'
                 ORDER BY m.id ASC LIMIT 1),
                s.title
            ) AS title,
            s.created_at,
            (SELECT COUNT(*) FROM messages m WHERE m.session_id = s.id) AS message_count
        FROM sessions s
        ORDER BY s.created_at DESC, s.rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(sessions)
}

// --- Messages ---

pub async fn add_message(
    pool: &SqlitePool,
    session_id: &str,
    message: &Message,
) -> Result<(), AppError> {
    let created_at = Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(session_id)
    .bind(message.role.as_str())
    .bind(&message.content)
    .bind(created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_session_messages(
    pool: &SqlitePool,
    session_id: &str,
) -> Result<Vec<Message>, AppError> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT role, content
        FROM messages
        WHERE session_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(role, content)| {
            Ok(Message {
                role: Role::from_str(&role)?,
                content,
            })
        })
        .collect()
}
