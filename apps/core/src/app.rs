//! Terminal front-end: owns session lifecycle and persistence around the router.

use crate::config::AppConfig;
use crate::database;
use crate::dataset::table::{COURSE_NAME, COURSE_TIMING, JOB_OPENING};
use crate::dataset::{source_for, DataSource, DatasetCache};
use crate::error::AppError;
use crate::llm::{GeminiClient, LlmClient, Relay};
use crate::models::{Message, Role};
use crate::router::Router;
use crate::session::Session;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

pub const TITLE: &str = "🤖 Apexnuera HR Chatbot";
const PROMPT: &str = "Ask me anything... > ";
const RESET_COMMAND: &str = "/reset";
const RELOAD_COMMAND: &str = "/reload";

/// The production wiring: Gemini behind the relay, spreadsheet from file or URL.
pub type ProductionApp = ChatApp<GeminiClient, Box<dyn DataSource>>;

pub fn build_app(config: &AppConfig, store: Option<SqlitePool>) -> Result<ProductionApp, AppError> {
    let api_key = config.require_api_key()?;
    let client = GeminiClient::new(
        api_key.to_string(),
        config.model.clone(),
        config.api_base.clone(),
        config.request_timeout,
    )?;
    info!("Using Gemini model {}", client.model());
    let source = source_for(&config.dataset, config.request_timeout)?;
    info!("Dataset source: {}", source.describe());

    let dataset = Arc::new(DatasetCache::new(source, config.refresh));
    let relay = Relay::new(Arc::new(client), config.generation.clone());
    Ok(ChatApp::new(Router::new(dataset, relay), store))
}

pub struct ChatApp<L: LlmClient, S: DataSource> {
    router: Router<L, S>,
    store: Option<SqlitePool>,
}

impl<L: LlmClient, S: DataSource> ChatApp<L, S> {
    pub fn new(router: Router<L, S>, store: Option<SqlitePool>) -> Self {
        Self { router, store }
    }

    /// Resumes a stored session by id, or starts a new one.
    pub async fn open_session(&self, id: Option<&str>) -> Result<Session, AppError> {
        match (id, &self.store) {
            (Some(id), Some(pool)) => {
                let session = database::load_session(pool, id).await?;
                info!("Resumed session {} ({} messages)", id, session.transcript().len());
                Ok(session)
            }
            (Some(_), None) => Err(AppError::Config(
                "Resuming a session needs a database (--db or HRBOT_DATABASE_URL)".to_string(),
            )),
            (None, _) => {
                let session = Session::new();
                self.register(&session).await?;
                Ok(session)
            }
        }
    }

    /// Records a freshly started session in the store, if there is one.
    async fn register(&self, session: &Session) -> Result<(), AppError> {
        if let Some(pool) = &self.store {
            database::create_session(pool, session).await?;
        }
        info!("Started session {}", session.id());
        Ok(())
    }

    /// Routes one message and persists the new user/assistant pair.
    ///
    /// A store failure is logged and does not cost the user their reply.
    pub async fn turn(&self, session: &mut Session, text: &str) -> String {
        let reply = self.router.route(session, text).await;

        if let Some(pool) = &self.store {
            let new_messages = [Message::user(text), Message::assistant(reply.clone())];
            for message in &new_messages {
                if let Err(e) = database::add_message(pool, session.id(), message).await {
                    warn!("Failed to store {} message: {}", message.role, e);
                }
            }
        }

        reply
    }

    /// Interactive loop: render the transcript, then one turn per input line.
    ///
    /// Ends on EOF, `exit` or `quit`. `/reset` starts a fresh session and
    /// `/reload` refetches the dataset on the next structured question.
    pub async fn run_repl<R, W>(
        &self,
        session: &mut Session,
        input: R,
        mut output: W,
    ) -> Result<(), AppError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        output.write_all(format!("{}\n\n", TITLE).as_bytes()).await?;
        render_transcript(session.transcript(), &mut output).await?;

        let mut lines = input.lines();
        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
                break;
            }
            if text == RESET_COMMAND {
                session.reset();
                self.register(session).await?;
                render_transcript(session.transcript(), &mut output).await?;
                continue;
            }
            if text == RELOAD_COMMAND {
                self.router.reload_dataset().await;
                output.write_all(b"Dataset will be reloaded.\n\n").await?;
                continue;
            }

            let reply = self.turn(session, text).await;
            output
                .write_all(render_message(Role::Assistant, &reply).as_bytes())
                .await?;
        }

        output.write_all(b"Goodbye!\n").await?;
        output.flush().await?;
        Ok(())
    }
}

async fn render_transcript<W: AsyncWrite + Unpin>(
    transcript: &[Message],
    output: &mut W,
) -> Result<(), AppError> {
    for message in transcript {
        output
            .write_all(render_message(message.role, &message.content).as_bytes())
            .await?;
    }
    Ok(())
}

fn render_message(role: Role, content: &str) -> String {
    let speaker = match role {
        Role::User => "🧑 You",
        Role::Assistant => "🤖 HR Bot",
    };
    format!("{}: {}\n\n", speaker, content)
}

/// One line of the `check` report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckItem {
    pub ok: bool,
    pub text: String,
}

impl CheckItem {
    fn pass(text: impl Into<String>) -> Self {
        Self { ok: true, text: text.into() }
    }

    fn fail(text: impl Into<String>) -> Self {
        Self { ok: false, text: text.into() }
    }
}

/// Configuration and dataset status for the `check` command.
///
/// Only an invalid configuration is an error. A missing API key or an
/// unreachable dataset is reported as a failing item and the remaining checks
/// still run.
pub async fn check(config: &AppConfig) -> Result<Vec<CheckItem>, AppError> {
    let mut report = Vec::new();

    config.validate()?;
    report.push(CheckItem::pass(format!(
        "model: {} via {}",
        config.model, config.api_base
    )));

    match config.require_api_key() {
        Ok(_) => report.push(CheckItem::pass("GEMINI_API_KEY: set")),
        Err(e) => {
            warn!("{}", e);
            report.push(CheckItem::fail(format!("GEMINI_API_KEY: {}", e)));
        }
    }

    let source = source_for(&config.dataset, config.request_timeout)?;
    match source.load().await {
        Ok(table) => report.push(CheckItem::pass(format!(
            "dataset: {} ({} rows, {} courses, {} job openings, {} timings)",
            source.describe(),
            table.row_count(),
            table.values(COURSE_NAME).len(),
            table.values(JOB_OPENING).len(),
            table.values(COURSE_TIMING).len(),
        ))),
        Err(e) => report.push(CheckItem::fail(format!(
            "dataset: {} unavailable, answers will fall back to 'no data' ({})",
            source.describe(),
            e
        ))),
    }

    report.push(CheckItem::pass(format!(
        "refresh every {}s",
        config.refresh.as_secs()
    )));
    report.push(CheckItem::pass(match &config.database_url {
        Some(url) => format!("transcripts stored in {}", url),
        None => "transcripts kept in memory".to_string(),
    }));

    Ok(report)
}
