// Apexnuera HR Chatbot entry point.
// Keyword questions are answered from the HR spreadsheet; everything else goes to Gemini.

mod app;
mod brain;
mod config;
mod database;
mod dataset;
mod error;
mod llm;
mod models;
mod router;
mod session;

#[cfg(test)]
mod tests;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::{AppConfig, LogFormat};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hrbot", version, about = "Apexnuera HR chatbot")]
struct Cli {
    /// Dataset location: JSON records file or http(s) URL (overrides HRBOT_DATASET).
    #[arg(long, global = true)]
    dataset: Option<String>,

    /// SQLite URL for stored transcripts (overrides HRBOT_DATABASE_URL).
    #[arg(long, global = true)]
    db: Option<String>,

    /// Gemini model id (overrides GEMINI_MODEL).
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat (default).
    Chat {
        /// Resume a stored session.
        #[arg(long)]
        session: Option<String>,
    },
    /// Ask a single question and print the reply.
    Ask {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List stored sessions.
    Sessions,
    /// Validate configuration and try loading the dataset.
    Check,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(dataset) = &self.dataset {
            config.dataset = dataset.clone();
        }
        if let Some(db) = &self.db {
            config.database_url = Some(db.clone());
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hrbot=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    cli.apply(&mut config);
    init_tracing(config.log_format);
    config.validate().context("Invalid configuration")?;

    let store = match &config.database_url {
        Some(url) => Some(
            database::init_db(url)
                .await
                .with_context(|| format!("Failed to open database {}", url))?,
        ),
        None => None,
    };

    match cli.command.unwrap_or(Command::Chat { session: None }) {
        Command::Chat { session } => {
            let chat = app::build_app(&config, store).context("Cannot start the chatbot")?;
            let mut session = chat.open_session(session.as_deref()).await?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            chat.run_repl(&mut session, stdin, tokio::io::stdout()).await?;
            info!("Session {} ended", session.id());
        }
        Command::Ask { text } => {
            let chat = app::build_app(&config, store).context("Cannot start the chatbot")?;
            let mut session = chat.open_session(None).await?;
            let reply = chat.turn(&mut session, &text.join(" ")).await;
            println!("{}", reply);
        }
        Command::Sessions => {
            let pool = store.context("Listing sessions needs a database (--db or HRBOT_DATABASE_URL)")?;
            let sessions = database::list_sessions(&pool).await?;
            if sessions.is_empty() {
                println!("No stored sessions.");
            }
            for s in sessions {
                let created = chrono::DateTime::from_timestamp(s.created_at, 0)
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{}  {}  {:>3} msgs  {}", s.id, created, s.message_count, s.title);
            }
        }
        Command::Check => {
            let report = app::check(&config)
                .await
                .context("Configuration check failed")?;
            for item in &report {
                println!("{} {}", if item.ok { "✔" } else { "✘" }, item.text);
            }
            if let Err(e) = config.require_api_key() {
                error!("Configuration check failed: {}", e);
                return Err(e).context("Configuration check failed");
            }
        }
    }

    Ok(())
}
