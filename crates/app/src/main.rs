use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use quiz_core::Clock;
use quiz_core::model::{CategoryId, Difficulty};
use services::{EtlService, FetchRequest, QuizService, TriviaApiClient};
use storage::repository::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidQuestions { raw: String },
    InvalidAmount { raw: String },
    InvalidCategory { raw: String },
    InvalidDifficulty { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidQuestions { raw } => write!(f, "invalid --questions value: {raw}"),
            ArgsError::InvalidAmount { raw } => write!(f, "invalid --amount value: {raw}"),
            ArgsError::InvalidCategory { raw } => write!(f, "invalid --category value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value (easy|medium|hard): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    default_question_count: u32,
    quiz: Arc<QuizService>,
}

impl UiApp for DesktopApp {
    fn default_question_count(&self) -> u32 {
        self.default_question_count
    }

    fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui   [--db <sqlite_url>] [--questions <n>]");
    eprintln!(
        "  cargo run -p app -- seed [--db <sqlite_url>] [--amount <n>] [--category <id>] [--difficulty <easy|medium|hard>] [--replace]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:trivia.sqlite3");
    eprintln!("  --questions 10 (ui), --amount 10 (seed)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!(
        "  TRIVIA_DB_URL, TRIVIA_QUESTIONS, TRIVIA_AMOUNT, TRIVIA_CATEGORY, TRIVIA_DIFFICULTY, TRIVIA_API_BASE_URL"
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

fn db_url_from_env() -> String {
    std::env::var("TRIVIA_DB_URL")
        .ok()
        .map_or_else(|| "sqlite://trivia.sqlite3".into(), normalize_sqlite_url)
}

struct UiArgs {
    db_url: String,
    questions: u32,
}

impl UiArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = db_url_from_env();
        let mut questions = std::env::var("TRIVIA_QUESTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(10);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--questions" => {
                    let value = require_value(args, "--questions")?;
                    questions = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(ArgsError::InvalidQuestions { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, questions })
    }
}

struct SeedArgs {
    db_url: String,
    amount: u8,
    category: Option<CategoryId>,
    difficulty: Option<Difficulty>,
    replace: bool,
}

impl SeedArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = db_url_from_env();
        let mut amount = std::env::var("TRIVIA_AMOUNT")
            .ok()
            .and_then(|value| value.parse::<u8>().ok())
            .unwrap_or(10);
        let mut category = std::env::var("TRIVIA_CATEGORY")
            .ok()
            .and_then(|value| value.parse::<CategoryId>().ok());
        let mut difficulty = std::env::var("TRIVIA_DIFFICULTY")
            .ok()
            .and_then(|value| value.parse::<Difficulty>().ok());
        let mut replace = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--amount" => {
                    let value = require_value(args, "--amount")?;
                    amount = value
                        .parse::<u8>()
                        .map_err(|_| ArgsError::InvalidAmount { raw: value.clone() })?;
                }
                "--category" => {
                    let value = require_value(args, "--category")?;
                    let parsed = value
                        .parse::<CategoryId>()
                        .map_err(|_| ArgsError::InvalidCategory { raw: value.clone() })?;
                    category = Some(parsed);
                }
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    let parsed = value
                        .parse::<Difficulty>()
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                    difficulty = Some(parsed);
                }
                "--replace" => replace = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            amount,
            category,
            difficulty,
            replace,
        })
    }

    fn fetch_request(&self) -> FetchRequest {
        let mut request = FetchRequest::new(self.amount);
        if let Some(category) = self.category {
            request = request.with_category(category);
        }
        if let Some(difficulty) = self.difficulty {
            request = request.with_difficulty(difficulty);
        }
        request
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: launching UI when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }
    let mut iter = argv.into_iter();

    match cmd {
        Command::Seed => {
            let args = SeedArgs::parse(&mut iter).map_err(|e| {
                eprintln!("{e}");
                print_usage();
                e
            })?;

            prepare_sqlite_file(&args.db_url)?;
            let storage = Storage::sqlite(&args.db_url).await?;

            let etl = EtlService::new(
                TriviaApiClient::from_env(),
                Arc::clone(&storage.questions),
                Clock::default_clock(),
            );
            let report = etl.run(args.fetch_request(), args.replace).await?;

            println!(
                "Loaded {} of {} fetched questions ({} skipped) into {}",
                report.loaded, report.fetched, report.skipped, args.db_url
            );
            Ok(())
        }
        Command::Ui => {
            let args = UiArgs::parse(&mut iter).map_err(|e| {
                eprintln!("{e}");
                print_usage();
                e
            })?;

            // Open + migrate SQLite at startup. Keep this in the binary glue
            // so core/services stay pure.
            prepare_sqlite_file(&args.db_url)?;
            let storage = Storage::sqlite(&args.db_url).await?;

            let quiz = Arc::new(QuizService::new(
                Arc::clone(&storage.questions),
                Clock::default_clock(),
            ));
            info!(db = %args.db_url, questions = args.questions, "launching quiz UI");

            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                default_question_count: args.questions,
                quiz,
            });
            let context = build_app_context(&app);

            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Trivia Quiz")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
