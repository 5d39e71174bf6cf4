// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use report_translator::app_config::{self, API_KEY_ENV, Config, DRY_RUN_ENV, Language, resolve_dry_run};
use report_translator::database::{DatabaseConnection, Repository};
use report_translator::errors::AppError;
use report_translator::report::Report;
use report_translator::translation::{Pipeline, PipelineContext, RunSummary};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate every report that is missing a translation (default command)
    #[command(alias = "translate")]
    Run(RunArgs),

    /// Load reports from a JSON array into the report store
    Import {
        /// JSON file holding an array of reports
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show report and translation counts
    Stats,

    /// Generate shell completions for report-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Default)]
struct RunArgs {
    /// Target language codes, comma separated (e.g. 'es,fr,ja')
    #[arg(short = 't', long, value_delimiter = ',')]
    languages: Option<Vec<String>>,

    /// Fabricate translations instead of calling the backend
    #[arg(long, value_name = "BOOL")]
    dry_run: Option<bool>,

    /// Translation service API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,
}

/// report-translator - Incident report translation pipeline
///
/// Translates the incident report corpus into every configured language,
/// storing only the translations that are missing.
#[derive(Parser, Debug)]
#[command(name = "report-translator")]
#[command(version)]
#[command(about = "Incident report translation pipeline")]
#[command(long_about = "report-translator translates incident reports into a set of target languages and stores the results in SQLite.

EXAMPLES:
    report-translator run                               # Translate using default config
    report-translator run --dry-run false               # Call the real translation service
    report-translator run -t es,fr                      # Only Spanish and French
    report-translator import reports.json               # Seed the report store
    report-translator stats                             # Show stored counts
    report-translator completions bash > rt.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

DRY RUN:
    Without --dry-run or a dry_run value in the config file, runs are dry runs
    unless TRANSLATE_DRY_RUN is set to 'false'.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Database file, overriding the configured one
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(*shell, &mut cmd, "report-translator", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Import { file }) => {
            let config = load_config(&cli)?;
            run_import(&config, cli.database.as_deref(), file).await
        }
        Some(Commands::Stats) => {
            let config = load_config(&cli)?;
            run_stats(&config, cli.database.as_deref())
        }
        Some(Commands::Run(args)) => {
            let config = load_config(&cli)?;
            run_translate(config, cli.database.as_deref(), args).await
        }
        None => {
            let config = load_config(&cli)?;
            let args = RunArgs {
                api_key: std::env::var(API_KEY_ENV).ok(),
                ..RunArgs::default()
            };
            run_translate(config, cli.database.as_deref(), &args).await
        }
    }
}

/// Load or create the configuration and apply the global CLI overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config_path)?;

    match &cli.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

/// Database file from the CLI override, else from the configuration
fn database_path(config: &Config, database: Option<&Path>) -> Result<PathBuf> {
    match database {
        Some(path) => Ok(path.to_path_buf()),
        None => config.database_path(),
    }
}

async fn run_translate(mut config: Config, database: Option<&Path>, args: &RunArgs) -> Result<()> {
    if let Some(languages) = &args.languages {
        config.languages = languages.iter().map(Language::new).collect();
    }

    if let Some(api_key) = &args.api_key {
        config.backend.api_key = api_key.clone();
    }

    if let Some(path) = database {
        config.database_path = Some(path.to_string_lossy().into_owned());
    }

    let env_value = std::env::var(DRY_RUN_ENV).ok();
    let dry_run = resolve_dry_run(args.dry_run.or(config.dry_run), env_value.as_deref());

    config
        .validate(dry_run)
        .context("Configuration validation failed")?;

    if dry_run {
        warn!("Dry run: translations are fabricated, no translation service is called");
    }

    let pipeline = Pipeline::new(PipelineContext::from_config(&config, dry_run)?);
    let summary = pipeline.run_all().await.map_err(AppError::from)?;

    report_summary(&summary)
}

/// Log the outcome of every language; failures make the command fail
fn report_summary(summary: &RunSummary) -> Result<()> {
    for outcome in &summary.languages {
        match &outcome.error {
            Some(e) => error!("[{}] failed: {}", outcome.language, e),
            None => info!(
                "[{}] translated {}, stored {}, skipped {}, failed {}",
                outcome.language,
                outcome.translated,
                outcome.stored,
                outcome.skipped,
                outcome.failures.len()
            ),
        }
    }

    if summary.is_success() {
        return Ok(());
    }

    let incomplete: Vec<&str> = summary
        .languages
        .iter()
        .filter(|l| !l.is_success())
        .map(|l| l.language.as_str())
        .collect();

    Err(anyhow!(
        "Run {} finished with failures for: {}",
        summary.run_id,
        incomplete.join(", ")
    ))
}

/// Read a JSON array of reports
fn read_reports(file: &Path) -> Result<Vec<Report>, AppError> {
    let content = std::fs::read_to_string(file)?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::File(format!("{}: {}", file.display(), e)))
}

async fn run_import(config: &Config, database: Option<&Path>, file: &Path) -> Result<()> {
    let reports = read_reports(file)?;
    let repository = Repository::open(database_path(config, database)?)?;

    let written = repository.insert_reports(reports).await?;
    info!("Imported {} reports from {}", written, file.display());

    Ok(())
}

fn run_stats(config: &Config, database: Option<&Path>) -> Result<()> {
    let db = DatabaseConnection::new(database_path(config, database)?)?;
    println!("{}", db.stats()?);
    Ok(())
}
