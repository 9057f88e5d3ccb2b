// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use locsync::app_config::{self, Config, TranslationProvider};
use locsync::app_controller::{Controller, RunSummary};
use locsync::language_utils;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "openai")]
    OpenAI,
    Azure,
    Bedrock,
    #[value(name = "github")]
    GitHub,
    Anthropic,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Azure => TranslationProvider::Azure,
            CliTranslationProvider::Bedrock => TranslationProvider::Bedrock,
            CliTranslationProvider::GitHub => TranslationProvider::GitHub,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
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

/// Options shared by every command that talks to a provider
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model (or Azure deployment) name
    #[arg(short, long)]
    model: Option<String>,

    /// API key or bearer token for the provider
    #[arg(long, env = "LOCSYNC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Provider endpoint (required for Azure)
    #[arg(long)]
    endpoint: Option<String>,

    /// Cloud region (Bedrock)
    #[arg(long)]
    region: Option<String>,

    /// Source language code (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language codes, comma separated (e.g., 'fr,de,ja')
    #[arg(short, long, value_delimiter = ',')]
    target_languages: Vec<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// String catalog (.xcstrings) or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Write translated catalogs here instead of in place
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Translate but do not write anything
    #[arg(long)]
    dry_run: bool,

    /// Strings per provider call
    #[arg(long)]
    batch_size: Option<usize>,

    /// Provider calls in flight at once
    #[arg(long)]
    concurrency: Option<usize>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill missing locales in string catalogs
    Translate(TranslateArgs),

    /// Translate one text into the target languages
    TranslateText {
        /// Text to translate
        text: String,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Send a free-form prompt to the provider
    Prompt {
        /// User message
        message: String,

        /// System message
        #[arg(long, default_value = "You are a helpful assistant for app store localization.")]
        system: String,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Check that the provider accepts the configured credentials
    TestConnection {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List supported locales
    Languages,

    /// Generate shell completions for locsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// locsync - keep localized string catalogs in sync with AI providers
#[derive(Parser, Debug)]
#[command(name = "locsync")]
#[command(version)]
#[command(about = "AI-powered string catalog translation tool")]
#[command(long_about = "locsync fills missing locales in Xcode string catalogs (.xcstrings) using AI providers.

EXAMPLES:
    locsync translate Localizable.xcstrings              # Translate using default config
    locsync translate -t fr,de,ja App/                   # Every catalog in a folder
    locsync translate -p anthropic --dry-run Localizable.xcstrings
    locsync translate-text -t fr,es 'Hello %@'           # One text, several locales
    locsync test-connection -p github                    # Check credentials
    locsync completions bash > locsync.bash              # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    openai    - OpenAI chat completions
    azure     - Azure OpenAI deployment (requires --endpoint)
    bedrock   - AWS Bedrock Converse (requires --region)
    github    - GitHub Models
    anthropic - Anthropic Messages API")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
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
    // Install at the most verbose level; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "locsync", &mut std::io::stdout());
            Ok(())
        }
        Commands::Languages => {
            for locale in language_utils::SUPPORTED_LOCALES {
                println!("{:<8} {}", locale.code, locale.name);
            }
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::TranslateText { text, config } => {
            let controller = Controller::with_config(load_config(&config)?)?;
            let translations = controller.translate_text(&text).await?;
            if translations.is_empty() {
                return Err(anyhow!("The provider returned no usable translation"));
            }
            for (locale, translation) in translations {
                println!("{}: {}", locale, translation);
            }
            Ok(())
        }
        Commands::Prompt { message, system, config } => {
            let controller = Controller::with_config(load_config(&config)?)?;
            println!("{}", controller.complete_prompt(&system, &message).await?);
            Ok(())
        }
        Commands::TestConnection { config } => {
            let controller = Controller::with_config(load_config(&config)?)?;
            controller.test_connection().await
        }
    }
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(batch_size) = args.batch_size {
        config.translation.common.batch_size = batch_size;
    }
    if let Some(concurrency) = args.concurrency {
        config.translation.common.concurrent_requests = concurrency;
    }
    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;

    // Ctrl-C stops after the wave in flight so finished work is still written
    let cancellation = controller.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current wave");
            cancellation.cancel();
        }
    });

    let summary = if args.input_path.is_dir() {
        controller
            .run_folder(args.input_path, args.output_dir, args.dry_run)
            .await?
    } else {
        controller
            .run(args.input_path, args.output_dir, args.dry_run)
            .await?
    };

    report_summary(&summary);
    if summary.files_failed > 0 {
        return Err(anyhow!("{} files failed", summary.files_failed));
    }
    Ok(())
}

fn report_summary(summary: &RunSummary) {
    info!(
        "Done: {} files, {} strings translated, {} partial, {} failed, {} values written",
        summary.files_processed,
        summary.units_translated,
        summary.units_partial,
        summary.units_failed,
        summary.values_written
    );
}

/// Load the config file (creating a default one when missing) and apply CLI overrides
fn load_config(options: &ConfigArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = options.log_level {
        let level: app_config::LogLevel = level.into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .with_context(|| format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    apply_overrides(&mut config, options);

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

// @applies: Command line values over file values
fn apply_overrides(config: &mut Config, options: &ConfigArgs) {
    if let Some(provider) = options.provider {
        config.translation.provider = provider.into();
    }

    let active = config.translation.provider;
    let provider_config = config.translation.provider_config_mut(active);
    if let Some(model) = &options.model {
        provider_config.model = model.clone();
    }
    if let Some(api_key) = &options.api_key {
        provider_config.api_key = api_key.clone();
    }
    if let Some(endpoint) = &options.endpoint {
        provider_config.endpoint = Some(endpoint.clone());
    }
    if let Some(region) = &options.region {
        provider_config.region = Some(region.clone());
    }

    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if !options.target_languages.is_empty() {
        config.target_languages = options
            .target_languages
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
    }
    if let Some(level) = options.log_level {
        config.log_level = level.into();
    }
}
