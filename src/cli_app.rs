//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use thiserror::Error;

use prompt_grid::catalog::loader::DeckSource;
use prompt_grid::catalog::{Catalog, Category, ComboKey, Level, PromptRecord};
use prompt_grid::core::config::Config;
use prompt_grid::core::errors::PgError;
use prompt_grid::engine::controller::{Controller, SessionStats};
use prompt_grid::engine::filter::{FilterState, LineState};
use prompt_grid::engine::selector::{draw, filtered_indices};
use prompt_grid::logger::activity::{ActivityEvent, ActivityLog};
use prompt_grid::tui::{DisplayOptions, run_session};

const EMPTY_MESSAGE: &str = "No prompts available for the selected filters.";

/// prompt-grid: random conversation prompts filtered by a category × level grid.
#[derive(Debug, Parser)]
#[command(
    name = "prompt-grid",
    author,
    version,
    about = "Random conversation prompts, filtered by a category x level grid",
    long_about = None
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Deck file to use instead of the configured or built-in deck.
    #[arg(long, global = true, value_name = "PATH")]
    deck: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Write the activity log to this file (enables logging).
    #[arg(long, global = true, value_name = "PATH")]
    activity_log: Option<PathBuf>,
    /// Subcommand to execute; defaults to `play`.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Browse prompts interactively (default).
    Play(PlayArgs),
    /// Draw prompts non-interactively.
    Draw(DrawArgs),
    /// Inspect the prompt deck.
    Catalog(CatalogArgs),
    /// View configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct PlayArgs {
    /// Fixed RNG seed for a reproducible session.
    #[arg(long, value_name = "N")]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Args)]
struct DrawArgs {
    /// Number of prompts to draw (independent draws, repeats possible).
    #[arg(
        short = 'n',
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    count: u32,
    /// Switch off one combination before drawing.
    #[arg(long, value_name = "CAT:LVL")]
    exclude: Vec<ComboKey>,
    /// Switch off a whole category.
    #[arg(long, value_name = "CAT")]
    exclude_category: Vec<String>,
    /// Switch off a whole level.
    #[arg(long, value_name = "LVL")]
    exclude_level: Vec<u32>,
    /// Fixed RNG seed.
    #[arg(long, value_name = "N")]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Args)]
struct CatalogArgs {
    /// Catalog operation to run.
    #[command(subcommand)]
    command: Option<CatalogCommand>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum CatalogCommand {
    /// Show grid counts and the deck fingerprint.
    Summary,
    /// Load and validate the deck.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or configuration.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

impl From<PgError> for CliError {
    fn from(err: PgError) -> Self {
        match err {
            PgError::Io { .. }
            | PgError::Terminal { .. }
            | PgError::Runtime { .. }
            | PgError::Serialization { .. } => Self::Runtime(err.to_string()),
            _ => Self::User(err.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        None => run_play(cli, &PlayArgs::default()),
        Some(Command::Play(args)) => run_play(cli, args),
        Some(Command::Draw(args)) => run_draw(cli, args),
        Some(Command::Catalog(args)) => run_catalog(cli, args),
        Some(Command::Config(args)) => run_config(cli, args),
        Some(Command::Completions(args)) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ──────────────────── shared loading ────────────────────

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let config = Config::load(cli.config.as_deref())?;
    if !config.display.color {
        control::set_override(false);
    }
    verbose(cli, &format!("config: {}", config.paths.config_file.display()));
    Ok(config)
}

fn deck_source(cli: &Cli, config: &Config) -> DeckSource {
    cli.deck
        .clone()
        .map_or_else(|| config.deck_source(), DeckSource::File)
}

fn load_catalog(cli: &Cli, config: &Config) -> Result<(Catalog, DeckSource), CliError> {
    let source = deck_source(cli, config);
    verbose(cli, &format!("deck: {}", source.label()));
    let catalog = source.load()?;
    Ok((catalog, source))
}

fn activity_log(cli: &Cli, config: &Config) -> ActivityLog {
    match &cli.activity_log {
        Some(path) => ActivityLog::open(
            path.clone(),
            config.logging.max_size_bytes,
            config.logging.max_rotated_files,
        ),
        None => ActivityLog::from_config(&config.logging),
    }
}

// ──────────────────── play ────────────────────

fn run_play(cli: &Cli, args: &PlayArgs) -> Result<(), CliError> {
    if !io::stdout().is_terminal() || !io::stdin().is_terminal() {
        return Err(CliError::User(
            "play needs an interactive terminal; use `prompt-grid draw` instead".to_string(),
        ));
    }

    let config = load_config(cli)?;
    let (catalog, source) = load_catalog(cli, &config)?;
    let mut options = config.session_options()?;
    if args.seed.is_some() {
        options.seed = args.seed;
    }

    let fingerprint = catalog.fingerprint()?;
    let controller = Controller::start(catalog, &options)?;
    let mut log = activity_log(cli, &config);
    log.record(&ActivityEvent::SessionStarted {
        deck: source.label(),
        fingerprint,
        config_hash: config.stable_hash()?,
        eligible: controller.eligible_count(),
    });
    log.record(&ActivityEvent::Drawn {
        prompt: controller.current().map(|r| r.text.clone()),
        eligible: controller.eligible_count(),
    });

    let display = DisplayOptions::from_config(&config.display, cli.no_color);
    let stats = match run_session(controller, display, &mut log) {
        Ok(stats) => stats,
        Err(err) => {
            log.record(&ActivityEvent::from_error(&err));
            log.flush();
            return Err(err.into());
        }
    };
    log.record(&ActivityEvent::SessionStopped { stats });
    log.flush();

    emit_session_summary(cli, stats)
}

fn emit_session_summary(cli: &Cli, stats: SessionStats) -> Result<(), CliError> {
    match output_mode(cli) {
        OutputMode::Human => {
            if !cli.quiet {
                println!(
                    "{} {} draws, {} toggles",
                    "Session over:".bold(),
                    stats.draws,
                    stats.toggles
                );
                if cli.verbose {
                    println!(
                        "  empty draws: {}, ignored actions: {}",
                        stats.empty_draws, stats.refused
                    );
                }
            }
        }
        OutputMode::Json => {
            write_json_line(&json!({
                "command": "play",
                "draws": stats.draws,
                "toggles": stats.toggles,
                "empty_draws": stats.empty_draws,
                "ignored_actions": stats.refused,
            }))?;
        }
    }
    Ok(())
}

// ──────────────────── draw ────────────────────

fn run_draw(cli: &Cli, args: &DrawArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let (catalog, _) = load_catalog(cli, &config)?;
    let mut disabled = config.initially_disabled()?;
    disabled.extend(args.exclude.iter().cloned());

    let filter = build_draw_filter(&catalog, &disabled, &args.exclude_category, &args.exclude_level)?;
    let eligible = filtered_indices(&catalog, &filter);
    let seed = args.seed.or(config.session.seed);
    let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

    let drawn: Vec<&PromptRecord> = (0..args.count)
        .filter_map(|_| draw(&mut rng, &eligible))
        .filter_map(|idx| catalog.get(*idx))
        .collect();
    verbose(cli, &format!("{} of {} prompts eligible", eligible.len(), catalog.len()));

    match output_mode(cli) {
        OutputMode::Human => {
            if drawn.is_empty() {
                println!("{}", EMPTY_MESSAGE.dimmed());
            }
            for record in &drawn {
                println!("{}", record.text.bold());
                if !cli.quiet {
                    println!("  {}", caption(record).dimmed());
                }
            }
        }
        OutputMode::Json => {
            let prompts: Vec<Value> = drawn
                .iter()
                .map(|r| {
                    json!({
                        "text": r.text,
                        "category": r.category.as_str(),
                        "level": r.level.get(),
                    })
                })
                .collect();
            write_json_line(&json!({
                "command": "draw",
                "eligible": eligible.len(),
                "prompts": prompts,
            }))?;
        }
    }
    Ok(())
}

/// Start from the full grid and switch off the requested combos, categories
/// and levels using the filter's own toggles.
fn build_draw_filter(
    catalog: &Catalog,
    disabled: &[ComboKey],
    categories: &[String],
    levels: &[u32],
) -> Result<FilterState, CliError> {
    let mut filter = FilterState::full(catalog.shared_grid());

    for key in disabled {
        if !filter.grid().contains(key) {
            return Err(CliError::User(format!("combo {key} is not on the grid")));
        }
        if filter.is_active(key) {
            filter.toggle_cell(&key.category, key.level);
        }
    }
    for name in categories {
        let category = Category::from(name.as_str());
        if !filter.grid().has_category(&category) {
            return Err(CliError::User(format!("unknown category: {name}")));
        }
        // A mixed line is set by the first toggle and cleared by the second.
        while matches!(filter.column_state(&category), LineState::All | LineState::Mixed) {
            filter.toggle_column(&category);
        }
    }
    for raw in levels {
        let level = Level::new(*raw);
        if !filter.grid().has_level(level) {
            return Err(CliError::User(format!("unknown level: {raw}")));
        }
        while matches!(filter.row_state(level), LineState::All | LineState::Mixed) {
            filter.toggle_row(level);
        }
    }
    Ok(filter)
}

fn caption(record: &PromptRecord) -> String {
    format!(
        "{} · Level {}",
        record.category.as_str().to_uppercase(),
        record.level
    )
}

// ──────────────────── catalog ────────────────────

fn run_catalog(cli: &Cli, args: &CatalogArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    match args.command.unwrap_or(CatalogCommand::Summary) {
        CatalogCommand::Summary => {
            let (catalog, source) = load_catalog(cli, &config)?;
            emit_catalog_summary(cli, &catalog, &source)
        }
        CatalogCommand::Validate => {
            let source = deck_source(cli, &config);
            match source.load() {
                Ok(catalog) => {
                    match output_mode(cli) {
                        OutputMode::Human => {
                            println!("{}", "Deck is valid.".green());
                            println!("  Source: {}", source.label());
                            println!(
                                "  Prompts: {} across {} of {} combinations",
                                catalog.len(),
                                catalog.grid().existing().count(),
                                catalog.grid().universe_size()
                            );
                        }
                        OutputMode::Json => {
                            write_json_line(&json!({
                                "command": "catalog validate",
                                "valid": true,
                                "source": source.label(),
                                "prompts": catalog.len(),
                            }))?;
                        }
                    }
                    Ok(())
                }
                Err(e) => {
                    match output_mode(cli) {
                        OutputMode::Human => {
                            eprintln!("{} {e}", "Deck is INVALID:".red());
                        }
                        OutputMode::Json => {
                            write_json_line(&json!({
                                "command": "catalog validate",
                                "valid": false,
                                "source": source.label(),
                                "error_code": e.code(),
                                "error": e.to_string(),
                            }))?;
                        }
                    }
                    Err(e.into())
                }
            }
        }
    }
}

fn emit_catalog_summary(
    cli: &Cli,
    catalog: &Catalog,
    source: &DeckSource,
) -> Result<(), CliError> {
    let fingerprint = catalog.fingerprint()?;
    let grid = catalog.grid();

    match output_mode(cli) {
        OutputMode::Human => {
            println!("{} {}", "Deck:".bold(), source.label());
            println!("  Prompts: {}", catalog.len());
            println!("  Fingerprint: {fingerprint}");
            println!();

            let width = catalog
                .categories()
                .iter()
                .map(|c| c.as_str().len())
                .max()
                .unwrap_or(0)
                .max(3)
                + 2;
            let mut header = format!("{:<9}", "");
            for category in catalog.categories() {
                header.push_str(&format!("{:>width$}", category.as_str()));
            }
            println!("{}", header.bold());
            for level in catalog.levels() {
                let mut row = format!("{:<9}", format!("Level {level}"));
                for category in catalog.categories() {
                    let count = grid.count(category, *level);
                    let cell = if count == 0 {
                        "-".to_string()
                    } else {
                        count.to_string()
                    };
                    row.push_str(&format!("{cell:>width$}"));
                }
                println!("{row}");
            }
        }
        OutputMode::Json => {
            let counts: Vec<Value> = grid
                .universe()
                .map(|key| {
                    json!({
                        "category": key.category.as_str(),
                        "level": key.level.get(),
                        "prompts": grid.count(&key.category, key.level),
                    })
                })
                .collect();
            write_json_line(&json!({
                "command": "catalog summary",
                "source": source.label(),
                "prompts": catalog.len(),
                "categories": catalog.categories().iter().map(Category::as_str).collect::<Vec<_>>(),
                "levels": catalog.levels().iter().map(|l| l.get()).collect::<Vec<_>>(),
                "fingerprint": fingerprint,
                "counts": counts,
            }))?;
        }
    }
    Ok(())
}

// ──────────────────── config ────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match args.command.unwrap_or(ConfigCommand::Path) {
        ConfigCommand::Path => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    write_json_line(&json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    }))?;
                }
            }
            Ok(())
        }
        ConfigCommand::Show => {
            let config = load_config(cli)?;
            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", config.to_toml()?);
                }
                OutputMode::Json => {
                    write_json_line(&json!({
                        "command": "config show",
                        "hash": config.stable_hash()?,
                        "config": serde_json::to_value(&config)?,
                    }))?;
                }
            }
            Ok(())
        }
    }
}

// ──────────────────── output helpers ────────────────────

fn verbose(cli: &Cli, message: &str) {
    if cli.verbose {
        eprintln!("prompt-grid: {message}");
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("PGRID_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
