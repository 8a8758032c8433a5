use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use calc_cli::app::{self, App, ExportFormat};
use calc_cli::config::{FileConfig, Overrides, Settings};
use calc_cli::logging;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Multilingual financial calculators: Spanish and Italian income tax, VAT,
/// benefits, severance, inheritance tax and investment appraisal.
#[derive(Debug, Parser)]
#[command(name = "fincalc", version)]
struct Cli {
    /// TOML config file (default: $FINCALC_CONFIG, then ./fincalc.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store backend for saved results (memory or sqlite).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Store connection string.
    /// For SQLite this is a file path (e.g. `fincalc.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Display locale (es, it, en). Defaults to each calculator's language.
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Log level or EnvFilter directive; RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Hide log output on stderr.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the available calculators.
    List,
    /// Show the fields of a calculator with their current values.
    Show {
        slug: String,
        /// Field assignments, e.g. `--set isee=18000`.
        #[arg(long = "set", value_name = "ID=VALUE")]
        assignments: Vec<String>,
    },
    /// Compute a result.
    Compute {
        slug: String,
        #[arg(long = "set", value_name = "ID=VALUE")]
        assignments: Vec<String>,
        /// Also draw the chart.
        #[arg(long)]
        chart: bool,
    },
    /// Compute a result and append it to the saved results.
    Save {
        slug: String,
        #[arg(long = "set", value_name = "ID=VALUE")]
        assignments: Vec<String>,
    },
    /// List saved results of a calculator, most recent first.
    History { slug: String },
    /// Delete the saved results list of a calculator.
    ClearHistory { slug: String },
    /// Export a result as a document.
    Export {
        slug: String,
        #[arg(long = "set", value_name = "ID=VALUE")]
        assignments: Vec<String>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output directory.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Edit a calculator line by line.
    Interactive {
        slug: String,
        /// Directory for `export` commands.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file = FileConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(
        file,
        Overrides {
            backend: cli.backend,
            connection_string: cli.db,
            locale: cli.locale,
            log_level: cli.log_level,
            log_file: cli.log_file,
        },
    )?;

    logging::init_logging(&settings.log_level);
    if cli.quiet {
        logging::set_stderr_enabled(false)?;
    }
    if let Some(path) = &settings.log_file {
        if let Err(e) = logging::enable_file_logging(path) {
            warn!("file logging disabled: {e:#}");
        }
    }
    debug!(?settings, "settings resolved");

    let history = app::open_history(&settings.store).await?;
    let app = App::new(history, settings.locale);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::List => app.list(&mut out)?,
        Command::Show { slug, assignments } => {
            let session = app::session_with(&slug, &assignments)?;
            app.show(&mut out, &session)?;
        }
        Command::Compute {
            slug,
            assignments,
            chart,
        } => {
            let session = app::session_with(&slug, &assignments)?;
            app.compute(&mut out, &session, chart)?;
        }
        Command::Save { slug, assignments } => {
            let session = app::session_with(&slug, &assignments)?;
            app.compute(&mut out, &session, false)?;
            app.save(&mut out, &session).await?;
        }
        Command::History { slug } => app.history(&mut out, &slug).await?,
        Command::ClearHistory { slug } => app.clear_history(&mut out, &slug).await?,
        Command::Export {
            slug,
            assignments,
            format,
            out: dir,
        } => {
            let session = app::session_with(&slug, &assignments)?;
            app.export(&mut out, &session, format, &dir)?;
        }
        Command::Interactive { slug, out: dir } => {
            let stdin = io::stdin();
            app.interactive(&slug, stdin.lock(), &mut out, &dir)
                .await
                .context("interactive session failed")?;
        }
    }

    out.flush()?;
    Ok(())
}
