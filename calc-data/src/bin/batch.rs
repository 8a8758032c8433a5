use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use calc_core::calculators;
use calc_core::store::{StoreConfig, StoreRegistry};
use calc_core::{CalculatorSession, ResultHistory};
use calc_data::{ScenarioLoader, run, write_results};
use calc_db_sqlite::SqliteStoreFactory;
use clap::Parser;

/// Run a calculator over every row of a CSV file.
///
/// The header of the CSV file names field ids of the chosen calculator, e.g.
/// `amount,mode,rate` for `calcolatore-iva`. Omitted fields keep their
/// defaults. Results are written as CSV with one column per output.
#[derive(Parser, Debug)]
#[command(name = "calc-batch")]
#[command(version, about, long_about = None)]
struct Args {
    /// Calculator slug (e.g. calculadora-irpf)
    #[arg(short, long)]
    calculator: String,

    /// Path to the CSV file containing the scenarios
    #[arg(short, long)]
    file: PathBuf,

    /// Where to write the results; standard output when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also append every result to the saved-results history in this SQLite database
    #[arg(short, long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let calculator = calculators::find(&args.calculator).ok_or_else(|| {
        anyhow!(
            "Unknown calculator '{}'; available: {}",
            args.calculator,
            calculators::slugs().join(", ")
        )
    })?;

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;
    let states = ScenarioLoader::parse(file, calculator.definition())
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
    eprintln!("Parsed {} scenarios from CSV", states.len());

    let results = run(calculator, &states);

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create: {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    write_results(writer, calculator.definition(), &results)
        .context("Failed to write results")?;

    if let Some(database) = &args.database {
        let mut registry = StoreRegistry::new();
        registry.register(Box::new(SqliteStoreFactory));
        let store = registry
            .create(&StoreConfig {
                backend: "sqlite".to_string(),
                connection_string: database.clone(),
            })
            .await
            .with_context(|| format!("Failed to open database: {}", database))?;
        let history = ResultHistory::new(store);

        for state in states {
            let mut session = CalculatorSession::new(calculator);
            for (id, value) in state.iter() {
                session
                    .set_field(id, value.clone())
                    .with_context(|| format!("Invalid value for '{}'", id))?;
            }
            session
                .save_result(&history)
                .await
                .context("Failed to save result")?;
        }
        eprintln!(
            "Saved {} results under '{}'",
            results.len(),
            calculator.definition().history.key
        );
    }

    Ok(())
}
