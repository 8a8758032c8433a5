//! Commands of the `fincalc` binary.
//!
//! Every command writes to a caller-supplied writer so it can be exercised
//! without a terminal.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use calc_core::calculators::{self, Calculator};
use calc_core::export::{CsvExporter, Document, Exporter, JsonExporter};
use calc_core::format::{format_input, format_output};
use calc_core::store::{MemoryStoreFactory, StoreConfig, StoreRegistry};
use calc_core::{CalculatorSession, ChartRenderer, Locale, ResultHistory};
use calc_db_sqlite::SqliteStoreFactory;
use clap::ValueEnum;
use tracing::{debug, info};

use crate::chart::TextChartRenderer;
use crate::logging;
use crate::utils::parse_assignments;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    fn exporter(self) -> Box<dyn Exporter> {
        match self {
            Self::Csv => Box::new(CsvExporter),
            Self::Json => Box::new(JsonExporter),
        }
    }
}

/// Registry with every store backend this binary ships.
pub fn build_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::new();
    registry.register(Box::new(MemoryStoreFactory));
    registry.register(Box::new(SqliteStoreFactory));
    registry
}

pub async fn open_history(config: &StoreConfig) -> Result<ResultHistory> {
    debug!("opening {} store", config.backend);
    let store = build_registry()
        .create(config)
        .await
        .with_context(|| format!("Failed to open the '{}' store", config.backend))?;
    Ok(ResultHistory::new(store))
}

pub fn find_calculator(slug: &str) -> Result<&'static dyn Calculator> {
    calculators::find(slug).ok_or_else(|| {
        anyhow!(
            "unknown calculator '{}'; available: {}",
            slug,
            calculators::slugs().join(", ")
        )
    })
}

/// Starts a session for `slug` and applies `id=value` assignments in order.
pub fn session_with(
    slug: &str,
    assignments: &[String],
) -> Result<CalculatorSession<'static>> {
    let mut session = CalculatorSession::new(find_calculator(slug)?);
    for (id, value) in parse_assignments(assignments)? {
        session
            .set_field_text(&id, &value)
            .with_context(|| format!("cannot set '{id}'"))?;
    }
    Ok(session)
}

pub struct App {
    history: ResultHistory,
    locale: Option<Locale>,
    renderer: TextChartRenderer,
}

impl App {
    pub fn new(
        history: ResultHistory,
        locale: Option<Locale>,
    ) -> Self {
        Self {
            history,
            locale,
            renderer: TextChartRenderer,
        }
    }

    fn locale_for(
        &self,
        session: &CalculatorSession<'_>,
    ) -> Locale {
        self.locale.unwrap_or(session.definition().locale)
    }

    pub fn list<W: Write>(
        &self,
        out: &mut W,
    ) -> Result<()> {
        for calculator in calculators::all() {
            let definition = calculator.definition();
            writeln!(
                out,
                "{:<24} {}  {}",
                definition.slug, definition.locale, definition.title
            )?;
        }
        Ok(())
    }

    /// Prints the fields of a calculator, marking those hidden in the current state.
    pub fn show<W: Write>(
        &self,
        out: &mut W,
        session: &CalculatorSession<'_>,
    ) -> Result<()> {
        let definition = session.definition();
        let locale = self.locale_for(session);
        let active: Vec<&str> = session.active_inputs().iter().map(|f| f.id.as_str()).collect();

        writeln!(out, "{} ({})", definition.title, definition.slug)?;
        for field in &definition.inputs {
            let value = session
                .state()
                .get(&field.id)
                .map(|v| format_input(field, v, locale))
                .unwrap_or_default();
            let hidden = if active.contains(&field.id.as_str()) { "" } else { "  (hidden)" };
            writeln!(
                out,
                "  {:<22} {:<8} {} = {}{}",
                field.id,
                field.kind.as_str(),
                field.label,
                value,
                hidden
            )?;
            if !field.options.is_empty() {
                let options: Vec<&str> = field.options.iter().map(|o| o.value.as_str()).collect();
                writeln!(out, "  {:<22} options: {}", "", options.join(" | "))?;
            }
        }
        Ok(())
    }

    pub fn print_outputs<W: Write>(
        &self,
        out: &mut W,
        session: &CalculatorSession<'_>,
    ) -> Result<()> {
        let locale = self.locale_for(session);
        for field in &session.definition().outputs {
            if let Some(value) = session.outputs().get(&field.id) {
                writeln!(
                    out,
                    "  {:<32} {}",
                    field.label,
                    format_output(value, field.unit, locale)
                )?;
            }
        }
        Ok(())
    }

    pub fn print_chart<W: Write>(
        &self,
        out: &mut W,
        session: &CalculatorSession<'_>,
    ) -> Result<()> {
        let text = self.renderer.render(&session.chart())?;
        write!(out, "{text}")?;
        Ok(())
    }

    pub fn compute<W: Write>(
        &self,
        out: &mut W,
        session: &CalculatorSession<'_>,
        chart: bool,
    ) -> Result<()> {
        writeln!(out, "{}", session.definition().title)?;
        self.print_outputs(out, session)?;
        if chart {
            writeln!(out)?;
            self.print_chart(out, session)?;
        }
        Ok(())
    }

    pub async fn save<W: Write>(
        &self,
        out: &mut W,
        session: &CalculatorSession<'_>,
    ) -> Result<()> {
        let saved = session
            .save_result(&self.history)
            .await
            .context("Could not save the result")?;
        writeln!(
            out,
            "Saved {} at {}",
            saved.title,
            saved.timestamp.format("%Y-%m-%d %H:%M:%S")
        )?;
        Ok(())
    }

    pub async fn history<W: Write>(
        &self,
        out: &mut W,
        slug: &str,
    ) -> Result<()> {
        let calculator = find_calculator(slug)?;
        let definition = calculator.definition();
        let locale = self.locale.unwrap_or(definition.locale);
        let entries = self
            .history
            .list_for(&definition.history, slug)
            .await
            .context("Could not read saved results")?;

        if entries.is_empty() {
            writeln!(out, "No saved results for {slug}")?;
            return Ok(());
        }
        for (index, entry) in entries.iter().enumerate() {
            writeln!(
                out,
                "[{}] {}",
                index + 1,
                entry.timestamp.format("%Y-%m-%d %H:%M:%S")
            )?;
            for field in &definition.outputs {
                if let Some(value) = entry.outputs.get(&field.id) {
                    writeln!(
                        out,
                        "    {:<32} {}",
                        field.label,
                        format_output(value, field.unit, locale)
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Clears the whole list under the calculator's history key.
    pub async fn clear_history<W: Write>(
        &self,
        out: &mut W,
        slug: &str,
    ) -> Result<()> {
        let policy = &find_calculator(slug)?.definition().history;
        self.history
            .clear(policy)
            .await
            .context("Could not clear saved results")?;

        let sharing: Vec<&str> = calculators::all()
            .iter()
            .filter(|c| c.definition().history.key == policy.key)
            .map(|c| c.slug())
            .collect();
        if sharing.len() > 1 {
            writeln!(
                out,
                "Cleared saved results under '{}' (shared by {})",
                policy.key,
                sharing.join(", ")
            )?;
        } else {
            writeln!(out, "Cleared saved results under '{}'", policy.key)?;
        }
        Ok(())
    }

    /// Writes the exported document into `dir` and returns its path.
    pub fn export<W: Write>(
        &self,
        out: &mut W,
        session: &CalculatorSession<'_>,
        format: ExportFormat,
        dir: &Path,
    ) -> Result<PathBuf> {
        let document: Document = session
            .export(format.exporter().as_ref(), self.locale_for(session))
            .context("Could not export the result")?;
        let path = dir.join(&document.file_name);
        std::fs::write(&path, &document.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        writeln!(out, "Exported {}", path.display())?;
        Ok(path)
    }

    /// Line-oriented editing loop. Failures are printed and the loop goes on.
    pub async fn interactive<R: BufRead, W: Write>(
        &self,
        slug: &str,
        input: R,
        out: &mut W,
        export_dir: &Path,
    ) -> Result<()> {
        let mut session = CalculatorSession::new(find_calculator(slug)?);
        self.compute(out, &session, false)?;
        write!(out, "> ")?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => {
                    if let Err(e) = self.run_command(out, &mut session, command, export_dir).await {
                        writeln!(out, "notice: {e:#}")?;
                    }
                }
                Err(message) => writeln!(out, "notice: {message}")?,
            }
            write!(out, "> ")?;
            out.flush()?;
        }
        writeln!(out)?;
        info!(calculator = slug, "interactive session ended");
        Ok(())
    }

    async fn run_command<W: Write>(
        &self,
        out: &mut W,
        session: &mut CalculatorSession<'_>,
        command: Command,
        export_dir: &Path,
    ) -> Result<()> {
        match command {
            Command::Set { id, value } => {
                let stored = session.set_field_text(&id, &value)?;
                writeln!(out, "{id} = {}", stored.display())?;
                self.print_outputs(out, session)
            }
            Command::Reset => {
                session.reset();
                self.print_outputs(out, session)
            }
            Command::Show => self.show(out, session),
            Command::Outputs => self.print_outputs(out, session),
            Command::Chart => self.print_chart(out, session),
            Command::Save => self.save(out, session).await,
            Command::History => self.history(out, &session.definition().slug).await,
            Command::Export(format) => self.export(out, session, format, export_dir).map(|_| ()),
            Command::Log(level) => {
                logging::set_log_level(&level)?;
                writeln!(out, "log level set to {level}")?;
                Ok(())
            }
            Command::Help => {
                writeln!(out, "{}", Command::HELP)?;
                Ok(())
            }
            Command::Quit => Ok(()),
        }
    }
}

/// One line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { id: String, value: String },
    Reset,
    Show,
    Outputs,
    Chart,
    Save,
    History,
    Export(ExportFormat),
    Log(String),
    Help,
    Quit,
}

impl Command {
    pub const HELP: &'static str = "commands: set <id> <value> | reset | show | outputs | chart | save | history | export csv|json | log <level> | help | quit";

    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match (word, rest) {
            ("set", rest) => match rest.split_once(char::is_whitespace) {
                Some((id, value)) => Ok(Self::Set {
                    id: id.to_string(),
                    value: value.trim().to_string(),
                }),
                None if !rest.is_empty() => Ok(Self::Set {
                    id: rest.to_string(),
                    value: String::new(),
                }),
                None => Err("usage: set <id> <value>".to_string()),
            },
            ("reset", "") => Ok(Self::Reset),
            ("show", "") => Ok(Self::Show),
            ("outputs", "") | ("", "") => Ok(Self::Outputs),
            ("chart", "") => Ok(Self::Chart),
            ("save", "") => Ok(Self::Save),
            ("history", "") => Ok(Self::History),
            ("export", format) => ExportFormat::from_str(format, true)
                .map(Self::Export)
                .map_err(|_| "usage: export csv|json".to_string()),
            ("log", level) if !level.is_empty() => Ok(Self::Log(level.to_string())),
            ("help", _) | ("?", _) => Ok(Self::Help),
            ("quit", _) | ("exit", _) => Ok(Self::Quit),
            _ => Err(format!("unknown command '{line}'; type 'help'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_set_keeps_the_rest_of_the_line() {
        assert_eq!(
            Command::parse("set cash_flows -100; 60; 60"),
            Ok(Command::Set {
                id: "cash_flows".to_string(),
                value: "-100; 60; 60".to_string(),
            })
        );
        assert_eq!(
            Command::parse("set isee"),
            Ok(Command::Set {
                id: "isee".to_string(),
                value: String::new(),
            })
        );
        assert!(Command::parse("set").is_err());
    }

    #[test]
    fn parse_simple_commands() {
        assert_eq!(Command::parse("  reset "), Ok(Command::Reset));
        assert_eq!(Command::parse("export JSON"), Ok(Command::Export(ExportFormat::Json)));
        assert_eq!(Command::parse("log debug"), Ok(Command::Log("debug".to_string())));
        assert_eq!(Command::parse("exit"), Ok(Command::Quit));
        assert!(Command::parse("export pdf").is_err());
        assert!(Command::parse("frobnicate").is_err());
    }

    #[test]
    fn session_with_applies_assignments() {
        let session = session_with("calcolatore-iva", &["amount=200".to_string()]).unwrap();

        assert_eq!(
            session.outputs().number("gross"),
            Some(rust_decimal_macros::dec!(244))
        );
    }

    #[test]
    fn session_with_reports_bad_input() {
        assert!(session_with("nope", &[]).is_err());
        assert!(session_with("calcolatore-iva", &["colour=red".to_string()]).is_err());
        assert!(session_with("calcolatore-iva", &["amount".to_string()]).is_err());
    }

    #[test]
    fn registry_offers_memory_and_sqlite() {
        assert_eq!(build_registry().available_backends(), vec!["memory", "sqlite"]);
    }
}
