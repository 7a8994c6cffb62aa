use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tally_core::{RuleSet, StatementRecord};
use tally_ingest::{StatementParser, StatementReport};
use tally_report::{save_json, write_csv, write_sample_statement, write_summary_pdf};

mod config;
mod console;
mod state;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = VERSION,
    about = "Extract account fields and transactions from credit-card statement PDFs"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement PDF and write the requested reports
    Parse {
        /// Statement PDF, or `-` to read it from stdin
        input: PathBuf,

        /// Write <name>.json
        #[arg(long)]
        json: bool,

        /// Write <name>.csv
        #[arg(long)]
        csv: bool,

        /// Write <name>_summary.pdf
        #[arg(long)]
        summary: bool,

        /// Rule set TOML (see `tally rules`)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Directory for written reports
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Only print the paths of written reports
        #[arg(short, long)]
        quiet: bool,
    },

    /// Write a fake statement PDF to try the parser on
    Sample {
        #[arg(default_value = "sample_statement.pdf")]
        path: PathBuf,
    },

    /// Print the built-in rule set as TOML
    Rules {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
    /// Print the config file location
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Parse {
            input,
            json,
            csv,
            summary,
            rules,
            out_dir,
            quiet,
        } => {
            let cfg = config::load_config()?;
            let wanted = Outputs {
                json: json || cfg.output.write_json,
                csv: csv || cfg.output.write_csv,
                summary: summary || cfg.output.write_summary_pdf,
            };
            let rules = config::resolve_rules(rules.as_deref(), &cfg)?;
            let parser = StatementParser::new(&rules, cfg.detection.clone())
                .context("compiling field rules")?;

            let (source, report) = parse_input(&parser, &input)?;
            if !quiet {
                console::print_report(&source, &report, &cfg.output.currency_symbol);
            }

            let out_dir = out_dir
                .or(cfg.output.out_dir.clone())
                .unwrap_or_else(|| default_out_dir(&input));
            let stem = report_stem(&input);
            let failures = write_reports(
                &report.record,
                &out_dir,
                &stem,
                wanted,
                &cfg.output.currency_symbol,
            );
            if failures > 0 {
                bail!("{failures} report(s) could not be written");
            }
        }

        Command::Sample { path } => {
            write_sample_statement(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote sample statement to {}", path.display());
        }

        Command::Rules { out } => {
            let text = toml::to_string_pretty(&RuleSet::default()).context("serialize rules")?;
            match out {
                Some(path) => {
                    fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{text}"),
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
            ConfigCommand::Path => println!("{}", config::config_path()?.display()),
        },
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
    builder.parse_default_env();
    builder.init();
}

fn is_stdin(input: &Path) -> bool {
    input.as_os_str() == "-"
}

fn parse_input(parser: &StatementParser, input: &Path) -> Result<(String, StatementReport)> {
    if is_stdin(input) {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("reading PDF from stdin")?;
        let report = parser
            .parse_bytes(&bytes, "<stdin>")
            .context("parsing PDF from stdin")?;
        return Ok(("<stdin>".to_string(), report));
    }

    let report = parser
        .parse_path(input)
        .with_context(|| format!("parsing {}", input.display()))?;
    Ok((input.display().to_string(), report))
}

fn default_out_dir(input: &Path) -> PathBuf {
    if is_stdin(input) {
        return PathBuf::from(".");
    }
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn report_stem(input: &Path) -> String {
    if is_stdin(input) {
        return "statement".to_string();
    }
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "statement".to_string())
}

#[derive(Debug, Clone, Copy)]
struct Outputs {
    json: bool,
    csv: bool,
    summary: bool,
}

/// Writes each requested report on its own; returns how many failed.
fn write_reports(
    record: &StatementRecord,
    out_dir: &Path,
    stem: &str,
    wanted: Outputs,
    currency: &str,
) -> usize {
    if !(wanted.json || wanted.csv || wanted.summary) {
        return 0;
    }
    if let Err(e) = fs::create_dir_all(out_dir) {
        eprintln!("error: cannot create {}: {e}", out_dir.display());
        return 1;
    }

    let mut failures = 0;
    let mut report = |label: &str, path: PathBuf, result: Result<(), tally_report::ReportError>| {
        match result {
            Ok(()) => println!("Wrote {label} to {}", path.display()),
            Err(e) => {
                log::error!("failed to write {label} to {}: {e}", path.display());
                eprintln!("error: failed to write {label} to {}: {e}", path.display());
                failures += 1;
            }
        }
    };

    if wanted.json {
        let path = out_dir.join(format!("{stem}.json"));
        let result = save_json(record, &path);
        report("JSON", path, result);
    }
    if wanted.csv {
        let path = out_dir.join(format!("{stem}.csv"));
        let result = fs::File::create(&path)
            .map_err(tally_report::ReportError::from)
            .and_then(|file| write_csv(record, file));
        report("CSV", path, result);
    }
    if wanted.summary {
        let path = out_dir.join(format!("{stem}_summary.pdf"));
        let result = write_summary_pdf(record, currency, &path);
        report("summary PDF", path, result);
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_stem_and_dir() {
        assert_eq!(report_stem(Path::new("/tmp/sept.pdf")), "sept");
        assert_eq!(report_stem(Path::new("-")), "statement");
        assert_eq!(default_out_dir(Path::new("sept.pdf")), PathBuf::from("."));
        assert_eq!(default_out_dir(Path::new("/tmp/sept.pdf")), PathBuf::from("/tmp"));
    }

    #[test]
    fn test_write_reports_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let record = StatementRecord::default();
        let wanted = Outputs {
            json: true,
            csv: true,
            summary: true,
        };
        assert_eq!(write_reports(&record, dir.path(), "sept", wanted, "$"), 0);
        assert!(dir.path().join("sept.json").exists());
        assert!(dir.path().join("sept.csv").exists());
        assert!(dir.path().join("sept_summary.pdf").exists());
    }

    #[test]
    fn test_write_failure_is_counted_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        fs::write(&blocker, "file, not a directory").unwrap();
        let wanted = Outputs {
            json: true,
            csv: false,
            summary: false,
        };
        let failures = write_reports(&StatementRecord::default(), &blocker, "x", wanted, "$");
        assert_eq!(failures, 1);
    }

    #[test]
    fn test_cli_parses_parse_command() {
        let cli = Cli::try_parse_from(["tally", "-v", "parse", "-", "--csv", "--quiet"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Parse {
                input, csv, quiet, json, ..
            } => {
                assert_eq!(input, PathBuf::from("-"));
                assert!(csv && quiet && !json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
