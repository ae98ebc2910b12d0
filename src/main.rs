use anyhow::{bail, Context, Result};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use analytics_audit::{run_audit_safely, write_csv_sheets, AuditConfig, AuditRequest, ReplaySource};
use tracing_subscriber::EnvFilter;

/// Parsed command line
#[derive(Debug, Default)]
struct CliArgs {
    positional: Vec<String>,
    fixture: Option<PathBuf>,
    export: Option<PathBuf>,
    json: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| -> Result<PathBuf> {
            iter.next()
                .map(PathBuf::from)
                .with_context(|| format!("{} needs a value", flag))
        };

        match arg.as_str() {
            "--fixture" => cli.fixture = Some(value("--fixture")?),
            "--export" => cli.export = Some(value("--export")?),
            "--json" => cli.json = Some(value("--json")?),
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            flag if flag.starts_with("--") => bail!("unknown option: {}", flag),
            _ => cli.positional.push(arg.clone()),
        }
    }

    if cli.positional.len() > 3 {
        bail!("too many arguments");
    }

    Ok(cli)
}

fn print_usage() {
    println!("Usage: analytics-audit [PROPERTY_ID] [START_DATE] [END_DATE] [--fixture PATH] [--export DIR] [--json PATH]");
    println!();
    println!("  Missing arguments are prompted for. Dates accept YYYY-MM-DD, today, yesterday or NdaysAgo.");
}

/// Interactive mode: no positional values at all, whatever flags were given
fn is_interactive(cli: &CliArgs) -> bool {
    cli.positional.is_empty()
}

/// Read one line from stdin, falling back to `default` when blank
fn prompt(question: &str, default: Option<&str>) -> Result<Option<String>> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim();

    if answer.is_empty() {
        Ok(default.map(str::to_string))
    } else {
        Ok(Some(answer.to_string()))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,analytics_audit=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    let mut config = AuditConfig::load()?;
    if cli.fixture.is_some() {
        config.fixture = cli.fixture.clone();
    }

    let interactive = is_interactive(&cli);
    let mut positional = cli.positional.into_iter();
    let property_id = match positional.next() {
        Some(id) => id,
        None => prompt("Enter property ID (numeric only): ", None)?.unwrap_or_default(),
    };
    let start_date = match positional.next() {
        Some(date) => Some(date),
        None if interactive => prompt(
            &format!("Enter start date (YYYY-MM-DD or 'NdaysAgo') [default: {}]: ", config.start_date),
            None,
        )?,
        None => None,
    };
    let end_date = match positional.next() {
        Some(date) => Some(date),
        None if interactive => prompt(
            &format!("Enter end date (YYYY-MM-DD or 'today') [default: {}]: ", config.end_date),
            None,
        )?,
        None => None,
    };

    let fixture = config
        .fixture
        .clone()
        .context("no data source: pass --fixture PATH or set AUDIT_FIXTURE")?;
    let source = ReplaySource::from_file(&fixture)?;
    tracing::info!(fixture = ?fixture, "replay source loaded");

    let request = AuditRequest::new(property_id, start_date, end_date, &config);
    let response = run_audit_safely(&source, &source, &config, &request);

    let json = serde_json::to_string_pretty(&response)?;
    match &cli.json {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("Failed to write {:?}", path))?;
            println!("✓ Report written to {:?}", path);
        }
        None => println!("{}", json),
    }

    if let (Some(dir), Some(report)) = (&cli.export, &response.data) {
        let written = write_csv_sheets(report, dir)?;
        println!("✓ Exported {} sheets to {:?}", written.len(), dir);
    }

    if response.success {
        println!("\n✅ Audit completed");
    } else {
        eprintln!("\n❌ Audit failed: {}", response.error.as_deref().unwrap_or("unknown error"));
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_positional_and_flags() {
        let cli = parse_args(&args(&["123", "7daysAgo", "--fixture", "f.json", "--export", "out"])).unwrap();
        assert_eq!(cli.positional, vec!["123", "7daysAgo"]);
        assert_eq!(cli.fixture, Some(PathBuf::from("f.json")));
        assert_eq!(cli.export, Some(PathBuf::from("out")));
        assert_eq!(cli.json, None);
    }

    #[test]
    fn test_parse_rejects_unknown_and_missing_values() {
        assert!(parse_args(&args(&["--verbose"])).is_err());
        assert!(parse_args(&args(&["123", "--json"])).is_err());
        assert!(parse_args(&args(&["1", "2", "3", "4"])).is_err());
    }

    #[test]
    fn test_flags_alone_still_prompt_for_everything() {
        assert!(is_interactive(&parse_args(&args(&[])).unwrap()));
        assert!(is_interactive(&parse_args(&args(&["--fixture", "f.json"])).unwrap()));
        assert!(is_interactive(&parse_args(&args(&["--fixture", "f.json", "--export", "out"])).unwrap()));
        assert!(!is_interactive(&parse_args(&args(&["123", "--fixture", "f.json"])).unwrap()));
    }
}
