//! CLI entrypoint for the trapcall conformance harness.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use trapcall_core::WrapperConfig;
use trapcall_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, Outcome, now_utc, validate_log_file,
};
use trapcall_harness::{ConformanceReport, FixtureSet, HarnessError, TestRunner};

/// Conformance tooling for the trapcall wrapper.
#[derive(Debug, Parser)]
#[command(name = "trapcall-harness")]
#[command(about = "Conformance testing harness for the trapcall wrapper")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a fixture set through the wrapper with a scripted mechanism.
    Verify {
        /// Fixture JSON file.
        #[arg(long)]
        fixture: PathBuf,
        /// Request id to configure (defaults to the fixture's).
        #[arg(long)]
        request: Option<u32>,
        /// Output report path (markdown). Printed to stdout if omitted.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Artifact index path (requires --log).
        #[arg(long, requires = "log")]
        artifact_index: Option<PathBuf>,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Print the configuration resolved from the environment as JSON.
    ShowConfig,
    /// Validate a structured JSONL log.
    ValidateLog {
        /// Structured JSONL log path.
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Verify {
            fixture,
            request,
            report,
            log,
            artifact_index,
            timestamp,
        } => verify(
            &fixture,
            request,
            report.as_deref(),
            log.as_deref(),
            artifact_index.as_deref(),
            timestamp,
        ),
        Command::ShowConfig => show_config(),
        Command::ValidateLog { log } => validate_log(&log),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("trapcall-harness: {err}");
            ExitCode::from(2)
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), HarnessError> {
    std::fs::write(path, content).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn log_io(path: &Path) -> impl Fn(std::io::Error) -> HarnessError + '_ {
    move |source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn verify(
    fixture: &Path,
    request: Option<u32>,
    report_path: Option<&Path>,
    log_path: Option<&Path>,
    index_path: Option<&Path>,
    timestamp: Option<String>,
) -> Result<ExitCode, HarnessError> {
    let started = Instant::now();
    let set = FixtureSet::from_file(fixture)?;
    let request = request.unwrap_or(set.request);
    let run_id = format!("{}-{}", set.family, std::process::id());

    let results = TestRunner::new(&set.family)
        .with_request(request)
        .run(&set);

    if let Some(path) = log_path {
        let mut emitter = LogEmitter::to_file(path, &run_id)?;
        let io = log_io(path);
        emitter
            .emit_entry(
                LogEntry::new("", LogLevel::Info, "verify_start")
                    .with_details(serde_json::json!({ "fixture": fixture.display().to_string() })),
            )
            .map_err(&io)?;
        for (case, result) in set.cases.iter().zip(&results) {
            let (level, outcome) = if result.passed {
                (LogLevel::Info, Outcome::Pass)
            } else {
                (LogLevel::Error, Outcome::Fail)
            };
            let mut entry = LogEntry::new("", level, "case")
                .with_case(&result.case_name)
                .with_request(request, trapcall_core::ErrnoBand::from(case.band).as_str())
                .with_translation(case.raw, result.actual_return, result.actual_errno)
                .with_outcome(outcome);
            if !result.notes.is_empty() {
                entry = entry.with_details(serde_json::json!({ "notes": result.notes }));
            }
            emitter.emit_entry(entry).map_err(&io)?;
        }
        emitter
            .emit_entry(
                LogEntry::new("", LogLevel::Info, "verify_end")
                    .with_duration_ms(started.elapsed().as_millis() as u64),
            )
            .map_err(&io)?;
        emitter.flush().map_err(&io)?;

        if let Some(index_path) = index_path {
            let mut index = ArtifactIndex::new(&run_id);
            index.add_file(fixture, "fixture")?;
            index.add_file(path, "log")?;
            write_file(index_path, &index.to_json()?)?;
        }
    }

    let report = ConformanceReport::new(
        "trapcall conformance",
        &set.family,
        request,
        timestamp.unwrap_or_else(now_utc),
        results,
    );
    let md = report.to_markdown();
    match report_path {
        Some(path) => write_file(path, &md)?,
        None => print!("{md}"),
    }

    Ok(if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn show_config() -> Result<ExitCode, HarnessError> {
    let cfg = WrapperConfig::from_env()?;
    let out = serde_json::json!({
        "request": cfg.request,
        "band": cfg.band.as_str(),
        "max_errno": cfg.band.max_errno(),
        "scope": cfg.scope.as_str(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(ExitCode::SUCCESS)
}

fn validate_log(path: &Path) -> Result<ExitCode, HarnessError> {
    let entries = validate_log_file(path)?;
    println!("{}: {} valid entries", path.display(), entries.len());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verify_arguments_parse() {
        let cli = Cli::try_parse_from([
            "harness",
            "verify",
            "--fixture",
            "f.json",
            "--request",
            "20",
            "--log",
            "run.jsonl",
            "--artifact-index",
            "index.json",
        ])
        .unwrap();
        match cli.command {
            Command::Verify {
                fixture,
                request,
                log,
                artifact_index,
                ..
            } => {
                assert_eq!(fixture, PathBuf::from("f.json"));
                assert_eq!(request, Some(20));
                assert_eq!(log, Some(PathBuf::from("run.jsonl")));
                assert_eq!(artifact_index, Some(PathBuf::from("index.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn artifact_index_requires_log() {
        let err = Cli::try_parse_from([
            "harness",
            "verify",
            "--fixture",
            "f.json",
            "--artifact-index",
            "index.json",
        ]);
        assert!(err.is_err());
    }
}
