//! MindSalary CLI - Command-line interface for MindSalary Core
//!
//! Commands:
//! - score: Score a single journal sample into a stress report
//! - monitor: Score a stream of samples from stdin with trend and alerts
//! - doctor: Diagnose configuration and history files
//! - schema: Print input, output and config schemas

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mindsalary_core::config::{KeywordMatching, ScorerConfig, CONFIG_SCHEMA_VERSION};
use mindsalary_core::stress::{
    parse_sample, StressMonitor, StressPredictor, StressProcessor, StressReport,
    StressReportEncoder, StressSample, REPORT_VERSION,
};
use mindsalary_core::{ComputeError, CORE_VERSION, PRODUCER_NAME};

/// MindSalary - On-device stress inference from typing, text and touch
#[derive(Parser)]
#[command(name = "mindsalary")]
#[command(author = "MindSalary")]
#[command(version = CORE_VERSION)]
#[command(about = "Estimate stress from journal entries and typing cadence", long_about = None)]
struct Cli {
    /// Scorer configuration file (JSON); defaults apply when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keyword matching mode, overriding the config file (substring or token)
    #[arg(long, global = true)]
    matching: Option<KeywordMatching>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single sample into a stress report
    Score {
        /// Sample JSON file (use - for stdin)
        #[arg(short, long, conflicts_with = "text")]
        input: Option<PathBuf>,

        /// Score plain text with no keystroke or touch data
        #[arg(long)]
        text: Option<String>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Score NDJSON samples from stdin, one report per line
    Monitor {
        /// Load monitor history from file
        #[arg(long)]
        load_history: Option<PathBuf>,

        /// Save monitor history to file on exit
        #[arg(long)]
        save_history: Option<PathBuf>,

        /// Only emit reports that raised an alert
        #[arg(long)]
        alerts_only: bool,

        /// Buffer output instead of flushing after each record
        #[arg(long)]
        no_flush: bool,
    },

    /// Diagnose configuration and history files
    Doctor {
        /// Check a monitor history file
        #[arg(long)]
        history: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Sample input
    Input,
    /// Stress report output
    Output,
    /// Scorer configuration (prints the defaults)
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();
}

fn run(cli: Cli) -> Result<(), MindsalaryCliError> {
    match cli.command {
        Commands::Score {
            input,
            text,
            output_format,
        } => {
            let config = load_config(cli.config.as_deref(), cli.matching)?;
            cmd_score(config, input.as_deref(), text, output_format)
        }
        Commands::Monitor {
            load_history,
            save_history,
            alerts_only,
            no_flush,
        } => {
            let config = load_config(cli.config.as_deref(), cli.matching)?;
            cmd_monitor(
                config,
                load_history.as_deref(),
                save_history.as_deref(),
                alerts_only,
                !no_flush,
            )
        }
        Commands::Doctor { history, json } => {
            cmd_doctor(cli.config.as_deref(), history.as_deref(), json)
        }
        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn load_config(
    path: Option<&Path>,
    matching: Option<KeywordMatching>,
) -> Result<ScorerConfig, MindsalaryCliError> {
    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading scorer config");
            ScorerConfig::load(path)?
        }
        None => ScorerConfig::default(),
    };
    if let Some(matching) = matching {
        config.matching = matching;
    }
    Ok(config)
}

fn cmd_score(
    config: ScorerConfig,
    input: Option<&Path>,
    text: Option<String>,
    output_format: OutputFormat,
) -> Result<(), MindsalaryCliError> {
    let sample = match (input, text) {
        (_, Some(text)) => StressSample {
            text,
            keystroke_timestamps: Vec::new(),
            biometrics: Default::default(),
            observed_at: None,
        },
        (Some(input), None) => {
            let input_data = if input.to_string_lossy() == "-" {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                buffer
            } else {
                fs::read_to_string(input)?
            };
            parse_sample(&input_data)?
        }
        (None, None) => return Err(MindsalaryCliError::NoInput),
    };

    let observed_at = sample.observed_at.unwrap_or_else(Utc::now);
    let predictor = StressPredictor::with_config(config);
    let assessment = predictor.assess(
        &sample.text,
        &sample.keystroke_timestamps,
        &sample.biometrics,
        observed_at,
    );
    let report =
        StressReportEncoder::new().encode(&assessment, &sample.biometrics, observed_at, None);

    println!("{}", format_report(&report, &output_format)?);
    Ok(())
}

fn cmd_monitor(
    config: ScorerConfig,
    load_history: Option<&Path>,
    save_history: Option<&Path>,
    alerts_only: bool,
    flush: bool,
) -> Result<(), MindsalaryCliError> {
    let mut processor = StressProcessor::with_config(config);

    if let Some(history_path) = load_history {
        let history_json = fs::read_to_string(history_path)?;
        processor.load_history(&history_json)?;
        info!(readings = processor.reading_count(), "monitor history loaded");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut processed = 0usize;

    for (index, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let sample = parse_sample(trimmed).map_err(|e| MindsalaryCliError::Line {
            line: index + 1,
            source: e,
        })?;
        let report = processor.process_sample(&sample);
        processed += 1;

        let alert = report.monitor.as_ref().is_some_and(|m| m.alert);
        if alerts_only && !alert {
            continue;
        }

        writeln!(stdout, "{}", format_report(&report, &OutputFormat::Json)?)?;
        if flush {
            stdout.flush()?;
        }
    }
    stdout.flush()?;

    info!(processed, readings = processor.reading_count(), "monitor input exhausted");

    if let Some(history_path) = save_history {
        let history_json = processor.save_history()?;
        fs::write(history_path, history_json)?;
    }

    Ok(())
}

fn cmd_doctor(
    config_path: Option<&Path>,
    history: Option<&Path>,
    json: bool,
) -> Result<(), MindsalaryCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "core_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("MindSalary core version {}", CORE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "report_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Report schema: {}", REPORT_VERSION),
    });

    let config = match config_path {
        Some(path) if !path.exists() => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist, defaults apply".to_string(),
            });
            ScorerConfig::default()
        }
        Some(path) => match ScorerConfig::load(path) {
            Ok(config) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid (schema {}, {} matching)",
                        config.schema_version,
                        config.matching.as_str()
                    ),
                });
                config
            }
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                });
                ScorerConfig::default()
            }
        },
        None => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: "Using built-in defaults".to_string(),
            });
            ScorerConfig::default()
        }
    };

    if config.schema_version != CONFIG_SCHEMA_VERSION {
        checks.push(DoctorCheck {
            name: "config_schema".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "Config schema {} differs from supported {}",
                config.schema_version, CONFIG_SCHEMA_VERSION
            ),
        });
    }

    let lexicon = &config.lexicon;
    let keyword_total = lexicon.stress.len()
        + lexicon.urgency.len()
        + lexicon.negative.len()
        + lexicon.anxiety.len();
    checks.push(DoctorCheck {
        name: "lexicon".to_string(),
        status: if keyword_total == 0 {
            CheckStatus::Warning
        } else {
            CheckStatus::Ok
        },
        message: format!(
            "{} stress, {} urgency, {} negative, {} anxiety keywords",
            lexicon.stress.len(),
            lexicon.urgency.len(),
            lexicon.negative.len(),
            lexicon.anxiety.len()
        ),
    });

    checks.push(DoctorCheck {
        name: "weights".to_string(),
        status: CheckStatus::Ok,
        message: format!(
            "Fallback weights sum to at most {:.2}",
            config.weights.max_total()
        ),
    });

    if let Some(history_path) = history {
        checks.push(check_history(history_path));
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (monitor mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: CORE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("MindSalary Doctor Report");
        println!("========================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");
        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(MindsalaryCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_history(path: &Path) -> DoctorCheck {
    if !path.exists() {
        return DoctorCheck {
            name: "history".to_string(),
            status: CheckStatus::Warning,
            message: "History file does not exist".to_string(),
        };
    }

    let outcome = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read history file: {e}"))
        .and_then(|content| {
            StressMonitor::from_json(&content).map_err(|e| format!("Invalid history JSON: {e}"))
        });

    match outcome {
        Ok(monitor) => DoctorCheck {
            name: "history".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "History file valid ({} readings, last alert {})",
                monitor.reading_count(),
                monitor
                    .last_alert_at()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string())
            ),
        },
        Err(message) => DoctorCheck {
            name: "history".to_string(),
            status: CheckStatus::Error,
            message,
        },
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), MindsalaryCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input: stress sample (one JSON object, or one per line for monitor)");
                println!();
                println!("- text: Journal entry or typed text");
                println!("- keystroke_timestamps: Millisecond timestamps, one per keystroke");
                println!(
                    "- biometrics: {{ touch_pressure, touch_duration, swipe_velocity, \
                     heart_rate_variability? }}"
                );
                println!("- observed_at: RFC3339 time of the sample (optional, defaults to now)");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output: stress report {}", REPORT_VERSION);
                println!();
                println!("- report_version: Schema version");
                println!("- producer: {{ name, version, instance_id }}");
                println!("- provenance: {{ observed_at_utc, computed_at_utc }}");
                println!("- stress: {{ score, level, path }}");
                println!(
                    "- typing: {{ keystroke_intervals, word_count, backspace_count, \
                     pause_duration, typing_speed }}"
                );
                println!(
                    "- text: {{ sentiment, stress_keywords, urgency_words, negative_words, \
                     anxiety_indicators }}"
                );
                println!(
                    "- biometrics: {{ aggregate, pressure_samples, duration_samples, \
                     velocity_samples }}"
                );
                println!(
                    "- monitor: {{ trend, average_stress, readings_in_window, alert }} \
                     (monitor only)"
                );
                println!("- suggestions: Up to three feedback messages");
            }
        }
        SchemaType::Config => {
            println!("{}", serde_json::to_string_pretty(&ScorerConfig::default())?);
        }
    }
    Ok(())
}

// Helper functions

fn format_report(
    report: &StressReport,
    format: &OutputFormat,
) -> Result<String, MindsalaryCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "mindsalary.stress_sample.v1",
        "description": "Journal entry with keystroke timing and touch signals",
        "type": "object",
        "properties": {
            "text": { "type": "string" },
            "keystroke_timestamps": { "type": "array", "items": { "type": "number" } },
            "biometrics": {
                "type": "object",
                "properties": {
                    "touch_pressure": { "type": "array", "items": { "type": "number" } },
                    "touch_duration": { "type": "array", "items": { "type": "number" } },
                    "swipe_velocity": { "type": "array", "items": { "type": "number" } },
                    "heart_rate_variability": { "type": "number" }
                }
            },
            "observed_at": { "type": "string", "format": "date-time" }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "mindsalary.stress_report.v1",
        "description": "MindSalary stress report",
        "type": "object",
        "required": [
            "report_version",
            "producer",
            "provenance",
            "stress",
            "typing",
            "text",
            "biometrics",
            "suggestions"
        ],
        "properties": {
            "report_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "provenance": {
                "type": "object",
                "properties": {
                    "observed_at_utc": { "type": "string" },
                    "computed_at_utc": { "type": "string" }
                }
            },
            "stress": {
                "type": "object",
                "properties": {
                    "score": { "type": "number", "minimum": 0, "maximum": 1 },
                    "level": { "type": "string", "enum": ["low", "moderate", "high"] },
                    "path": { "type": "string", "enum": ["fallback", "model"] }
                }
            },
            "typing": { "type": "object" },
            "text": { "type": "object" },
            "biometrics": { "type": "object" },
            "monitor": {
                "type": "object",
                "properties": {
                    "trend": { "type": "string", "enum": ["rising", "falling", "stable"] },
                    "average_stress": { "type": ["number", "null"] },
                    "readings_in_window": { "type": "integer" },
                    "alert": { "type": "boolean" }
                }
            },
            "suggestions": { "type": "array", "items": { "type": "string" }, "maxItems": 3 }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum MindsalaryCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    Line { line: usize, source: ComputeError },
    NoInput,
    DoctorFailed,
}

impl From<io::Error> for MindsalaryCliError {
    fn from(e: io::Error) -> Self {
        MindsalaryCliError::Io(e)
    }
}

impl From<ComputeError> for MindsalaryCliError {
    fn from(e: ComputeError) -> Self {
        MindsalaryCliError::Compute(e)
    }
}

impl From<serde_json::Error> for MindsalaryCliError {
    fn from(e: serde_json::Error) -> Self {
        MindsalaryCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MindsalaryCliError> for CliError {
    fn from(e: MindsalaryCliError) -> Self {
        match e {
            MindsalaryCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            MindsalaryCliError::Compute(e) => {
                let (code, hint) = match &e {
                    ComputeError::ConfigError(_) => {
                        ("CONFIG_ERROR", "Run 'mindsalary schema config' for the expected layout")
                    }
                    ComputeError::HistoryError(_) => {
                        ("HISTORY_ERROR", "Run 'mindsalary doctor --history <file>' for details")
                    }
                    ComputeError::Io { .. } => ("IO_ERROR", "Check file paths and permissions"),
                    _ => ("PARSE_ERROR", "Ensure input matches 'mindsalary schema input'"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            MindsalaryCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            MindsalaryCliError::Line { line, source } => CliError {
                code: "PARSE_ERROR".to_string(),
                message: format!("Line {}: {}", line, source),
                hint: Some("Each input line must be one sample JSON object".to_string()),
            },
            MindsalaryCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "No sample given".to_string(),
                hint: Some("Pass --input <file>, --input - or --text <text>".to_string()),
            },
            MindsalaryCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor_no_flush(args: &[&str]) -> bool {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Monitor { no_flush, .. } => no_flush,
            _ => panic!("expected monitor subcommand"),
        }
    }

    #[test]
    fn test_monitor_flushes_by_default() {
        assert!(!monitor_no_flush(&["mindsalary", "monitor"]));
    }

    #[test]
    fn test_monitor_no_flush_flag() {
        assert!(monitor_no_flush(&["mindsalary", "monitor", "--no-flush"]));
    }
}
