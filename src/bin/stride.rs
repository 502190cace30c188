//! Stride CLI - Command-line interface for Synheart Stride
//!
//! Commands:
//! - replay: Run a recorded sample stream through the tracker (batch mode)
//! - run: Track samples arriving on stdin (streaming mode)
//! - validate: Validate a training day and, optionally, a sample stream
//! - schema: Print schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use synheart_stride::encoder::SnapshotEncoder;
use synheart_stride::pipeline::{replay_samples, ReplayStep};
use synheart_stride::schema::{
    DistanceSample, SampleAdapter, TrainingDay, SAMPLE_SCHEMA, TRAINING_DAY_SCHEMA,
};
use synheart_stride::tracker::{SegmentTracker, TrackerState};
use synheart_stride::{TrackerConfig, PRODUCER_NAME, STRIDE_VERSION};

/// Stride - On-device segment tracking for structured workouts
#[derive(Parser)]
#[command(name = "stride")]
#[command(author = "Synheart AI Inc")]
#[command(version = STRIDE_VERSION)]
#[command(about = "Track interval and combination workouts", long_about = None)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recorded sample stream through the tracker (batch mode)
    Replay {
        /// Training day file (stride.training_day.v1)
        #[arg(short, long)]
        day: PathBuf,

        /// Sample file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Only emit samples that caused a transition
        #[arg(long)]
        events_only: bool,

        #[command(flatten)]
        tracker: TrackerArgs,
    },

    /// Track samples arriving on stdin (streaming mode)
    Run {
        /// Training day file (stride.training_day.v1)
        #[arg(short, long)]
        day: PathBuf,

        /// Resume from a saved tracker state
        #[arg(long)]
        load_state: Option<PathBuf>,

        /// Save the tracker state on exit
        #[arg(long)]
        save_state: Option<PathBuf>,

        /// Buffer output instead of flushing after each record
        #[arg(long)]
        no_flush: bool,

        #[command(flatten)]
        tracker: TrackerArgs,
    },

    /// Validate a training day and, optionally, a sample stream
    Validate {
        /// Training day file (stride.training_day.v1)
        #[arg(short, long)]
        day: PathBuf,

        /// Sample file to check as well
        #[arg(short, long)]
        samples: Option<PathBuf>,

        /// Sample file format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(clap::Args)]
struct TrackerArgs {
    /// Tracker config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pace tolerance in seconds per km (overrides the config file)
    #[arg(long)]
    pace_tolerance: Option<f64>,
}

impl TrackerArgs {
    fn load(&self) -> Result<TrackerConfig, StrideCliError> {
        let mut config = match &self.config {
            Some(path) => TrackerConfig::from_json(&fs::read_to_string(path)?)?,
            None => TrackerConfig::default(),
        };
        if let Some(tolerance) = self.pace_tolerance {
            config = TrackerConfig::with_pace_tolerance(tolerance);
        }
        Ok(config)
    }
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one sample per line)
    Ndjson,
    /// JSON array of samples
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one step per line)
    Ndjson,
    /// JSON array of steps
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Training day schema (stride.training_day.v1)
    Day,
    /// Sample schema (stride.sample.v1)
    Sample,
    /// Output schema (stride.snapshot.v1)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

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

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn run(cli: Cli) -> Result<(), StrideCliError> {
    match cli.command {
        Commands::Replay {
            day,
            input,
            output,
            input_format,
            output_format,
            events_only,
            tracker,
        } => cmd_replay(
            &day,
            &input,
            &output,
            input_format,
            output_format,
            events_only,
            tracker.load()?,
        ),

        Commands::Run {
            day,
            load_state,
            save_state,
            no_flush,
            tracker,
        } => cmd_run(
            &day,
            load_state.as_deref(),
            save_state.as_deref(),
            !no_flush,
            tracker.load()?,
        ),

        Commands::Validate {
            day,
            samples,
            input_format,
            json,
        } => cmd_validate(&day, samples.as_deref(), input_format, json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),
    }
}

fn read_input(path: &Path) -> Result<String, StrideCliError> {
    if path.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            log::warn!("Reading samples from an interactive terminal; end input with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn parse_samples(data: &str, format: &InputFormat) -> Result<Vec<DistanceSample>, StrideCliError> {
    let samples = match format {
        InputFormat::Ndjson => SampleAdapter::parse_ndjson(data)?,
        InputFormat::Json => SampleAdapter::parse_array(data)?,
    };
    Ok(samples)
}

fn load_day(path: &Path) -> Result<TrainingDay, StrideCliError> {
    Ok(TrainingDay::from_json(&fs::read_to_string(path)?)?)
}

fn cmd_replay(
    day_path: &Path,
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    events_only: bool,
    config: TrackerConfig,
) -> Result<(), StrideCliError> {
    let day = load_day(day_path)?;
    let samples = parse_samples(&read_input(input)?, &input_format)?;

    if samples.is_empty() {
        return Err(StrideCliError::NoSamples);
    }

    let mut steps = replay_samples(&day, &samples, config)?;
    if events_only {
        steps.retain(|step| !step.events.is_empty());
    }

    log::info!(
        "Replayed {} samples, completed: {}",
        samples.len(),
        steps.last().map(|s| s.snapshot.completed).unwrap_or(false)
    );

    let output_data = format_output(&steps, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_run(
    day_path: &Path,
    load_state: Option<&Path>,
    save_state: Option<&Path>,
    flush: bool,
    config: TrackerConfig,
) -> Result<(), StrideCliError> {
    let day = load_day(day_path)?;
    let definition = day.to_definition()?;

    let mut tracker = match load_state {
        Some(path) => {
            let state: TrackerState = serde_json::from_str(&fs::read_to_string(path)?)?;
            SegmentTracker::resume_with_config(definition, state, config)?
        }
        None => SegmentTracker::with_config(definition, day.mode(), config)?,
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_session(&mut tracker, stdin.lock(), &mut stdout, flush, save_state)
}

/// Stream samples through the tracker, then write the state even when the
/// stream stopped on an error.
fn run_session<R: BufRead, W: Write>(
    tracker: &mut SegmentTracker,
    input: R,
    output: &mut W,
    flush: bool,
    save_state: Option<&Path>,
) -> Result<(), StrideCliError> {
    let streamed = track_stream(tracker, input, output, flush);

    let saved = match save_state {
        Some(path) => serde_json::to_string_pretty(&tracker.state())
            .map_err(StrideCliError::from)
            .and_then(|json| fs::write(path, json).map_err(StrideCliError::from)),
        None => Ok(()),
    };

    if let (Err(e), Err(_)) = (&streamed, &saved) {
        log::error!("Sample stream failed before the state could be saved: {:?}", e);
    }
    streamed.and(saved)
}

fn track_stream<R: BufRead, W: Write>(
    tracker: &mut SegmentTracker,
    input: R,
    output: &mut W,
    flush: bool,
) -> Result<(), StrideCliError> {
    let encoder = SnapshotEncoder::new();

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let sample: DistanceSample = match serde_json::from_str(trimmed) {
            Ok(sample) => sample,
            Err(e) => {
                log::warn!("Skipping sample {}: {}", index + 1, e);
                continue;
            }
        };
        if let Err(e) = sample.validate() {
            log::warn!("Sample {} will be clamped: {}", index + 1, e);
        }

        let events = tracker.update_progress(sample.distance_m, sample.speed_mps);
        let record = serde_json::json!({
            "index": index,
            "events": events,
            "snapshot": encoder.encode(tracker.snapshot()),
        });

        writeln!(output, "{}", serde_json::to_string(&record)?)?;
        if flush {
            output.flush()?;
        }
    }
    output.flush()?;

    Ok(())
}

fn cmd_validate(
    day_path: &Path,
    samples: Option<&Path>,
    input_format: InputFormat,
    json: bool,
) -> Result<(), StrideCliError> {
    let day = load_day(day_path)?;

    let definition_error = day.to_definition().err().map(|e| e.to_string());

    let (total_samples, sample_errors) = match samples {
        Some(path) => {
            let samples = parse_samples(&read_input(path)?, &input_format)?;
            let errors = SampleAdapter::validate_samples(&samples)
                .into_iter()
                .map(|r| SampleErrorDetail {
                    index: r.index,
                    error: r.error.to_string(),
                })
                .collect::<Vec<_>>();
            (samples.len(), errors)
        }
        None => (0, Vec::new()),
    };

    let report = ValidationReport {
        day: day.day,
        mode: day.mode().as_str().to_string(),
        definition_valid: definition_error.is_none(),
        definition_error,
        total_samples,
        invalid_samples: sample_errors.len(),
        sample_errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Day:            {}", report.day);
        println!("Mode:           {}", report.mode);
        match &report.definition_error {
            Some(err) => println!("Definition:     INVALID ({})", err),
            None => println!("Definition:     ok"),
        }
        if samples.is_some() {
            println!("Total samples:   {}", report.total_samples);
            println!("Invalid samples: {}", report.invalid_samples);
        }

        if !report.sample_errors.is_empty() {
            println!("\nSample errors (these samples will be clamped):");
            for err in &report.sample_errors {
                println!("  - Sample {}: {}", err.index, err.error);
            }
        }
    }

    if !report.definition_valid {
        Err(StrideCliError::ValidationFailed(
            report.definition_error.unwrap_or_default(),
        ))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), StrideCliError> {
    let (name, example) = match schema_type {
        SchemaType::Day => (
            TRAINING_DAY_SCHEMA,
            serde_json::json!({
                "schema_version": TRAINING_DAY_SCHEMA,
                "day": 12,
                "title": "6 x 1000 m",
                "workout": {
                    "type": "interval",
                    "work": { "distance_m": 1000, "pace": "4:00", "description": "1000 m hard" },
                    "recovery": { "distance_m": 400, "heart_rate": { "min": 120, "max": 140 } },
                    "repeats": 6
                }
            }),
        ),
        SchemaType::Sample => (
            SAMPLE_SCHEMA,
            serde_json::json!({
                "distance_m": 1523.4,
                "speed_mps": 3.9,
                "timestamp": "2024-03-05T06:36:12Z"
            }),
        ),
        SchemaType::Output => {
            let day: TrainingDay = serde_json::from_value(serde_json::json!({
                "day": 1,
                "workout": {
                    "type": "combination",
                    "segments": [{ "distance_km": 2.0, "pace": "6:00", "description": "warm-up" }]
                }
            }))?;
            let mut tracker = SegmentTracker::from_definition(day.to_definition()?)?;
            let events = tracker.update_progress(850.0, 2.9);
            let step = ReplayStep {
                index: 0,
                events,
                snapshot: tracker.snapshot(),
            };
            (
                synheart_stride::encoder::SNAPSHOT_SCHEMA,
                serde_json::to_value(step)?,
            )
        }
    };

    println!("Schema: {}", name);
    println!("Producer: {} {}", PRODUCER_NAME, STRIDE_VERSION);
    println!("\nExample:");
    println!("{}", serde_json::to_string_pretty(&example)?);
    Ok(())
}

fn format_output(steps: &[ReplayStep], format: &OutputFormat) -> Result<String, StrideCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for step in steps {
                lines.push(serde_json::to_string(step)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(steps)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(steps)?),
    }
}

#[derive(Debug)]
enum StrideCliError {
    Io(io::Error),
    Tracker(synheart_stride::TrackerError),
    Json(serde_json::Error),
    NoSamples,
    ValidationFailed(String),
}

impl From<io::Error> for StrideCliError {
    fn from(e: io::Error) -> Self {
        StrideCliError::Io(e)
    }
}

impl From<synheart_stride::TrackerError> for StrideCliError {
    fn from(e: synheart_stride::TrackerError) -> Self {
        StrideCliError::Tracker(e)
    }
}

impl From<serde_json::Error> for StrideCliError {
    fn from(e: serde_json::Error) -> Self {
        StrideCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<StrideCliError> for CliError {
    fn from(e: StrideCliError) -> Self {
        use synheart_stride::TrackerError;

        match e {
            StrideCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            StrideCliError::Tracker(e) => {
                let (code, hint) = match &e {
                    TrackerError::InvalidDefinition(_) => (
                        "INVALID_DEFINITION",
                        "Fix the training plan content; the session cannot start",
                    ),
                    TrackerError::ModeMismatch { .. } => (
                        "MODE_MISMATCH",
                        "Select the tracking mode from the same training day",
                    ),
                    TrackerError::InvalidState(_) => (
                        "INVALID_STATE",
                        "The saved state does not belong to this training day",
                    ),
                    TrackerError::ParseError(_) | TrackerError::JsonError(_) => (
                        "PARSE_ERROR",
                        "Ensure input matches stride.training_day.v1 / stride.sample.v1",
                    ),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            StrideCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            StrideCliError::NoSamples => CliError {
                code: "NO_SAMPLES".to_string(),
                message: "No samples found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            StrideCliError::ValidationFailed(msg) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: msg,
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    day: u32,
    mode: String,
    definition_valid: bool,
    definition_error: Option<String>,
    total_samples: usize,
    invalid_samples: usize,
    sample_errors: Vec<SampleErrorDetail>,
}

#[derive(serde::Serialize)]
struct SampleErrorDetail {
    index: usize,
    error: String,
}
