//! Evaluation CLI for sqlbench agents.
//!
//! Score single answers, grade recorded agent runs against a case set, and
//! drive the data-source tools by hand.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use sqlbench_core::ToolRegistry;
use sqlbench_data_sources::{register_tools, DataSourceCatalog, DEFAULT_ROOT};
use sqlbench_eval::{
    load_runs, score_recorded_with_progress, CaseSet, ConfigLoader, Contains, Correctness,
    Dataset, EvalProgress, EvalSummary, JsonFileDataset, Reward, RewardPolicy, Scorers,
    ScoringInput, SqlbenchConfig,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

/// Evaluation CLI for sqlbench agents.
#[derive(Parser, Debug)]
#[command(name = "sqlbench-eval")]
#[command(about = "Score and grade agents answering questions about data sources")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ~/.sqlbench/config.toml and ./sqlbench.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data-source catalog directory
    #[arg(long, global = true, env = "SQLBENCH_DATA_SOURCES")]
    data_sources: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score one answer and show the reward breakdown
    Score {
        /// The agent's final answer
        #[arg(long)]
        answer: String,

        /// The expected answer
        #[arg(long)]
        expected: String,

        /// Actions the agent executed
        #[arg(long, allow_hyphen_values = true)]
        actions: i64,

        /// Optimal action budget (default: from config, normally 10)
        #[arg(long)]
        optimal: Option<u32>,
    },

    /// List the evaluation cases
    Cases {
        /// JSON case file (default: built-in employees benchmark)
        #[arg(long, short = 'd')]
        dataset: Option<PathBuf>,
    },

    /// Grade recorded agent runs against a case set
    Grade {
        /// JSON file with an array of {question, final_answer, n_actions}
        #[arg(long)]
        runs: PathBuf,

        /// JSON case file (default: built-in employees benchmark)
        #[arg(long, short = 'd')]
        dataset: Option<PathBuf>,

        /// Comma-separated list of scorers: reward, correctness, contains
        #[arg(long, default_value = "reward,correctness,contains")]
        scorer: String,

        /// Output format: table or json
        #[arg(long, short = 'o', default_value = "table")]
        output: String,

        /// Output file path (defaults to stdout for table, required for json)
        #[arg(long)]
        output_file: Option<PathBuf>,
    },

    /// Inspect data sources through the agent tools
    Sources {
        #[command(subcommand)]
        action: SourcesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SourcesCommand {
    /// List every data source
    List,

    /// Show the README of a data source
    Describe { name: String },

    /// Show the schema of a SQLite data source
    Schema { name: String },

    /// Run a SQL statement against a SQLite data source
    Query { name: String, sql: String },
}

const SCORER_NAMES: [&str; 3] = ["reward", "correctness", "contains"];

impl Command {
    /// Validate subcommand arguments.
    fn validate(&self) -> Result<(), String> {
        if let Command::Grade { scorer, output, .. } = self {
            if !["table", "json"].contains(&output.as_str()) {
                return Err(format!(
                    "Invalid output format '{}'. Use 'table' or 'json'.",
                    output
                ));
            }

            for name in scorer.split(',') {
                let name = name.trim();
                if !SCORER_NAMES.contains(&name) {
                    return Err(format!(
                        "Invalid scorer '{}'. Use reward, correctness, or contains.",
                        name
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Build Scorers from a comma-separated list.
fn build_scorers(list: &str, policy: RewardPolicy) -> Scorers {
    let mut scorers = Scorers::new(vec![]);
    for name in list.split(',') {
        match name.trim() {
            "reward" => scorers.add(Reward::new(policy)),
            "correctness" => scorers.add(Correctness::new(policy)),
            "contains" => scorers.add(Contains),
            _ => {} // Already validated
        }
    }
    scorers
}

fn load_config(cli: &Cli) -> Result<SqlbenchConfig, String> {
    match &cli.config {
        Some(path) => ConfigLoader::load_file(path).map_err(|e| e.to_string()),
        None => {
            let (config, loaded) = ConfigLoader::new().load();
            for path in loaded {
                log::info!("Loaded config from {}", path.display());
            }
            Ok(config)
        }
    }
}

/// Load a case file, filling missing budgets from the configured default.
async fn load_cases(
    dataset: Option<&PathBuf>,
    default_optimal_actions: u32,
) -> Result<(String, CaseSet), String> {
    match dataset {
        None => Ok(("employees".to_string(), CaseSet::employees())),
        Some(path) => {
            if !path.exists() {
                return Err(format!("Dataset file not found: {}", path.display()));
            }
            let dataset = JsonFileDataset::new(path.clone())
                .with_default_optimal_actions(default_optimal_actions);
            let cases = dataset
                .load(None)
                .await
                .map_err(|e| format!("Failed to load dataset: {}", e))?;
            Ok((dataset.name().to_string(), cases))
        }
    }
}

fn score(
    policy: RewardPolicy,
    answer: &str,
    expected: &str,
    actions: i64,
    optimal: Option<u32>,
) -> Result<(), String> {
    let input = ScoringInput::new(answer, expected, actions)
        .with_optimal_actions(optimal.unwrap_or(policy.default_optimal_actions));
    let breakdown = policy.breakdown(&input).map_err(|e| e.to_string())?;

    println!("Similarity:  {:.6}", breakdown.similarity);
    println!("Correctness: {:.6}", breakdown.correctness);
    println!(
        "Efficiency:  {:.6} ({} extra actions over {})",
        breakdown.efficiency, breakdown.extra_actions, input.optimal_actions
    );
    println!("Reward:      {}", breakdown.reward);
    Ok(())
}

fn print_cases(name: &str, cases: &CaseSet) {
    println!("=== {} ({} cases) ===", name, cases.len());
    for (index, case) in cases.iter().enumerate() {
        println!();
        println!("[{}] {}", index + 1, case.question);
        println!("    answer: {}", case.expected_answer);
        println!("    optimal actions: {}", case.optimal_actions);
    }
}

/// Grade recorded runs with a progress bar.
async fn grade(
    dataset: Option<&PathBuf>,
    runs: &Path,
    default_optimal_actions: u32,
    scorers: Scorers,
) -> Result<EvalSummary, String> {
    let start_time = Instant::now();
    let (dataset_name, cases) = load_cases(dataset, default_optimal_actions).await?;
    let runs = load_runs(runs)
        .await
        .map_err(|e| format!("Failed to load runs: {}", e))?;

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .map_err(|e| format!("Invalid progress template: {}", e))?
            .progress_chars("#>-"),
    );

    let results = score_recorded_with_progress(&cases, &runs, &scorers, |progress| match progress {
        EvalProgress::Started { total } => {
            progress_bar.set_length(total as u64);
            progress_bar.set_message("Grading...");
        }
        EvalProgress::CaseCompleted {
            completed, success, ..
        } => {
            progress_bar.set_position(completed as u64);
            if !success {
                progress_bar.set_message("(some failures)");
            }
        }
        _ => {} // Handle future variants gracefully
    });
    progress_bar.finish_with_message("Complete");

    Ok(EvalSummary::from_results(
        dataset_name,
        "recorded".to_string(),
        results,
        start_time.elapsed(),
    ))
}

/// Output results in the requested format.
fn output_results(
    summary: &EvalSummary,
    output: &str,
    output_file: Option<&PathBuf>,
) -> Result<(), String> {
    match output {
        "table" => {
            summary.print_summary();
            if let Some(path) = output_file {
                summary
                    .write_json(path)
                    .map_err(|e| format!("Failed to write output file: {}", e))?;
                println!("\nDetailed results written to: {}", path.display());
            }
        }
        "json" => {
            let json = serde_json::to_string_pretty(summary)
                .map_err(|e| format!("Failed to serialize results: {}", e))?;

            if let Some(path) = output_file {
                std::fs::write(path, &json)
                    .map_err(|e| format!("Failed to write output file: {}", e))?;
                eprintln!("Results written to: {}", path.display());
            } else {
                println!("{}", json);
            }
        }
        _ => return Err(format!("Invalid output format '{}'", output)),
    }
    Ok(())
}

/// Call one data-source tool and print its output.
async fn sources(root: PathBuf, action: &SourcesCommand) -> Result<(), String> {
    let mut registry = ToolRegistry::new();
    register_tools(&mut registry, DataSourceCatalog::new(root));

    let (tool, input) = match action {
        SourcesCommand::List => ("list_data_sources", json!({})),
        SourcesCommand::Describe { name } => {
            ("describe_data_source", json!({ "data_source_name": name }))
        }
        SourcesCommand::Schema { name } => {
            ("sqlite_get_schema", json!({ "data_source_name": name }))
        }
        SourcesCommand::Query { name, sql } => (
            "sqlite_query",
            json!({ "data_source_name": name, "sql_query": sql }),
        ),
    };

    let result = registry
        .call(tool, input)
        .await
        .map_err(|e| format!("{} failed: {}", tool, e))?;
    println!("{}", result.content);

    if result.metadata["error"] == true {
        return Err(format!("{} reported an error", tool));
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<(), String> {
    cli.command.validate()?;

    let config = load_config(cli)?;
    let policy = config.reward_policy().map_err(|e| e.to_string())?;

    match &cli.command {
        Command::Score {
            answer,
            expected,
            actions,
            optimal,
        } => score(policy, answer, expected, *actions, *optimal),
        Command::Cases { dataset } => {
            let (name, cases) =
                load_cases(dataset.as_ref(), policy.default_optimal_actions).await?;
            print_cases(&name, &cases);
            Ok(())
        }
        Command::Grade {
            runs,
            dataset,
            scorer,
            output,
            output_file,
        } => {
            let summary = grade(
                dataset.as_ref(),
                runs,
                policy.default_optimal_actions,
                build_scorers(scorer, policy),
            )
            .await?;
            output_results(&summary, output, output_file.as_ref())
        }
        Command::Sources { action } => {
            let root = cli
                .data_sources
                .clone()
                .or_else(|| config.data_sources_root().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
            sources(root, action).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
