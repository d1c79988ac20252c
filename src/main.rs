//! EMRC Template Lane CLI
//!
//! Entry point for the `emrc-template` command-line tool.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use tracing::{error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use emrc_template_lane::client::aws::AwsClients;
use emrc_template_lane::pipeline::{check_counts, prepare_batch, PipelineError, PipelineResult};
use emrc_template_lane::request::token;
use emrc_template_lane::{Deadline, Pipeline, RunSummary, Settings, TemplateFile};

#[derive(Parser)]
#[command(name = "emrc-template")]
#[command(about = "Provision EMR on EKS job templates and publish their ids to SSM", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create every job template and publish its id
    Run {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build every request offline and print them as JSON
    Validate {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

#[derive(Args)]
struct SettingsArgs {
    /// TOML settings file
    #[arg(long, short = 's')]
    settings: Option<PathBuf>,

    /// AWS region (default: us-east-1)
    #[arg(long)]
    region: Option<String>,

    /// Job template YAML file (default: example.yaml)
    #[arg(long, short = 't')]
    templates: Option<PathBuf>,

    /// SSM parameter names (comma-separated)
    #[arg(long, value_delimiter = ',')]
    parameter_names: Option<Vec<String>>,

    /// Deadline for the whole run in seconds (default: 30)
    #[arg(long)]
    timeout_seconds: Option<u64>,

    /// broadcast or positional
    #[arg(long)]
    assignment: Option<String>,
}

impl SettingsArgs {
    /// CLI layer holding only the flags that were given
    fn overrides(&self) -> Option<Value> {
        let mut layer = Map::new();
        if let Some(region) = &self.region {
            layer.insert("region".to_string(), Value::from(region.as_str()));
        }
        if let Some(path) = &self.templates {
            layer.insert(
                "templates_path".to_string(),
                Value::from(path.to_string_lossy().to_string()),
            );
        }
        if let Some(names) = &self.parameter_names {
            layer.insert("parameter_names".to_string(), Value::from(names.clone()));
        }
        if let Some(seconds) = self.timeout_seconds {
            layer.insert("timeout_seconds".to_string(), Value::from(seconds));
        }
        if let Some(assignment) = &self.assignment {
            layer.insert("assignment".to_string(), Value::from(assignment.as_str()));
        }
        (!layer.is_empty()).then_some(Value::Object(layer))
    }

    fn resolve(&self) -> PipelineResult<Settings> {
        let settings = Settings::resolve(
            self.settings.as_deref(),
            |key| std::env::var(key).ok(),
            self.overrides(),
        )?;
        info!(
            region = %settings.region,
            templates = %settings.templates_path.display(),
            parameter_names = ?settings.parameter_names,
            assignment = %settings.assignment,
            timeout_seconds = settings.timeout_seconds,
            "settings loaded"
        );
        Ok(settings)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run { settings, json } => run_batch(&settings, json),
        Commands::Validate { settings } => run_validate(&settings),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{e}");
            process::exit(e.exit_code());
        }
    }
}

fn run_batch(args: &SettingsArgs, json: bool) -> PipelineResult<i32> {
    let started_at = Utc::now();
    let run_id = uuid::Uuid::new_v4().to_string();

    let settings = args.resolve()?;
    let deadline = Deadline::after(settings.timeout());

    let loaded = TemplateFile::from_file(&settings.templates_path)?;
    info!(run_id = %run_id, count = loaded.len(), digest = %loaded.digest, "job templates loaded");
    check_counts(loaded.len(), settings.parameter_names.len())?;

    let clients = AwsClients::connect(&settings.region, &deadline).map_err(PipelineError::Client)?;
    let mut pipeline = Pipeline::new(
        Arc::new(clients.job_templates),
        Arc::new(clients.parameters),
        settings.parameter_names.clone(),
        settings.assignment,
    );

    let mut templates = loaded.file.job_templates.clone();
    let batch = pipeline.run(&mut templates, &deadline);
    let summary = RunSummary::from_batch(run_id, started_at, &settings, &loaded, &batch);

    if json {
        println!("{}", summary.to_json()?);
    } else {
        for outcome in &summary.templates {
            println!("{}", outcome.human_line());
        }
        println!("{}", summary.human_summary());
    }

    batch.result?;
    Ok(0)
}

fn run_validate(args: &SettingsArgs) -> PipelineResult<i32> {
    let settings = args.resolve()?;
    let loaded = TemplateFile::from_file(&settings.templates_path)?;

    let mut templates = loaded.file.job_templates;
    let mut next_token = token::time_seeded();
    let requests = prepare_batch(&mut templates, &settings.parameter_names, &mut *next_token)?;

    println!("{}", serde_json::to_string_pretty(&requests)?);
    info!(count = requests.len(), "all job template requests are valid");
    Ok(0)
}
