use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use installpages::ci::client::DEFAULT_API_BASE;
use installpages::ci::{BitriseClient, BuildStatus, ClientConfig};
use installpages::pipeline::{BuildFilter, RunReport};

#[derive(Parser)]
#[command(
    name = "installpages",
    about = "Collect the latest public install pages of CI-built apps",
    version,
    long_about = None
)]
struct Cli {
    /// Bitrise personal access token
    #[arg(long, env = "BITRISE_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Bitrise API base URL
    #[arg(long, env = "BITRISE_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    api_base: String,

    /// Application list (JSON array or TOML with [[apps]])
    #[arg(long, env = "APPS_PATH", default_value = "apps.json", global = true)]
    apps: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30", global = true)]
    timeout_secs: u64,

    /// Builds requested per app
    #[arg(long, env = "BUILD_LIMIT", default_value = "50", global = true)]
    build_limit: u32,

    /// Emit logs as JSON lines
    #[arg(long, env = "INSTALLPAGES_LOG_JSON", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest install page per app for one optional workflow/status filter
    Fetch {
        /// Only consider builds of this workflow
        #[arg(long, env = "WORKFLOW")]
        workflow: Option<String>,

        /// Only consider builds with this status (name or code 1-3)
        #[arg(long, env = "STATUS")]
        status: Option<BuildStatus>,

        /// Write the report JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run several workflows and write JSON data plus a Markdown table
    Report {
        /// Workflows to report on, comma separated
        #[arg(long, env = "WORKFLOWS", value_delimiter = ',', default_value = "uat,qa")]
        workflows: Vec<String>,

        /// Build status to require
        #[arg(long, env = "STATUS", default_value = "success")]
        status: BuildStatus,

        /// JSON data output path
        #[arg(long, env = "JSON_PATH", default_value = "allAppData.json")]
        json_path: PathBuf,

        /// Markdown output path
        #[arg(long, env = "MD_PATH", default_value = "markdown.md")]
        md_path: PathBuf,

        /// Markdown document title
        #[arg(long, env = "MD_TITLE", default_value = "Apps")]
        title: String,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_summary(workflow: &str, report: &RunReport) {
    println!("[{}] {}", workflow, report.summary());
    if let Some(w) = &report.warning {
        println!("[{}] WARNING: {}", workflow, w);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    // Configuration problems are fatal before any request is made.
    let apps = installpages::config::load_apps(&cli.apps)?;
    let token = cli
        .token
        .filter(|t| !t.trim().is_empty())
        .context("BITRISE_TOKEN is not set")?;

    let client = BitriseClient::new(ClientConfig {
        api_base: cli.api_base,
        token,
        timeout: Duration::from_secs(cli.timeout_secs),
        build_limit: cli.build_limit,
    })?;
    tracing::info!("Getting information for {} apps", apps.len());

    match cli.command {
        Commands::Fetch {
            workflow,
            status,
            output,
        } => {
            let filter = BuildFilter::new(workflow, status);
            let report =
                installpages::fetch(&client, &apps, &filter, output.as_deref()).await?;
            match output {
                Some(_) => print_summary(filter.workflow.as_deref().unwrap_or("*"), &report),
                None => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        Commands::Report {
            workflows,
            status,
            json_path,
            md_path,
            title,
        } => {
            let opts = installpages::ReportOptions {
                workflows: workflows
                    .into_iter()
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty())
                    .collect(),
                status: Some(status),
                json_path,
                markdown_path: md_path,
                title,
            };
            let reports = installpages::report(&client, &apps, &opts).await?;
            for (workflow, report) in reports.iter() {
                print_summary(workflow, report);
            }
        }
    }

    Ok(())
}
