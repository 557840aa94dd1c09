use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime, TimeZone};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timesheet_digest::clickup::{self, ClickUpClient};
use timesheet_digest::config::{ClickUpConfig, Config, GeminiConfig};
use timesheet_digest::models::TimeWindow;
use timesheet_digest::pipeline::{self, Pipeline};
use timesheet_digest::render::render_tree;
use timesheet_digest::report::{gemini, GeminiClient};
use timesheet_digest::store::SnapshotStore;

#[derive(Parser)]
#[command(name = "tsd")]
#[command(about = "Weekly status reports from ClickUp time tracking")]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SettingsArgs {
    /// ClickUp personal API token
    #[arg(long, env = "CLICKUP_API_KEY", hide_env_values = true, global = true)]
    clickup_api_key: Option<String>,

    /// Gemini API key (only needed for reports)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    gemini_api_key: Option<String>,

    /// Workspace name to use when the token sees more than one
    #[arg(long, env = "CLICKUP_WORKSPACE", global = true)]
    workspace: Option<String>,

    /// Gemini model id
    #[arg(long, env = "GEMINI_MODEL", default_value = gemini::DEFAULT_MODEL, global = true)]
    model: String,

    #[arg(long, env = "CLICKUP_API_URL", default_value = clickup::client::DEFAULT_URL, global = true)]
    clickup_url: String,

    #[arg(long, env = "GEMINI_API_URL", default_value = gemini::DEFAULT_URL, global = true)]
    gemini_url: String,

    /// Directory for task.json and report.md
    #[arg(long, env = "TSD_OUTPUT_DIR", default_value = ".", global = true)]
    output_dir: PathBuf,
}

#[derive(Args, Default)]
struct WindowArgs {
    /// Fetch every time entry instead of last week's
    #[arg(long, conflicts_with_all = ["reference", "since"])]
    all_time: bool,

    /// Report on the week before this date (YYYY-MM-DD) instead of today
    #[arg(long, conflicts_with = "since")]
    reference: Option<NaiveDate>,

    /// First day of a custom range (YYYY-MM-DD, local calendar)
    #[arg(long, requires = "until")]
    since: Option<NaiveDate>,

    /// Last day of a custom range, inclusive
    #[arg(long, requires = "since")]
    until: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the workspaces the token can see
    Workspaces,
    /// Print the reporting window
    Window {
        /// Compute the window relative to this date (YYYY-MM-DD)
        #[arg(long)]
        reference: Option<NaiveDate>,
    },
    /// Aggregate time entries into task.json
    Collect {
        #[command(flatten)]
        window: WindowArgs,

        /// Tasks to enrich concurrently (1 = sequential)
        #[arg(short, long, default_value = "1")]
        concurrency: usize,

        /// Print a tree summary of the document
        #[arg(long)]
        tree: bool,
    },
    /// Aggregate, then generate report.md (default)
    Report {
        #[command(flatten)]
        window: WindowArgs,

        /// Tasks to enrich concurrently (1 = sequential)
        #[arg(short, long, default_value = "1")]
        concurrency: usize,

        /// Reuse an existing document instead of fetching. No window is sent
        /// with it unless --reference or --since/--until is given.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

impl SettingsArgs {
    fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone(),
            base_url: self.gemini_url.clone(),
            model: self.model.clone(),
            ..GeminiConfig::default()
        }
    }

    fn config(&self, concurrency: usize) -> Result<Config> {
        let api_key = self
            .clickup_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .context("CLICKUP_API_KEY is not set")?;

        let mut config = Config::new(ClickUpConfig {
            api_key,
            base_url: self.clickup_url.clone(),
        });
        config.gemini = self.gemini();
        config.workspace_name = self.workspace.clone();
        config.output_dir = self.output_dir.clone();
        config.concurrency = concurrency;
        Ok(config)
    }
}

impl WindowArgs {
    /// The requested window, or `fallback` when no window flag was given.
    fn resolve(&self, fallback: impl FnOnce() -> Option<TimeWindow>) -> Result<Option<TimeWindow>> {
        if self.all_time {
            return Ok(None);
        }
        if let (Some(since), Some(until)) = (self.since, self.until) {
            return Ok(Some(TimeWindow::between_dates(&Local, since, until)?));
        }
        match self.reference {
            Some(date) => reference_window(date).map(Some),
            None => Ok(fallback()),
        }
    }

    fn window(&self) -> Result<Option<TimeWindow>> {
        self.resolve(|| Some(TimeWindow::previous_week_local()))
    }

    /// Window for a stored snapshot, which may come from any earlier week.
    fn snapshot_window(&self) -> Result<Option<TimeWindow>> {
        self.resolve(|| None)
    }
}

fn reference_window(date: NaiveDate) -> Result<TimeWindow> {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).context("invalid time")?;
    let now = Local
        .from_local_datetime(&date.and_time(noon))
        .earliest()
        .with_context(|| format!("{} has no local noon", date))?;
    Ok(TimeWindow::previous_week(&now))
}

/// Initialize tracing on stderr; stdout carries the report and tree output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "timesheet_digest=info,tsd=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let command = cli.command.unwrap_or(Commands::Report {
        window: WindowArgs::default(),
        concurrency: 1,
        input: None,
    });

    match command {
        Commands::Workspaces => {
            let config = cli.settings.config(1)?;
            let workspaces = ClickUpClient::from_config(&config.clickup)
                .list_workspaces()
                .await?;
            for workspace in workspaces {
                println!("{}\t{}", workspace.id, workspace.name);
            }
        }
        Commands::Window { reference } => {
            let window = match reference {
                Some(date) => reference_window(date)?,
                None => TimeWindow::previous_week_local(),
            };
            println!(
                "start: {} ({})",
                window.start().with_timezone(&Local).to_rfc3339(),
                window.start_ms
            );
            println!(
                "end:   {} ({})",
                window.end().with_timezone(&Local).to_rfc3339(),
                window.end_ms
            );
        }
        Commands::Collect {
            window,
            concurrency,
            tree,
        } => {
            let config = cli.settings.config(concurrency)?;
            let store = SnapshotStore::new(&config.output_dir);
            let summary = pipeline::run(
                &Pipeline::from_config(&config),
                &store,
                None,
                window.window()?,
            )
            .await?;

            println!("data saved to {}", summary.document.display());
            if tree {
                print!("{}", render_tree(&summary.collected.tasks));
            }
        }
        Commands::Report {
            window,
            concurrency,
            input,
        } => {
            if let Some(input) = input {
                let window = window.snapshot_window()?;
                let store = SnapshotStore::new(&cli.settings.output_dir);
                let tasks = SnapshotStore::read_document(&input)?;
                let generator = GeminiClient::from_config(&cli.settings.gemini())?;
                let report = pipeline::generate(&generator, &store, &tasks, window)
                    .await?
                    .context("report generation failed")?;
                println!("{}", report.text);
                return Ok(());
            }

            let window = window.window()?;
            let config = cli.settings.config(concurrency)?;
            let store = SnapshotStore::new(&config.output_dir);
            let generator = GeminiClient::from_config(&config.gemini);
            let summary = pipeline::run(
                &Pipeline::from_config(&config),
                &store,
                generator.as_ref().ok(),
                window,
            )
            .await?;
            println!("data saved to {}", summary.document.display());

            if let Err(e) = generator {
                return Err(e).context("document saved, but no report was generated");
            }
            match summary.report {
                Some(Ok(report)) => println!("\n{}", report.text),
                Some(Err(e)) => {
                    return Err(e).context("document saved, but no report was generated")
                }
                None => {}
            }
        }
    }

    Ok(())
}
