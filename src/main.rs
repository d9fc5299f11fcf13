//! campaign-dashboard: prints the annotated leader hierarchy for one organizer
//!
//! Reads a JSON record snapshot, rebuilds the dashboard, and writes the view
//! as pretty JSON to stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use campaign_core::{parse_date, DateWindow, RecurrencePeriod};
use campaign_dashboard::{ConfigService, DashboardRequest, DashboardService, SnapshotDataSource};
use campaign_hierarchy::{SortDirection, SortKey, SortState};
use chrono::Utc;
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "campaign-dashboard")]
#[command(about = "Leader hierarchy and goal progress for an organizing campaign")]
struct Cli {
    /// Path to the JSON record snapshot
    #[arg(short, long, env = "CAMPAIGN_SNAPSHOT")]
    snapshot: PathBuf,

    /// Organizer whose leader tree is shown
    #[arg(short, long)]
    root: String,

    /// Restrict rosters and live actions to one chapter
    #[arg(long)]
    chapter: Option<String>,

    /// Sort key: name, leaders, status, total, <action>, count::<action>::<stage>,
    /// conversion::<action>::<from>::<to>
    #[arg(long)]
    sort: Option<String>,

    /// Sort direction
    #[arg(long, default_value = "desc")]
    direction: String,

    /// Only top-level leaders who have leaders under them
    #[arg(long)]
    leaders_of_leaders: bool,

    /// Window start (YYYY-MM-DD) for rate-based actions
    #[arg(long, requires = "to", conflicts_with = "period")]
    from: Option<String>,

    /// Window end (YYYY-MM-DD), inclusive
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Use the current period: daily, weekly, biweekly, monthly, quarterly, yearly
    #[arg(long)]
    period: Option<String>,

    /// Reference day for --period (defaults to today)
    #[arg(long, requires = "period")]
    on: Option<String>,

    /// Config file (defaults to ~/.campaign-dashboard/config.json)
    #[arg(short, long, env = "CAMPAIGN_DASHBOARD_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    fn window(&self) -> anyhow::Result<Option<DateWindow>> {
        if let (Some(from), Some(to)) = (&self.from, &self.to) {
            return Ok(Some(DateWindow::parse(from, to)?));
        }
        let Some(period) = &self.period else {
            return Ok(None);
        };
        let period: RecurrencePeriod = period.parse()?;
        let on = match &self.on {
            Some(on) => parse_date(on)?,
            None => Utc::now().date_naive(),
        };
        Ok(Some(DateWindow::for_period(period, on)?))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("campaign_dashboard=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::open(path),
        None => ConfigService::new(),
    }
    .context("Failed to load dashboard config")?;
    let config = config_service.get_config_clone();

    let sort_key: SortKey = cli
        .sort
        .as_deref()
        .unwrap_or(config.default_sort.as_str())
        .parse()
        .context("Invalid sort key")?;
    let direction: SortDirection = cli.direction.parse().context("Invalid sort direction")?;
    let window = cli.window().context("Invalid date window")?;

    let source = SnapshotDataSource::from_file(&cli.snapshot)
        .with_context(|| format!("Failed to read snapshot {}", cli.snapshot.display()))?;
    let records = source.snapshot();
    info!(
        snapshot = %cli.snapshot.display(),
        root = %cli.root,
        "Loaded campaign records"
    );

    let service = DashboardService::new(records, Arc::new(source), config);
    let request = DashboardRequest::new(cli.root.clone())
        .with_chapter(cli.chapter.clone())
        .with_sort(SortState {
            key: sort_key,
            direction,
        })
        .with_leaders_of_leaders(cli.leaders_of_leaders)
        .with_window(window);

    let view = service.rebuild(&request).await?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
