mod collect;
mod config;
mod github;
mod model;
mod storage;
mod utils;

use crate::collect::{Collected, RetryFetcher, Scheduler};
use crate::config::{Mode, RunConfig};
use crate::github::GhCli;
use crate::model::{PeriodSet, Result, Team};
use crate::storage::persist;
use crate::utils::MultiProgressNew;
use chrono::Local;
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Collects code review counts for every team member over four periods.
#[derive(Parser, Debug, Clone)]
#[command(name = "review-metrics", version)]
struct Args {
    /// Team definition with `team_name` and `members`
    #[arg(long = "config", default_value = "team_config.json")]
    config_path: PathBuf,
    /// Directory receiving run documents and detail files
    #[arg(long = "data-dir", default_value = "data")]
    data_dir: PathBuf,
    /// Use deterministic mock data, no delays, fixed output file
    #[arg(long)]
    test: bool,
    /// Walk the schedule without querying GitHub, waiting, or writing files
    #[arg(long = "dry-run")]
    dry_run: bool,
    /// Keep per-member detail files (default)
    #[arg(long, overrides_with = "no_details")]
    details: bool,
    /// Skip per-member detail files
    #[arg(long = "no-details", overrides_with = "details")]
    no_details: bool,
    /// Seconds to wait between members
    #[arg(long, value_name = "SECONDS")]
    throttle: Option<u64>,
    /// Disable the member and period delays
    #[arg(long = "no-throttle")]
    no_throttle: bool,
    /// Calendar year of the fixed periods
    #[arg(long, default_value_t = 2025)]
    year: i32,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "review_metrics=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    let team = Team::from_config(&args.config_path)?;
    let mode = Mode {
        test: args.test,
        dry_run: args.dry_run,
    };
    let config = RunConfig::new(mode, args.data_dir.clone(), Local::now().date_naive(), args.year)
        .with_details(args.details || !args.no_details)
        .with_throttle(args.throttle, args.no_throttle);
    let periods = PeriodSet::new(config.today, config.year);

    let multi_progress = MultiProgress::default();
    let status_pb = multi_progress.status_line();
    let members_pb = multi_progress.members_bar(team.members.len());

    let collected = collect(&team, &periods, &config, &status_pb, &members_pb).await?;
    members_pb.finish_with_message(format!(
        "✅ Collected {} members ({} degraded queries)",
        collected.document.reviews.len(),
        collected.degraded.len()
    ));
    for degraded in &collected.degraded {
        println!(
            "⚠️ {} / {} counted as 0: {}",
            degraded.user, degraded.period, degraded.reason
        );
    }

    if config.mode.dry_run {
        let path = persist::planned_path(&collected.document, &config.data_dir);
        status_pb.finish_with_message("Dry run finished");
        println!("Dry run: would write `{}`", path.display());
        return Ok(());
    }

    let persisted = persist::write(&collected.document, &config.data_dir)?;
    match &persisted.warning {
        Some(warning) => status_pb.finish_with_message(format!("⚠️ {}", warning)),
        None => status_pb.finish_with_message("✅ Document verified"),
    }
    println!("Wrote `{}`", persisted.path.display());
    if persisted.latest_updated {
        println!("Latest now points to `{}`", persisted.path.display());
    }
    Ok(())
}

async fn collect(
    team: &Team,
    periods: &PeriodSet,
    config: &RunConfig,
    status_pb: &ProgressBar,
    members_pb: &ProgressBar,
) -> Result<Collected> {
    if config.mode.test {
        status_pb.set_message("Test mode: generating mock data ...");
        return Ok(Scheduler::<GhCli>::mock(config).run(team, periods, members_pb).await);
    }

    status_pb.set_message("Looking for `gh` ...");
    let gh = GhCli::locate(config.pacing.query_timeout)?;
    if !config.mode.dry_run {
        status_pb.set_message("Checking GitHub authentication ...");
        gh.check_auth().await?;
    }
    status_pb.set_message(format!("Fetching reviews for team `{}` ...", team.name));

    let fetcher = RetryFetcher::new(gh, config.pacing, config.limit)
        .with_details(config.details_dir())
        .with_dry_run(config.mode.dry_run);
    Ok(Scheduler::remote(fetcher, config).run(team, periods, members_pb).await)
}
