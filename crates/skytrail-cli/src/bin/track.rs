//! CLI tool to start tracking aircraft on a Skytrail server and watch their
//! trajectories grow.

use clap::Parser;
use skytrail_cli::summary_line;
use skytrail_sdk::SkytrailClient;
use std::time::Duration;
use tokio::time;

/// Track one or more aircraft and print trajectory statistics
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Skytrail Server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Aircraft identifiers (ICAO24 addresses)
    #[arg(required = true)]
    ids: Vec<String>,

    /// How long to watch, in seconds
    #[arg(long, default_value_t = 300)]
    duration: u64,

    /// Seconds between status reports
    #[arg(long, default_value_t = 15)]
    report_every: u64,

    /// Leave tracking running on the server after exit
    #[arg(long)]
    keep: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Connecting to Skytrail Server at {}...", args.url);
    let client = SkytrailClient::new(&args.url);
    if !client.health().await? {
        anyhow::bail!("Server at {} is not healthy", args.url);
    }

    for id in &args.ids {
        match client.start_tracking(id).await {
            Ok(status) => println!(
                "Tracking {} ({} waypoint(s) so far)",
                status.id, status.waypoint_count
            ),
            Err(e) => eprintln!("Failed to start tracking {}: {}", id, e),
        }
    }
    println!();

    let deadline = time::Instant::now() + Duration::from_secs(args.duration);
    let mut interval = time::interval(Duration::from_secs(args.report_every.max(1)));

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                println!("\nInterrupted");
                break;
            }
        }
        if time::Instant::now() >= deadline {
            break;
        }

        for id in &args.ids {
            match client.statistics(id).await {
                Ok(Some(stats)) => println!("{}", summary_line(&stats)),
                Ok(None) => println!("{:<10} no data yet", id),
                Err(e) => eprintln!("Error fetching statistics for {}: {}", id, e),
            }
        }
        println!();
    }

    if args.keep {
        println!("Leaving {} session(s) running", args.ids.len());
        return Ok(());
    }

    let mut stopped = 0;
    for id in &args.ids {
        match client.stop_tracking(id).await {
            Ok(true) => stopped += 1,
            Ok(false) => {}
            Err(e) => eprintln!("Failed to stop tracking {}: {}", id, e),
        }
    }
    println!("Stopped {} tracking session(s)", stopped);
    Ok(())
}
