//! CLI tool to download trajectories from a Skytrail server as JSON or
//! GeoJSON files.

use chrono::Utc;
use clap::Parser;
use skytrail_cli::export::{default_output_path, write_document};
use skytrail_cli::ExportFormat;
use skytrail_sdk::SkytrailClient;
use std::path::PathBuf;

/// Export tracked trajectories to a file
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Skytrail Server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Aircraft identifier; omit to export every trajectory
    #[arg(long)]
    id: Option<String>,

    /// Output format: json or geojson
    #[arg(long, default_value = "json")]
    format: ExportFormat,

    /// Output file (default: trajectory_<id>_<unix-ms>.<ext>)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Directory for the default file name
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = SkytrailClient::new(&args.url);

    let now = Utc::now();
    let path = args.output.clone().unwrap_or_else(|| {
        default_output_path(args.dir.as_deref(), args.id.as_deref(), args.format, now)
    });

    let (written, waypoints) = match (&args.id, args.format) {
        (Some(id), ExportFormat::Json) => {
            let export = client.export(id).await?;
            (write_document(&path, &export)?, export.trajectory.len())
        }
        (Some(id), ExportFormat::GeoJson) => {
            let feature = client.geojson(id).await?;
            let count = feature.properties.waypoint_count;
            (write_document(&path, &feature)?, count)
        }
        (None, ExportFormat::Json) => {
            let mut exports = Vec::new();
            for status in client.tracking_status().await? {
                exports.push(client.export(&status.id).await?);
            }
            let count = exports.iter().map(|e| e.trajectory.len()).sum();
            (write_document(&path, &exports)?, count)
        }
        (None, ExportFormat::GeoJson) => {
            let collection = client.all_geojson().await?;
            let count = collection.metadata.total_waypoints;
            (write_document(&path, &collection)?, count)
        }
    };

    if waypoints == 0 {
        eprintln!("Warning: no trajectory data available");
    }
    println!(
        "Exported {} waypoint(s) as {} to {} ({} bytes)",
        waypoints,
        args.format,
        path.display(),
        written
    );
    Ok(())
}
