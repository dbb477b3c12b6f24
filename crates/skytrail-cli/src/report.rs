//! Human-readable statistics output.

use skytrail_core::TrajectoryStatistics;

fn metric(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.0}{}", v, unit),
        None => "-".to_string(),
    }
}

/// One-line status for a tracked aircraft.
pub fn summary_line(stats: &TrajectoryStatistics) -> String {
    let label = stats.label.as_deref().unwrap_or(&stats.id);
    let track = match stats.current_track_deg {
        Some(deg) => format!("{:.0}°", deg),
        None => "-".to_string(),
    };
    format!(
        "{:<10} {:>4} pts  {:>8.2} km  {:>5}s  pos ({:.4}, {:.4})  alt {}  spd {}  trk {}{}",
        label,
        stats.waypoint_count,
        stats.distance_traveled_km,
        stats.tracking_duration_ms / 1000,
        stats.current_position.lat,
        stats.current_position.lon,
        metric(stats.altitude.current, "m"),
        metric(stats.velocity.current, "m/s"),
        track,
        if stats.on_ground == Some(true) { "  [ground]" } else { "" },
    )
}
