//! Fleet timeline - reservation windows for a fixed fleet across areas
//!
//! Pulls the spreadsheet-backed vehicle sheet, normalizes it into per-area
//! vehicle lists, and maintains each area's reservation schedule in a local
//! cache. The timeline geometry printed by `show` is the same data a
//! rendering front end would consume.
//!
//! Module structure:
//! - `domain/` - Core business types (Payload, Vehicle, Schedule)
//! - `io/` - External interfaces (HTTP source, cache)
//! - `services/` - Business logic (normalizer, classifier, store, layout)
//! - `infra/` - Infrastructure (Config)

use anyhow::Context;
use clap::{Parser, Subcommand};
use fleet_timeline::domain::types::AreaSlug;
use fleet_timeline::infra::Config;
use fleet_timeline::io::HttpSource;
use fleet_timeline::services::{layout, AreaBoard, Ingestor, LayoutConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Fleet timeline - per-area vehicle reservation schedules
#[derive(Parser, Debug)]
#[command(name = "fleet-timeline", version, about)]
struct Args {
    /// Path to TOML configuration file (falls back to the CONFIG_FILE
    /// environment variable, then config/dev.toml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the remote sheet and rebuild every area's cached vehicle list
    Refresh,
    /// Show one area's vehicles and their timeline geometry
    Show {
        /// Area slug (yamato, ebina, chofu)
        #[arg(long)]
        area: String,
    },
    /// Add a reservation window to a vehicle
    Add {
        #[arg(long)]
        area: String,
        /// Vehicle position in the area list (0-based)
        #[arg(long)]
        vehicle: usize,
        /// Window start, e.g. 2024-01-01T10:00
        #[arg(long)]
        start: String,
        /// Window end, e.g. 2024-01-01T12:00
        #[arg(long)]
        end: String,
    },
    /// Overwrite an existing reservation window
    Edit {
        #[arg(long)]
        area: String,
        #[arg(long)]
        vehicle: usize,
        /// Schedule position within the vehicle (0-based, insertion order)
        #[arg(long)]
        schedule: usize,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Delete a reservation window
    Delete {
        #[arg(long)]
        area: String,
        #[arg(long)]
        vehicle: usize,
        #[arg(long)]
        schedule: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging, level configurable via RUST_LOG (default: info)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(Config::default_config_path);
    let config = Arc::new(Config::load_from_path(&config_path));

    info!(
        config_file = %config.config_file(),
        endpoint = %config.endpoint(),
        slot_minutes = %config.slot_minutes(),
        slot_width_px = %config.slot_width_px(),
        total_hours = %config.total_hours(),
        cache_dir = %config.cache_dir(),
        "config_loaded"
    );

    let source = Arc::new(HttpSource::new(&config).context("Failed to build HTTP source")?);
    let ingestor = Ingestor::new(config.clone(), source);

    match args.command {
        Command::Refresh => {
            let counts = ingestor.refresh().await;
            for (slug, count) in counts {
                println!("{slug}: {count} vehicles");
            }
        }
        Command::Show { area } => {
            let slug: AreaSlug = area.parse()?;
            let board = ingestor.board(slug).await;
            show_area(&board, &config);
        }
        Command::Add { area, vehicle, start, end } => {
            let slug: AreaSlug = area.parse()?;
            let mut board = ingestor.board(slug).await;
            let id = board
                .vehicle_at(vehicle)
                .with_context(|| format!("no vehicle at position {vehicle}"))?;
            board.add_schedule(id, &start, &end)?;
            ingestor.save_board(board)?;
        }
        Command::Edit { area, vehicle, schedule, start, end } => {
            let slug: AreaSlug = area.parse()?;
            let mut board = ingestor.board(slug).await;
            let vehicle_id = board
                .vehicle_at(vehicle)
                .with_context(|| format!("no vehicle at position {vehicle}"))?;
            let schedule_id = board
                .schedule_at(vehicle_id, schedule)
                .with_context(|| format!("no schedule at position {schedule}"))?;
            board.edit_schedule(vehicle_id, schedule_id, &start, &end)?;
            ingestor.save_board(board)?;
        }
        Command::Delete { area, vehicle, schedule } => {
            let slug: AreaSlug = area.parse()?;
            let mut board = ingestor.board(slug).await;
            // Stale positions are a silent no-op, matching the store contract
            if let Some(vehicle_id) = board.vehicle_at(vehicle) {
                if let Some(schedule_id) = board.schedule_at(vehicle_id, schedule) {
                    board.delete_schedule(vehicle_id, schedule_id);
                }
            }
            ingestor.save_board(board)?;
        }
    }

    Ok(())
}

/// Print an area's vehicles with the geometry a renderer would consume
fn show_area(board: &AreaBoard, config: &Config) {
    let layout_config = LayoutConfig::from_config(config);
    let day_start = fleet_timeline::services::layout::local_day_start();

    println!(
        "{} ({} vehicles, timeline {}px)",
        board.area(),
        board.vehicles().len(),
        layout_config.timeline_width_px()
    );
    for (index, vehicle) in board.vehicles().iter().enumerate() {
        println!("[{index}] {}", vehicle.name);
        for schedule in &vehicle.schedules {
            let geo = layout(schedule, day_start, &layout_config);
            let buffers = match (geo.buffer_before, geo.buffer_after) {
                (Some(_), Some(_)) => "both",
                (Some(_), None) => "before",
                (None, Some(_)) => "after",
                (None, None) => "none",
            };
            println!(
                "    {}  left={:.1}px width={:.1}px buffers={}",
                schedule.label(),
                geo.bar_left_px,
                geo.bar_width_px,
                buffers
            );
        }
    }
}
