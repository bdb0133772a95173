use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::IVec2;

use atmos_grid::config::AtmosConfig;
use atmos_grid::demo::{default_injection, Room};
use atmos_grid::world::Atmosphere;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of ticks to simulate
    #[arg(long, default_value = "200")]
    ticks: u64,

    /// RON config file (default: ./atmos.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Floor tiles per side of the sealed room
    #[arg(long, default_value = "24")]
    room_size: i32,

    /// Oxygen moles injected at the room center
    #[arg(long)]
    inject_moles: Option<u32>,

    /// Log a progress line every N ticks
    #[arg(long, default_value = "20")]
    report_every: u64,

    /// Print the effective configuration as RON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AtmosConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => AtmosConfig::load()?,
    };

    if args.print_config {
        println!("{}", config.to_ron()?);
        return Ok(());
    }

    if args.room_size <= 0 {
        eprintln!("Error: --room-size must be positive");
        std::process::exit(1);
    }

    log::info!("Starting atmos-grid headless run");
    run(&args, config)
}

fn run(args: &Args, config: AtmosConfig) -> anyhow::Result<()> {
    let mut atmos = Atmosphere::new(config).context("Failed to create atmosphere")?;

    let room = Room::new(IVec2::splat(-args.room_size / 2), args.room_size);
    room.build(&mut atmos);

    let injected = args.inject_moles.unwrap_or_else(default_injection);
    room.inject_center(&mut atmos, injected);
    let initial = atmos.count_moles();

    let report_every = args.report_every.max(1);
    let start = std::time::Instant::now();
    for _ in 0..args.ticks {
        let report = atmos.step();
        if report.tick % report_every == 0 {
            let center = room.center();
            log::info!(
                "Tick {}: {} moles in {} chunks, center pressure {:.1}",
                report.tick,
                report.total_moles,
                atmos.chunk_count(),
                atmos.get_pressure(center.x, center.y)
            );
        }
    }
    let elapsed = start.elapsed();

    let remaining = atmos.count_moles();
    log::info!(
        "Finished {} ticks in {:.2?} ({:.2?}/tick)",
        args.ticks,
        elapsed,
        elapsed / args.ticks.max(1) as u32
    );
    if remaining == initial {
        log::info!("Room conserved all {} moles", initial);
    } else {
        log::warn!("Room moles changed: {} -> {}", initial, remaining);
    }
    Ok(())
}
