use anyhow::Result;
use clap::Parser;
use relsim::Args;

#[cfg(feature = "tracy")]
#[global_allocator]
static GLOBAL: tracy_client::ProfiledAllocator<std::alloc::System> =
    tracy_client::ProfiledAllocator::new(std::alloc::System, 100);

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let trace_level = args.trace_level.parse().unwrap_or_else(|e| {
        log::warn!("{}", e);
        relsim_core::profiling::TraceLevel::default()
    });
    relsim_core::profiling::init_tracy(trace_level);

    log::info!("Starting relsim...");
    let universe = relsim::run(&args)?;
    log::info!(
        "Simulation finished at turn {} with {} living players",
        universe.turn(),
        universe.current_player_data_list().len()
    );

    Ok(())
}
