//! Authoritative session server for turn-based trading card games.
//!
//! A [`hub::Core`] tracks connected clients and live games. Each game runs
//! as its own task, broadcasting redacted [`state::State`] snapshots and
//! suspending on [`prompt::Prompt`]s addressed to one participant.
pub mod bots;
pub mod cards;
pub mod client;
pub mod config;
pub mod error;
pub mod game;
pub mod hub;
pub mod ident;
pub mod prompt;
pub mod records;
pub mod rules;
pub mod state;
pub mod storage;
pub mod transport;

#[cfg(feature = "server")]
pub mod hosting;

pub use config::*;
pub use error::*;
pub use ident::*;

/// Seat index within a game (0 = first to join).
pub type Position = usize;

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file])?;
    Ok(())
}

/// Register Ctrl+C handler for immediate (non-graceful) termination.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        println!();
        log::warn!("violent interrupt received, exiting immediately");
        std::process::exit(0);
    });
}

/// Milliseconds since the unix epoch, used for replay and match timestamps.
pub fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
