//! Main bridge mode.

use std::sync::Arc;

use anyhow::{Context, Result};
use meatbridge_core::config::timing;
use meatbridge_core::process::ProcessMemory;
use meatbridge_core::{
    Bridge, BridgeConfig, FixedDelay, GameMemory, ProcessHandle, RetryStrategy, SessionEnd,
};
use tracing::{debug, info, warn};

use crate::cli::ConnectionArgs;
use crate::connection::Connection;
use crate::input;
use crate::settings::{Settings, Target};
use crate::shutdown::ShutdownSignal;

pub fn run(args: &ConnectionArgs) -> Result<()> {
    let target = load_target(args)?;
    let shutdown = setup_shutdown_handler()?;
    let mut bridge = Bridge::new(BridgeConfig::default());

    println!("meatbridge v{}", env!("CARGO_PKG_VERSION"));
    println!("Slot {} on {}", target.slot, target.url);
    println!("Waiting for Super Meat Boy... (Press Esc or q to quit)");

    while !shutdown.is_shutdown() {
        if let Some(process) = wait_for_process(&shutdown) {
            run_process(&mut bridge, &process, &target, &shutdown)?;
            if !shutdown.is_shutdown() {
                println!("Waiting for Super Meat Boy...");
            }
        }

        if shutdown.wait(timing::PROCESS_WAIT) {
            break;
        }
    }

    println!("Shutdown complete.");
    Ok(())
}

/// Merge stored settings with the arguments, saving them when asked
fn load_target(args: &ConnectionArgs) -> Result<Target> {
    let path = Settings::default_path();
    let stored = match &path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let settings = stored.merge(args);

    if args.save {
        let path = path.context("No config directory on this system")?;
        settings.save(&path)?;
        println!("Saved settings to {}", path.display());
    }

    settings.target()
}

fn setup_shutdown_handler() -> Result<Arc<ShutdownSignal>> {
    let shutdown = Arc::new(ShutdownSignal::new());

    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        println!("\nShutting down...");
        shutdown_ctrlc.trigger();
    })
    .context("Failed to install Ctrl+C handler")?;

    let _keyboard = input::spawn_keyboard_monitor(Arc::clone(&shutdown));
    Ok(shutdown)
}

fn wait_for_process(shutdown: &ShutdownSignal) -> Option<ProcessHandle> {
    if shutdown.is_shutdown() {
        return None;
    }
    match ProcessHandle::find_and_open() {
        Ok(process) => {
            println!("Found Super Meat Boy (PID: {})", process.pid);
            debug!("Module base: {:#x}", process.base_address);
            Some(process)
        }
        Err(e) => {
            debug!("Process not found: {}", e);
            None
        }
    }
}

/// Bridge one game process, reconnecting to the server as needed
///
/// Returns once the process exits or shutdown is requested. A refused
/// connection is returned as an error.
fn run_process(
    bridge: &mut Bridge,
    process: &ProcessHandle,
    target: &Target,
    shutdown: &ShutdownSignal,
) -> Result<()> {
    let memory = ProcessMemory::new(process);
    if !wait_for_save(&memory, shutdown) {
        return Ok(());
    }

    loop {
        let (mut connection, events) =
            Connection::open(&target.url, &target.slot, &target.password)?;
        let end = bridge
            .run(&memory, &mut connection, &events, shutdown.flag())
            .context("Server refused the connection")?;
        drop(connection);

        match end {
            SessionEnd::SessionClosed => {
                warn!("Lost the server session, reconnecting");
                if shutdown.wait(timing::PROCESS_WAIT) {
                    return Ok(());
                }
            }
            SessionEnd::ProcessLost | SessionEnd::Shutdown => {
                info!("Bridge stopped: {}", end);
                return Ok(());
            }
        }
    }
}

/// Wait until the game has loaded a save file; `false` on shutdown or timeout
fn wait_for_save(memory: &ProcessMemory<'_>, shutdown: &ShutdownSignal) -> bool {
    let game = GameMemory::new(memory);
    if game.save_base().is_some() {
        return true;
    }

    println!("Waiting for a save file to load...");
    let loaded = FixedDelay::save_wait().execute(|_| {
        if shutdown.is_shutdown() || game.save_base().is_some() {
            Ok(())
        } else {
            Err(())
        }
    });
    match loaded {
        Ok(()) => !shutdown.is_shutdown(),
        Err(()) => {
            warn!("No save file loaded; will look again");
            false
        }
    }
}
