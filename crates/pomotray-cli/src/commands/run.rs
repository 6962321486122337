//! Foreground host for the engine.
//!
//! Prints the status line whenever the engine changes state or wakes up,
//! and reads control commands from stdin, one per line:
//!
//! ```text
//! start | stop | next | finish | task <n> | status | quit
//! ```

use std::path::Path;

use pomotray_core::timer::{self, EngineHandle};
use pomotray_core::{Config, Pomodoro, ShellRunner};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

const HELP: &str = "commands: start, stop, next, finish, task <n>, status, quit";

pub fn run(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(path));
    // A pending stdin read cannot be cancelled; don't wait for it.
    runtime.shutdown_background();
    result
}

async fn serve(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(path)?;
    let mut engine = Pomodoro::new(config, Box::new(ShellRunner::new()))?;

    let (changed_tx, mut changed_rx) = mpsc::unbounded_channel();
    {
        let changed_tx = changed_tx.clone();
        engine.on_state_changed(move || {
            let _ = changed_tx.send(());
        });
    }
    engine.on_tick(move || {
        let _ = changed_tx.send(());
    });

    println!("{engine}");
    let (handle, driver) = timer::spawn(engine);

    let printer = {
        let handle = handle.clone();
        tokio::spawn(async move {
            while changed_rx.recv().await.is_some() {
                match handle.snapshot().await {
                    Ok(snapshot) => println!("{}", snapshot.status),
                    Err(_) => break,
                }
            }
        })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !apply(&handle, line.trim()).await? {
                        break;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    handle.shutdown()?;
    driver.await?;
    drop(handle);
    printer.await?;
    debug!("Exiting");
    Ok(())
}

/// Apply one control line. Returns `false` when the host should exit.
async fn apply(handle: &EngineHandle, line: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (None, _) => {}
        (Some("start"), None) => handle.start()?,
        (Some("stop"), None) => handle.stop()?,
        (Some("next"), None) => handle.next()?,
        (Some("finish"), None) => handle.finish()?,
        (Some("status"), None) => println!("{}", handle.snapshot().await?.status),
        (Some("quit" | "exit"), None) => return Ok(false),
        (Some("task"), Some(number)) => {
            let count = handle.snapshot().await?.task_count;
            match number.parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => handle.start_task(n - 1)?,
                _ => eprintln!("no such task: {number} (1-{count})"),
            }
        }
        _ => eprintln!("unknown command: {line}\n{HELP}"),
    }
    Ok(true)
}
