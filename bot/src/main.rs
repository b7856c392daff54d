mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Args;
use log::info;
use offers::{Console, Controller, Platform, Prompter};
use sandbox::{Feed, ReplayPlatform, ReplaySettings};
use std::future::Future;
use tokio::io::BufReader;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    common::setup_env();
    let args = Args::parse();
    block_on_detached(run(args))?
}

/// Drives `future` to completion, then drops the runtime without waiting on
/// blocking tasks. A pending stdin read never returns on its own, so a
/// regular runtime drop would hang after ctrl-c.
fn block_on_detached<F: Future>(future: F) -> Result<F::Output> {
    let runtime = Runtime::new()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

async fn run(args: Args) -> Result<()> {
    let config = args.config();
    config.validate()?;

    let feed = Feed::load(&args.feed).await?;
    info!(
        "Loaded {} offers from {}",
        feed.offers.len(),
        args.feed.display()
    );

    let (events, inbox) = offers::channel();
    let platform = ReplayPlatform::new(feed, events.clone(), ReplaySettings::default());
    let console = Console::stdout();
    let (prompter, prompts) = Prompter::new(
        BufReader::new(tokio::io::stdin()),
        console.clone(),
        events.clone(),
    );
    let controller = Controller::new(
        config,
        Platform::from_shared(platform),
        events,
        prompts,
        console,
    );

    tokio::select! {
        result = controller.run(inbox) => result?,
        result = prompter.run() => {
            result?;
            info!("Operator input closed, shutting down");
        }
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    #[test]
    fn returns_while_a_blocking_read_is_still_pending() {
        let (unblock, blocked) = mpsc::channel::<()>();
        let started = Instant::now();

        let output = block_on_detached(async {
            // Stands in for a stdin read nobody is going to answer.
            tokio::task::spawn_blocking(move || blocked.recv_timeout(Duration::from_secs(30)));
            tokio::task::yield_now().await;
            7
        })
        .unwrap();

        assert_eq!(output, 7);
        assert!(started.elapsed() < Duration::from_secs(10));
        drop(unblock);
    }
}
