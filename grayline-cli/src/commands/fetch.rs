//! `fetch` command: bring the background maps up to date.

use std::thread;

use grayline::app::{AppConfig, GrayLineApp, TICK_INTERVAL};
use grayline::resource_cache::{FetchCompletion, ResourceCache, STATUS_NOT_MODIFIED};

use crate::error::CliError;

/// Download every missing or stale map and report the results.
pub fn run(config: AppConfig) -> Result<(), CliError> {
    let app = GrayLineApp::start(config)?;
    let completions = fetch_and_wait(app.cache());
    report(app.cache(), &completions);
    app.shutdown();

    let failed = completions.iter().filter(|c| !c.is_success()).count();
    if failed > 0 {
        return Err(CliError::FetchFailed(failed));
    }
    Ok(())
}

/// Schedule fetches and block until all of them have finished.
pub fn fetch_and_wait(cache: &ResourceCache) -> Vec<FetchCompletion> {
    let mut rx = cache.subscribe();
    let mut completions = Vec::new();

    if !cache.fetch_all() {
        return completions;
    }

    loop {
        let pending = cache.poll_completed();
        while let Ok(completion) = rx.try_recv() {
            completions.push(completion);
        }
        if !pending {
            return completions;
        }
        thread::sleep(TICK_INTERVAL);
    }
}

fn report(cache: &ResourceCache, completions: &[FetchCompletion]) {
    if completions.is_empty() {
        println!("All maps are fresh in {}", cache.directory().display());
        return;
    }

    for completion in completions {
        let file = cache
            .local_path(completion.key)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("item {}", completion.key));
        let outcome = match completion.status {
            STATUS_NOT_MODIFIED => "unchanged".to_string(),
            _ if completion.is_success() => "downloaded".to_string(),
            s => format!("failed (HTTP {})", s),
        };
        println!("{:<12} {}", outcome, file);
    }
}
