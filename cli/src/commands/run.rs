use std::io::BufRead;
use std::time::Duration;

use toolbelt_core::api::Engine;
use tracing::warn;

use super::cli::RunArgs;

/// Headless run: starts the engine, polls until done, prints one line per
/// target. Ctrl-C aborts the run (in-flight commands are cancelled) instead
/// of killing the process outright.
pub async fn run(engine: &Engine, args: &RunArgs) -> anyhow::Result<i32> {
    if args.ask_pass {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        let secret = line.trim_end_matches(['\r', '\n']).to_string();
        if secret.is_empty() {
            warn!("--ask-pass given but stdin provided no password");
        } else {
            engine.set_credential(Some(secret));
        }
    }

    engine.start_run()?;

    let mut aborted = false;
    while !engine.is_done() {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
            res = tokio::signal::ctrl_c(), if !aborted => {
                res?;
                eprintln!("aborting: waiting for in-flight commands to stop");
                engine.request_abort();
                engine.cancel_run();
                aborted = true;
            }
        }
    }

    let results = engine.results();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for r in &results {
            let mark = if r.succeeded { "ok  " } else { "FAIL" };
            if r.message.is_empty() {
                println!("{mark} {:<12} ({}s)", r.target, r.duration_secs);
            } else {
                println!("{mark} {:<12} ({}s) {}", r.target, r.duration_secs, r.message);
            }
        }
        let failed = results.iter().filter(|r| !r.succeeded).count();
        let secs = engine.elapsed().map(|d| d.as_secs()).unwrap_or(0);
        println!(
            "{} succeeded, {} failed in {}s",
            results.len() - failed,
            failed,
            secs
        );
    }

    let all_ok = results.iter().all(|r| r.succeeded) && !aborted;
    Ok(if all_ok { 0 } else { 1 })
}
