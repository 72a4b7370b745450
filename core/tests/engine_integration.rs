//! End-to-end engine tests: fan-out, aggregation, reset, timeout, abort and
//! poll-while-running safety, all against real `sh` child processes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use toolbelt_core::api::{Action, ActionResult, CommandSource, Engine, EngineConfig, Method};

/// Catalog stub: commands keyed by (target, action); anything absent resolves
/// to nothing.
struct MapSource {
    commands: HashMap<(String, Action), String>,
}

impl MapSource {
    fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    fn with(mut self, target: &str, action: Action, command: &str) -> Self {
        self.commands
            .insert((target.to_string(), action), command.to_string());
        self
    }
}

impl CommandSource for MapSource {
    fn resolve(&self, _method: Method, target: &str, action: Action) -> Option<String> {
        self.commands.get(&(target.to_string(), action)).cloned()
    }
}

fn engine_with(source: MapSource, cfg: EngineConfig) -> Engine {
    Engine::new(Arc::new(source), Method::Script, cfg)
}

async fn wait_done(engine: &Engine, limit: Duration) {
    let deadline = Instant::now() + limit;
    while !engine.is_done() {
        assert!(Instant::now() < deadline, "run did not finish in {limit:?}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn every_target_reported_exactly_once() {
    let targets: Vec<String> = (0..5).map(|i| format!("tool{i}")).collect();
    let mut source = MapSource::new();
    for t in &targets {
        source = source.with(t, Action::Install, &format!("echo installed {t}"));
    }
    let engine = engine_with(source, EngineConfig::default());
    engine.set_selection(Method::Script, targets.clone(), Action::Install);

    engine.start_run().unwrap();
    wait_done(&engine, Duration::from_secs(10)).await;

    let results = engine.results();
    assert_eq!(results.len(), targets.len());
    let seen: HashSet<&str> = results.iter().map(|r| r.target.as_str()).collect();
    assert_eq!(seen.len(), targets.len());
    assert!(results.iter().all(|r| r.succeeded));
    assert!(results.iter().all(|r| r.message.is_empty()));
    assert_eq!(engine.completed_count(), targets.len());
    for t in &targets {
        assert!(engine.accumulated_output().contains(&format!("installed {t}")));
    }
}

#[tokio::test]
async fn unresolvable_target_fails_with_its_name() {
    let source = MapSource::new().with("present", Action::Install, "true");
    let engine = engine_with(source, EngineConfig::default());
    engine.set_selection(
        Method::Script,
        vec!["present".to_string(), "ghost".to_string()],
        Action::Install,
    );

    engine.start_run().unwrap();
    wait_done(&engine, Duration::from_secs(10)).await;

    let results = engine.results();
    assert_eq!(results.len(), 2);
    let ghost = results.iter().find(|r| r.target == "ghost").unwrap();
    assert!(!ghost.succeeded);
    assert!(ghost.message.contains("no install command found for ghost"));
    let present = results.iter().find(|r| r.target == "present").unwrap();
    assert!(present.succeeded);
}

#[tokio::test]
async fn second_run_replaces_first() {
    let source = MapSource::new()
        .with("a", Action::Check, "echo first")
        .with("b", Action::Check, "echo second");
    let engine = engine_with(source, EngineConfig::default());

    engine.set_selection(Method::Script, vec!["a".to_string()], Action::Check);
    engine.start_run().unwrap();
    wait_done(&engine, Duration::from_secs(10)).await;
    assert_eq!(engine.results().len(), 1);

    engine.set_selection(Method::Script, vec!["b".to_string()], Action::Check);
    engine.start_run().unwrap();
    wait_done(&engine, Duration::from_secs(10)).await;

    let results = engine.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].target, "b");
    assert!(engine.accumulated_output().contains("second"));
    assert!(!engine.accumulated_output().contains("first"));
    assert_eq!(engine.completed_count(), 1);
}

#[tokio::test]
async fn deadline_overrun_is_reported_as_timeout() {
    let source = MapSource::new().with("slow", Action::Check, "echo noise; sleep 10");
    let cfg = EngineConfig {
        check_timeout_secs: 1,
        ..EngineConfig::default()
    };
    let engine = engine_with(source, cfg);
    engine.set_selection(Method::Script, vec!["slow".to_string()], Action::Check);

    let started = Instant::now();
    engine.start_run().unwrap();
    wait_done(&engine, Duration::from_secs(8)).await;
    assert!(started.elapsed() < Duration::from_secs(8));

    let results = engine.results();
    assert_eq!(results.len(), 1);
    assert!(!results[0].succeeded);
    assert!(results[0].message.contains("timed out"));
}

#[tokio::test]
async fn timeout_latency_is_bounded_even_with_grandchildren() {
    // Package managers fork helpers; a background sleep stands in for one
    // that inherits the output pipes and outlives the killed shell.
    let source = MapSource::new().with("stubborn", Action::Check, "sleep 30 & sleep 30");
    let cfg = EngineConfig {
        check_timeout_secs: 1,
        ..EngineConfig::default()
    };
    let engine = engine_with(source, cfg);
    engine.set_selection(Method::Script, vec!["stubborn".to_string()], Action::Check);

    let started = Instant::now();
    engine.start_run().unwrap();
    wait_done(&engine, Duration::from_secs(5)).await;
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "timeout took {:?}",
        started.elapsed()
    );

    let results = engine.results();
    assert_eq!(results.len(), 1);
    assert!(!results[0].succeeded);
    assert!(results[0].message.contains("timed out"));
}

#[tokio::test]
async fn long_check_output_is_reported_in_full() {
    let banner = "x".repeat(300);
    let source = MapSource::new().with("verbose", Action::Check, &format!("echo {banner}"));
    let engine = engine_with(source, EngineConfig::default());
    engine.set_selection(Method::Script, vec!["verbose".to_string()], Action::Check);

    engine.start_run().unwrap();
    wait_done(&engine, Duration::from_secs(10)).await;

    let results = engine.results();
    assert_eq!(results.len(), 1);
    assert!(results[0].succeeded);
    assert_eq!(results[0].message, banner);
}

#[tokio::test]
async fn abort_finishes_without_silent_successes() {
    let mut source = MapSource::new();
    let targets: Vec<String> = (0..4).map(|i| format!("tool{i}")).collect();
    for t in &targets {
        source = source.with(t, Action::Install, "sleep 30");
    }
    let engine = engine_with(source, EngineConfig::default());
    engine.set_selection(Method::Script, targets.clone(), Action::Install);

    let started = Instant::now();
    engine.start_run().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    engine.request_abort();
    engine.cancel_run();

    wait_done(&engine, Duration::from_secs(10)).await;
    assert!(started.elapsed() < Duration::from_secs(10));

    // Workers that ran were cancelled, never silently successful; workers
    // skipped by the abort gate left no entry at all.
    for r in engine.results() {
        assert!(!r.succeeded, "aborted target {} reported success", r.target);
    }
    assert!(engine.results().len() <= targets.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn continuous_polling_during_wide_fanout_is_safe() {
    let mut source = MapSource::new();
    let targets: Vec<String> = (0..100).map(|i| format!("t{i:03}")).collect();
    for t in &targets {
        source = source.with(t, Action::Check, &format!("echo v-{t}"));
    }
    let engine = engine_with(source, EngineConfig::default());
    engine.set_selection(Method::Script, targets.clone(), Action::Check);

    let poller = {
        let engine = engine.clone();
        tokio::spawn(async move {
            let mut snapshots = 0usize;
            while !engine.is_done() {
                let results = engine.results();
                // No torn result is ever observable.
                for r in &results {
                    assert!(r.succeeded);
                    assert_eq!(r.message, format!("v-{}", r.target));
                }
                let _ = engine.accumulated_output();
                let _ = engine.animation_frame();
                let _ = engine.completed_count();
                snapshots += 1;
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            snapshots
        })
    };

    engine.start_run().unwrap();
    wait_done(&engine, Duration::from_secs(60)).await;
    poller.await.unwrap();

    assert_eq!(engine.results().len(), 100);
    assert_eq!(engine.completed_count(), 100);
}

#[tokio::test]
async fn bounded_pool_still_attempts_all_targets() {
    let mut source = MapSource::new();
    let targets: Vec<String> = (0..10).map(|i| format!("tool{i}")).collect();
    for t in &targets {
        source = source.with(t, Action::Check, "echo ok");
    }
    let cfg = EngineConfig {
        max_parallel: Some(2),
        ..EngineConfig::default()
    };
    let engine = engine_with(source, cfg);
    engine.set_selection(Method::Script, targets.clone(), Action::Check);

    engine.start_run().unwrap();
    wait_done(&engine, Duration::from_secs(30)).await;
    assert_eq!(engine.results().len(), targets.len());
}

#[tokio::test]
async fn check_results_carry_version_text() {
    // The worked example: toolA resolves and prints a version, toolB has no
    // check command at all.
    let source = MapSource::new().with("toolA", Action::Check, "echo 1.2.3");
    let engine = engine_with(source, EngineConfig::default());
    engine.set_selection(
        Method::Script,
        vec!["toolA".to_string(), "toolB".to_string()],
        Action::Check,
    );

    engine.start_run().unwrap();
    wait_done(&engine, Duration::from_secs(10)).await;

    let results = engine.results();
    assert_eq!(results.len(), 2);
    let a = results.iter().find(|r| r.target == "toolA").unwrap();
    assert!(a.succeeded);
    assert!(a.message.contains("1.2.3"));
    let b = results.iter().find(|r| r.target == "toolB").unwrap();
    assert!(!b.succeeded);
    assert!(b.message.contains("no check command found for toolB"));
    assert_eq!(engine.completed_count(), 2);
    assert!(engine.is_done());
}

#[tokio::test]
async fn failures_do_not_abort_the_rest_of_the_run() {
    let source = MapSource::new()
        .with("bad", Action::Install, "echo broken >&2; exit 7")
        .with("good", Action::Install, "echo fine");
    let engine = engine_with(source, EngineConfig::default());
    engine.set_selection(
        Method::Script,
        vec!["bad".to_string(), "good".to_string()],
        Action::Install,
    );

    engine.start_run().unwrap();
    wait_done(&engine, Duration::from_secs(10)).await;

    let results = engine.results();
    let bad = results.iter().find(|r| r.target == "bad").unwrap();
    assert!(!bad.succeeded);
    assert!(bad.message.contains("exit status 7"));
    assert!(bad.message.contains("broken"));
    let good = results.iter().find(|r| r.target == "good").unwrap();
    assert!(good.succeeded);
}

#[tokio::test]
async fn animation_advances_while_running_and_stops_after() {
    let source = MapSource::new().with("slow", Action::Check, "sleep 1");
    let cfg = EngineConfig {
        tick_interval_ms: 10,
        ..EngineConfig::default()
    };
    let engine = engine_with(source, cfg);
    engine.set_selection(Method::Script, vec!["slow".to_string()], Action::Check);

    engine.start_run().unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    let mid = engine.animation_frame();
    let mut advanced = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if engine.animation_frame() != mid {
            advanced = true;
            break;
        }
    }
    assert!(advanced, "animation frame never advanced during the run");

    wait_done(&engine, Duration::from_secs(10)).await;
    let settled = engine.animation_frame();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(engine.animation_frame(), settled);
}

#[tokio::test]
async fn results_are_immutable_snapshots() {
    let source = MapSource::new().with("a", Action::Check, "echo hi");
    let engine = engine_with(source, EngineConfig::default());
    engine.set_selection(Method::Script, vec!["a".to_string()], Action::Check);
    engine.start_run().unwrap();
    wait_done(&engine, Duration::from_secs(10)).await;

    let mut snapshot: Vec<ActionResult> = engine.results();
    snapshot.clear();
    assert_eq!(engine.results().len(), 1);
}
