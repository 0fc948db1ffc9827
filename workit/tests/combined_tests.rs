// Integration tests for the combined worker engine

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use support::{capture, eventually, registry, sample};
use workit::handler::metrics::METRIC_TOTAL;
use workit::worker::{combined, parallel, sequence};
use workit::{Ensure, FnHandler, Registry};

/// Handler counting its executions
fn counter(name: &'static str, coo: Duration, cnt: &Arc<AtomicUsize>) -> Arc<dyn Ensure> {
    let cnt = Arc::clone(cnt);
    FnHandler::arc(name, coo, move || {
        let cnt = Arc::clone(&cnt);
        async move {
            cnt.fetch_add(1, Ordering::SeqCst);
            Ok::<_, anyhow::Error>(())
        }
    })
}

/// Handler panicking on every execution from the given one on
fn exploding(name: &'static str, coo: Duration, from: usize) -> Arc<dyn Ensure> {
    let runs = Arc::new(AtomicUsize::new(0));
    FnHandler::arc(name, coo, move || {
        let runs = Arc::clone(&runs);
        async move {
            if runs.fetch_add(1, Ordering::SeqCst) + 1 >= from {
                panic!("{name} exploded");
            }
            Ok::<_, anyhow::Error>(())
        }
    })
}

fn idle(reg: &Arc<Registry>) -> Arc<sequence::Worker> {
    Arc::new(sequence::Worker::new(sequence::Config {
        cooler: Duration::from_secs(3600),
        handlers: vec![vec![FnHandler::arc("uptime", Duration::ZERO, || async {
            Ok::<_, anyhow::Error>(())
        })]],
        registry: Some(Arc::clone(reg)),
    }))
}

#[tokio::test]
async fn test_daemon_runs_both_engines() {
    let (reg, out) = registry(None);

    let par = Arc::new(parallel::Worker::new(parallel::Config {
        handlers: vec![FnHandler::arc("heartbeat", Duration::from_secs(3600), || async {
            Ok::<_, anyhow::Error>(())
        })],
        registry: Some(Arc::clone(&reg)),
    }));

    let seq = Arc::new(sequence::Worker::new(sequence::Config {
        cooler: Duration::from_secs(3600),
        handlers: vec![vec![FnHandler::arc("uptime", Duration::ZERO, || async {
            Ok::<_, anyhow::Error>(())
        })]],
        registry: Some(reg),
    }));

    let wrk = combined::Worker::new(combined::Config {
        parallel: Some(par),
        sequence: Some(seq),
    });

    // The daemon does not block.
    wrk.daemon();
    wrk.ready().await;

    let heartbeat = [("handler", "heartbeat"), ("success", "true")];
    let uptime = [("handler", "uptime"), ("success", "true")];

    eventually(|| sample(&out, METRIC_TOTAL, &heartbeat) == Some(1.0)).await;
    eventually(|| sample(&out, METRIC_TOTAL, &uptime) == Some(1.0)).await;

    // On-demand passes are available through the combined engine.
    wrk.sequence().ensure().await.unwrap();
    assert_eq!(sample(&out, METRIC_TOTAL, &uptime), Some(2.0));
}

#[test]
#[should_panic(expected = "combined::Config.sequence must not be empty")]
fn test_new_without_sequence() {
    let (reg, _) = registry(None);

    let par = Arc::new(parallel::Worker::new(parallel::Config {
        handlers: vec![FnHandler::arc("heartbeat", Duration::ZERO, || async {
            Ok::<_, anyhow::Error>(())
        })],
        registry: Some(reg),
    }));

    combined::Worker::new(combined::Config {
        parallel: Some(par),
        sequence: None,
    });
}

#[tokio::test]
async fn test_handler_panics_do_not_stop_the_engines() {
    let (reg, out) = registry(None);
    let cnt = Arc::new(AtomicUsize::new(0));
    let pas = Arc::new(AtomicUsize::new(0));

    let par = Arc::new(parallel::Worker::new(parallel::Config {
        handlers: vec![
            counter("ticker", Duration::from_millis(10), &cnt),
            exploding("bomb", Duration::from_millis(10), 2),
        ],
        registry: Some(Arc::clone(&reg)),
    }));

    let seq = Arc::new(sequence::Worker::new(sequence::Config {
        cooler: Duration::from_millis(20),
        handlers: vec![
            vec![counter("pass", Duration::ZERO, &pas)],
            vec![
                exploding("fuse", Duration::ZERO, 1),
                counter("member", Duration::ZERO, &Arc::new(AtomicUsize::new(0))),
            ],
        ],
        registry: Some(reg),
    }));

    let wrk = combined::Worker::new(combined::Config {
        parallel: Some(par),
        sequence: Some(seq),
    });

    wrk.daemon();
    wrk.ready().await;

    let bomb = [("handler", "bomb"), ("success", "false")];
    eventually(|| sample(&out, METRIC_TOTAL, &bomb).is_some_and(|x| x >= 1.0)).await;

    let seen = cnt.load(Ordering::SeqCst);
    eventually(|| cnt.load(Ordering::SeqCst) >= seen + 5).await;

    // Every sequence pass fails on the panicking member and the next one
    // still starts on schedule.
    let fuse = [("handler", "fuse"), ("success", "false")];
    eventually(|| sample(&out, METRIC_TOTAL, &fuse).is_some_and(|x| x >= 3.0)).await;
    assert!(pas.load(Ordering::SeqCst) >= 3);
}

#[tokio::test]
async fn test_engine_termination_is_logged() {
    let (logs, _guard) = capture();
    let (reg, _) = registry(None);

    let par = Arc::new(parallel::Worker::new(parallel::Config {
        handlers: vec![counter(
            "ticker",
            Duration::from_secs(3600),
            &Arc::new(AtomicUsize::new(0)),
        )],
        registry: Some(Arc::clone(&reg)),
    }));

    let wrk = combined::Worker::new(combined::Config {
        parallel: Some(par),
        sequence: Some(idle(&reg)),
    });

    wrk.daemon();
    wrk.ready().await;

    // Starting the parallel engine twice signals its readiness twice.
    wrk.daemon();

    eventually(|| logs.contents().contains("worker engine stopped")).await;
    assert!(logs.contents().contains(r#""engine":"parallel""#));
    assert!(!logs.contents().contains(r#""engine":"sequence""#));
}
