//! Tests for execution across worker groups.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use coroflow::{
    EngineError, ExecutionConfig, Outcome, TaskHandle, ThreadedRunner, partition_sizes,
    threading_run_coros,
};
use futures::StreamExt;
use rand::Rng;

use super::common::{ValueError, failing, ms, sleeper};

/// Task reporting its index and the name of the thread that ran it.
fn traced(index: usize, delay: Duration) -> TaskHandle<(usize, String)> {
    TaskHandle::new(move || async move {
        tokio::time::sleep(delay).await;
        let thread = std::thread::current().name().unwrap_or("").to_string();
        Ok((index, thread))
    })
}

fn grouped(max_groups: usize) -> ExecutionConfig {
    ExecutionConfig::builder().max_groups(max_groups).build()
}

#[test]
fn test_six_tasks_over_two_groups() {
    assert_eq!(partition_sizes(6, 2), vec![3, 3]);

    let tasks: Vec<_> = (0..6).map(|i| traced(i, ms(10))).collect();
    let results: Vec<(usize, String)> = threading_run_coros(tasks, grouped(2))
        .unwrap()
        .into_iter()
        .map(|item| item.unwrap().success().unwrap())
        .collect();

    let mut indices: Vec<usize> = results.iter().map(|(i, _)| *i).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);

    let mut per_thread: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, thread) in &results {
        per_thread.entry(thread.as_str()).or_default().push(*index);
    }
    assert_eq!(per_thread.len(), 2);
    for indices in per_thread.values_mut() {
        indices.sort_unstable();
    }
    assert_eq!(per_thread["coroflow-group-0"], vec![0, 1, 2]);
    assert_eq!(per_thread["coroflow-group-1"], vec![3, 4, 5]);
}

#[test]
fn test_group_count_capped_by_task_count() {
    let tasks: Vec<_> = (0..3).map(|i| traced(i, ms(0))).collect();
    let threads: std::collections::HashSet<String> = threading_run_coros(tasks, grouped(8))
        .unwrap()
        .into_iter()
        .map(|item| item.unwrap().success().unwrap().1)
        .collect();

    assert_eq!(threads.len(), 3);
}

#[test]
fn test_completion_order_kept_within_a_group() {
    // group 0 gets tasks 0 and 1, group 1 gets tasks 2 and 3
    let tasks = vec![
        traced(0, ms(300)),
        traced(1, ms(50)),
        traced(2, ms(250)),
        traced(3, ms(10)),
    ];

    let order: Vec<usize> = threading_run_coros(tasks, grouped(2))
        .unwrap()
        .into_iter()
        .map(|item| item.unwrap().success().unwrap().0)
        .collect();

    let group0: Vec<usize> = order.iter().copied().filter(|i| *i < 2).collect();
    let group1: Vec<usize> = order.iter().copied().filter(|i| *i >= 2).collect();
    assert_eq!(group0, vec![1, 0]);
    assert_eq!(group1, vec![3, 2]);
}

#[test]
fn test_empty_batch_terminates_immediately() {
    let mut outcomes = threading_run_coros(Vec::<TaskHandle<u8>>::new(), grouped(4))
        .unwrap()
        .into_iter();

    assert!(outcomes.next().is_none());
    assert_eq!(outcomes.summary().submitted, 0);
}

#[test]
fn test_merge_is_complete_under_random_timing() {
    let mut rng = rand::thread_rng();

    for _ in 0..8 {
        let n = rng.gen_range(1..40usize);
        let groups = rng.gen_range(1..8usize);
        let tasks: Vec<_> = (0..n)
            .map(|i| sleeper(ms(rng.gen_range(0..20)), i))
            .collect();

        let mut values: Vec<usize> = threading_run_coros(tasks, grouped(groups))
            .unwrap()
            .into_iter()
            .map(|item| item.unwrap().success().unwrap())
            .collect();
        values.sort_unstable();

        assert_eq!(values, (0..n).collect::<Vec<_>>(), "n={n} groups={groups}");
    }
}

#[test]
fn test_failures_and_timeouts_are_data() {
    let config = ExecutionConfig::builder()
        .max_groups(3)
        .timeout(ms(100))
        .build();
    let tasks = vec![
        sleeper(ms(0), 1),
        failing(ms(10), "boom"),
        sleeper(ms(2_000), 3),
        sleeper(ms(5), 4),
    ];

    let mut outcomes = threading_run_coros(tasks, config).unwrap().into_iter();
    let mut failures = Vec::new();
    let mut timed_out = 0;
    let mut succeeded = 0;
    for item in outcomes.by_ref() {
        match item.unwrap() {
            Outcome::Success(_) => succeeded += 1,
            Outcome::Failure(e) => failures.push(e.downcast::<ValueError>().unwrap()),
            Outcome::TimedOut(limit) => {
                assert_eq!(limit, ms(100));
                timed_out += 1;
            }
        }
    }

    assert_eq!(succeeded, 2);
    assert_eq!(timed_out, 1);
    assert_eq!(failures, vec![ValueError("boom".into())]);

    let summary = outcomes.summary();
    assert_eq!(summary.completed(), 4);
    assert_eq!(summary.failed, 1);
}

#[test]
fn test_raising_mode_ends_the_merged_stream() {
    let config = ExecutionConfig::builder()
        .max_groups(2)
        .return_exceptions(false)
        .build();
    let tasks = vec![
        sleeper(ms(3_000), 1),
        failing(ms(20), "boom"),
        sleeper(ms(3_000), 2),
        sleeper(ms(3_000), 3),
    ];

    let started = Instant::now();
    let mut outcomes = threading_run_coros(tasks, config).unwrap().into_iter();

    assert!(matches!(outcomes.next(), Some(Err(EngineError::TaskFailed(_)))));
    assert!(outcomes.next().is_none());
    assert!(started.elapsed() < ms(2_000));
}

#[test]
fn test_raised_failure_is_counted_in_summary() {
    let config = ExecutionConfig::builder()
        .max_groups(2)
        .return_exceptions(false)
        .build();
    let tasks = vec![sleeper(ms(3_000), 1), failing(ms(20), "boom")];

    let mut outcomes = threading_run_coros(tasks, config).unwrap().into_iter();

    assert!(matches!(outcomes.next(), Some(Err(EngineError::TaskFailed(_)))));
    assert_eq!(outcomes.summary().failed, 1);
    assert_eq!(outcomes.summary().completed(), 1);
}

#[test]
fn test_raised_timeout_is_counted_in_summary() {
    let config = ExecutionConfig::builder()
        .max_groups(2)
        .timeout(ms(50))
        .return_exceptions(false)
        .build();
    let tasks = vec![sleeper(ms(3_000), 1), sleeper(ms(3_000), 2)];

    let mut outcomes = threading_run_coros(tasks, config).unwrap().into_iter();

    assert!(matches!(outcomes.next(), Some(Err(EngineError::TaskTimedOut(_)))));
    assert_eq!(outcomes.summary().timed_out, 1);
    assert_eq!(outcomes.summary().failed, 0);
}

#[test]
fn test_dropping_stream_stops_workers() {
    let started_tasks = Arc::new(AtomicUsize::new(0));
    let finished_tasks = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let started_tasks = Arc::clone(&started_tasks);
            let finished_tasks = Arc::clone(&finished_tasks);
            TaskHandle::new(move || async move {
                started_tasks.fetch_add(1, Ordering::SeqCst);
                let delay = if i == 0 { ms(0) } else { ms(300) };
                tokio::time::sleep(delay).await;
                finished_tasks.fetch_add(1, Ordering::SeqCst);
                Ok(i)
            })
        })
        .collect();

    let mut outcomes = threading_run_coros(tasks, grouped(4)).unwrap().into_iter();
    assert_eq!(outcomes.next().unwrap().unwrap().success(), Some(0));
    drop(outcomes);

    std::thread::sleep(ms(600));
    assert_eq!(finished_tasks.load(Ordering::SeqCst), 1);
}

#[test]
fn test_runner_reports_groups() {
    let runner = ThreadedRunner::new(grouped(3));
    let outcomes = runner.run((0..9).map(|i| sleeper(ms(20), i))).unwrap();

    assert_eq!(outcomes.active_groups(), 3);
    assert_eq!(outcomes.into_iter().count(), 9);
}

#[tokio::test]
async fn test_async_consumer_receives_everything() {
    let tasks: Vec<_> = (0..10).map(|i| sleeper(ms(10 * (i % 3)), i)).collect();

    let mut stream = threading_run_coros(tasks, grouped(3)).unwrap();
    let mut values = Vec::new();
    while let Some(item) = stream.next().await {
        values.push(item.unwrap().success().unwrap());
    }
    values.sort_unstable();

    assert_eq!(values, (0..10).collect::<Vec<u64>>());
    assert_eq!(stream.active_groups(), 0);
}
