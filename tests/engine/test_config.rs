//! Tests for execution configuration.

use std::time::Duration;

use coroflow::{ExecutionConfig, SchedulerContext};

#[test]
fn test_defaults() {
    let config = ExecutionConfig::default();

    assert_eq!(config.timeout, Duration::ZERO);
    assert!(config.return_exceptions);
    assert!(!config.debug);
    assert_eq!(config.max_groups, 4);
    assert!(config.scheduler.is_none());
    assert_eq!(config.deadline(), None);
}

#[test]
fn test_builder_sets_fields() {
    let config = ExecutionConfig::builder()
        .timeout(Duration::from_millis(250))
        .return_exceptions(false)
        .debug(true)
        .max_groups(7)
        .build();

    assert_eq!(config.deadline(), Some(Duration::from_millis(250)));
    assert!(!config.return_exceptions);
    assert!(config.debug);
    assert_eq!(config.group_limit(), 7);
}

#[test]
fn test_timeout_secs_rejects_nonsense() {
    assert_eq!(
        ExecutionConfig::builder().timeout_secs(1.5).build().timeout,
        Duration::from_millis(1500)
    );
    assert_eq!(ExecutionConfig::builder().timeout_secs(0.0).build().deadline(), None);
    assert_eq!(ExecutionConfig::builder().timeout_secs(-3.0).build().deadline(), None);
    assert_eq!(ExecutionConfig::builder().timeout_secs(f64::NAN).build().deadline(), None);
}

#[test]
fn test_group_count_never_below_one() {
    assert_eq!(ExecutionConfig::builder().max_groups(0).build().max_groups, 1);

    let config = ExecutionConfig {
        max_groups: 0,
        ..ExecutionConfig::default()
    };
    assert_eq!(config.group_limit(), 1);
}

#[test]
fn test_scheduler_context_is_carried() {
    let context = SchedulerContext::current_thread().unwrap();
    let config = ExecutionConfig::builder().scheduler(context).build();

    assert!(config.scheduler.is_some());
    assert!(format!("{config:?}").contains("ExecutionConfig"));
}
