// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use orka::{ContextData, OrkaError, Pipeline, PipelineControl, PipelineResult};
use serial_test::serial;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn test_steps_run_in_declared_order() {
  setup_tracing();
  reset_counters();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("price_food", false, None),
    ("price_toys", false, None),
    ("price_meds", false, None),
  ]);
  pipeline.on_root("price_food", add_line_handler("price_food", 1999));
  pipeline.on_root("price_toys", add_line_handler("price_toys", 500));
  pipeline.on_root("price_meds", add_line_handler("price_meds", 1250));

  let ctx = ContextData::new(TallyContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.running_total_cents, 3749);
  assert_eq!(guard.steps_executed, vec!["price_food", "price_toys", "price_meds"]);
  assert_eq!(HANDLER_EXEC_COUNTER.load(Ordering::SeqCst), 3);
}

#[tokio::test]
#[serial]
async fn test_stop_signal_halts_remaining_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("first", false, None),
    ("replay_existing", false, None),
    ("never", false, None),
  ]);
  pipeline.on_root("first", add_line_handler("first", 100));
  pipeline.on_root("replay_existing", add_line_handler("replay_existing", 0));
  pipeline.on_root("never", add_line_handler("never", 100));

  let ctx = ContextData::new(TallyContext {
    stop_at: Some("replay_existing".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  let guard = ctx.read();
  assert_eq!(guard.running_total_cents, 100);
  assert_eq!(guard.steps_executed, vec!["first", "replay_existing"]);
}

#[tokio::test]
#[serial]
async fn test_handler_error_propagates_and_halts() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("good_line", false, None),
    ("bad_line", false, None),
    ("after_bad", false, None),
  ]);
  pipeline.on_root("good_line", add_line_handler("good_line", 300));
  pipeline.on_root("bad_line", rejecting_handler("bad_line", "quantity must be positive"));
  pipeline.on_root("after_bad", add_line_handler("after_bad", 300));

  let ctx = ContextData::new(TallyContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Rejected("quantity must be positive".to_string()));
  let guard = ctx.read();
  assert_eq!(guard.running_total_cents, 300);
  assert_eq!(guard.steps_executed, vec!["good_line", "bad_line"]);
}

#[tokio::test]
#[serial]
async fn test_skip_condition_is_evaluated_against_live_context() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("flag_skip", false, None),
    (
      "optional_pricing",
      false,
      Some(Arc::new(|ctx: ContextData<TallyContext>| ctx.read().skip_pricing)),
    ),
    ("final", false, None),
  ]);
  pipeline.on_root("flag_skip", |ctx: ContextData<TallyContext>| async move {
    ctx.write().skip_pricing = true;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  pipeline.on_root("optional_pricing", add_line_handler("optional_pricing", 999));
  pipeline.on_root("final", add_line_handler("final", 1));

  let ctx = ContextData::new(TallyContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.running_total_cents, 1);
  assert_eq!(guard.steps_executed, vec!["final"]);
}

#[tokio::test]
#[serial]
async fn test_before_on_after_run_in_phase_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[("persist", false, None)]);
  pipeline.after_root("persist", add_line_handler("after", 0));
  pipeline.on_root("persist", add_line_handler("on", 0));
  pipeline.before_root("persist", add_line_handler("before", 0));

  let ctx = ContextData::new(TallyContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().steps_executed, vec!["before", "on", "after"]);
}

#[tokio::test]
#[serial]
async fn test_stop_in_before_phase_skips_on_handlers() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[("persist", false, None)]);
  pipeline.before_root("persist", |_ctx: ContextData<TallyContext>| async move {
    Ok::<_, OrkaError>(PipelineControl::Stop)
  });
  pipeline.on_root("persist", add_line_handler("on", 10));

  let ctx = ContextData::new(TallyContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Stopped);
  assert!(ctx.read().steps_executed.is_empty());
}

#[tokio::test]
#[serial]
async fn test_optional_step_without_handlers_is_passed_over() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("notify_customer", true, None),
    ("total", false, None),
  ]);
  pipeline.on_root("total", add_line_handler("total", 42));

  let ctx = ContextData::new(TallyContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().running_total_cents, 42);
}

#[test]
#[should_panic(expected = "not found in pipeline definition")]
fn test_attaching_handler_to_unknown_step_panics() {
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[("known", false, None)]);
  pipeline.on_root("unknown", add_line_handler("unknown", 0));
}

#[test]
fn test_step_names_follow_definition_order() {
  let pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("validate", false, None),
    ("lookup", true, None),
    ("persist", false, None),
  ]);
  assert_eq!(pipeline.step_names(), vec!["validate", "lookup", "persist"]);
}
