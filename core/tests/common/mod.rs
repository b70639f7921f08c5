// tests/common/mod.rs
#![allow(dead_code)]

use orka::{ContextData, OrkaError, PipelineControl};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

/// A checkout-like context: handlers add line amounts to a running total.
#[derive(Clone, Debug, Default)]
pub struct TallyContext {
  pub line_amounts_cents: Vec<i64>,
  pub running_total_cents: i64,
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
  pub skip_pricing: bool,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Orka framework error: {0}")]
  Orka(String),

  #[error("Rejected line: {0}")]
  Rejected(String),
}

impl From<OrkaError> for TestError {
  fn from(oe: OrkaError) -> Self {
    TestError::Orka(format!("{:?}", oe))
  }
}

/// Records the step, adds `amount_cents` to the total and honours `stop_at`.
pub fn add_line_handler(step_name: &'static str, amount_cents: i64) -> orka::Handler<TallyContext, TestError> {
  Box::new(move |ctx: ContextData<TallyContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.line_amounts_cents.push(amount_cents);
      guard.running_total_cents += amount_cents;
      guard.steps_executed.push(step_name.to_string());
      HANDLER_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn rejecting_handler(step_name: &'static str, reason: &'static str) -> orka::Handler<TallyContext, TestError> {
  Box::new(move |ctx: ContextData<TallyContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Rejected(reason.to_string()))
    })
  })
}

use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub static HANDLER_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  HANDLER_EXEC_COUNTER.store(0, Ordering::SeqCst);
}
