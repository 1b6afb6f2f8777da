// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use serial_test::serial;
use storeflow::{skip_when, ContextData, FlowError, Pipeline, PipelineControl, PipelineResult};

#[tokio::test]
#[serial]
async fn test_pipeline_runs_steps_in_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("load_lines", false, None),
    ("apply_promo", false, None),
    ("commit", false, None),
  ]);
  pipeline.on_root("load_lines", create_adding_handler("load_lines", 25)).unwrap();
  pipeline.on_root("apply_promo", create_adding_handler("apply_promo", -3)).unwrap();
  pipeline.on_root("commit", create_adding_handler("commit", 0)).unwrap();

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.total, 22);
  assert_eq!(guard.steps_executed, vec!["load_lines", "apply_promo", "commit"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_stops_on_pipeline_control_stop() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("a", false, None), ("stop_here", false, None), ("c", false, None)]);
  pipeline.on_root("a", create_adding_handler("a", 1)).unwrap();
  pipeline.on_root("stop_here", create_adding_handler("stop_here", 1)).unwrap();
  pipeline.on_root("c", create_adding_handler("c", 100)).unwrap();

  let ctx = ContextData::new(TestContext {
    should_stop_at: Some("stop_here".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  let guard = ctx.read();
  assert_eq!(guard.total, 2);
  assert_eq!(guard.steps_executed, vec!["a", "stop_here"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_propagates_handler_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("good_step", false, None),
    ("bad_step", false, None),
    ("never_run", false, None),
  ]);
  pipeline.on_root("good_step", create_adding_handler("good_step", 1)).unwrap();
  pipeline.on_root("bad_step", create_failing_handler("bad_step", "address not owned")).unwrap();
  pipeline.on_root("never_run", create_adding_handler("never_run", 1)).unwrap();

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Handler("address not owned".to_string()));
  assert_eq!(ctx.read().steps_executed, vec!["good_step", "bad_step"]);
}

#[tokio::test]
#[serial]
async fn test_skip_conditions_select_exactly_one_branch() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("attach_pickup", false, Some(skip_when(|c: &TestContext| !c.pickup))),
    ("attach_address", false, Some(skip_when(|c: &TestContext| c.pickup))),
    ("create_order", false, None),
  ]);
  pipeline.on_root("attach_pickup", create_adding_handler("attach_pickup", 0)).unwrap();
  pipeline.on_root("attach_address", create_adding_handler("attach_address", 0)).unwrap();
  pipeline.on_root("create_order", create_adding_handler("create_order", 0)).unwrap();

  let pickup_ctx = ContextData::new(TestContext {
    pickup: true,
    ..Default::default()
  });
  pipeline.run(pickup_ctx.clone()).await.unwrap();
  assert_eq!(pickup_ctx.read().steps_executed, vec!["attach_pickup", "create_order"]);

  let delivery_ctx = ContextData::new(TestContext::default());
  pipeline.run(delivery_ctx.clone()).await.unwrap();
  assert_eq!(delivery_ctx.read().steps_executed, vec!["attach_address", "create_order"]);
}

#[tokio::test]
#[serial]
async fn test_non_optional_step_missing_handler_fails() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new(&[("unhandled", false, None)]);
  let result = pipeline.run(ContextData::new(TestContext::default())).await;

  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("unhandled"));
    }
    other => panic!("expected HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_optional_step_missing_handler_is_skipped() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("maybe_later", true, None), ("work", false, None)]);
  pipeline.on_root("work", create_adding_handler("work", 5)).unwrap();

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["work"]);
}

#[tokio::test]
#[serial]
async fn test_before_on_after_execution_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("step", false, None)]);
  pipeline.after_root("step", create_adding_handler("after", 0)).unwrap();
  pipeline.on_root("step", create_adding_handler("on", 0)).unwrap();
  pipeline.before_root("step", create_adding_handler("before", 0)).unwrap();

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().steps_executed, vec!["before", "on", "after"]);
}

#[tokio::test]
#[serial]
async fn test_after_hook_can_stop_pipeline() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("first", false, None), ("second", false, None)]);
  pipeline.on_root("first", create_adding_handler("first", 1)).unwrap();
  pipeline
    .after_root("first", |_ctx: ContextData<TestContext>| async move {
      Ok::<_, TestError>(PipelineControl::Stop)
    })
    .unwrap();
  pipeline.on_root("second", create_adding_handler("second", 1)).unwrap();

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Stopped);
  assert_eq!(ctx.read().steps_executed, vec!["first"]);
}

#[tokio::test]
#[serial]
async fn test_registering_handler_for_unknown_step_is_an_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("known", false, None)]);
  let result = pipeline.on_root("unknown", create_adding_handler("unknown", 0));
  assert!(matches!(result, Err(FlowError::StepNotFound { step_name }) if step_name == "unknown"));
}

#[tokio::test]
#[serial]
async fn test_step_insertion_and_removal() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("a", false, None), ("c", false, None)]);
  pipeline.insert_after_step("a", "b", false, None).unwrap();
  pipeline.insert_before_step("a", "start", true, None).unwrap();
  assert_eq!(pipeline.step_names(), vec!["start", "a", "b", "c"]);

  assert!(pipeline.insert_after_step("a", "c", false, None).is_err());
  assert!(pipeline.insert_after_step("missing", "x", false, None).is_err());

  pipeline.on_root("c", create_adding_handler("c", 0)).unwrap();
  pipeline.remove_step("c");
  pipeline.remove_step("not_there");
  assert_eq!(pipeline.step_names(), vec!["start", "a", "b"]);

  pipeline.set_optional("a", true).unwrap();
  pipeline.set_optional("b", true).unwrap();
  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert!(ctx.read().steps_executed.is_empty());
}

#[tokio::test]
#[serial]
async fn test_skip_condition_can_be_replaced() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("apply_promo", false, None), ("total", false, None)]);
  pipeline.on_root("apply_promo", create_adding_handler("apply_promo", -10)).unwrap();
  pipeline.on_root("total", create_adding_handler("total", 100)).unwrap();

  pipeline
    .set_skip_condition("apply_promo", Some(skip_when(|c: &TestContext| !c.pickup)))
    .unwrap();
  let ctx = ContextData::new(TestContext::default());
  let outcome = pipeline.run(ctx.clone()).await.unwrap();
  assert!(outcome.is_completed());
  assert_eq!(ctx.read().total, 100);

  pipeline.set_skip_condition("apply_promo", None).unwrap();
  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().total, 90);

  assert!(pipeline.set_skip_condition("missing", None).is_err());
}
