// tests/registry_tests.rs
mod common;

use common::*;
use storeflow::{ContextData, FlowError, FlowRegistry, Pipeline, PipelineControl, PipelineResult};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SignupContext {
  email: String,
  created: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct ReviewContext {
  ratings: Vec<i32>,
}

#[tokio::test]
async fn test_registry_dispatches_by_context_type() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  let mut signup = Pipeline::<SignupContext, TestError>::new(&[("create_user", false, None)]);
  signup
    .on_root("create_user", |ctx: ContextData<SignupContext>| async move {
      let mut guard = ctx.write();
      guard.created = guard.email.contains('@');
      Ok::<_, FlowError>(PipelineControl::Continue)
    })
    .unwrap();
  registry.register_pipeline(signup);

  let mut review = Pipeline::<ReviewContext, TestError>::new(&[("append_rating", false, None)]);
  review
    .on_root("append_rating", |ctx: ContextData<ReviewContext>| async move {
      ctx.write().ratings.push(4);
      Ok::<_, TestError>(PipelineControl::Continue)
    })
    .unwrap();
  registry.register_pipeline(review);

  assert!(registry.is_registered::<SignupContext>());
  assert!(registry.is_registered::<ReviewContext>());

  let signup_ctx = ContextData::new(SignupContext {
    email: "ada@example.com".to_string(),
    created: false,
  });
  assert_eq!(registry.run(signup_ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert!(signup_ctx.read().created);

  let review_ctx = ContextData::new(ReviewContext::default());
  assert_eq!(registry.run(review_ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(review_ctx.read().ratings, vec![4]);
}

#[tokio::test]
async fn test_registry_pipeline_not_registered() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  #[derive(Debug, Default)]
  struct UnregisteredContext;

  let result = registry.run(ContextData::new(UnregisteredContext)).await;
  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("PipelineNotRegistered"));
      assert!(s.contains("UnregisteredContext"));
    }
    other => panic!("expected PipelineNotRegistered, got {:?}", other),
  }
}

#[tokio::test]
async fn test_registry_replaces_pipeline_for_same_context() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  let mut first = Pipeline::<TestContext, TestError>::new(&[("step", false, None)]);
  first.on_root("step", create_adding_handler("first", 1)).unwrap();
  registry.register_pipeline(first);

  let mut second = Pipeline::<TestContext, TestError>::new(&[("step", false, None)]);
  second.on_root("step", create_adding_handler("second", 10)).unwrap();
  registry.register_pipeline(second);

  let ctx = ContextData::new(TestContext::default());
  registry.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().total, 10);
  assert_eq!(ctx.read().steps_executed, vec!["second"]);
}

#[tokio::test]
async fn test_registry_surfaces_handler_error_in_app_error() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();
  let mut p = Pipeline::<TestContext, TestError>::new(&[("boom", false, None)]);
  p.on_root("boom", create_failing_handler("boom", "out of stock")).unwrap();
  registry.register_pipeline(p);

  let result = registry.run(ContextData::new(TestContext::default())).await;
  assert_eq!(result.unwrap_err(), TestError::Handler("out of stock".to_string()));
}
