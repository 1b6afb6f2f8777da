// server/src/pipelines/checkout_pipeline.rs

//! Order placement: cart, promo, fulfillment and payment record turned into
//! one persisted order on a single transaction.

use serde::Deserialize;
use storeflow::{skip_when, ContextData, FlowRegistry, FlowResult, Pipeline, PipelineControl};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::db::orders::NewOrder;
use crate::db::{addresses, carts, orders, promos, TxHandle};
use crate::errors::{AppError, Result as AppResult};
use crate::models::{NewAddress, PaymentDetails};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::{CheckoutCtxData, Fulfillment};
use crate::services::pricing;
use crate::state::AppState;

/// Body of `POST /order`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderRequest {
  #[serde(default)]
  pub pickup: bool,
  pub payment: Option<PaymentDetails>,
  pub promo_id: Option<Uuid>,
  pub address_id: Option<Uuid>,
  pub address: Option<NewAddress>,
}

impl OrderRequest {
  /// Checks everything that can be checked without storage.
  pub fn validate(self) -> AppResult<(PaymentDetails, Fulfillment, Option<Uuid>)> {
    let payment = self
      .payment
      .ok_or_else(|| AppError::Validation("Payment details are required.".to_string()))?;
    payment.validate()?;
    let fulfillment = Fulfillment::resolve(self.pickup, self.address_id, self.address)?;
    Ok((payment, fulfillment, self.promo_id))
  }
}

/// Registers the order placement pipeline.
pub fn register_checkout_pipeline(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("record_payment", false, None),
    ("assign_order_number", false, None),
    ("load_cart_lines", false, None),
    ("apply_promo", false, Some(skip_when(|c: &CheckoutCtxData| c.promo_id.is_none()))),
    ("attach_pickup", false, Some(skip_when(|c: &CheckoutCtxData| !c.fulfillment.is_pickup()))),
    (
      "attach_saved_address",
      false,
      Some(skip_when(|c: &CheckoutCtxData| c.fulfillment.saved_address().is_none())),
    ),
    (
      "create_inline_address",
      false,
      Some(skip_when(|c: &CheckoutCtxData| c.fulfillment.new_address().is_none())),
    ),
    ("create_order", false, None),
    ("materialize_order_lines", false, None),
    ("clear_cart", false, None),
  ]);

  p.on_root("record_payment", record_payment)?;
  p.on_root("assign_order_number", assign_order_number)?;
  p.on_root("load_cart_lines", load_cart_lines)?;
  p.on_root("apply_promo", apply_promo)?;
  p.on_root("attach_pickup", attach_pickup)?;
  p.on_root("attach_saved_address", attach_saved_address)?;
  p.on_root("create_inline_address", create_inline_address)?;
  p.on_root("create_order", create_order)?;
  p.on_root("materialize_order_lines", materialize_order_lines)?;
  p.on_root("clear_cart", clear_cart)?;

  registry.register_pipeline(p);
  info!("Checkout pipeline registered.");
  Ok(())
}

/// Places an order from the user's cart and returns its order number.
///
/// Either the order and all of its effects commit, or nothing does.
#[instrument(name = "checkout::place_order", skip(app_state, request))]
pub async fn place_order(app_state: &AppState, user_id: Uuid, request: OrderRequest) -> AppResult<i64> {
  let (payment, fulfillment, promo_id) = request.validate()?;

  let tx = TxHandle::begin(&app_state.db_pool).await?;
  let ctx = ContextData::new(CheckoutCtxData::new(tx.clone(), user_id, payment, fulfillment, promo_id));

  let outcome = app_state.flows.run(ctx.clone()).await?;
  let order_number = { ctx.read().order_number };
  common_steps::commit_if_completed(&tx, outcome, "checkout").await?;

  let order_number =
    order_number.ok_or_else(|| AppError::Internal("Checkout completed without an order number.".to_string()))?;
  info!(order_number, "Order placed.");
  Ok(order_number)
}

fn tx_and_user(ctx: &ContextData<CheckoutCtxData>) -> (TxHandle, Uuid) {
  let guard = ctx.read();
  (guard.tx.clone(), guard.user_id)
}

async fn record_payment(ctx: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (tx, user_id) = tx_and_user(&ctx);
  let payment = { ctx.read().payment.clone() };

  let payment_id = {
    let mut conn = tx.conn().await?;
    orders::insert_payment(&mut *conn, user_id, &payment).await?
  };
  debug!(%payment_id, method = %payment.payment_method_name, "Payment record created.");
  ctx.write().payment_id = Some(payment_id);
  Ok(PipelineControl::Continue)
}

async fn assign_order_number(ctx: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (tx, _) = tx_and_user(&ctx);
  let order_number = {
    let mut conn = tx.conn().await?;
    orders::next_order_number(&mut *conn).await?
  };
  debug!(order_number, "Order number assigned.");
  ctx.write().order_number = Some(order_number);
  Ok(PipelineControl::Continue)
}

async fn load_cart_lines(ctx: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (tx, user_id) = tx_and_user(&ctx);
  let lines = {
    let mut conn = tx.conn().await?;
    let cart_id = carts::lock_cart(&mut *conn, user_id).await?;
    match cart_id {
      Some(_) => carts::priced_lines_for_update(&mut *conn, user_id).await?,
      None => Vec::new(),
    }
  };

  if lines.is_empty() {
    warn!(%user_id, "Checkout with an empty cart.");
    return Err(AppError::Validation("Cart is empty.".to_string()));
  }
  pricing::ensure_in_stock(&lines)?;

  let total_cost = pricing::order_total(&lines);
  debug!(line_count = lines.len(), %total_cost, "Cart lines priced.");
  let mut guard = ctx.write();
  guard.lines = lines;
  guard.total_cost = total_cost;
  Ok(PipelineControl::Continue)
}

async fn apply_promo(ctx: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (tx, _) = tx_and_user(&ctx);
  let Some(promo_id) = ({ ctx.read().promo_id }) else {
    return Ok(PipelineControl::Continue);
  };

  let promo = {
    let mut conn = tx.conn().await?;
    promos::find_by_id(&mut *conn, promo_id).await?
  };
  match promo {
    Some(promo) => {
      let mut guard = ctx.write();
      guard.total_cost = pricing::apply_promo(guard.total_cost, promo.percentage);
      guard.applied_promo_id = Some(promo.id);
      debug!(promo_code = %promo.promo_code, total_cost = %guard.total_cost, "Promo applied.");
    }
    None => debug!(%promo_id, "Promo not found; placing order without a discount."),
  }
  Ok(PipelineControl::Continue)
}

async fn attach_pickup(ctx: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  ctx.write().address_id = None;
  debug!("Order is for pickup.");
  Ok(PipelineControl::Continue)
}

async fn attach_saved_address(ctx: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (tx, user_id) = tx_and_user(&ctx);
  let address_id = { ctx.read().fulfillment.saved_address() }
    .ok_or_else(|| AppError::Internal("No saved address to attach.".to_string()))?;

  let owner = {
    let mut conn = tx.conn().await?;
    addresses::owner_of(&mut *conn, address_id).await?
  };
  match owner {
    Some(owner) if owner == user_id => {
      ctx.write().address_id = Some(address_id);
      Ok(PipelineControl::Continue)
    }
    _ => {
      warn!(%address_id, %user_id, "Checkout with an address the user does not own.");
      Err(AppError::Ownership("Address does not belong to the current user.".to_string()))
    }
  }
}

async fn create_inline_address(ctx: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (tx, user_id) = tx_and_user(&ctx);
  let new_address = { ctx.read().fulfillment.new_address().cloned() }
    .ok_or_else(|| AppError::Internal("No inline address to create.".to_string()))?;

  let address = {
    let mut conn = tx.conn().await?;
    addresses::insert(&mut *conn, user_id, &new_address).await?
  };
  debug!(address_id = %address.id, "Inline address created.");
  ctx.write().address_id = Some(address.id);
  Ok(PipelineControl::Continue)
}

async fn create_order(ctx: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (tx, new_order) = {
    let guard = ctx.read();
    let missing = |what: &str| AppError::Internal(format!("Order is missing its {}.", what));
    let new_order = NewOrder {
      user_id: guard.user_id,
      payment_id: guard.payment_id.ok_or_else(|| missing("payment record"))?,
      address_id: guard.address_id,
      promo_id: guard.applied_promo_id,
      is_pickup: guard.fulfillment.is_pickup(),
      total_cost: pricing::round_money(guard.total_cost),
      order_number: guard.order_number.ok_or_else(|| missing("order number"))?,
    };
    (guard.tx.clone(), new_order)
  };

  let order_id = {
    let mut conn = tx.conn().await?;
    orders::insert(&mut *conn, &new_order).await?
  };
  info!(%order_id, order_number = new_order.order_number, total_cost = %new_order.total_cost, "Order row created.");
  ctx.write().order_id = Some(order_id);
  Ok(PipelineControl::Continue)
}

async fn materialize_order_lines(ctx: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (tx, order_id, lines) = {
    let guard = ctx.read();
    (guard.tx.clone(), guard.order_id, guard.lines.clone())
  };
  let order_id = order_id.ok_or_else(|| AppError::Internal("Order row was not created.".to_string()))?;

  let mut conn = tx.conn().await?;
  for line in &lines {
    if !orders::decrement_stock(&mut *conn, line.product_id, line.quantity).await? {
      warn!(product_id = %line.product_id, "Stock floor check failed.");
      return Err(AppError::InsufficientStock(format!(
        "Product {} no longer has {} in stock.",
        line.product_id, line.quantity
      )));
    }
    let cost = pricing::line_cost(line.price, line.quantity);
    orders::insert_line(&mut *conn, order_id, line.product_id, line.quantity, cost).await?;
  }
  debug!(%order_id, line_count = lines.len(), "Order lines written and stock decremented.");
  Ok(PipelineControl::Continue)
}

async fn clear_cart(ctx: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (tx, user_id) = tx_and_user(&ctx);
  let removed = {
    let mut conn = tx.conn().await?;
    carts::clear_lines_for_user(&mut *conn, user_id).await?
  };
  debug!(removed, "Cart emptied.");
  Ok(PipelineControl::Continue)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn payment() -> PaymentDetails {
    PaymentDetails {
      card_number: "4111111111111111".into(),
      security_code: "123".into(),
      payment_method_name: "visa".into(),
    }
  }

  #[test]
  fn pickup_request_validates() {
    let request = OrderRequest {
      pickup: true,
      payment: Some(payment()),
      ..Default::default()
    };
    let (_, fulfillment, promo_id) = request.validate().unwrap();
    assert!(fulfillment.is_pickup());
    assert!(promo_id.is_none());
  }

  #[test]
  fn missing_payment_is_rejected() {
    let request = OrderRequest {
      pickup: true,
      ..Default::default()
    };
    assert!(matches!(request.validate(), Err(AppError::Validation(_))));
  }

  #[test]
  fn request_body_parses() {
    let body = r#"{
      "pickup": false,
      "payment": {"card_number": "4111111111111111", "security_code": "123", "payment_method_name": "visa"},
      "address": {"address_name": "Home", "address_line_1": "1 Main", "address_line_2": "", "city": "x", "state": "y", "zipcode": "z"}
    }"#;
    let request: OrderRequest = serde_json::from_str(body).unwrap();
    // address_line_2 is blank, so the inline address is incomplete.
    assert!(matches!(request.validate(), Err(AppError::Validation(_))));
  }
}
