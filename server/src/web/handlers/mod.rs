// server/src/web/handlers/mod.rs

pub mod address_handlers;
pub mod auth_handlers;
pub mod cart_handlers;
pub mod catalog_handlers;
pub mod order_handlers;
pub mod profile_handlers;
pub mod promo_handlers;
pub mod review_handlers;
