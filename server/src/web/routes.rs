// server/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::web::handlers::{
  address_handlers, auth_handlers, cart_handlers, catalog_handlers, order_handlers, profile_handlers, promo_handlers,
  review_handlers,
};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts every endpoint under `/api`.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      // Identity
      .route("/login", web::post().to(auth_handlers::login_handler))
      .route("/register", web::post().to(auth_handlers::register_handler))
      .route("/token/refresh", web::post().to(auth_handlers::refresh_handler))
      .service(
        web::resource("/profile")
          .route(web::get().to(profile_handlers::get_profile_handler))
          .route(web::put().to(profile_handlers::update_profile_handler)),
      )
      // Catalog
      .route("/department", web::get().to(catalog_handlers::list_departments_handler))
      .route("/subcategory", web::get().to(catalog_handlers::list_subcategories_handler))
      .route("/product", web::get().to(catalog_handlers::list_products_handler))
      .route("/product/{product_id}", web::get().to(catalog_handlers::get_product_handler))
      .route("/product/{product_id}/review", web::post().to(review_handlers::add_review_handler))
      // Cart, addresses, orders
      .service(
        web::resource("/cart")
          .route(web::get().to(cart_handlers::get_cart_handler))
          .route(web::put().to(cart_handlers::replace_cart_handler)),
      )
      .service(
        web::resource("/address")
          .route(web::get().to(address_handlers::list_addresses_handler))
          .route(web::post().to(address_handlers::create_address_handler)),
      )
      .service(
        web::resource("/order")
          .route(web::get().to(order_handlers::list_orders_handler))
          .route(web::post().to(order_handlers::place_order_handler)),
      )
      .route("/promo/{promo_code}", web::get().to(promo_handlers::get_promo_handler)),
  );
}
