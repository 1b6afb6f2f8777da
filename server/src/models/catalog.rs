// server/src/models/catalog.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Department {
  #[serde(skip_serializing)]
  pub id: Uuid,
  pub name: String,
  pub department_number: i32,
  pub image: Option<String>,
}

/// A subcategory as listed to clients, carrying its department's number.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subcategory {
  pub name: String,
  pub subcategory_number: i32,
  pub image: Option<String>,
  pub department_number: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentWithSubcategories {
  pub name: String,
  pub department_number: i32,
  pub image: Option<String>,
  pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductListing {
  pub id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub stock_quantity: i32,
  pub brand: Option<String>,
  pub average_rating: Option<f64>,
  pub image: Option<String>,
  pub department_number: i32,
  pub subcategory_number: i32,
  pub description: Option<String>,
}
