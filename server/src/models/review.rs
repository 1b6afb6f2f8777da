// server/src/models/review.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductReview {
  pub id: Uuid,
  pub product_id: Uuid,
  pub user_id: Uuid,
  pub review: String,
  pub rating: i32,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewAuthor {
  pub first_name: String,
  pub last_name: String,
  pub middle_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithAuthor {
  pub user: ReviewAuthor,
  pub review: String,
  pub rating: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReviewWithAuthorRow {
  pub first_name: String,
  pub last_name: String,
  pub middle_name: Option<String>,
  pub review: String,
  pub rating: i32,
}

impl From<ReviewWithAuthorRow> for ReviewWithAuthor {
  fn from(row: ReviewWithAuthorRow) -> Self {
    ReviewWithAuthor {
      user: ReviewAuthor {
        first_name: row.first_name,
        last_name: row.last_name,
        middle_name: row.middle_name,
      },
      review: row.review,
      rating: row.rating,
    }
  }
}
