// server/src/services/mod.rs

pub mod auth_service;
pub mod catalog;
pub mod pricing;
pub mod token_service;
