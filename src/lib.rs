//! Payroll engine: attendance-based pay, earnings and deductions per employee and month.

pub mod cache;
pub mod calc;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod money;
pub mod period;
pub mod service;
pub mod store;
pub mod timeutil;

pub use error::{AppError, Result};
