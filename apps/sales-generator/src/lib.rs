//! Synthetic retail sales data: weighted product, buyer, time and address
//! models combined into orders, with deliberate dirty rows, one table per month.

pub mod address;
pub mod catalog;
pub mod common;
pub mod config;
pub mod demographics;
pub mod error;
pub mod month;
pub mod order;
pub mod summary;
pub mod table;
pub mod temporal;
