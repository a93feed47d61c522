//! EECC - monthly account statements for investment portfolios
//!
//! This library gathers a customer's portfolio, snapshots, exchange rate,
//! fund prices and recent transactions, computes the statement figures and
//! lays them out as an A4 landscape PDF.

pub mod cli;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod render;
pub mod reports;
pub mod utils;
