//! Record schemas handled by the shell and their conversions.

pub mod settings;
pub mod trade;

pub use trade::{trade_record, Trade, TRADE_COLUMNS, TRADE_SCHEMA};
