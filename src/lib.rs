#![doc(test(attr(deny(warnings))))]

//! Tradebook records trade entries from free-form command lines.
//!
//! The [`entry`] module holds the disambiguation engine: it splits a line into
//! help requests, at most one command, and field values, and fills a typed
//! record from whatever order the values arrive in. The [`cli`] module wraps it
//! in an interactive shell that persists trades to a [`storage::Ledger`].

pub mod cli;
pub mod config;
pub mod domain;
pub mod entry;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("tradebook tracing initialized");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
