mod common;

use common::setup_test_env;
use tradebook::{
    config::Config,
    domain::{trade_record, Trade},
    errors::LedgerError,
    storage::{JsonLedger, Ledger},
};

fn sample_trade() -> Trade {
    let mut record = trade_record().unwrap();
    for (key, value) in [
        ("action", "open"),
        ("type", "long"),
        ("price", "10.00000000"),
        ("stop", "9.00000000"),
        ("atr", "0.0100"),
    ] {
        assert!(record.set(key, value));
    }
    Trade::from_record(&record).expect("complete record")
}

#[test]
fn trades_round_trip_through_the_json_ledger() {
    let (mut ledger, _config) = setup_test_env();
    let trade = sample_trade();

    ledger.write("trades", &trade.to_row()).unwrap();
    let row = ledger.read("trades").unwrap().expect("last row");
    assert_eq!(Trade::from_row(&row), Some(trade));

    let reopened_base = ledger.book_dir().parent().unwrap().parent().unwrap();
    let reopened = JsonLedger::open(reopened_base, "trading_book").unwrap();
    assert_eq!(reopened.row_count("trades").unwrap(), 1);
}

#[test]
fn rows_must_keep_the_table_width() {
    let (mut ledger, _config) = setup_test_env();
    ledger.write("trades", &sample_trade().to_row()).unwrap();

    let err = ledger
        .write("trades", &["short".to_string()])
        .unwrap_err();
    assert!(matches!(err, LedgerError::RowShape { expected: 7, .. }));
    assert_eq!(ledger.row_count("trades").unwrap(), 1);
}

#[test]
fn config_saves_next_to_books() {
    let (_ledger, config_manager) = setup_test_env();
    let config = Config {
        trades_table: "swing_trades".into(),
        ..Config::default()
    };
    config_manager.save(&config).unwrap();
    assert_eq!(config_manager.load().unwrap().trades_table, "swing_trades");
}
