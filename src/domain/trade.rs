use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use uuid::Uuid;

use crate::entry::{FormatError, RecordState};

/// Field keys and formats of a trade entry, in prompting order.
pub const TRADE_SCHEMA: [(&str, &str); 5] = [
    ("action", "open/close/update/bulk"),
    ("type", "long/short"),
    ("price", "#.########"),
    ("stop", "#.########"),
    ("atr", "#.####%"),
];

/// Column names of a logged trade row.
pub const TRADE_COLUMNS: [&str; 7] = [
    "id",
    "logged_at",
    "action",
    "type",
    "price",
    "stop",
    "atr",
];

pub fn trade_record() -> Result<RecordState, FormatError> {
    RecordState::from_schema(&TRADE_SCHEMA)
}

/// A completed trade entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub action: String,
    pub side: String,
    pub price: String,
    pub stop: String,
    pub atr: String,
}

impl Trade {
    /// Builds a trade from a complete record. The bulk sentinel is not a trade action.
    pub fn from_record(record: &RecordState) -> Option<Self> {
        let field = |key: &str| record.value(key).map(str::to_string);
        let action = field("action")?;
        if action == crate::entry::assign::BULK_SENTINEL {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            logged_at: Utc::now().trunc_subsecs(0),
            action,
            side: field("type")?,
            price: field("price")?,
            stop: field("stop")?,
            atr: field("atr")?,
        })
    }

    pub fn from_row(row: &[String]) -> Option<Self> {
        let [id, logged_at, action, side, price, stop, atr] = row else {
            return None;
        };
        Some(Self {
            id: id.parse().ok()?,
            logged_at: DateTime::parse_from_rfc3339(logged_at)
                .ok()?
                .with_timezone(&Utc),
            action: action.clone(),
            side: side.clone(),
            price: price.clone(),
            stop: stop.clone(),
            atr: atr.clone(),
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.logged_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.action.clone(),
            self.side.clone(),
            self.price.clone(),
            self.stop.clone(),
            self.atr.clone(),
        ]
    }

    /// `column: value` lines for display.
    pub fn summary_lines(&self) -> Vec<String> {
        TRADE_COLUMNS
            .iter()
            .zip(self.to_row())
            .map(|(column, value)| format!("{column:<10} {value}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(action: &str) -> RecordState {
        let mut record = trade_record().unwrap();
        record.set("action", action);
        record.set("type", "long");
        record.set("price", "101.50000000");
        record.set("stop", "99.00000000");
        record.set("atr", "0.0150");
        record
    }

    #[test]
    fn trade_rows_round_trip_through_the_ledger_shape() {
        let trade = Trade::from_record(&filled("open")).expect("complete record");
        let row = trade.to_row();
        assert_eq!(row.len(), TRADE_COLUMNS.len());
        assert_eq!(&row[2..], ["open", "long", "101.50000000", "99.00000000", "0.0150"]);
        assert_eq!(Trade::from_row(&row), Some(trade));
    }

    #[test]
    fn incomplete_or_bulk_records_are_not_trades() {
        assert!(Trade::from_record(&trade_record().unwrap()).is_none());
        assert!(Trade::from_record(&filled("bulk")).is_none());
        assert!(Trade::from_row(&["x".to_string()]).is_none());
    }
}
