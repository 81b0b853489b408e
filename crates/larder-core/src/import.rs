//! Snapshot parsers for catalog, purchase and price data
//!
//! Catalogs are JSON; purchase and price histories are CSV with a header
//! row. Columns are matched by header name, case-insensitively, so column
//! order does not matter and extra columns are ignored.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{normalize_key, CatalogItem, Category, PriceObservation, PurchaseEvent};

/// Catalog files are either a bare array or `{ "items": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Items(Vec<CatalogItem>),
    Wrapped { items: Vec<CatalogItem> },
}

/// Parse a catalog snapshot
pub fn parse_catalog_json<R: Read>(reader: R) -> Result<Vec<CatalogItem>> {
    let items = match serde_json::from_reader::<_, CatalogFile>(reader)? {
        CatalogFile::Items(items) => items,
        CatalogFile::Wrapped { items } => items,
    };

    for (i, item) in items.iter().enumerate() {
        if item.name.trim().is_empty() {
            return Err(Error::Import(format!("Catalog item {}: missing name", i + 1)));
        }
    }

    debug!("Parsed {} catalog items", items.len());
    Ok(items)
}

/// Header positions for one CSV file
struct Columns {
    headers: StringRecord,
}

impl Columns {
    fn new(headers: StringRecord) -> Self {
        Self { headers }
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| normalize_key(h) == name)
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.index(name)
            .ok_or_else(|| Error::Import(format!("Missing column: {}", name)))
    }
}

/// Value of an optional column, `None` when absent or blank
fn optional<'r>(record: &'r StringRecord, index: Option<usize>) -> Option<&'r str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn required<'r>(record: &'r StringRecord, index: usize, name: &str, row: usize) -> Result<&'r str> {
    optional(record, Some(index))
        .ok_or_else(|| Error::Import(format!("Row {}: missing {}", row, name)))
}

fn row_error(row: usize, e: Error) -> Error {
    match e {
        Error::Import(msg) => Error::Import(format!("Row {}: {}", row, msg)),
        other => other,
    }
}

/// Parse purchase history.
///
/// Format: date,item,category,quantity,price,store
///
/// `category`, `quantity` and `store` are optional; quantity defaults to 1.
/// `price` is the total paid for the quantity.
pub fn parse_purchases_csv<R: Read>(reader: R) -> Result<Vec<PurchaseEvent>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::new(rdr.headers()?.clone());
    let date_col = columns.require("date")?;
    let item_col = columns.require("item")?;
    let price_col = columns.require("price")?;
    let category_col = columns.index("category");
    let quantity_col = columns.index("quantity");
    let store_col = columns.index("store");

    let mut purchases = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let row = i + 2;

        let timestamp =
            parse_timestamp(required(&record, date_col, "date", row)?).map_err(|e| row_error(row, e))?;
        let item_name = required(&record, item_col, "item", row)?.to_string();
        let price_paid =
            parse_amount(required(&record, price_col, "price", row)?).map_err(|e| row_error(row, e))?;
        let quantity = match optional(&record, quantity_col) {
            Some(q) => parse_amount(q).map_err(|e| row_error(row, e))?,
            None => 1.0,
        };
        if quantity <= 0.0 {
            return Err(Error::Import(format!("Row {}: quantity must be positive", row)));
        }

        purchases.push(PurchaseEvent {
            item_name,
            category: optional(&record, category_col).map(Category::lookup),
            quantity,
            price_paid,
            store: optional(&record, store_col).map(str::to_string),
            timestamp,
        });
    }

    debug!("Parsed {} purchases", purchases.len());
    Ok(purchases)
}

/// Parse price observations.
///
/// Format: date,item,price,store (store optional)
pub fn parse_prices_csv<R: Read>(reader: R) -> Result<Vec<PriceObservation>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::new(rdr.headers()?.clone());
    let date_col = columns.require("date")?;
    let item_col = columns.require("item")?;
    let price_col = columns.require("price")?;
    let store_col = columns.index("store");

    let mut observations = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 2;

        let timestamp =
            parse_timestamp(required(&record, date_col, "date", row)?).map_err(|e| row_error(row, e))?;
        let price =
            parse_amount(required(&record, price_col, "price", row)?).map_err(|e| row_error(row, e))?;

        observations.push(PriceObservation {
            item_name: required(&record, item_col, "item", row)?.to_string(),
            price,
            timestamp,
            store: optional(&record, store_col).map(str::to_string),
        });
    }

    debug!("Parsed {} price observations", observations.len());
    Ok(observations)
}

/// Parse a category weight delta such as `Produce=+0.1` or `dairy=-0.05`
pub fn parse_weight_override(s: &str) -> Result<(Category, f64)> {
    let (label, delta) = s
        .split_once('=')
        .ok_or_else(|| Error::InvalidData(format!("Expected CATEGORY=DELTA, got: {}", s)))?;

    let category = Category::lookup(label);
    if category == Category::Other && normalize_key(label) != "other" {
        return Err(Error::InvalidData(format!("Unknown category: {}", label.trim())));
    }

    let delta = delta
        .trim()
        .trim_start_matches('+')
        .parse::<f64>()
        .map_err(|_| Error::InvalidData(format!("Invalid weight delta: {}", delta.trim())))?;
    if !delta.is_finite() {
        return Err(Error::InvalidData(format!("Invalid weight delta: {}", delta)));
    }

    Ok((category, delta))
}

/// Parse a calendar date in various common formats
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2026-01-15
        "%m/%d/%Y", // 01/15/2026
        "%m/%d/%y", // 01/15/26
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse a timestamp; plain dates are taken as midnight UTC
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date = parse_date(s)?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::Import(format!("Unable to parse date: {}", s)))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

/// Parse an amount string, handling currency symbols and commas
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s.trim().replace(['$', ',', ' '], "");

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Error::Import(format!("Unable to parse amount: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(parse_date("2026-01-15").unwrap(), expected);
        assert_eq!(parse_date("01/15/2026").unwrap(), expected);
        assert_eq!(parse_date(" 2026-01-15T08:30:00Z ").unwrap(), expected);
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_parse_timestamp_keeps_time() {
        let ts = parse_timestamp("2026-01-15T08:30:00-05:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-15T13:30:00+00:00");

        let midnight = parse_timestamp("2026-01-15").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2026-01-15T00:00:00+00:00");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount(" 3.5 ").unwrap(), 3.5);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn test_parse_catalog_array() {
        let json = r#"[
            {"id": "d1", "name": "Milk", "category": "Dairy", "unit": "gal", "average_price": 3.5},
            {"id": "p1", "name": "Bananas", "category": "Fruits & Vegetables", "unit": "lbs", "price": 0.6},
            {"id": "x1", "name": "Sponges", "category": "Cleaning", "average_price": 2.0}
        ]"#;

        let items = parse_catalog_json(json.as_bytes()).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].unit, Unit::Gallon);
        assert_eq!(items[1].category, Category::Produce);
        assert_eq!(items[1].average_price, 0.6);
        assert_eq!(items[2].unit, Unit::Each);
    }

    #[test]
    fn test_parse_catalog_wrapped() {
        let json = r#"{"items": [{"id": "n1", "name": "Rice", "category": "pantry", "average_price": 4.0}]}"#;
        let items = parse_catalog_json(json.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, Category::Pantry);
    }

    #[test]
    fn test_parse_catalog_rejects_blank_name() {
        let json = r#"[{"id": "a", "name": "  ", "category": "dairy", "average_price": 1.0}]"#;
        assert!(matches!(
            parse_catalog_json(json.as_bytes()),
            Err(Error::Import(_))
        ));
        assert!(matches!(
            parse_catalog_json("not json".as_bytes()),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_parse_purchases() {
        let csv = "date,item,category,quantity,price,store
2026-03-01,Milk,Dairy,2,$7.00,FreshMart
03/08/2026,Milk,,,3.40,
2026-03-09T18:00:00Z,Bananas,Produce,1.5,0.90,BudgetGrocer";

        let purchases = parse_purchases_csv(csv.as_bytes()).unwrap();
        assert_eq!(purchases.len(), 3);

        assert_eq!(purchases[0].category, Some(Category::Dairy));
        assert_eq!(purchases[0].quantity, 2.0);
        assert_eq!(purchases[0].unit_price(), Some(3.5));
        assert_eq!(purchases[0].store.as_deref(), Some("FreshMart"));

        assert_eq!(purchases[1].category, None);
        assert_eq!(purchases[1].quantity, 1.0);
        assert_eq!(purchases[1].store, None);
        assert_eq!(purchases[1].date(), NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());

        assert_eq!(purchases[2].category, Some(Category::Produce));
    }

    #[test]
    fn test_parse_purchases_reordered_columns() {
        let csv = "Item,Price,Date\nEggs,4.00,2026-03-01";
        let purchases = parse_purchases_csv(csv.as_bytes()).unwrap();
        assert_eq!(purchases[0].item_name, "Eggs");
        assert_eq!(purchases[0].price_paid, 4.0);
    }

    #[test]
    fn test_parse_purchases_errors_name_row() {
        let csv = "date,item,price\n2026-03-01,Milk,3.50\nnot-a-date,Milk,3.50";
        let err = parse_purchases_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Row 3"), "{}", err);

        let missing = "date,item\n2026-03-01,Milk";
        let err = parse_purchases_csv(missing.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Missing column: price"));

        let blank_item = "date,item,price\n2026-03-01,,3.50";
        let err = parse_purchases_csv(blank_item.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Row 2: missing item"));
    }

    #[test]
    fn test_parse_prices() {
        let csv = "date,item,price,store
2026-03-02,Coffee,8.99,FreshMart
2026-03-09,Coffee,$9.49,";
        let prices = parse_prices_csv(csv.as_bytes()).unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].store.as_deref(), Some("FreshMart"));
        assert_eq!(prices[1].price, 9.49);
        assert_eq!(prices[1].store, None);
    }

    #[test]
    fn test_parse_weight_override() {
        assert_eq!(
            parse_weight_override("Produce=+0.1").unwrap(),
            (Category::Produce, 0.1)
        );
        assert_eq!(
            parse_weight_override("meat & seafood=-0.05").unwrap(),
            (Category::MeatSeafood, -0.05)
        );
        assert!(parse_weight_override("Produce").is_err());
        assert!(parse_weight_override("Gizmos=0.1").is_err());
        assert!(parse_weight_override("Dairy=lots").is_err());
    }
}
