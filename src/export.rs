// 📤 CSV Export - one row per line item, suppliers in route order

use serde::Serialize;
use std::io;
use std::path::Path;

use crate::error::Result;
use crate::shopping_list::ShoppingList;

/// Written up front so an empty list still yields a header row
const COLUMNS: [&str; 9] = [
    "supplier",
    "code",
    "product",
    "unit",
    "quantity",
    "unit_price",
    "total",
    "section",
    "availability",
];

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    supplier: &'a str,
    code: &'a str,
    product: &'a str,
    unit: &'a str,
    quantity: f64,
    unit_price: f64,
    total: f64,
    section: &'a str,
    availability: &'a str,
}

/// Write the list as CSV; returns the number of rows written
pub fn write_csv<W: io::Write>(list: &ShoppingList, writer: W) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(COLUMNS)?;
    let mut rows = 0;

    for order in &list.orders {
        for item in &order.items {
            wtr.serialize(ExportRow {
                supplier: &order.supplier_name,
                code: &item.code,
                product: &item.name,
                unit: &item.unit,
                quantity: item.quantity,
                unit_price: item.unit_price,
                total: item.total(),
                section: item.section.map(|s| s.as_str()).unwrap_or(""),
                availability: item.availability.as_str(),
            })?;
            rows += 1;
        }
    }

    wtr.flush()?;
    Ok(rows)
}

pub fn export_to_path(list: &ShoppingList, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    let rows = write_csv(list, file)?;
    tracing::info!(list = %list.id, path = %path.display(), rows, "shopping list exported");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Section, Supplier, SupplierKind};
    use crate::shopping_list::{Availability, LineItem, SupplierOrder};
    use chrono::NaiveDate;

    fn list() -> ShoppingList {
        let supplier = Supplier::new("Atacadão Distribuidor", SupplierKind::Wholesaler, 200.0);
        let items = vec![
            LineItem {
                id: "1".into(),
                code: "P001".into(),
                name: "Arroz Integral".into(),
                unit: "kg".into(),
                quantity: 10.0,
                unit_price: 5.99,
                section: Some(Section::Grocery),
                category: "Grains".into(),
                availability: Availability::Available,
            },
            LineItem {
                id: "2".into(),
                code: "P002".into(),
                name: "Feijão Preto".into(),
                unit: "kg".into(),
                quantity: 5.0,
                unit_price: 7.9,
                section: None,
                category: "Grains".into(),
                availability: Availability::Unavailable,
            },
        ];

        ShoppingList::new(
            "1",
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap(),
            vec![SupplierOrder::for_supplier(&supplier, items)],
        )
    }

    #[test]
    fn test_write_csv() {
        let mut buffer = Vec::new();
        let rows = write_csv(&list(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(rows, 2);
        assert_eq!(
            lines[0],
            "supplier,code,product,unit,quantity,unit_price,total,section,availability"
        );
        assert_eq!(lines[1], "Atacadão Distribuidor,P001,Arroz Integral,kg,10.0,5.99,59.9,Grocery,Available");
        assert_eq!(lines[2], "Atacadão Distribuidor,P002,Feijão Preto,kg,5.0,7.9,39.5,,Unavailable");
    }

    #[test]
    fn test_empty_list_keeps_header() {
        let mut empty = list();
        empty.orders[0].items.clear();

        let mut buffer = Vec::new();
        let rows = write_csv(&empty, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(rows, 0);
        assert_eq!(text, format!("{}\n", COLUMNS.join(",")));
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list-1.csv");

        let rows = export_to_path(&list(), &path).unwrap();
        assert_eq!(rows, 2);

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][1], "P002");
    }
}
