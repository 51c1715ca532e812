use std::collections::HashMap;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::models::{OrderLine, Product};

use super::{LoadError, OrderDataSource};

/// Reads the catalog and order history from two CSV files
///
/// `products.csv` needs `product_id,name,price`; `orders.csv` needs
/// `order_id,customer_id,product_id`. Extra columns are ignored.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    products_path: PathBuf,
    orders_path: PathBuf,
}

impl CsvDataSource {
    pub fn new(products_path: impl Into<PathBuf>, orders_path: impl Into<PathBuf>) -> Self {
        Self {
            products_path: products_path.into(),
            orders_path: orders_path.into(),
        }
    }
}

#[async_trait::async_trait]
impl OrderDataSource for CsvDataSource {
    async fn load_products(&self) -> Result<Vec<Product>, LoadError> {
        let bytes = read_file(&self.products_path).await?;
        parse_products(&display(&self.products_path), &bytes)
    }

    async fn load_order_lines(&self) -> Result<Vec<OrderLine>, LoadError> {
        let bytes = read_file(&self.orders_path).await?;
        parse_order_lines(&display(&self.orders_path), &bytes)
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

async fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: display(path),
        source,
    })
}

/// Header name → column position, tolerant of whitespace, case and a UTF-8 BOM
struct Columns {
    positions: HashMap<String, usize>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let name = name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase();
                (name, idx)
            })
            .collect();
        Self { positions }
    }

    fn require(&self, path: &str, column: &'static str) -> Result<usize, LoadError> {
        self.positions
            .get(column)
            .copied()
            .ok_or_else(|| LoadError::MissingColumn {
                path: path.to_string(),
                column,
            })
    }
}

/// A trimmed cell, `None` when blank or absent
fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|value| !value.is_empty())
}

fn required_cell<'r>(
    record: &'r StringRecord,
    idx: usize,
    path: &str,
    line: usize,
    field: &'static str,
) -> Result<&'r str, LoadError> {
    cell(record, idx).ok_or_else(|| LoadError::MissingField {
        path: path.to_string(),
        line,
        field,
    })
}

/// Parses a price, tolerating thousands separators such as `"1,299.00"`
pub fn normalize_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|price| price.is_finite())
}

fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes)
}

fn csv_error(path: &str) -> impl Fn(csv::Error) -> LoadError + '_ {
    move |source| LoadError::Csv {
        path: path.to_string(),
        source,
    }
}

pub fn parse_products(path: &str, bytes: &[u8]) -> Result<Vec<Product>, LoadError> {
    let mut reader = reader(bytes);
    let columns = Columns::new(reader.headers().map_err(csv_error(path))?);
    let id_col = columns.require(path, "product_id")?;
    let name_col = columns.require(path, "name")?;
    let price_col = columns.require(path, "price")?;

    let mut products = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        // Data starts on line 2, after the header.
        let line = idx + 2;
        let record = record.map_err(csv_error(path))?;

        let id = required_cell(&record, id_col, path, line, "product_id")?;
        let price = match cell(&record, price_col) {
            Some(raw) => Some(normalize_price(raw).ok_or_else(|| LoadError::InvalidPrice {
                path: path.to_string(),
                line,
                value: raw.to_string(),
            })?),
            None => None,
        };

        products.push(Product {
            id: id.to_string(),
            name: cell(&record, name_col).map(str::to_string),
            price,
        });
    }

    tracing::debug!(path, count = products.len(), "Parsed products");
    Ok(products)
}

pub fn parse_order_lines(path: &str, bytes: &[u8]) -> Result<Vec<OrderLine>, LoadError> {
    let mut reader = reader(bytes);
    let columns = Columns::new(reader.headers().map_err(csv_error(path))?);
    let order_col = columns.require(path, "order_id")?;
    let customer_col = columns.require(path, "customer_id")?;
    let product_col = columns.require(path, "product_id")?;

    let mut lines = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let line = idx + 2;
        let record = record.map_err(csv_error(path))?;

        lines.push(OrderLine::new(
            required_cell(&record, order_col, path, line, "order_id")?,
            required_cell(&record, customer_col, path, line, "customer_id")?,
            required_cell(&record, product_col, path, line, "product_id")?,
        ));
    }

    tracing::debug!(path, count = lines.len(), "Parsed order lines");
    Ok(lines)
}
