//! CSV export.
//!
//! Comma separated, one record per line. Text fields are always quoted and
//! embedded quotes are doubled; numbers are written bare with a dot as
//! decimal separator.

use domain::{Aggregate, Money, ServiceOrder};

/// Builds a CSV document row by row.
#[derive(Debug, Default)]
pub struct CsvWriter {
    output: String,
}

impl CsvWriter {
    /// Starts a document with a header row.
    pub fn with_header(columns: &[&str]) -> Self {
        let mut writer = Self::default();
        writer.row(columns.iter().map(|c| Field::Text(c)));
        writer
    }

    /// Appends a row.
    pub fn row<'a>(&mut self, fields: impl IntoIterator<Item = Field<'a>>) {
        let line: Vec<String> = fields.into_iter().map(|f| f.render()).collect();
        self.output.push_str(&line.join(","));
        self.output.push('\n');
    }

    pub fn finish(self) -> String {
        self.output
    }
}

/// One CSV cell.
#[derive(Debug, Clone, Copy)]
pub enum Field<'a> {
    Text(&'a str),
    Money(Money),
    Number(f64),
    Integer(i64),
}

impl Field<'_> {
    fn render(&self) -> String {
        match self {
            Field::Text(text) => quote(text),
            Field::Money(money) => money.to_decimal_string(),
            Field::Number(n) => format!("{n:.2}"),
            Field::Integer(n) => n.to_string(),
        }
    }
}

/// Quotes a text field, doubling embedded quotes.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Exports an order list, one row per order.
pub fn orders_csv(orders: &[ServiceOrder]) -> String {
    let mut csv = CsvWriter::with_header(&[
        "OS",
        "Data",
        "Cliente",
        "Veículo",
        "Placa",
        "Status",
        "Mão de obra",
        "Peças",
        "Desconto (%)",
        "Total",
    ]);

    for order in orders {
        let id = order.id().to_string();
        let date = order.created_at().format("%d/%m/%Y").to_string();
        let vehicle = order.vehicle().display_name();
        csv.row([
            Field::Text(&id),
            Field::Text(&date),
            Field::Text(&order.customer().name),
            Field::Text(&vehicle),
            Field::Text(&order.vehicle().plate),
            Field::Text(order.status().label()),
            Field::Money(order.labor_cost()),
            Field::Money(order.parts_cost()),
            Field::Number(order.discount_percentage().as_percent()),
            Field::Money(order.total_cost()),
        ]);
    }

    csv.finish()
}
