use crate::error::Result;
use crate::executor::ResultRow;
use std::io::Write;
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTable {
    header: Vec<String>,
    rows: Vec<ResultRow>,
}

impl DisplayTable {
    pub fn new(header: Vec<String>, rows: Vec<ResultRow>) -> Self {
        Self { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Light box-drawing borders, one rule under the header, cells untouched.
    pub fn render(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.header.iter().cloned());
        for row in &self.rows {
            builder.push_record(row.values().map(str::to_string));
        }

        let mut table = builder.build();
        table.with(Style::sharp());
        table.to_string()
    }

    /// Statements without a result shape (DDL, `SET`, plain `INSERT`) print nothing.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.header.is_empty() {
            return Ok(());
        }
        writeln!(out, "{}", self.render())?;
        out.flush()?;
        Ok(())
    }
}
