use crate::error::{PgExecError, Result};
use sqlx::postgres::{PgColumn, PgValueFormat, PgValueRef};
use sqlx::{Column, TypeInfo, ValueRef};
use std::fmt::{self, Write};
use uuid::Uuid;

pub const NULL_DISPLAY: &str = "null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Bool,
    Uuid,
    Other(String),
}

impl ColumnType {
    pub fn from_type_name(name: &str) -> Self {
        let normalized = name.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "BOOL" | "BOOLEAN" => ColumnType::Bool,
            "UUID" => ColumnType::Uuid,
            _ => ColumnType::Other(name.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    pub fn from_column(column: &PgColumn) -> Self {
        Self::new(
            column.name(),
            ColumnType::from_type_name(column.type_info().name()),
        )
    }
}

/// A value as it came off the wire, before any type interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawValue<'r> {
    Null,
    Binary(&'r [u8]),
    Text(&'r str),
}

impl<'r> RawValue<'r> {
    pub fn from_pg(column: &str, value: PgValueRef<'r>) -> Result<Self> {
        if value.is_null() {
            return Ok(RawValue::Null);
        }
        match value.format() {
            PgValueFormat::Binary => value
                .as_bytes()
                .map(RawValue::Binary)
                .map_err(|e| PgExecError::scan(column, e.to_string())),
            PgValueFormat::Text => value
                .as_str()
                .map(RawValue::Text)
                .map_err(|e| PgExecError::scan(column, e.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    Bool(bool),
    /// Raw bytes of a uuid column; rendered as hex when they do not decode.
    Uuid(Vec<u8>),
    Text(String),
}

impl Cell {
    pub fn decode(descriptor: &ColumnDescriptor, raw: RawValue<'_>) -> Result<Self> {
        match raw {
            RawValue::Null => Ok(Cell::Null),
            RawValue::Binary(bytes) => Self::from_binary(descriptor, bytes),
            RawValue::Text(text) => Self::from_text(descriptor, text),
        }
    }

    fn from_binary(descriptor: &ColumnDescriptor, bytes: &[u8]) -> Result<Self> {
        match &descriptor.column_type {
            ColumnType::Bool => match bytes {
                [b] => Ok(Cell::Bool(*b != 0)),
                _ => Err(PgExecError::scan(
                    &descriptor.name,
                    format!("expected 1 byte for boolean, got {}", bytes.len()),
                )),
            },
            ColumnType::Uuid => Ok(Cell::Uuid(bytes.to_vec())),
            ColumnType::Other(type_name) => Err(PgExecError::scan(
                &descriptor.name,
                format!("no text rendering for binary value of type {}", type_name),
            )),
        }
    }

    fn from_text(descriptor: &ColumnDescriptor, text: &str) -> Result<Self> {
        match &descriptor.column_type {
            ColumnType::Bool => parse_bool(text).map(Cell::Bool).ok_or_else(|| {
                PgExecError::scan(
                    &descriptor.name,
                    format!("unrecognized boolean literal '{}'", text),
                )
            }),
            ColumnType::Uuid => Ok(match Uuid::parse_str(text) {
                Ok(uuid) => Cell::Uuid(uuid.as_bytes().to_vec()),
                Err(_) => Cell::Text(to_hex(text.as_bytes())),
            }),
            ColumnType::Other(_) => Ok(Cell::Text(text.to_string())),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str(NULL_DISPLAY),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Uuid(bytes) => match Uuid::from_slice(bytes) {
                Ok(uuid) => write!(f, "{}", uuid.hyphenated()),
                Err(_) => f.write_str(&to_hex(bytes)),
            },
            Cell::Text(s) => f.write_str(s),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("t") || text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("f") || text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
            let _ = write!(out, "{:02x}", b);
            out
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, column_type: ColumnType) -> ColumnDescriptor {
        ColumnDescriptor::new(name, column_type)
    }

    fn render(descriptor: &ColumnDescriptor, raw: RawValue<'_>) -> String {
        Cell::decode(descriptor, raw).unwrap().to_string()
    }

    #[test]
    fn test_column_type_from_type_name() {
        assert_eq!(ColumnType::from_type_name("BOOL"), ColumnType::Bool);
        assert_eq!(ColumnType::from_type_name("bool"), ColumnType::Bool);
        assert_eq!(ColumnType::from_type_name("UUID"), ColumnType::Uuid);
        assert_eq!(
            ColumnType::from_type_name("INT4"),
            ColumnType::Other("INT4".to_string())
        );
    }

    #[test]
    fn test_null_renders_as_literal_null() {
        for column_type in [
            ColumnType::Bool,
            ColumnType::Uuid,
            ColumnType::Other("TEXT".to_string()),
        ] {
            assert_eq!(render(&column("x", column_type), RawValue::Null), "null");
        }
    }

    #[test]
    fn test_bool_text_form() {
        let col = column("b", ColumnType::Bool);
        assert_eq!(render(&col, RawValue::Text("t")), "true");
        assert_eq!(render(&col, RawValue::Text("f")), "false");
        assert_eq!(render(&col, RawValue::Text("TRUE")), "true");
    }

    #[test]
    fn test_bool_binary_form() {
        let col = column("b", ColumnType::Bool);
        assert_eq!(render(&col, RawValue::Binary(&[1])), "true");
        assert_eq!(render(&col, RawValue::Binary(&[0])), "false");
    }

    #[test]
    fn test_bool_garbage_is_scan_error() {
        let col = column("b", ColumnType::Bool);

        let err = Cell::decode(&col, RawValue::Text("1")).unwrap_err();
        assert!(matches!(err, PgExecError::Scan { ref column, .. } if column == "b"));

        let err = Cell::decode(&col, RawValue::Binary(&[])).unwrap_err();
        assert!(matches!(err, PgExecError::Scan { .. }));
    }

    #[test]
    fn test_uuid_binary_form() {
        let uuid = Uuid::new_v4();
        let col = column("id", ColumnType::Uuid);

        let shown = render(&col, RawValue::Binary(uuid.as_bytes()));

        assert_eq!(shown, uuid.hyphenated().to_string());
        assert_eq!(shown, shown.to_lowercase());
        assert_eq!(shown.len(), 36);
    }

    #[test]
    fn test_uuid_text_form_is_canonicalized() {
        let col = column("id", ColumnType::Uuid);
        assert_eq!(
            render(
                &col,
                RawValue::Text("A0EEBC99-9C0B-4EF8-BB6D-6BB9BD380A11")
            ),
            "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11"
        );
    }

    #[test]
    fn test_malformed_uuid_bytes_fall_back_to_hex() {
        let col = column("id", ColumnType::Uuid);

        let shown = render(&col, RawValue::Binary(&[0xde, 0xad, 0xBE, 0xef, 0x01]));

        assert_eq!(shown, "deadbeef01");
    }

    #[test]
    fn test_malformed_uuid_text_falls_back_to_hex() {
        let col = column("id", ColumnType::Uuid);
        assert_eq!(render(&col, RawValue::Text("zz")), "7a7a");
    }

    #[test]
    fn test_other_types_use_text_form() {
        let col = column("n", ColumnType::Other("NUMERIC".to_string()));
        assert_eq!(render(&col, RawValue::Text("3.14")), "3.14");

        let col = column("s", ColumnType::Other("TEXT".to_string()));
        assert_eq!(render(&col, RawValue::Text("")), "");
    }

    #[test]
    fn test_other_types_in_binary_are_scan_errors() {
        let col = column("n", ColumnType::Other("INT4".to_string()));
        let err = Cell::decode(&col, RawValue::Binary(&[0, 0, 0, 1])).unwrap_err();
        assert!(matches!(err, PgExecError::Scan { .. }));
    }
}
