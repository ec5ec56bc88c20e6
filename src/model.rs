//! Column and row model shared by every other component.
//!
//! The JSON shape matches what the data generator produces:
//! `{ "columns": [{ "id", "ordinalNo", "title", "type", "options"?, "width"? }],
//!    "data": [{ "id": "...", "<column id>": <value>, ... }] }`

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Value type of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Number,
    Boolean,
    Select { options: Vec<String> },
    /// A `type` tag this program does not know. Edited and shown like
    /// `String`; the tag is kept so saving writes it back unchanged.
    Other(String),
}

impl ColumnKind {
    fn from_tag(tag: String, options: Option<Vec<String>>) -> Self {
        match tag.as_str() {
            "string" => ColumnKind::String,
            "number" => ColumnKind::Number,
            "boolean" => ColumnKind::Boolean,
            // a missing list is caught by `Dataset::validate`
            "select" => ColumnKind::Select {
                options: options.unwrap_or_default(),
            },
            _ => ColumnKind::Other(tag),
        }
    }

    fn tag(&self) -> &str {
        match self {
            ColumnKind::String => "string",
            ColumnKind::Number => "number",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Select { .. } => "select",
            ColumnKind::Other(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ColumnJson", into = "ColumnJson")]
pub struct Column {
    pub id: String,
    /// Display order; not necessarily contiguous.
    pub ordinal_no: i64,
    pub title: String,
    pub kind: ColumnKind,
    /// Preferred display width in cells.
    pub width: Option<u16>,
}

/// On-disk shape of a column: a flat object with a free-form `type` tag.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnJson {
    id: String,
    ordinal_no: i64,
    title: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<u16>,
}

impl From<ColumnJson> for Column {
    fn from(raw: ColumnJson) -> Self {
        Self {
            id: raw.id,
            ordinal_no: raw.ordinal_no,
            title: raw.title,
            kind: ColumnKind::from_tag(raw.kind, raw.options),
            width: raw.width,
        }
    }
}

impl From<Column> for ColumnJson {
    fn from(col: Column) -> Self {
        let kind = col.kind.tag().to_string();
        let options = match col.kind {
            ColumnKind::Select { options } => Some(options),
            _ => None,
        };
        Self {
            id: col.id,
            ordinal_no: col.ordinal_no,
            title: col.title,
            kind,
            options,
            width: col.width,
        }
    }
}

impl Column {
    pub fn new(
        id: impl Into<String>,
        ordinal_no: i64,
        title: impl Into<String>,
        kind: ColumnKind,
    ) -> Self {
        Self {
            id: id.into(),
            ordinal_no,
            title: title.into(),
            kind,
            width: None,
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Enumerated options of a select column; empty for every other kind.
    pub fn options(&self) -> &[String] {
        match &self.kind {
            ColumnKind::Select { options } => options,
            _ => &[],
        }
    }
}

/// A single cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
    #[default]
    Null,
}

impl Value {
    /// Only null and the empty string count as missing; `0` and `false` do not.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            // f64's Display already drops a trailing ".0"
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Null => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// One record, keyed by a unique id distinct from every column id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column_id.into(), value.into());
        self
    }

    pub fn get(&self, column_id: &str) -> Option<&Value> {
        self.values.get(column_id)
    }
}

/// Columns plus rows, handed to the table once at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub data: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>, data: Vec<Row>) -> Self {
        Self { columns, data }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse and validate a JSON dataset.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let dataset: Dataset = serde_json::from_reader(reader)?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), DatasetError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        let mut column_ids = HashSet::with_capacity(self.columns.len());
        for col in &self.columns {
            if !column_ids.insert(col.id.as_str()) {
                return Err(DatasetError::DuplicateColumn { id: col.id.clone() });
            }
            if matches!(&col.kind, ColumnKind::Select { options } if options.is_empty()) {
                return Err(DatasetError::MissingOptions {
                    column: col.id.clone(),
                });
            }
        }

        let mut row_ids = HashSet::with_capacity(self.data.len());
        for row in &self.data {
            if column_ids.contains(row.id.as_str()) {
                return Err(DatasetError::RowIdCollision {
                    row_id: row.id.clone(),
                });
            }
            if !row_ids.insert(row.id.as_str()) {
                return Err(DatasetError::DuplicateRow { id: row.id.clone() });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "columns": [
            { "id": "name", "ordinalNo": 1, "title": "Name", "type": "string", "width": 200 },
            { "id": "age", "ordinalNo": 2, "title": "Age", "type": "number" },
            { "id": "department", "ordinalNo": 4, "title": "Department", "type": "select",
              "options": ["Engineering", "Sales"] },
            { "id": "Manager", "ordinalNo": 5, "title": "Manager", "type": "boolean" },
            { "id": "notes", "ordinalNo": 6, "title": "Notes", "type": "markdown" }
        ],
        "data": [
            { "id": "r1", "name": "Ada", "age": 36, "department": "Sales", "Manager": true, "notes": null }
        ]
    }"#;

    #[test]
    fn parses_dataset_json() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.columns.len(), 5);
        assert_eq!(ds.columns[0].width, Some(200));
        assert_eq!(ds.columns[1].kind, ColumnKind::Number);
        assert_eq!(ds.columns[2].options(), ["Engineering", "Sales"]);
        assert_eq!(ds.columns[3].kind, ColumnKind::Boolean);

        let row = &ds.data[0];
        assert_eq!(row.get("name"), Some(&Value::Text("Ada".into())));
        assert_eq!(row.get("age"), Some(&Value::Number(36.0)));
        assert_eq!(row.get("Manager"), Some(&Value::Bool(true)));
        assert_eq!(row.get("notes"), Some(&Value::Null));
    }

    #[test]
    fn unknown_column_type_is_kept() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            ds.column("notes").unwrap().kind,
            ColumnKind::Other("markdown".into())
        );
        assert!(ds.column("notes").unwrap().options().is_empty());
    }

    #[test]
    fn every_column_kind_survives_a_save() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        let mut out = Vec::new();
        ds.to_writer(&mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let tags: Vec<&str> = json["columns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["type"].as_str().unwrap())
            .collect();
        assert_eq!(tags, ["string", "number", "select", "boolean", "markdown"]);
        assert_eq!(json["columns"][0]["ordinalNo"], 1);
        assert!(json["columns"][1].get("options").is_none());

        let reloaded = Dataset::from_reader(out.as_slice()).unwrap();
        assert_eq!(reloaded, ds);
    }

    #[test]
    fn select_without_options_list_is_rejected_on_load() {
        let json = r#"{ "columns": [{ "id": "s", "ordinalNo": 1, "title": "S", "type": "select" }],
                        "data": [] }"#;
        assert!(matches!(
            Dataset::from_reader(json.as_bytes()),
            Err(DatasetError::MissingOptions { column }) if column == "s"
        ));
    }

    #[test]
    fn rejects_select_without_options() {
        let ds = Dataset::new(
            vec![Column::new(
                "status",
                1,
                "Status",
                ColumnKind::Select { options: vec![] },
            )],
            vec![],
        );
        assert!(matches!(
            ds.validate(),
            Err(DatasetError::MissingOptions { column }) if column == "status"
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let col = Column::new("name", 1, "Name", ColumnKind::String);
        let ds = Dataset::new(vec![col.clone(), col], vec![]);
        assert!(matches!(ds.validate(), Err(DatasetError::DuplicateColumn { .. })));

        let ds = Dataset::new(
            vec![Column::new("name", 1, "Name", ColumnKind::String)],
            vec![Row::new("a"), Row::new("a")],
        );
        assert!(matches!(ds.validate(), Err(DatasetError::DuplicateRow { .. })));

        let ds = Dataset::new(
            vec![Column::new("name", 1, "Name", ColumnKind::String)],
            vec![Row::new("name")],
        );
        assert!(matches!(ds.validate(), Err(DatasetError::RowIdCollision { .. })));
    }

    #[test]
    fn zero_and_false_are_not_missing() {
        assert!(!Value::Number(0.0).is_missing());
        assert!(!Value::Bool(false).is_missing());
        assert!(Value::Text(String::new()).is_missing());
        assert!(Value::Null.is_missing());
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Null.to_string(), "");
    }
}
