//! SPARQL 1.1 JSON results document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Cell type that renders as a hyperlink.
pub const URI_TYPE: &str = "uri";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub head: Head,
    pub results: Results,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub link: Vec<Value>,
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results {
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub ordered: bool,
    pub bindings: Vec<Row>,
}

/// A single typed value within a binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Cell {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".to_string(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: URI_TYPE.to_string(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn is_uri(&self) -> bool {
        self.kind == URI_TYPE
    }
}

/// One binding. Columns absent from the map read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Cell>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, cell: Cell) -> Self {
        self.0.insert(column.into(), cell);
        self
    }

    pub fn cell(&self, column: &str) -> Option<&Cell> {
        self.0.get(column)
    }

    pub fn value(&self, column: &str) -> &str {
        self.0.get(column).map_or("", |cell| cell.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ResultDocument {
    pub fn new(vars: Vec<String>, bindings: Vec<Row>) -> Self {
        Self {
            head: Head {
                link: Vec::new(),
                vars,
            },
            results: Results {
                distinct: false,
                ordered: false,
                bindings,
            },
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.head.vars
    }

    pub fn rows(&self) -> &[Row] {
        &self.results.bindings
    }

    pub fn row_count(&self) -> usize {
        self.results.bindings.len()
    }
}
