use std::fmt;
use std::path::PathBuf;

use amock_schema::TableDefinition;
use amock_types::{as_sequence, Collection};
use serde::Serialize;

/// How a table reached the ready state at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableOrigin {
    /// Collection and schema were already stored and were loaded as-is.
    Rehydrated,
    /// Records were generated from the raw schema and written out.
    Synthesized,
}

impl fmt::Display for TableOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableOrigin::Rehydrated => f.write_str("rehydrated"),
            TableOrigin::Synthesized => f.write_str("synthesized"),
        }
    }
}

/// In-memory state of one table. Guarded by a per-table mutex in [`crate::Database`].
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub definition_source: Option<PathBuf>,
    pub definition: TableDefinition,
    pub last_auto_id: u64,
    pub origin: TableOrigin,
}

impl Table {
    pub fn new(name: impl Into<String>, definition_source: Option<PathBuf>, definition: TableDefinition, origin: TableOrigin) -> Self {
        Self {
            name: name.into(),
            definition_source,
            definition,
            last_auto_id: 1,
            origin,
        }
    }

    pub fn key_field(&self) -> &str {
        self.definition.key_field()
    }

    /// Move the counter past every sequence id present in `collection`. Never lowers it.
    pub fn observe(&mut self, collection: &Collection) {
        let fields: Vec<&str> = self.definition.sequence_fields().collect();
        let highest = collection
            .iter()
            .flat_map(|record| fields.iter().filter_map(|f| record.get(*f)))
            .filter_map(as_sequence)
            .max();
        if let Some(n) = highest {
            self.last_auto_id = self.last_auto_id.max(n.saturating_add(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amock_schema::RawSchema;
    use serde_json::json;

    fn table() -> Table {
        let raw: RawSchema = serde_json::from_value(json!({"id": "id", "ref": "id.uuid", "n": "number"})).unwrap();
        Table::new("t", None, TableDefinition::from_raw(&raw).unwrap(), TableOrigin::Rehydrated)
    }

    #[test]
    fn observe_skips_non_sequence_values() {
        let mut t = table();
        let rows: Collection = vec![
            json!({"id": 4, "ref": "x", "n": 900}),
            json!({"id": "17", "n": 1}),
            json!({"id": 2.5}),
            json!({"id": 9}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();
        t.observe(&rows);
        assert_eq!(t.last_auto_id, 10);
    }

    #[test]
    fn observe_never_lowers() {
        let mut t = table();
        t.last_auto_id = 50;
        t.observe(&vec![json!({"id": 3}).as_object().cloned().unwrap()]);
        assert_eq!(t.last_auto_id, 50);
        t.observe(&Vec::new());
        assert_eq!(t.last_auto_id, 50);
    }
}
