//! Decoded aggregate records

use crate::value::Value;
use serde::Serialize;
use std::collections::HashMap;

/// A nested record attachment: a single subrecord or an ordered list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Attachment {
    /// One nested record
    Single(Record),
    /// An ordered list of nested records, in source order
    List(Vec<Record>),
}

/// A fully typed, validated aggregate instance.
///
/// A record carries one slot per field of its composed schema (unset or
/// holding a validated [`Value`]) plus any nested records its extraction
/// hooks attached. The decoder never sets a field or slot the schema does
/// not declare, and never mutates a record after returning it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    schema: String,
    fields: HashMap<String, Value>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    children: HashMap<String, Attachment>,
}

impl Record {
    pub(crate) fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            fields: HashMap::new(),
            children: HashMap::new(),
        }
    }

    /// Tag name of the schema this record was decoded as.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Get a field value, `None` when the field is unset.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// All set fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Get a nested record attached under the given slot.
    pub fn child(&self, slot: &str) -> Option<&Record> {
        match self.children.get(slot) {
            Some(Attachment::Single(record)) => Some(record),
            _ => None,
        }
    }

    /// Get a nested record list attached under the given slot.
    pub fn child_list(&self, slot: &str) -> Option<&[Record]> {
        match self.children.get(slot) {
            Some(Attachment::List(records)) => Some(records),
            _ => None,
        }
    }

    /// All attached subrecords.
    pub fn children(&self) -> &HashMap<String, Attachment> {
        &self.children
    }

    pub(crate) fn set_field(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub(crate) fn attach(&mut self, slot: impl Into<String>, attachment: Attachment) {
        self.children.insert(slot.into(), attachment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_access() {
        let mut record = Record::new("LEDGERBAL");
        record.set_field("balamt", Value::Int(1));
        assert_eq!(record.schema(), "LEDGERBAL");
        assert_eq!(record.get("balamt"), Some(&Value::Int(1)));
        assert_eq!(record.get("dtasof"), None);
    }

    #[test]
    fn test_child_access_by_shape() {
        let mut record = Record::new("STMTTRN");
        record.attach("payee", Attachment::Single(Record::new("PAYEE")));
        record.attach(
            "mfassetclass",
            Attachment::List(vec![Record::new("PORTION"), Record::new("PORTION")]),
        );

        assert_eq!(record.child("payee").map(Record::schema), Some("PAYEE"));
        assert!(record.child_list("payee").is_none());
        assert_eq!(record.child_list("mfassetclass").map(<[Record]>::len), Some(2));
        assert!(record.child("mfassetclass").is_none());
    }
}
