//! Data source registry for external data resolution
//!
//! Provides a registry for data sources that can be queried during law execution.
//! Data sources are queried in priority order (highest first) when resolving
//! values that aren't found in the law context.
//!
//! # Example
//!
//! ```ignore
//! use regelrecht_engine::{DataSourceRegistry, DictDataSource, Value};
//! use std::collections::HashMap;
//!
//! // Create a registry and add a data source
//! let mut registry = DataSourceRegistry::new();
//! let mut data = HashMap::new();
//! data.insert("person_123".to_string(), {
//!     let mut record = HashMap::new();
//!     record.insert("income".to_string(), Value::Int(50000));
//!     record.insert("age".to_string(), Value::Int(35));
//!     record
//! });
//!
//! let source = DictDataSource::new("persons", 10, data);
//! registry.add_source(Box::new(source));
//!
//! // Query the registry
//! let mut criteria = HashMap::new();
//! criteria.insert("BSN".to_string(), Value::String("123".to_string()));
//!
//! if let Some(match_result) = registry.resolve("income", &criteria) {
//!     println!("Found income: {} from {}", match_result.value, match_result.source_name);
//! }
//! ```

use crate::types::Value;
use std::collections::{HashMap, HashSet};

/// Result of a successful data source query.
#[derive(Debug, Clone)]
pub struct DataSourceMatch {
    /// The resolved value
    pub value: Value,
    /// Name of the data source that provided the value
    pub source_name: String,
    /// Type of the data source (e.g., "dict", "database")
    pub source_type: String,
}

/// Trait for data source implementations.
///
/// Data sources provide external data that can be queried during law execution.
/// Each source has a priority (higher = checked first) and can provide values
/// for specific fields.
pub trait DataSource: Send + Sync {
    /// Get the name of this data source.
    fn name(&self) -> &str;

    /// Get the priority of this data source (higher = checked first).
    fn priority(&self) -> i32;

    /// Get the type identifier for this data source (e.g., "dict", "database").
    fn source_type(&self) -> &str;

    /// Check if this data source can provide a value for the given field.
    ///
    /// This is a quick check that doesn't require the full lookup criteria.
    fn has_field(&self, field: &str) -> bool;

    /// Get a value from this data source.
    ///
    /// # Arguments
    /// * `field` - The field name to retrieve
    /// * `criteria` - Criteria for selecting the record (e.g., BSN, year)
    ///
    /// # Returns
    /// The value if found, or None if no matching record exists.
    fn get(&self, field: &str, criteria: &HashMap<String, Value>) -> Option<Value>;

    /// Get all available fields in this data source.
    fn fields(&self) -> Vec<&str>;
}

/// Dictionary-based data source with key-based lookup.
///
/// Stores data as nested HashMaps: record_key -> field_name -> value.
/// Records are looked up by building a key from the lookup criteria.
///
/// # Key Building
///
/// The record key is built from sorted criteria values joined by underscore:
/// - `{BSN: "123", year: 2025}` -> key "123_2025"
/// - `{gemeente_code: "0363"}` -> key "0363"
///
/// # Case Sensitivity
///
/// Field names are matched case-insensitively to handle variations
/// in how fields are referenced in laws.
#[derive(Debug, Clone)]
pub struct DictDataSource {
    name: String,
    priority: i32,
    /// Data: record_key -> field_name (lowercase) -> value
    data: HashMap<String, HashMap<String, Value>>,
    /// Index of all available field names (lowercase)
    field_index: HashSet<String>,
    /// When set, `get()` filters criteria to only these fields before building the
    /// lookup key. This is needed for `from_records()`, which stores records by a
    /// single key field, while `get()` would otherwise build a key from ALL criteria.
    key_fields: Option<Vec<String>>,
}

impl DictDataSource {
    /// Create a new dictionary data source.
    ///
    /// # Arguments
    /// * `name` - Name identifier for this data source
    /// * `priority` - Priority for resolution order (higher = checked first)
    /// * `data` - Data as record_key -> field_name -> value
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        data: HashMap<String, HashMap<String, Value>>,
    ) -> Self {
        // Build field index with lowercase field names
        let field_index = data
            .values()
            .flat_map(|record| record.keys())
            .map(|k| k.to_lowercase())
            .collect();

        // Normalize data keys to lowercase
        let normalized_data = data
            .into_iter()
            .map(|(key, fields)| {
                let normalized_fields = fields
                    .into_iter()
                    .map(|(k, v)| (k.to_lowercase(), v))
                    .collect();
                (key, normalized_fields)
            })
            .collect();

        Self {
            name: name.into(),
            priority,
            data: normalized_data,
            field_index,
            key_fields: None,
        }
    }

    /// Create a dictionary data source from a flat list of records.
    ///
    /// # Arguments
    /// * `name` - Name identifier for this data source
    /// * `priority` - Priority for resolution order
    /// * `key_field` - Field name to use as the record key (case-insensitive)
    /// * `records` - List of records as field -> value maps
    ///
    /// # Returns
    /// The data source, or None if key_field is not found in any record.
    pub fn from_records(
        name: impl Into<String>,
        priority: i32,
        key_field: &str,
        records: Vec<HashMap<String, Value>>,
    ) -> Option<Self> {
        let key_field_lower = key_field.to_lowercase();
        let mut data = HashMap::new();

        for record in records {
            // Find the key field (case-insensitive)
            let key_value = record
                .iter()
                .find(|(k, _)| k.to_lowercase() == key_field_lower)
                .map(|(_, v)| v.clone());

            if let Some(key_val) = key_value {
                let key = value_to_key(&key_val);
                data.insert(key, record);
            }
        }

        let mut source = Self::new(name, priority, data);
        source.key_fields = Some(vec![key_field_lower]);
        Some(source)
    }

    /// Store a record in the data source.
    ///
    /// # Arguments
    /// * `key` - The record key
    /// * `fields` - Field values for this record
    pub fn store(&mut self, key: impl Into<String>, fields: HashMap<String, Value>) {
        let key = key.into();

        // Update field index
        for field_name in fields.keys() {
            self.field_index.insert(field_name.to_lowercase());
        }

        // Normalize field names to lowercase
        let normalized_fields = fields
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();

        self.data.insert(key, normalized_fields);
    }

    /// Get the number of records in this data source.
    pub fn record_count(&self) -> usize {
        self.data.len()
    }
}

impl DataSource for DictDataSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn source_type(&self) -> &str {
        "dict"
    }

    fn has_field(&self, field: &str) -> bool {
        self.field_index.contains(&field.to_lowercase())
    }

    fn get(&self, field: &str, criteria: &HashMap<String, Value>) -> Option<Value> {
        // When key_fields is set (e.g. from_records), filter criteria to only
        // the key fields before building the lookup key. Otherwise a caller
        // passing extra criteria would produce a key that doesn't match any record.
        let key = match &self.key_fields {
            Some(fields) => {
                let filtered: HashMap<String, Value> = criteria
                    .iter()
                    .filter(|(k, _)| fields.contains(&k.to_lowercase()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                build_lookup_key(&filtered)
            }
            None => build_lookup_key(criteria),
        };

        // Look up record
        let record = self.data.get(&key)?;

        // Get field value (case-insensitive)
        record.get(&field.to_lowercase()).cloned()
    }

    fn fields(&self) -> Vec<&str> {
        self.field_index.iter().map(|s| s.as_str()).collect()
    }
}

/// Registry for data sources with priority-based resolution.
///
/// When resolving a value, data sources are queried in priority order
/// (highest priority first). The first source that provides a value wins.
#[derive(Default)]
pub struct DataSourceRegistry {
    /// Data sources, sorted by priority (highest first)
    sources: Vec<Box<dyn DataSource>>,
}

impl DataSourceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Add a data source to the registry.
    ///
    /// Sources are automatically sorted by priority (highest first).
    pub fn add_source(&mut self, source: Box<dyn DataSource>) {
        self.sources.push(source);
        // Sort by priority descending
        self.sources
            .sort_by_key(|b| std::cmp::Reverse(b.priority()));
    }

    /// Remove a data source by name.
    ///
    /// # Returns
    /// `true` if a source was removed, `false` if not found.
    pub fn remove_source(&mut self, name: &str) -> bool {
        let before = self.sources.len();
        self.sources.retain(|s| s.name() != name);
        self.sources.len() < before
    }

    /// Clear all data sources.
    pub fn clear(&mut self) {
        self.sources.clear();
    }

    /// Check if any data source can provide a value for the given field.
    pub fn has_field(&self, field: &str) -> bool {
        self.sources.iter().any(|s| s.has_field(field))
    }

    /// Resolve a value from the data sources.
    ///
    /// Sources are queried in priority order. The first source that
    /// provides a value for the field wins.
    ///
    /// # Arguments
    /// * `field` - The field name to resolve
    /// * `criteria` - Criteria for record lookup
    ///
    /// # Returns
    /// A `DataSourceMatch` if the value was found, None otherwise.
    pub fn resolve(
        &self,
        field: &str,
        criteria: &HashMap<String, Value>,
    ) -> Option<DataSourceMatch> {
        for source in &self.sources {
            if !source.has_field(field) {
                continue;
            }

            if let Some(value) = source.get(field, criteria) {
                return Some(DataSourceMatch {
                    value,
                    source_name: source.name().to_string(),
                    source_type: source.source_type().to_string(),
                });
            }
        }
        None
    }

    /// Get the number of registered data sources.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// List all registered source names.
    pub fn list_sources(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Get all available fields across all sources.
    pub fn all_fields(&self) -> HashSet<String> {
        self.sources
            .iter()
            .flat_map(|s| s.fields())
            .map(|f| f.to_string())
            .collect()
    }
}

// Allow Debug for DataSourceRegistry even though Box<dyn DataSource> doesn't implement Debug
impl std::fmt::Debug for DataSourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSourceRegistry")
            .field("source_count", &self.sources.len())
            .field(
                "sources",
                &self
                    .sources
                    .iter()
                    .map(|s| format!("{}(priority={})", s.name(), s.priority()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Build a lookup key from criteria values.
///
/// Sorts criteria by key name and joins values with underscore.
fn build_lookup_key(criteria: &HashMap<String, Value>) -> String {
    let mut pairs: Vec<_> = criteria.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    pairs
        .iter()
        .map(|(_, v)| value_to_key(v))
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert a Value to a string key.
fn value_to_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => "complex".to_string(),
    }
}
