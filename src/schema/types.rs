//! Entity and field metadata

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Key field assumed when a backend does not report one
pub const DEFAULT_KEY_FIELD: &str = "Id";

fn default_key_field() -> String {
    DEFAULT_KEY_FIELD.to_string()
}

fn default_data_type() -> String {
    "string".to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One field of an entity, as reported by the backend's describe endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// API name
    pub name: String,

    /// Display label
    #[serde(default)]
    pub label: String,

    /// Vendor type name (`string`, `Edm.String` → `String`, `reference`, ...)
    #[serde(rename = "type", default = "default_data_type")]
    pub data_type: String,

    /// Must be supplied on create
    #[serde(default)]
    pub required: bool,

    /// Cannot be written
    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,

    /// Target entity of a lookup field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_to: Option<String>,

    /// Allowed values of a picklist field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub picklist_values: Vec<String>,

    /// Help text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl FieldInfo {
    /// Field whose label is its name
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            data_type: data_type.into(),
            required: false,
            read_only: false,
            reference_to: None,
            picklist_values: Vec::new(),
            description: String::new(),
        }
    }

    /// Set the label; an empty label keeps the name
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if !label.is_empty() {
            self.label = label;
        }
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    #[must_use]
    pub fn reference_to(mut self, entity: Option<String>) -> Self {
        self.reference_to = entity;
        self
    }

    #[must_use]
    pub fn picklist_values(mut self, values: Vec<String>) -> Self {
        self.picklist_values = values;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Case-insensitive substring match on name or label.
    /// `needle` must already be lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.label.to_lowercase().contains(needle)
    }
}

/// Field-level description of one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Entity name as requested
    pub name: String,

    /// Display label
    #[serde(default)]
    pub label: String,

    /// Primary key field
    #[serde(default = "default_key_field")]
    pub key_field: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Fields in backend order
    #[serde(default)]
    pub fields: Vec<FieldInfo>,

    /// Epoch seconds at which the schema entered the cache; 0 when uncached
    #[serde(skip)]
    pub fetched_at: i64,
}

impl EntitySchema {
    /// Schema with no fields, labelled with its own name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            key_field: default_key_field(),
            description: String::new(),
            fields: Vec::new(),
            fetched_at: 0,
        }
    }

    /// Parse the `data` of a describe result
    pub fn from_value(value: JsonValue) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::decode(format!("Invalid entity schema: {e}")))
    }

    /// Look up a field by exact name
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields whose name or label contains `keyword`, ignoring case
    pub fn search(&self, keyword: &str) -> Vec<&FieldInfo> {
        let needle = keyword.to_lowercase();
        self.fields.iter().filter(|f| f.matches(&needle)).collect()
    }

    /// Wire form: the serialized schema plus `field_count`
    pub fn to_value(&self) -> JsonValue {
        json!({
            "name": self.name,
            "label": self.label,
            "key_field": self.key_field,
            "description": self.description,
            "field_count": self.fields.len(),
            "fields": self.fields,
        })
    }
}
