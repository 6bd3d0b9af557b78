//! Dynamic entity record

use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::Value;
use crate::error::Error;
use crate::error::FieldError;

/// Suffix Dataverse appends to formatted-value annotations.
const FORMATTED_VALUE_SUFFIX: &str = "@OData.Community.Display.V1.FormattedValue";

/// A raw, schema-less record returned by a retrieval port.
///
/// Columns pulled in through an aliased link are keyed `alias.column`; use
/// [`Record::get_aliased`] to read them.
///
/// # Example
///
/// ```
/// use dataverse_query::model::Record;
///
/// let record = Record::new("account")
///     .set("name", "Contoso")
///     .set("pc.fullname", "Jane Doe");
///
/// assert_eq!(record.get_string("name").unwrap(), Some("Contoso"));
/// assert!(record.get_aliased("pc", "fullname").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub(crate) entity_name: String,
    pub(crate) id: Option<Uuid>,
    pub(crate) fields: HashMap<String, Value>,
    /// Formatted display values keyed by field name.
    pub(crate) formatted_values: HashMap<String, String>,
}

impl Record {
    /// Creates a new empty record for the given entity.
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            ..Self::default()
        }
    }

    /// Creates a new record with the given ID.
    pub fn with_id(entity_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            entity_name: entity_name.into(),
            id: Some(id),
            ..Self::default()
        }
    }

    /// Builds a record from a JSON object as returned by the Web API.
    ///
    /// Formatted-value annotations are split out into
    /// [`formatted_values`](Self::formatted_values), other `@` annotations
    /// are dropped, and a `<entity>id` GUID column populates the record ID.
    pub fn from_json(
        entity_name: impl Into<String>,
        object: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let mut record = Self::new(entity_name);
        let id_field = format!("{}id", record.entity_name);

        for (key, value) in object {
            if let Some(field) = key.strip_suffix(FORMATTED_VALUE_SUFFIX) {
                if let serde_json::Value::String(text) = value {
                    record.formatted_values.insert(field.to_string(), text);
                }
                continue;
            }
            if key.contains('@') {
                continue;
            }
            if key == id_field {
                if let Some(id) = value.as_str().and_then(|s| Uuid::parse_str(s).ok()) {
                    record.id = Some(id);
                    record.fields.insert(key, Value::Guid(id));
                    continue;
                }
            }
            record.fields.insert(key, Value::from_json(value));
        }

        record
    }

    // =========================================================================
    // Metadata accessors
    // =========================================================================

    /// Returns the entity logical name.
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Returns the record ID, if set.
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns a column brought in by an aliased link.
    pub fn get_aliased(&self, alias: &str, column: &str) -> Option<&Value> {
        self.fields.get(&format!("{}.{}", alias, column))
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Returns the formatted value for a field, if available.
    pub fn get_formatted(&self, field: &str) -> Option<&str> {
        self.formatted_values.get(field).map(|s| s.as_str())
    }

    pub fn formatted_values(&self) -> &HashMap<String, String> {
        &self.formatted_values
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Sets a formatted value.
    pub fn set_formatted(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.formatted_values.insert(field.into(), value.into());
    }

    // =========================================================================
    // Typed getters
    //
    // Err if the field is missing or has the wrong type.
    // Ok(None) only if the field exists and is Value::Null.
    // =========================================================================

    fn typed<'a, T>(
        &'a self,
        field: &str,
        expected: &'static str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(value) => extract(value)
                .map(Some)
                .ok_or_else(|| FieldError::type_mismatch(field, expected, value.type_name())),
        }
    }

    /// Gets a string field value.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>, FieldError> {
        self.typed(field, "string", |v| match v {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        self.typed(field, "bool", |v| match v {
            Value::Bool(b) => Some(*b),
            _ => None,
        })
    }

    /// Gets an i32 field value.
    pub fn get_int(&self, field: &str) -> Result<Option<i32>, FieldError> {
        self.typed(field, "int", |v| match v {
            Value::Int(n) => Some(*n),
            _ => None,
        })
    }

    /// Gets an i64 field value. Int values are widened.
    pub fn get_long(&self, field: &str) -> Result<Option<i64>, FieldError> {
        self.typed(field, "long", |v| match v {
            Value::Long(n) => Some(*n),
            Value::Int(n) => Some(i64::from(*n)),
            _ => None,
        })
    }

    /// Gets an f64 field value.
    pub fn get_float(&self, field: &str) -> Result<Option<f64>, FieldError> {
        self.typed(field, "float", |v| match v {
            Value::Float(n) => Some(*n),
            _ => None,
        })
    }

    /// Gets a Decimal field value.
    pub fn get_decimal(&self, field: &str) -> Result<Option<Decimal>, FieldError> {
        self.typed(field, "decimal", |v| match v {
            Value::Decimal(d) => Some(*d),
            _ => None,
        })
    }

    /// Gets a UUID field value.
    pub fn get_guid(&self, field: &str) -> Result<Option<Uuid>, FieldError> {
        self.typed(field, "guid", |v| match v {
            Value::Guid(g) => Some(*g),
            _ => None,
        })
    }

    /// Gets a DateTime field value.
    pub fn get_datetime(&self, field: &str) -> Result<Option<DateTime<Utc>>, FieldError> {
        self.typed(field, "datetime", |v| match v {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        })
    }

    // =========================================================================
    // Typed mapping
    // =========================================================================

    /// Returns the fields as a JSON object.
    pub fn to_json(&self) -> Result<serde_json::Value, Error> {
        let mut object = serde_json::Map::with_capacity(self.fields.len());
        for (key, value) in &self.fields {
            object.insert(key.clone(), serde_json::to_value(value)?);
        }
        Ok(serde_json::Value::Object(object))
    }

    /// Deserializes the record's fields into `T`.
    ///
    /// Decimal values serialize as strings, so target fields for them should
    /// be `rust_decimal::Decimal` rather than floats.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_value(self.to_json()?)?)
    }
}
