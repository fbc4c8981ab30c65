//! String-keyed records: `obj`, `partial_obj` and `combine`.

use serde_json::{Map, Value};

use crate::data::{Data, Record};
use crate::error::{PortalError, PortalResult};
use crate::portal::{AnyPortal, Portal};

/// A named child portal of a record.
pub struct Field {
    name: String,
    portal: AnyPortal,
}

pub fn field<P: Portal + 'static>(name: impl Into<String>, portal: P) -> Field {
    Field {
        name: name.into(),
        portal: portal.erased(),
    }
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Record with a fixed, ordered set of fields.
pub struct Object {
    fields: Vec<Field>,
    partial: bool,
}

/// Every declared field is handed its slot; a missing key fails unless the
/// field portal itself tolerates absence.
pub fn obj(fields: Vec<Field>) -> Object {
    Object {
        fields,
        partial: false,
    }
}

/// Every field behaves as if wrapped in `optional`.
pub fn partial_obj(fields: Vec<Field>) -> Object {
    Object {
        fields,
        partial: true,
    }
}

impl Object {
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(Field::name)
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// Reads `input`, taking any field whose key is missing from `defaults`
    /// instead. Keys present in `input` are validated as usual.
    pub fn read_with_defaults(&self, defaults: &Record, input: &Value) -> PortalResult<Record> {
        let map = self.expect_map(input)?;
        let mut out = Record::new();
        for field in &self.fields {
            match (map.get(&field.name), defaults.get(&field.name)) {
                (None, Some(fallback)) => {
                    out.insert(field.name.clone(), fallback.clone());
                }
                (slot, _) => {
                    if let Some(data) = self.read_field(field, slot, input)? {
                        out.insert(field.name.clone(), data);
                    }
                }
            }
        }
        Ok(out)
    }

    fn expect_map<'a>(&self, input: &'a Value) -> PortalResult<&'a Map<String, Value>> {
        input
            .as_object()
            .ok_or_else(|| PortalError::new(input.clone(), self.description()))
    }

    fn read_field(
        &self,
        field: &Field,
        slot: Option<&Value>,
        input: &Value,
    ) -> PortalResult<Option<Data>> {
        if self.partial && matches!(slot, None | Some(Value::Null)) {
            return Ok(None);
        }
        field
            .portal
            .read_data(slot)
            .map_err(|e| e.in_field(field.name.clone(), input.clone()))
    }

    fn write_field(&self, field: &Field, value: &Record) -> PortalResult<Option<Value>> {
        let slot = value.get(&field.name);
        if self.partial && matches!(slot, None | Some(Data::Null)) {
            return Ok(None);
        }
        field
            .portal
            .write_data(slot)
            .map_err(|e| e.in_field(field.name.clone(), value.to_json()))
    }
}

impl Portal for Object {
    type Value = Record;

    fn read(&self, input: &Value) -> PortalResult<Record> {
        let map = self.expect_map(input)?;
        let mut out = Record::new();
        for field in &self.fields {
            if let Some(data) = self.read_field(field, map.get(&field.name), input)? {
                out.insert(field.name.clone(), data);
            }
        }
        Ok(out)
    }

    fn write(&self, value: &Record) -> PortalResult<Value> {
        let mut map = Map::new();
        for field in &self.fields {
            if let Some(written) = self.write_field(field, value)? {
                map.insert(field.name.clone(), written);
            }
        }
        Ok(Value::Object(map))
    }

    fn description(&self) -> String {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("{}: {}", f.name, f.portal.describe()))
            .collect();
        let kind = if self.partial { "partial_obj" } else { "obj" };
        format!("{kind}({{{}}})", fields.join(", "))
    }
}

/// Merge of record portals that all read the same input map.
pub struct Combine {
    parts: Vec<Box<dyn Portal<Value = Record>>>,
}

/// Later parts win when two parts produce the same key.
pub fn combine(parts: Vec<Box<dyn Portal<Value = Record>>>) -> Combine {
    Combine { parts }
}

impl Portal for Combine {
    type Value = Record;

    fn read(&self, input: &Value) -> PortalResult<Record> {
        let mut out = Record::new();
        for part in &self.parts {
            let read = part.read(input).map_err(|e| e.with_input(input.clone()))?;
            out.merge(read);
        }
        Ok(out)
    }

    fn write(&self, value: &Record) -> PortalResult<Value> {
        let mut map = Map::new();
        for part in &self.parts {
            match part.write(value) {
                Ok(Value::Object(written)) => map.extend(written),
                Ok(other) => {
                    let err = PortalError::new(other, part.description());
                    return Err(err.with_input(value.to_json()));
                }
                Err(e) => return Err(e.with_input(value.to_json())),
            }
        }
        Ok(Value::Object(map))
    }

    fn description(&self) -> String {
        let parts: Vec<String> = self.parts.iter().map(|p| p.description()).collect();
        format!("combine({})", parts.join(", "))
    }
}
