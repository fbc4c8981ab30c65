//! `optional` and `nullable` wrappers.
//!
//! Both read a missing or `null` primitive as `None` and delegate everything
//! else. They differ only inside records: an absent optional field is left out
//! of the typed record and the written map, an absent nullable field is kept
//! as an explicit null.

use serde_json::Value;

use crate::data::Data;
use crate::error::PortalResult;
use crate::portal::Portal;

#[derive(Debug, Clone)]
pub struct Optional<P> {
    inner: P,
}

#[derive(Debug, Clone)]
pub struct Nullable<P> {
    inner: P,
}

pub fn optional<P: Portal>(inner: P) -> Optional<P> {
    Optional { inner }
}

pub fn nullable<P: Portal>(inner: P) -> Nullable<P> {
    Nullable { inner }
}

fn read_present<P: Portal>(inner: &P, input: &Value) -> PortalResult<Option<P::Value>> {
    match input {
        Value::Null => Ok(None),
        present => inner.read(present).map(Some),
    }
}

fn write_present<P: Portal>(inner: &P, value: &Option<P::Value>) -> PortalResult<Value> {
    match value {
        Some(present) => inner.write(present),
        None => Ok(Value::Null),
    }
}

fn write_present_dynamic<P: Portal>(inner: &P, data: &Data) -> PortalResult<Value> {
    match data {
        Data::Null => Ok(Value::Null),
        present => inner.write_dynamic(present),
    }
}

impl<P: Portal> Portal for Optional<P> {
    type Value = Option<P::Value>;

    fn read(&self, input: &Value) -> PortalResult<Self::Value> {
        read_present(&self.inner, input)
    }

    fn write(&self, value: &Self::Value) -> PortalResult<Value> {
        write_present(&self.inner, value)
    }

    fn description(&self) -> String {
        format!("optional({})", self.inner.description())
    }

    fn read_slot(&self, input: Option<&Value>) -> PortalResult<Option<Self::Value>> {
        match input {
            None | Some(Value::Null) => Ok(None),
            Some(present) => self.inner.read(present).map(|v| Some(Some(v))),
        }
    }

    fn write_dynamic(&self, data: &Data) -> PortalResult<Value> {
        write_present_dynamic(&self.inner, data)
    }

    fn write_dynamic_slot(&self, data: Option<&Data>) -> PortalResult<Option<Value>> {
        match data {
            None | Some(Data::Null) => Ok(None),
            Some(present) => self.inner.write_dynamic(present).map(Some),
        }
    }
}

impl<P: Portal> Portal for Nullable<P> {
    type Value = Option<P::Value>;

    fn read(&self, input: &Value) -> PortalResult<Self::Value> {
        read_present(&self.inner, input)
    }

    fn write(&self, value: &Self::Value) -> PortalResult<Value> {
        write_present(&self.inner, value)
    }

    fn description(&self) -> String {
        format!("nullable({})", self.inner.description())
    }

    fn read_slot(&self, input: Option<&Value>) -> PortalResult<Option<Self::Value>> {
        self.read(input.unwrap_or(&Value::Null)).map(Some)
    }

    fn write_dynamic(&self, data: &Data) -> PortalResult<Value> {
        write_present_dynamic(&self.inner, data)
    }

    fn write_dynamic_slot(&self, data: Option<&Data>) -> PortalResult<Option<Value>> {
        match data {
            None => Ok(Some(Value::Null)),
            Some(present) => self.write_dynamic(present).map(Some),
        }
    }
}
