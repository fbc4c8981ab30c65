use serde_json::Value;

use crate::data::{Data, ToData, Typed};
use crate::error::{PortalError, PortalResult};

/// Paired reader and writer for one logical type.
///
/// `read` converts a primitive tree into the typed value, `write` converts it
/// back. Both directions fail with [`PortalError`]. `description` renders the
/// portal's shape only and is stable across calls.
pub trait Portal: Send + Sync {
    type Value: Typed;

    fn read(&self, input: &Value) -> PortalResult<Self::Value>;

    fn write(&self, value: &Self::Value) -> PortalResult<Value>;

    fn description(&self) -> String;

    /// Reads a record or tuple slot that may be missing altogether.
    ///
    /// `Ok(None)` means the slot stays absent in the typed value. Required
    /// portals see a missing slot as `null` and reject it themselves.
    fn read_slot(&self, input: Option<&Value>) -> PortalResult<Option<Self::Value>> {
        self.read(input.unwrap_or(&Value::Null)).map(Some)
    }

    /// Writes a value held as [`Data`] by a heterogeneous container.
    ///
    /// Containers override this so a mismatch deep inside the value is
    /// reported at its own position instead of at the container.
    fn write_dynamic(&self, data: &Data) -> PortalResult<Value> {
        match Self::Value::from_data(data) {
            Some(typed) => self.write(&typed),
            None => Err(PortalError::new(data.to_json(), self.description())),
        }
    }

    /// Writes a slot that may be missing from its container. `Ok(None)`
    /// leaves the key out of the written map.
    fn write_dynamic_slot(&self, data: Option<&Data>) -> PortalResult<Option<Value>> {
        match data {
            Some(data) => self.write_dynamic(data).map(Some),
            None => Err(PortalError::new(Value::Null, self.description())),
        }
    }

    /// Hides the value type so the portal can sit next to differently typed
    /// siblings inside a tuple or record.
    fn erased(self) -> AnyPortal
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }

    fn boxed(self) -> Box<dyn Portal<Value = Self::Value>>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl<V: Typed> Portal for Box<dyn Portal<Value = V>> {
    type Value = V;

    fn read(&self, input: &Value) -> PortalResult<V> {
        (**self).read(input)
    }

    fn write(&self, value: &V) -> PortalResult<Value> {
        (**self).write(value)
    }

    fn description(&self) -> String {
        (**self).description()
    }

    fn read_slot(&self, input: Option<&Value>) -> PortalResult<Option<V>> {
        (**self).read_slot(input)
    }

    fn write_dynamic(&self, data: &Data) -> PortalResult<Value> {
        (**self).write_dynamic(data)
    }

    fn write_dynamic_slot(&self, data: Option<&Data>) -> PortalResult<Option<Value>> {
        (**self).write_dynamic_slot(data)
    }
}

/// A portal whose value type has been replaced by [`Data`].
pub trait ErasedPortal: Send + Sync {
    fn read_data(&self, input: Option<&Value>) -> PortalResult<Option<Data>>;

    /// `value` is the slot as found in the typed container.
    fn write_data(&self, value: Option<&Data>) -> PortalResult<Option<Value>>;

    fn describe(&self) -> String;
}

pub type AnyPortal = Box<dyn ErasedPortal>;

impl<P: Portal> ErasedPortal for P {
    fn read_data(&self, input: Option<&Value>) -> PortalResult<Option<Data>> {
        Ok(self.read_slot(input)?.map(|value| value.to_data()))
    }

    fn write_data(&self, value: Option<&Data>) -> PortalResult<Option<Value>> {
        self.write_dynamic_slot(value)
    }

    fn describe(&self) -> String {
        self.description()
    }
}
