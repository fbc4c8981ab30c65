//! Success-or-error envelope: `{"ok": ...}` or `{"error": ...}`.
//!
//! The presence of the `error` key selects the branch, whatever it holds.

use serde_json::{Map, Value};

use crate::data::{Data, ToData};
use crate::error::{PortalError, PortalResult};
use crate::portal::Portal;

const OK_KEY: &str = "ok";
const ERROR_KEY: &str = "error";

#[derive(Debug, Clone)]
pub struct ResultPortal<O, E> {
    ok: O,
    error: E,
}

pub fn result<O: Portal, E: Portal>(ok: O, error: E) -> ResultPortal<O, E> {
    ResultPortal { ok, error }
}

impl<O: Portal, E: Portal> ResultPortal<O, E> {
    pub fn is_success(value: &Result<O::Value, E::Value>) -> bool {
        value.is_ok()
    }

    pub fn is_failure(value: &Result<O::Value, E::Value>) -> bool {
        value.is_err()
    }

    fn envelope(key: &str, payload: Value) -> Value {
        let mut map = Map::new();
        map.insert(key.to_owned(), payload);
        Value::Object(map)
    }
}

impl<O: Portal, E: Portal> Portal for ResultPortal<O, E> {
    type Value = Result<O::Value, E::Value>;

    fn read(&self, input: &Value) -> PortalResult<Self::Value> {
        let Some(map) = input.as_object() else {
            return Err(PortalError::new(input.clone(), self.description()));
        };
        match map.get(ERROR_KEY) {
            Some(error) => self
                .error
                .read(error)
                .map(Err)
                .map_err(|e| e.in_field(ERROR_KEY, input.clone())),
            None => self
                .ok
                .read(map.get(OK_KEY).unwrap_or(&Value::Null))
                .map(Ok)
                .map_err(|e| e.in_field(OK_KEY, input.clone())),
        }
    }

    fn write(&self, value: &Self::Value) -> PortalResult<Value> {
        let rendered = || value.to_data().to_json();
        match value {
            Ok(ok) => self
                .ok
                .write(ok)
                .map(|payload| Self::envelope(OK_KEY, payload))
                .map_err(|e| e.in_field(OK_KEY, rendered())),
            Err(error) => self
                .error
                .write(error)
                .map(|payload| Self::envelope(ERROR_KEY, payload))
                .map_err(|e| e.in_field(ERROR_KEY, rendered())),
        }
    }

    fn write_dynamic(&self, data: &Data) -> PortalResult<Value> {
        let Some(record) = data.as_record() else {
            return Err(PortalError::new(data.to_json(), self.description()));
        };
        let (key, written) = match record.get(ERROR_KEY) {
            Some(error) => (ERROR_KEY, self.error.write_dynamic(error)),
            None => (
                OK_KEY,
                self.ok.write_dynamic(record.get(OK_KEY).unwrap_or(&Data::Null)),
            ),
        };
        written
            .map(|payload| Self::envelope(key, payload))
            .map_err(|e| e.in_field(key, data.to_json()))
    }

    fn description(&self) -> String {
        format!(
            "result(ok: {}, error: {})",
            self.ok.description(),
            self.error.description()
        )
    }
}
