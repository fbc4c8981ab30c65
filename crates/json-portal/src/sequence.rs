//! Homogeneous lists and fixed-shape tuples.

use serde_json::Value;

use crate::config::ArityPolicy;
use crate::data::{Data, ToData};
use crate::error::{PortalError, PortalResult};
use crate::portal::{AnyPortal, Portal};

#[derive(Debug, Clone)]
pub struct Array<P> {
    inner: P,
}

pub fn array<P: Portal>(inner: P) -> Array<P> {
    Array { inner }
}

impl<P: Portal> Portal for Array<P> {
    type Value = Vec<P::Value>;

    fn read(&self, input: &Value) -> PortalResult<Self::Value> {
        let Value::Array(items) = input else {
            return Err(PortalError::new(input.clone(), self.description()));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.inner
                    .read(item)
                    .map_err(|e| e.in_index(i, input.clone()))
            })
            .collect()
    }

    fn write(&self, value: &Self::Value) -> PortalResult<Value> {
        value
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.inner
                    .write(item)
                    .map_err(|e| e.in_index(i, value.to_data().to_json()))
            })
            .collect::<PortalResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn description(&self) -> String {
        format!("array({})", self.inner.description())
    }

    fn write_dynamic(&self, data: &Data) -> PortalResult<Value> {
        let Data::List(items) = data else {
            return Err(PortalError::new(data.to_json(), self.description()));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.inner
                    .write_dynamic(item)
                    .map_err(|e| e.in_index(i, data.to_json()))
            })
            .collect::<PortalResult<Vec<_>>>()
            .map(Value::Array)
    }
}

/// Fixed-arity sequence of differently typed positions.
pub struct Tuple {
    items: Vec<AnyPortal>,
    arity: ArityPolicy,
}

/// Builds a tuple with the default [`ArityPolicy::Permissive`]: trailing
/// extra elements are ignored and missing positions are read as absent.
pub fn tuple(items: Vec<AnyPortal>) -> Tuple {
    Tuple {
        items,
        arity: ArityPolicy::default(),
    }
}

impl Tuple {
    #[must_use]
    pub fn with_arity(mut self, arity: ArityPolicy) -> Self {
        self.arity = arity;
        self
    }

    /// Shorthand for [`ArityPolicy::Exact`].
    #[must_use]
    pub fn exact(self) -> Self {
        self.with_arity(ArityPolicy::Exact)
    }

    pub fn arity(&self) -> usize {
        self.items.len()
    }

    fn length_ok(&self, len: usize) -> bool {
        match self.arity {
            ArityPolicy::Permissive => true,
            ArityPolicy::Exact => len == self.items.len(),
        }
    }
}

impl Portal for Tuple {
    type Value = Vec<Data>;

    fn read(&self, input: &Value) -> PortalResult<Vec<Data>> {
        let elements = match input {
            Value::Array(elements) if self.length_ok(elements.len()) => elements,
            other => return Err(PortalError::new(other.clone(), self.description())),
        };
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.read_data(elements.get(i))
                    .map(|slot| slot.unwrap_or(Data::Null))
                    .map_err(|e| e.in_index(i, input.clone()))
            })
            .collect()
    }

    fn write(&self, value: &Vec<Data>) -> PortalResult<Value> {
        if !self.length_ok(value.len()) {
            return Err(PortalError::new(value.to_data().to_json(), self.description()));
        }
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.write_data(value.get(i))
                    .map(|slot| slot.unwrap_or(Value::Null))
                    .map_err(|e| e.in_index(i, value.to_data().to_json()))
            })
            .collect::<PortalResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn description(&self) -> String {
        let items: Vec<String> = self.items.iter().map(|item| item.describe()).collect();
        format!("tuple({})", items.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::optional;
    use crate::primitive::{boolean, float, int, string};
    use serde_json::json;

    #[test]
    fn array_round_trip() {
        let p = array(int());
        let wire = p.write(&vec![1, 2, 3, 4]).unwrap();
        assert_eq!(wire, json!([1, 2, 3, 4]));
        assert_eq!(p.read(&wire).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn array_rejects_non_lists() {
        assert!(array(int()).read(&json!({})).is_err());
        assert!(array(int()).read(&json!("1,2")).is_err());
    }

    #[test]
    fn array_reports_index() {
        let input = json!([1, "two", 3]);
        let err = array(int()).read(&input).unwrap_err();
        assert_eq!(err.path(), "[1]");
        assert_eq!(err.input(), &input);
    }

    #[test]
    fn nested_arrays_stack_indices() {
        let err = array(array(boolean()))
            .read(&json!([[true], [false, 0]]))
            .unwrap_err();
        assert_eq!(err.path(), "[1][1]");
    }

    #[test]
    fn tuple_description() {
        let p = tuple(vec![string().erased(), float().erased()]);
        assert_eq!(p.description(), "tuple(str, float)");
        assert_eq!(p.description(), p.description());
    }

    #[test]
    fn tuple_round_trip() {
        let p = tuple(vec![string().erased(), int().erased()]);
        let value = vec![Data::Str("a".into()), Data::Int(2)];
        let wire = p.write(&value).unwrap();
        assert_eq!(wire, json!(["a", 2]));
        assert_eq!(p.read(&wire).unwrap(), value);
    }

    #[test]
    fn tuple_reports_position() {
        let p = tuple(vec![string().erased(), int().erased()]);
        let err = p.read(&json!(["a", "b"])).unwrap_err();
        assert_eq!(err.path(), "[1]");
        let err = p.write(&vec![Data::Int(1), Data::Int(2)]).unwrap_err();
        assert_eq!(err.path(), "[0]");
        assert_eq!(err.input(), &json!([1, 2]));
    }

    #[test]
    fn permissive_tuple_ignores_extra_elements() {
        let p = tuple(vec![int().erased()]);
        assert_eq!(p.read(&json!([1, "extra"])).unwrap(), vec![Data::Int(1)]);
    }

    #[test]
    fn permissive_tuple_reads_missing_positions_as_absent() {
        let p = tuple(vec![int().erased(), optional(string()).erased()]);
        assert_eq!(p.read(&json!([1])).unwrap(), vec![Data::Int(1), Data::Null]);

        let strict_tail = tuple(vec![int().erased(), string().erased()]);
        let err = strict_tail.read(&json!([1])).unwrap_err();
        assert_eq!(err.path(), "[1]");
    }

    #[test]
    fn exact_tuple_checks_length() {
        let p = tuple(vec![int().erased(), int().erased()]).exact();
        assert!(p.read(&json!([1, 2])).is_ok());
        let err = p.read(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.path(), "");
        assert!(p.read(&json!([1])).is_err());
        assert!(p.write(&vec![Data::Int(1)]).is_err());
    }
}
