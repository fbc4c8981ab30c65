//! Schema versioning with forward migrations.
//!
//! The wire form is always `[version, payload]`. Writes carry the current
//! version, which equals the number of registered migrations. Reads run the
//! payload through `migrations[v..]` before the current schema sees it.

use serde_json::Value;

use crate::config::FutureVersionPolicy;
use crate::data::Data;
use crate::error::{PortalError, PortalResult};
use crate::portal::Portal;
use crate::primitive::raw;
use crate::sequence::{tuple, Tuple};

/// Turns version `i`'s raw payload into version `i + 1`'s. Must be total.
pub type Migration = Box<dyn Fn(Value) -> Value + Send + Sync>;

pub struct Versioned<P> {
    schema: P,
    migrations: Vec<Migration>,
    envelope: Tuple,
    future: FutureVersionPolicy,
}

/// Version 0 of `schema`; add steps with [`Versioned::migration`].
pub fn versioned<P: Portal>(schema: P) -> Versioned<P> {
    Versioned {
        schema,
        migrations: Vec::new(),
        envelope: tuple(vec![raw().erased(), raw().erased()]).exact(),
        future: FutureVersionPolicy::default(),
    }
}

impl<P: Portal> Versioned<P> {
    /// Appends the migration from the current version to the next one.
    #[must_use]
    pub fn migration<F>(mut self, step: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.migrations.push(Box::new(step));
        self
    }

    #[must_use]
    pub fn with_future_versions(mut self, policy: FutureVersionPolicy) -> Self {
        self.future = policy;
        self
    }

    pub fn version(&self) -> usize {
        self.migrations.len()
    }

    fn wrap(&self, payload: Value) -> PortalResult<Value> {
        let current = i64::try_from(self.version()).unwrap_or(i64::MAX);
        self.envelope
            .write(&vec![Data::Int(current), Data::Raw(payload)])
    }

    fn unwrap_envelope(&self, input: &Value) -> PortalResult<(usize, Value)> {
        let parts = self.envelope.read(input)?;
        // The tag is taken as written: no numeric strings, no fractions.
        let version = input
            .get(0)
            .and_then(Value::as_u64)
            .and_then(|v| usize::try_from(v).ok());
        let Some(version) = version else {
            let slot = input.get(0).cloned().unwrap_or(Value::Null);
            return Err(PortalError::new(slot, "version").in_index(0, input.clone()));
        };
        let payload = match parts.into_iter().nth(1) {
            Some(Data::Raw(payload)) => payload,
            _ => Value::Null,
        };
        Ok((version, payload))
    }
}

impl<P: Portal> Portal for Versioned<P> {
    type Value = P::Value;

    fn read(&self, input: &Value) -> PortalResult<P::Value> {
        let (version, mut payload) = self.unwrap_envelope(input)?;
        let current = self.version();
        if version > current {
            tracing::warn!(version, current, "versioned payload is newer than known migrations");
            if self.future == FutureVersionPolicy::Reject {
                return Err(PortalError::new(Value::from(version), self.description())
                    .in_index(0, input.clone()));
            }
        } else if version < current {
            tracing::debug!(from = version, to = current, "migrating versioned payload");
            for (step, migrate) in self.migrations.iter().enumerate().skip(version) {
                tracing::debug!(step, "applying migration");
                payload = migrate(payload);
            }
        }
        self.schema.read(&payload)
    }

    fn write(&self, value: &P::Value) -> PortalResult<Value> {
        let payload = self.schema.write(value)?;
        self.wrap(payload)
    }

    fn write_dynamic(&self, data: &Data) -> PortalResult<Value> {
        let payload = self.schema.write_dynamic(data)?;
        self.wrap(payload)
    }

    fn description(&self) -> String {
        let current = self.version();
        let schema = self.schema.description();
        if current == 0 {
            return format!("versioned(v0: {schema})");
        }
        let older: Vec<String> = (0..current).map(|v| format!("v{v}")).collect();
        format!("versioned(v{current}: {schema}; migrates {})", older.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{field, obj};
    use crate::primitive::{int, string};
    use crate::record;
    use serde_json::json;

    fn renamed() -> Versioned<crate::object::Object> {
        versioned(obj(vec![field("full_name", string())])).migration(|mut v| {
            if let Some(map) = v.as_object_mut() {
                if let Some(name) = map.remove("name") {
                    map.insert("full_name".into(), name);
                }
            }
            v
        })
    }

    #[test]
    fn writes_current_version() {
        let p = versioned(int());
        assert_eq!(p.write(&5).unwrap(), json!([0, 5]));
        assert_eq!(p.read(&json!([0, 5])).unwrap(), 5);
        assert_eq!(
            renamed().write(&record! { "full_name" => "Ada" }).unwrap(),
            json!([1, {"full_name": "Ada"}])
        );
    }

    #[test]
    fn migrates_older_payloads() {
        let read = renamed().read(&json!([0, {"name": "Ada"}])).unwrap();
        assert_eq!(read, record! { "full_name" => "Ada" });
    }

    #[test]
    fn current_payload_skips_migrations() {
        let read = renamed().read(&json!([1, {"full_name": "Ada"}])).unwrap();
        assert_eq!(read, record! { "full_name" => "Ada" });
        let err = renamed().read(&json!([1, {"name": "Ada"}])).unwrap_err();
        assert_eq!(err.path(), ".full_name");
    }

    #[test]
    fn rejects_malformed_envelopes() {
        let p = versioned(int());
        assert!(p.read(&json!(5)).is_err());
        assert!(p.read(&json!([0])).is_err());
        let err = p.read(&json!([-1, 5])).unwrap_err();
        assert_eq!(err.path(), "[0]");
        for tag in [json!("zero"), json!("0"), json!(0.9), json!(1.0), json!(null)] {
            let err = p.read(&json!([tag, 5])).unwrap_err();
            assert_eq!(err.path(), "[0]");
            assert_eq!(err.expected(), "version");
        }
    }

    #[test]
    fn future_versions_rejected_by_default() {
        let err = versioned(int()).read(&json!([3, 5])).unwrap_err();
        assert_eq!(err.path(), "[0]");
    }

    #[test]
    fn future_versions_can_fall_through_to_schema() {
        let p = versioned(int()).with_future_versions(FutureVersionPolicy::Validate);
        assert_eq!(p.read(&json!([3, 5])).unwrap(), 5);
        assert!(p.read(&json!([3, "five"])).is_err());
    }

    #[test]
    fn description_mentions_older_versions() {
        assert_eq!(versioned(int()).description(), "versioned(v0: int)");
        assert_eq!(
            renamed().description(),
            "versioned(v1: obj({full_name: str}); migrates v0)"
        );
    }
}
