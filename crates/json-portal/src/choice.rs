//! Closed string enumerations and tagged unions of records.

use serde_json::Value;

use crate::data::{Data, Record};
use crate::error::{PortalError, PortalResult};
use crate::portal::Portal;

/// Field that carries the branch tag of a [`Variant`].
pub const TAG_FIELD: &str = "type";

#[derive(Debug, Clone)]
pub struct OneOf {
    candidates: Vec<String>,
}

/// Accepts exactly one of `candidates`, unchanged. No case folding.
pub fn one_of<I, S>(candidates: I) -> OneOf
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    OneOf {
        candidates: candidates.into_iter().map(Into::into).collect(),
    }
}

/// Candidates are the keys of a keyed set, e.g. a lookup table of labels.
pub fn one_of_keys<I, K, V>(entries: I) -> OneOf
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
{
    one_of(entries.into_iter().map(|(key, _)| key))
}

impl OneOf {
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    fn check(&self, candidate: &str) -> bool {
        self.candidates.iter().any(|c| c == candidate)
    }
}

impl Portal for OneOf {
    type Value = String;

    fn read(&self, input: &Value) -> PortalResult<String> {
        match input {
            Value::String(s) if self.check(s) => Ok(s.clone()),
            other => Err(PortalError::new(other.clone(), self.description())),
        }
    }

    fn write(&self, value: &String) -> PortalResult<Value> {
        if self.check(value) {
            Ok(Value::String(value.clone()))
        } else {
            Err(PortalError::new(Value::String(value.clone()), self.description()))
        }
    }

    fn description(&self) -> String {
        let quoted: Vec<String> = self.candidates.iter().map(|c| format!("{c:?}")).collect();
        format!("oneOf({})", quoted.join(", "))
    }
}

/// One tagged branch of a [`Variant`].
pub struct Branch {
    tag: String,
    portal: Box<dyn Portal<Value = Record>>,
}

pub fn branch<P>(tag: impl Into<String>, portal: P) -> Branch
where
    P: Portal<Value = Record> + 'static,
{
    Branch {
        tag: tag.into(),
        portal: portal.boxed(),
    }
}

/// Tagged union. The typed value is the branch's record plus a `type` field
/// holding the tag; on the wire the branch fields sit next to `type`.
pub struct Variant {
    branches: Vec<Branch>,
}

/// Tags are matched in declaration order; the first match wins.
pub fn variant(branches: Vec<Branch>) -> Variant {
    Variant { branches }
}

impl Variant {
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.branches.iter().map(|b| b.tag.as_str())
    }

    fn find(&self, tag: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.tag == tag)
    }
}

impl Portal for Variant {
    type Value = Record;

    fn read(&self, input: &Value) -> PortalResult<Record> {
        let tag = input.get(TAG_FIELD).and_then(Value::as_str);
        let Some(branch) = tag.and_then(|t| self.find(t)) else {
            tracing::debug!(tag = ?tag, "no variant branch matches tag");
            return Err(PortalError::new(input.clone(), self.description()));
        };
        let mut record = branch
            .portal
            .read(input)
            .map_err(|e| e.in_tag(branch.tag.clone(), input.clone()))?;
        record.insert(TAG_FIELD, branch.tag.clone());
        Ok(record)
    }

    fn write(&self, value: &Record) -> PortalResult<Value> {
        let tag = value.get(TAG_FIELD).and_then(Data::as_str);
        let Some(branch) = tag.and_then(|t| self.find(t)) else {
            return Err(PortalError::new(value.to_json(), self.description()));
        };
        let mut written = branch
            .portal
            .write(value)
            .map_err(|e| e.in_tag(branch.tag.clone(), value.to_json()))?;
        match written.as_object_mut() {
            Some(map) => {
                map.insert(TAG_FIELD.into(), Value::String(branch.tag.clone()));
                Ok(written)
            }
            None => Err(PortalError::new(written, branch.portal.description())
                .in_tag(branch.tag.clone(), value.to_json())),
        }
    }

    fn description(&self) -> String {
        let branches: Vec<String> = self
            .branches
            .iter()
            .map(|b| format!("<{}> {}", b.tag, b.portal.description()))
            .collect();
        format!("variant({})", branches.join(" | "))
    }
}
