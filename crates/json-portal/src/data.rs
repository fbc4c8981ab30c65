//! In-memory values produced by heterogeneous portals.
//!
//! Statically typed portals read straight into Rust types (`i64`, `Vec<T>`, ...).
//! Tuples, records and unions mix child types, so they read into [`Data`] and
//! convert to and from the children's types through [`Typed`].

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

/// A typed value of any shape a portal can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Output of the `nothing` portal.
    Unit,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(DateTime<Utc>),
    List(Vec<Data>),
    Record(Record),
    /// Untouched primitive tree from the `raw` portal.
    Raw(Value),
}

impl Data {
    /// Renders the value as a primitive tree for diagnostics.
    ///
    /// Dates become ISO-8601 text and non-finite floats become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Data::Unit => Value::String(String::new()),
            Data::Null => Value::Null,
            Data::Bool(b) => Value::Bool(*b),
            Data::Int(i) => Value::from(*i),
            Data::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Data::Str(s) => Value::String(s.clone()),
            Data::Date(d) => Value::String(iso_text(d)),
            Data::List(items) => Value::Array(items.iter().map(Data::to_json).collect()),
            Data::Record(record) => record.to_json(),
            Data::Raw(v) => v.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Data::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Data::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Data::Null)
    }
}

pub(crate) fn iso_text(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Truncates toward zero. `None` for non-finite values and values outside the
/// `i64` range.
pub(crate) fn truncate_to_i64(value: f64) -> Option<i64> {
    // 2^63 is exact as f64; i64::MAX is not.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let whole = value.trunc();
    if whole.is_finite() && (-LIMIT..LIMIT).contains(&whole) {
        Some(whole as i64)
    } else {
        None
    }
}

/// String-keyed map of typed values, the in-memory form of `obj` and friends.
///
/// Absent optional fields are simply not present. An `optional` field holding
/// an explicit [`Data::Null`] is written as a missing key, so it reads back as
/// absent; declare the field `nullable` to keep the null across a round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Data>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToData) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToData) -> Option<Data> {
        self.fields.insert(key.into(), value.to_data())
    }

    pub fn get(&self, key: &str) -> Option<&Data> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Data> {
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Moves every field of `other` into `self`; `other` wins on collisions.
    pub fn merge(&mut self, other: Record) {
        self.fields.extend(other.fields);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Data)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(map)
    }
}

impl FromIterator<(String, Data)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Data)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Builds a [`Record`] from `key => value` pairs.
///
/// ```
/// use json_portal::record;
/// let point = record! { "x" => 1i64, "label" => "origin" };
/// assert_eq!(point.len(), 2);
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::Record::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $( record.insert($key, $value); )+
        record
    }};
}

/// Conversion of a Rust value into [`Data`]. Anything that can be stored in a
/// [`Record`] implements it.
pub trait ToData {
    fn to_data(&self) -> Data;
}

/// A portal's typed value: converts to [`Data`] and back.
///
/// `from_data` returns `None` when the shape does not fit; heterogeneous
/// portals turn that into a validation failure at the field's position.
pub trait Typed: ToData + Sized {
    fn from_data(data: &Data) -> Option<Self>;
}

impl ToData for Data {
    fn to_data(&self) -> Data {
        self.clone()
    }
}

impl Typed for Data {
    fn from_data(data: &Data) -> Option<Self> {
        Some(data.clone())
    }
}

impl ToData for () {
    fn to_data(&self) -> Data {
        Data::Unit
    }
}

impl Typed for () {
    fn from_data(_: &Data) -> Option<Self> {
        Some(())
    }
}

impl ToData for bool {
    fn to_data(&self) -> Data {
        Data::Bool(*self)
    }
}

impl Typed for bool {
    fn from_data(data: &Data) -> Option<Self> {
        match data {
            Data::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl ToData for i64 {
    fn to_data(&self) -> Data {
        Data::Int(*self)
    }
}

impl Typed for i64 {
    fn from_data(data: &Data) -> Option<Self> {
        match data {
            Data::Int(i) => Some(*i),
            Data::Float(f) => truncate_to_i64(*f),
            _ => None,
        }
    }
}

impl ToData for f64 {
    fn to_data(&self) -> Data {
        Data::Float(*self)
    }
}

impl Typed for f64 {
    // Non-finite floats pass through here; the float portal rejects them on write.
    fn from_data(data: &Data) -> Option<Self> {
        match data {
            Data::Int(i) => Some(*i as f64),
            Data::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl ToData for String {
    fn to_data(&self) -> Data {
        Data::Str(self.clone())
    }
}

impl Typed for String {
    fn from_data(data: &Data) -> Option<Self> {
        data.as_str().map(str::to_owned)
    }
}

// Record building only; portals never produce `&str`.
impl ToData for &str {
    fn to_data(&self) -> Data {
        Data::Str((*self).to_owned())
    }
}

impl ToData for DateTime<Utc> {
    fn to_data(&self) -> Data {
        Data::Date(*self)
    }
}

impl Typed for DateTime<Utc> {
    fn from_data(data: &Data) -> Option<Self> {
        match data {
            Data::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl ToData for Value {
    fn to_data(&self) -> Data {
        Data::Raw(self.clone())
    }
}

impl Typed for Value {
    fn from_data(data: &Data) -> Option<Self> {
        Some(data.to_json())
    }
}

impl ToData for Record {
    fn to_data(&self) -> Data {
        Data::Record(self.clone())
    }
}

impl Typed for Record {
    fn from_data(data: &Data) -> Option<Self> {
        data.as_record().cloned()
    }
}

impl<T: ToData> ToData for Option<T> {
    fn to_data(&self) -> Data {
        self.as_ref().map_or(Data::Null, ToData::to_data)
    }
}

impl<T: Typed> Typed for Option<T> {
    fn from_data(data: &Data) -> Option<Self> {
        match data {
            Data::Null => Some(None),
            other => T::from_data(other).map(Some),
        }
    }
}

impl<T: ToData> ToData for Vec<T> {
    fn to_data(&self) -> Data {
        Data::List(self.iter().map(ToData::to_data).collect())
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn from_data(data: &Data) -> Option<Self> {
        match data {
            Data::List(items) => items.iter().map(T::from_data).collect(),
            _ => None,
        }
    }
}

/// Stored as a record holding exactly one of `ok` or `error`.
impl<T: ToData, E: ToData> ToData for Result<T, E> {
    fn to_data(&self) -> Data {
        let record = match self {
            Ok(value) => Record::new().with("ok", value.to_data()),
            Err(error) => Record::new().with("error", error.to_data()),
        };
        Data::Record(record)
    }
}

impl<T: Typed, E: Typed> Typed for Result<T, E> {
    fn from_data(data: &Data) -> Option<Self> {
        let record = data.as_record()?;
        match record.get("error") {
            Some(error) => E::from_data(error).map(Err),
            None => T::from_data(record.get("ok").unwrap_or(&Data::Null)).map(Ok),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn record_macro_and_json() {
        let rec = record! { "x" => 123i64, "y" => "hi", "z" => false };
        assert_eq!(rec.to_json(), json!({"x": 123, "y": "hi", "z": false}));
        assert_eq!(rec.get("y"), Some(&Data::Str("hi".into())));
    }

    #[test]
    fn merge_prefers_later_fields() {
        let mut left = record! { "a" => 1i64, "b" => 2i64 };
        left.merge(record! { "b" => "two" });
        assert_eq!(left.get("b"), Some(&Data::Str("two".into())));
        assert_eq!(left.len(), 2);
    }

    #[test]
    fn dates_render_as_iso_text() {
        let date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Data::Date(date).to_json(), json!("2020-01-01T00:00:00.000Z"));
    }

    #[test]
    fn non_finite_float_renders_null() {
        assert_eq!(Data::Float(f64::NAN).to_json(), Value::Null);
    }

    #[test]
    fn int_from_float_truncates_toward_zero() {
        assert_eq!(i64::from_data(&Data::Float(-3.9)), Some(-3));
        assert_eq!(i64::from_data(&Data::Float(f64::INFINITY)), None);
        assert_eq!(i64::from_data(&Data::Str("3".into())), None);
    }

    #[test]
    fn int_conversion_refuses_out_of_range() {
        assert_eq!(i64::from_data(&Data::Float(1e300)), None);
        assert_eq!(i64::from_data(&Data::Float(9_223_372_036_854_775_808.0)), None);
        assert_eq!(truncate_to_i64(-9_223_372_036_854_775_808.0), Some(i64::MIN));
        assert_eq!(truncate_to_i64(f64::NAN), None);
        assert_eq!(truncate_to_i64(-0.7), Some(0));
    }

    #[test]
    fn borrowed_text_builds_records() {
        let rec = record! { "tags" => vec!["a", "b"], "name" => "x" };
        assert_eq!(rec.to_json(), json!({"tags": ["a", "b"], "name": "x"}));
    }

    #[test]
    fn option_maps_null() {
        assert_eq!(Option::<i64>::from_data(&Data::Null), Some(None));
        assert_eq!(Option::<i64>::from_data(&Data::Int(4)), Some(Some(4)));
        assert_eq!(Some(4i64).to_data(), Data::Int(4));
    }

    #[test]
    fn vec_requires_every_element() {
        let ok = Data::List(vec![Data::Int(1), Data::Int(2)]);
        assert_eq!(Vec::<i64>::from_data(&ok), Some(vec![1, 2]));
        let bad = Data::List(vec![Data::Int(1), Data::Bool(true)]);
        assert_eq!(Vec::<i64>::from_data(&bad), None);
    }

    #[test]
    fn result_uses_error_key_presence() {
        let failed: Result<i64, String> = Err("boom".into());
        let data = failed.to_data();
        assert_eq!(data.to_json(), json!({"error": "boom"}));
        assert_eq!(Result::<i64, String>::from_data(&data), Some(failed));
    }
}
