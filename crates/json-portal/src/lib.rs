//! Schema combinators over JSON primitive trees.
//!
//! A portal is declared once and yields both a validating reader
//! (`serde_json::Value` to typed value) and a writer (typed value back to
//! `serde_json::Value`), so the two directions cannot drift apart. Parsing and
//! rendering text is left to the caller.
//!
//! ```
//! use json_portal::{array, field, int, obj, record, string, Portal};
//! use serde_json::json;
//!
//! let point = obj(vec![field("label", string()), field("coords", array(int()))]);
//! let value = point.read(&json!({"label": "a", "coords": [1, 2]})).unwrap();
//! assert_eq!(value, record! { "label" => "a", "coords" => vec![1i64, 2] });
//!
//! let err = point.read(&json!({"label": "a", "coords": [1, "2"]})).unwrap_err();
//! assert_eq!(err.path(), ".coords[1]");
//! ```

mod choice;
mod config;
mod data;
mod date;
mod error;
mod modifier;
mod object;
mod outcome;
mod portal;
mod primitive;
mod sequence;
mod versioned;

pub use choice::{branch, one_of, one_of_keys, variant, Branch, OneOf, Variant, TAG_FIELD};
pub use config::{
    config_schema_json, load_config, ArityPolicy, FutureVersionPolicy, PortalConfig,
};
pub use data::{Data, Record, ToData, Typed};
pub use date::{date_iso, date_unix_millis, date_unix_secs, DatePortal};
pub use error::{PathSegment, PortalError, PortalResult};
pub use modifier::{nullable, optional, Nullable, Optional};
pub use object::{combine, field, obj, partial_obj, Combine, Field, Object};
pub use outcome::{result, ResultPortal};
pub use portal::{AnyPortal, ErasedPortal, Portal};
pub use primitive::{
    boolean, float, int, nothing, raw, string, uuid, BoolPortal, FloatPortal, IntPortal,
    NothingPortal, RawPortal, StrPortal, UuidPortal,
};
pub use sequence::{array, tuple, Array, Tuple};
pub use versioned::{versioned, Migration, Versioned};
