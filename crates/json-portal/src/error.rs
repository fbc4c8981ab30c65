//! Validation failures raised by every portal.
//!
//! A failure is created at the leaf that rejected a value and re-wrapped by each
//! container on the way out. Containers push one [`PathSegment`] per level and
//! swap the carried input for the one they received, so the error that reaches
//! the caller holds the complete top-level input and a path to the failing leaf.

use std::fmt;

use serde_json::Value;

/// One step of the location inside the value being read or written.
///
/// Segments are pushed innermost first and reversed on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Record field, rendered as `.name`.
    Field(String),
    /// List or tuple position, rendered as `[i]`.
    Index(usize),
    /// Tagged union branch, rendered as `<tag>`.
    Tag(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, ".{name}"),
            PathSegment::Index(idx) => write!(f, "[{idx}]"),
            PathSegment::Tag(tag) => write!(f, "<{tag}>"),
        }
    }
}

/// The single failure kind of the crate.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("data{} does not match serializer in data {}", render_path(.segments), render_json(.input))]
pub struct PortalError {
    segments: Vec<PathSegment>,
    input: Value,
    expected: String,
}

pub type PortalResult<T> = Result<T, PortalError>;

impl PortalError {
    /// Failure at the current level. `expected` is the description of the
    /// portal that rejected `input`.
    #[must_use]
    pub fn new(input: Value, expected: impl Into<String>) -> Self {
        Self {
            segments: Vec::new(),
            input,
            expected: expected.into(),
        }
    }

    #[must_use]
    pub fn in_field(self, name: impl Into<String>, input: Value) -> Self {
        self.within(PathSegment::Field(name.into()), input)
    }

    #[must_use]
    pub fn in_index(self, index: usize, input: Value) -> Self {
        self.within(PathSegment::Index(index), input)
    }

    #[must_use]
    pub fn in_tag(self, tag: impl Into<String>, input: Value) -> Self {
        self.within(PathSegment::Tag(tag.into()), input)
    }

    /// Replaces the carried input without adding a path segment. Used by
    /// containers that share their input with their children (combine).
    #[must_use]
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    fn within(mut self, segment: PathSegment, input: Value) -> Self {
        self.segments.push(segment);
        self.input = input;
        self
    }

    /// Path from the outermost container to the failing leaf, e.g. `.x[1]`.
    pub fn path(&self) -> String {
        render_path(&self.segments)
    }

    /// Segments from outermost to innermost.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter().rev()
    }

    /// The complete input handed to the outermost portal that saw the failure.
    pub fn input(&self) -> &Value {
        &self.input
    }

    pub fn rendered_input(&self) -> String {
        render_json(&self.input)
    }

    /// Description of the portal that rejected the leaf value.
    pub fn expected(&self) -> &str {
        &self.expected
    }
}

fn render_path(segments: &[PathSegment]) -> String {
    segments.iter().rev().map(ToString::to_string).collect()
}

fn render_json(input: &Value) -> String {
    serde_json::to_string(input).unwrap_or_else(|_| String::from("<unrenderable>"))
}
