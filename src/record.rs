//! The typed record layer.
//!
//! The wire format does not care how a record's slot map is obtained; this
//! module obtains it from generated code instead of runtime reflection.
//! `#[derive(Polo)]` (from `boson-derive`) produces, per type:
//!
//! - a [`ClassDescriptor`] — the ordered slot metadata, built once per
//!   process inside a `OnceLock` (the descriptor cache: lazily populated,
//!   insert-if-absent, idempotent, safe under concurrent readers);
//! - [`Polo::to_record`] — encodes the struct into a [`Graph`] record,
//!   honouring the per-slot directives (`rename`, `ignore`, `readonly`);
//! - [`Polo::read_field`] — routes one decoded slot into the struct.
//!
//! Slot assignment is fail-soft: an unknown slot name or a value that does
//! not fit the declared slot is logged through `tracing` and skipped, so the
//! rest of the graph still decodes. Construction-level failures
//! ([`BosonError::CannotConstruct`], [`BosonError::MissingClass`],
//! [`BosonError::UnknownEnumConstant`]) fail the projection immediately.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::error::{BosonError, Result};
use crate::graph::{Graph, RecordId};
use crate::temporal::Period;
use crate::value::Value;
use crate::writer::WriteOptions;

/// Metadata for one slot of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// External name: the field name, or the `rename` directive's value.
    pub name: &'static str,
    /// The Rust field identifier.
    pub rust_name: &'static str,
    /// Set by `#[boson(readonly)]`; such slots are encoded only when
    /// [`WriteOptions::serialize_readonly`] is on.
    pub readonly: bool,
}

/// The slot descriptor for a record type: wire class name plus the included
/// slots in declaration order. Slots under `#[boson(ignore)]` never appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    /// The wire class name (type identifier unless overridden by
    /// `#[boson(class_name = "...")]`).
    pub class_name: &'static str,
    /// Included slots, in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

/// A user-defined record type that maps onto the wire's POLO form.
///
/// Usually implemented via `#[derive(Polo)]`; a manual implementation is the
/// escape hatch for types without a zero-argument construction path, which
/// surface [`BosonError::CannotConstruct`] from [`Polo::construct`].
pub trait Polo: Sized {
    /// The cached slot descriptor for this type.
    fn descriptor() -> &'static ClassDescriptor;

    /// The wire class name.
    #[must_use]
    fn class_name() -> &'static str {
        Self::descriptor().class_name
    }

    /// The zero-argument construction path; the derive emits
    /// `Ok(Self::default())`.
    fn construct() -> Result<Self>;

    /// Appends this value to `graph` as a record and returns its id.
    fn to_record(&self, graph: &mut Graph, options: &WriteOptions) -> RecordId;

    /// Routes one decoded slot into `self`. Returns `Ok(false)` when the
    /// name matches no declared slot.
    fn read_field(&mut self, name: &str, value: &Value, graph: &Graph) -> Result<bool>;

    /// Projects a decoded record onto this type.
    ///
    /// The record's wire class name must match [`Polo::class_name`];
    /// otherwise the class cannot be resolved and the projection fails with
    /// [`BosonError::MissingClass`].
    fn from_record(id: RecordId, graph: &Graph) -> Result<Self> {
        let _depth = ProjectionDepth::enter()?;
        let record = graph.record(id).ok_or_else(|| {
            BosonError::InvalidData(format!("record {id} does not belong to the decoded graph"))
        })?;
        if record.class_name() != Self::class_name() {
            return Err(BosonError::MissingClass(record.class_name().to_owned()));
        }
        let mut out = Self::construct()?;
        for (name, value) in record.fields() {
            if !out.read_field(name, value, graph)? {
                tracing::warn!(
                    class = Self::class_name(),
                    field = name,
                    "field received but does not exist in the target record type"
                );
            }
        }
        Ok(out)
    }
}

/// A unit-variant enumeration that maps onto the wire's ENUM form.
///
/// Usually implemented via `#[derive(PoloEnum)]`.
pub trait PoloEnum: Sized {
    /// The wire class name.
    fn class_name() -> &'static str;

    /// The textual form written to the wire.
    fn constant(&self) -> &'static str;

    /// Resolves a constant by its textual form.
    fn from_constant(constant: &str) -> Option<Self>;
}

/// Typed record graphs nest by containment, so a projection deeper than this
/// is either runaway data or a cyclic graph, which a typed value cannot
/// represent. Cyclic graphs stay accessible through the dynamic layer.
const MAX_PROJECTION_DEPTH: usize = 128;

thread_local! {
    static PROJECTION_DEPTH: Cell<usize> = const { Cell::new(0) };
}

struct ProjectionDepth;

impl ProjectionDepth {
    fn enter() -> Result<Self> {
        PROJECTION_DEPTH.with(|depth| {
            if depth.get() >= MAX_PROJECTION_DEPTH {
                return Err(BosonError::InvalidData(
                    "record nesting exceeds the projection depth guard; the graph may be cyclic"
                        .to_owned(),
                ));
            }
            depth.set(depth.get() + 1);
            Ok(Self)
        })
    }
}

impl Drop for ProjectionDepth {
    fn drop(&mut self) {
        PROJECTION_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Why a single slot could not be filled.
///
/// Mismatches are tolerated (logged and skipped, the slot keeps its
/// constructor default); fatal errors abort the whole projection.
#[derive(Debug)]
pub enum SlotError {
    /// The decoded value does not fit the declared slot kind.
    Mismatch {
        /// What the slot expects.
        expected: &'static str,
        /// What the wire carried.
        found: &'static str,
    },
    /// A failure that must not be papered over by skipping the slot.
    Fatal(BosonError),
}

impl SlotError {
    /// Shorthand for the mismatch case.
    #[must_use]
    pub fn mismatch(expected: &'static str, found: &Value) -> Self {
        Self::Mismatch { expected, found: found.kind_name() }
    }
}

impl fmt::Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch { expected, found } => {
                write!(f, "slot expects {expected} but the wire carried {found}")
            }
            Self::Fatal(err) => err.fmt(f),
        }
    }
}

impl From<BosonError> for SlotError {
    fn from(err: BosonError) -> Self {
        Self::Fatal(err)
    }
}

/// Conversion from a field value into the wire value model.
pub trait ToValue {
    /// Converts `self`, appending any records it contains to `graph`.
    fn to_value(&self, graph: &mut Graph, options: &WriteOptions) -> Value;
}

/// Conversion from a decoded [`Value`] into a field value.
pub trait FromValue: Sized {
    /// Converts a decoded value, resolving records through `graph`.
    ///
    /// # Errors
    ///
    /// [`SlotError::Mismatch`] when the value kind does not fit;
    /// [`SlotError::Fatal`] for construction-level failures.
    fn from_value(value: &Value, graph: &Graph) -> std::result::Result<Self, SlotError>;
}

/// Assigns one decoded slot value, applying the fail-soft policy: a kind
/// mismatch keeps the constructor default and logs a warning.
///
/// Generated `read_field` implementations call this; it is not intended to
/// be called directly.
pub fn assign_field<T: FromValue>(
    slot: &mut T,
    class_name: &str,
    field: &str,
    value: &Value,
    graph: &Graph,
) -> Result<()> {
    match T::from_value(value, graph) {
        Ok(converted) => {
            *slot = converted;
            Ok(())
        }
        Err(SlotError::Mismatch { expected, found }) => {
            tracing::warn!(
                class = class_name,
                field,
                expected,
                found,
                "field value does not fit the declared slot; keeping the default"
            );
            Ok(())
        }
        Err(SlotError::Fatal(err)) => Err(err),
    }
}

macro_rules! primitive_value {
    ($rust:ty, $variant:ident, $expected:literal) => {
        impl ToValue for $rust {
            fn to_value(&self, _graph: &mut Graph, _options: &WriteOptions) -> Value {
                Value::$variant(self.clone())
            }
        }

        impl FromValue for $rust {
            fn from_value(value: &Value, _graph: &Graph) -> std::result::Result<Self, SlotError> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(SlotError::mismatch($expected, other)),
                }
            }
        }
    };
}

primitive_value!(i8, Byte, "byte");
primitive_value!(i16, Short, "short");
primitive_value!(i32, Int, "int");
primitive_value!(i64, Long, "long");
primitive_value!(f32, Float, "float");
primitive_value!(f64, Double, "double");
primitive_value!(bool, Bool, "boolean");
primitive_value!(char, Char, "char");
primitive_value!(String, String, "string");
primitive_value!(DateTime<Utc>, Timestamp, "date");
primitive_value!(NaiveDate, LocalDate, "local-date");
primitive_value!(NaiveDateTime, LocalDateTime, "local-date-time");
primitive_value!(NaiveTime, LocalTime, "local-time");
primitive_value!(TimeDelta, Duration, "duration");
primitive_value!(Period, Period, "period");
primitive_value!(Uuid, Uuid, "uuid");

impl ToValue for Value {
    fn to_value(&self, _graph: &mut Graph, _options: &WriteOptions) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value, _graph: &Graph) -> std::result::Result<Self, SlotError> {
        Ok(value.clone())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self, graph: &mut Graph, options: &WriteOptions) -> Value {
        match self {
            Some(inner) => inner.to_value(graph, options),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, graph: &Graph) -> std::result::Result<Self, SlotError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, graph).map(Some),
        }
    }
}

impl<T: ToValue> ToValue for Box<T> {
    fn to_value(&self, graph: &mut Graph, options: &WriteOptions) -> Value {
        (**self).to_value(graph, options)
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: &Value, graph: &Graph) -> std::result::Result<Self, SlotError> {
        T::from_value(value, graph).map(Box::new)
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self, graph: &mut Graph, options: &WriteOptions) -> Value {
        Value::List(self.iter().map(|item| item.to_value(graph, options)).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    /// Accepts lists, sets and native arrays alike, copying elements into
    /// the declared element type.
    fn from_value(value: &Value, graph: &Graph) -> std::result::Result<Self, SlotError> {
        let items = match value {
            Value::List(items) | Value::Set(items) | Value::Array(_, items) => items,
            other => return Err(SlotError::mismatch("list", other)),
        };
        items.iter().map(|item| T::from_value(item, graph)).collect()
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self, graph: &mut Graph, options: &WriteOptions) -> Value {
        Value::List(self.iter().map(|item| item.to_value(graph, options)).collect())
    }
}

impl<T: FromValue, const N: usize> FromValue for [T; N] {
    /// Accepts lists, sets and native arrays of exactly `N` elements.
    fn from_value(value: &Value, graph: &Graph) -> std::result::Result<Self, SlotError> {
        let items = match value {
            Value::List(items) | Value::Set(items) | Value::Array(_, items) => items,
            other => return Err(SlotError::mismatch("fixed-size array", other)),
        };
        if items.len() != N {
            return Err(SlotError::mismatch("fixed-size array of matching length", value));
        }
        let converted = items
            .iter()
            .map(|item| T::from_value(item, graph))
            .collect::<std::result::Result<Vec<T>, SlotError>>()?;
        converted
            .try_into()
            .map_err(|_| SlotError::mismatch("fixed-size array of matching length", value))
    }
}

impl<T: ToValue + Eq + Hash> ToValue for HashSet<T> {
    fn to_value(&self, graph: &mut Graph, options: &WriteOptions) -> Value {
        Value::Set(self.iter().map(|item| item.to_value(graph, options)).collect())
    }
}

impl<T: FromValue + Eq + Hash> FromValue for HashSet<T> {
    fn from_value(value: &Value, graph: &Graph) -> std::result::Result<Self, SlotError> {
        let items = match value {
            Value::Set(items) | Value::List(items) => items,
            other => return Err(SlotError::mismatch("set", other)),
        };
        items.iter().map(|item| T::from_value(item, graph)).collect()
    }
}

impl<K: ToValue, V: ToValue> ToValue for HashMap<K, V> {
    fn to_value(&self, graph: &mut Graph, options: &WriteOptions) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(graph, options), v.to_value(graph, options)))
                .collect(),
        )
    }
}

impl<K: FromValue + Eq + Hash, V: FromValue> FromValue for HashMap<K, V> {
    fn from_value(value: &Value, graph: &Graph) -> std::result::Result<Self, SlotError> {
        let entries = match value {
            Value::Map(entries) => entries,
            other => return Err(SlotError::mismatch("map", other)),
        };
        entries
            .iter()
            .map(|(k, v)| Ok((K::from_value(k, graph)?, V::from_value(v, graph)?)))
            .collect()
    }
}
