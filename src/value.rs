//! The dynamic value model.
//!
//! [`Value`] is the closed set of kinds the wire grammar can carry. The
//! encoder dispatches on the variant; the decoder reconstructs variants from
//! tag bytes. Records are not stored inline — a [`Value::Record`] is an index
//! into a [`Graph`](crate::Graph), which is what lets one value graph hold
//! cycles and shared substructure without reference-counted loops.
//!
//! # Equality
//!
//! `PartialEq` is structural, with two deliberate exceptions: `Map` entries
//! and `Set` elements compare without regard to order, because the wire
//! assigns no meaning to their ordering. Two records are equal when they are
//! the *same* record (same arena index); field-wise comparison is a
//! [`Graph`](crate::Graph) concern.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::graph::RecordId;
use crate::temporal::Period;

/// A single value in a Boson graph.
#[derive(Debug, Clone)]
pub enum Value {
    /// The null value.
    Null,
    /// Signed 8-bit integer.
    Byte(i8),
    /// Signed 16-bit integer.
    Short(i16),
    /// Signed 32-bit integer.
    Int(i32),
    /// Signed 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Boolean.
    Bool(bool),
    /// A single UTF-16 code unit on the wire; values outside the basic
    /// multilingual plane cannot be encoded.
    Char(char),
    /// UTF-8 string, length-prefixed by byte count.
    String(String),
    /// Raw bytes, written without per-element tags.
    Bytes(Vec<u8>),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Unordered collection of unique elements.
    Set(Vec<Value>),
    /// Key/value pairs; keys may be any payload, so entries are kept as
    /// pairs rather than forced through a hash requirement.
    Map(Vec<(Value, Value)>),
    /// Fixed-size native array with an explicit component type.
    Array(ComponentType, Vec<Value>),
    /// An enumeration constant, carried as class name + constant name.
    Enum {
        /// Wire class name of the enumeration.
        class_name: String,
        /// Textual form of the constant.
        constant: String,
    },
    /// A record, stored in the owning [`Graph`](crate::Graph).
    Record(RecordId),
    /// An instant, millisecond precision.
    Timestamp(DateTime<Utc>),
    /// A calendar date.
    LocalDate(NaiveDate),
    /// A date-time without zone.
    LocalDateTime(NaiveDateTime),
    /// A time of day without zone.
    LocalTime(NaiveTime),
    /// A seconds-based amount of time.
    Duration(TimeDelta),
    /// A date-based amount of time.
    Period(Period),
    /// A pair of instants.
    Interval {
        /// Start of the interval.
        start: DateTime<Utc>,
        /// End of the interval.
        end: DateTime<Utc>,
    },
    /// A UUID, carried as 16 bytes in network order.
    Uuid(Uuid),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl Value {
    /// A short name for the variant, used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Byte(_) => "byte",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Bool(_) => "boolean",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Bytes(_) => "byte-array",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Array(..) => "array",
            Self::Enum { .. } => "enum",
            Self::Record(_) => "record",
            Self::Timestamp(_) => "date",
            Self::LocalDate(_) => "local-date",
            Self::LocalDateTime(_) => "local-date-time",
            Self::LocalTime(_) => "local-time",
            Self::Duration(_) => "duration",
            Self::Period(_) => "period",
            Self::Interval { .. } => "interval",
            Self::Uuid(_) => "uuid",
        }
    }

    /// True for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The boolean, if this is a [`Value::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The 32-bit integer, if this is a [`Value::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The 64-bit integer, if this is a [`Value::Long`].
    #[must_use]
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(i) => Some(*i),
            _ => None,
        }
    }

    /// The 64-bit float, if this is a [`Value::Double`].
    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// The string slice, if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The raw bytes, if this is a [`Value::Bytes`].
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The list elements, if this is a [`Value::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The map entries, if this is a [`Value::Map`].
    #[must_use]
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// The record id, if this is a [`Value::Record`].
    #[must_use]
    pub fn as_record(&self) -> Option<RecordId> {
        match self {
            Self::Record(id) => Some(*id),
            _ => None,
        }
    }

    /// Looks a key up in a [`Value::Map`] by string key.
    #[must_use]
    pub fn get_entry(&self, key: &str) -> Option<&Value> {
        self.as_map()?.iter().find_map(|(k, v)| match k {
            Self::String(s) if s == key => Some(v),
            _ => None,
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => unordered_eq(a, b),
            (Self::Map(a), Self::Map(b)) => unordered_pairs_eq(a, b),
            (Self::Array(ca, a), Self::Array(cb, b)) => ca == cb && a == b,
            (
                Self::Enum { class_name: ca, constant: na },
                Self::Enum { class_name: cb, constant: nb },
            ) => ca == cb && na == nb,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::LocalDate(a), Self::LocalDate(b)) => a == b,
            (Self::LocalDateTime(a), Self::LocalDateTime(b)) => a == b,
            (Self::LocalTime(a), Self::LocalTime(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Period(a), Self::Period(b)) => a == b,
            (Self::Interval { start: sa, end: ea }, Self::Interval { start: sb, end: eb }) => {
                sa == sb && ea == eb
            }
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            _ => false,
        }
    }
}

/// Element-wise equality that ignores ordering. Quadratic, which is fine for
/// the element counts sets on a wire realistically carry.
fn unordered_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len()
        && a.iter().all(|x| b.contains(x))
        && b.iter().all(|x| a.contains(x))
}

fn unordered_pairs_eq(a: &[(Value, Value)], b: &[(Value, Value)]) -> bool {
    a.len() == b.len()
        && a.iter().all(|pair| b.contains(pair))
        && b.iter().all(|pair| a.contains(pair))
}

/// The element kind of a native fixed-size array.
///
/// The wire carries the component type as a name string so a decoder can
/// allocate an array of the right element kind. Names written by this crate
/// are the canonical spellings below; the Java spellings (`int`,
/// `java.lang.Integer`, `java.lang.String`, …) are accepted when reading
/// version 1 streams produced elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// Signed 8-bit integers.
    Byte,
    /// Signed 16-bit integers.
    Short,
    /// Signed 32-bit integers.
    Int,
    /// Signed 64-bit integers.
    Long,
    /// 32-bit floats.
    Float,
    /// 64-bit floats.
    Double,
    /// Booleans.
    Bool,
    /// UTF-16 code units.
    Char,
    /// Strings.
    String,
    /// Any component type this crate has no native kind for; the name is
    /// preserved verbatim so the stream re-encodes unchanged.
    Other(std::string::String),
}

impl ComponentType {
    /// The name written to the wire.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "boolean",
            Self::Char => "char",
            Self::String => "string",
            Self::Other(name) => name,
        }
    }

    /// Resolves a component-type name read from the wire.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "byte" | "java.lang.Byte" => Self::Byte,
            "short" | "java.lang.Short" => Self::Short,
            "int" | "java.lang.Integer" => Self::Int,
            "long" | "java.lang.Long" => Self::Long,
            "float" | "java.lang.Float" => Self::Float,
            "double" | "java.lang.Double" => Self::Double,
            "boolean" | "java.lang.Boolean" => Self::Bool,
            "char" | "java.lang.Character" => Self::Char,
            "string" | "java.lang.String" => Self::String,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Whether a value may appear as an element of an array with this
    /// component type. [`ComponentType::Other`] accepts anything.
    #[must_use]
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Other(_), _) | (_, Value::Null) => true,
            (Self::Byte, Value::Byte(_))
            | (Self::Short, Value::Short(_))
            | (Self::Int, Value::Int(_))
            | (Self::Long, Value::Long(_))
            | (Self::Float, Value::Float(_))
            | (Self::Double, Value::Double(_))
            | (Self::Bool, Value::Bool(_))
            | (Self::Char, Value::Char(_))
            | (Self::String, Value::String(_)) => true,
            _ => false,
        }
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Short(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        Self::Record(id)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::LocalDate(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::LocalDateTime(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Self::LocalTime(v)
    }
}

impl From<TimeDelta> for Value {
    fn from(v: TimeDelta) -> Self {
        Self::Duration(v)
    }
}

impl From<Period> for Value {
    fn from(v: Period) -> Self {
        Self::Period(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}
