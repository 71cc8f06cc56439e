//! The decoder.
//!
//! Reads one version byte, then a single payload via the tag dispatcher — a
//! closed `match` over [`Tag`]. Values reconstruct in the order they are
//! read; records land in a fresh [`Graph`] and are registered in the
//! reference table *before* their slots are read, so a slot whose payload is
//! a REFERENCE to the record itself resolves to the record being built.
//!
//! Legacy temporal tags (25–31) decode onto the same value kinds as their
//! plain counterparts; the stream stays readable, the re-encoded form uses
//! the canonical tags.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use crate::error::{BosonError, Result, WIRE_VERSION};
use crate::graph::{Graph, Record, RecordId};
use crate::io::{Input, MAX_PREALLOC};
use crate::record::Polo;
use crate::tag::Tag;
use crate::temporal::{
    date_from_epoch_day, instant_from_millis, parse_duration, parse_interval, parse_local_date,
    parse_local_date_time, parse_local_time,
};
use crate::value::{ComponentType, Value};

/// Options honoured while decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Decode records into string-keyed [`Value::Map`]s instead of arena
    /// records. Shared substructure is duplicated (maps carry no identity)
    /// and a cyclic graph fails with [`BosonError::InvalidData`].
    pub records_as_maps: bool,
}

/// Builder-style entry point for decoding.
///
/// ```
/// use boson::{Decoder, Value};
///
/// let decoded = Decoder::new().decode(&[1, 3, 0, 0, 0, 42])?;
/// assert_eq!(decoded.root, Value::Int(42));
/// # Ok::<(), boson::BosonError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: ReadOptions,
}

/// The result of a decode: the root value plus the arena owning every record
/// the message carried.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// The decoded top-level value.
    pub root: Value,
    /// Owner of the records reachable from [`Decoded::root`].
    pub graph: Graph,
}

impl Decoded {
    /// Projects the root record onto a typed record.
    ///
    /// # Errors
    ///
    /// [`BosonError::InvalidData`] when the root is not a record, plus
    /// whatever the typed projection itself surfaces.
    pub fn root_as<T: Polo>(&self) -> Result<T> {
        match &self.root {
            Value::Record(id) => T::from_record(*id, &self.graph),
            other => Err(BosonError::InvalidData(format!(
                "expected a record at the root, found {}",
                other.kind_name()
            ))),
        }
    }
}

impl Decoder {
    /// Creates a decoder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles [`ReadOptions::records_as_maps`].
    #[must_use]
    pub fn records_as_maps(mut self, on: bool) -> Self {
        self.options.records_as_maps = on;
        self
    }

    /// Decodes a complete message from a byte slice.
    pub fn decode(&self, bytes: &[u8]) -> Result<Decoded> {
        self.decode_from(bytes)
    }

    /// Decodes a complete message from a blocking stream.
    ///
    /// # Errors
    ///
    /// [`BosonError::VersionMismatch`] when the stream does not start with
    /// the version byte, [`BosonError::UnsupportedTag`] for undefined tags,
    /// [`BosonError::Truncated`] when a payload runs off the end of input,
    /// [`BosonError::DanglingReference`] for references to unregistered ids.
    pub fn decode_from<R: Read>(&self, reader: R) -> Result<Decoded> {
        let mut ctx = ReaderCtx::new(reader);
        let version = ctx.input.read_u8()?;
        if version != WIRE_VERSION {
            return Err(BosonError::VersionMismatch { found: version });
        }
        let root = ctx.read_value()?;
        let decoded = Decoded { root, graph: ctx.graph };
        if self.options.records_as_maps {
            return decoded.into_maps();
        }
        Ok(decoded)
    }
}

/// Per-call decoder state: input, the graph being built, and the reference
/// table from wire id to arena id. Discarded when the call returns.
struct ReaderCtx<R> {
    input: Input<R>,
    graph: Graph,
    references: HashMap<i32, RecordId>,
}

impl<R: Read> ReaderCtx<R> {
    fn new(reader: R) -> Self {
        Self {
            input: Input::new(reader),
            graph: Graph::new(),
            references: HashMap::new(),
        }
    }

    fn read_value(&mut self) -> Result<Value> {
        let tag = Tag::from_byte(self.input.read_u8()?)?;
        self.read_body(tag)
    }

    fn read_body(&mut self, tag: Tag) -> Result<Value> {
        Ok(match tag {
            Tag::Null => Value::Null,
            Tag::Byte => Value::Byte(self.input.read_i8()?),
            Tag::Short => Value::Short(self.input.read_i16()?),
            Tag::Int => Value::Int(self.input.read_i32()?),
            Tag::Long => Value::Long(self.input.read_i64()?),
            Tag::Float => Value::Float(self.input.read_f32()?),
            Tag::Double => Value::Double(self.input.read_f64()?),
            Tag::Boolean => Value::Bool(self.input.read_u8()? != 0),
            Tag::Char => {
                let unit = self.input.read_u16()?;
                let c = char::from_u32(u32::from(unit)).ok_or_else(|| {
                    BosonError::InvalidData(format!(
                        "code unit {unit:#06x} is a surrogate, not a character"
                    ))
                })?;
                Value::Char(c)
            }
            Tag::String => Value::String(self.read_string_body()?),
            Tag::ByteArray => {
                let len = self.input.read_len()?;
                Value::Bytes(self.input.read_bytes(len)?)
            }
            Tag::List => Value::List(self.read_elements()?),
            Tag::Set => Value::Set(self.read_elements()?),
            Tag::Map => {
                let len = self.input.read_len()?;
                let mut entries = Vec::with_capacity(len.min(MAX_PREALLOC));
                for _ in 0..len {
                    let key = self.read_value()?;
                    let value = self.read_value()?;
                    entries.push((key, value));
                }
                Value::Map(entries)
            }
            Tag::Array => {
                let len = self.input.read_len()?;
                let component = ComponentType::from_name(&self.read_string()?);
                let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
                for _ in 0..len {
                    items.push(self.read_value()?);
                }
                Value::Array(component, items)
            }
            Tag::Record => self.read_record()?,
            Tag::Reference => {
                let reference = self.input.read_i32()?;
                let id = self
                    .references
                    .get(&reference)
                    .copied()
                    .ok_or(BosonError::DanglingReference(reference))?;
                Value::Record(id)
            }
            Tag::Enum => {
                let class_name = self.read_string()?;
                let constant = self.read_string()?;
                Value::Enum { class_name, constant }
            }
            Tag::Date | Tag::JodaDateTime => {
                Value::Timestamp(instant_from_millis(self.input.read_i64()?)?)
            }
            Tag::LocalDate => Value::LocalDate(date_from_epoch_day(self.input.read_i64()?)?),
            Tag::JodaLocalDate => Value::LocalDate(parse_local_date(&self.read_string()?)?),
            Tag::LocalDateTime | Tag::JodaLocalDateTime => {
                Value::LocalDateTime(parse_local_date_time(&self.read_string()?)?)
            }
            Tag::LocalTime | Tag::JodaLocalTime => {
                Value::LocalTime(parse_local_time(&self.read_string()?)?)
            }
            Tag::Duration | Tag::JodaDuration => {
                Value::Duration(parse_duration(&self.read_string()?)?)
            }
            Tag::Period | Tag::JodaPeriod => Value::Period(self.read_string()?.parse()?),
            Tag::JodaInterval => {
                let (start, end) = parse_interval(&self.read_string()?)?;
                Value::Interval { start, end }
            }
            Tag::Uuid => {
                let bytes = self.input.read_bytes(16)?;
                let bytes: [u8; 16] = bytes.as_slice().try_into().map_err(|_| {
                    BosonError::InvalidData("uuid payload must be 16 bytes".to_owned())
                })?;
                Value::Uuid(uuid::Uuid::from_bytes(bytes))
            }
        })
    }

    /// The ordering here is load-bearing: the record is allocated and
    /// registered under its wire id before any slot payload is read.
    fn read_record(&mut self) -> Result<Value> {
        let reference = self.input.read_i32()?;
        let class_name = self.read_string()?;
        if class_name.is_empty() {
            return Err(BosonError::InvalidData(
                "a record cannot be decoded without its fully qualified class name".to_owned(),
            ));
        }
        let count = self.input.read_len()?;

        let id = self.graph.add_record(Record::new(class_name));
        self.references.insert(reference, id);

        for _ in 0..count {
            let name = self.read_string()?;
            let value = self.read_value()?;
            if let Some(record) = self.graph.record_mut(id) {
                record.set(name, value);
            }
        }
        Ok(Value::Record(id))
    }

    fn read_elements(&mut self) -> Result<Vec<Value>> {
        let len = self.input.read_len()?;
        let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            items.push(self.read_value()?);
        }
        Ok(items)
    }

    /// Reads a full string payload where the grammar requires one; any other
    /// tag in that position is structural corruption.
    fn read_string(&mut self) -> Result<String> {
        let tag = self.input.read_u8()?;
        if tag != Tag::String.id() {
            return Err(BosonError::InvalidData(format!(
                "expected a string payload, found tag {tag}"
            )));
        }
        self.read_string_body()
    }

    fn read_string_body(&mut self) -> Result<String> {
        let len = self.input.read_len()?;
        let bytes = self.input.read_bytes(len)?;
        String::from_utf8(bytes)
            .map_err(|e| BosonError::InvalidData(format!("string payload is not UTF-8: {e}")))
    }
}

impl Decoded {
    /// Materializes every record as a string-keyed map, recursively.
    fn into_maps(self) -> Result<Self> {
        let mut in_progress = HashSet::new();
        let root = map_value(&self.root, &self.graph, &mut in_progress)?;
        Ok(Self { root, graph: Graph::new() })
    }
}

fn map_value(value: &Value, graph: &Graph, in_progress: &mut HashSet<RecordId>) -> Result<Value> {
    Ok(match value {
        Value::Record(id) => {
            if !in_progress.insert(*id) {
                return Err(BosonError::InvalidData(
                    "cyclic record graph cannot be decoded as maps".to_owned(),
                ));
            }
            let record = graph.record(*id).ok_or(BosonError::DanglingReference(
                i32::try_from(id.as_u32()).unwrap_or(i32::MAX),
            ))?;
            let mut entries = Vec::with_capacity(record.len());
            for (name, slot) in record.fields() {
                entries.push((
                    Value::String(name.to_owned()),
                    map_value(slot, graph, in_progress)?,
                ));
            }
            in_progress.remove(id);
            Value::Map(entries)
        }
        Value::List(items) => Value::List(map_values(items, graph, in_progress)?),
        Value::Set(items) => Value::Set(map_values(items, graph, in_progress)?),
        Value::Array(component, items) => {
            Value::Array(component.clone(), map_values(items, graph, in_progress)?)
        }
        Value::Map(entries) => {
            let mut out = Vec::with_capacity(entries.len());
            for (key, val) in entries {
                out.push((
                    map_value(key, graph, in_progress)?,
                    map_value(val, graph, in_progress)?,
                ));
            }
            Value::Map(out)
        }
        other => other.clone(),
    })
}

fn map_values(items: &[Value], graph: &Graph, in_progress: &mut HashSet<RecordId>) -> Result<Vec<Value>> {
    items
        .iter()
        .map(|item| map_value(item, graph, in_progress))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_version_byte_is_rejected() {
        let err = Decoder::new().decode(&[2, 9]).expect_err("version 2");
        assert!(matches!(err, BosonError::VersionMismatch { found: 2 }));
    }

    #[test]
    fn undefined_tags_are_rejected() {
        let err = Decoder::new().decode(&[1, 99]).expect_err("tag 99");
        assert!(matches!(err, BosonError::UnsupportedTag(99)));
    }

    #[test]
    fn payloads_running_off_the_input_are_truncation() {
        let err = Decoder::new().decode(&[1, 4, 0, 0]).expect_err("short long");
        assert!(matches!(err, BosonError::Truncated));
    }

    #[test]
    fn references_to_unknown_ids_are_dangling() {
        let err = Decoder::new()
            .decode(&[1, 15, 0, 0, 0, 7])
            .expect_err("nothing registered");
        assert!(matches!(err, BosonError::DanglingReference(7)));
    }

    #[test]
    fn any_nonzero_boolean_byte_is_true() {
        let decoded = Decoder::new().decode(&[1, 7, 0x5a]).expect("boolean");
        assert_eq!(decoded.root, Value::Bool(true));
    }

    #[test]
    fn surrogate_code_units_are_invalid() {
        let err = Decoder::new()
            .decode(&[1, 8, 0xd8, 0x00])
            .expect_err("surrogate");
        assert!(matches!(err, BosonError::InvalidData(_)));
    }

    #[test]
    fn a_non_string_where_a_class_name_belongs_is_invalid() {
        // RECORD, ref 0, then an int where the class name string should be.
        let err = Decoder::new()
            .decode(&[1, 14, 0, 0, 0, 0, 3, 0, 0, 0, 1])
            .expect_err("int as class name");
        assert!(matches!(err, BosonError::InvalidData(_)));
    }
}
