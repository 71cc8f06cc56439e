//! The encoder.
//!
//! Walks a value graph and emits tag + payload bytes per the wire grammar.
//! The dispatch ladder is the `match` in [`WriterCtx::write_value`]: a closed
//! set of runtime-kind checks, one arm per wire tag.
//!
//! Records are the only values that allocate reference ids. The writer keeps
//! an identity-keyed table ([`RecordId`] → id) for the duration of one encode
//! call; the first visit registers the record *before* descending into its
//! slots, so a slot that points back at the record emits a REFERENCE instead
//! of recursing forever.

use std::collections::HashMap;

use crate::error::{BosonError, Result, WIRE_VERSION};
use crate::graph::{Graph, RecordId};
use crate::record::Polo;
use crate::tag::Tag;
use crate::temporal::{epoch_day, format_duration, format_interval, format_local_date_time, format_local_time};
use crate::value::Value;

/// Options honoured while encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Include slots marked `#[boson(readonly)]` when building records from
    /// typed values. Off by default: a slot the decoder cannot assign back is
    /// rarely worth carrying.
    pub serialize_readonly: bool,
}

/// Builder-style entry point for encoding.
///
/// ```
/// use boson::{Encoder, Graph, Value};
///
/// let bytes = Encoder::new()
///     .serialize_readonly(true)
///     .encode(&Value::Int(7), &Graph::new())?;
/// assert_eq!(bytes[0], 1); // version byte
/// # Ok::<(), boson::BosonError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: WriteOptions,
}

impl Encoder {
    /// Creates an encoder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles [`WriteOptions::serialize_readonly`].
    #[must_use]
    pub fn serialize_readonly(mut self, on: bool) -> Self {
        self.options.serialize_readonly = on;
        self
    }

    /// Encodes one value (and the records it reaches through `graph`) into a
    /// self-contained byte message.
    ///
    /// # Errors
    ///
    /// [`BosonError::UnsupportedValue`] for values the wire cannot carry,
    /// [`BosonError::InvalidData`] for structural problems such as a
    /// [`RecordId`] that does not belong to `graph`.
    pub fn encode(&self, root: &Value, graph: &Graph) -> Result<Vec<u8>> {
        let mut ctx = WriterCtx::new(graph);
        ctx.buf.push(WIRE_VERSION);
        ctx.write_value(root)?;
        Ok(ctx.buf)
    }

    /// Converts a typed record value into a fresh graph and encodes it.
    pub fn encode_record<T: Polo>(&self, value: &T) -> Result<Vec<u8>> {
        let mut graph = Graph::new();
        let id = value.to_record(&mut graph, &self.options);
        self.encode(&Value::Record(id), &graph)
    }
}

/// Per-call encoder state: output buffer plus the reference table. Created
/// for one top-level encode and discarded on completion.
struct WriterCtx<'g> {
    graph: &'g Graph,
    buf: Vec<u8>,
    references: HashMap<RecordId, i32>,
    next_reference: i32,
}

impl<'g> WriterCtx<'g> {
    fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            buf: Vec::new(),
            references: HashMap::new(),
            next_reference: 0,
        }
    }

    fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.put_tag(Tag::Null),
            Value::Byte(v) => {
                self.put_tag(Tag::Byte);
                self.buf.push(*v as u8);
            }
            Value::Short(v) => {
                self.put_tag(Tag::Short);
                self.buf.extend_from_slice(&v.to_be_bytes());
            }
            Value::Int(v) => {
                self.put_tag(Tag::Int);
                self.buf.extend_from_slice(&v.to_be_bytes());
            }
            Value::Long(v) => {
                self.put_tag(Tag::Long);
                self.buf.extend_from_slice(&v.to_be_bytes());
            }
            Value::Float(v) => {
                self.put_tag(Tag::Float);
                self.buf.extend_from_slice(&v.to_be_bytes());
            }
            Value::Double(v) => {
                self.put_tag(Tag::Double);
                self.buf.extend_from_slice(&v.to_be_bytes());
            }
            Value::Bool(v) => {
                self.put_tag(Tag::Boolean);
                self.buf.push(u8::from(*v));
            }
            Value::Char(c) => {
                let unit = u16::try_from(u32::from(*c)).map_err(|_| {
                    BosonError::UnsupportedValue(format!(
                        "char {c:?} is outside the basic multilingual plane"
                    ))
                })?;
                self.put_tag(Tag::Char);
                self.buf.extend_from_slice(&unit.to_be_bytes());
            }
            Value::String(s) => self.write_string(s)?,
            Value::Bytes(bytes) => {
                self.put_tag(Tag::ByteArray);
                self.put_len(bytes.len())?;
                self.buf.extend_from_slice(bytes);
            }
            Value::List(items) => {
                self.put_tag(Tag::List);
                self.put_len(items.len())?;
                for item in items {
                    self.write_value(item)?;
                }
            }
            Value::Set(items) => {
                self.put_tag(Tag::Set);
                self.put_len(items.len())?;
                for item in items {
                    self.write_value(item)?;
                }
            }
            Value::Map(entries) => {
                self.put_tag(Tag::Map);
                self.put_len(entries.len())?;
                for (key, val) in entries {
                    self.write_value(key)?;
                    self.write_value(val)?;
                }
            }
            Value::Array(component, items) => {
                if let Some(off) = items.iter().find(|item| !component.admits(item)) {
                    return Err(BosonError::UnsupportedValue(format!(
                        "{} element in an array of component type {}",
                        off.kind_name(),
                        component.name()
                    )));
                }
                self.put_tag(Tag::Array);
                self.put_len(items.len())?;
                self.write_string(component.name())?;
                for item in items {
                    self.write_value(item)?;
                }
            }
            Value::Enum { class_name, constant } => {
                self.put_tag(Tag::Enum);
                self.write_string(class_name)?;
                self.write_string(constant)?;
            }
            Value::Record(id) => self.write_record(*id)?,
            Value::Timestamp(instant) => {
                self.put_tag(Tag::Date);
                self.buf.extend_from_slice(&instant.timestamp_millis().to_be_bytes());
            }
            Value::LocalDate(date) => {
                self.put_tag(Tag::LocalDate);
                self.buf.extend_from_slice(&epoch_day(*date).to_be_bytes());
            }
            Value::LocalDateTime(dt) => {
                self.put_tag(Tag::LocalDateTime);
                self.write_string(&format_local_date_time(*dt))?;
            }
            Value::LocalTime(t) => {
                self.put_tag(Tag::LocalTime);
                self.write_string(&format_local_time(*t))?;
            }
            Value::Duration(d) => {
                self.put_tag(Tag::Duration);
                self.write_string(&format_duration(*d))?;
            }
            Value::Period(p) => {
                self.put_tag(Tag::Period);
                self.write_string(&p.to_string())?;
            }
            Value::Interval { start, end } => {
                self.put_tag(Tag::JodaInterval);
                self.write_string(&format_interval(*start, *end))?;
            }
            Value::Uuid(uuid) => {
                self.put_tag(Tag::Uuid);
                self.buf.extend_from_slice(uuid.as_bytes());
            }
        }
        Ok(())
    }

    /// First visit registers the record and writes it in full; every further
    /// visit of the same identity is a back-reference.
    fn write_record(&mut self, id: RecordId) -> Result<()> {
        if let Some(&reference) = self.references.get(&id) {
            self.put_tag(Tag::Reference);
            self.buf.extend_from_slice(&reference.to_be_bytes());
            return Ok(());
        }
        let record = self.graph.record(id).ok_or_else(|| {
            BosonError::InvalidData(format!(
                "record {id} does not belong to the graph being encoded"
            ))
        })?;

        let reference = self.next_reference;
        self.next_reference += 1;
        // Register before descending: a slot pointing back here must see
        // the entry.
        self.references.insert(id, reference);

        self.put_tag(Tag::Record);
        self.buf.extend_from_slice(&reference.to_be_bytes());
        self.write_string(record.class_name())?;
        self.put_len(record.len())?;
        for (name, value) in record.fields() {
            self.write_string(name)?;
            self.write_value(value)?;
        }
        Ok(())
    }

    /// The string encoding: tag, UTF-8 byte count, bytes. Used verbatim
    /// wherever the grammar says "string".
    fn write_string(&mut self, s: &str) -> Result<()> {
        self.put_tag(Tag::String);
        self.put_len(s.len())?;
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn put_tag(&mut self, tag: Tag) {
        self.buf.push(tag.id());
    }

    fn put_len(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len)
            .map_err(|_| BosonError::UnsupportedValue(format!("length {len} exceeds int32")))?;
        self.buf.extend_from_slice(&len.to_be_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Record;
    use crate::value::ComponentType;

    fn encode(value: &Value) -> Vec<u8> {
        Encoder::new()
            .encode(value, &Graph::new())
            .expect("encodable")
    }

    #[test]
    fn every_message_starts_with_the_version_byte() {
        assert_eq!(encode(&Value::Null), vec![1, 9]);
    }

    #[test]
    fn string_prefix_counts_utf8_bytes() {
        // 'é' is two bytes in UTF-8 but one code point.
        let bytes = encode(&Value::String("é".into()));
        assert_eq!(&bytes[1..6], &[10, 0, 0, 0, 2]);
        assert_eq!(bytes.len(), 8);
    }

    #[test]
    fn non_bmp_chars_are_rejected() {
        let err = Encoder::new()
            .encode(&Value::Char('🦀'), &Graph::new())
            .expect_err("not encodable");
        assert!(matches!(err, BosonError::UnsupportedValue(_)));
    }

    #[test]
    fn primitive_arrays_reject_mismatched_elements() {
        let bad = Value::Array(ComponentType::Int, vec![Value::Int(1), Value::Long(2)]);
        let err = Encoder::new()
            .encode(&bad, &Graph::new())
            .expect_err("mismatched element");
        assert!(matches!(err, BosonError::UnsupportedValue(_)));
    }

    #[test]
    fn foreign_record_ids_are_rejected() {
        let mut other = Graph::new();
        let id = other.add_record(Record::new("Orphan"));
        let err = Encoder::new()
            .encode(&Value::Record(id), &Graph::new())
            .expect_err("id from another graph");
        assert!(matches!(err, BosonError::InvalidData(_)));
    }

    #[test]
    fn repeat_visits_emit_references_not_bodies() {
        let mut graph = Graph::new();
        let inner = graph.add_record(Record::new("Inner"));
        let mut outer = Record::new("Outer");
        outer.set("first", Value::Record(inner));
        outer.set("second", Value::Record(inner));
        let outer = graph.add_record(outer);

        let bytes = Encoder::new()
            .encode(&Value::Record(outer), &graph)
            .expect("encodable");
        let record_tags = bytes.iter().filter(|b| **b == 14).count();
        let reference_tags = bytes.iter().filter(|b| **b == 15).count();
        assert_eq!(record_tags, 2, "inner body must be written once");
        assert_eq!(reference_tags, 1, "second slot must be a back-reference");
    }
}
