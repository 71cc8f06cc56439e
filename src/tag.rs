//! The wire tag registry.
//!
//! Every payload begins with a single tag byte that fixes the layout of what
//! follows. The byte values are part of the protocol and must never change.

use crate::error::{BosonError, Result};

/// One-byte type codes prefixing every payload.
///
/// The `Joda*` tags exist for interoperability with version 1 streams written
/// by the original implementation; this crate decodes them onto the same value
/// kinds as their plain counterparts and never emits them (except
/// [`Tag::JodaInterval`], which has no plain twin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Signed 8-bit integer.
    Byte = 1,
    /// Signed 16-bit integer, big-endian.
    Short = 2,
    /// Signed 32-bit integer, big-endian.
    Int = 3,
    /// Signed 64-bit integer, big-endian.
    Long = 4,
    /// IEEE-754 single, big-endian.
    Float = 5,
    /// IEEE-754 double, big-endian.
    Double = 6,
    /// One byte; any non-zero value decodes to true.
    Boolean = 7,
    /// UTF-16 code unit, big-endian.
    Char = 8,
    /// Empty payload.
    Null = 9,
    /// int32 byte count followed by UTF-8 bytes.
    String = 10,
    /// int32 length, component-type-name string, then per-element payloads.
    Array = 11,
    /// int32 length then per-element payloads.
    List = 12,
    /// int32 pair count then alternating key/value payloads.
    Map = 13,
    /// A record: reference id, class name, field count, then named fields.
    Record = 14,
    /// Back-pointer to a previously written record.
    Reference = 15,
    /// int32 length then per-element payloads.
    Set = 16,
    /// Class name string then constant name string.
    Enum = 17,
    /// int32 length then raw bytes, no per-element tags.
    ByteArray = 18,
    /// int64 epoch milliseconds.
    Date = 19,
    /// int64 epoch day count.
    LocalDate = 20,
    /// ISO-8601 string.
    LocalDateTime = 21,
    /// ISO-8601 string.
    LocalTime = 22,
    /// ISO-8601 seconds-based string, e.g. `PT8H6M12.345S`.
    Duration = 23,
    /// ISO-8601 date-based string, e.g. `P6Y3M1D`.
    Period = 24,
    /// int64 epoch milliseconds (legacy twin of [`Tag::Date`]).
    JodaDateTime = 25,
    /// ISO-8601 date string (legacy; note the plain tag carries an epoch day).
    JodaLocalDate = 26,
    /// ISO-8601 string.
    JodaLocalTime = 27,
    /// ISO-8601 string.
    JodaLocalDateTime = 28,
    /// ISO-8601 string.
    JodaDuration = 29,
    /// ISO-8601 `start/end` instant pair.
    JodaInterval = 30,
    /// ISO-8601 string.
    JodaPeriod = 31,
    /// Two int64 halves, most significant first (16 bytes network order).
    Uuid = 32,
}

impl Tag {
    /// The tag's wire byte.
    #[must_use]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Looks a byte up in the tag table.
    ///
    /// # Errors
    ///
    /// [`BosonError::UnsupportedTag`] if the byte is outside the defined set.
    pub fn from_byte(byte: u8) -> Result<Self> {
        Ok(match byte {
            1 => Self::Byte,
            2 => Self::Short,
            3 => Self::Int,
            4 => Self::Long,
            5 => Self::Float,
            6 => Self::Double,
            7 => Self::Boolean,
            8 => Self::Char,
            9 => Self::Null,
            10 => Self::String,
            11 => Self::Array,
            12 => Self::List,
            13 => Self::Map,
            14 => Self::Record,
            15 => Self::Reference,
            16 => Self::Set,
            17 => Self::Enum,
            18 => Self::ByteArray,
            19 => Self::Date,
            20 => Self::LocalDate,
            21 => Self::LocalDateTime,
            22 => Self::LocalTime,
            23 => Self::Duration,
            24 => Self::Period,
            25 => Self::JodaDateTime,
            26 => Self::JodaLocalDate,
            27 => Self::JodaLocalTime,
            28 => Self::JodaLocalDateTime,
            29 => Self::JodaDuration,
            30 => Self::JodaInterval,
            31 => Self::JodaPeriod,
            32 => Self::Uuid,
            other => return Err(BosonError::UnsupportedTag(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_round_trips_through_its_byte() {
        for byte in 1..=32u8 {
            let tag = Tag::from_byte(byte).expect("byte in defined range");
            assert_eq!(tag.id(), byte);
        }
    }

    #[test]
    fn bytes_outside_the_table_are_rejected() {
        for byte in [0u8, 33, 0x7f, 0xff] {
            assert!(matches!(
                Tag::from_byte(byte),
                Err(BosonError::UnsupportedTag(b)) if b == byte
            ));
        }
    }
}
