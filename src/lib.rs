//! # Boson
//!
//! A self-describing, language-independent binary serialization protocol for
//! arbitrary in-memory object graphs — including graphs containing cycles.
//!
//! ## Overview
//!
//! Boson treats a message as one value whose payload is prefixed by a
//! one-byte type tag; containers nest payloads, so every message is fully
//! self-describing. What sets it apart from row-oriented formats is the
//! record path: records carry an integer reference id, and every *further*
//! occurrence of the same record is written as a back-reference to that id.
//! Cycles and shared substructure therefore cost four bytes instead of a
//! stack overflow.
//!
//! ### Key properties
//!
//! *   **Cycle-safe:** a record may reference itself, its parents, or its
//!     siblings; decoding reproduces the exact sharing structure.
//! *   **Self-describing:** no schema is needed to decode a message; typed
//!     projection onto your own structs is a separate, optional step.
//! *   **Interoperable:** the wire format is version 1 of the Boson
//!     protocol; all multi-byte scalars are big-endian, strings are
//!     length-prefixed UTF-8.
//! *   **No panics:** every failure is a [`BosonError`]; the crate denies
//!     `unwrap` and `panic` in library code.
//!
//! ## Architecture
//!
//! Records live in an arena — the [`Graph`] — and values refer to them by
//! [`RecordId`]. Identity is index equality, which is what the encoder's
//! reference table keys on and what makes cyclic graphs expressible without
//! reference-counted loops. The encoder ([`Encoder`]) walks a value and its
//! graph, dispatching on the value's kind; the decoder ([`Decoder`]) reads a
//! version byte and then reconstructs values by tag, registering each record
//! in its reference table *before* reading the record's slots so that
//! self-references resolve.
//!
//! The typed layer ([`Polo`], [`PoloEnum`], `#[derive(Polo)]`) maps structs
//! and unit enums onto records with per-slot directives for renaming and
//! exclusion; slot descriptors are generated at compile time and cached
//! process-wide.
//!
//! ## Dynamic values
//!
//! ```
//! use boson::{Graph, Record, Value};
//!
//! let mut graph = Graph::new();
//! let node = graph.add_record(Record::new("Node"));
//! graph[node].set("label", Value::String("root".into()));
//! graph[node].set("next", Value::Record(node)); // a self-cycle
//!
//! let bytes = boson::encode(&Value::Record(node), &graph)?;
//! let decoded = boson::decode(&bytes)?;
//!
//! let root = decoded.root.as_record().expect("root is a record");
//! assert_eq!(decoded.graph[root].get("next"), Some(&Value::Record(root)));
//! # Ok::<(), boson::BosonError>(())
//! ```
//!
//! ## Typed records
//!
//! ```
//! use boson::Polo;
//!
//! #[derive(Polo, Default, Debug, PartialEq)]
//! struct User {
//!     name: String,
//!     #[boson(rename = "mail")]
//!     email: String,
//!     #[boson(ignore)]
//!     session_token: String,
//! }
//!
//! let user = User {
//!     name: "Courtney".into(),
//!     email: "c@example.com".into(),
//!     session_token: "do-not-ship".into(),
//! };
//! let bytes = boson::encode_record(&user)?;
//! let back: User = boson::decode_record(&bytes)?;
//! assert_eq!(back.name, user.name);
//! assert_eq!(back.email, user.email);
//! assert_eq!(back.session_token, ""); // ignored slots keep their default
//! # Ok::<(), boson::BosonError>(())
//! ```

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// --- PUBLIC API MODULES ---
pub mod error;
pub mod graph;
pub mod reader;
pub mod record;
pub mod tag;
pub mod temporal;
pub mod value;
pub mod writer;

// Private modules
mod io;

// --- RE-EXPORTS ---

pub use error::{BosonError, Result, WIRE_VERSION};
pub use graph::{Graph, Record, RecordId};
pub use reader::{Decoded, Decoder, ReadOptions};
pub use record::{
    ClassDescriptor, FieldDescriptor, FromValue, Polo, PoloEnum, SlotError, ToValue,
};
pub use tag::Tag;
pub use temporal::Period;
pub use value::{ComponentType, Value};
pub use writer::{Encoder, WriteOptions};

// Re-export the derive macros so they are accessible as `boson::Polo` and
// `boson::PoloEnum`.
pub use boson_derive::{Polo, PoloEnum};

use std::io::Read;

/// Encodes one value (and the records it reaches through `graph`) with
/// default options.
///
/// # Errors
///
/// See [`Encoder::encode`].
pub fn encode(root: &Value, graph: &Graph) -> Result<Vec<u8>> {
    Encoder::new().encode(root, graph)
}

/// Encodes a typed record value with default options.
///
/// # Errors
///
/// See [`Encoder::encode_record`].
pub fn encode_record<T: record::Polo>(value: &T) -> Result<Vec<u8>> {
    Encoder::new().encode_record(value)
}

/// Decodes a complete message from a byte slice with default options.
///
/// # Errors
///
/// See [`Decoder::decode_from`].
pub fn decode(bytes: &[u8]) -> Result<Decoded> {
    Decoder::new().decode(bytes)
}

/// Decodes a complete message from a blocking stream with default options.
///
/// # Errors
///
/// See [`Decoder::decode_from`].
pub fn decode_from<R: Read>(reader: R) -> Result<Decoded> {
    Decoder::new().decode_from(reader)
}

/// Decodes a message whose root is a record and projects it onto `T`.
///
/// # Errors
///
/// See [`Decoder::decode_from`] and [`Decoded::root_as`].
pub fn decode_record<T: record::Polo>(bytes: &[u8]) -> Result<T> {
    decode(bytes)?.root_as()
}
