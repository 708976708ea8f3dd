//! A deterministic CBOR subset for the recovery kit.
//!
//! This is not a general-purpose CBOR library. It decodes exactly the shapes
//! the recovery kit's payloads use — unsigned/negative integers, byte and
//! text strings, arrays, maps, booleans, null, and 32/64-bit floats — and
//! rejects everything RFC 8949 allows beyond that (indefinite lengths,
//! tagged items, half-precision floats, trailing bytes after the top-level
//! item). The encoder exists to reconstruct the exact transcripts that
//! Ed25519 signatures are computed over: it always emits shortest-form
//! integer lengths and preserves map key insertion order, so callers that
//! build a [`CborValue::Map`] in a specified field order get a byte-exact
//! transcript back.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod decode;
mod encode;
mod error;
mod value;

pub use decode::decode;
pub use encode::encode;
pub use error::CborError;
pub use value::CborValue;
