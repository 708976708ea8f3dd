//! Frame store, signature verification, and envelope parsing for the
//! recovery kit.
//!
//! Parses redundant "frame" inputs keyed by document identity, reconciles
//! them into an authenticated ciphertext, and unpacks the structured file
//! envelope the ciphertext decrypts to. Pure data model and parsing; the
//! session state machine that drives these pieces lives in `ethernity-app`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod auth;
pub mod constants;
mod error;
pub mod envelope;
pub mod frame;
pub mod frame_store;
pub mod shard;

pub use auth::{AuthPayload, decode_auth_payload};
pub use envelope::{FileEntry, Manifest, RecoveredFile, decode_envelope};
pub use error::{EnvelopeError, FrameError, PayloadError};
pub use frame::{Frame, FrameType, decode_frame};
pub use frame_store::{AuthRecord, FrameStore, Outcome, ShardMetadata};
pub use shard::{KeyType, ShardPayload, decode_shard_payload};

#[cfg(any(test, feature = "test-support"))]
pub use auth::encode_auth_payload;
#[cfg(any(test, feature = "test-support"))]
pub use envelope::encode_envelope;
#[cfg(any(test, feature = "test-support"))]
pub use frame::encode_frame;
#[cfg(any(test, feature = "test-support"))]
pub use shard::encode_shard_payload;
