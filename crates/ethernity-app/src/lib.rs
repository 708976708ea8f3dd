//! Session orchestrator for the offline recovery kit.
//!
//! [`Session`] owns a [`ethernity_core::frame_store::FrameStore`] plus the
//! derived state (reassembled ciphertext, auth verification, recovered
//! passphrase, decrypted envelope, extracted files) and eagerly recomputes
//! that derived state after every ingestion, per `spec.md` §4.9. Treat the
//! UI layer as a pure presenter over [`Session::snapshot`]; this crate never
//! renders anything itself.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod session;
mod snapshot;

pub use config::SessionConfig;
pub use error::SessionError;
pub use session::{Added, Session};
pub use snapshot::{AuthStatus, Snapshot, StatusLine, Tone};
