//! Fixture builders for the recovery kit's end-to-end scenario tests.
//!
//! This crate has no production callers; `tests/` drives
//! [`ethernity_app::Session`] with bytes built here instead of hand-rolled
//! stand-ins, the way the rest of the workspace tests against real
//! primitives wherever a `test-support` feature makes that practical.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod fixture;

pub use fixture::{
    auth_frame_text, build_age_container, build_envelope, frame_text, main_frame_pair,
    main_frame_text, shard_frame_texts, signing_key,
};
