//! Bit-exact constants for frame and envelope layouts (`spec.md` §6.6).

/// Two fixed magic bytes at the start of every frame.
pub const FRAME_MAGIC: [u8; 2] = [0xE7, 0x46];

/// Two fixed magic bytes at the start of every envelope.
pub const ENVELOPE_MAGIC: [u8; 2] = [0xE7, 0x56];

/// Current frame schema version.
pub const FRAME_VERSION: u64 = 1;

/// Current envelope container version.
pub const ENVELOPE_VERSION: u64 = 1;

/// Current manifest schema version.
pub const MANIFEST_VERSION: u64 = 1;

/// Current auth-payload schema version.
pub const AUTH_VERSION: u64 = 1;

/// Current shard-payload schema version.
pub const SHARD_VERSION: u64 = 1;

/// Length of a document identity, in bytes.
pub const DOC_ID_LEN: usize = 16;

/// Shard key type: the share reconstructs a passphrase.
pub const SHARD_KEY_PASSPHRASE: u64 = 1;

/// Shard key type: the share reconstructs a signing seed.
pub const SHARD_KEY_SIGNING_SEED: u64 = 2;
