//! Entry blob framing.
//!
//! Every cache entry is serialized into a self-describing blob stored in the
//! shard's arena. Layout, little-endian:
//!
//! ```text
//! ┌──────────────┬──────────────┬───────────┬───────────┬─────────────┐
//! │ timestamp u64│ key hash u64 │ key len   │ key bytes │ value bytes │
//! │  [0, 8)      │  [8, 16)     │ u16 [16,18)│ [18, 18+L)│ [18+L, ..)  │
//! └──────────────┴──────────────┴───────────┴───────────┴─────────────┘
//! ```
//!
//! The key travels inside the blob so that 64-bit hash collisions can be
//! detected at read time. Overwriting a key does not rewrite the old blob;
//! instead its hash field is zeroed in place ([`reset_hash`]), turning it
//! into a tombstone that the eviction path unmaps as a no-op.
//!
//! This format is an internal contract between a shard's writer and reader.
//! It is never persisted or transmitted.

const TIMESTAMP_SIZE: usize = 8;
const HASH_SIZE: usize = 8;
const KEY_LEN_SIZE: usize = 2;

const HASH_OFFSET: usize = TIMESTAMP_SIZE;
const KEY_LEN_OFFSET: usize = HASH_OFFSET + HASH_SIZE;

/// Fixed prefix before the key bytes.
pub(crate) const HEADERS_SIZE: usize = TIMESTAMP_SIZE + HASH_SIZE + KEY_LEN_SIZE;

/// Serializes an entry into `scratch` and returns the populated prefix.
///
/// `scratch` is grown when the entry exceeds its current length and is
/// otherwise reused verbatim, so steady-state writes do not allocate.
pub(crate) fn wrap<'a>(
    timestamp: u64,
    hash: u64,
    key: &str,
    value: &[u8],
    scratch: &'a mut Vec<u8>,
) -> &'a [u8] {
    let key_len = key.len();
    let blob_len = HEADERS_SIZE + key_len + value.len();
    if scratch.len() < blob_len {
        scratch.resize(blob_len, 0);
    }

    scratch[..TIMESTAMP_SIZE].copy_from_slice(&timestamp.to_le_bytes());
    scratch[HASH_OFFSET..KEY_LEN_OFFSET].copy_from_slice(&hash.to_le_bytes());
    scratch[KEY_LEN_OFFSET..HEADERS_SIZE].copy_from_slice(&(key_len as u16).to_le_bytes());
    scratch[HEADERS_SIZE..HEADERS_SIZE + key_len].copy_from_slice(key.as_bytes());
    scratch[HEADERS_SIZE + key_len..blob_len].copy_from_slice(value);

    &scratch[..blob_len]
}

/// Reads the entry's timestamp (seconds since epoch).
pub(crate) fn read_timestamp(blob: &[u8]) -> u64 {
    read_u64(blob, 0)
}

/// Reads the entry's 64-bit key hash. Zero marks a tombstone or filler.
pub(crate) fn read_hash(blob: &[u8]) -> u64 {
    read_u64(blob, HASH_OFFSET)
}

/// Reads the entry's key.
///
/// Keys are written from `&str`, so the stored bytes are valid UTF-8 unless
/// the arena was corrupted; corruption degrades to an empty key, which can
/// never match a caller-supplied key.
pub(crate) fn read_key(blob: &[u8]) -> &str {
    let mut len_bytes = [0u8; KEY_LEN_SIZE];
    len_bytes.copy_from_slice(&blob[KEY_LEN_OFFSET..HEADERS_SIZE]);
    let key_len = u16::from_le_bytes(len_bytes) as usize;
    std::str::from_utf8(&blob[HEADERS_SIZE..HEADERS_SIZE + key_len]).unwrap_or("")
}

/// Reads the entry's value bytes.
pub(crate) fn read_value(blob: &[u8]) -> &[u8] {
    let mut len_bytes = [0u8; KEY_LEN_SIZE];
    len_bytes.copy_from_slice(&blob[KEY_LEN_OFFSET..HEADERS_SIZE]);
    let key_len = u16::from_le_bytes(len_bytes) as usize;
    &blob[HEADERS_SIZE + key_len..]
}

/// Zeroes the blob's hash field in place, marking it superseded.
///
/// A later eviction that pops this blob will try to unmap hash zero, which
/// matches no live map entry.
pub(crate) fn reset_hash(blob: &mut [u8]) {
    blob[HASH_OFFSET..KEY_LEN_OFFSET].fill(0);
}

fn read_u64(blob: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&blob[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}
