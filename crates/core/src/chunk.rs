//! Chunk arithmetic for the network fee schedule.
//!
//! The network prices writes by the number of fixed-size chunks a payload
//! occupies, not by raw bytes.

use crate::byte_count::ByteCount;

/// Size of one fee-schedule chunk: 256 KiB.
pub const BYTES_PER_CHUNK: u64 = 256 * 1024;

/// Number of chunks needed to hold `byte_count` bytes.
pub fn chunk_count(byte_count: ByteCount) -> u64 {
    byte_count.get().div_ceil(BYTES_PER_CHUNK)
}

/// Bytes spanned by `chunks` whole chunks, saturating at `u64::MAX`.
pub fn bytes_for_chunks(chunks: u64) -> ByteCount {
    ByteCount::new(chunks.saturating_mul(BYTES_PER_CHUNK))
}

/// Smallest byte count that occupies exactly `chunks` chunks.
pub fn min_bytes_for_chunks(chunks: u64) -> ByteCount {
    match chunks {
        0 => ByteCount::ZERO,
        chunks => bytes_for_chunks(chunks - 1).saturating_add(ByteCount::new(1)),
    }
}

/// Round a byte count up to the next chunk boundary.
pub fn round_up_to_chunk(byte_count: ByteCount) -> ByteCount {
    bytes_for_chunks(chunk_count(byte_count))
}
