//! Sizing of data items and bundles as they appear on the network.

use crate::byte_count::ByteCount;
use crate::tags::{Tag, serialized_tags_len};

/// RSA-4096 signature.
pub const SIGNATURE_LENGTH: u64 = 512;
/// RSA-4096 public key modulus.
pub const OWNER_LENGTH: u64 = 512;
pub const SIGNATURE_TYPE_LENGTH: u64 = 2;
/// Presence byte of an absent target.
pub const TARGET_LENGTH: u64 = 1;
/// Presence byte of an absent anchor.
pub const ANCHOR_LENGTH: u64 = 1;
/// Tag count and tag byte length, eight bytes each.
pub const TAG_HEADER_LENGTH: u64 = 16;

/// Data item count at the head of a bundle.
pub const BUNDLE_HEADER_LENGTH: u64 = 32;
/// Size and id of each entry in a bundle's header.
pub const BUNDLE_ENTRY_HEADER_LENGTH: u64 = 64;

/// AES-GCM block size used when sizing encrypted payloads.
const CIPHER_BLOCK_LENGTH: u64 = 16;

/// Fixed per-item overhead, excluding the tag block and payload.
pub const DATA_ITEM_FIXED_OVERHEAD: u64 = SIGNATURE_LENGTH
    + OWNER_LENGTH
    + SIGNATURE_TYPE_LENGTH
    + TARGET_LENGTH
    + ANCHOR_LENGTH
    + TAG_HEADER_LENGTH;

/// Size of `payload` once wrapped as a signed data item carrying `tags`.
pub fn byte_count_as_data_item(payload: ByteCount, tags: &[Tag]) -> ByteCount {
    ByteCount::new(DATA_ITEM_FIXED_OVERHEAD.saturating_add(serialized_tags_len(tags))) + payload
}

/// Size of a bundle holding data items of the given sizes.
pub fn bundle_byte_count<I>(data_item_sizes: I) -> ByteCount
where
    I: IntoIterator<Item = ByteCount>,
{
    let (total, count) = data_item_sizes
        .into_iter()
        .fold((ByteCount::ZERO, 0u64), |(total, count), size| {
            (total + size, count + 1)
        });
    bundle_envelope_byte_count(total, count)
}

/// Size of a bundle whose `count` data items sum to `total` bytes.
pub fn bundle_envelope_byte_count(total: ByteCount, count: u64) -> ByteCount {
    let entries = BUNDLE_ENTRY_HEADER_LENGTH.saturating_mul(count);
    ByteCount::new(BUNDLE_HEADER_LENGTH) + total + ByteCount::new(entries)
}

/// Size of a payload after encryption for a private drive.
pub fn encrypted_data_size(byte_count: ByteCount) -> ByteCount {
    let blocks = byte_count.get() / CIPHER_BLOCK_LENGTH + 1;
    ByteCount::new(blocks.saturating_mul(CIPHER_BLOCK_LENGTH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_item_without_tags() {
        assert_eq!(
            byte_count_as_data_item(ByteCount::new(100), &[]),
            ByteCount::new(1044 + 100)
        );
    }

    #[test]
    fn test_data_item_counts_tag_block() {
        let tags = [Tag::new("a", "bc")];
        assert_eq!(
            byte_count_as_data_item(ByteCount::ZERO, &tags),
            ByteCount::new(1044 + 7)
        );
    }

    #[test]
    fn test_bundle_byte_count() {
        let sizes = [ByteCount::new(10), ByteCount::new(20)];
        assert_eq!(bundle_byte_count(sizes), ByteCount::new(32 + 30 + 128));
        assert_eq!(bundle_byte_count([]), ByteCount::new(32));
    }

    #[test]
    fn test_huge_payloads_saturate() {
        let tags = [Tag::new("Content-Type", "application/octet-stream")];
        assert_eq!(
            byte_count_as_data_item(ByteCount::new(u64::MAX - 10), &tags),
            ByteCount::MAX
        );
        assert_eq!(
            bundle_byte_count([ByteCount::MAX, ByteCount::new(1)]),
            ByteCount::MAX
        );
        assert_eq!(encrypted_data_size(ByteCount::MAX), ByteCount::MAX);
    }

    #[test]
    fn test_encrypted_data_size() {
        assert_eq!(encrypted_data_size(ByteCount::ZERO), ByteCount::new(16));
        assert_eq!(encrypted_data_size(ByteCount::new(15)), ByteCount::new(16));
        assert_eq!(encrypted_data_size(ByteCount::new(16)), ByteCount::new(32));
    }
}
