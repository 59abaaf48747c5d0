//! Entity-metadata prototypes for drives, folders and files.
//!
//! A prototype describes a metadata write before it exists: the JSON payload
//! it will carry and the entity tags that identify it. Values that are only
//! known at submission time (the data transaction id, the cipher IV) are
//! filled with placeholders of the exact final length so sizes stay exact.

use crate::byte_count::ByteCount;
use crate::data_item::encrypted_data_size;
use crate::entity::{ADDRESS_LENGTH, EntityId, Privacy};
use crate::tags::Tag;
use base64::{Engine as _, engine::general_purpose};
use serde::Serialize;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const PRIVATE_CONTENT_TYPE: &str = "application/octet-stream";
pub const CIPHER: &str = "AES256-GCM";

/// Length in bytes of an AES-GCM nonce.
const CIPHER_IV_BYTES: usize = 12;

/// Anything that will be written as an entity-metadata data item.
pub trait MetaDataPrototype {
    /// Size of the metadata payload as written (after encryption if private).
    fn payload_size(&self) -> crate::Result<ByteCount>;

    /// Entity tags identifying the write.
    fn tags(&self) -> Vec<Tag>;
}

/// Placeholder for a transaction id that is not known yet.
pub fn stub_transaction_id() -> String {
    "0".repeat(ADDRESS_LENGTH)
}

fn stub_cipher_iv() -> String {
    general_purpose::STANDARD.encode([0u8; CIPHER_IV_BYTES])
}

fn json_payload_size<T: Serialize>(
    payload: &T,
    privacy: Privacy,
) -> crate::Result<ByteCount> {
    let bytes = serde_json::to_vec(payload)
        .map_err(|e| crate::Error::Serialization(format!("metadata payload: {e}")))?;
    let size = ByteCount::new(bytes.len() as u64);
    Ok(if privacy.is_private() {
        encrypted_data_size(size)
    } else {
        size
    })
}

/// Content type and, for private writes, cipher tags.
pub(crate) fn content_and_cipher_tags(privacy: Privacy) -> Vec<Tag> {
    match privacy {
        Privacy::Public => vec![Tag::new("Content-Type", JSON_CONTENT_TYPE)],
        Privacy::Private => vec![
            Tag::new("Content-Type", PRIVATE_CONTENT_TYPE),
            Tag::new("Cipher", CIPHER),
            Tag::new("Cipher-IV", stub_cipher_iv()),
        ],
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DriveMetaData<'a> {
    name: &'a str,
    root_folder_id: String,
}

/// Metadata write creating a drive.
#[derive(Clone, Debug)]
pub struct DriveMetaDataPrototype {
    pub drive_id: EntityId,
    pub name: String,
    pub root_folder_id: EntityId,
    pub privacy: Privacy,
}

impl MetaDataPrototype for DriveMetaDataPrototype {
    fn payload_size(&self) -> crate::Result<ByteCount> {
        let payload = DriveMetaData {
            name: &self.name,
            root_folder_id: self.root_folder_id.to_string(),
        };
        json_payload_size(&payload, self.privacy)
    }

    fn tags(&self) -> Vec<Tag> {
        let mut tags = content_and_cipher_tags(self.privacy);
        tags.push(Tag::new("Drive-Id", self.drive_id.to_string()));
        tags.push(Tag::new("Entity-Type", "drive"));
        match self.privacy {
            Privacy::Public => tags.push(Tag::new("Drive-Privacy", "public")),
            Privacy::Private => {
                tags.push(Tag::new("Drive-Privacy", "private"));
                tags.push(Tag::new("Drive-Auth-Mode", "password"));
            }
        }
        tags
    }
}

#[derive(Clone, Debug, Serialize)]
struct FolderMetaData<'a> {
    name: &'a str,
}

/// Metadata write creating, renaming or moving a folder.
#[derive(Clone, Debug)]
pub struct FolderMetaDataPrototype {
    pub drive_id: EntityId,
    pub folder_id: EntityId,
    /// `None` for a drive's root folder.
    pub parent_folder_id: Option<EntityId>,
    pub name: String,
    pub privacy: Privacy,
}

impl MetaDataPrototype for FolderMetaDataPrototype {
    fn payload_size(&self) -> crate::Result<ByteCount> {
        json_payload_size(&FolderMetaData { name: &self.name }, self.privacy)
    }

    fn tags(&self) -> Vec<Tag> {
        let mut tags = content_and_cipher_tags(self.privacy);
        tags.push(Tag::new("Drive-Id", self.drive_id.to_string()));
        tags.push(Tag::new("Entity-Type", "folder"));
        tags.push(Tag::new("Folder-Id", self.folder_id.to_string()));
        if let Some(parent) = self.parent_folder_id {
            tags.push(Tag::new("Parent-Folder-Id", parent.to_string()));
        }
        tags
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetaData<'a> {
    name: &'a str,
    size: u64,
    last_modified_date: u64,
    data_tx_id: String,
    data_content_type: &'a str,
}

/// Metadata write creating, renaming or moving a file.
#[derive(Clone, Debug)]
pub struct FileMetaDataPrototype {
    pub drive_id: EntityId,
    pub file_id: EntityId,
    pub parent_folder_id: EntityId,
    pub name: String,
    /// Unencrypted size of the file data.
    pub size: ByteCount,
    /// Last modification time in milliseconds since the epoch.
    pub last_modified_ms: u64,
    /// Data transaction id, if the data is already on the network.
    pub data_tx_id: Option<String>,
    pub content_type: String,
    pub privacy: Privacy,
}

impl MetaDataPrototype for FileMetaDataPrototype {
    fn payload_size(&self) -> crate::Result<ByteCount> {
        let payload = FileMetaData {
            name: &self.name,
            size: self.size.get(),
            last_modified_date: self.last_modified_ms,
            data_tx_id: self.data_tx_id.clone().unwrap_or_else(stub_transaction_id),
            data_content_type: &self.content_type,
        };
        json_payload_size(&payload, self.privacy)
    }

    fn tags(&self) -> Vec<Tag> {
        let mut tags = content_and_cipher_tags(self.privacy);
        tags.push(Tag::new("Drive-Id", self.drive_id.to_string()));
        tags.push(Tag::new("Entity-Type", "file"));
        tags.push(Tag::new("File-Id", self.file_id.to_string()));
        tags.push(Tag::new("Parent-Folder-Id", self.parent_folder_id.to_string()));
        tags
    }
}
