//! Transaction tags and the tag sets attached to every write.

use crate::entity::Privacy;
use crate::metadata::content_and_cipher_tags;
use serde::{Deserialize, Serialize};

/// A name/value tag attached to a transaction or data item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Length in bytes of a zigzag-encoded variable-length integer.
fn zigzag_varint_len(value: u64) -> u64 {
    let mut encoded = value << 1;
    let mut len = 1;
    while encoded >= 0x80 {
        encoded >>= 7;
        len += 1;
    }
    len
}

/// Length of the tag block as serialized inside a data item.
///
/// Tags are encoded as an Avro array of `{name, value}` byte records: one
/// block-count prefix, each field length-prefixed, then a zero terminator.
/// An empty tag set serializes to nothing.
pub fn serialized_tags_len(tags: &[Tag]) -> u64 {
    if tags.is_empty() {
        return 0;
    }
    let fields: u64 = tags
        .iter()
        .map(|tag| {
            let name = tag.name.len() as u64;
            let value = tag.value.len() as u64;
            zigzag_varint_len(name) + name + zigzag_varint_len(value) + value
        })
        .sum();
    zigzag_varint_len(tags.len() as u64) + fields + 1
}

/// The canonical protocol, application and custom tags for writes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSettings {
    /// Application name reported on every write.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Application version reported on every write.
    #[serde(default = "default_app_version")]
    pub app_version: String,
    /// File-system protocol version.
    #[serde(default = "default_arfs_version")]
    pub arfs_version: String,
    /// Extra tags added to every metadata write.
    #[serde(default)]
    pub custom_metadata_tags: Vec<Tag>,
    /// Extra tags added to every file data write.
    #[serde(default)]
    pub custom_data_tags: Vec<Tag>,
}

fn default_app_name() -> String {
    "weft".to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_arfs_version() -> String {
    "0.15".to_string()
}

impl Default for TagSettings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_version: default_app_version(),
            arfs_version: default_arfs_version(),
            custom_metadata_tags: Vec::new(),
            custom_data_tags: Vec::new(),
        }
    }
}

impl TagSettings {
    /// Tags shared by every write.
    pub fn base_tags(&self) -> Vec<Tag> {
        vec![
            Tag::new("App-Name", &self.app_name),
            Tag::new("App-Version", &self.app_version),
            Tag::new("ArFS", &self.arfs_version),
        ]
    }

    /// Full tag set for a metadata write carrying `entity_tags`.
    pub fn metadata_tags(&self, entity_tags: Vec<Tag>) -> Vec<Tag> {
        let mut tags = self.base_tags();
        tags.extend(entity_tags);
        tags.extend(self.custom_metadata_tags.iter().cloned());
        tags
    }

    /// Full tag set for a file data write.
    ///
    /// Private data is opaque ciphertext: its content type is hidden and it
    /// carries the same cipher tags as private metadata.
    pub fn file_data_tags(&self, privacy: Privacy, content_type: &str) -> Vec<Tag> {
        let mut tags = vec![
            Tag::new("App-Name", &self.app_name),
            Tag::new("App-Version", &self.app_version),
        ];
        match privacy {
            Privacy::Public => tags.push(Tag::new("Content-Type", content_type)),
            Privacy::Private => tags.extend(content_and_cipher_tags(privacy)),
        }
        tags.extend(self.custom_data_tags.iter().cloned());
        tags
    }

    /// Validate tag settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.app_name.is_empty() {
            return Err("tags.app_name cannot be empty".to_string());
        }
        for tag in self
            .custom_metadata_tags
            .iter()
            .chain(self.custom_data_tags.iter())
        {
            if tag.name.is_empty() {
                return Err(format!(
                    "custom tag with value {:?} has an empty name",
                    tag.value
                ));
            }
        }
        Ok(())
    }
}
