//! Upload requests and the per-entity statistics planning produces.

use crate::byte_count::ByteCount;
use crate::data_item::encrypted_data_size;
use crate::entity::{ArweaveAddress, DriveKey, EntityId, Privacy};
use crate::metadata::{FileMetaDataPrototype, FolderMetaDataPrototype, PRIVATE_CONTENT_TYPE};

/// A local file queued for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrappedFile {
    pub name: String,
    /// Unencrypted size of the file data.
    pub size: ByteCount,
    /// Last modification time in milliseconds since the epoch.
    pub last_modified_ms: u64,
    pub content_type: String,
    /// Id of the file on the network when this upload replaces it.
    pub existing_id: Option<EntityId>,
}

impl WrappedFile {
    pub fn new(name: impl Into<String>, size: ByteCount) -> Self {
        Self {
            name: name.into(),
            size,
            last_modified_ms: 0,
            content_type: PRIVATE_CONTENT_TYPE.to_string(),
            existing_id: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_last_modified_ms(mut self, last_modified_ms: u64) -> Self {
        self.last_modified_ms = last_modified_ms;
        self
    }

    pub fn with_existing_id(mut self, existing_id: EntityId) -> Self {
        self.existing_id = Some(existing_id);
        self
    }

    /// Size of the data as written (after encryption if private).
    pub fn data_byte_count(&self, privacy: Privacy) -> ByteCount {
        match privacy {
            Privacy::Public => self.size,
            Privacy::Private => encrypted_data_size(self.size),
        }
    }

    /// Metadata prototype for writing this file as `dest_name` under
    /// `parent_folder_id`.
    pub fn metadata_prototype(
        &self,
        file_id: EntityId,
        drive_id: EntityId,
        parent_folder_id: EntityId,
        dest_name: &str,
        privacy: Privacy,
    ) -> FileMetaDataPrototype {
        FileMetaDataPrototype {
            drive_id,
            file_id,
            parent_folder_id,
            name: dest_name.to_string(),
            size: self.size,
            last_modified_ms: self.last_modified_ms,
            data_tx_id: None,
            content_type: self.content_type.clone(),
            privacy,
        }
    }
}

/// A local folder tree queued for upload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WrappedFolder {
    pub name: String,
    pub files: Vec<WrappedFile>,
    pub folders: Vec<WrappedFolder>,
    /// Id of the folder on the network when it already exists there.
    pub existing_id: Option<EntityId>,
}

impl WrappedFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, file: WrappedFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_folder(mut self, folder: WrappedFolder) -> Self {
        self.folders.push(folder);
        self
    }

    pub fn with_existing_id(mut self, existing_id: EntityId) -> Self {
        self.existing_id = Some(existing_id);
        self
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.files.len() + self.folders.len()
    }

    pub fn metadata_prototype(
        &self,
        folder_id: EntityId,
        drive_id: EntityId,
        parent_folder_id: EntityId,
        dest_name: &str,
        privacy: Privacy,
    ) -> FolderMetaDataPrototype {
        FolderMetaDataPrototype {
            drive_id,
            folder_id,
            parent_folder_id: Some(parent_folder_id),
            name: dest_name.to_string(),
            privacy,
        }
    }
}

/// A file or folder tree to upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WrappedEntity {
    File(WrappedFile),
    Folder(WrappedFolder),
}

impl WrappedEntity {
    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => &file.name,
            Self::Folder(folder) => &folder.name,
        }
    }
}

/// A request to upload one entity into a destination folder.
#[derive(Clone, Debug)]
pub struct UploadOrder {
    pub entity: WrappedEntity,
    pub dest_folder_id: EntityId,
    /// Present for private drives.
    pub drive_key: Option<DriveKey>,
    /// Name to write under; defaults to the entity's own name.
    pub dest_name: Option<String>,
    pub owner: ArweaveAddress,
    pub dest_drive_id: EntityId,
}

impl UploadOrder {
    pub fn privacy(&self) -> Privacy {
        Privacy::from_drive_key(self.drive_key.as_ref())
    }

    pub fn destination_name(&self) -> &str {
        self.dest_name
            .as_deref()
            .unwrap_or_else(|| self.entity.name())
    }
}

/// A file after planning, with the id its metadata will carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedFile {
    pub file: WrappedFile,
    pub file_id: EntityId,
}

/// A folder after planning, with the id children reference as parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedFolder {
    pub folder_id: EntityId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlannedEntity {
    File(PlannedFile),
    Folder(PlannedFolder),
}

/// One flattened entity write, as scheduled into a plan.
#[derive(Clone, Debug)]
pub struct UploadStats {
    pub entity: PlannedEntity,
    pub dest_folder_id: EntityId,
    pub drive_key: Option<DriveKey>,
    pub dest_name: String,
    pub owner: ArweaveAddress,
    pub dest_drive_id: EntityId,
}

impl UploadStats {
    pub fn is_file(&self) -> bool {
        matches!(self.entity, PlannedEntity::File(_))
    }

    pub fn privacy(&self) -> Privacy {
        Privacy::from_drive_key(self.drive_key.as_ref())
    }
}
