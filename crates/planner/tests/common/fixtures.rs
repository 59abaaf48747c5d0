use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weft_core::{
    ArweaveAddress, ByteCount, EntityId, PlannedEntity, PlannedFile, PlannedFolder, UploadOrder,
    UploadStats, WrappedEntity, WrappedFile, WrappedFolder,
};

/// Route planner logs to the test output. Safe to call from every test.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weft_planner=debug,weft_pricing=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

#[allow(dead_code)]
pub fn owner() -> ArweaveAddress {
    ArweaveAddress::parse(&"o".repeat(43)).unwrap()
}

#[allow(dead_code)]
pub fn file_order(file: WrappedFile) -> UploadOrder {
    order(WrappedEntity::File(file))
}

#[allow(dead_code)]
pub fn folder_order(folder: WrappedFolder) -> UploadOrder {
    order(WrappedEntity::Folder(folder))
}

fn order(entity: WrappedEntity) -> UploadOrder {
    UploadOrder {
        entity,
        dest_folder_id: EntityId::new(),
        drive_key: None,
        dest_name: None,
        owner: owner(),
        dest_drive_id: EntityId::new(),
    }
}

#[allow(dead_code)]
pub fn file_stats(name: &str, size: u64) -> UploadStats {
    stats(
        PlannedEntity::File(PlannedFile {
            file: WrappedFile::new(name, ByteCount::new(size)),
            file_id: EntityId::new(),
        }),
        name,
    )
}

#[allow(dead_code)]
pub fn folder_stats(name: &str) -> UploadStats {
    stats(
        PlannedEntity::Folder(PlannedFolder {
            folder_id: EntityId::new(),
            name: name.to_string(),
        }),
        name,
    )
}

fn stats(entity: PlannedEntity, name: &str) -> UploadStats {
    UploadStats {
        entity,
        dest_folder_id: EntityId::new(),
        drive_key: None,
        dest_name: name.to_string(),
        owner: owner(),
        dest_drive_id: EntityId::new(),
    }
}
