// Upload planner tests: bundling decisions, unpacking and sizing

mod common;

use common::{file_order, folder_order, init_tracing, owner};
use weft_core::config::BundlingConfig;
use weft_core::data_item::{
    BUNDLE_ENTRY_HEADER_LENGTH, BUNDLE_HEADER_LENGTH, byte_count_as_data_item, encrypted_data_size,
};
use weft_core::metadata::FolderMetaDataPrototype;
use weft_core::{
    ByteCount, DriveKey, EntityId, MetaDataPrototype, PlannedEntity, Privacy, Tag, TagSettings,
    UploadOrder, WrappedEntity, WrappedFile, WrappedFolder,
};
use weft_planner::{CreateDriveTransactions, PlannerError, UploadPlan, UploadPlanner};

const MAX_BUNDLE_SIZE: u64 = 1_000_000;

fn planner_with(max_data_item_limit: u64) -> UploadPlanner {
    UploadPlanner::new(
        BundlingConfig {
            enabled: true,
            max_bundle_size: MAX_BUNDLE_SIZE,
            max_data_item_limit,
        },
        TagSettings::default(),
    )
    .unwrap()
}

fn planner() -> UploadPlanner {
    planner_with(500)
}

fn file(name: &str, size: u64) -> WrappedFile {
    WrappedFile::new(name, ByteCount::new(size)).with_content_type("text/plain")
}

fn assert_no_single_item_bundles(plan: &UploadPlan) {
    for bundle in &plan.bundle_plans {
        assert!(bundle.data_item_count() >= 2, "bundle with one item survived");
    }
}

#[test]
fn test_folder_tree_shares_one_bundle() {
    init_tracing();
    let tree = WrappedFolder::new("docs")
        .with_file(file("a.txt", 100))
        .with_file(file("b.txt", 200))
        .with_folder(WrappedFolder::new("nested").with_file(file("c.txt", 300)));

    let plan = planner()
        .plan_upload_all_entities(&[folder_order(tree)])
        .unwrap();

    assert_eq!(plan.bundle_plans.len(), 1);
    let bundle = &plan.bundle_plans[0];
    // Two folders plus three files with data and metadata.
    assert_eq!(bundle.data_item_count(), 8);
    assert_eq!(bundle.upload_stats.len(), 5);
    assert!(bundle.contains_file_data());
    assert_eq!(plan.transaction_count(), 1);
}

#[test]
fn test_children_reference_planned_parent_ids() {
    let tree = WrappedFolder::new("docs")
        .with_file(file("a.txt", 1))
        .with_folder(WrappedFolder::new("nested").with_file(file("b.txt", 1)));
    let order = folder_order(tree);
    let plan = planner()
        .plan_upload_all_entities(std::slice::from_ref(&order))
        .unwrap();

    let stats = &plan.bundle_plans[0].upload_stats;
    let folder_id = |name: &str| {
        stats
            .iter()
            .find_map(|s| match &s.entity {
                PlannedEntity::Folder(folder) if folder.name == name => Some(folder.folder_id),
                _ => None,
            })
            .unwrap()
    };
    let parent_of = |name: &str| {
        stats
            .iter()
            .find(|s| s.dest_name == name)
            .map(|s| s.dest_folder_id)
            .unwrap()
    };

    assert_eq!(parent_of("docs"), order.dest_folder_id);
    assert_eq!(parent_of("a.txt"), folder_id("docs"));
    assert_eq!(parent_of("nested"), folder_id("docs"));
    assert_eq!(parent_of("b.txt"), folder_id("nested"));
}

#[test]
fn test_existing_folder_writes_no_metadata() {
    let existing_id = EntityId::new();
    let tree = WrappedFolder::new("docs")
        .with_existing_id(existing_id)
        .with_file(file("a.txt", 1));

    let plan = planner()
        .plan_upload_all_entities(&[folder_order(tree)])
        .unwrap();

    assert_eq!(plan.bundle_plans.len(), 1);
    let stats = &plan.bundle_plans[0].upload_stats;
    assert_eq!(stats.len(), 1);
    assert!(stats[0].is_file());
    assert_eq!(stats[0].dest_folder_id, existing_id);
}

#[test]
fn test_lone_folder_is_unpacked_to_v2() {
    let plan = planner()
        .plan_upload_all_entities(&[folder_order(WrappedFolder::new("empty"))])
        .unwrap();

    assert!(plan.bundle_plans.is_empty());
    assert_eq!(plan.v2_tx_plans.folder_meta_data_plans.len(), 1);
    assert_eq!(plan.transaction_count(), 1);
}

#[test]
fn test_single_oversized_file_goes_standalone() {
    let plan = planner()
        .plan_upload_all_entities(&[file_order(file("movie.mkv", MAX_BUNDLE_SIZE * 3))])
        .unwrap();

    assert!(plan.bundle_plans.is_empty());
    assert!(plan.v2_tx_plans.file_data_only_plans.is_empty());
    let file_plan = &plan.v2_tx_plans.file_and_meta_data_plans[0];
    assert!(file_plan.file_data_byte_count > ByteCount::new(MAX_BUNDLE_SIZE * 3));
    assert_eq!(plan.transaction_count(), 2);
}

#[test]
fn test_bulk_oversized_file_bundles_metadata_only() {
    let tree = WrappedFolder::new("media")
        .with_file(file("movie.mkv", MAX_BUNDLE_SIZE * 3))
        .with_file(file("notes.txt", 10));

    let plan = planner()
        .plan_upload_all_entities(&[folder_order(tree)])
        .unwrap();

    assert_eq!(plan.bundle_plans.len(), 1);
    let data_only = &plan.v2_tx_plans.file_data_only_plans;
    assert_eq!(data_only.len(), 1);
    assert_eq!(data_only[0].upload_stats.dest_name, "movie.mkv");
    assert_eq!(data_only[0].meta_data_bundle_index, 0);

    let bundle = &plan.bundle_plans[0];
    assert_eq!(bundle.meta_data_only_stats.len(), 1);
    assert_eq!(bundle.meta_data_only_stats[0].dest_name, "movie.mkv");
    // folder metadata, notes data + metadata, movie metadata
    assert_eq!(bundle.data_item_count(), 4);
    assert_eq!(plan.transaction_count(), 2);
}

#[test]
fn test_lone_file_metadata_bundle_becomes_v2_file_plan() {
    // The small file fills the first bundle, so the big file's metadata
    // lands alone in a second one.
    let planner = planner_with(2);
    let plan = planner
        .plan_upload_all_entities(&[
            file_order(file("small.txt", 10)),
            file_order(file("big.iso", MAX_BUNDLE_SIZE * 2)),
        ])
        .unwrap();

    assert_no_single_item_bundles(&plan);
    assert_eq!(plan.bundle_plans.len(), 1);
    assert!(plan.v2_tx_plans.file_data_only_plans.is_empty());
    let v2_file = &plan.v2_tx_plans.file_and_meta_data_plans;
    assert_eq!(v2_file.len(), 1);
    assert_eq!(v2_file[0].upload_stats.dest_name, "big.iso");
    assert!(v2_file[0].meta_data_byte_count > ByteCount::ZERO);
}

#[test]
fn test_unpacking_remaps_metadata_bundle_index() {
    // A long folder name leaves its metadata alone in bundle 0; the big
    // file's metadata is too large for what is left there and lands in
    // bundle 1 beside the small file.
    let orders = [
        folder_order(WrappedFolder::new("f".repeat(600_000))),
        file_order(file("small.bin", 400_000)),
        file_order(file(&"b".repeat(450_000), MAX_BUNDLE_SIZE * 2)),
    ];
    let plan = planner().plan_upload_all_entities(&orders).unwrap();

    assert_no_single_item_bundles(&plan);
    assert_eq!(plan.bundle_plans.len(), 1);
    assert_eq!(plan.v2_tx_plans.folder_meta_data_plans.len(), 1);
    let data_only = &plan.v2_tx_plans.file_data_only_plans;
    assert_eq!(data_only.len(), 1);
    assert_eq!(data_only[0].meta_data_bundle_index, 0);
    assert_eq!(plan.bundle_plans[0].meta_data_only_stats.len(), 1);
}

#[test]
fn test_no_single_item_bundles_for_mixed_requests() {
    let planner = planner_with(3);
    let mut orders: Vec<UploadOrder> = Vec::new();
    for i in 0..7u64 {
        let mut folder = WrappedFolder::new(format!("dir{i}"));
        for j in 0..i {
            folder = folder.with_file(file(&format!("f{j}"), (i * 97_000 + j * 13) % 700_000));
        }
        orders.push(folder_order(folder));
        orders.push(file_order(file(&format!("top{i}"), i * 300_000)));
    }

    let plan = planner.plan_upload_all_entities(&orders).unwrap();
    assert_no_single_item_bundles(&plan);
    for bundle in &plan.bundle_plans {
        assert!(bundle.data_item_count() <= 3);
        let overhead = BUNDLE_HEADER_LENGTH + BUNDLE_ENTRY_HEADER_LENGTH * bundle.data_item_count() as u64;
        assert!(bundle.total_byte_count.get() <= MAX_BUNDLE_SIZE + overhead);
    }
}

#[test]
fn test_bundle_size_is_envelope_of_wrapped_items() {
    let planner = planner();
    let order = file_order(file("a.txt", 1_234));
    let plan = planner
        .plan_upload_all_entities(std::slice::from_ref(&order))
        .unwrap();

    let bundle = &plan.bundle_plans[0];
    let PlannedEntity::File(planned) = &bundle.upload_stats[0].entity else {
        panic!("expected a file");
    };
    let WrappedEntity::File(wrapped) = &order.entity else {
        unreachable!();
    };
    let data = planner.file_data_byte_count(wrapped, Privacy::Public);
    let meta_data = planner.meta_data_byte_count(&wrapped.metadata_prototype(
        planned.file_id,
        order.dest_drive_id,
        order.dest_folder_id,
        "a.txt",
        Privacy::Public,
    ))
    .unwrap();
    assert_eq!(
        bundle.total_byte_count.get(),
        BUNDLE_HEADER_LENGTH + 2 * BUNDLE_ENTRY_HEADER_LENGTH + data.get() + meta_data.get()
    );
}

#[test]
fn test_private_upload_is_larger_than_public() {
    let planner = planner();
    let public = file_order(file("a.txt", 1_000));
    let mut private = public.clone();
    private.drive_key = Some(DriveKey::from_bytes([7; 32]));

    let public_plan = planner.plan_upload_all_entities(&[public]).unwrap();
    let private_plan = planner.plan_upload_all_entities(&[private]).unwrap();
    assert!(
        private_plan.bundle_plans[0].total_byte_count > public_plan.bundle_plans[0].total_byte_count
    );
    assert_eq!(
        private_plan.bundle_plans[0].upload_stats[0].privacy(),
        Privacy::Private
    );
}

#[test]
fn test_private_data_item_carries_cipher_tags() {
    let settings = TagSettings::default();
    let planner = planner();
    let wrapped = file("photo.png", 1_000).with_content_type("image/png");

    let expected_tags = [
        Tag::new("App-Name", &settings.app_name),
        Tag::new("App-Version", &settings.app_version),
        Tag::new("Content-Type", "application/octet-stream"),
        Tag::new("Cipher", "AES256-GCM"),
        Tag::new("Cipher-IV", "AAAAAAAAAAAAAAAA"),
    ];
    assert_eq!(
        planner.file_data_byte_count(&wrapped, Privacy::Private),
        byte_count_as_data_item(encrypted_data_size(ByteCount::new(1_000)), &expected_tags)
    );

    let public_tags = [
        Tag::new("App-Name", &settings.app_name),
        Tag::new("App-Version", &settings.app_version),
        Tag::new("Content-Type", "image/png"),
    ];
    assert_eq!(
        planner.file_data_byte_count(&wrapped, Privacy::Public),
        byte_count_as_data_item(ByteCount::new(1_000), &public_tags)
    );
}

#[test]
fn test_create_drive_plans() {
    let planner = planner();
    let public = planner.plan_create_drive("photos", None).unwrap();
    let key = DriveKey::from_bytes([1; 32]);
    let private = planner.plan_create_drive("photos", Some(&key)).unwrap();

    let (
        CreateDriveTransactions::Bundle {
            total_byte_count: public_size,
        },
        CreateDriveTransactions::Bundle {
            total_byte_count: private_size,
        },
    ) = (&public.transactions, &private.transactions)
    else {
        panic!("expected bundled drive creation");
    };
    assert!(private_size > public_size);
}

#[test]
fn test_metadata_update_is_standalone() {
    let planner = planner();
    let rename = FolderMetaDataPrototype {
        drive_id: EntityId::new(),
        folder_id: EntityId::new(),
        parent_folder_id: Some(EntityId::new()),
        name: "renamed".to_string(),
        privacy: Privacy::Public,
    };

    let plan = planner.plan_metadata_update(&rename).unwrap();
    assert_eq!(
        plan.meta_data_byte_count,
        planner.meta_data_byte_count(&rename).unwrap()
    );
    assert!(plan.meta_data_byte_count.get() > 1_044);
}

struct UnserializablePrototype;

impl MetaDataPrototype for UnserializablePrototype {
    fn payload_size(&self) -> weft_core::Result<ByteCount> {
        Err(weft_core::Error::Serialization("broken payload".to_string()))
    }

    fn tags(&self) -> Vec<Tag> {
        Vec::new()
    }
}

#[test]
fn test_metadata_sizing_error_is_not_a_zero_size() {
    let err = planner()
        .plan_metadata_update(&UnserializablePrototype)
        .unwrap_err();
    assert!(matches!(
        err,
        PlannerError::Core(weft_core::Error::Serialization(_))
    ));
}

#[test]
fn test_dest_name_overrides_entity_name() {
    let mut order = file_order(file("a.txt", 1));
    order.dest_name = Some("renamed.txt".to_string());
    order.owner = owner();
    let plan = planner().plan_upload_all_entities(&[order]).unwrap();
    assert_eq!(plan.bundle_plans[0].upload_stats[0].dest_name, "renamed.txt");
}
