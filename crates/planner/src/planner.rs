//! Structural planning: which writes go into which transactions.

use crate::error::PlannerResult;
use crate::packer::{BundlePacker, DataItemPlan};
use crate::plan::{
    BundlePlan, CreateDrivePlan, CreateDriveTransactions, MetaDataUpdatePlan, UploadPlan,
    V2FileAndMetaDataPlan, V2FileDataOnlyPlan, V2FolderMetaDataPlan, V2TxPlans,
};
use weft_core::config::{AppConfig, BundlingConfig};
use weft_core::data_item::{bundle_byte_count, byte_count_as_data_item};
use weft_core::metadata::{DriveMetaDataPrototype, FolderMetaDataPrototype};
use weft_core::{
    ArweaveAddress, ByteCount, DriveKey, EntityId, MetaDataPrototype, PlannedEntity, PlannedFile,
    PlannedFolder, Privacy, TagSettings, UploadOrder, UploadStats, WrappedEntity, WrappedFile,
    WrappedFolder,
};

/// Where a write lands.
struct Destination<'a> {
    folder_id: EntityId,
    drive_id: EntityId,
    drive_key: Option<&'a DriveKey>,
    owner: &'a ArweaveAddress,
}

impl<'a> Destination<'a> {
    fn of(order: &'a UploadOrder) -> Self {
        Self {
            folder_id: order.dest_folder_id,
            drive_id: order.dest_drive_id,
            drive_key: order.drive_key.as_ref(),
            owner: &order.owner,
        }
    }

    fn child(&self, folder_id: EntityId) -> Self {
        Self {
            folder_id,
            drive_id: self.drive_id,
            drive_key: self.drive_key,
            owner: self.owner,
        }
    }

    fn privacy(&self) -> Privacy {
        Privacy::from_drive_key(self.drive_key)
    }

    fn upload_stats(&self, entity: PlannedEntity, dest_name: &str) -> UploadStats {
        UploadStats {
            entity,
            dest_folder_id: self.folder_id,
            drive_key: self.drive_key.cloned(),
            dest_name: dest_name.to_string(),
            owner: self.owner.clone(),
            dest_drive_id: self.drive_id,
        }
    }
}

/// Plan under construction for one planning call.
struct PlanBuilder {
    packer: BundlePacker,
    v2_tx_plans: V2TxPlans,
    is_bulk: bool,
}

impl PlanBuilder {
    /// Turn packed bundles into bundle plans.
    ///
    /// A bundle holding a single data item costs more than sending the item
    /// on its own, so such bundles are unpacked into standalone transactions
    /// and the bundle indices recorded by file-data-only plans are remapped.
    fn finish(self) -> UploadPlan {
        let PlanBuilder {
            packer,
            mut v2_tx_plans,
            ..
        } = self;

        let mut bundle_plans: Vec<BundlePlan> = Vec::new();
        let mut remapped: Vec<Option<usize>> = Vec::new();
        let mut unpacked: Vec<(usize, DataItemPlan)> = Vec::new();

        for (index, bundle) in packer.into_bundles().into_iter().enumerate() {
            if bundle.total_data_item_count() < 2 {
                remapped.push(None);
                unpacked.extend(
                    bundle
                        .into_data_item_plans()
                        .into_iter()
                        .map(|plan| (index, plan)),
                );
            } else {
                remapped.push(Some(bundle_plans.len()));
                bundle_plans.push(bundle.to_bundle_plan());
            }
        }

        for (index, item) in unpacked {
            let Some(upload_stats) = item.upload_stats else {
                continue;
            };
            tracing::debug!(
                bundle_index = index,
                name = %upload_stats.dest_name,
                "unpacking single-item bundle"
            );
            if upload_stats.is_file() {
                let position = v2_tx_plans
                    .file_data_only_plans
                    .iter()
                    .position(|plan| plan.meta_data_bundle_index == index);
                if let Some(position) = position {
                    let data_only = v2_tx_plans.file_data_only_plans.remove(position);
                    v2_tx_plans
                        .file_and_meta_data_plans
                        .push(V2FileAndMetaDataPlan {
                            upload_stats: data_only.upload_stats,
                            file_data_byte_count: data_only.file_data_byte_count,
                            meta_data_byte_count: item.total_byte_count,
                        });
                }
            } else {
                v2_tx_plans
                    .folder_meta_data_plans
                    .push(V2FolderMetaDataPlan {
                        upload_stats,
                        meta_data_byte_count: item.total_byte_count,
                    });
            }
        }

        for plan in &mut v2_tx_plans.file_data_only_plans {
            if let Some(Some(new_index)) = remapped.get(plan.meta_data_bundle_index) {
                plan.meta_data_bundle_index = *new_index;
            }
        }

        UploadPlan {
            bundle_plans,
            v2_tx_plans,
        }
    }
}

/// Decides how uploads are split into bundles and standalone transactions.
#[derive(Clone, Debug)]
pub struct UploadPlanner {
    bundling: BundlingConfig,
    tag_settings: TagSettings,
}

impl UploadPlanner {
    /// Create a planner, rejecting bundle limits a packer would refuse.
    pub fn new(bundling: BundlingConfig, tag_settings: TagSettings) -> PlannerResult<Self> {
        BundlePacker::from_config(&bundling)?;
        Ok(Self {
            bundling,
            tag_settings,
        })
    }

    pub fn from_config(config: &AppConfig) -> PlannerResult<Self> {
        Self::new(config.bundling.clone(), config.tags.clone())
    }

    pub fn bundling_enabled(&self) -> bool {
        self.bundling.enabled
    }

    /// Size of a metadata write once wrapped as a data item.
    pub fn meta_data_byte_count(
        &self,
        prototype: &dyn MetaDataPrototype,
    ) -> PlannerResult<ByteCount> {
        let tags = self.tag_settings.metadata_tags(prototype.tags());
        Ok(byte_count_as_data_item(prototype.payload_size()?, &tags))
    }

    /// Size of a file's data write once wrapped as a data item.
    pub fn file_data_byte_count(&self, file: &WrappedFile, privacy: Privacy) -> ByteCount {
        let tags = self.tag_settings.file_data_tags(privacy, &file.content_type);
        byte_count_as_data_item(file.data_byte_count(privacy), &tags)
    }

    /// Plan the transactions for every order.
    ///
    /// All orders share one packer, so unrelated orders may share bundles.
    #[tracing::instrument(skip(self, orders), fields(orders = orders.len()))]
    pub fn plan_upload_all_entities(&self, orders: &[UploadOrder]) -> PlannerResult<UploadPlan> {
        let is_bulk = orders.len() > 1
            || orders.iter().any(|order| {
                matches!(&order.entity, WrappedEntity::Folder(folder) if folder.child_count() > 0)
            });

        let mut builder = PlanBuilder {
            packer: BundlePacker::from_config(&self.bundling)?,
            v2_tx_plans: V2TxPlans::default(),
            is_bulk,
        };

        for order in orders {
            let destination = Destination::of(order);
            let dest_name = order.destination_name();
            match &order.entity {
                WrappedEntity::File(file) => {
                    self.plan_file(&mut builder, file, &destination, dest_name)?
                }
                WrappedEntity::Folder(folder) => {
                    self.plan_folder(&mut builder, folder, &destination, dest_name)?
                }
            }
        }

        let plan = builder.finish();
        tracing::info!(
            bundles = plan.bundle_plans.len(),
            file_and_meta_data = plan.v2_tx_plans.file_and_meta_data_plans.len(),
            file_data_only = plan.v2_tx_plans.file_data_only_plans.len(),
            folder_meta_data = plan.v2_tx_plans.folder_meta_data_plans.len(),
            transactions = plan.transaction_count(),
            "planned upload"
        );
        Ok(plan)
    }

    fn plan_file(
        &self,
        builder: &mut PlanBuilder,
        file: &WrappedFile,
        destination: &Destination<'_>,
        dest_name: &str,
    ) -> PlannerResult<()> {
        let privacy = destination.privacy();
        let file_id = file.existing_id.unwrap_or_default();
        let file_data_byte_count = self.file_data_byte_count(file, privacy);
        let prototype = file.metadata_prototype(
            file_id,
            destination.drive_id,
            destination.folder_id,
            dest_name,
            privacy,
        );
        let meta_data_byte_count = self.meta_data_byte_count(&prototype)?;
        let upload_stats = destination.upload_stats(
            PlannedEntity::File(PlannedFile {
                file: file.clone(),
                file_id,
            }),
            dest_name,
        );

        let packer = &mut builder.packer;
        if self.bundling.enabled
            && packer
                .can_pack_data_items_with_byte_counts(&[file_data_byte_count, meta_data_byte_count])
        {
            packer.pack_into_bundle(DataItemPlan::file_and_meta_data(
                upload_stats,
                file_data_byte_count + meta_data_byte_count,
            ))?;
            return Ok(());
        }

        if self.bundling.enabled
            && builder.is_bulk
            && packer.can_pack_data_items_with_byte_counts(&[meta_data_byte_count])
        {
            let meta_data_bundle_index = packer.pack_into_bundle(DataItemPlan::meta_data(
                upload_stats.clone(),
                meta_data_byte_count,
            ))?;
            tracing::debug!(
                name = dest_name,
                byte_count = %file_data_byte_count,
                meta_data_bundle_index,
                "file data sent standalone, metadata bundled"
            );
            builder
                .v2_tx_plans
                .file_data_only_plans
                .push(V2FileDataOnlyPlan {
                    upload_stats,
                    file_data_byte_count,
                    meta_data_bundle_index,
                });
            return Ok(());
        }

        tracing::debug!(name = dest_name, "file sent as standalone transactions");
        builder
            .v2_tx_plans
            .file_and_meta_data_plans
            .push(V2FileAndMetaDataPlan {
                upload_stats,
                file_data_byte_count,
                meta_data_byte_count,
            });
        Ok(())
    }

    fn plan_folder(
        &self,
        builder: &mut PlanBuilder,
        folder: &WrappedFolder,
        destination: &Destination<'_>,
        dest_name: &str,
    ) -> PlannerResult<()> {
        let folder_id = match folder.existing_id {
            Some(folder_id) => {
                tracing::debug!(%folder_id, name = dest_name, "folder exists, no metadata write");
                folder_id
            }
            None => {
                let folder_id = EntityId::new();
                self.plan_folder_meta_data(builder, folder, folder_id, destination, dest_name)?;
                folder_id
            }
        };

        let child_destination = destination.child(folder_id);
        for file in &folder.files {
            self.plan_file(builder, file, &child_destination, &file.name)?;
        }
        for child in &folder.folders {
            self.plan_folder(builder, child, &child_destination, &child.name)?;
        }
        Ok(())
    }

    fn plan_folder_meta_data(
        &self,
        builder: &mut PlanBuilder,
        folder: &WrappedFolder,
        folder_id: EntityId,
        destination: &Destination<'_>,
        dest_name: &str,
    ) -> PlannerResult<()> {
        let prototype = folder.metadata_prototype(
            folder_id,
            destination.drive_id,
            destination.folder_id,
            dest_name,
            destination.privacy(),
        );
        let meta_data_byte_count = self.meta_data_byte_count(&prototype)?;
        let upload_stats = destination.upload_stats(
            PlannedEntity::Folder(PlannedFolder {
                folder_id,
                name: dest_name.to_string(),
            }),
            dest_name,
        );

        if self.bundling.enabled
            && builder
                .packer
                .can_pack_data_items_with_byte_counts(&[meta_data_byte_count])
        {
            builder
                .packer
                .pack_into_bundle(DataItemPlan::meta_data(upload_stats, meta_data_byte_count))?;
        } else {
            builder
                .v2_tx_plans
                .folder_meta_data_plans
                .push(V2FolderMetaDataPlan {
                    upload_stats,
                    meta_data_byte_count,
                });
        }
        Ok(())
    }

    /// Plan the writes creating a drive and its root folder.
    ///
    /// The two metadata items share a bundle whenever bundling is enabled.
    #[tracing::instrument(skip(self, drive_key), fields(private = drive_key.is_some()))]
    pub fn plan_create_drive(
        &self,
        drive_name: &str,
        drive_key: Option<&DriveKey>,
    ) -> PlannerResult<CreateDrivePlan> {
        let privacy = Privacy::from_drive_key(drive_key);
        let drive_id = EntityId::new();
        let root_folder_id = EntityId::new();

        let drive = DriveMetaDataPrototype {
            drive_id,
            name: drive_name.to_string(),
            root_folder_id,
            privacy,
        };
        let root_folder = FolderMetaDataPrototype {
            drive_id,
            folder_id: root_folder_id,
            parent_folder_id: None,
            name: drive_name.to_string(),
            privacy,
        };
        let drive_meta_data_byte_count = self.meta_data_byte_count(&drive)?;
        let root_folder_meta_data_byte_count = self.meta_data_byte_count(&root_folder)?;

        let transactions = if self.bundling.enabled {
            CreateDriveTransactions::Bundle {
                total_byte_count: bundle_byte_count([
                    drive_meta_data_byte_count,
                    root_folder_meta_data_byte_count,
                ]),
            }
        } else {
            CreateDriveTransactions::V2 {
                drive_meta_data_byte_count,
                root_folder_meta_data_byte_count,
            }
        };

        Ok(CreateDrivePlan {
            drive_id,
            root_folder_id,
            transactions,
        })
    }

    /// Plan a single metadata write, such as a rename or a move.
    ///
    /// A lone write never benefits from a bundle, so it always goes out as
    /// a standalone transaction.
    pub fn plan_metadata_update(
        &self,
        prototype: &dyn MetaDataPrototype,
    ) -> PlannerResult<MetaDataUpdatePlan> {
        Ok(MetaDataUpdatePlan {
            meta_data_byte_count: self.meta_data_byte_count(prototype)?,
        })
    }
}
