//! Structural upload plans and their priced counterparts.

use serde::Serialize;
use weft_core::{ArweaveAddress, ByteCount, EntityId, FeeMultiple, UploadStats, Winston};

/// A bundle transaction.
#[derive(Clone, Debug)]
pub struct BundlePlan {
    /// Entities written in full by this bundle.
    pub upload_stats: Vec<UploadStats>,
    /// Files whose metadata rides this bundle while their data goes out as
    /// a standalone transaction.
    pub meta_data_only_stats: Vec<UploadStats>,
    /// Size of the whole bundle, headers included.
    pub total_byte_count: ByteCount,
}

impl BundlePlan {
    pub fn new(upload_stats: Vec<UploadStats>, total_byte_count: ByteCount) -> Self {
        Self {
            upload_stats,
            meta_data_only_stats: Vec::new(),
            total_byte_count,
        }
    }

    /// Whether any file's data is written by this bundle.
    pub fn contains_file_data(&self) -> bool {
        self.upload_stats.iter().any(UploadStats::is_file)
    }

    pub fn data_item_count(&self) -> usize {
        self.upload_stats
            .iter()
            .map(|stats| if stats.is_file() { 2 } else { 1 })
            .sum::<usize>()
            + self.meta_data_only_stats.len()
    }
}

/// A file whose data and metadata both go out as standalone transactions.
#[derive(Clone, Debug)]
pub struct V2FileAndMetaDataPlan {
    pub upload_stats: UploadStats,
    pub file_data_byte_count: ByteCount,
    pub meta_data_byte_count: ByteCount,
}

/// A file whose data goes out standalone while its metadata rides a bundle.
#[derive(Clone, Debug)]
pub struct V2FileDataOnlyPlan {
    pub upload_stats: UploadStats,
    pub file_data_byte_count: ByteCount,
    /// Index into [`UploadPlan::bundle_plans`] of the bundle holding the
    /// metadata.
    pub meta_data_bundle_index: usize,
}

/// A folder whose metadata goes out as a standalone transaction.
#[derive(Clone, Debug)]
pub struct V2FolderMetaDataPlan {
    pub upload_stats: UploadStats,
    pub meta_data_byte_count: ByteCount,
}

/// Standalone transactions of an upload plan.
#[derive(Clone, Debug, Default)]
pub struct V2TxPlans {
    pub file_and_meta_data_plans: Vec<V2FileAndMetaDataPlan>,
    pub file_data_only_plans: Vec<V2FileDataOnlyPlan>,
    pub folder_meta_data_plans: Vec<V2FolderMetaDataPlan>,
}

/// The transactions needed to upload a set of entities.
#[derive(Clone, Debug, Default)]
pub struct UploadPlan {
    pub bundle_plans: Vec<BundlePlan>,
    pub v2_tx_plans: V2TxPlans,
}

impl UploadPlan {
    /// Number of network transactions the plan submits.
    pub fn transaction_count(&self) -> usize {
        let v2 = &self.v2_tx_plans;
        self.bundle_plans.len()
            + 2 * v2.file_and_meta_data_plans.len()
            + v2.file_data_only_plans.len()
            + v2.folder_meta_data_plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_count() == 0
    }
}

/// Transactions creating a drive and its root folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreateDriveTransactions {
    /// Both metadata items in one bundle.
    Bundle { total_byte_count: ByteCount },
    /// Two standalone metadata transactions.
    V2 {
        drive_meta_data_byte_count: ByteCount,
        root_folder_meta_data_byte_count: ByteCount,
    },
}

#[derive(Clone, Debug)]
pub struct CreateDrivePlan {
    pub drive_id: EntityId,
    pub root_folder_id: EntityId,
    pub transactions: CreateDriveTransactions,
}

/// A standalone metadata write for a rename or move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaDataUpdatePlan {
    pub meta_data_byte_count: ByteCount,
}

/// Reward for one transaction.
///
/// `reward` is the unboosted estimate. The fee multiple is applied again at
/// submission against the network fee current at that time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RewardSettings {
    pub reward: Winston,
    pub fee_multiple: FeeMultiple,
}

impl RewardSettings {
    pub fn new(reward: Winston, fee_multiple: FeeMultiple) -> Self {
        Self {
            reward,
            fee_multiple,
        }
    }

    pub fn boosted_reward(&self) -> Winston {
        self.fee_multiple.boosted_reward(&self.reward)
    }
}

/// A tip paid alongside file data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommunityTipSettings {
    pub recipient: ArweaveAddress,
    pub tip: Winston,
}

#[derive(Clone, Debug)]
pub struct CalculatedBundlePlan {
    pub plan: BundlePlan,
    pub reward_settings: RewardSettings,
    pub community_tip: Option<CommunityTipSettings>,
}

#[derive(Clone, Debug)]
pub struct CalculatedFileAndMetaDataPlan {
    pub plan: V2FileAndMetaDataPlan,
    pub data_reward_settings: RewardSettings,
    pub meta_data_reward_settings: RewardSettings,
    pub community_tip: Option<CommunityTipSettings>,
}

#[derive(Clone, Debug)]
pub struct CalculatedFileDataOnlyPlan {
    pub plan: V2FileDataOnlyPlan,
    pub data_reward_settings: RewardSettings,
    pub community_tip: Option<CommunityTipSettings>,
}

#[derive(Clone, Debug)]
pub struct CalculatedFolderMetaDataPlan {
    pub plan: V2FolderMetaDataPlan,
    pub meta_data_reward_settings: RewardSettings,
}

#[derive(Clone, Debug, Default)]
pub struct CalculatedV2TxPlans {
    pub file_and_meta_data_plans: Vec<CalculatedFileAndMetaDataPlan>,
    pub file_data_only_plans: Vec<CalculatedFileDataOnlyPlan>,
    pub folder_meta_data_plans: Vec<CalculatedFolderMetaDataPlan>,
}

/// An upload plan with rewards and tips assigned.
#[derive(Clone, Debug, Default)]
pub struct CalculatedUploadPlan {
    pub bundle_plans: Vec<CalculatedBundlePlan>,
    pub v2_tx_plans: CalculatedV2TxPlans,
}

/// A priced upload plan and what it costs in total.
#[derive(Clone, Debug)]
pub struct UploadCost {
    pub calculated_plan: CalculatedUploadPlan,
    /// Boosted rewards plus tips.
    pub total_price: Winston,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CalculatedCreateDriveTransactions {
    Bundle {
        reward_settings: RewardSettings,
    },
    V2 {
        drive_reward_settings: RewardSettings,
        root_folder_reward_settings: RewardSettings,
    },
}

#[derive(Clone, Debug)]
pub struct CreateDriveCost {
    pub plan: CreateDrivePlan,
    pub transactions: CalculatedCreateDriveTransactions,
    pub total_price: Winston,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetaDataCost {
    pub reward_settings: RewardSettings,
    pub total_price: Winston,
}
