//! Upload planning and pricing for weft.
//!
//! This crate provides:
//! - Lowest-index first-fit packing of data items into bundles
//! - Upload planning for files, folder trees, drives and metadata updates
//! - Cost calculation with fee boosting and community tips

pub mod cost;
pub mod error;
pub mod packer;
pub mod plan;
pub mod planner;

pub use cost::CostCalculator;
pub use error::{PlannerError, PlannerResult};
pub use packer::{BundlePacker, DataItemPlan, PlannedBundle};
pub use plan::{
    BundlePlan, CalculatedBundlePlan, CalculatedCreateDriveTransactions,
    CalculatedFileAndMetaDataPlan, CalculatedFileDataOnlyPlan, CalculatedFolderMetaDataPlan,
    CalculatedUploadPlan, CalculatedV2TxPlans, CommunityTipSettings, CreateDriveCost,
    CreateDrivePlan, CreateDriveTransactions, MetaDataCost, MetaDataUpdatePlan, RewardSettings,
    UploadCost, UploadPlan, V2FileAndMetaDataPlan, V2FileDataOnlyPlan, V2FolderMetaDataPlan,
    V2TxPlans,
};
pub use planner::UploadPlanner;
