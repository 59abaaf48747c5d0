//! Pricing of structural plans.

use crate::error::PlannerResult;
use crate::plan::{
    BundlePlan, CalculatedBundlePlan, CalculatedCreateDriveTransactions,
    CalculatedFileAndMetaDataPlan, CalculatedFileDataOnlyPlan, CalculatedFolderMetaDataPlan,
    CalculatedUploadPlan, CommunityTipSettings, CreateDriveCost, CreateDrivePlan,
    CreateDriveTransactions, MetaDataCost, RewardSettings, UploadCost, UploadPlan,
};
use std::sync::Arc;
use weft_core::{ByteCount, FeeMultiple, Winston};
use weft_pricing::{CommunityOracle, PriceEstimator, PricingResult};

/// Running total of what a plan costs.
#[derive(Default)]
struct PriceTally {
    total: Winston,
}

impl PriceTally {
    fn add_reward(&mut self, reward_settings: &RewardSettings) {
        self.total += &reward_settings.boosted_reward();
    }

    fn add_tip(&mut self, tip: Option<&CommunityTipSettings>) {
        if let Some(tip) = tip {
            self.total += &tip.tip;
        }
    }
}

/// Assigns rewards and community tips to plans.
///
/// Stored rewards are unboosted; the fee multiple is reapplied at
/// submission. Totals use the boosted rewards so balance checks see what
/// will actually be spent. Tips are never boosted.
pub struct CostCalculator {
    estimator: Arc<dyn PriceEstimator>,
    community_oracle: Arc<dyn CommunityOracle>,
    fee_multiple: FeeMultiple,
}

impl CostCalculator {
    pub fn new(
        estimator: Arc<dyn PriceEstimator>,
        community_oracle: Arc<dyn CommunityOracle>,
        fee_multiple: FeeMultiple,
    ) -> Self {
        Self {
            estimator,
            community_oracle,
            fee_multiple,
        }
    }

    pub fn fee_multiple(&self) -> &FeeMultiple {
        &self.fee_multiple
    }

    async fn reward_settings(&self, byte_count: ByteCount) -> PricingResult<RewardSettings> {
        let reward = self.estimator.base_fee(byte_count).await?;
        Ok(RewardSettings::new(reward, self.fee_multiple.clone()))
    }

    /// Tip owed on `data_fee`, or `None` when no tip can be arranged.
    async fn community_tip(&self, data_fee: &Winston) -> Option<CommunityTipSettings> {
        let result = async {
            let tip = self.community_oracle.tip_for(data_fee).await?;
            let recipient = self.community_oracle.select_tip_recipient().await?;
            PricingResult::Ok(CommunityTipSettings { recipient, tip })
        }
        .await;

        match result {
            Ok(tip) => Some(tip),
            Err(e) => {
                tracing::warn!(error = %e, "community tip unavailable, continuing without tip");
                None
            }
        }
    }

    async fn calculate_bundle(&self, plan: BundlePlan) -> PlannerResult<CalculatedBundlePlan> {
        let reward_settings = self.reward_settings(plan.total_byte_count).await?;
        let community_tip = if plan.contains_file_data() {
            self.community_tip(&reward_settings.reward).await
        } else {
            None
        };
        Ok(CalculatedBundlePlan {
            plan,
            reward_settings,
            community_tip,
        })
    }

    /// Price every transaction of `plan`.
    #[tracing::instrument(skip(self, plan), fields(transactions = plan.transaction_count()))]
    pub async fn calculate_costs(&self, plan: UploadPlan) -> PlannerResult<UploadCost> {
        let mut tally = PriceTally::default();
        let mut calculated = CalculatedUploadPlan::default();

        for bundle_plan in plan.bundle_plans {
            let bundle = self.calculate_bundle(bundle_plan).await?;
            tally.add_reward(&bundle.reward_settings);
            tally.add_tip(bundle.community_tip.as_ref());
            calculated.bundle_plans.push(bundle);
        }

        let v2 = plan.v2_tx_plans;
        for file_plan in v2.file_and_meta_data_plans {
            let data_reward_settings = self.reward_settings(file_plan.file_data_byte_count).await?;
            let meta_data_reward_settings =
                self.reward_settings(file_plan.meta_data_byte_count).await?;
            let community_tip = self.community_tip(&data_reward_settings.reward).await;

            tally.add_reward(&data_reward_settings);
            tally.add_reward(&meta_data_reward_settings);
            tally.add_tip(community_tip.as_ref());
            calculated
                .v2_tx_plans
                .file_and_meta_data_plans
                .push(CalculatedFileAndMetaDataPlan {
                    plan: file_plan,
                    data_reward_settings,
                    meta_data_reward_settings,
                    community_tip,
                });
        }

        for file_plan in v2.file_data_only_plans {
            let data_reward_settings = self.reward_settings(file_plan.file_data_byte_count).await?;
            let community_tip = self.community_tip(&data_reward_settings.reward).await;

            tally.add_reward(&data_reward_settings);
            tally.add_tip(community_tip.as_ref());
            calculated
                .v2_tx_plans
                .file_data_only_plans
                .push(CalculatedFileDataOnlyPlan {
                    plan: file_plan,
                    data_reward_settings,
                    community_tip,
                });
        }

        for folder_plan in v2.folder_meta_data_plans {
            let meta_data_reward_settings =
                self.reward_settings(folder_plan.meta_data_byte_count).await?;

            tally.add_reward(&meta_data_reward_settings);
            calculated
                .v2_tx_plans
                .folder_meta_data_plans
                .push(CalculatedFolderMetaDataPlan {
                    plan: folder_plan,
                    meta_data_reward_settings,
                });
        }

        tracing::info!(
            total_price = %tally.total,
            fee_multiple = %self.fee_multiple,
            "calculated upload cost"
        );
        Ok(UploadCost {
            calculated_plan: calculated,
            total_price: tally.total,
        })
    }

    /// Price the writes creating a drive. Drive creation never carries a tip.
    #[tracing::instrument(skip(self, plan), fields(drive_id = %plan.drive_id))]
    pub async fn calculate_cost_for_create_drive(
        &self,
        plan: CreateDrivePlan,
    ) -> PlannerResult<CreateDriveCost> {
        let mut tally = PriceTally::default();
        let transactions = match &plan.transactions {
            CreateDriveTransactions::Bundle { total_byte_count } => {
                let reward_settings = self.reward_settings(*total_byte_count).await?;
                tally.add_reward(&reward_settings);
                CalculatedCreateDriveTransactions::Bundle { reward_settings }
            }
            CreateDriveTransactions::V2 {
                drive_meta_data_byte_count,
                root_folder_meta_data_byte_count,
            } => {
                let drive_reward_settings =
                    self.reward_settings(*drive_meta_data_byte_count).await?;
                let root_folder_reward_settings = self
                    .reward_settings(*root_folder_meta_data_byte_count)
                    .await?;
                tally.add_reward(&drive_reward_settings);
                tally.add_reward(&root_folder_reward_settings);
                CalculatedCreateDriveTransactions::V2 {
                    drive_reward_settings,
                    root_folder_reward_settings,
                }
            }
        };

        Ok(CreateDriveCost {
            plan,
            transactions,
            total_price: tally.total,
        })
    }

    /// Price a standalone metadata write of `byte_count` bytes.
    pub async fn calculate_cost_for_metadata_upload(
        &self,
        byte_count: ByteCount,
    ) -> PlannerResult<MetaDataCost> {
        let reward_settings = self.reward_settings(byte_count).await?;
        let total_price = reward_settings.boosted_reward();
        Ok(MetaDataCost {
            reward_settings,
            total_price,
        })
    }
}
