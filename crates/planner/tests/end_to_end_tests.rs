// Planning and costing driven by application configuration

mod common;

use common::{IdentityOracle, folder_order, init_tracing};
use std::sync::Arc;
use weft_core::config::AppConfig;
use weft_core::{ByteCount, WrappedFile, WrappedFolder, Winston};
use weft_planner::{CostCalculator, UploadPlanner};
use weft_pricing::FixedCommunityOracle;

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.tip.recipient = Some("r".repeat(43));
    config.tip.minimum_winston = Winston::from(1);
    config
}

#[tokio::test]
async fn test_configured_pipeline_prices_folder_upload() {
    init_tracing();
    let config = config();
    let planner = UploadPlanner::from_config(&config).unwrap();
    let estimator = weft_pricing::from_config(&config.pricing, Arc::new(IdentityOracle)).unwrap();
    let community = Arc::new(FixedCommunityOracle::from_config(&config.tip).unwrap());
    let calculator = CostCalculator::new(
        Arc::clone(&estimator),
        community,
        config.fees.fee_multiple.clone(),
    );

    let tree = WrappedFolder::new("docs")
        .with_file(WrappedFile::new("a.txt", ByteCount::new(5_000)))
        .with_file(WrappedFile::new("b.txt", ByteCount::new(7_000)));
    let plan = planner
        .plan_upload_all_entities(&[folder_order(tree)])
        .unwrap();
    assert_eq!(plan.bundle_plans.len(), 1);
    let bundle_size = plan.bundle_plans[0].total_byte_count;

    let cost = calculator.calculate_costs(plan).await.unwrap();
    let bundle = &cost.calculated_plan.bundle_plans[0];
    let expected_reward = estimator.base_fee(bundle_size).await.unwrap();
    assert_eq!(bundle.reward_settings.reward, expected_reward);

    let tip = bundle.community_tip.as_ref().unwrap();
    assert_eq!(tip.recipient.as_str(), "r".repeat(43));
    assert_eq!(cost.total_price, &expected_reward + &tip.tip);
}

#[tokio::test]
async fn test_missing_recipient_uploads_without_tip() {
    let mut config = config();
    config.tip.recipient = None;
    let planner = UploadPlanner::from_config(&config).unwrap();
    let estimator = weft_pricing::from_config(&config.pricing, Arc::new(IdentityOracle)).unwrap();
    let calculator = CostCalculator::new(
        estimator,
        Arc::new(FixedCommunityOracle::from_config(&config.tip).unwrap()),
        config.fees.fee_multiple.clone(),
    );

    let tree = WrappedFolder::new("docs").with_file(WrappedFile::new("a.txt", ByteCount::new(1)));
    let plan = planner
        .plan_upload_all_entities(&[folder_order(tree)])
        .unwrap();
    let cost = calculator.calculate_costs(plan).await.unwrap();
    assert!(cost.calculated_plan.bundle_plans[0].community_tip.is_none());
}
