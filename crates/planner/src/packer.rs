//! First-fit packing of data items into size- and count-limited bundles.

use crate::error::{PlannerError, PlannerResult};
use crate::plan::BundlePlan;
use weft_core::config::BundlingConfig;
use weft_core::data_item::bundle_envelope_byte_count;
use weft_core::{ByteCount, UploadStats};

/// One placement request: a group of data items that must share a bundle.
#[derive(Clone, Debug)]
pub struct DataItemPlan {
    pub upload_stats: Option<UploadStats>,
    /// Summed size of the data items once wrapped.
    pub total_byte_count: ByteCount,
    pub data_item_count: u64,
}

impl DataItemPlan {
    /// A file's data item and its metadata item.
    pub fn file_and_meta_data(upload_stats: UploadStats, total_byte_count: ByteCount) -> Self {
        Self {
            upload_stats: Some(upload_stats),
            total_byte_count,
            data_item_count: 2,
        }
    }

    /// A single metadata item.
    pub fn meta_data(upload_stats: UploadStats, byte_count: ByteCount) -> Self {
        Self {
            upload_stats: Some(upload_stats),
            total_byte_count: byte_count,
            data_item_count: 1,
        }
    }

    /// Whether this plan carries a file's metadata without its data.
    fn is_file_meta_data_only(&self) -> bool {
        self.data_item_count < 2
            && self
                .upload_stats
                .as_ref()
                .is_some_and(UploadStats::is_file)
    }
}

/// A bundle being filled.
#[derive(Clone, Debug)]
pub struct PlannedBundle {
    max_bundle_size: ByteCount,
    max_data_item_limit: u64,
    data_item_plans: Vec<DataItemPlan>,
    total_byte_count: ByteCount,
    total_data_item_count: u64,
}

impl PlannedBundle {
    fn new(max_bundle_size: ByteCount, max_data_item_limit: u64) -> Self {
        Self {
            max_bundle_size,
            max_data_item_limit,
            data_item_plans: Vec::new(),
            total_byte_count: ByteCount::ZERO,
            total_data_item_count: 0,
        }
    }

    pub fn remaining_byte_capacity(&self) -> ByteCount {
        self.max_bundle_size
            .minus(self.total_byte_count)
            .unwrap_or(ByteCount::ZERO)
    }

    pub fn remaining_data_item_capacity(&self) -> u64 {
        self.max_data_item_limit
            .saturating_sub(self.total_data_item_count)
    }

    pub fn can_fit(&self, plan: &DataItemPlan) -> bool {
        plan.total_byte_count <= self.remaining_byte_capacity()
            && plan.data_item_count <= self.remaining_data_item_capacity()
    }

    fn add(&mut self, plan: DataItemPlan) {
        self.total_byte_count = self.total_byte_count.saturating_add(plan.total_byte_count);
        self.total_data_item_count += plan.data_item_count;
        self.data_item_plans.push(plan);
    }

    pub fn data_item_plans(&self) -> &[DataItemPlan] {
        &self.data_item_plans
    }

    /// Summed size of the contained data items.
    pub fn total_byte_count(&self) -> ByteCount {
        self.total_byte_count
    }

    pub fn total_data_item_count(&self) -> u64 {
        self.total_data_item_count
    }

    /// Size of the finished bundle: header, entry table and data items.
    pub fn envelope_byte_count(&self) -> ByteCount {
        bundle_envelope_byte_count(self.total_byte_count, self.total_data_item_count)
    }

    pub(crate) fn into_data_item_plans(self) -> Vec<DataItemPlan> {
        self.data_item_plans
    }

    /// The transaction this bundle becomes.
    pub fn to_bundle_plan(&self) -> BundlePlan {
        let mut plan = BundlePlan::new(Vec::new(), self.envelope_byte_count());
        for item in &self.data_item_plans {
            let Some(stats) = item.upload_stats.clone() else {
                continue;
            };
            if item.is_file_meta_data_only() {
                plan.meta_data_only_stats.push(stats);
            } else {
                plan.upload_stats.push(stats);
            }
        }
        plan
    }
}

/// Assigns data items to bundles, lowest index first.
///
/// A packer is single use: create one per planning call and read its
/// bundles when done.
#[derive(Debug)]
pub struct BundlePacker {
    max_bundle_size: ByteCount,
    max_data_item_limit: u64,
    bundles: Vec<PlannedBundle>,
}

impl BundlePacker {
    pub fn new(max_bundle_size: ByteCount, max_data_item_limit: u64) -> PlannerResult<Self> {
        if max_data_item_limit < 2 {
            return Err(PlannerError::InvalidDataItemLimit(max_data_item_limit));
        }
        if max_bundle_size.is_zero() {
            return Err(PlannerError::InvalidBundleSize);
        }
        Ok(Self {
            max_bundle_size,
            max_data_item_limit,
            bundles: Vec::new(),
        })
    }

    pub fn from_config(config: &BundlingConfig) -> PlannerResult<Self> {
        Self::new(
            ByteCount::new(config.max_bundle_size),
            config.max_data_item_limit,
        )
    }

    /// Place `plan` in the first bundle with room for it, opening a new
    /// bundle when none has. Returns the index of the bundle used.
    ///
    /// A plan that would not fit even an empty bundle is rejected.
    pub fn pack_into_bundle(&mut self, plan: DataItemPlan) -> PlannerResult<usize> {
        if plan.total_byte_count > self.max_bundle_size
            || plan.data_item_count > self.max_data_item_limit
        {
            return Err(PlannerError::ExceedsBundleLimits {
                byte_count: plan.total_byte_count,
                data_item_count: plan.data_item_count,
                max_bundle_size: self.max_bundle_size,
                max_data_item_limit: self.max_data_item_limit,
            });
        }

        let index = match self.bundles.iter().position(|bundle| bundle.can_fit(&plan)) {
            Some(index) => index,
            None => {
                self.bundles
                    .push(PlannedBundle::new(self.max_bundle_size, self.max_data_item_limit));
                self.bundles.len() - 1
            }
        };
        tracing::debug!(
            bundle_index = index,
            byte_count = %plan.total_byte_count,
            data_items = plan.data_item_count,
            "packed data items into bundle"
        );
        self.bundles[index].add(plan);
        Ok(index)
    }

    /// Whether data items of these sizes would fit together in one empty
    /// bundle.
    pub fn can_pack_data_items_with_byte_counts(&self, byte_counts: &[ByteCount]) -> bool {
        let total = byte_counts
            .iter()
            .fold(ByteCount::ZERO, |total, count| total.saturating_add(*count));
        total <= self.max_bundle_size && byte_counts.len() as u64 <= self.max_data_item_limit
    }

    pub fn bundles(&self) -> &[PlannedBundle] {
        &self.bundles
    }

    pub fn into_bundles(self) -> Vec<PlannedBundle> {
        self.bundles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(bytes: u64, items: u64) -> DataItemPlan {
        DataItemPlan {
            upload_stats: None,
            total_byte_count: ByteCount::new(bytes),
            data_item_count: items,
        }
    }

    fn packer(max_size: u64, max_items: u64) -> BundlePacker {
        BundlePacker::new(ByteCount::new(max_size), max_items).unwrap()
    }

    #[test]
    fn test_rejects_item_limit_below_two() {
        assert!(matches!(
            BundlePacker::new(ByteCount::new(100), 1),
            Err(PlannerError::InvalidDataItemLimit(1))
        ));
        assert!(matches!(
            BundlePacker::new(ByteCount::ZERO, 2),
            Err(PlannerError::InvalidBundleSize)
        ));
    }

    #[test]
    fn test_overflowing_bytes_open_new_bundle() {
        let mut packer = packer(100, 10);
        assert_eq!(packer.pack_into_bundle(plan(50, 2)).unwrap(), 0);
        assert_eq!(packer.pack_into_bundle(plan(51, 2)).unwrap(), 1);
        assert_eq!(packer.bundles().len(), 2);
    }

    #[test]
    fn test_first_fit_backfills_lowest_index() {
        let mut packer = packer(100, 10);
        assert_eq!(packer.pack_into_bundle(plan(60, 1)).unwrap(), 0);
        assert_eq!(packer.pack_into_bundle(plan(60, 1)).unwrap(), 1);
        assert_eq!(packer.pack_into_bundle(plan(30, 1)).unwrap(), 0);
        assert_eq!(packer.pack_into_bundle(plan(40, 1)).unwrap(), 1);
        assert_eq!(packer.bundles()[0].remaining_byte_capacity(), ByteCount::new(10));
    }

    #[test]
    fn test_item_limit_opens_new_bundle() {
        let mut packer = packer(1_000, 3);
        assert_eq!(packer.pack_into_bundle(plan(1, 2)).unwrap(), 0);
        assert_eq!(packer.pack_into_bundle(plan(1, 2)).unwrap(), 1);
        assert_eq!(packer.pack_into_bundle(plan(1, 1)).unwrap(), 0);
        assert_eq!(packer.bundles()[0].remaining_data_item_capacity(), 0);
    }

    #[test]
    fn test_bundles_never_exceed_limits() {
        let mut packer = packer(1_000, 5);
        for i in 0..200u64 {
            packer
                .pack_into_bundle(plan((i * 37) % 400 + 1, i % 2 + 1))
                .unwrap();
        }
        for bundle in packer.bundles() {
            assert!(bundle.total_byte_count() <= ByteCount::new(1_000));
            assert!(bundle.total_data_item_count() <= 5);
        }
    }

    #[test]
    fn test_oversized_plan_is_rejected() {
        let mut packer = packer(100, 10);
        let err = packer.pack_into_bundle(plan(150, 1)).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::ExceedsBundleLimits {
                data_item_count: 1,
                ..
            }
        ));
        assert!(matches!(
            packer.pack_into_bundle(plan(1, 11)),
            Err(PlannerError::ExceedsBundleLimits { .. })
        ));
        assert!(packer.bundles().is_empty());

        assert_eq!(packer.pack_into_bundle(plan(100, 10)).unwrap(), 0);
    }

    #[test]
    fn test_can_pack_checks_both_limits() {
        let packer = packer(100, 2);
        assert!(packer.can_pack_data_items_with_byte_counts(&[
            ByteCount::new(50),
            ByteCount::new(50)
        ]));
        assert!(!packer.can_pack_data_items_with_byte_counts(&[
            ByteCount::new(50),
            ByteCount::new(51)
        ]));
        assert!(!packer.can_pack_data_items_with_byte_counts(&[
            ByteCount::new(1),
            ByteCount::new(1),
            ByteCount::new(1)
        ]));
    }

    #[test]
    fn test_envelope_counts_headers() {
        let mut packer = packer(1_000, 10);
        packer.pack_into_bundle(plan(100, 2)).unwrap();
        packer.pack_into_bundle(plan(50, 1)).unwrap();
        // 32 + 150 + 64 * 3
        assert_eq!(
            packer.bundles()[0].envelope_byte_count(),
            ByteCount::new(374)
        );
    }
}
