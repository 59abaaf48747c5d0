pub mod fixtures;
pub mod mocks;

#[allow(unused_imports)]
pub use fixtures::{file_order, file_stats, folder_order, folder_stats, init_tracing, owner};
#[allow(unused_imports)]
pub use mocks::{IdentityEstimator, IdentityOracle, StubCommunityOracle};
