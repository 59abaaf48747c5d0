pub mod mocks;

#[allow(unused_imports)]
pub use mocks::{CountingOracle, FailingEstimator, FailingOracle};
