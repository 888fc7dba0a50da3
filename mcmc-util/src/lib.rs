//! Posterior summaries for MCMC traces.

pub mod chain;
pub mod traits;

pub use chain::{McmcChain, ScalarChain};
pub use traits::ChainParam;
