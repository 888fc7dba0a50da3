/// A parameter value recorded once per MCMC iteration.
///
/// Summaries are computed element-wise over `as_slice()`, so a scalar
/// parameter is a chain of dimension one.
pub trait ChainParam: Clone {
    /// Number of scalar components.
    fn dim(&self) -> usize;

    /// Flat view of the components.
    fn as_slice(&self) -> &[f64];
}

impl ChainParam for f64 {
    fn dim(&self) -> usize {
        1
    }

    fn as_slice(&self) -> &[f64] {
        std::slice::from_ref(self)
    }
}

impl ChainParam for Vec<f64> {
    fn dim(&self) -> usize {
        self.len()
    }

    fn as_slice(&self) -> &[f64] {
        &self[..]
    }
}
