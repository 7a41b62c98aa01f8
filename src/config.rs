/// Tunables for the hazard table and forced-acquisition behavior.
///
/// Session count and hazard depth vary per deployment rather than being
/// fixed at compile time, so they live in a small config struct instead of
/// named constants.
#[derive(Clone, Copy, Debug)]
pub struct EvictConfig {
    /// Number of concurrent reader sessions the hazard table reserves a row
    /// for.
    pub sessions: usize,
    /// Number of hazard slots reserved per session (the maximum tree depth
    /// a single reader may hold hazard references at concurrently).
    pub hazard_per_session: usize,
    /// An optional bound on the number of yields the forced acquirer will
    /// perform before giving up with
    /// [`crate::error::EvictError::ForceTimedOut`]. `None` is an unbounded
    /// spin and is what a production daemon should use; tests set a small
    /// budget so a stuck acquirer fails loudly instead of hanging.
    pub force_yield_budget: Option<u32>,
}

impl Default for EvictConfig {
    fn default() -> Self {
        Self {
            sessions: 64,
            hazard_per_session: 16,
            force_yield_budget: None,
        }
    }
}
