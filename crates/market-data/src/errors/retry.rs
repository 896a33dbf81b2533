/// Classification for retry policy.
///
/// There is no retry inside a refresh cycle. The classification only tells the
/// caller whether the next scheduled tick (or a deferred setup attempt) can
/// succeed where this one failed.
///
/// # Behavior Summary
///
/// | Class | Retry on next tick? | Setup outcome |
/// |-------|---------------------|---------------|
/// | `NextTick` | Yes | Not ready, host retries later |
/// | `Never` | No | Fatal, configuration must change |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Transient failure: remote status, timeout, transport error or a
    /// response that lacked the mandatory price.
    NextTick,

    /// The request can never succeed as configured.
    Never,
}

impl RetryClass {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NextTick)
    }
}
