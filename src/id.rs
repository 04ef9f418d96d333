use std::fmt;

use crossbeam_utils::atomic::AtomicCell;

/// A unique identifier for a promise.
///
/// Ids are handed out at spawn time and show up in the crate's trace logs,
/// so a promise can be correlated with its `spawn`, `cancel`, and `settled`
/// records.
///
/// # Examples
///
/// ```
/// # async_std::task::block_on(async {
/// let promise = async_promise::spawn(async { Ok::<_, ()>(()) });
/// println!("id = {}", promise.id());
/// # });
/// ```
#[derive(Eq, PartialEq, Clone, Copy, Hash, Debug)]
pub struct PromiseId(pub(crate) u64);

impl PromiseId {
    /// Generates a new `PromiseId`.
    pub(crate) fn generate() -> PromiseId {
        static COUNTER: AtomicCell<u64> = AtomicCell::new(1);

        PromiseId(COUNTER.fetch_add(1))
    }
}

impl fmt::Display for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
