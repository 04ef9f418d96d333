use std::sync::atomic::{AtomicU8, Ordering};

const PENDING: u8 = 0;
const DONE: u8 = 1;
const CANCELLED: u8 = 2;

/// The status of a promise.
///
/// `Cancelled` is terminal just like `Done`; a cancelled promise also counts
/// as done.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum State {
    Pending,
    Done,
    Cancelled,
}

/// An atomic cell holding a [`State`].
///
/// The only allowed transitions are `Pending -> Done` and
/// `Pending -> Cancelled`, enforced with a compare-and-swap so that the
/// first terminal event wins and nothing ever leaves a terminal state.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> StateCell {
        StateCell(AtomicU8::new(PENDING))
    }

    pub(crate) fn load(&self) -> State {
        match self.0.load(Ordering::Acquire) {
            PENDING => State::Pending,
            DONE => State::Done,
            CANCELLED => State::Cancelled,
            _ => unreachable!(),
        }
    }

    /// Attempts the transition `Pending -> terminal`.
    ///
    /// Returns `false` if the cell already holds a terminal state.
    pub(crate) fn try_settle(&self, terminal: State) -> bool {
        let new = match terminal {
            State::Done => DONE,
            State::Cancelled => CANCELLED,
            State::Pending => unreachable!("cannot settle back to pending"),
        };

        self.0
            .compare_exchange(PENDING, new, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
