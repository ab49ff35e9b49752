// vim: tw=80
//! Invocation history.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering}
};
use tracing::debug;

use crate::{
    invocation::{Invocation, MethodSignature, MockId},
    value::Value
};

/// Orders invocations across every mock of a session.
///
/// Values handed out are strictly increasing in the order of the calls that
/// took them.  A counter is never reset; a fresh session gets a fresh counter.
#[derive(Debug, Default)]
pub struct SequenceCounter(AtomicU64);

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting at `start`.  Useful to make sequence numbers of
    /// different sessions distinguishable in logs.
    pub fn starting_at(start: u64) -> Self {
        SequenceCounter(AtomicU64::new(start))
    }

    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    /// The value the next call to [`next`](#method.next) will return.
    pub fn peek(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Append-only history of one mock's invocations.
pub(crate) struct InvocationRecorder {
    mock: MockId,
    mock_name: Arc<str>,
    counter: Arc<SequenceCounter>,
    history: Vec<Arc<Invocation>>
}

impl InvocationRecorder {
    pub fn new(mock: MockId, mock_name: Arc<str>, counter: Arc<SequenceCounter>)
        -> Self
    {
        InvocationRecorder {
            mock,
            mock_name,
            counter,
            history: Vec::new()
        }
    }

    /// Number and append a new invocation.
    ///
    /// Must be called with the owning mock's lock held, so that history order
    /// agrees with sequence number order.
    pub fn record(&mut self, signature: MethodSignature, args: Vec<Arc<dyn Value>>)
        -> Arc<Invocation>
    {
        let seq = self.counter.next();
        let invocation = Arc::new(Invocation::new(self.mock,
            self.mock_name.clone(), signature, args, seq));
        debug!(mock = %self.mock, seq, invocation = %invocation,
               "recorded invocation");
        self.history.push(invocation.clone());
        invocation
    }

    /// A freshly owned copy of the history, oldest first.
    pub fn invocations(&self) -> Vec<Arc<Invocation>> {
        self.history.clone()
    }

    /// Forget all recorded invocations.  Sequence numbers keep increasing.
    pub fn clear(&mut self) {
        self.history.clear();
    }
}
