use std::sync::Mutex;

use alloy_primitives::Bytes;

use crate::{ExternalState, ObjectGraph};

/// An in-memory [`ExternalState`] that records everything the deployment persists.
#[derive(Debug, Default)]
pub struct MemoryExternalState {
    code: Option<Bytes>,
    inner: Mutex<Recorded>,
}

/// One call made on a [`MemoryExternalState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    /// `set_transformed_code`
    SetTransformedCode,
    /// `wait_for_callbacks`
    WaitForCallbacks,
    /// `put_object_graph`
    PutObjectGraph,
}

/// What a [`MemoryExternalState`] has observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recorded {
    /// Every side-effecting call, in call order.
    pub events: Vec<StateEvent>,
    /// Transformed code passed to `set_transformed_code`, in call order.
    pub transformed_code: Vec<Bytes>,
    /// Object graphs passed to `put_object_graph`, in call order.
    pub object_graphs: Vec<ObjectGraph>,
    /// Number of `wait_for_callbacks` calls.
    pub callback_waits: usize,
}

impl MemoryExternalState {
    /// Creates a state holding the contract package `code`.
    pub fn with_code(code: impl Into<Bytes>) -> Self {
        Self { code: Some(code.into()), inner: Mutex::default() }
    }

    /// A copy of everything recorded so far.
    pub fn recorded(&self) -> Recorded {
        self.inner.lock().unwrap().clone()
    }
}

impl ExternalState for MemoryExternalState {
    fn code(&self) -> Option<Bytes> {
        self.code.clone()
    }

    fn set_transformed_code(&self, code: Bytes) {
        let mut inner = self.inner.lock().unwrap();
        inner.events.push(StateEvent::SetTransformedCode);
        inner.transformed_code.push(code);
    }

    fn wait_for_callbacks(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.events.push(StateEvent::WaitForCallbacks);
        inner.callback_waits += 1;
    }

    fn put_object_graph(&self, graph: ObjectGraph) {
        let mut inner = self.inner.lock().unwrap();
        inner.events.push(StateEvent::PutObjectGraph);
        inner.object_graphs.push(graph);
    }
}
