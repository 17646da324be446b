use std::sync::Arc;

use crate::assistant::Assistant;
use crate::vectordb::VectorDbClient;

/// Shared, read-only handles passed to every request.
pub struct HandlerState<V: VectorDbClient + 'static> {
    pub assistant: Arc<Assistant<V>>,
}

impl<V: VectorDbClient + 'static> Clone for HandlerState<V> {
    fn clone(&self) -> Self {
        Self {
            assistant: Arc::clone(&self.assistant),
        }
    }
}

impl<V: VectorDbClient + 'static> HandlerState<V> {
    pub fn new(assistant: Assistant<V>) -> Self {
        Self {
            assistant: Arc::new(assistant),
        }
    }
}
