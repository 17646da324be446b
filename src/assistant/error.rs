use thiserror::Error;

use crate::answer::CompositionError;
use crate::classifier::ClassificationError;
use crate::retrieval::RetrievalError;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("query is empty")]
    EmptyQuery,

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    /// Only surfaced under [`RetrievalFailurePolicy::Abort`](crate::config::RetrievalFailurePolicy::Abort).
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Composition(#[from] CompositionError),
}
