use tc_core::{AgentId, CoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("agent {0} is not part of this simulation")]
    UnknownAgent(AgentId),

    #[error("agent at index {index} has id {got}; ids must match their position")]
    AgentIdMismatch {
        index: usize,
        got:   AgentId,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
