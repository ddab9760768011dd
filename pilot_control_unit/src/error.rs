//! Lifecycle errors returned to the host runtime.
//!
//! Runtime faults inside the loops are not errors here: unmapped input falls
//! through to Idle and display failures are absorbed by the display service.

use pilot_common::config::ConfigError;
use pilot_common::hal::error::{DisplayError, HalError};
use pilot_common::robot::state::CompetitionPhase;
use thiserror::Error;

/// Entry-point misuse or setup failure.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A phase entry point ran before `initialize`
    #[error("robot not initialized")]
    NotInitialized,

    /// `initialize` ran twice
    #[error("robot already initialized")]
    AlreadyInitialized,

    /// The phase machine refused the transition
    #[error("cannot enter {to} from {from}: {reason}")]
    PhaseRejected {
        from: CompetitionPhase,
        to: CompetitionPhase,
        reason: &'static str,
    },

    /// Configuration rejected while building the context
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Device setup failed
    #[error(transparent)]
    Hal(#[from] HalError),

    /// The display service is unavailable
    #[error(transparent)]
    Display(#[from] DisplayError),

    /// A worker thread could not be started
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}
