pub mod command;
pub mod kind;
pub mod oc;

use thiserror::Error;

pub use command::{CommandOutput, CommandRunner};
pub use kind::ResourceKind;
pub use oc::Oc;

/// Failure of an external status fetch or CLI call.
///
/// Every variant aborts the current assertion immediately; there is no
/// retry classification here. Call sites that want to ride out transient
/// lookup failures wrap their fetch with [`crate::poller::poll_until_tolerant`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {code}: {output}")]
    CommandFailed {
        command: String,
        code: i32,
        output: String,
    },

    #[error("{kind} {name} not found in namespace {namespace}")]
    NotFound {
        kind: ResourceKind,
        name: String,
        namespace: String,
    },

    #[error("http request failed: {0}")]
    Http(String),
}
