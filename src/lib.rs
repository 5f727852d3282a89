pub mod builds;
pub mod cluster;
pub mod config;
pub mod http;
pub mod plugins;
pub mod poller;
pub mod project;
pub mod scenario;
pub mod steps;
pub mod suite;

pub use cluster::{FetchError, Oc, ResourceKind};
pub use poller::{poll_until, MatchPolicy, PollRequest, PollResult};
