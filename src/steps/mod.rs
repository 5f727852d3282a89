//! Step handlers, one module per group of BDD phrases.
//!
//! Each handler is an async function taking the scenario context; the
//! phrase → handler binding lives in [`crate::suite`].

pub mod build_steps;
pub mod delete_steps;
pub mod deployment_steps;
pub mod env_steps;
pub mod plugin_steps;
pub mod project_steps;
pub mod resource_steps;
pub mod template_steps;
pub mod volume_steps;
