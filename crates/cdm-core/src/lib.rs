//! cdm-core: task modules for Rubrik CDM clusters
//!
//! Holds the argument schemas, credential resolution, outcome normalization,
//! and the built-in tasks. [`dispatch`] ties them together for one
//! invocation.

pub mod credentials;
pub mod dispatch;
pub mod doc;
pub mod error;
pub mod outcome;
pub mod params;
pub mod schema;
pub mod task;
pub mod tasks;

pub use credentials::{CredentialInputs, ProviderBlock, resolve};
pub use dispatch::{dispatch, execute};
pub use doc::render_documentation;
pub use error::{ModuleError, SchemaError};
pub use outcome::{ModuleResult, OutcomeBuilder, TaskOutcome, is_no_change};
pub use params::Params;
pub use schema::{ArgumentSpec, ParamKind, ParamSpec};
pub use task::Task;
pub use tasks::{builtin_tasks, find_task};
