//! Built-in task modules

pub mod login_banner;
pub mod on_demand_snapshot;
pub mod physical_host;

pub use login_banner::LoginBanner;
pub use on_demand_snapshot::OnDemandSnapshot;
pub use physical_host::PhysicalHost;

use crate::task::Task;

/// Every task this crate provides
#[must_use]
pub fn builtin_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(LoginBanner),
        Box::new(OnDemandSnapshot),
        Box::new(PhysicalHost),
    ]
}

/// Look up a task by module name
///
/// The `rubrik_` prefix may be omitted.
#[must_use]
pub fn find_task(name: &str) -> Option<Box<dyn Task>> {
    builtin_tasks()
        .into_iter()
        .find(|task| task.name() == name || task.name().strip_prefix("rubrik_") == Some(name))
}
