//! Task outcomes and the result handed back to the host runtime

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ModuleError;

/// Phrase the cluster uses when an operation was already satisfied
///
/// Matching free text is fragile; keep every use behind [`is_no_change`].
pub const NO_CHANGE_SENTINEL: &str = "no change required";

/// Whether a response reports that nothing had to be changed
#[must_use]
pub fn is_no_change(response: &Value) -> bool {
    response
        .as_str()
        .is_some_and(|text| text.to_lowercase().contains(NO_CHANGE_SENTINEL))
}

/// Normalized result of a successful task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOutcome {
    pub changed: bool,
    pub response: Value,
    /// Task specific fields emitted next to `changed` and `response`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskOutcome {
    /// Outcome whose `changed` flag is derived from the response text
    #[must_use]
    pub fn from_response(response: Value) -> Self {
        OutcomeBuilder::new(response).build()
    }

    /// Outcome for operations that always create new state
    #[must_use]
    pub fn always_changed(response: Value) -> Self {
        OutcomeBuilder::new(response).changed(true).build()
    }
}

/// Builder for [`TaskOutcome`]
#[derive(Debug, Clone)]
pub struct OutcomeBuilder {
    response: Value,
    changed: Option<bool>,
    extra: Map<String, Value>,
}

impl OutcomeBuilder {
    #[must_use]
    pub fn new(response: Value) -> Self {
        Self {
            response,
            changed: None,
            extra: Map::new(),
        }
    }

    /// Override the sentinel based `changed` detection
    #[must_use]
    pub fn changed(mut self, changed: bool) -> Self {
        self.changed = Some(changed);
        self
    }

    /// Add a task specific field
    ///
    /// `changed` and `response` are reserved and ignored here.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "changed" && key != "response" {
            self.extra.insert(key, value.into());
        }
        self
    }

    #[must_use]
    pub fn build(self) -> TaskOutcome {
        let changed = self
            .changed
            .unwrap_or_else(|| !is_no_change(&self.response));
        TaskOutcome {
            changed,
            response: self.response,
            extra: self.extra,
        }
    }
}

/// JSON object printed for the host runtime
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModuleResult {
    Success(TaskOutcome),
    Failure { failed: bool, msg: String },
}

impl ModuleResult {
    #[must_use]
    pub fn failure(msg: impl Into<String>) -> Self {
        ModuleResult::Failure {
            failed: true,
            msg: msg.into(),
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, ModuleResult::Failure { .. })
    }
}

impl From<Result<TaskOutcome, ModuleError>> for ModuleResult {
    fn from(result: Result<TaskOutcome, ModuleError>) -> Self {
        match result {
            Ok(outcome) => ModuleResult::Success(outcome),
            Err(err) => ModuleResult::failure(err.to_string()),
        }
    }
}
