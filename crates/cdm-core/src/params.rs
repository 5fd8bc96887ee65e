//! Validated task parameters

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::ModuleError;

/// Immutable parameter record produced by schema validation
///
/// Every declared parameter is present; unset ones hold `null`.
#[derive(Clone, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, Value>,
    /// Names declared `no_log`, redacted from `Debug` output
    secret: BTreeSet<String>,
}

impl Params {
    pub(crate) fn new(values: BTreeMap<String, Value>, secret: BTreeSet<String>) -> Self {
        Self { values, secret }
    }

    /// Raw value of a parameter, `None` when unset
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn dict(&self, name: &str) -> Option<&Map<String, Value>> {
        self.get(name).and_then(Value::as_object)
    }

    /// A string parameter that must be set
    ///
    /// # Errors
    /// Returns [`ModuleError::Argument`] if the parameter is unset or not a
    /// string.
    pub fn require_str(&self, name: &str) -> Result<&str, ModuleError> {
        self.str(name)
            .ok_or_else(|| ModuleError::Argument(format!("missing required arguments: {name}")))
    }

    /// The `timeout` parameter as a duration
    ///
    /// # Errors
    /// Returns [`ModuleError::Argument`] if the task declares no positive
    /// `timeout`.
    pub fn timeout(&self) -> Result<Duration, ModuleError> {
        match self.int("timeout") {
            Some(secs) if secs > 0 => Ok(Duration::from_secs(secs.unsigned_abs())),
            _ => Err(ModuleError::Argument(
                "timeout must be a positive number of seconds".to_string(),
            )),
        }
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.values {
            if self.secret.contains(name) && !value.is_null() {
                map.entry(name, &"********");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}
