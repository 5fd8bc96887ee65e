//! Argument schemas and parameter validation
//!
//! Each task declares its own [`ArgumentSpec`]. The shared credential schema
//! is merged in with [`ArgumentSpec::compose`], which refuses overlapping
//! names instead of silently overwriting them.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};

use crate::error::{ModuleError, SchemaError};
use crate::params::Params;

/// Description used for every `timeout` parameter
pub const TIMEOUT_DESCRIPTION: &str = "The number of seconds to wait to establish a connection the Rubrik cluster before returning a timeout error.";

/// Upper bound accepted for `timeout` parameters, in seconds
pub const MAX_TIMEOUT_SECS: i64 = 86_400;

/// Value type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Str,
    Int,
    /// Any JSON value, left for the task to interpret
    Raw,
    Dict,
}

impl ParamKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParamKind::Str => "str",
            ParamKind::Int => "int",
            ParamKind::Raw => "raw",
            ParamKind::Dict => "dict",
        }
    }
}

/// Declaration of a single parameter
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<Value>,
    pub choices: Vec<&'static str>,
    pub aliases: Vec<&'static str>,
    /// Value must not appear in logs
    pub no_log: bool,
    /// Inclusive bounds for `int` parameters
    pub range: Option<(i64, i64)>,
    /// Nested options of a `dict` parameter
    pub options: Option<ArgumentSpec>,
    pub description: Vec<&'static str>,
}

impl ParamSpec {
    #[must_use]
    pub fn new(kind: ParamKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            choices: Vec::new(),
            aliases: Vec::new(),
            no_log: false,
            range: None,
            options: None,
            description: Vec::new(),
        }
    }

    /// A `timeout` parameter with the given default in seconds
    #[must_use]
    pub fn timeout(default_secs: i64) -> Self {
        Self::new(ParamKind::Int)
            .default(default_secs)
            .range(1, MAX_TIMEOUT_SECS)
            .description(TIMEOUT_DESCRIPTION)
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn choices(mut self, choices: &[&'static str]) -> Self {
        self.choices = choices.to_vec();
        self
    }

    #[must_use]
    pub fn aliases(mut self, aliases: &[&'static str]) -> Self {
        self.aliases = aliases.to_vec();
        self
    }

    #[must_use]
    pub fn no_log(mut self) -> Self {
        self.no_log = true;
        self
    }

    #[must_use]
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    #[must_use]
    pub fn options(mut self, options: ArgumentSpec) -> Self {
        self.options = Some(options);
        self
    }

    /// Append a line of documentation
    #[must_use]
    pub fn description(mut self, line: &'static str) -> Self {
        self.description.push(line);
        self
    }

    /// Whether the value, or any nested option, must stay out of logs
    #[must_use]
    pub fn is_secret(&self) -> bool {
        self.no_log
            || self
                .options
                .as_ref()
                .is_some_and(|options| options.iter().any(|(_, spec)| spec.is_secret()))
    }

    /// Convert a raw value to this parameter's type
    fn coerce(&self, name: &str, value: Value) -> Result<Value, ModuleError> {
        let mismatch = |value: &Value| {
            ModuleError::Argument(format!(
                "argument '{name}' is of type {} and we were unable to convert to {}",
                json_type(value),
                self.kind.as_str()
            ))
        };

        let value = match (self.kind, value) {
            (ParamKind::Raw, value) => value,
            (ParamKind::Str, Value::String(s)) => Value::String(s),
            (ParamKind::Str, Value::Number(n)) => Value::String(n.to_string()),
            (ParamKind::Str, Value::Bool(b)) => Value::String(b.to_string()),
            (ParamKind::Int, Value::Number(n)) if n.is_i64() => Value::Number(n),
            (ParamKind::Int, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => return Err(mismatch(&Value::String(s))),
            },
            (ParamKind::Dict, Value::Object(map)) => match &self.options {
                Some(options) => {
                    Value::Object(options.validate_object(&map, Some(name))?.into_iter().collect())
                }
                None => Value::Object(map),
            },
            (_, value) => return Err(mismatch(&value)),
        };

        if !self.choices.is_empty() {
            let as_text = match &value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if !self.choices.contains(&as_text.as_str()) {
                return Err(ModuleError::Argument(format!(
                    "value of {name} must be one of: {}, got: {as_text}",
                    self.choices.join(", ")
                )));
            }
        }

        if let (Some((min, max)), Some(n)) = (self.range, value.as_i64())
            && !(min..=max).contains(&n)
        {
            return Err(ModuleError::Argument(format!(
                "value of {name} must be between {min} and {max}, got: {n}"
            )));
        }

        Ok(value)
    }
}

/// "If `field` equals `value`, every name in `requires` must be set"
#[derive(Debug, Clone)]
pub struct RequiredIf {
    pub field: &'static str,
    pub value: &'static str,
    pub requires: Vec<&'static str>,
}

/// Ordered set of parameter declarations plus cross-field rules
#[derive(Debug, Clone, Default)]
pub struct ArgumentSpec {
    params: Vec<(&'static str, ParamSpec)>,
    required_if: Vec<RequiredIf>,
}

impl ArgumentSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter
    #[must_use]
    pub fn param(mut self, name: &'static str, spec: ParamSpec) -> Self {
        self.params.push((name, spec));
        self
    }

    /// Add a conditional requirement
    #[must_use]
    pub fn required_if(
        mut self,
        field: &'static str,
        value: &'static str,
        requires: &[&'static str],
    ) -> Self {
        self.required_if.push(RequiredIf {
            field,
            value,
            requires: requires.to_vec(),
        });
        self
    }

    /// Credential parameters shared by every task
    ///
    /// Declares `node_ip`, `username`, `password`, `api_token`, and a
    /// `provider` dict carrying the same four options.
    #[must_use]
    pub fn credentials() -> Self {
        let fields = Self::new()
            .param(
                "node_ip",
                ParamSpec::new(ParamKind::Str)
                    .description("The DNS name or IP address of the Rubrik cluster."),
            )
            .param(
                "username",
                ParamSpec::new(ParamKind::Str)
                    .description("The username used to authenticate against the Rubrik cluster."),
            )
            .param(
                "password",
                ParamSpec::new(ParamKind::Str)
                    .no_log()
                    .description("The password used to authenticate against the Rubrik cluster."),
            )
            .param(
                "api_token",
                ParamSpec::new(ParamKind::Str)
                    .no_log()
                    .description("The API token used to authenticate against the Rubrik cluster."),
            );

        Self::new()
            .param(
                "provider",
                ParamSpec::new(ParamKind::Dict)
                    .options(fields.clone())
                    .description("Connection details grouped into a single parameter."),
            )
            .merge_unchecked(fields)
    }

    fn merge_unchecked(mut self, other: ArgumentSpec) -> Self {
        self.params.extend(other.params);
        self.required_if.extend(other.required_if);
        self
    }

    /// Union of a task schema and a shared schema
    ///
    /// # Errors
    /// Returns [`SchemaError::Collision`] if any name or alias is declared
    /// by both.
    pub fn compose(task: ArgumentSpec, shared: ArgumentSpec) -> Result<Self, SchemaError> {
        let task_names: HashSet<&str> = task.all_names().collect();
        if let Some(name) = shared.all_names().find(|name| task_names.contains(name)) {
            return Err(SchemaError::Collision(name.to_string()));
        }
        Ok(task.merge_unchecked(shared))
    }

    /// Parameter names and aliases
    fn all_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params
            .iter()
            .flat_map(|(name, spec)| std::iter::once(*name).chain(spec.aliases.iter().copied()))
    }

    /// Look up a declaration by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, spec)| spec)
    }

    /// Declarations in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamSpec)> {
        self.params.iter().map(|(name, spec)| (*name, spec))
    }

    /// Resolve a name or alias to the canonical parameter name
    fn canonical(&self, key: &str) -> Option<&'static str> {
        self.params
            .iter()
            .find(|(name, spec)| *name == key || spec.aliases.contains(&key))
            .map(|(name, _)| *name)
    }

    /// Validate raw task arguments
    ///
    /// # Errors
    /// Returns [`ModuleError::Argument`] describing the first problem found.
    pub fn validate(&self, raw: &Value) -> Result<Params, ModuleError> {
        let Value::Object(raw) = raw else {
            return Err(ModuleError::Argument(
                "module arguments must be a JSON object".to_string(),
            ));
        };
        let secret = self
            .iter()
            .filter(|(_, spec)| spec.is_secret())
            .map(|(name, _)| name.to_string())
            .collect();
        Ok(Params::new(self.validate_object(raw, None)?, secret))
    }

    fn validate_object(
        &self,
        raw: &Map<String, Value>,
        parent: Option<&str>,
    ) -> Result<BTreeMap<String, Value>, ModuleError> {
        let qualify = |name: &str| match parent {
            Some(parent) => format!("{parent}.{name}"),
            None => name.to_string(),
        };

        let mut supplied: BTreeMap<&'static str, (&str, Value)> = BTreeMap::new();
        let mut unknown = Vec::new();

        for (key, value) in raw {
            if parent.is_none() && key.starts_with("_ansible_") {
                continue;
            }
            let Some(name) = self.canonical(key) else {
                unknown.push(qualify(key));
                continue;
            };
            if let Some((previous, _)) = supplied.get(name) {
                return Err(ModuleError::Argument(format!(
                    "parameters are mutually exclusive: {}|{}",
                    qualify(previous),
                    qualify(key)
                )));
            }
            supplied.insert(name, (key.as_str(), value.clone()));
        }

        if !unknown.is_empty() {
            return Err(ModuleError::Argument(format!(
                "Unsupported parameters: {}",
                unknown.join(", ")
            )));
        }

        let mut values = BTreeMap::new();
        let mut missing = Vec::new();

        for (name, spec) in &self.params {
            let value = match supplied.remove(name) {
                Some((_, Value::Null)) | None => spec.default.clone(),
                Some((_, value)) => Some(spec.coerce(&qualify(name), value)?),
            };

            if value.is_none() && spec.required {
                missing.push(qualify(name));
            }
            values.insert(name.to_string(), value.unwrap_or(Value::Null));
        }

        if !missing.is_empty() {
            return Err(ModuleError::Argument(format!(
                "missing required arguments: {}",
                missing.join(", ")
            )));
        }

        for rule in &self.required_if {
            let triggered = values
                .get(rule.field)
                .and_then(Value::as_str)
                .is_some_and(|value| value == rule.value);
            if !triggered {
                continue;
            }

            let absent: Vec<String> = rule
                .requires
                .iter()
                .filter(|name| values.get(**name).is_none_or(Value::is_null))
                .map(|name| qualify(name))
                .collect();
            if !absent.is_empty() {
                return Err(ModuleError::Argument(format!(
                    "{} is {} but all of the following are missing: {}",
                    rule.field,
                    rule.value,
                    absent.join(", ")
                )));
            }
        }

        Ok(values)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn banner_spec() -> ArgumentSpec {
        ArgumentSpec::new()
            .param("banner_text", ParamSpec::new(ParamKind::Str).required())
            .param("timeout", ParamSpec::timeout(15))
    }

    #[test]
    fn test_compose_rejects_collisions() {
        let task = ArgumentSpec::new().param("username", ParamSpec::new(ParamKind::Str));
        let err = ArgumentSpec::compose(task, ArgumentSpec::credentials()).unwrap_err();
        assert_eq!(err, SchemaError::Collision("username".to_string()));
    }

    #[test]
    fn test_compose_rejects_alias_collisions() {
        let task = ArgumentSpec::new()
            .param("address", ParamSpec::new(ParamKind::Str).aliases(&["node_ip"]));
        let err = ArgumentSpec::compose(task, ArgumentSpec::credentials()).unwrap_err();
        assert_eq!(err, SchemaError::Collision("node_ip".to_string()));
    }

    #[test]
    fn test_compose_keeps_both_sides() {
        let spec = ArgumentSpec::compose(banner_spec(), ArgumentSpec::credentials()).unwrap();
        assert!(spec.get("banner_text").is_some());
        assert!(spec.get("provider").is_some());
        assert!(spec.get("api_token").unwrap().no_log);
    }

    #[test]
    fn test_defaults_applied() {
        let params = banner_spec().validate(&json!({"banner_text": "hi"})).unwrap();
        assert_eq!(params.int("timeout"), Some(15));
        assert_eq!(params.str("banner_text"), Some("hi"));
    }

    #[test]
    fn test_missing_required() {
        let err = banner_spec().validate(&json!({})).unwrap_err();
        assert_eq!(
            err,
            ModuleError::Argument("missing required arguments: banner_text".to_string())
        );
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let err = banner_spec()
            .validate(&json!({"banner_text": "hi", "colour": "red"}))
            .unwrap_err();
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_ansible_internal_keys_ignored() {
        let params = banner_spec()
            .validate(&json!({"banner_text": "hi", "_ansible_check_mode": false}))
            .unwrap();
        assert_eq!(params.str("banner_text"), Some("hi"));
    }

    #[test]
    fn test_int_coercion_and_range() {
        let params = banner_spec()
            .validate(&json!({"banner_text": "hi", "timeout": "45"}))
            .unwrap();
        assert_eq!(params.int("timeout"), Some(45));

        let err = banner_spec()
            .validate(&json!({"banner_text": "hi", "timeout": 0}))
            .unwrap_err();
        assert!(err.to_string().contains("between 1 and 86400"));

        let err = banner_spec()
            .validate(&json!({"banner_text": "hi", "timeout": "soon"}))
            .unwrap_err();
        assert!(err.to_string().contains("unable to convert to int"));
    }

    #[test]
    fn test_str_coercion() {
        let params = banner_spec().validate(&json!({"banner_text": 42})).unwrap();
        assert_eq!(params.str("banner_text"), Some("42"));
    }

    #[test]
    fn test_choices_enforced() {
        let spec = ArgumentSpec::new().param(
            "action",
            ParamSpec::new(ParamKind::Str).required().choices(&["add", "delete"]),
        );
        let err = spec.validate(&json!({"action": "purge"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "value of action must be one of: add, delete, got: purge"
        );
    }

    #[test]
    fn test_aliases_resolved() {
        let spec = ArgumentSpec::new().param(
            "hostname",
            ParamSpec::new(ParamKind::Raw).required().aliases(&["ip_address"]),
        );
        let params = spec.validate(&json!({"ip_address": "10.1.1.1"})).unwrap();
        assert_eq!(params.str("hostname"), Some("10.1.1.1"));

        let err = spec
            .validate(&json!({"ip_address": "a", "hostname": "b"}))
            .unwrap_err();
        assert!(err.to_string().starts_with("parameters are mutually exclusive"));
    }

    #[test]
    fn test_required_if() {
        let spec = ArgumentSpec::new()
            .param("object_type", ParamSpec::new(ParamKind::Str).default("vmware"))
            .param("sql_host", ParamSpec::new(ParamKind::Str))
            .param("sql_instance", ParamSpec::new(ParamKind::Str))
            .required_if("object_type", "mssql_db", &["sql_host", "sql_instance"]);

        assert!(spec.validate(&json!({})).is_ok());

        let err = spec
            .validate(&json!({"object_type": "mssql_db", "sql_host": "sql01"}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "object_type is mssql_db but all of the following are missing: sql_instance"
        );
    }

    #[test]
    fn test_nested_provider_validation() {
        let spec = ArgumentSpec::credentials();
        let params = spec
            .validate(&json!({"provider": {"node_ip": "10.0.0.1", "api_token": "t"}}))
            .unwrap();
        let provider = params.dict("provider").unwrap();
        assert_eq!(provider["node_ip"], "10.0.0.1");
        assert!(provider["username"].is_null());

        let err = spec
            .validate(&json!({"provider": {"node": "10.0.0.1"}}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported parameters: provider.node");
    }

    #[test]
    fn test_secret_params() {
        let spec = ArgumentSpec::credentials();
        assert!(spec.get("password").unwrap().is_secret());
        assert!(spec.get("api_token").unwrap().is_secret());
        assert!(spec.get("provider").unwrap().is_secret());
        assert!(!spec.get("username").unwrap().is_secret());

        let params = spec
            .validate(&json!({
                "username": "admin",
                "password": "hunter2",
                "provider": {"api_token": "tok-123"}
            }))
            .unwrap();
        let debug = format!("{params:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("tok-123"));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(banner_spec().validate(&json!(["banner_text"])).is_err());
    }
}
