//! Module documentation rendering
//!
//! Builds the `DOCUMENTATION` block a host runtime expects next to a module,
//! straight from the task's argument schema.

use serde_yaml::{Mapping, Value as Yaml};

use crate::schema::{ArgumentSpec, ParamSpec, TIMEOUT_DESCRIPTION};
use crate::task::Task;

const VERSION_ADDED: &str = "2.8";
const AUTHOR: &str = "Rubrik Build Team <build@rubrik.com>";
const DOC_FRAGMENT: &str = "rubrik_cdm";

fn string_list<'a>(items: impl IntoIterator<Item = &'a str>) -> Yaml {
    Yaml::Sequence(items.into_iter().map(Yaml::from).collect())
}

fn option_entry(name: &str, spec: &ParamSpec) -> Result<Yaml, serde_yaml::Error> {
    let mut entry = Mapping::new();

    let description: Vec<&str> = if name == "timeout" {
        vec![TIMEOUT_DESCRIPTION]
    } else {
        spec.description.clone()
    };
    entry.insert("description".into(), string_list(description));
    entry.insert("required".into(), Yaml::Bool(spec.required));
    entry.insert("type".into(), spec.kind.as_str().into());

    if let Some(default) = &spec.default {
        entry.insert("default".into(), serde_yaml::to_value(default)?);
    }
    if !spec.choices.is_empty() {
        entry.insert("choices".into(), string_list(spec.choices.iter().copied()));
    }
    if !spec.aliases.is_empty() {
        entry.insert("aliases".into(), string_list(spec.aliases.iter().copied()));
    }

    Ok(Yaml::Mapping(entry))
}

fn options(spec: &ArgumentSpec) -> Result<Yaml, serde_yaml::Error> {
    let mut options = Mapping::new();
    for (name, param) in spec.iter() {
        options.insert(name.into(), option_entry(name, param)?);
    }
    Ok(Yaml::Mapping(options))
}

/// YAML body of the documentation block
///
/// Credential parameters are left to the shared documentation fragment.
///
/// # Errors
/// Returns an error if a default value cannot be represented as YAML.
pub fn documentation_yaml(task: &dyn Task) -> Result<String, serde_yaml::Error> {
    let mut doc = Mapping::new();
    doc.insert("module".into(), task.name().into());
    doc.insert("short_description".into(), task.description().into());
    doc.insert("description".into(), string_list([task.description()]));
    doc.insert("version_added".into(), VERSION_ADDED.into());
    doc.insert("author".into(), AUTHOR.into());
    doc.insert("options".into(), options(&task.argument_spec())?);
    doc.insert(
        "extends_documentation_fragment".into(),
        string_list([DOC_FRAGMENT]),
    );
    doc.insert("requirements".into(), string_list([DOC_FRAGMENT]));

    serde_yaml::to_string(&doc)
}

/// Documentation block wrapped as `DOCUMENTATION = '''...'''`
///
/// # Errors
/// See [`documentation_yaml`].
pub fn render_documentation(task: &dyn Task) -> Result<String, serde_yaml::Error> {
    Ok(format!("DOCUMENTATION = '''\n{}'''\n", documentation_yaml(task)?))
}
