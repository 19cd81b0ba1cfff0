//! Unsupported (end-of-life) Drupal modules found per environment

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Sentinel used by the reporting script when no newer release exists
pub const NO_RECOMMENDED_VERSION: &str = "None";

/// One unsupported module, with every environment it was seen in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsupportedModule {
    /// Drupal project machine name
    pub name: String,
    /// Installed version
    pub current_version: String,
    /// Recommended release, `None` when the module is obsolete
    #[serde(serialize_with = "serialize_recommended")]
    pub recommended_version: Option<String>,
    /// Environments the module was reported in, in order of first sighting
    pub environments: Vec<String>,
}

fn serialize_recommended<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or(NO_RECOMMENDED_VERSION))
}

impl UnsupportedModule {
    /// Recommended version for display, using the script's sentinel when absent
    pub fn recommended_display(&self) -> &str {
        self.recommended_version
            .as_deref()
            .unwrap_or(NO_RECOMMENDED_VERSION)
    }
}

/// A row as printed by the unsupported modules script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnsupportedModuleRow {
    pub project_name: String,
    pub current_version: String,
    #[serde(default)]
    pub recommended_version: Option<String>,
}

impl UnsupportedModuleRow {
    fn recommended(&self) -> Option<String> {
        match self.recommended_version.as_deref() {
            None | Some(NO_RECOMMENDED_VERSION) | Some("") => None,
            Some(version) => Some(version.to_string()),
        }
    }
}

/// Unsupported modules keyed by name, kept in order of first sighting.
///
/// Serialized as a list of modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnsupportedModules {
    entries: IndexMap<String, UnsupportedModule>,
}

impl UnsupportedModules {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges the findings of one environment.
    ///
    /// A module already present gains the environment in its list; versions
    /// from the first sighting are kept.
    pub fn merge(&mut self, environment: &str, rows: Vec<UnsupportedModuleRow>) {
        for row in rows {
            let recommended_version = row.recommended();
            let module = self
                .entries
                .entry(row.project_name.clone())
                .or_insert_with(|| UnsupportedModule {
                    name: row.project_name,
                    current_version: row.current_version,
                    recommended_version,
                    environments: Vec::new(),
                });
            if !module.environments.iter().any(|e| e == environment) {
                module.environments.push(environment.to_string());
            }
        }
    }

    /// Looks up a module by name
    pub fn get(&self, name: &str) -> Option<&UnsupportedModule> {
        self.entries.get(name)
    }

    /// Iterates modules in order of first sighting
    pub fn iter(&self) -> impl Iterator<Item = &UnsupportedModule> {
        self.entries.values()
    }

    /// Returns the number of distinct modules
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no environment reported anything
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for UnsupportedModules {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.entries.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, current: &str, recommended: &str) -> UnsupportedModuleRow {
        UnsupportedModuleRow {
            project_name: name.to_string(),
            current_version: current.to_string(),
            recommended_version: Some(recommended.to_string()),
        }
    }

    #[test]
    fn test_merge_same_module_across_environments() {
        let mut modules = UnsupportedModules::new();
        modules.merge("@stage", vec![row("ctools", "8.x-3.7", "4.0.4")]);
        modules.merge("@prod", vec![row("ctools", "8.x-3.7", "4.0.4")]);

        assert_eq!(modules.len(), 1);
        let ctools = modules.get("ctools").unwrap();
        assert_eq!(ctools.environments, vec!["@stage", "@prod"]);
        assert_eq!(ctools.recommended_version.as_deref(), Some("4.0.4"));
    }

    #[test]
    fn test_merge_keeps_first_sighting_order() {
        let mut modules = UnsupportedModules::new();
        modules.merge("@stage", vec![row("b_module", "1.0.0", "2.0.0")]);
        modules.merge(
            "@prod",
            vec![row("a_module", "1.0.0", "None"), row("b_module", "1.0.0", "2.0.0")],
        );

        let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["b_module", "a_module"]);
        assert_eq!(modules.get("a_module").unwrap().environments, vec!["@prod"]);
    }

    #[test]
    fn test_merge_does_not_repeat_environment() {
        let mut modules = UnsupportedModules::new();
        modules.merge("@self", vec![row("ctools", "1", "2"), row("ctools", "1", "2")]);
        assert_eq!(modules.get("ctools").unwrap().environments, vec!["@self"]);
    }

    #[test]
    fn test_none_sentinel_maps_to_absent() {
        let mut modules = UnsupportedModules::new();
        modules.merge("@self", vec![row("obsolete", "1.0.0", "None")]);
        let module = modules.get("obsolete").unwrap();
        assert_eq!(module.recommended_version, None);
        assert_eq!(module.recommended_display(), "None");
    }

    #[test]
    fn test_serialize_keeps_sentinel() {
        let mut modules = UnsupportedModules::new();
        modules.merge("@self", vec![row("obsolete", "1.0.0", "None")]);
        let json = serde_json::to_value(&modules).unwrap();
        assert_eq!(json[0]["name"], "obsolete");
        assert_eq!(json[0]["recommended_version"], "None");
        assert_eq!(json[0]["environments"][0], "@self");
    }

    #[test]
    fn test_serialize_as_list_in_sighting_order() {
        let mut modules = UnsupportedModules::new();
        modules.merge("@stage", vec![row("panels", "8.x-4.6", "8.x-4.7")]);
        modules.merge(
            "@prod",
            vec![row("ctools", "8.x-3.7", "None"), row("panels", "8.x-4.6", "8.x-4.7")],
        );

        let json = serde_json::to_value(&modules).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["name"], "panels");
        assert_eq!(json[0]["environments"], serde_json::json!(["@stage", "@prod"]));
        assert_eq!(json[1]["name"], "ctools");
        assert_eq!(modules.get("ctools").unwrap().environments, vec!["@prod"]);
    }

    #[test]
    fn test_row_deserialize_without_recommended() {
        let row: UnsupportedModuleRow =
            serde_json::from_str(r#"{"project_name":"x","current_version":"1.0"}"#).unwrap();
        assert_eq!(row.recommended(), None);
    }
}
