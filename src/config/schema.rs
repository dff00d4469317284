//! KDL schema definitions for settings.kdl and config.kdl.
//!
//! This module provides:
//! - Rust structs representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation functions
//! - Default values

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

use crate::engine::StatusVocabulary;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CLI preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// editor-name "Dana"
/// output-format "human"  // or "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutoverConfig {
    /// Name recorded in audit entries for CLI edits
    pub editor_name: Option<String>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,
}

impl CutoverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        Self {
            editor_name: doc.get("editor-name").and_then(string_arg),
            output_format: doc
                .get("output-format")
                .and_then(string_arg)
                .and_then(|s| OutputFormat::parse(&s)),
        }
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref name) = self.editor_name {
            doc.nodes_mut().push(string_node("editor-name", name));
        }
        if let Some(ref format) = self.output_format {
            doc.nodes_mut().push(string_node("output-format", format.as_str()));
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &CutoverConfig) {
        if other.editor_name.is_some() {
            self.editor_name = other.editor_name.clone();
        }
        if other.output_format.is_some() {
            self.output_format = other.output_format.clone();
        }
    }
}

/// A person activities can be assigned to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub work_hours_id: String,
}

impl Assignee {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A named working-hours pattern referenced by assignees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHours {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

/// Planner settings stored in settings.kdl.
///
/// Read once per operation and handed to the engine as an immutable snapshot.
///
/// # KDL Schema
///
/// ```kdl
/// app-name "Production Planner"
/// activity-list-title "Cut-over Activities"
/// phases {
///     phase "Phase 1: Pre-Cutover"
/// }
/// statuses {
///     status "Not Started"
///     status "Completed"
/// }
/// work-hours "wh-1" label="Mon-Fri 09:00-17:00"
/// assignee "u-1" first-name="Ada" last-name="Lovelace" email="ada@example.com" timezone="Europe/London" work-hours="wh-1"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub app_name: String,
    pub activity_list_title: String,
    /// Ordered phase names
    pub phases: Vec<String>,
    /// Ordered status vocabulary: first = not started, last = completed
    pub statuses: Vec<String>,
    pub assignees: Vec<Assignee>,
    pub work_hours: Vec<WorkHours>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Production Planner".to_string(),
            activity_list_title: "Cut-over Activities".to_string(),
            phases: [
                "Phase 1: Pre-Cutover",
                "Phase 2: Ramp Down",
                "Phase 3: Ramp Up",
                "Phase 4: Cutover",
                "Phase 5: Post-Go-Live",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            statuses: ["Not Started", "Pending", "In Progress", "Completed"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            assignees: Vec::new(),
            work_hours: Vec::new(),
        }
    }
}

impl Settings {
    /// Status vocabulary snapshot for the engine.
    pub fn status_vocabulary(&self) -> StatusVocabulary {
        StatusVocabulary::new(self.statuses.clone())
    }

    /// Look up a roster entry by id.
    pub fn assignee(&self, id: &str) -> Option<&Assignee> {
        self.assignees.iter().find(|a| a.id == id)
    }

    /// Build settings from a JSON body, requiring `phases` and `statuses`.
    ///
    /// Other keys fall back to their defaults when absent.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, String> {
        let has_key = |key: &str| value.get(key).is_some_and(|v| !v.is_null());
        if !has_key("phases") || !has_key("statuses") {
            return Err("Invalid settings format: phases and statuses are required".to_string());
        }
        let settings: Settings =
            serde_json::from_value(value).map_err(|e| format!("Invalid settings format: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.statuses.is_empty() {
            return Err("statuses must contain at least one entry".to_string());
        }
        for assignee in &self.assignees {
            if assignee.id.trim().is_empty() {
                return Err("assignee id must not be empty".to_string());
            }
            let required = [
                ("first name", &assignee.first_name),
                ("last name", &assignee.last_name),
                ("email", &assignee.email),
                ("timezone", &assignee.timezone),
                ("work hours", &assignee.work_hours_id),
            ];
            if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
                return Err(format!("assignee {} is missing {}", assignee.id, field));
            }
        }
        Ok(())
    }

    /// Parse settings from a KDL document, starting from the defaults.
    ///
    /// Keys present in the document replace the default value wholesale;
    /// unknown nodes are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut settings = Self::default();

        if let Some(name) = doc.get("app-name").and_then(string_arg) {
            settings.app_name = name;
        }
        if let Some(title) = doc.get("activity-list-title").and_then(string_arg) {
            settings.activity_list_title = title;
        }
        if let Some(node) = doc.get("phases") {
            settings.phases = child_strings(node, "phase");
        }
        if let Some(node) = doc.get("statuses") {
            settings.statuses = child_strings(node, "status");
        }

        let mut work_hours = Vec::new();
        let mut assignees = Vec::new();
        for node in doc.nodes() {
            match node.name().value() {
                "work-hours" => {
                    if let Some(id) = string_arg(node) {
                        work_hours.push(WorkHours {
                            id,
                            label: string_prop(node, "label"),
                        });
                    }
                }
                "assignee" => {
                    if let Some(id) = string_arg(node) {
                        assignees.push(Assignee {
                            id,
                            first_name: string_prop(node, "first-name"),
                            last_name: string_prop(node, "last-name"),
                            email: string_prop(node, "email"),
                            phone: string_prop(node, "phone"),
                            timezone: string_prop(node, "timezone"),
                            work_hours_id: string_prop(node, "work-hours"),
                        });
                    }
                }
                _ => {
                    // Ignore unknown fields for forward compatibility
                }
            }
        }
        settings.work_hours = work_hours;
        settings.assignees = assignees;

        settings
    }

    /// Convert settings to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        doc.nodes_mut().push(string_node("app-name", &self.app_name));
        doc.nodes_mut()
            .push(string_node("activity-list-title", &self.activity_list_title));
        doc.nodes_mut()
            .push(list_node("phases", "phase", &self.phases));
        doc.nodes_mut()
            .push(list_node("statuses", "status", &self.statuses));

        for wh in &self.work_hours {
            let mut node = string_node("work-hours", &wh.id);
            push_prop(&mut node, "label", &wh.label);
            doc.nodes_mut().push(node);
        }

        for assignee in &self.assignees {
            let mut node = string_node("assignee", &assignee.id);
            push_prop(&mut node, "first-name", &assignee.first_name);
            push_prop(&mut node, "last-name", &assignee.last_name);
            push_prop(&mut node, "email", &assignee.email);
            if !assignee.phone.is_empty() {
                push_prop(&mut node, "phone", &assignee.phone);
            }
            push_prop(&mut node, "timezone", &assignee.timezone);
            push_prop(&mut node, "work-hours", &assignee.work_hours_id);
            doc.nodes_mut().push(node);
        }

        doc
    }
}

/// Get a string argument from a node's first entry.
fn string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .filter(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Get a string property, empty when missing.
fn string_prop(node: &KdlNode, key: &str) -> String {
    node.entry(key)
        .and_then(|e| e.value().as_string())
        .unwrap_or_default()
        .to_string()
}

/// Collect the first argument of every `child_name` child of `node`.
fn child_strings(node: &KdlNode, child_name: &str) -> Vec<String> {
    node.children()
        .map(|children| {
            children
                .nodes()
                .iter()
                .filter(|child| child.name().value() == child_name)
                .filter_map(string_arg)
                .collect()
        })
        .unwrap_or_default()
}

fn string_node(name: &str, value: &str) -> KdlNode {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    node
}

fn push_prop(node: &mut KdlNode, key: &str, value: &str) {
    node.push(KdlEntry::new_prop(key, KdlValue::String(value.to_string())));
}

fn list_node(name: &str, child_name: &str, values: &[String]) -> KdlNode {
    let mut children = KdlDocument::new();
    for value in values {
        children.nodes_mut().push(string_node(child_name, value));
    }
    let mut node = KdlNode::new(name);
    node.set_children(children);
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_from_empty_document() {
        let doc: KdlDocument = "".parse().unwrap();
        let settings = Settings::from_kdl(&doc);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.statuses.first().map(String::as_str), Some("Not Started"));
    }

    #[test]
    fn test_settings_partial_document_merges_over_defaults() {
        let kdl = r#"
            app-name "Go-Live"
            statuses {
                status "Open"
                status "Done"
            }
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let settings = Settings::from_kdl(&doc);

        assert_eq!(settings.app_name, "Go-Live");
        assert_eq!(settings.statuses, vec!["Open", "Done"]);
        assert_eq!(settings.phases, Settings::default().phases);
        assert_eq!(settings.activity_list_title, "Cut-over Activities");
    }

    #[test]
    fn test_settings_roster_parsing() {
        let kdl = r#"
            work-hours "wh-1" label="Mon-Fri 09:00-17:00"
            assignee "u-1" first-name="Ada" last-name="Lovelace" email="ada@example.com" timezone="Europe/London" work-hours="wh-1"
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let settings = Settings::from_kdl(&doc);

        assert_eq!(settings.work_hours.len(), 1);
        assert_eq!(settings.work_hours[0].label, "Mon-Fri 09:00-17:00");
        let ada = settings.assignee("u-1").unwrap();
        assert_eq!(ada.display_name(), "Ada Lovelace");
        assert_eq!(ada.phone, "");
        assert_eq!(ada.work_hours_id, "wh-1");
    }

    #[test]
    fn test_settings_kdl_roundtrip_preserves_order() {
        let mut settings = Settings::default();
        settings.phases = vec!["Zeta".to_string(), "Alpha".to_string()];
        settings.work_hours.push(WorkHours {
            id: "wh-1".to_string(),
            label: "Nights".to_string(),
        });
        settings.assignees.push(Assignee {
            id: "u-1".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@example.com".to_string(),
            phone: "555-0100".to_string(),
            timezone: "America/New_York".to_string(),
            work_hours_id: "wh-1".to_string(),
        });

        let text = settings.to_kdl().to_string();
        let doc: KdlDocument = text.parse().unwrap();
        assert_eq!(Settings::from_kdl(&doc), settings);
    }

    #[test]
    fn test_settings_from_json_requires_phases_and_statuses() {
        let missing = serde_json::json!({ "phases": ["A"] });
        assert!(Settings::from_json_value(missing).is_err());

        let ok = serde_json::json!({ "phases": ["A"], "statuses": ["Open", "Done"], "appName": "X" });
        let settings = Settings::from_json_value(ok).unwrap();
        assert_eq!(settings.app_name, "X");
        assert_eq!(settings.activity_list_title, "Cut-over Activities");
    }

    #[test]
    fn test_settings_validate_assignee_fields() {
        let mut settings = Settings::default();
        settings.assignees.push(Assignee {
            id: "u-1".to_string(),
            first_name: "Ada".to_string(),
            ..Default::default()
        });
        let err = settings.validate().unwrap_err();
        assert!(err.contains("last name"));
    }

    #[test]
    fn test_settings_validate_empty_statuses() {
        let settings = Settings {
            statuses: Vec::new(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_json_uses_camel_case() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert!(json.get("appName").is_some());
        assert!(json.get("activityListTitle").is_some());
        assert!(json.get("workHours").is_some());
    }

    #[test]
    fn test_config_kdl_roundtrip() {
        let config = CutoverConfig {
            editor_name: Some("Dana".to_string()),
            output_format: Some(OutputFormat::Human),
        };
        let doc: KdlDocument = config.to_kdl().to_string().parse().unwrap();
        assert_eq!(CutoverConfig::from_kdl(&doc), config);
    }

    #[test]
    fn test_config_merge() {
        let mut base = CutoverConfig {
            editor_name: Some("System Admin".to_string()),
            output_format: Some(OutputFormat::Json),
        };
        base.merge(&CutoverConfig {
            editor_name: Some("Dana".to_string()),
            output_format: None,
        });
        assert_eq!(base.editor_name.as_deref(), Some("Dana"));
        assert_eq!(base.output_format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("HUMAN"), Some(OutputFormat::Human));
        assert_eq!(OutputFormat::parse("xml"), None);
    }
}
