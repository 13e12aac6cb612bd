use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label used for projects that carry no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    #[serde(rename = "project_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Project {
    /// The category shown in listings, falling back to [`UNCATEGORIZED`].
    pub fn category_label(&self) -> &str {
        match self.category.as_deref() {
            Some(category) if !category.is_empty() => category,
            _ => UNCATEGORIZED,
        }
    }
}

/// Payload for creating a project; the server assigns `id` and `createdAt`.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct NewProject {
    #[serde(rename = "project_name")]
    pub name: String,
    pub category: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub link: String,
}

/// Partial payload for updating a project. Unset fields are left untouched.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectUpdate {
    #[serde(rename = "project_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl From<NewProject> for ProjectUpdate {
    fn from(project: NewProject) -> Self {
        Self {
            name: Some(project.name),
            category: Some(project.category),
            description: Some(project.description),
            technologies: Some(project.technologies),
            link: Some(project.link),
        }
    }
}

/// One window of projects as returned by the list endpoint.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPage {
    pub projects: Vec<Project>,
    pub total: u64,
    pub current_page: u32,
    pub total_pages: u32,
}

/// Turns the comma-separated form input into the list the API expects.
pub fn split_technologies(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tech| !tech.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_technologies(technologies: &[String]) -> String {
    technologies.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_trims_and_drops_empty_entries() {
        assert_eq!(
            split_technologies(" Rust, tokio ,, serde ,"),
            vec!["Rust", "tokio", "serde"]
        );
        assert!(split_technologies("   ").is_empty());
    }

    #[test]
    fn join_uses_comma_space() {
        let techs = vec!["React".to_string(), "TailwindCSS".to_string()];
        assert_eq!(join_technologies(&techs), "React, TailwindCSS");
        assert_eq!(split_technologies(&join_technologies(&techs)), techs);
    }

    #[test]
    fn project_deserializes_from_wire_names() {
        let json = r#"{
            "id": "p1",
            "project_name": "Atlas",
            "description": "Maps",
            "technologies": ["Rust"],
            "link": "https://example.com",
            "category": "Web",
            "createdAt": "2025-03-01T10:00:00Z"
        }"#;
        let project: Project = serde_json::from_str(json).expect("valid project");

        assert_eq!(project.name, "Atlas");
        assert_eq!(project.category_label(), "Web");
        assert_eq!(project.technologies, vec!["Rust"]);
        assert!(project.created_at.is_some());
    }

    #[test]
    fn missing_category_reads_as_uncategorized() {
        let project: Project =
            serde_json::from_str(r#"{"id":"p2","project_name":"Bare"}"#).expect("valid project");
        assert_eq!(project.category_label(), UNCATEGORIZED);

        let empty = Project {
            category: Some(String::new()),
            ..project
        };
        assert_eq!(empty.category_label(), UNCATEGORIZED);
    }

    #[test]
    fn partial_update_omits_unset_fields() {
        let update = ProjectUpdate {
            description: Some("New text".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).expect("serializable");
        assert_eq!(value, serde_json::json!({ "description": "New text" }));
    }

    #[test]
    fn page_reads_camel_case_metadata() {
        let json = r#"{"projects":[],"total":9,"currentPage":2,"totalPages":3}"#;
        let page: ProjectPage = serde_json::from_str(json).expect("valid page");
        assert_eq!(page.total, 9);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 3);
    }
}
