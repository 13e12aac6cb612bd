use anyhow::{anyhow, Result};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ApiError, DeleteReply, PageQuery, ProjectApi, Reply};
use crate::models::{NewProject, Project, ProjectPage, ProjectUpdate};

#[derive(Deserialize)]
struct ListEnvelope {
    data: ProjectPage,
}

#[derive(Deserialize)]
struct SavedEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    project: Project,
}

#[derive(Deserialize)]
struct FetchEnvelope {
    data: Project,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct DeleteEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// HTTP implementation of [`ProjectApi`].
///
/// The client keeps a cookie store so every request carries the session.
pub struct HttpProjectApi {
    client: Client,
    base_url: Url,
}

impl HttpProjectApi {
    /// Create a client rooted at the API namespace, e.g. `http://localhost:3000/api`
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().cookie_store(true).build()?;
        Self::with_client(base_url, client)
    }

    /// Use a preconfigured client, e.g. one with a different proxy or TLS setup
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("API base URL cannot be a base: {}", base_url));
        }

        Ok(Self { client, base_url })
    }

    fn projects_url(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in with_client()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("projects");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }
}

impl ProjectApi for HttpProjectApi {
    async fn list(&self, query: PageQuery) -> Result<ProjectPage, ApiError> {
        let url = self.projects_url(None);
        debug!(%url, limit = query.limit, offset = query.offset, "GET projects");

        let response = self
            .client
            .get(url)
            .query(&[("limit", query.limit), ("offset", query.offset)])
            .send()
            .await?;
        let envelope: ListEnvelope = read_json(response).await?;

        Ok(envelope.data)
    }

    async fn create(&self, project: &NewProject) -> Result<Reply<Project>, ApiError> {
        let url = self.projects_url(None);
        debug!(%url, name = %project.name, "POST project");

        let response = self.client.post(url).json(project).send().await?;
        let envelope: SavedEnvelope = read_json(response).await?;

        Ok(Reply {
            value: envelope.project,
            message: envelope.message,
        })
    }

    async fn update(&self, id: &str, changes: &ProjectUpdate) -> Result<Reply<Project>, ApiError> {
        let url = self.projects_url(Some(id));
        debug!(%url, "PUT project");

        let response = self.client.put(url).json(changes).send().await?;
        let envelope: SavedEnvelope = read_json(response).await?;

        Ok(Reply {
            value: envelope.project,
            message: envelope.message,
        })
    }

    async fn delete(&self, id: &str) -> Result<DeleteReply, ApiError> {
        let url = self.projects_url(Some(id));
        debug!(%url, "DELETE project");

        let response = self.client.delete(url).send().await?;
        let envelope: DeleteEnvelope = read_json(response).await?;

        Ok(DeleteReply {
            confirmed: envelope.status == "Success",
            message: envelope.message,
        })
    }

    async fn get(&self, id: &str) -> Result<Reply<Project>, ApiError> {
        let url = self.projects_url(Some(id));
        debug!(%url, "GET project");

        let response = self.client.get(url).send().await?;
        let envelope: FetchEnvelope = read_json(response).await?;

        Ok(Reply {
            value: envelope.data,
            message: envelope.message,
        })
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;

    check_status(status, &body)?;

    serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Map a non-success status to the matching [`ApiError`].
fn check_status(status: StatusCode, body: &[u8]) -> Result<(), ApiError> {
    if status.is_success() {
        return Ok(());
    }

    warn!(status = status.as_u16(), "projects API returned an error status");

    match status {
        StatusCode::NOT_FOUND => Err(ApiError::NotFound),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            let message = serde_json::from_slice::<MessageBody>(body)
                .map(|body| body.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned());
            Err(ApiError::Validation {
                status: status.as_u16(),
                message,
            })
        }
        other => Err(ApiError::Status(other.as_u16())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_under_the_api_namespace() {
        let api = HttpProjectApi::new("http://localhost:3000/api/").expect("valid url");

        assert_eq!(
            api.projects_url(None).as_str(),
            "http://localhost:3000/api/projects"
        );
        assert_eq!(
            api.projects_url(Some("a b")).as_str(),
            "http://localhost:3000/api/projects/a%20b"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(HttpProjectApi::new("mailto:someone@example.com").is_err());
        assert!(HttpProjectApi::new("not a url").is_err());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(check_status(StatusCode::OK, b""), Ok(()));
        assert_eq!(
            check_status(StatusCode::NOT_FOUND, b""),
            Err(ApiError::NotFound)
        );
        assert_eq!(
            check_status(StatusCode::UNPROCESSABLE_ENTITY, br#"{"message":"name required"}"#),
            Err(ApiError::Validation {
                status: 422,
                message: "name required".into()
            })
        );
        assert_eq!(
            check_status(StatusCode::BAD_GATEWAY, b"upstream"),
            Err(ApiError::Status(502))
        );
    }

    #[test]
    fn saved_envelope_spreads_project_fields() {
        let json = r#"{"message":"Project created","id":"p9","project_name":"Kiln","technologies":["Go"]}"#;
        let envelope: SavedEnvelope = serde_json::from_str(json).expect("valid envelope");

        assert_eq!(envelope.message.as_deref(), Some("Project created"));
        assert_eq!(envelope.project.id, "p9");
        assert_eq!(envelope.project.name, "Kiln");
    }

    #[test]
    fn list_envelope_reads_nested_page() {
        let json = r#"{"data":{"projects":[{"id":"1","project_name":"A","category":"Web"}],"total":1,"currentPage":1,"totalPages":1}}"#;
        let envelope: ListEnvelope = serde_json::from_str(json).expect("valid envelope");

        assert_eq!(envelope.data.projects.len(), 1);
        assert_eq!(envelope.data.total, 1);
    }

    #[test]
    fn delete_envelope_keeps_status_text() {
        let envelope: DeleteEnvelope =
            serde_json::from_str(r#"{"status":"Error"}"#).expect("valid envelope");
        assert_eq!(envelope.status, "Error");
        assert!(envelope.message.is_none());
    }
}
