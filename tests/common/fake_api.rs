use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use portfolio_manager::api::{ApiError, DeleteReply, PageQuery, ProjectApi, Reply};
use portfolio_manager::models::{NewProject, Project, ProjectPage, ProjectUpdate};

/// In-memory stand-in for the projects backend.
#[derive(Default)]
pub struct FakeApi {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    projects: Vec<Project>,
    next_id: u32,
    list_calls: Vec<PageQuery>,
    list_delays: VecDeque<Duration>,
    fail_next: Option<ApiError>,
    decline_deletes: bool,
}

impl FakeApi {
    pub fn with_projects(projects: Vec<Project>) -> Self {
        let next_id = projects.len() as u32;
        Self {
            inner: Mutex::new(Inner {
                projects,
                next_id,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("fake api lock poisoned")
    }

    /// The next call of any kind fails with `err`.
    pub fn fail_next(&self, err: ApiError) {
        self.lock().fail_next = Some(err);
    }

    /// Delay the response of the next list call that has no delay queued yet.
    pub fn delay_list(&self, delay: Duration) {
        self.lock().list_delays.push_back(delay);
    }

    /// Answer deletes with a success-shaped body whose status is not `Success`.
    pub fn decline_deletes(&self) {
        self.lock().decline_deletes = true;
    }

    /// Drop projects on the server side only, as another admin session would.
    pub fn truncate(&self, len: usize) {
        self.lock().projects.truncate(len);
    }

    pub fn list_calls(&self) -> Vec<PageQuery> {
        self.lock().list_calls.clone()
    }

    pub fn stored(&self) -> Vec<Project> {
        self.lock().projects.clone()
    }
}

impl ProjectApi for FakeApi {
    async fn list(&self, query: PageQuery) -> Result<ProjectPage, ApiError> {
        let (outcome, delay) = {
            let mut inner = self.lock();
            inner.list_calls.push(query);
            let delay = inner.list_delays.pop_front();
            if let Some(err) = inner.fail_next.take() {
                (Err(err), delay)
            } else {
                let limit = query.limit.max(1);
                let total = inner.projects.len() as u32;
                let page = ProjectPage {
                    projects: inner
                        .projects
                        .iter()
                        .skip(query.offset as usize)
                        .take(limit as usize)
                        .cloned()
                        .collect(),
                    total: u64::from(total),
                    current_page: query.offset / limit + 1,
                    total_pages: total.div_ceil(limit).max(1),
                };
                (Ok(page), delay)
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome
    }

    async fn create(&self, project: &NewProject) -> Result<Reply<Project>, ApiError> {
        let mut inner = self.lock();
        if let Some(err) = inner.fail_next.take() {
            return Err(err);
        }

        inner.next_id += 1;
        let created = Project {
            id: format!("p{}", inner.next_id),
            name: project.name.clone(),
            description: project.description.clone(),
            category: Some(project.category.clone()),
            technologies: project.technologies.clone(),
            link: Some(project.link.clone()),
            created_at: None,
        };
        inner.projects.push(created.clone());

        Ok(Reply {
            value: created,
            message: Some("Project created successfully".into()),
        })
    }

    async fn update(&self, id: &str, changes: &ProjectUpdate) -> Result<Reply<Project>, ApiError> {
        let mut inner = self.lock();
        if let Some(err) = inner.fail_next.take() {
            return Err(err);
        }

        let project = inner
            .projects
            .iter_mut()
            .find(|project| project.id == id)
            .ok_or(ApiError::NotFound)?;
        if let Some(name) = &changes.name {
            project.name = name.clone();
        }
        if let Some(category) = &changes.category {
            project.category = Some(category.clone());
        }
        if let Some(description) = &changes.description {
            project.description = description.clone();
        }
        if let Some(technologies) = &changes.technologies {
            project.technologies = technologies.clone();
        }
        if let Some(link) = &changes.link {
            project.link = Some(link.clone());
        }

        Ok(Reply {
            value: project.clone(),
            message: Some("Project updated successfully".into()),
        })
    }

    async fn delete(&self, id: &str) -> Result<DeleteReply, ApiError> {
        let mut inner = self.lock();
        if let Some(err) = inner.fail_next.take() {
            return Err(err);
        }
        if inner.decline_deletes {
            return Ok(DeleteReply {
                confirmed: false,
                message: None,
            });
        }

        let before = inner.projects.len();
        inner.projects.retain(|project| project.id != id);
        if inner.projects.len() == before {
            return Err(ApiError::NotFound);
        }

        Ok(DeleteReply {
            confirmed: true,
            message: Some("ok".into()),
        })
    }

    async fn get(&self, id: &str) -> Result<Reply<Project>, ApiError> {
        let mut inner = self.lock();
        if let Some(err) = inner.fail_next.take() {
            return Err(err);
        }

        let project = inner
            .projects
            .iter()
            .find(|project| project.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)?;

        Ok(Reply {
            value: project,
            message: Some("Project fetched".into()),
        })
    }
}

pub fn make_project(id: &str, category: Option<&str>) -> Project {
    Project {
        id: id.to_string(),
        name: format!("Project {id}"),
        description: format!("Description of {id}"),
        category: category.map(str::to_string),
        technologies: vec!["Rust".to_string()],
        link: None,
        created_at: None,
    }
}

/// `count` projects with ids `p1..=pN`, alternating between two categories.
pub fn make_projects(count: usize) -> Vec<Project> {
    (1..=count)
        .map(|i| {
            let category = if i % 2 == 0 { "Mobile" } else { "Web" };
            make_project(&format!("p{i}"), Some(category))
        })
        .collect()
}

pub fn make_new_project(name: &str) -> NewProject {
    NewProject {
        name: name.to_string(),
        category: "Web".to_string(),
        description: "A new project".to_string(),
        technologies: vec!["Rust".to_string(), "tokio".to_string()],
        link: "https://example.com".to_string(),
    }
}
