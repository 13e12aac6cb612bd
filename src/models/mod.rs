mod project;

pub use project::{
    join_technologies, split_technologies, NewProject, Project, ProjectPage, ProjectUpdate,
    UNCATEGORIZED,
};
