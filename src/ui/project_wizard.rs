use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use portfolio_manager::models::{join_technologies, split_technologies, NewProject, Project};

use crate::ui::{Notice, NoticeKind};

#[derive(Debug, PartialEq)]
pub enum ProjectWizardAction {
    Cancel,
    Save,
    /// Save was requested while a required field is empty
    Incomplete,
}

/// Status line text for [`ProjectWizardAction::Incomplete`].
pub const INCOMPLETE_FORM: &str = "All fields except link are required";

#[derive(Clone, PartialEq, Copy)]
pub enum ProjectField {
    Name,
    Category,
    Description,
    Technologies,
    Link,
}

const FIELD_NAMES: [&str; 5] = [
    "Project Name",
    "Category",
    "Description",
    "Technologies (comma-separated)",
    "Link",
];

/// Raw text of the form; technologies stay comma-separated until submit.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct ProjectForm {
    pub name: String,
    pub category: String,
    pub description: String,
    pub technologies: String,
    pub link: String,
}

pub struct ProjectWizardState {
    project_id: Option<String>,
    pub form: ProjectForm,
    pub current_field: ProjectField,
    pub editing: bool,
}

impl ProjectWizardState {
    pub fn new() -> Self {
        Self {
            project_id: None,
            form: ProjectForm::default(),
            current_field: ProjectField::Name,
            editing: false,
        }
    }

    pub fn from_existing(project: &Project) -> Self {
        Self {
            project_id: Some(project.id.clone()),
            form: ProjectForm {
                name: project.name.clone(),
                category: project.category.clone().unwrap_or_default(),
                description: project.description.clone(),
                technologies: join_technologies(&project.technologies),
                link: project.link.clone().unwrap_or_default(),
            },
            current_field: ProjectField::Name,
            editing: false,
        }
    }

    /// Id of the project being edited, `None` when creating.
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ProjectField::Name => ProjectField::Category,
            ProjectField::Category => ProjectField::Description,
            ProjectField::Description => ProjectField::Technologies,
            ProjectField::Technologies => ProjectField::Link,
            ProjectField::Link => ProjectField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ProjectField::Name => ProjectField::Link,
            ProjectField::Category => ProjectField::Name,
            ProjectField::Description => ProjectField::Category,
            ProjectField::Technologies => ProjectField::Description,
            ProjectField::Link => ProjectField::Technologies,
        };
    }

    fn field_mut(&mut self, field: ProjectField) -> &mut String {
        match field {
            ProjectField::Name => &mut self.form.name,
            ProjectField::Category => &mut self.form.category,
            ProjectField::Description => &mut self.form.description,
            ProjectField::Technologies => &mut self.form.technologies,
            ProjectField::Link => &mut self.form.link,
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let value = self.field_mut(self.current_field);
        match key {
            KeyCode::Char(c) => value.push(c),
            KeyCode::Backspace => {
                value.pop();
            }
            _ => {}
        }
    }

    /// Every field except the link is required.
    pub fn is_valid(&self) -> bool {
        !self.form.name.trim().is_empty()
            && !self.form.category.trim().is_empty()
            && !self.form.description.trim().is_empty()
            && !split_technologies(&self.form.technologies).is_empty()
    }

    pub fn to_new_project(&self) -> NewProject {
        NewProject {
            name: self.form.name.trim().to_string(),
            category: self.form.category.trim().to_string(),
            description: self.form.description.trim().to_string(),
            technologies: split_technologies(&self.form.technologies),
            link: self.form.link.trim().to_string(),
        }
    }
}

pub fn render_project_wizard<B: Backend>(
    f: &mut Frame<B>,
    state: &mut ProjectWizardState,
    notice: Option<&Notice>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.project_id.is_none() {
        "Create New Project"
    } else {
        "Edit Project"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    if let Some(notice) = notice {
        let color = match notice.kind {
            NoticeKind::Success => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        let status = Paragraph::new(notice.text.as_str()).style(Style::default().fg(color));
        f.render_widget(status, chunks[2]);
    }

    let help_text = if state.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save project | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState, area: Rect) {
    let field_values = [
        &state.form.name,
        &state.form.category,
        &state.form.description,
        &state.form.technologies,
        &state.form.link,
    ];

    let items: Vec<ListItem> = FIELD_NAMES
        .iter()
        .zip(field_values.iter())
        .enumerate()
        .map(|(i, (name, value))| {
            let selected = i == state.current_field as usize;
            let content = if selected && state.editing {
                Spans::from(vec![
                    Span::styled(format!("{}: ", name), Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{}|", value),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                let style = if selected {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };

                Spans::from(vec![
                    Span::styled(format!("{}: ", name), style),
                    Span::raw(value.as_str()),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Project Details"));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ProjectWizardState) -> Result<Option<ProjectWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }

    Ok(None)
}

fn handle_key(state: &mut ProjectWizardState, code: KeyCode) -> Option<ProjectWizardAction> {
    match code {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Some(ProjectWizardAction::Cancel);
            }
        }
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => {
            if state.is_valid() {
                return Some(ProjectWizardAction::Save);
            }
            return Some(ProjectWizardAction::Incomplete);
        }
        _ if state.editing => state.edit_current_field(code),
        _ => {}
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> Project {
        Project {
            id: "p1".into(),
            name: "Atlas".into(),
            description: "Maps".into(),
            category: Some("Web".into()),
            technologies: vec!["React".into(), "Node.js".into()],
            link: None,
            created_at: None,
        }
    }

    #[test]
    fn editing_prefills_joined_technologies() {
        let state = ProjectWizardState::from_existing(&existing());

        assert_eq!(state.project_id(), Some("p1"));
        assert_eq!(state.form.technologies, "React, Node.js");
        assert_eq!(state.form.link, "");
    }

    #[test]
    fn submit_splits_technologies() {
        let mut state = ProjectWizardState::from_existing(&existing());
        state.form.technologies = "React , Node.js,, Rust".into();

        let payload = state.to_new_project();
        assert_eq!(payload.technologies, vec!["React", "Node.js", "Rust"]);
        assert_eq!(payload.name, "Atlas");
    }

    #[test]
    fn typing_edits_only_the_current_field() {
        let mut state = ProjectWizardState::new();
        assert!(!state.is_valid());

        state.edit_current_field(KeyCode::Char('x'));
        assert_eq!(state.form.name, "");

        state.toggle_editing();
        for c in "Kiln".chars() {
            state.edit_current_field(KeyCode::Char(c));
        }
        state.edit_current_field(KeyCode::Backspace);
        assert_eq!(state.form.name, "Kil");

        state.toggle_editing();
        state.next_field();
        assert!(state.current_field == ProjectField::Category);
        state.previous_field();
        state.previous_field();
        assert!(state.current_field == ProjectField::Link);
    }

    #[test]
    fn saving_an_incomplete_form_is_reported() {
        let mut state = ProjectWizardState::new();
        assert_eq!(
            handle_key(&mut state, KeyCode::Char('s')),
            Some(ProjectWizardAction::Incomplete)
        );

        let mut state = ProjectWizardState::from_existing(&existing());
        assert_eq!(
            handle_key(&mut state, KeyCode::Char('s')),
            Some(ProjectWizardAction::Save)
        );

        // While editing, 's' is just text.
        handle_key(&mut state, KeyCode::Enter);
        assert_eq!(handle_key(&mut state, KeyCode::Char('s')), None);
        assert_eq!(state.form.name, "Atlass");
    }

    #[test]
    fn link_is_optional() {
        let mut state = ProjectWizardState::new();
        state.form = ProjectForm {
            name: "Kiln".into(),
            category: "CLI".into(),
            description: "Build tool".into(),
            technologies: "Rust".into(),
            link: String::new(),
        };
        assert!(state.is_valid());

        state.form.technologies = " , ".into();
        assert!(!state.is_valid());
    }
}
