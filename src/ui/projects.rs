use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use portfolio_manager::controller::{ListController, PageItem};
use portfolio_manager::models::{join_technologies, Project};
use portfolio_manager::store::StoreState;

use crate::ui::{centered_rect, Notice, NoticeKind};

// Represents the state of the project listing screen
pub struct ProjectsState {
    list_state: ListState,
    show_delete_confirmation: bool,
    detail: Option<Project>,
}

impl ProjectsState {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            list_state,
            show_delete_confirmation: false,
            detail: None,
        }
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn scroll_to_top(&mut self) {
        self.list_state.select(Some(0));
    }

    /// Keep the selection on a row that exists after the list changed.
    pub fn clamp_selection(&mut self, len: usize) {
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            Some(_) => {}
        }
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn show_detail(&mut self, project: Project) {
        self.detail = Some(project);
    }

    fn selected_id(&self, visible: &[Project]) -> Option<String> {
        self.list_state
            .selected()
            .and_then(|i| visible.get(i))
            .map(|p| p.id.clone())
    }
}

pub enum ProjectAction {
    Exit,
    NewProject,
    EditProject(String),
    DeleteProject(String),
    ViewProject(String),
    NextCategory,
    PreviousCategory,
    GoToPage(i64),
    CyclePageSize,
    Reload,
}

pub fn render_projects<B: Backend>(
    frame: &mut Frame<B>,
    state: &mut ProjectsState,
    store: &StoreState,
    controller: &ListController,
    notice: Option<&Notice>,
) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    render_categories(frame, store, controller, chunks[0]);

    let visible = controller.visible(store);
    if store.is_loading {
        let loading = Paragraph::new("Loading projects...")
            .block(Block::default().title("Projects").borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(loading, chunks[1]);
    } else if visible.is_empty() {
        let empty = Paragraph::new("No projects found.")
            .block(Block::default().title("Projects").borders(Borders::ALL));
        frame.render_widget(empty, chunks[1]);
    } else {
        let items: Vec<ListItem> = visible
            .iter()
            .map(|project| {
                ListItem::new(Spans::from(vec![
                    Span::styled(&project.name, Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(" ("),
                    Span::styled(project.category_label(), Style::default().fg(Color::Cyan)),
                    Span::raw(") "),
                    Span::styled(
                        join_technologies(&project.technologies),
                        Style::default().fg(Color::Gray),
                    ),
                ]))
            })
            .collect();

        let projects_list = List::new(items)
            .block(Block::default().title("Projects").borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );

        frame.render_stateful_widget(projects_list, chunks[1], &mut state.list_state);
    }

    render_pagination(frame, store, controller, chunks[2]);
    render_status(frame, store, notice, chunks[3]);

    let help = Paragraph::new(
        "<N> New | <E> Edit | <D> Delete | <Enter> Details | <Tab> Category | <Left/Right> Page | <S> Per page | <R> Reload | <Esc> Quit",
    )
    .block(Block::default().borders(Borders::TOP))
    .style(Style::default().fg(Color::White));
    frame.render_widget(help, chunks[4]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    } else if let Some(project) = &state.detail {
        render_detail(frame, project, size);
    }
}

fn render_categories<B: Backend>(
    frame: &mut Frame<B>,
    store: &StoreState,
    controller: &ListController,
    area: Rect,
) {
    let mut spans = Vec::new();
    for category in controller.categories(store) {
        let style = if category == controller.selected_category() {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::styled(format!(" {} ", category), style));
        spans.push(Span::raw(" "));
    }

    let title = format!("Categories | Per page: {}", controller.page_size());
    let bar = Paragraph::new(Spans::from(spans))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(bar, area);
}

fn render_pagination<B: Backend>(
    frame: &mut Frame<B>,
    store: &StoreState,
    controller: &ListController,
    area: Rect,
) {
    let mut spans = vec![Span::raw("< Prev ")];
    for item in controller.pagination(store) {
        match item {
            PageItem::Page(page) if page == store.current_page => spans.push(Span::styled(
                format!(" {} ", page),
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            PageItem::Page(page) => spans.push(Span::raw(format!(" {} ", page))),
            PageItem::Ellipsis => {
                spans.push(Span::styled(" … ", Style::default().fg(Color::Gray)))
            }
        }
    }
    spans.push(Span::raw(" Next >"));

    let pagination = Paragraph::new(Spans::from(spans))
        .block(Block::default().title(controller.summary(store)).borders(Borders::ALL));
    frame.render_widget(pagination, area);
}

fn render_status<B: Backend>(
    frame: &mut Frame<B>,
    store: &StoreState,
    notice: Option<&Notice>,
    area: Rect,
) {
    let (text, color) = match (notice, &store.error) {
        (Some(notice), _) => {
            let color = match notice.kind {
                NoticeKind::Success => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            (notice.text.clone(), color)
        }
        (None, Some(error)) => (error.clone(), Color::Red),
        (None, None) => (String::new(), Color::White),
    };

    frame.render_widget(Paragraph::new(text).style(Style::default().fg(color)), area);
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this project?"),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

fn render_detail<B: Backend>(frame: &mut Frame<B>, project: &Project, size: Rect) {
    let popup_area = centered_rect(70, 60, size);
    let label = Style::default().fg(Color::Yellow);

    let created = project
        .created_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let lines = vec![
        Spans::from(vec![Span::styled("Category: ", label), Span::raw(project.category_label())]),
        Spans::from(vec![
            Span::styled("Technologies: ", label),
            Span::raw(join_technologies(&project.technologies)),
        ]),
        Spans::from(vec![
            Span::styled("Link: ", label),
            Span::raw(project.link.as_deref().unwrap_or("-")),
        ]),
        Spans::from(vec![Span::styled("Created: ", label), Span::raw(created)]),
        Spans::from(""),
        Spans::from(project.description.as_str()),
    ];

    let popup = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(format!("{} (#{})", project.name, project.id))
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

pub fn handle_input(
    state: &mut ProjectsState,
    visible: &[Project],
    current_page: u32,
    total_pages: u32,
) -> Result<Option<ProjectAction>> {
    if let Event::Key(key) = event::read()? {
        if state.detail.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                state.detail = None;
            }
            return Ok(None);
        }

        if state.show_delete_confirmation {
            match key.code {
                KeyCode::Char('y') => {
                    state.toggle_delete_confirmation();
                    if let Some(id) = state.selected_id(visible) {
                        return Ok(Some(ProjectAction::DeleteProject(id)));
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                    state.toggle_delete_confirmation();
                }
                _ => {}
            }
            return Ok(None);
        }

        let current = i64::from(current_page);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Some(ProjectAction::Exit)),
            KeyCode::Char('n') => return Ok(Some(ProjectAction::NewProject)),
            KeyCode::Char('e') => {
                if let Some(id) = state.selected_id(visible) {
                    return Ok(Some(ProjectAction::EditProject(id)));
                }
            }
            KeyCode::Char('d') => {
                if state.selected_id(visible).is_some() {
                    state.toggle_delete_confirmation();
                }
            }
            KeyCode::Enter => {
                if let Some(id) = state.selected_id(visible) {
                    return Ok(Some(ProjectAction::ViewProject(id)));
                }
            }
            KeyCode::Char('s') => return Ok(Some(ProjectAction::CyclePageSize)),
            KeyCode::Char('r') => return Ok(Some(ProjectAction::Reload)),
            KeyCode::Tab => return Ok(Some(ProjectAction::NextCategory)),
            KeyCode::BackTab => return Ok(Some(ProjectAction::PreviousCategory)),
            KeyCode::Left if current_page > 1 => {
                return Ok(Some(ProjectAction::GoToPage(current - 1)));
            }
            KeyCode::Right if current_page < total_pages => {
                return Ok(Some(ProjectAction::GoToPage(current + 1)));
            }
            KeyCode::Home => return Ok(Some(ProjectAction::GoToPage(1))),
            KeyCode::End => return Ok(Some(ProjectAction::GoToPage(i64::from(total_pages)))),
            KeyCode::Down => state.next(visible.len()),
            KeyCode::Up => state.previous(visible.len()),
            _ => {}
        }
    }
    Ok(None)
}
