mod ui;

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use portfolio_manager::api::HttpProjectApi;
use portfolio_manager::config;
use portfolio_manager::controller::ListController;
use portfolio_manager::models::Project;
use portfolio_manager::store::{ProjectStore, StoreError};

use crate::ui::{
    project_wizard::{
        handle_input as handle_project_wizard_input, render_project_wizard, ProjectWizardAction,
        ProjectWizardState, INCOMPLETE_FORM,
    },
    projects::{
        handle_input as handle_projects_input, render_projects, ProjectAction, ProjectsState,
    },
    Notice,
};

/// Terminal admin for the portfolio projects API
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// API base URL, overrides PORTFOLIO_API_BASE_URL
    #[arg(long)]
    api_base_url: Option<String>,

    /// Projects per page, overrides PORTFOLIO_PAGE_SIZE
    #[arg(long)]
    page_size: Option<u32>,

    /// Log file, overrides PORTFOLIO_LOG_FILE
    #[arg(long)]
    log_file: Option<String>,
}

// Represents the current screen in the app
enum AppScreen {
    Projects,
    ProjectWizard,
}

// Main application state
struct AppState {
    store: ProjectStore<HttpProjectApi>,
    controller: ListController,
    screen: AppScreen,
    projects_state: ProjectsState,
    project_wizard_state: Option<ProjectWizardState>,
    notice: Option<Notice>,
}

impl AppState {
    fn new(store: ProjectStore<HttpProjectApi>, page_size: u32) -> Self {
        Self {
            store,
            controller: ListController::new(page_size),
            screen: AppScreen::Projects,
            projects_state: ProjectsState::new(),
            project_wizard_state: None,
            notice: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = config::init()?;
    if let Some(url) = args.api_base_url {
        config.api_base_url = url;
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    if let Some(log_file) = args.log_file {
        config.log_file = log_file;
    }

    init_tracing(&config.log_file)?;
    println!("Initializing portfolio manager...");

    let api = HttpProjectApi::new(config.api_base_url())?;
    info!(base_url = config.api_base_url(), "projects API client ready");

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(ProjectStore::new(api), config.page_size);

    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        println!("Error: {}", err);
    }

    println!("Thanks for using Portfolio Manager!");

    Ok(())
}

/// Send tracing output to a file; the terminal belongs to the TUI.
fn init_tracing(log_file: &str) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Fetch whatever page, size or category change the last action caused
        if let Err(err) = app_state.controller.refresh(&app_state.store).await {
            warn!(error = %err, cause = %err.cause, "refreshing projects failed");
        }
        if app_state.controller.take_scroll_to_top() {
            app_state.projects_state.scroll_to_top();
        }

        let snapshot = app_state.store.state();
        let visible_len = app_state.controller.visible(&snapshot).len();
        app_state.projects_state.clamp_selection(visible_len);

        terminal.draw(|f| match app_state.screen {
            AppScreen::Projects => render_projects(
                f,
                &mut app_state.projects_state,
                &snapshot,
                &app_state.controller,
                app_state.notice.as_ref(),
            ),
            AppScreen::ProjectWizard => {
                if let Some(state) = &mut app_state.project_wizard_state {
                    render_project_wizard(f, state, app_state.notice.as_ref());
                }
            }
        })?;

        let should_quit = match app_state.screen {
            AppScreen::Projects => handle_projects_screen(app_state).await?,
            AppScreen::ProjectWizard => handle_project_wizard_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

fn failure_notice(err: &StoreError) -> Notice {
    if err.is_validation() {
        Notice::error(format!("{} ({})", err, err.cause))
    } else {
        Notice::error(err.to_string())
    }
}

async fn handle_projects_screen(app_state: &mut AppState) -> Result<bool> {
    let snapshot = app_state.store.state();
    let visible: Vec<Project> = app_state
        .controller
        .visible(&snapshot)
        .into_iter()
        .cloned()
        .collect();

    let action = handle_projects_input(
        &mut app_state.projects_state,
        &visible,
        snapshot.current_page,
        snapshot.total_pages,
    )?;
    if action.is_some() {
        app_state.notice = None;
    }

    let store = &app_state.store;
    let controller = &mut app_state.controller;

    match action {
        Some(ProjectAction::Exit) => return Ok(true),
        Some(ProjectAction::NewProject) => {
            app_state.project_wizard_state = Some(ProjectWizardState::new());
            app_state.screen = AppScreen::ProjectWizard;
        }
        Some(ProjectAction::EditProject(id)) => match store.get_by_id(&id).await {
            Ok(project) => {
                app_state.project_wizard_state = Some(ProjectWizardState::from_existing(&project));
                app_state.screen = AppScreen::ProjectWizard;
            }
            Err(err) if err.is_not_found() => {
                app_state.notice = Some(Notice::error("Project not found"));
            }
            Err(err) => app_state.notice = Some(failure_notice(&err)),
        },
        Some(ProjectAction::ViewProject(id)) => match store.get_by_id(&id).await {
            Ok(project) => app_state.projects_state.show_detail(project),
            Err(err) if err.is_not_found() => {
                app_state.notice = Some(Notice::error("Project not found"));
            }
            Err(err) => app_state.notice = Some(failure_notice(&err)),
        },
        Some(ProjectAction::DeleteProject(id)) => match store.remove(&id).await {
            Ok(true) => app_state.notice = Some(Notice::success("Project deleted")),
            Ok(false) => app_state.notice = Some(Notice::error("Project was not deleted")),
            Err(err) => app_state.notice = Some(failure_notice(&err)),
        },
        Some(ProjectAction::NextCategory) => controller.cycle_category(store, true),
        Some(ProjectAction::PreviousCategory) => controller.cycle_category(store, false),
        Some(ProjectAction::GoToPage(page)) => {
            controller.go_to_page(store, page);
        }
        Some(ProjectAction::CyclePageSize) => controller.cycle_page_size(store),
        Some(ProjectAction::Reload) => controller.invalidate(),
        None => {}
    }

    Ok(false)
}

async fn handle_project_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.project_wizard_state else {
        app_state.screen = AppScreen::Projects;
        return Ok(false);
    };

    match handle_project_wizard_input(state)? {
        Some(ProjectWizardAction::Cancel) => {
            app_state.notice = None;
            app_state.project_wizard_state = None;
            app_state.screen = AppScreen::Projects;
        }
        Some(ProjectWizardAction::Incomplete) => {
            app_state.notice = Some(Notice::error(INCOMPLETE_FORM));
        }
        Some(ProjectWizardAction::Save) => {
            let payload = state.to_new_project();
            let (result, fallback) = match state.project_id() {
                Some(id) => (
                    app_state.store.update(id, &payload.into()).await,
                    "Project updated successfully",
                ),
                None => (
                    app_state.store.create(&payload).await,
                    "Project created successfully",
                ),
            };

            match result {
                Ok(_) => {
                    let message = app_state
                        .store
                        .state()
                        .success_message
                        .unwrap_or_else(|| fallback.to_string());
                    app_state.notice = Some(Notice::success(message));
                    app_state.project_wizard_state = None;
                    app_state.screen = AppScreen::Projects;
                    // The store does not insert saved projects into the loaded page
                    app_state.controller.invalidate();
                }
                Err(err) if err.is_not_found() => {
                    app_state.notice = Some(Notice::error("Project not found"));
                    app_state.project_wizard_state = None;
                    app_state.screen = AppScreen::Projects;
                }
                Err(err) => app_state.notice = Some(failure_notice(&err)),
            }
        }
        None => {}
    }

    Ok(false)
}
