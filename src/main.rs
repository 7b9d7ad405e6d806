mod commands;
mod config;
mod logging;
mod models;
mod service;
mod sharepoint;
mod ui;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{info, warn};
use tui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::commands::AddArgs;
use crate::logging::LogTarget;
use crate::models::NewProject;
use crate::service::ProjectService;
use crate::ui::{
    project_form::{handle_input as handle_form_input, render_project_form, ProjectFormAction, ProjectFormState},
    tracker::{handle_input as handle_tracker_input, render_tracker, TrackerAction, TrackerState},
};

#[derive(Debug, Parser)]
#[command(name = "project-tracker", version, about = "List and add projects kept in a SharePoint list")]
struct Cli {
    /// Use built-in sample projects instead of SharePoint
    #[arg(long, global = true)]
    mock: bool,

    /// SharePoint site URL (overrides TRACKER_SITE_URL)
    #[arg(long, global = true)]
    site_url: Option<String>,

    /// List title (overrides TRACKER_LIST_NAME)
    #[arg(long, global = true)]
    list_name: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive terminal UI (default)
    Tui,
    /// Print every project
    List,
    /// Add one project
    Add(AddArgs),
}

// Represents the current screen in the app
enum AppScreen {
    Projects,
    NewProject,
}

// Main application state
struct AppState {
    service: Box<dyn ProjectService>,
    screen: AppScreen,
    tracker_state: TrackerState,
    form_state: Option<ProjectFormState>,
}

impl AppState {
    fn new(service: Box<dyn ProjectService>) -> Self {
        let tracker_state = TrackerState::new(service.backend_label());
        Self {
            service,
            screen: AppScreen::Projects,
            tracker_state,
            form_state: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = config::init()?;
    config.apply_overrides(cli.site_url, cli.list_name, cli.mock);

    let command = cli.command.unwrap_or(Command::Tui);
    let target = match command {
        Command::Tui => LogTarget::Interactive,
        _ => LogTarget::Command,
    };
    logging::init(&config, target)?;

    let service = service::connect(&config)?;

    match command {
        Command::List => commands::list(service.as_ref(), &mut io::stdout()).await,
        Command::Add(args) => commands::add(service.as_ref(), args, &mut io::stdout()).await,
        Command::Tui => run_tui(service).await,
    }
}

async fn run_tui(service: Box<dyn ProjectService>) -> Result<()> {
    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(service);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| {
            let size = f.size();
            match app_state.screen {
                AppScreen::Projects => render_tracker(f, &mut app_state.tracker_state, size),
                AppScreen::NewProject => {
                    let chunks = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
                        .split(size);
                    render_tracker(f, &mut app_state.tracker_state, chunks[0]);
                    if let Some(state) = &mut app_state.form_state {
                        render_project_form(f, state, chunks[1]);
                    }
                }
            }
        })?;

        // The loading frame is on screen; fetch before waiting for keys
        if app_state.tracker_state.is_loading() {
            load_projects(app_state).await;
            continue;
        }

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Projects => handle_projects_screen(app_state)?,
            AppScreen::NewProject => handle_new_project_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn load_projects(app_state: &mut AppState) {
    let result = app_state.service.list_projects().await;
    match &result {
        Err(err) if err.is_list_not_found() => warn!(list = app_state.service.list_name(), "project list is missing"),
        Err(err) => warn!(error = %err, "loading projects failed"),
        Ok(projects) => info!(count = projects.len(), "projects loaded"),
    }
    app_state.tracker_state.finish_loading(result);
}

fn handle_projects_screen(app_state: &mut AppState) -> Result<bool> {
    match handle_tracker_input(&mut app_state.tracker_state)? {
        Some(TrackerAction::Quit) => return Ok(true),
        Some(TrackerAction::NewProject) => {
            app_state.form_state = Some(ProjectFormState::new());
            app_state.screen = AppScreen::NewProject;
        }
        Some(TrackerAction::Reload) => app_state.tracker_state.begin_loading(),
        None => {}
    }

    Ok(false)
}

async fn handle_new_project_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.form_state {
        match handle_form_input(state)? {
            Some(ProjectFormAction::Cancel) => {
                app_state.form_state = None;
                app_state.screen = AppScreen::Projects;
            }
            Some(ProjectFormAction::Save(project)) => submit_project(app_state, project).await,
            None => {}
        }
    } else {
        app_state.screen = AppScreen::Projects;
    }

    Ok(false)
}

/// Store a project from the form. On failure the form stays open with its fields intact.
async fn submit_project(app_state: &mut AppState, project: NewProject) {
    match app_state.service.add_project(project).await {
        Ok(created) => {
            info!(id = created.id, title = %created.title, "project added");
            // Dropping the form clears its fields for next time
            app_state.form_state = None;
            app_state.screen = AppScreen::Projects;
            app_state.tracker_state.begin_loading();
        }
        Err(err) => {
            warn!(error = %err, "adding project failed");
            app_state.tracker_state.add_failed(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Project;
    use crate::service::{MockProjectService, ServiceError};
    use crate::ui::tracker::ViewError;
    use async_trait::async_trait;

    struct FailingService(ServiceError);

    #[async_trait]
    impl ProjectService for FailingService {
        async fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
            Err(self.0.clone())
        }

        async fn add_project(&self, _project: NewProject) -> Result<Project, ServiceError> {
            Err(self.0.clone())
        }

        fn list_name(&self) -> &str {
            "RevlonProjects"
        }

        fn backend_label(&self) -> String {
            "failing".to_string()
        }
    }

    fn app_with_open_form(service: Box<dyn ProjectService>) -> AppState {
        let mut app_state = AppState::new(service);
        app_state.tracker_state.finish_loading(Ok(Vec::new()));

        let mut form = ProjectFormState::new();
        form.title = "Brand Refresh".to_string();
        form.manager = "Sarah Johnson".to_string();
        app_state.form_state = Some(form);
        app_state.screen = AppScreen::NewProject;
        app_state
    }

    fn form_project(app_state: &AppState) -> NewProject {
        app_state.form_state.as_ref().unwrap().to_new_project()
    }

    #[tokio::test]
    async fn successful_save_closes_form_and_reloads() {
        let mut app_state = app_with_open_form(Box::new(MockProjectService::new("RevlonProjects".into())));
        let project = form_project(&app_state);

        submit_project(&mut app_state, project).await;

        assert!(app_state.form_state.is_none());
        assert!(matches!(app_state.screen, AppScreen::Projects));
        assert!(app_state.tracker_state.is_loading());
    }

    #[tokio::test]
    async fn missing_list_keeps_form_and_shows_guidance() {
        let mut app_state = app_with_open_form(Box::new(FailingService(ServiceError::ListNotFound {
            list: "RevlonProjects".into(),
        })));
        let project = form_project(&app_state);

        submit_project(&mut app_state, project).await;

        let form = app_state.form_state.as_ref().unwrap();
        assert_eq!(form.title, "Brand Refresh");
        assert_eq!(form.manager, "Sarah Johnson");
        assert!(matches!(app_state.screen, AppScreen::NewProject));
        assert_eq!(
            app_state.tracker_state.error(),
            Some(&ViewError::ListNotFound("RevlonProjects".into()))
        );
    }

    #[tokio::test]
    async fn other_failure_keeps_form_and_shows_message() {
        let mut app_state = app_with_open_form(Box::new(FailingService(ServiceError::Other(
            "Failed to add project: Invalid date/time value".into(),
        ))));
        let project = form_project(&app_state);

        submit_project(&mut app_state, project).await;

        assert_eq!(app_state.form_state.as_ref().unwrap().title, "Brand Refresh");
        assert!(!app_state.tracker_state.is_loading());
        assert_eq!(
            app_state.tracker_state.error(),
            Some(&ViewError::Message("Failed to add project: Invalid date/time value".into()))
        );
    }
}
