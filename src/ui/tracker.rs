use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::models::Project;
use crate::service::{display_date, ServiceError};

const LOAD_FAILED: &str = "Failed to load projects. Please try again later.";

/// What the message area above the table shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The list is missing; show how to create it
    ListNotFound(String),
    /// Any other failure; the user can dismiss it
    Message(String),
}

impl ViewError {
    pub fn from_load(err: ServiceError) -> Self {
        match err {
            ServiceError::ListNotFound { list } => ViewError::ListNotFound(list),
            ServiceError::Other(_) => ViewError::Message(LOAD_FAILED.to_string()),
        }
    }

    pub fn from_add(err: ServiceError) -> Self {
        match err {
            ServiceError::ListNotFound { list } => ViewError::ListNotFound(list),
            ServiceError::Other(message) if message.is_empty() => {
                ViewError::Message("Failed to add project. Please try again.".to_string())
            }
            ServiceError::Other(message) => ViewError::Message(message),
        }
    }
}

/// Rows on screen and where they came from. Rows shown before a failed
/// request stay on screen until the next successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading { previous: Vec<Project> },
    Loaded(Vec<Project>),
    Failed { error: ViewError, projects: Vec<Project> },
}

/// Instructions for creating the list by hand
pub fn setup_guidance(list: &str) -> Vec<String> {
    vec![
        format!(
            "The SharePoint list \"{}\" was not found. Please create the list with the following columns:",
            list
        ),
        "  - Title (Single line of text)".to_string(),
        "  - ProjectStatus (Single line of text)".to_string(),
        "  - ProjectManager (Single line of text)".to_string(),
        "  - StartDate (Date and Time)".to_string(),
        "  - EndDate (Date and Time)".to_string(),
    ]
}

pub struct TrackerState {
    backend_label: String,
    load: LoadState,
    table_state: TableState,
}

impl TrackerState {
    /// Starts in the loading state; the first frame triggers the initial load
    pub fn new(backend_label: String) -> Self {
        Self {
            backend_label,
            load: LoadState::Loading {
                previous: Vec::new(),
            },
            table_state: TableState::default(),
        }
    }

    #[cfg(test)]
    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn projects(&self) -> &[Project] {
        match &self.load {
            LoadState::Loading { previous } => previous,
            LoadState::Loaded(projects) => projects,
            LoadState::Failed { projects, .. } => projects,
        }
    }

    pub fn error(&self) -> Option<&ViewError> {
        match &self.load {
            LoadState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Loading { .. })
    }

    fn take_projects(&mut self) -> Vec<Project> {
        let load = std::mem::replace(&mut self.load, LoadState::Loaded(Vec::new()));
        match load {
            LoadState::Loading { previous } => previous,
            LoadState::Loaded(projects) => projects,
            LoadState::Failed { projects, .. } => projects,
        }
    }

    /// Clears any error and marks the table as loading
    pub fn begin_loading(&mut self) {
        let previous = self.take_projects();
        self.load = LoadState::Loading { previous };
    }

    pub fn finish_loading(&mut self, result: Result<Vec<Project>, ServiceError>) {
        let previous = self.take_projects();
        self.load = match result {
            Ok(projects) => LoadState::Loaded(projects),
            Err(err) => LoadState::Failed {
                error: ViewError::from_load(err),
                projects: previous,
            },
        };
        self.fix_selection();
    }

    pub fn add_failed(&mut self, err: ServiceError) {
        let projects = self.take_projects();
        self.load = LoadState::Failed {
            error: ViewError::from_add(err),
            projects,
        };
    }

    /// Hides a dismissible error. Setup guidance stays until a load succeeds.
    pub fn dismiss_error(&mut self) {
        if let LoadState::Failed {
            error: ViewError::Message(_),
            ..
        } = self.load
        {
            let projects = self.take_projects();
            self.load = LoadState::Loaded(projects);
        }
    }

    fn fix_selection(&mut self) {
        let len = self.projects().len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            Some(_) => {}
        }
    }

    pub fn next(&mut self) {
        let len = self.projects().len();
        if len == 0 {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.projects().len();
        if len == 0 {
            return;
        }

        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.table_state.selected().and_then(|i| self.projects().get(i))
    }
}

pub enum TrackerAction {
    Quit,
    NewProject,
    Reload,
}

pub fn render_tracker<B: Backend>(frame: &mut Frame<B>, state: &mut TrackerState, area: Rect) {
    let message_height = match state.error() {
        Some(ViewError::ListNotFound(_)) => 8,
        Some(ViewError::Message(_)) => 4,
        None => 0,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(message_height),
                Constraint::Min(3),
                Constraint::Length(2),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let mut header = vec![
        Span::styled("Projects", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(format!("({})", state.backend_label), Style::default().fg(Color::Gray)),
    ];
    if let Some(project) = state.selected_project() {
        header.push(Span::raw("  "));
        header.push(Span::styled(project.title.clone(), Style::default().fg(Color::Yellow)));
    }
    let title = Paragraph::new(Spans::from(header))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    match state.error() {
        Some(ViewError::ListNotFound(list)) => {
            let lines: Vec<Spans> = setup_guidance(list).into_iter().map(Spans::from).collect();
            let guidance = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().title("List not found").borders(Borders::ALL));
            frame.render_widget(guidance, chunks[1]);
        }
        Some(ViewError::Message(message)) => {
            let bar = Paragraph::new(vec![
                Spans::from(message.as_str()),
                Spans::from(Span::styled("<X> Dismiss", Style::default().fg(Color::Gray))),
            ])
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Red))
            .block(Block::default().title("Error").borders(Borders::ALL));
            frame.render_widget(bar, chunks[1]);
        }
        None => {}
    }

    render_table(frame, state, chunks[2]);

    let mut buttons = String::from("<N> Add New Project | <R> Reload");
    if matches!(state.error(), Some(ViewError::Message(_))) {
        buttons.push_str(" | <X> Dismiss");
    }
    buttons.push_str(" | <Q> Quit");
    let buttons = Paragraph::new(buttons)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[3]);

    let footer = Paragraph::new(format!("Project Tracker v{}", env!("CARGO_PKG_VERSION")))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);
}

fn render_table<B: Backend>(frame: &mut Frame<B>, state: &mut TrackerState, area: Rect) {
    let block = Block::default().borders(Borders::ALL);

    if state.is_loading() {
        let loading = Paragraph::new("Loading projects...")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    let header = Row::new(
        ["Project Name", "Status", "Project Manager", "Start Date", "End Date"]
            .into_iter()
            .map(|name| Cell::from(name).style(Style::default().add_modifier(Modifier::BOLD))),
    )
    .bottom_margin(1);

    let rows: Vec<Row> = state
        .projects()
        .iter()
        .map(|project| {
            Row::new(vec![
                Cell::from(project.title.clone()),
                Cell::from(project.status.clone()),
                Cell::from(project.manager.clone()),
                Cell::from(display_date(&project.start_date).to_string()),
                Cell::from(display_date(&project.end_date).to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(15),
        Constraint::Percentage(25),
        Constraint::Percentage(15),
        Constraint::Percentage(15),
    ];

    let table = Table::new(rows)
        .header(header)
        .block(block)
        .widths(&widths)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(table, area, &mut state.table_state);
}

pub fn handle_input(state: &mut TrackerState) -> Result<Option<TrackerAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(apply_key(state, key.code));
    }
    Ok(None)
}

fn apply_key(state: &mut TrackerState, key: KeyCode) -> Option<TrackerAction> {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(TrackerAction::Quit),
        KeyCode::Char('n') => return Some(TrackerAction::NewProject),
        KeyCode::Char('r') => return Some(TrackerAction::Reload),
        KeyCode::Char('x') => state.dismiss_error(),
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockProjectService;
    use crate::service::ProjectService;
    use pretty_assertions::assert_eq;

    fn project(id: i64, title: &str) -> Project {
        Project {
            id,
            title: title.to_string(),
            ..Project::default()
        }
    }

    fn not_found() -> ServiceError {
        ServiceError::ListNotFound {
            list: "RevlonProjects".into(),
        }
    }

    #[test]
    fn starts_loading_without_rows() {
        let state = TrackerState::new("sample data".into());
        assert!(state.is_loading());
        assert!(state.projects().is_empty());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn successful_load_selects_first_row() {
        let mut state = TrackerState::new("sample data".into());
        state.finish_loading(Ok(vec![project(1, "A"), project(2, "B")]));

        assert_eq!(state.load_state(), &LoadState::Loaded(vec![project(1, "A"), project(2, "B")]));
        assert_eq!(state.selected_project().map(|p| p.id), Some(1));
    }

    #[test]
    fn missing_list_shows_guidance_and_is_not_dismissible() {
        let mut state = TrackerState::new("sample data".into());
        state.finish_loading(Err(not_found()));

        assert_eq!(
            state.error(),
            Some(&ViewError::ListNotFound("RevlonProjects".into()))
        );
        state.dismiss_error();
        assert!(state.error().is_some());
    }

    #[test]
    fn generic_load_failure_uses_friendly_text_and_keeps_rows() {
        let mut state = TrackerState::new("sample data".into());
        state.finish_loading(Ok(vec![project(1, "A")]));
        state.begin_loading();
        assert_eq!(state.projects(), &[project(1, "A")]);

        state.finish_loading(Err(ServiceError::Other("HTTP 500".into())));
        assert_eq!(
            state.load_state(),
            &LoadState::Failed {
                error: ViewError::Message(LOAD_FAILED.into()),
                projects: vec![project(1, "A")],
            }
        );

        apply_key(&mut state, KeyCode::Char('x'));
        assert_eq!(state.load_state(), &LoadState::Loaded(vec![project(1, "A")]));
    }

    #[test]
    fn add_failure_shows_underlying_message() {
        let mut state = TrackerState::new("sample data".into());
        state.finish_loading(Ok(vec![]));
        state.add_failed(ServiceError::Other("Failed to add project: Invalid date/time value".into()));
        assert_eq!(
            state.error(),
            Some(&ViewError::Message("Failed to add project: Invalid date/time value".into()))
        );

        state.add_failed(not_found());
        assert_eq!(
            state.error(),
            Some(&ViewError::ListNotFound("RevlonProjects".into()))
        );
    }

    #[test]
    fn reload_clears_error() {
        let mut state = TrackerState::new("sample data".into());
        state.finish_loading(Err(not_found()));
        state.begin_loading();
        assert!(state.is_loading());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn selection_wraps_and_shrinks_with_data() {
        let mut state = TrackerState::new("sample data".into());
        state.finish_loading(Ok(vec![project(1, "A"), project(2, "B"), project(3, "C")]));
        state.previous();
        assert_eq!(state.selected_project().map(|p| p.id), Some(3));
        state.next();
        assert_eq!(state.selected_project().map(|p| p.id), Some(1));

        state.previous();
        state.begin_loading();
        state.finish_loading(Ok(vec![project(9, "Z")]));
        assert_eq!(state.selected_project().map(|p| p.id), Some(9));
    }

    #[test]
    fn header_names_the_selected_project() {
        use tui::{backend::TestBackend, Terminal};

        let mut state = TrackerState::new("sample data".into());
        state.finish_loading(Ok(vec![project(1, "Audit"), project(2, "Brand Refresh")]));
        state.next();

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| render_tracker(f, &mut state, f.size())).unwrap();

        let buffer = terminal.backend().buffer();
        let header: String = (0..80).map(|x| buffer.get(x, 1).symbol.clone()).collect();
        assert!(header.contains("(sample data)"));
        assert!(header.contains("Brand Refresh"));
    }

    #[test]
    fn keys_map_to_actions() {
        let mut state = TrackerState::new("sample data".into());
        assert!(matches!(apply_key(&mut state, KeyCode::Char('n')), Some(TrackerAction::NewProject)));
        assert!(matches!(apply_key(&mut state, KeyCode::Char('r')), Some(TrackerAction::Reload)));
        assert!(matches!(apply_key(&mut state, KeyCode::Esc), Some(TrackerAction::Quit)));
        assert!(apply_key(&mut state, KeyCode::Down).is_none());
    }

    #[tokio::test]
    async fn loads_from_a_service() {
        let service = MockProjectService::new("RevlonProjects".into());
        let mut state = TrackerState::new(service.backend_label());
        state.finish_loading(service.list_projects().await);

        assert_eq!(state.projects().len(), 3);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn guidance_names_the_list_and_columns() {
        let lines = setup_guidance("Projects");
        assert!(lines[0].contains("\"Projects\""));
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().any(|l| l.contains("StartDate (Date and Time)")));
    }
}
