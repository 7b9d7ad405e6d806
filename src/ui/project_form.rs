use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::models::NewProject;
use crate::ui::components::date_input::DateInputState;

pub enum ProjectFormAction {
    Cancel,
    Save(NewProject),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FormField {
    Title,
    Status,
    Manager,
    StartDate,
    EndDate,
}

const FIELD_LABELS: [&str; 5] = [
    "Project Name",
    "Status",
    "Project Manager",
    "Start Date",
    "End Date",
];

/// The "Add New Project" side panel
pub struct ProjectFormState {
    pub title: String,
    pub status: String,
    pub manager: String,
    pub start_date_state: DateInputState,
    pub end_date_state: DateInputState,
    pub current_field: FormField,
    pub editing: bool,
}

impl ProjectFormState {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            status: String::new(),
            manager: String::new(),
            start_date_state: DateInputState::new(None),
            end_date_state: DateInputState::new(None),
            current_field: FormField::Title,
            editing: false,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            match self.current_field {
                FormField::StartDate => self.start_date_state.toggle_editing(),
                FormField::EndDate => self.end_date_state.toggle_editing(),
                _ => {}
            }
        } else {
            self.start_date_state.editing = false;
            self.end_date_state.editing = false;
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            FormField::Title => FormField::Status,
            FormField::Status => FormField::Manager,
            FormField::Manager => FormField::StartDate,
            FormField::StartDate => FormField::EndDate,
            FormField::EndDate => FormField::Title,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            FormField::Title => FormField::EndDate,
            FormField::Status => FormField::Title,
            FormField::Manager => FormField::Status,
            FormField::StartDate => FormField::Manager,
            FormField::EndDate => FormField::StartDate,
        };
    }

    fn text_field(&mut self) -> Option<&mut String> {
        match self.current_field {
            FormField::Title => Some(&mut self.title),
            FormField::Status => Some(&mut self.status),
            FormField::Manager => Some(&mut self.manager),
            FormField::StartDate | FormField::EndDate => None,
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match self.current_field {
            FormField::StartDate => self.start_date_state.handle_input(key),
            FormField::EndDate => self.end_date_state.handle_input(key),
            _ => {
                if let Some(field) = self.text_field() {
                    match key {
                        KeyCode::Char(c) => field.push(c),
                        KeyCode::Backspace => {
                            field.pop();
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Empty fields are submitted as absent
    pub fn to_new_project(&self) -> NewProject {
        let optional = |value: String| Some(value).filter(|v| !v.is_empty());
        NewProject {
            title: optional(self.title.clone()),
            status: optional(self.status.clone()),
            manager: optional(self.manager.clone()),
            start_date: optional(self.start_date_state.value()),
            end_date: optional(self.end_date_state.value()),
        }
    }

    fn field_values(&self) -> [String; 5] {
        [
            self.title.clone(),
            self.status.clone(),
            self.manager.clone(),
            self.start_date_state.get_display_string(),
            self.end_date_state.get_display_string(),
        ]
    }
}

impl Default for ProjectFormState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_project_form<B: Backend>(f: &mut Frame<B>, state: &mut ProjectFormState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(7), Constraint::Length(3)].as_ref())
        .split(area);

    f.render_widget(Clear, area);

    let values = state.field_values();
    let items: Vec<ListItem> = FIELD_LABELS
        .iter()
        .zip(values.iter())
        .enumerate()
        .map(|(i, (label, value))| {
            let selected = i == state.current_field as usize;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            let content = if selected && state.editing {
                let is_date = matches!(state.current_field, FormField::StartDate | FormField::EndDate);
                let shown = if is_date {
                    value.clone()
                } else {
                    format!("{}|", value)
                };
                Spans::from(vec![
                    Span::styled(format!("{}: ", label), label_style),
                    Span::styled(shown, Style::default().add_modifier(Modifier::BOLD)),
                ])
            } else {
                Spans::from(vec![
                    Span::styled(format!("{}: ", label), label_style),
                    Span::raw(value.clone()),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Add New Project"),
    );
    f.render_widget(form, chunks[0]);

    let help_text = if state.editing {
        match state.current_field {
            FormField::StartDate | FormField::EndDate => {
                "Enter - Done | Left/Right - Date part | Del - Clear"
            }
            _ => "Enter - Done | Esc - Stop editing",
        }
    } else {
        "Enter - Edit | Up/Down - Fields | S - Save | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[1]);
}

pub fn handle_input(state: &mut ProjectFormState) -> Result<Option<ProjectFormAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(apply_key(state, key.code));
    }

    Ok(None)
}

fn apply_key(state: &mut ProjectFormState, key: KeyCode) -> Option<ProjectFormAction> {
    match key {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Some(ProjectFormAction::Cancel);
            }
        }
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down | KeyCode::Tab if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => {
            return Some(ProjectFormAction::Save(state.to_new_project()));
        }
        _ if state.editing => state.edit_current_field(key),
        _ => {}
    }

    None
}
