use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Segmented YYYY-MM-DD editor for a date that may be left unset
pub struct DateInputState {
    pub date: Option<NaiveDate>,
    pub editing: bool,
    pub date_part: DatePart,
    pub current_date_input: String,
}

impl DateInputState {
    pub fn new(date: Option<NaiveDate>) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Year,
            current_date_input: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.date_part = DatePart::Year;
        }
        self.current_date_input.clear();
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.current_date_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.current_date_input.clear();
    }

    /// The value as the form submits it: `YYYY-MM-DD`, or empty when unset
    pub fn value(&self) -> String {
        self.date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.date = None;
        self.current_date_input.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                // Typing into an unset date starts from today
                let base = self.date.unwrap_or_else(|| Local::now().date_naive());
                self.current_date_input.push(c);

                let width = if self.date_part == DatePart::Year { 4 } else { 2 };
                if self.current_date_input.len() < width {
                    return;
                }

                if let Ok(number) = self.current_date_input.parse::<u32>() {
                    let updated = match self.date_part {
                        DatePart::Year if (1900..=2100).contains(&number) => {
                            clamped(number as i32, base.month(), base.day())
                        }
                        DatePart::Month => clamped(base.year(), number, base.day()),
                        DatePart::Day => NaiveDate::from_ymd_opt(base.year(), base.month(), number),
                        _ => None,
                    };
                    if let Some(date) = updated {
                        self.date = Some(date);
                        self.next_date_part();
                    }
                }
                self.current_date_input.clear();
            }
            KeyCode::Backspace => {
                self.current_date_input.pop();
            }
            KeyCode::Delete => self.clear(),
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    pub fn get_display_string(&self) -> String {
        let (year, month, day) = match self.date {
            Some(date) => (
                format!("{:04}", date.year()),
                format!("{:02}", date.month()),
                format!("{:02}", date.day()),
            ),
            None if self.editing => ("____".to_string(), "__".to_string(), "__".to_string()),
            None => return "Not set".to_string(),
        };

        if !self.editing {
            return format!("{}-{}-{}", year, month, day);
        }

        let current_input = if !self.current_date_input.is_empty() {
            format!("[{}]", self.current_date_input)
        } else {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        };

        match self.date_part {
            DatePart::Year => format!("{}{}-{}-{}", year, current_input, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, current_input, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, current_input),
        }
    }
}

// Keeps the day inside the month, so moving Jan 31 to February lands on the 28th/29th
fn clamped(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| (28..day).rev().find_map(|d| NaiveDate::from_ymd_opt(year, month, d)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_digits(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_a_full_date_fills_every_part() {
        let mut state = DateInputState::new(None);
        state.toggle_editing();
        type_digits(&mut state, "20240115");

        assert_eq!(state.value(), "2024-01-15");
    }

    #[test]
    fn month_change_clamps_the_day() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2024, 1, 31));
        state.toggle_editing();
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "02");
        assert_eq!(state.value(), "2024-02-29");
    }

    #[test]
    fn unset_date_submits_empty() {
        let state = DateInputState::new(None);
        assert_eq!(state.value(), "");
        assert_eq!(state.get_display_string(), "Not set");
    }

    #[test]
    fn impossible_day_is_ignored() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2023, 2, 10));
        state.toggle_editing();
        state.handle_input(KeyCode::Right);
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "30");

        assert_eq!(state.value(), "2023-02-10");
        assert!(state.current_date_input.is_empty());
    }

    #[test]
    fn delete_clears_the_date() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2024, 3, 30));
        state.toggle_editing();
        state.handle_input(KeyCode::Delete);
        assert_eq!(state.value(), "");
        assert_eq!(state.get_display_string(), "____[YYYY]-__-__");
    }

    #[test]
    fn display_marks_the_part_being_edited() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2024, 3, 30));
        assert_eq!(state.get_display_string(), "2024-03-30");

        state.toggle_editing();
        state.handle_input(KeyCode::Right);
        assert_eq!(state.get_display_string(), "2024-03[MM]-30");
    }
}
