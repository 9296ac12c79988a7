use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::db::Relation;

use super::helpers::move_index;
use super::screens::{EntityKind, Entry, ReportKind, ReportRequest};

/// Create/edit form shared by all four entity kinds. Only albums show the
/// year field.
#[derive(Clone)]
pub(crate) struct EntityForm {
    pub(crate) kind: EntityKind,
    /// Natural key of the row being edited; `None` when creating.
    pub(crate) original: Option<String>,
    pub(crate) key: String,
    pub(crate) year: String,
    pub(crate) active: FormField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum FormField {
    #[default]
    Key,
    Year,
}

impl EntityForm {
    pub(crate) fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            original: None,
            key: String::new(),
            year: String::new(),
            active: FormField::Key,
            error: None,
        }
    }

    /// Populate the form from an existing row when editing.
    pub(crate) fn from_entry(kind: EntityKind, entry: &Entry) -> Self {
        Self {
            kind,
            original: Some(entry.key.clone()),
            key: entry.key.clone(),
            year: entry.year.map(|y| y.to_string()).unwrap_or_default(),
            active: FormField::Key,
            error: None,
        }
    }

    pub(crate) fn title(&self) -> String {
        let verb = if self.original.is_some() { "Edit" } else { "Add" };
        let noun = self.kind.noun();
        let mut chars = noun.chars();
        let noun = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{verb} {noun}")
    }

    pub(crate) fn toggle_field(&mut self) {
        if !self.kind.has_year() {
            return;
        }
        self.active = match self.active {
            FormField::Key => FormField::Year,
            FormField::Year => FormField::Key,
        };
    }

    /// Append a character to the active field, rejecting anything the field
    /// cannot hold.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            FormField::Key => {
                if !ch.is_control() {
                    self.key.push(ch);
                    true
                } else {
                    false
                }
            }
            FormField::Year => {
                if ch.is_ascii_digit() {
                    self.year.push(ch);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            FormField::Key => {
                self.key.pop();
            }
            FormField::Year => {
                self.year.pop();
            }
        }
    }

    /// Validate the inputs and return the trimmed key plus the year for
    /// albums.
    pub(crate) fn parse_inputs(&self) -> Result<(String, Option<i64>)> {
        let key = self.key.trim();
        if key.is_empty() {
            return Err(anyhow!("{} cannot be empty.", self.kind.key_label()));
        }
        if !self.kind.has_year() {
            return Ok((key.to_string(), None));
        }

        let year_raw = self.year.trim();
        if year_raw.is_empty() {
            return Err(anyhow!("Year is required."));
        }
        let year = year_raw
            .parse::<i64>()
            .context("Year must be an integer.")?;
        Ok((key.to_string(), Some(year)))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: FormField) -> Line<'static> {
        let (label, value) = match field {
            FormField::Key => (self.kind.key_label(), &self.key),
            FormField::Year => ("Year", &self.year),
        };
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{label}: ")),
            Span::styled(display, style),
        ])
    }

    /// Cursor column offset inside the form for the active field.
    pub(crate) fn cursor_offset(&self) -> (u16, u16) {
        match self.active {
            FormField::Key => (
                (self.kind.key_label().len() + 2 + self.key.chars().count()) as u16,
                0,
            ),
            FormField::Year => (("Year: ".len() + self.year.chars().count()) as u16, 1),
        }
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) kind: EntityKind,
    pub(crate) key: String,
}

/// Prompt for the parameter of a report.
#[derive(Clone)]
pub(crate) struct ReportQuery {
    pub(crate) kind: ReportKind,
    pub(crate) input: String,
    pub(crate) error: Option<String>,
}

impl ReportQuery {
    pub(crate) fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            input: String::new(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let accepted = if self.kind.numeric() {
            ch.is_ascii_digit()
        } else {
            !ch.is_control()
        };
        if accepted {
            self.input.push(ch);
        }
        accepted
    }

    pub(crate) fn backspace(&mut self) {
        self.input.pop();
    }

    /// Validate the input into a request for this prompt's report.
    pub(crate) fn parse(&self) -> Result<ReportRequest> {
        let raw = self.input.trim();
        if raw.is_empty() {
            return Err(anyhow!("Input cannot be empty."));
        }
        Ok(match self.kind {
            ReportKind::SongsByArtist => ReportRequest::SongsByArtist(raw.to_string()),
            ReportKind::ArtistsInYear => {
                let year = raw.parse::<i64>().context("Please enter an integer.")?;
                ReportRequest::ArtistsInYear(year)
            }
            ReportKind::AlbumsInCategory => ReportRequest::AlbumsInCategory(raw.to_string()),
        })
    }
}

/// List of existing rows that can be linked to the song being viewed.
pub(crate) struct LinkPicker {
    pub(crate) relation: Relation,
    pub(crate) song_id: i64,
    pub(crate) options: Vec<Entry>,
    pub(crate) selected: usize,
}

impl LinkPicker {
    /// Offer every candidate not already linked.
    pub(crate) fn new(
        relation: Relation,
        song_id: i64,
        candidates: Vec<Entry>,
        linked: &[Entry],
    ) -> Self {
        let options = candidates
            .into_iter()
            .filter(|c| linked.iter().all(|l| l.id != c.id))
            .collect();
        Self {
            relation,
            song_id,
            options,
            selected: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.options.len()
    }

    pub(crate) fn current(&self) -> Option<&Entry> {
        self.options.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = move_index(self.selected, offset, self.options.len());
    }
}
