use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::db::{Catalog, Relation};
use crate::error::StoreError;
use crate::models::Song;

use super::forms::{ConfirmDelete, EntityForm, FormField, LinkPicker, ReportQuery};
use super::helpers::{centered_rect, surface_error};
use super::screens::{
    load_entries, EntityKind, EntityScreen, HomeItem, HomeScreen, ReportMenuScreen, ReportScreen,
    SongDetailScreen, DETAIL_PANES, HOME_ITEMS, REPORT_KINDS,
};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp / PageDown.
const PAGE: isize = 5;

const INSTRUCTIONS: &[&str] = &[
    "Build your music library one entity at a time.",
    "",
    "Add artists, albums and categories from their own menus before adding a",
    "song. Songs sit at the centre of the library: open a song (Enter in the",
    "song list) to link it to any number of artists, albums and categories.",
    "",
    "Example:",
    "  1. Manage Artists    -> + -> \"Michael Jackson\"",
    "  2. Manage Categories -> + -> \"Pop\"",
    "  3. Manage Albums     -> + -> \"Thriller\", Tab, 1982",
    "  4. Manage Songs      -> + -> \"Beat It\", then + in each pane to link",
    "",
    "Deleting an artist, album, category or song keeps its links. Use",
    "\"Prune Dangling Links\" from the main menu to clean them up.",
    "",
    "Reports answer three questions: which songs an artist plays, which",
    "artists play songs on albums from a given year, and which albums carry",
    "songs of a given category.",
];

/// High-level navigation states.
enum Screen {
    Home(HomeScreen),
    Entities(EntityScreen),
    SongDetail(SongDetailScreen),
    ReportMenu(ReportMenuScreen),
    Report(ReportScreen),
    Help,
}

/// Fine-grained modes layered over the current screen.
enum Mode {
    Normal,
    Editing(EntityForm),
    ConfirmDelete(ConfirmDelete),
    Linking(LinkPicker),
    Querying(ReportQuery),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    catalog: Catalog,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            screen: Screen::Home(HomeScreen::default()),
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Hand the catalog back so the caller can close it.
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Editing(form) => self.handle_form(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::Linking(picker) => self.handle_link_picker(code, picker),
            Mode::Querying(query) => self.handle_query(code, query),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        if code == KeyCode::Char('q') {
            *exit = true;
            return Mode::Normal;
        }

        let screen = mem::replace(&mut self.screen, Screen::Help);
        let (screen, mode) = match screen {
            Screen::Home(home) => self.handle_home_key(code, home, exit),
            Screen::Entities(list) => self.handle_entities_key(code, list),
            Screen::SongDetail(detail) => self.handle_detail_key(code, detail),
            Screen::ReportMenu(menu) => self.handle_report_menu_key(code, menu),
            Screen::Report(report) => self.handle_report_key(code, report),
            Screen::Help => match code {
                KeyCode::Esc | KeyCode::Enter => (
                    Screen::Home(HomeScreen::focused_on(HomeItem::Help)),
                    Mode::Normal,
                ),
                _ => (Screen::Help, Mode::Normal),
            },
        };

        self.screen = screen;
        mode
    }

    fn handle_home_key(
        &mut self,
        code: KeyCode,
        mut home: HomeScreen,
        exit: &mut bool,
    ) -> (Screen, Mode) {
        match code {
            KeyCode::Esc => *exit = true,
            KeyCode::Up => home.move_selection(-1),
            KeyCode::Down => home.move_selection(1),
            KeyCode::Home => home.selected = 0,
            KeyCode::End => home.selected = HOME_ITEMS.len() - 1,
            KeyCode::Enter => {
                self.clear_status();
                match home.current() {
                    HomeItem::Manage(kind) => match load_entries(&self.catalog, kind) {
                        Ok(entries) => {
                            return (
                                Screen::Entities(EntityScreen::new(kind, entries)),
                                Mode::Normal,
                            );
                        }
                        Err(err) => self.report_error(err),
                    },
                    HomeItem::Reports => {
                        return (
                            Screen::ReportMenu(ReportMenuScreen::default()),
                            Mode::Normal,
                        );
                    }
                    HomeItem::PruneLinks => self.prune_links(),
                    HomeItem::Help => return (Screen::Help, Mode::Normal),
                }
            }
            _ => {}
        }
        (Screen::Home(home), Mode::Normal)
    }

    fn handle_entities_key(&mut self, code: KeyCode, mut list: EntityScreen) -> (Screen, Mode) {
        let kind = list.kind;
        match code {
            KeyCode::Esc => {
                self.clear_status();
                return (
                    Screen::Home(HomeScreen::focused_on(HomeItem::Manage(kind))),
                    Mode::Normal,
                );
            }
            KeyCode::Up => list.move_selection(-1),
            KeyCode::Down => list.move_selection(1),
            KeyCode::PageUp => list.move_selection(-PAGE),
            KeyCode::PageDown => list.move_selection(PAGE),
            KeyCode::Home => list.select_first(),
            KeyCode::End => list.select_last(),
            KeyCode::Char('+') => {
                self.clear_status();
                return (Screen::Entities(list), Mode::Editing(EntityForm::new(kind)));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(entry) = list.current().cloned() {
                    self.clear_status();
                    let form = EntityForm::from_entry(kind, &entry);
                    return (Screen::Entities(list), Mode::Editing(form));
                }
                self.set_status(
                    format!("No {} selected to edit.", kind.noun()),
                    StatusKind::Error,
                );
            }
            KeyCode::Char('-') => {
                if let Some(entry) = list.current().cloned() {
                    self.clear_status();
                    let confirm = ConfirmDelete {
                        kind,
                        key: entry.key,
                    };
                    return (Screen::Entities(list), Mode::ConfirmDelete(confirm));
                }
                self.set_status(
                    format!("No {} selected to delete.", kind.noun()),
                    StatusKind::Error,
                );
            }
            KeyCode::Enter if kind == EntityKind::Song => {
                if let Some(entry) = list.current().cloned() {
                    let song = Song {
                        id: entry.id,
                        title: entry.key,
                    };
                    match SongDetailScreen::load(&self.catalog, song) {
                        Ok(detail) => {
                            self.clear_status();
                            return (Screen::SongDetail(detail), Mode::Normal);
                        }
                        Err(err) => self.report_error(err),
                    }
                }
            }
            _ => {}
        }
        (Screen::Entities(list), Mode::Normal)
    }

    fn handle_detail_key(&mut self, code: KeyCode, mut detail: SongDetailScreen) -> (Screen, Mode) {
        match code {
            KeyCode::Esc => match load_entries(&self.catalog, EntityKind::Song) {
                Ok(entries) => {
                    self.clear_status();
                    let mut list = EntityScreen::new(EntityKind::Song, Vec::new());
                    list.set_entries(entries, Some(&detail.song.title));
                    return (Screen::Entities(list), Mode::Normal);
                }
                Err(err) => self.report_error(err),
            },
            KeyCode::Tab | KeyCode::Right => detail.switch_pane(1),
            KeyCode::BackTab | KeyCode::Left => detail.switch_pane(-1),
            KeyCode::Up => detail.move_selection(-1),
            KeyCode::Down => detail.move_selection(1),
            KeyCode::Char('+') => {
                let kind = EntityKind::linked_by(detail.pane);
                match load_entries(&self.catalog, kind) {
                    Ok(candidates) => {
                        let picker = LinkPicker::new(
                            detail.pane,
                            detail.song.id,
                            candidates,
                            detail.pane_entries(detail.pane),
                        );
                        if picker.len() == 0 {
                            self.set_status(
                                format!(
                                    "No {} left to link. Add them from the main menu.",
                                    kind.plural().to_lowercase()
                                ),
                                StatusKind::Error,
                            );
                        } else {
                            self.clear_status();
                            return (Screen::SongDetail(detail), Mode::Linking(picker));
                        }
                    }
                    Err(err) => self.report_error(err),
                }
            }
            KeyCode::Char('-') => {
                if let Some(entry) = detail.current().cloned() {
                    let result = self
                        .catalog
                        .unlink(detail.pane, detail.song.id, entry.id)
                        .and_then(|_| detail.reload(&self.catalog));
                    match result {
                        Ok(()) => {
                            self.set_status(format!("Unlinked {}.", entry.key), StatusKind::Info)
                        }
                        Err(err) => self.report_error(err),
                    }
                } else {
                    self.set_status("Nothing selected to unlink.", StatusKind::Error);
                }
            }
            _ => {}
        }
        (Screen::SongDetail(detail), Mode::Normal)
    }

    fn handle_report_menu_key(
        &mut self,
        code: KeyCode,
        mut menu: ReportMenuScreen,
    ) -> (Screen, Mode) {
        match code {
            KeyCode::Esc => {
                return (
                    Screen::Home(HomeScreen::focused_on(HomeItem::Reports)),
                    Mode::Normal,
                );
            }
            KeyCode::Up => menu.move_selection(-1),
            KeyCode::Down => menu.move_selection(1),
            KeyCode::Enter => {
                self.clear_status();
                let query = ReportQuery::new(menu.current());
                return (Screen::ReportMenu(menu), Mode::Querying(query));
            }
            _ => {}
        }
        (Screen::ReportMenu(menu), Mode::Normal)
    }

    fn handle_report_key(&mut self, code: KeyCode, mut report: ReportScreen) -> (Screen, Mode) {
        match code {
            KeyCode::Esc => {
                let menu = ReportMenuScreen {
                    selected: REPORT_KINDS
                        .iter()
                        .position(|k| *k == report.kind)
                        .unwrap_or(0),
                };
                return (Screen::ReportMenu(menu), Mode::Normal);
            }
            KeyCode::Up => report.scroll_by(-1),
            KeyCode::Down => report.scroll_by(1),
            KeyCode::PageUp => report.scroll_by(-PAGE),
            KeyCode::PageDown => report.scroll_by(PAGE),
            KeyCode::Enter => {
                let query = ReportQuery::new(report.kind);
                return (Screen::Report(report), Mode::Querying(query));
            }
            _ => {}
        }
        (Screen::Report(report), Mode::Normal)
    }

    fn handle_form(&mut self, code: KeyCode, mut form: EntityForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_form(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Editing(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Err(err) = self.perform_delete(&confirm) {
                    self.report_error(err);
                }
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_link_picker(&mut self, code: KeyCode, mut picker: LinkPicker) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Link cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::PageUp => picker.move_selection(-PAGE),
            KeyCode::PageDown => picker.move_selection(PAGE),
            KeyCode::Enter => {
                if let Some(entry) = picker.current().cloned() {
                    match self.link_selected(&picker, &entry.key, entry.id) {
                        Ok(()) => return Mode::Normal,
                        Err(err) => self.report_error(err),
                    }
                }
            }
            _ => {}
        }
        Mode::Linking(picker)
    }

    fn handle_query(&mut self, code: KeyCode, mut query: ReportQuery) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Report cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => query.backspace(),
            KeyCode::Enter => match self.run_report(&query) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    query.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if query.push_char(ch) {
                    query.error = None;
                }
            }
            _ => {}
        }
        Mode::Querying(query)
    }

    fn save_form(&mut self, form: &EntityForm) -> Result<()> {
        let (key, year) = form.parse_inputs()?;
        let noun = form.kind.noun();

        let Some(original) = &form.original else {
            let id = match form.kind {
                EntityKind::Artist => self.catalog.create_artist(&key)?,
                EntityKind::Category => self.catalog.create_category(&key)?,
                EntityKind::Album => {
                    let year = year.context("Year is required.")?;
                    self.catalog.create_album(&key, year)?
                }
                EntityKind::Song => self.catalog.create_song(&key)?,
            };

            if form.kind == EntityKind::Song {
                // New songs go straight to their detail view so they can be linked.
                let song = Song { id, title: key.clone() };
                self.screen = Screen::SongDetail(SongDetailScreen::load(&self.catalog, song)?);
                self.set_status(
                    format!("Added song \"{key}\". Press + to link artists, albums and categories."),
                    StatusKind::Info,
                );
            } else {
                self.reload_entities(Some(&key))?;
                self.set_status(format!("Added {noun} \"{key}\"."), StatusKind::Info);
            }
            return Ok(());
        };

        let updated = match form.kind {
            EntityKind::Artist => self.catalog.update_artist(original, &key)?,
            EntityKind::Category => self.catalog.update_category(original, &key)?,
            EntityKind::Album => {
                let year = year.context("Year is required.")?;
                self.catalog.update_album(original, &key, year)?
            }
            EntityKind::Song => self.catalog.update_song(original, &key)?,
        };
        if !updated {
            return Err(StoreError::not_found(noun, original.clone()).into());
        }

        self.reload_entities(Some(&key))?;
        self.set_status(format!("Updated {noun} \"{key}\"."), StatusKind::Info);
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmDelete) -> Result<()> {
        let key = confirm.key.as_str();
        let deleted = match confirm.kind {
            EntityKind::Artist => self.catalog.delete_artist(key)?,
            EntityKind::Category => self.catalog.delete_category(key)?,
            EntityKind::Album => self.catalog.delete_album(key)?,
            EntityKind::Song => self.catalog.delete_song(key)?,
        };
        if !deleted {
            return Err(StoreError::not_found(confirm.kind.noun(), key).into());
        }

        self.reload_entities(None)?;
        self.set_status(
            format!("Deleted {} \"{key}\".", confirm.kind.noun()),
            StatusKind::Info,
        );
        Ok(())
    }

    fn link_selected(&mut self, picker: &LinkPicker, key: &str, other_id: i64) -> Result<()> {
        self.catalog
            .link(picker.relation, picker.song_id, other_id)
            .context("failed to link song")?;
        if let Screen::SongDetail(ref mut detail) = self.screen {
            detail.reload(&self.catalog)?;
        }
        self.set_status(format!("Linked {key}."), StatusKind::Info);
        Ok(())
    }

    fn run_report(&mut self, query: &ReportQuery) -> Result<()> {
        let request = query.parse()?;
        let report = ReportScreen::run(&self.catalog, &request)?;
        self.screen = Screen::Report(report);
        self.clear_status();
        Ok(())
    }

    fn prune_links(&mut self) {
        match self.catalog.prune_dangling_links() {
            Ok(pruned) if pruned.total() == 0 => {
                self.set_status("No dangling links found.", StatusKind::Info)
            }
            Ok(pruned) => self.set_status(
                format!(
                    "Removed {} dangling links ({} artist, {} category, {} album).",
                    pruned.total(),
                    pruned.plays,
                    pruned.is_in,
                    pruned.is_on
                ),
                StatusKind::Info,
            ),
            Err(err) => self.report_error(err),
        }
    }

    fn reload_entities(&mut self, focus_key: Option<&str>) -> Result<()> {
        if let Screen::Entities(ref mut list) = self.screen {
            let entries = load_entries(&self.catalog, list.kind)?;
            list.set_entries(entries, focus_key);
        }
        Ok(())
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn report_error(&mut self, err: impl Into<anyhow::Error>) {
        let err = err.into();
        self.set_status(surface_error(&err), StatusKind::Error);
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Home(home) => self.draw_home(frame, content_area, home),
            Screen::Entities(list) => self.draw_entities(frame, content_area, list),
            Screen::SongDetail(detail) => self.draw_song_detail(frame, content_area, detail),
            Screen::ReportMenu(menu) => self.draw_report_menu(frame, content_area, menu),
            Screen::Report(report) => self.draw_report(frame, content_area, report),
            Screen::Help => self.draw_help(frame, content_area),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Editing(form) => self.draw_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Linking(picker) => self.draw_link_picker(frame, area, picker),
            Mode::Querying(query) => self.draw_query(frame, area, query),
            Mode::Normal => {}
        }
    }

    fn draw_home(&self, frame: &mut Frame, area: Rect, home: &HomeScreen) {
        let items = HOME_ITEMS.iter().map(|item| item.label()).collect();
        self.render_list(
            frame,
            area,
            "Manage Your Music Library".to_string(),
            items,
            home.selected,
            true,
            "",
        );
    }

    fn draw_entities(&self, frame: &mut Frame, area: Rect, list: &EntityScreen) {
        let items = list.entries.iter().map(|entry| entry.display()).collect();
        self.render_list(
            frame,
            area,
            format!("{} ({})", list.kind.plural(), list.entries.len()),
            items,
            list.selected,
            true,
            &format!(
                "No {} in your library. Press + to add one.",
                list.kind.plural().to_lowercase()
            ),
        );
    }

    fn draw_song_detail(&self, frame: &mut Frame, area: Rect, detail: &SongDetailScreen) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::raw("Song: "),
            Span::styled(
                detail.song.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(rows[1]);

        for (pane, column) in DETAIL_PANES.iter().zip(columns.iter()) {
            let kind = EntityKind::linked_by(*pane);
            let entries = detail.pane_entries(*pane);
            let items = entries.iter().map(|entry| entry.display()).collect();
            self.render_list(
                frame,
                *column,
                kind.plural().to_string(),
                items,
                detail.selected,
                *pane == detail.pane,
                "None",
            );
        }
    }

    fn draw_report_menu(&self, frame: &mut Frame, area: Rect, menu: &ReportMenuScreen) {
        let items = REPORT_KINDS
            .iter()
            .map(|kind| kind.title().to_string())
            .collect();
        self.render_list(
            frame,
            area,
            "Generate Reports".to_string(),
            items,
            menu.selected,
            true,
            "",
        );
    }

    fn draw_report(&self, frame: &mut Frame, area: Rect, report: &ReportScreen) {
        let style = if report.lines.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let lines: Vec<Line> = report
            .body()
            .into_iter()
            .map(|line| Line::from(Span::styled(line, style)))
            .collect();

        let block = Block::default()
            .title(format!("{} ({})", report.heading, report.lines.len()))
            .borders(Borders::ALL);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((report.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = INSTRUCTIONS.iter().map(|line| Line::from(*line)).collect();
        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title("Instructions for Use")
                    .borders(Borders::ALL),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    #[allow(clippy::too_many_arguments)]
    fn render_list(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: String,
        items: Vec<String>,
        selected: usize,
        focused: bool,
        empty_message: &str,
    ) {
        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        if items.is_empty() {
            let paragraph = Paragraph::new(Span::styled(
                empty_message.to_string(),
                Style::default().fg(Color::DarkGray),
            ))
            .block(block)
            .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let list = List::new(items.into_iter().map(ListItem::new).collect::<Vec<_>>())
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        if focused {
            state.select(Some(selected));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&'static str, &'static str)] = match (&self.screen, &self.mode) {
            (_, Mode::Editing(_)) => &[("[Enter]", "Save"), ("[Tab]", "Next field"), ("[Esc]", "Cancel")],
            (_, Mode::ConfirmDelete(_)) => &[("[Y]", "Delete"), ("[N/Esc]", "Keep")],
            (_, Mode::Linking(_)) => &[("[↑↓]", "Navigate"), ("[Enter]", "Link"), ("[Esc]", "Cancel")],
            (_, Mode::Querying(_)) => &[("[Enter]", "Run report"), ("[Esc]", "Cancel")],
            (Screen::Home(_), Mode::Normal) => &[("[↑↓]", "Navigate"), ("[Enter]", "Open"), ("[q]", "Quit")],
            (Screen::Entities(list), Mode::Normal) if list.kind == EntityKind::Song => &[
                ("[↑↓]", "Navigate"),
                ("[Enter]", "Links"),
                ("[+]", "Add"),
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[Esc]", "Back"),
            ],
            (Screen::Entities(_), Mode::Normal) => &[
                ("[↑↓]", "Navigate"),
                ("[+]", "Add"),
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[Esc]", "Back"),
            ],
            (Screen::SongDetail(_), Mode::Normal) => &[
                ("[Tab]", "Switch pane"),
                ("[+]", "Link"),
                ("[-]", "Unlink"),
                ("[Esc]", "Back"),
            ],
            (Screen::ReportMenu(_), Mode::Normal) => &[("[↑↓]", "Navigate"), ("[Enter]", "Choose"), ("[Esc]", "Back")],
            (Screen::Report(_), Mode::Normal) => &[("[↑↓]", "Scroll"), ("[Enter]", "New query"), ("[Esc]", "Back")],
            (Screen::Help, Mode::Normal) => &[("[Esc]", "Back"), ("[q]", "Quit")],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (idx, (key, action)) in hints.iter().enumerate() {
            spans.push(Span::styled(*key, key_style));
            let separator = if idx + 1 < hints.len() { "   " } else { "" };
            spans.push(Span::raw(format!(" {action}{separator}")));
        }
        Line::from(spans)
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &EntityForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line(FormField::Key)];
        if form.kind.has_year() {
            lines.push(form.build_line(FormField::Year));
        }
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (dx, dy) = form.cursor_offset();
        frame.set_cursor_position((inner.x + dx, inner.y + dy));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete {} \"{}\"?", confirm.kind.noun(), confirm.key)),
            Line::from("Its links stay until you prune dangling links."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_link_picker(&self, frame: &mut Frame, area: Rect, picker: &LinkPicker) {
        let popup_area = centered_rect(60, 60, area);
        frame.render_widget(Clear, popup_area);

        let kind = EntityKind::linked_by(picker.relation);
        let title = match picker.relation {
            Relation::Plays => "Add Artist to Song",
            Relation::IsIn => "Add Category to Song",
            Relation::IsOn => "Add Song to Album",
        };
        let items = picker.options.iter().map(|entry| entry.display()).collect();
        self.render_list(
            frame,
            popup_area,
            title.to_string(),
            items,
            picker.selected,
            true,
            &format!("No {} available.", kind.plural().to_lowercase()),
        );
    }

    fn draw_query(&self, frame: &mut Frame, area: Rect, query: &ReportQuery) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(query.kind.title())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let prefix = format!("{}: ", query.kind.prompt());
        let mut lines = vec![
            Line::from(vec![Span::raw(prefix.clone()), Span::raw(query.input.clone())]),
            Line::from(""),
        ];
        if let Some(error) = &query.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = inner.x + (prefix.chars().count() + query.input.chars().count()) as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }
}
