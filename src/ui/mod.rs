//! Ratatui front-end for the music catalog: a home menu, one list per entity
//! kind, a per-song view of its links, and the three reports.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
