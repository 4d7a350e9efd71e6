//! Terminal front-end: a serial port picker and a live session monitor.

mod error;
mod port_selector;
mod status_monitor;

pub use error::ArmGuiError;
pub use port_selector::port_selector;
pub use status_monitor::status_monitor;

use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};

type Term = Terminal<CrosstermBackend<Stdout>>;

fn enter() -> Result<Term, ArmGuiError> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    Ok(terminal)
}

fn leave() -> Result<(), ArmGuiError> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
