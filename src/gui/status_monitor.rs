use std::{sync::mpsc::Receiver, time::Duration};

use crate::gui::{enter, error::ArmGuiError, leave, Term};
use crate::session::Session;
use crate::worker::{WorkerEvent, WorkerMessage};

use crossterm::event::{self, KeyEventKind};
use ratatui::{
    prelude::*,
    widgets::{
        block::{Position, Title},
        *,
    },
};

/// Shows the status of the running session until the user presses a key
/// or the worker stops by itself. The session is stopped either way.
pub fn status_monitor(
    session: &mut Session,
    events: &Receiver<WorkerMessage>,
) -> Result<(), ArmGuiError> {
    let mut terminal = enter()?;
    let result = monitor(&mut terminal, session, events);
    session.stop();
    leave()?;
    result
}

fn monitor(
    terminal: &mut Term,
    session: &mut Session,
    events: &Receiver<WorkerMessage>,
) -> Result<(), ArmGuiError> {
    let method = session.config().control_method;
    let port = session.port();
    let mut status = String::from("Waiting for the first input...");
    let mut fault = None;

    loop {
        let mut stopped = false;
        for message in events.try_iter() {
            if !session.handle_event(&message) {
                stopped = true;
            }
            match message.event {
                WorkerEvent::Status(report) => status = report.to_string(),
                WorkerEvent::Fault(f) => fault = Some(f.to_string()),
                WorkerEvent::Stopped => {}
            }
        }
        if stopped {
            return Ok(());
        }

        let title = Title::from(format!(" {} on {} ", method, port.display()).magenta().bold());
        let instructions = Title::from(Line::from(vec![
            " Stop ".into(),
            "<Any key> ".magenta().bold(),
        ]));
        let block = Block::default()
            .title(title.alignment(Alignment::Center))
            .title(
                instructions
                    .alignment(Alignment::Center)
                    .position(Position::Bottom),
            )
            .borders(Borders::ALL);
        let mut lines: Vec<Line> = status.split(" | ").map(|l| Line::from(l.to_owned())).collect();
        if let Some(fault) = &fault {
            lines.push(Line::from(""));
            lines.push(Line::from(format!("Fault: {}", fault).red().bold()));
        }
        let text = Paragraph::new(lines).block(block);
        terminal.draw(|frame| {
            let area = frame.size();
            frame.render_widget(text, area);
        })?;

        if event::poll(Duration::from_millis(16))? {
            if let event::Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(());
                }
            }
        }
    }
}
