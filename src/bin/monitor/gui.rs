use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gesture_arm::detection::WorkingEnvelope;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame, Terminal,
};
use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

/// Size of the camera image the detections are reported in.
const FRAME_WIDTH: f64 = 640.0;
const FRAME_HEIGHT: f64 = 480.0;

type TrailGenerator = Box<dyn FnMut() -> (Vec<(f64, f64)>, String)>;

struct App {
    trail_generator: TrailGenerator,
    envelope: Vec<(f64, f64)>,
    trail: Vec<(f64, f64)>,
    hand: Vec<(f64, f64)>,
    status: String,
}

/// Image rows grow downward, chart rows grow upward.
fn flip((x, y): (f64, f64)) -> (f64, f64) {
    (x, FRAME_HEIGHT - y)
}

impl App {
    fn new(envelope: WorkingEnvelope, trail_generator: TrailGenerator) -> App {
        let (x1, y1) = envelope.top_left;
        let (x2, y2) = envelope.bottom_right;
        let corners = [(x1, y1), (x2, y1), (x2, y2), (x1, y2), (x1, y1)];
        App {
            trail_generator,
            envelope: corners
                .iter()
                .map(|&(x, y)| flip((x as f64, y as f64)))
                .collect(),
            trail: vec![],
            hand: vec![],
            status: String::new(),
        }
    }

    fn on_tick(&mut self) {
        let (trail, status) = (self.trail_generator)();
        self.trail = trail.into_iter().map(flip).collect();
        self.hand = self.trail.last().copied().into_iter().collect();
        self.status = status;
    }
}

pub fn engage_gui(
    envelope: WorkingEnvelope,
    trail_generator: TrailGenerator,
) -> Result<(), Box<dyn Error>> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(50);
    let app = App::new(envelope, trail_generator);
    let res = run_app(&mut terminal, app, tick_rate);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, &app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if let KeyCode::Char('q') = key.code {
                    return Ok(());
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn axis_labels(max: f64) -> Vec<Span<'static>> {
    [0.0, max / 2.0, max]
        .iter()
        .map(|v| Span::from(format!("{:.0}", v)))
        .collect()
}

fn ui(f: &mut Frame, app: &App) {
    let chart = Chart::new(vec![
        Dataset::default()
            .name("Envelope")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Magenta))
            .data(&app.envelope),
        Dataset::default()
            .name("Trail")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Cyan))
            .data(&app.trail),
        Dataset::default()
            .name("Hand")
            .marker(symbols::Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Red))
            .data(&app.hand),
    ])
    .block(
        Block::default()
            .title(format!(" {} (q to quit) ", app.status))
            .borders(Borders::ALL),
    )
    .x_axis(
        Axis::default()
            .title(Span::styled("x (px)", Style::default().fg(Color::Red)))
            .style(Style::default().fg(Color::White))
            .bounds([0.0, FRAME_WIDTH])
            .labels(axis_labels(FRAME_WIDTH)),
    )
    .y_axis(
        Axis::default()
            .title(Span::styled("y (px)", Style::default().fg(Color::Red)))
            .style(Style::default().fg(Color::White))
            .bounds([0.0, FRAME_HEIGHT])
            .labels(axis_labels(FRAME_HEIGHT)),
    );

    f.render_widget(chart, f.size());
}
