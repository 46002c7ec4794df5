use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{prelude::*, widgets::*};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::{
    clock::Ticker,
    notifier::Notifier,
    reminder::{DisplayLines, Reminder},
};

// ============================================================================
// Constants
// ============================================================================

const POLL_RATE: Duration = Duration::from_millis(50);
const LIVE_UPDATE_PERIOD: Duration = Duration::from_secs(1);
const STATUS_TITLE: &str = " posture ";
const MENU_WIDTH: u16 = 44;
const ACCENT: Color = Color::Rgb(255, 100, 0);
const BORDER: Color = Color::Rgb(0, 200, 255);

// ============================================================================
// Menu
// ============================================================================

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MenuItem {
    Toggle,
    Pause,
    Reset,
    SetInterval,
    Quit,
}

impl MenuItem {
    fn label<'a>(&self, reminder: &'a Reminder) -> &'a str {
        match self {
            Self::Toggle => reminder.toggle_label(),
            Self::Pause => reminder.pause_label(),
            Self::Reset => "Reset Timer",
            Self::SetInterval => "Set Interval...",
            Self::Quit => "Quit",
        }
    }

    fn shortcut(&self) -> char {
        match self {
            Self::Toggle => 'e',
            Self::Pause => 'p',
            Self::Reset => 'r',
            Self::SetInterval => 'i',
            Self::Quit => 'q',
        }
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Terminal adapter around the single [`Reminder`]. Everything on screen comes
/// from the last display the reminder emitted.
pub struct App {
    reminder: Reminder,
    notifier: Box<dyn Notifier>,
    coarse: Ticker,
    live: Option<Ticker>,
    display: DisplayLines,
    fixed_interval: bool,
    selected: usize,
    dialog: Option<String>,
    last_reminder: Option<DateTime<Local>>,
}

impl App {
    pub fn new(reminder: Reminder, notifier: Box<dyn Notifier>, fixed_interval: bool, now: Instant) -> Self {
        let coarse = Ticker::new(Duration::from_secs(reminder.tick_secs()), now);
        let display = reminder.render_display();
        debug!("Coarse ticks every {:?}", coarse.period());

        Self {
            reminder,
            notifier,
            coarse,
            live: None,
            display,
            fixed_interval,
            selected: 0,
            dialog: None,
            last_reminder: None,
        }
    }

    pub fn reminder(&self) -> &Reminder {
        &self.reminder
    }

    pub fn display(&self) -> &DisplayLines {
        &self.display
    }

    pub fn is_menu_open(&self) -> bool {
        self.live.is_some()
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn menu_items(&self) -> Vec<MenuItem> {
        let mut items = vec![MenuItem::Toggle];
        if self.reminder.pause_visible() {
            items.push(MenuItem::Pause);
        }
        items.push(MenuItem::Reset);
        if !self.fixed_interval {
            items.push(MenuItem::SetInterval);
        }
        items.push(MenuItem::Quit);
        items
    }

    fn selected_item(&self) -> MenuItem {
        let items = self.menu_items();
        items[self.selected.min(items.len() - 1)]
    }

    // ------------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------------

    pub fn on_clock(&mut self, now: Instant) {
        if self.coarse.poll(now) {
            if let Some(tick) = self.reminder.on_tick() {
                self.display = tick.display;
                if let Some(fired) = tick.fired {
                    self.notifier.notify(&fired);
                    self.last_reminder = Some(Local::now());
                }
            }
        }

        if let Some(live) = self.live.as_mut() {
            if live.poll(now) {
                if let Some(display) = self.reminder.on_live_update() {
                    self.display = display;
                }
            }
        }
    }

    pub fn poll_timeout(&self, now: Instant) -> Duration {
        let mut timeout = POLL_RATE.min(self.coarse.until_due(now));
        if let Some(live) = &self.live {
            timeout = timeout.min(live.until_due(now));
        }
        timeout
    }

    // ------------------------------------------------------------------------
    // Menu lifecycle
    // ------------------------------------------------------------------------

    pub fn open_menu(&mut self, now: Instant) {
        if self.is_menu_open() {
            return;
        }
        self.display = self.reminder.on_menu_open();
        self.live = Some(Ticker::new(LIVE_UPDATE_PERIOD, now));
        self.selected = 0;
        debug!("Menu opened, live updates started");
    }

    /// Drops the live ticker, so no pending live tick outlives the menu.
    pub fn close_menu(&mut self) {
        if self.live.take().is_some() || self.reminder.is_menu_open() {
            self.reminder.on_menu_close();
            debug!("Menu closed, live updates stopped");
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Returns true when the app should quit.
    pub fn activate(&mut self, item: MenuItem) -> bool {
        match item {
            MenuItem::Toggle => self.display = self.reminder.toggle_timer(),
            MenuItem::Pause => self.display = self.reminder.pause_timer(),
            MenuItem::Reset => self.display = self.reminder.reset_timer(),
            MenuItem::SetInterval => self.open_dialog(),
            MenuItem::Quit => {
                info!(
                    status = self.reminder.status().name(),
                    elapsed = self.reminder.elapsed_secs(),
                    "Quit requested"
                );
                return true;
            }
        }
        false
    }

    fn open_dialog(&mut self) {
        if self.fixed_interval {
            return;
        }
        self.close_menu();
        self.dialog = Some(self.reminder.interval_minutes().to_string());
    }

    fn submit_dialog(&mut self) {
        let Some(input) = self.dialog.take() else {
            return;
        };
        if let Some(display) = self.reminder.set_interval_from_input(&input) {
            self.display = display;
        }
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        if self.is_dialog_open() {
            self.handle_dialog(key);
            return false;
        }

        if self.is_menu_open() {
            match key.code {
                KeyCode::Esc | KeyCode::Char('m') => {
                    self.close_menu();
                    return false;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    let len = self.menu_items().len();
                    self.selected = (self.selected.min(len - 1) + len - 1) % len;
                    return false;
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let len = self.menu_items().len();
                    self.selected = (self.selected.min(len - 1) + 1) % len;
                    return false;
                }
                KeyCode::Enter => {
                    let item = self.selected_item();
                    self.close_menu();
                    return self.activate(item);
                }
                _ => {}
            }
        } else if matches!(key.code, KeyCode::Enter | KeyCode::Char('m')) {
            self.open_menu(now);
            return false;
        }

        let KeyCode::Char(c) = key.code else {
            return false;
        };
        match self.menu_items().into_iter().find(|item| item.shortcut() == c) {
            Some(item) => {
                self.close_menu();
                self.activate(item)
            }
            None => false,
        }
    }

    fn handle_dialog(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_dialog(),
            KeyCode::Esc => self.dialog = None,
            KeyCode::Backspace => {
                if let Some(input) = self.dialog.as_mut() {
                    input.pop();
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                if let Some(input) = self.dialog.as_mut().filter(|i| i.len() < 6) {
                    input.push(c);
                }
            }
            _ => {}
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1), Constraint::Length(1)])
        .split(f.size());

    render_status_bar(f, app, chunks[0]);
    render_body(f, app, chunks[1]);
    render_footer(f, app, chunks[2]);

    if app.is_menu_open() {
        render_menu(f, app);
    }
    if let Some(input) = &app.dialog {
        render_dialog(f, app, input);
    }
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(STATUS_TITLE, Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(app.display().timer_line.as_str(), Style::default().fg(Color::White)),
    ]);
    f.render_widget(Paragraph::new(line).style(Style::default().bg(Color::DarkGray)), area);
}

fn render_body(f: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Reminding every {} min", app.reminder.interval_minutes()),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to open the menu",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for item in app.menu_items() {
        if !spans.is_empty() {
            spans.push(Span::raw("  •  "));
        }
        spans.push(Span::styled(
            item.shortcut().to_string(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {}", item.label(&app.reminder))));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_menu(f: &mut Frame, app: &App) {
    let items = app.menu_items();
    let selected = app.selected.min(items.len() - 1);
    let separator = "─".repeat(MENU_WIDTH.saturating_sub(2) as usize);

    let mut lines = vec![
        Line::from(app.display().timer_line.as_str()),
        Line::from(app.display().cycles_line.as_str()),
        Line::from(Span::styled(separator.clone(), Style::default().fg(Color::DarkGray))),
    ];
    for (i, item) in items.iter().enumerate() {
        if *item == MenuItem::Quit {
            lines.push(Line::from(Span::styled(separator.clone(), Style::default().fg(Color::DarkGray))));
        }
        let label = format!(" {}", item.label(&app.reminder));
        lines.push(if i == selected {
            Line::from(Span::styled(label, Style::default().fg(Color::Black).bg(ACCENT)))
        } else {
            Line::from(label)
        });
    }
    if let Some(at) = app.last_reminder {
        lines.push(Line::from(Span::styled(
            format!("Last reminder: {}", at.format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let full = f.size();
    let width = MENU_WIDTH.min(full.width);
    let height = (lines.len() as u16 + 2).min(full.height.saturating_sub(1));
    let area = Rect::new(full.width.saturating_sub(width), 1.min(full.height), width, height);

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER)),
        ),
        area,
    );
}

fn render_dialog(f: &mut Frame, app: &App, input: &str) {
    let area = centered_rect(50, 50, f.size());
    let lines = vec![
        Line::from(Span::styled("Set Reminder Interval", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("Enter interval in minutes (1-120):"),
        Line::from(""),
        Line::from(Span::styled(format!("> {}_", input), Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            format!("Enter OK  •  Esc Cancel  (current: {} min)", app.reminder.interval_minutes()),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER)),
        ),
        area,
    );
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}

// ============================================================================
// Tests
// ============================================================================
