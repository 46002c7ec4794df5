use tracing::{debug, info};

// ============================================================================
// Constants
// ============================================================================

pub const MIN_INTERVAL_MINUTES: i64 = 1;
pub const MAX_INTERVAL_MINUTES: i64 = 120;
pub const PROGRESS_SEGMENTS: usize = 10;

const FILLED_GLYPH: char = '█';
const EMPTY_GLYPH: char = '░';
const OFF_LABEL: &str = "Timer Off";

// ============================================================================
// Data Models
// ============================================================================

/// Whether time accumulates. A paused timer is always an enabled one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Disabled,
    Running,
    Paused,
}

impl Status {
    pub fn is_enabled(self) -> bool {
        self != Self::Disabled
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Disabled => "disabled",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLines {
    pub timer_line: String,
    pub cycles_line: String,
}

/// Emitted once per completed interval, to be forwarded to a notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderFired {
    pub elapsed_label: String,
    pub cycle: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub display: DisplayLines,
    pub fired: Option<ReminderFired>,
}

// ============================================================================
// State Machine
// ============================================================================

#[derive(Debug, Clone)]
pub struct Reminder {
    status: Status,
    elapsed_secs: u64,
    cycles: u64,
    interval_secs: u64,
    tick_secs: u64,
    menu_open: bool,
}

impl Reminder {
    pub fn new(interval_secs: u64, tick_secs: u64) -> Self {
        Self {
            status: Status::Disabled,
            elapsed_secs: 0,
            cycles: 0,
            interval_secs: interval_secs.max(1),
            tick_secs: tick_secs.max(1),
            menu_open: false,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[cfg(test)]
    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub fn interval_minutes(&self) -> u64 {
        self.interval_secs / 60
    }

    pub fn tick_secs(&self) -> u64 {
        self.tick_secs
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    /// Coarse clock entry point. Returns `None` when nothing accumulates.
    ///
    /// Accumulate, then check, then reset: the stored counter is back at zero
    /// before anyone can observe it past the interval.
    pub fn on_tick(&mut self) -> Option<Tick> {
        if self.status != Status::Running {
            return None;
        }

        self.elapsed_secs += self.tick_secs;

        let fired = if self.elapsed_secs >= self.interval_secs {
            let elapsed_label = self.format_elapsed();
            self.cycles += 1;
            self.elapsed_secs = 0;
            info!(cycle = self.cycles, elapsed = %elapsed_label, "Reminder interval elapsed");
            Some(ReminderFired { elapsed_label, cycle: self.cycles })
        } else {
            None
        };

        Some(Tick { display: self.render_display(), fired })
    }

    /// Live clock entry point. Observable only while the menu is open.
    pub fn on_live_update(&self) -> Option<DisplayLines> {
        self.menu_open.then(|| self.render_display())
    }

    pub fn on_menu_open(&mut self) -> DisplayLines {
        self.menu_open = true;
        self.render_display()
    }

    pub fn on_menu_close(&mut self) {
        self.menu_open = false;
    }

    pub fn toggle_timer(&mut self) -> DisplayLines {
        self.status = match self.status {
            Status::Disabled => {
                self.elapsed_secs = 0;
                Status::Running
            }
            Status::Running | Status::Paused => Status::Disabled,
        };
        info!(status = self.status.name(), "Timer toggled");
        self.render_display()
    }

    /// Flips between running and paused. A disabled timer has nothing to pause.
    pub fn pause_timer(&mut self) -> DisplayLines {
        self.status = match self.status {
            Status::Running => Status::Paused,
            Status::Paused => Status::Running,
            Status::Disabled => {
                debug!("Pause requested while disabled, ignoring");
                Status::Disabled
            }
        };
        info!(status = self.status.name(), "Pause toggled");
        self.render_display()
    }

    pub fn reset_timer(&mut self) -> DisplayLines {
        self.elapsed_secs = 0;
        self.cycles = 0;
        if self.status == Status::Paused {
            self.status = Status::Running;
        }
        info!(status = self.status.name(), "Timer reset");
        self.render_display()
    }

    /// Returns the new display when accepted. Out-of-range values are
    /// rejected without touching any state.
    pub fn set_interval(&mut self, minutes: i64) -> Option<DisplayLines> {
        if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&minutes) {
            debug!(minutes, "Rejected interval outside {}-{} minutes", MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES);
            return None;
        }

        self.interval_secs = minutes as u64 * 60;
        self.elapsed_secs = 0;
        info!(minutes, "Reminder interval changed");
        Some(self.render_display())
    }

    pub fn set_interval_from_input(&mut self, input: &str) -> Option<DisplayLines> {
        match input.trim().parse::<i64>() {
            Ok(minutes) => self.set_interval(minutes),
            Err(_) => {
                debug!(input, "Rejected non-numeric interval");
                None
            }
        }
    }

    // ------------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------------

    pub fn format_elapsed(&self) -> String {
        let secs = self.elapsed_secs.min(self.interval_secs);
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    pub fn format_progress_bar(&self, segments: usize) -> String {
        let progress = (self.elapsed_secs as f64 / self.interval_secs as f64).clamp(0.0, 1.0);
        let filled = ((progress * segments as f64).floor() as usize).min(segments);

        let mut bar = String::with_capacity(segments * 3 + 2);
        bar.push('[');
        bar.extend(std::iter::repeat(FILLED_GLYPH).take(filled));
        bar.extend(std::iter::repeat(EMPTY_GLYPH).take(segments - filled));
        bar.push(']');
        bar
    }

    pub fn render_display(&self) -> DisplayLines {
        let timer_line = match self.status {
            Status::Disabled => OFF_LABEL.to_string(),
            Status::Paused => format!(
                "⏸ {} {} (paused)",
                self.format_progress_bar(PROGRESS_SEGMENTS),
                self.format_elapsed()
            ),
            Status::Running => format!(
                "⏱ {} {}",
                self.format_progress_bar(PROGRESS_SEGMENTS),
                self.format_elapsed()
            ),
        };

        DisplayLines {
            timer_line,
            cycles_line: format!("Cycles completed: {}", self.cycles),
        }
    }

    // ------------------------------------------------------------------------
    // Menu labels
    // ------------------------------------------------------------------------

    pub fn toggle_label(&self) -> &str {
        if self.status.is_enabled() { "Disable Timer" } else { "Enable Timer" }
    }

    pub fn pause_label(&self) -> &str {
        if self.status == Status::Paused { "Resume Timer" } else { "Pause Timer" }
    }

    pub fn pause_visible(&self) -> bool {
        self.status.is_enabled()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn running(interval_secs: u64, tick_secs: u64) -> Reminder {
        let mut r = Reminder::new(interval_secs, tick_secs);
        r.toggle_timer();
        r
    }

    fn tick_n(r: &mut Reminder, n: usize) -> Vec<ReminderFired> {
        (0..n).filter_map(|_| r.on_tick()).filter_map(|t| t.fired).collect()
    }

    fn bar(filled: usize, empty: usize) -> String {
        format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
    }

    #[test]
    fn starts_disabled_and_off() {
        let r = Reminder::new(20 * 60, 5);
        assert_eq!(r.status(), Status::Disabled);
        assert_eq!(r.elapsed_secs(), 0);
        assert_eq!(r.cycles(), 0);
        assert!(!r.is_menu_open());
        assert_eq!(r.render_display(), DisplayLines {
            timer_line: "Timer Off".into(),
            cycles_line: "Cycles completed: 0".into(),
        });
    }

    #[test]
    fn disabled_ignores_ticks() {
        let mut r = Reminder::new(60, 5);
        let before = r.render_display();
        for _ in 0..100 {
            assert!(r.on_tick().is_none());
        }
        assert_eq!(r.elapsed_secs(), 0);
        assert_eq!(r.cycles(), 0);
        assert_eq!(r.render_display(), before);
        assert_eq!(before.timer_line, "Timer Off");
    }

    #[test]
    fn paused_ignores_ticks() {
        let mut r = running(60, 5);
        tick_n(&mut r, 3);
        r.pause_timer();
        assert!(r.on_tick().is_none());
        assert_eq!(r.elapsed_secs(), 15);
    }

    #[test]
    fn fires_once_on_the_twelfth_tick() {
        let mut r = running(60, 5);

        assert!(tick_n(&mut r, 11).is_empty());
        assert_eq!(r.elapsed_secs(), 55);

        let tick = r.on_tick().unwrap();
        let fired = tick.fired.unwrap();
        assert_eq!(fired.elapsed_label, "01:00");
        assert_eq!(fired.cycle, 1);
        assert_eq!(r.cycles(), 1);
        assert_eq!(r.elapsed_secs(), 0);
        assert_eq!(tick.display.cycles_line, "Cycles completed: 1");
        assert_eq!(tick.display.timer_line, format!("⏱ {} 00:00", bar(0, 10)));
    }

    #[test]
    fn elapsed_wraps_and_cycles_count_boundaries() {
        let mut r = running(60, 5);
        let mut prior = 0;
        let mut cycles = 0;
        for _ in 0..100 {
            let tick = r.on_tick().unwrap();
            if prior + 5 >= 60 {
                cycles += 1;
                assert!(tick.fired.is_some());
            } else {
                assert!(tick.fired.is_none());
            }
            prior = (prior + 5) % 60;
            assert_eq!(r.elapsed_secs(), prior);
            assert_eq!(r.cycles(), cycles);
        }
    }

    #[test]
    fn uneven_tick_fires_with_clamped_label() {
        let mut r = running(60, 7);
        let fired = tick_n(&mut r, 9);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].elapsed_label, "01:00");
        assert_eq!(r.elapsed_secs(), 0);
    }

    #[test]
    fn formats_partial_progress() {
        let mut r = running(60, 5);
        tick_n(&mut r, 9);
        assert_eq!(r.elapsed_secs(), 45);
        assert_eq!(r.format_elapsed(), "00:45");
        assert_eq!(r.format_progress_bar(10), bar(7, 3));
        assert_eq!(r.render_display().timer_line, format!("⏱ {} 00:45", bar(7, 3)));
    }

    #[test]
    fn formats_long_intervals() {
        let mut r = running(120 * 60, 60);
        tick_n(&mut r, 119);
        assert_eq!(r.format_elapsed(), "119:00");
        assert_eq!(r.format_progress_bar(4), bar(3, 1));
    }

    #[test]
    fn pause_twice_is_identity() {
        let mut r = running(60, 5);
        tick_n(&mut r, 4);
        let before = r.render_display();

        let paused = r.pause_timer();
        assert_eq!(r.status(), Status::Paused);
        assert_eq!(paused.timer_line, format!("⏸ {} 00:20 (paused)", bar(3, 7)));

        let resumed = r.pause_timer();
        assert_eq!(r.status(), Status::Running);
        assert_eq!(resumed, before);
        assert_eq!(r.elapsed_secs(), 20);
    }

    #[test]
    fn pause_while_disabled_stays_disabled() {
        let mut r = Reminder::new(60, 5);
        r.pause_timer();
        assert_eq!(r.status(), Status::Disabled);
        assert!(!r.pause_visible());
    }

    #[test]
    fn toggle_on_starts_fresh_window() {
        let mut r = running(60, 5);
        tick_n(&mut r, 14);
        r.pause_timer();

        r.toggle_timer();
        assert_eq!(r.status(), Status::Disabled);
        assert_eq!(r.elapsed_secs(), 10);
        assert_eq!(r.cycles(), 1);
        assert_eq!(r.render_display().timer_line, "Timer Off");

        r.toggle_timer();
        assert_eq!(r.status(), Status::Running);
        assert_eq!(r.elapsed_secs(), 0);
        assert_eq!(r.cycles(), 1);
    }

    #[test]
    fn reset_clears_counters_but_not_enabled() {
        let mut r = running(60, 5);
        tick_n(&mut r, 30);
        r.pause_timer();

        let display = r.reset_timer();
        assert_eq!(r.status(), Status::Running);
        assert_eq!(r.elapsed_secs(), 0);
        assert_eq!(r.cycles(), 0);
        assert_eq!(display.cycles_line, "Cycles completed: 0");

        let mut off = Reminder::new(60, 5);
        off.reset_timer();
        assert_eq!(off.status(), Status::Disabled);

        r.toggle_timer();
        r.reset_timer();
        assert_eq!(r.status(), Status::Disabled);
    }

    #[test]
    fn set_interval_rejects_out_of_range() {
        let mut r = running(60, 5);
        tick_n(&mut r, 3);
        for minutes in [0, 121, -5] {
            assert!(r.set_interval(minutes).is_none());
            assert_eq!(r.interval_secs(), 60);
            assert_eq!(r.elapsed_secs(), 15);
        }
    }

    #[test]
    fn set_interval_accepts_and_resets_elapsed() {
        let mut r = running(60, 5);
        tick_n(&mut r, 3);
        let display = r.set_interval(45).unwrap();
        assert_eq!(display.timer_line, format!("⏱ {} 00:00", bar(0, 10)));
        assert_eq!(r.interval_secs(), 2700);
        assert_eq!(r.interval_minutes(), 45);
        assert_eq!(r.elapsed_secs(), 0);
        assert!(r.set_interval(1).is_some());
        assert!(r.set_interval(120).is_some());
    }

    #[test]
    fn set_interval_from_input_parses_text() {
        let mut r = Reminder::new(60, 5);
        assert!(r.set_interval_from_input("abc").is_none());
        assert!(r.set_interval_from_input("").is_none());
        assert!(r.set_interval_from_input("2.5").is_none());
        assert_eq!(r.interval_secs(), 60);
        assert!(r.set_interval_from_input(" 30 ").is_some());
        assert_eq!(r.interval_secs(), 1800);
    }

    #[test]
    fn live_updates_only_while_menu_open() {
        let mut r = running(60, 5);
        assert!(r.on_live_update().is_none());

        let opened = r.on_menu_open();
        assert_eq!(r.on_live_update(), Some(opened));
        assert_eq!(r.elapsed_secs(), 0);

        r.on_menu_close();
        assert!(r.on_live_update().is_none());
    }

    #[test]
    fn menu_state_does_not_affect_accumulation() {
        let mut open = running(60, 5);
        let mut closed = running(60, 5);
        open.on_menu_open();
        tick_n(&mut open, 7);
        tick_n(&mut closed, 7);
        assert_eq!(open.elapsed_secs(), closed.elapsed_secs());
    }

    #[test]
    fn labels_follow_status() {
        let mut r = Reminder::new(60, 5);
        assert_eq!(r.toggle_label(), "Enable Timer");
        r.toggle_timer();
        assert_eq!(r.toggle_label(), "Disable Timer");
        assert_eq!(r.pause_label(), "Pause Timer");
        r.pause_timer();
        assert_eq!(r.pause_label(), "Resume Timer");
        assert!(r.pause_visible());
    }
}
