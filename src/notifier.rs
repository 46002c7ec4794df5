use notify_rust::{Notification, Urgency};
use std::{path::Path, process::{Command, Stdio}};
use tracing::{debug, info, warn};

use crate::reminder::ReminderFired;

pub const APP_NAME: &str = "posture-check";
const TITLE: &str = "Check your posture";

const SOUNDS: [(&str, &str); 3] = [
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// Outbound port for reminder delivery. Best effort: implementations swallow
/// their own failures.
pub trait Notifier {
    fn notify(&mut self, event: &ReminderFired);
}

pub fn reminder_body(event: &ReminderFired) -> String {
    format!("{} elapsed", event.elapsed_label)
}

// ============================================================================
// Desktop
// ============================================================================

pub struct DesktopNotifier {
    sound: bool,
}

impl DesktopNotifier {
    pub fn new(sound: bool) -> Self {
        Self { sound }
    }

    /// Logs whether a notification server is reachable. Never fatal.
    pub fn probe(&self) {
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            match notify_rust::get_capabilities() {
                Ok(caps) => info!(?caps, "Notification server available"),
                Err(e) => warn!("Notification server unavailable: {}", e),
            }
        }
    }

    fn play_sound() {
        for (cmd, file) in SOUNDS {
            if Path::new(file).exists() {
                if let Err(e) = Command::new(cmd)
                    .arg(file)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                {
                    debug!("Failed to spawn {}: {}", cmd, e);
                }
                break;
            }
        }
    }
}

fn reminder_notification(event: &ReminderFired) -> Notification {
    let mut notification = Notification::new();
    notification
        .summary(TITLE)
        .body(&reminder_body(event))
        .appname(APP_NAME)
        .icon("alarm-clock")
        .urgency(Urgency::Critical);
    notification
}

impl Notifier for DesktopNotifier {
    /// Delivery runs on a detached thread; the server's reply is never awaited
    /// by the caller.
    fn notify(&mut self, event: &ReminderFired) {
        let notification = reminder_notification(event);
        let cycle = event.cycle;
        let sound = self.sound;

        std::thread::spawn(move || {
            match notification.show() {
                Ok(_) => debug!(cycle, "Reminder notification shown"),
                Err(e) => warn!("Failed to show reminder notification: {}", e),
            }
            if sound {
                Self::play_sound();
            }
        });
    }
}

// ============================================================================
// Test double
// ============================================================================

#[cfg(test)]
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: std::rc::Rc<std::cell::RefCell<Vec<ReminderFired>>>,
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&mut self, event: &ReminderFired) {
        self.events.borrow_mut().push(event.clone());
    }
}
