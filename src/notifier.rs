use notify_rust::Notification;
use std::io::{self, Write};
use tracing::warn;

/// Break-due signalling collaborator.
///
/// Channels are independent and best-effort: a missing notification daemon
/// or a muted bell silently downgrades the signal to whatever remains. The
/// in-app toast is the UI's channel, keyed off the engine's tick result.
pub trait Notifier {
    /// Capability probe, queried before requesting permission or notifying.
    fn supports_notifications(&self) -> bool;

    /// Idempotent, best-effort. Desktop backends have no runtime prompt,
    /// but the engine still asks on every manual start.
    fn request_permission(&mut self);

    fn notify(&mut self, message: &str);
}

/// OS notification via the freedesktop/macOS/windows backends, plus an
/// audible terminal bell.
#[derive(Debug)]
pub struct DesktopNotifier {
    sound: bool,
    probed: bool,
}

impl DesktopNotifier {
    pub fn new(sound: bool) -> Self {
        Self {
            sound,
            probed: false,
        }
    }

    fn bell(&self) {
        // BEL is interpreted by the terminal, not drawn, so it is safe to
        // emit while the alternate screen is active.
        print!("\x07");
        let _ = io::stdout().flush();
    }
}

impl Notifier for DesktopNotifier {
    fn supports_notifications(&self) -> bool {
        // The notification backend is compiled in on every desktop target;
        // delivery failures surface per-notify and fall back to the bell.
        true
    }

    fn request_permission(&mut self) {
        if self.probed {
            return;
        }
        self.probed = self.supports_notifications();
    }

    fn notify(&mut self, message: &str) {
        if self.supports_notifications() {
            if let Err(err) = Notification::new()
                .summary("pausa")
                .body(message)
                .show()
            {
                warn!(error = %err, "desktop notification failed");
            }
        }

        if self.sound {
            self.bell();
        }
    }
}

/// Test double that records every interaction.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub permission_requests: usize,
    pub messages: Vec<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for RecordingNotifier {
    fn supports_notifications(&self) -> bool {
        true
    }

    fn request_permission(&mut self) {
        self.permission_requests += 1;
    }

    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
