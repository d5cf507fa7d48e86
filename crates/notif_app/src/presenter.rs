use notif_core::{AlarmScheduler, Payload, Presenter};

/// Presenter for hosts without a notification service: payloads are logged
/// and, unless quiet, echoed to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter {
    quiet: bool,
}

impl LogPresenter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Presenter for LogPresenter {
    fn notify(&self, id: i32, payload: &Payload) {
        tracing::debug!(id, title = %payload.title, channel = %payload.channel, "notification shown");
        if !self.quiet {
            println!("[{id}] {}: {}", payload.title, payload.text);
        }
    }

    fn dismiss(&self, id: i32) {
        tracing::debug!(id, "notification dismissed");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlarms;

impl AlarmScheduler for LogAlarms {
    fn cancel(&self, identifier: &str) {
        tracing::debug!(%identifier, "alarm cancelled");
    }
}
