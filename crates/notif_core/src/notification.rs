use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::options::Options;
use crate::payload::PayloadBuilder;
use crate::platform::Context;
use crate::store::StoreError;

/// Namespace of the preference store holding persisted options.
pub const PREF_KEY: &str = "LocalNotification";

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("unable to serialize notification options: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Whether a payload was prepared for this notification.
#[derive(Debug, Clone, Default)]
pub enum Presentation {
    #[default]
    NoPayload,
    Payload(PayloadBuilder),
}

/// Wrapper around a single local notification: show, clear, cancel and
/// persistence of its options.
#[derive(Debug, Clone)]
pub struct Notification {
    context: Context,
    options: Options,
    presentation: Presentation,
}

impl Notification {
    pub fn new(context: Context, options: Options) -> Self {
        Self {
            context,
            options,
            presentation: Presentation::NoPayload,
        }
    }

    pub fn with_payload(context: Context, options: Options, builder: PayloadBuilder) -> Self {
        Self {
            context,
            options,
            presentation: Presentation::Payload(builder),
        }
    }

    /// Rebuilds every notification persisted in the context's store.
    /// Entries that no longer parse are skipped.
    pub fn restore_all(context: &Context) -> Result<Vec<Notification>, StoreError> {
        let entries = context.store().entries(PREF_KEY)?;
        let mut restored = Vec::with_capacity(entries.len());
        for (key, raw) in entries {
            match Options::from_json(&raw) {
                Ok(options) => restored.push(Notification::new(context.clone(), options)),
                Err(err) => tracing::warn!(%key, %err, "skipping unreadable persisted notification"),
            }
        }
        restored.sort_by_key(Notification::id);
        Ok(restored)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn id(&self) -> i32 {
        self.options.id()
    }

    pub fn is_repeating(&self) -> bool {
        self.options.trigger().contains_key("every")
    }

    /// Presents the notification. Without a payload this does nothing.
    pub fn show(&self) {
        match &self.presentation {
            Presentation::NoPayload => {
                tracing::debug!(id = self.id(), "no payload prepared, nothing to show");
            }
            Presentation::Payload(builder) => {
                tracing::debug!(id = self.id(), "presenting notification");
                self.context.presenter().notify(self.id(), &builder.build());
            }
        }
    }

    /// Removes the notification from view. Repeating notifications stay.
    pub fn clear(&self) {
        if self.is_repeating() {
            return;
        }
        self.context.presenter().dismiss(self.id());
    }

    /// Cancels pending alarms, removes the notification from view and drops
    /// its persisted state.
    pub fn cancel(&self) -> Result<(), NotificationError> {
        let identifier = self.options.identifier();
        self.context.alarms().cancel(&identifier);
        self.context.presenter().dismiss(self.id());
        self.unpersist()
    }

    pub fn to_json(&self) -> Result<String, NotificationError> {
        encode(self.options.dict())
    }

    pub fn persist(&self) -> Result<(), NotificationError> {
        let encoded = self.to_json()?;
        self.context
            .store()
            .put(PREF_KEY, &self.options.identifier(), &encoded)?;
        tracing::debug!(id = self.id(), "persisted notification");
        Ok(())
    }

    pub fn unpersist(&self) -> Result<(), NotificationError> {
        self.context
            .store()
            .remove(PREF_KEY, &self.options.identifier())?;
        tracing::debug!(id = self.id(), "removed persisted notification");
        Ok(())
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_or_empty(self.options.dict()))
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, NotificationError> {
    Ok(serde_json::to_string(value)?)
}

fn encode_or_empty<T: Serialize + ?Sized>(value: &T) -> String {
    encode(value).unwrap_or_else(|err| {
        tracing::warn!(%err, "falling back to empty notification json");
        "{}".to_string()
    })
}
