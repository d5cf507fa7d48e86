use std::collections::BTreeMap;

pub const DEFAULT_CHANNEL: &str = "default-channel-id";

/// Display payload handed to a [`Presenter`](crate::platform::Presenter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub title: String,
    pub text: String,
    pub channel: String,
    pub sound: Option<String>,
    pub badge: Option<u32>,
    pub ongoing: bool,
    pub extras: BTreeMap<String, String>,
}

/// Fluent builder for a [`Payload`], prepared ahead of `show`.
#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
    title: String,
    text: String,
    channel: Option<String>,
    sound: Option<String>,
    badge: Option<u32>,
    ongoing: bool,
    extras: BTreeMap<String, String>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    pub fn badge(mut self, badge: u32) -> Self {
        self.badge = Some(badge);
        self
    }

    pub fn ongoing(mut self, ongoing: bool) -> Self {
        self.ongoing = ongoing;
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn build(&self) -> Payload {
        Payload {
            title: self.title.clone(),
            text: self.text.clone(),
            channel: self
                .channel
                .clone()
                .unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            sound: self.sound.clone(),
            badge: self.badge,
            ongoing: self.ongoing,
            extras: self.extras.clone(),
        }
    }
}
