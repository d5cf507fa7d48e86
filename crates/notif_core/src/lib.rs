pub mod notification;
pub mod options;
pub mod payload;
pub mod platform;
pub mod store;

pub use crate::notification::{Notification, NotificationError, Presentation, PREF_KEY};
pub use crate::options::{Options, OptionsError};
pub use crate::payload::{Payload, PayloadBuilder};
pub use crate::platform::{AlarmScheduler, Context, ContextBuilder, PreferenceStore, Presenter};
pub use crate::store::{JsonFileStore, MemoryStore, StoreError};
