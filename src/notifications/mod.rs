//! Turning call and voicemail events into user notifications.

pub mod config;
pub mod desktop;
pub mod dispatch;
pub mod format;
pub mod lookup;
pub mod multi;
pub mod webhook;

pub use config::{ChannelConfig, NotifyConfig};
pub use desktop::DesktopNotifier;
pub use dispatch::{call_dispatcher, voicemail_dispatcher};
pub use format::{call_body, call_notification, voicemail_notification, CALL_TITLE, VOICEMAIL_TITLE};
pub use lookup::{NoLookup, StaticDirectory};
pub use multi::MultiNotifier;
pub use webhook::WebhookNotifier;
