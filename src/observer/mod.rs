//! # Notifications and Observers
//!
//! The publish/subscribe vocabulary shared by every actor in a core.
//!
//! - [`notification::Notification`]: a named message with an optional body and type
//! - [`observer::Observer`]: a callback paired with the identity used to remove it
//! - [`notifier::Notifier`]: the multiton-key holder that lets mediators,
//!   proxies and commands send notifications through their core's facade
//!
//! ```text
//! ┌──────────┐  send_notification  ┌────────┐  notify_observers  ┌──────────┐
//! │ Notifier │────────────────────▶│ Facade │───────────────────▶│   View   │
//! └──────────┘                     └────────┘                    └────┬─────┘
//!                                                                     │ snapshot
//!                                                          ┌──────────▼──────────┐
//!                                                          │ Observer, Observer… │
//!                                                          └─────────────────────┘
//! ```

pub mod notification;
pub mod notifier;
#[allow(clippy::module_inception)]
pub mod observer;
