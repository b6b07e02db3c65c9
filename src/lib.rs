//! # multicore-mvc: Multiton MVC cores with observer dispatch
//!
//! An application is split into independent *cores*. Each core is identified
//! by an opaque multiton key and owns exactly one of each actor:
//!
//! - [`View`]: mediators and notification fan-out ([`crate::core::view`])
//! - [`Model`]: proxies holding application data ([`crate::core::model`])
//! - [`Controller`]: commands bound to notification names ([`crate::core::controller`])
//! - [`Facade`]: the composition root that forwards to the three ([`facade`])
//!
//! ## Technical Foundations
//!
//! ### 1. Keyed registries
//! Every actor kind lives in a process-wide [`KeyedRegistry`]. An instance is
//! created at most once per key; a second explicit construction fails with
//! [`CoreError::AlreadyConstructed`]. [`Facade::remove_core`] tears a core down.
//!
//! ### 2. Synchronous observer dispatch
//! [`Notification`]s are delivered on the calling thread, in subscription
//! order. The [`ObserverDispatcher`] snapshots the observer
//! list before invoking anything, so observers may subscribe or unsubscribe
//! (themselves included) while being notified.
//!
//! ### 3. Errors and configuration
//! User callbacks return [`CoreResult`]; errors propagate to whoever sent the
//! notification. [`CoreConfig`] selects the behavior on observer failure and
//! the slow-dispatch warning threshold.
//!
//! ```text
//! Facade::send_notification → View → ObserverDispatcher ─┬→ Mediator::handle_notification
//!                                                        └→ Controller::execute_command → Command::execute
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod facade;
pub mod keyed_registry;
pub mod observer;

// Re-exports
pub use config::{CoreConfig, ObserverFailurePolicy};
pub use crate::core::{
    controller::{Command, CommandFactory, Controller, MacroCommand},
    dispatcher::ObserverDispatcher,
    model::{DataProxy, Model, Proxy},
    view::{Mediator, SimpleMediator, View},
};
pub use error::*;
pub use facade::Facade;
pub use keyed_registry::{registries, CoreRegistries, KeyedRegistry};
pub use observer::{
    notification::{Notification, OpaqueValue, Value},
    notifier::Notifier,
    observer::{NotifyContext, NotifyFn, Observer},
};
