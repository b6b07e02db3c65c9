use std::sync::Arc;

use parking_lot::RwLock;

use crate::{facade::Facade, CoreError, CoreResult, Notification, Value};

/// # Notifier
///
/// Mediators, proxies and commands all embed a `Notifier` so they can reach
/// their core's [`Facade`] and send notifications.
///
/// A notifier has no multiton key until the owning actor is registered:
///
/// * a mediator receives it when registered with a `View`
/// * a proxy receives it when registered with a `Model`
/// * a command receives it right before the `Controller` executes it
///
/// Until then [`Notifier::facade`] and [`Notifier::send_notification`] fail
/// with [`CoreError::NotifierUninitialized`].
#[derive(Debug, Default)]
pub struct Notifier {
    multiton_key: RwLock<Option<String>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&self, key: &str) {
        *self.multiton_key.write() = Some(key.to_string());
    }

    pub fn is_initialized(&self) -> bool {
        self.multiton_key.read().is_some()
    }

    pub fn multiton_key(&self) -> CoreResult<String> {
        self.multiton_key
            .read()
            .clone()
            .ok_or(CoreError::NotifierUninitialized)
    }

    /// The facade for this notifier's core, created on first use.
    pub fn facade(&self) -> CoreResult<Arc<Facade>> {
        let key = self.multiton_key()?;
        Facade::instance(&key)
    }

    pub fn send_notification(
        &self,
        name: &str,
        body: Option<Value>,
        note_type: Option<&str>,
    ) -> CoreResult<()> {
        self.facade()?.send_notification(name, body, note_type)
    }

    pub fn notify(&self, notification: &Notification) -> CoreResult<()> {
        self.facade()?.notify_observers(notification)
    }
}
