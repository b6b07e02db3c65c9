use std::{collections::HashMap, sync::Arc, time::Instant};

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::{
    config::{CoreConfig, ObserverFailurePolicy},
    observer::observer::{NotifyContext, Observer},
    CoreError, CoreResult, Notification,
};

/// # ObserverDispatcher
///
/// Maps notification names to ordered observer lists and fans notifications
/// out to them.
///
/// ## Delivery
///
/// [`notify_observers`](Self::notify_observers) copies the list for the
/// notification's name while holding the lock, releases the lock, and then
/// walks the copy. Callbacks may therefore register or remove observers
/// for the same name, including themselves, while a delivery is in flight:
/// the running delivery still reaches exactly the observers that were
/// subscribed when it started, in subscription order. Membership changes
/// only affect later deliveries.
///
/// ## Cleanup
///
/// A name whose list becomes empty is dropped from the map.
pub struct ObserverDispatcher {
    observer_map: Mutex<HashMap<String, Vec<Arc<Observer>>>>,
    config: CoreConfig,
}

impl ObserverDispatcher {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            observer_map: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Appends `observer` to the list for `notification_name`.
    ///
    /// No de-duplication happens here.
    pub fn register_observer(&self, notification_name: &str, observer: Arc<Observer>) {
        self.observer_map
            .lock()
            .entry(notification_name.to_string())
            .or_default()
            .push(observer);
    }

    pub fn notify_observers(&self, notification: &Notification) -> CoreResult<()> {
        let snapshot = match self.observer_map.lock().get(notification.name()) {
            Some(observers) => observers.clone(),
            None => return Ok(()),
        };

        trace!(
            "Notifying {} observer(s) of {}",
            snapshot.len(),
            notification.name()
        );
        let started = Instant::now();
        let result = match self.config.observer_failure {
            ObserverFailurePolicy::Abort => snapshot
                .iter()
                .try_for_each(|observer| observer.notify_observer(notification)),
            ObserverFailurePolicy::Continue => {
                let failures: Vec<CoreError> = snapshot
                    .iter()
                    .filter_map(|observer| observer.notify_observer(notification).err())
                    .collect();
                if failures.is_empty() {
                    Ok(())
                } else {
                    Err(CoreError::ObserverFailures {
                        notification: notification.name().to_string(),
                        failures,
                    })
                }
            }
        };

        let elapsed = started.elapsed();
        if elapsed > self.config.slow_dispatch_threshold {
            warn!(
                "Slow dispatch of {}: {} observer(s) took {:?}",
                notification.name(),
                snapshot.len(),
                elapsed
            );
        }
        result
    }

    /// Removes every observer for `notification_name` whose context matches.
    pub fn remove_observer(&self, notification_name: &str, context: &NotifyContext) {
        let mut observer_map = self.observer_map.lock();
        let Some(observers) = observer_map.get_mut(notification_name) else {
            return;
        };
        observers.retain(|observer| !observer.compare_notify_context(context));
        if observers.is_empty() {
            observer_map.remove(notification_name);
        }
    }

    pub fn has_observers(&self, notification_name: &str) -> bool {
        self.observer_map.lock().contains_key(notification_name)
    }

    pub fn observer_count(&self, notification_name: &str) -> usize {
        self.observer_map
            .lock()
            .get(notification_name)
            .map_or(0, Vec::len)
    }

    pub fn notification_names(&self) -> Vec<String> {
        self.observer_map.lock().keys().cloned().collect()
    }
}

impl Default for ObserverDispatcher {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}
