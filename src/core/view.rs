use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::{
    config::CoreConfig,
    core::dispatcher::ObserverDispatcher,
    keyed_registry::registries,
    observer::{
        notifier::Notifier,
        observer::{NotifyContext, Observer},
    },
    CoreResult, Notification, Value,
};

/// A named subscriber that translates between a view component and
/// notifications.
///
/// Interests are read once when the mediator is registered and once more
/// when it is removed, so they should not change in between.
pub trait Mediator: Send + Sync {
    fn name(&self) -> &str;

    fn notifier(&self) -> &Notifier;

    /// The view component this mediator manages.
    fn component(&self) -> Value {
        Value::Null
    }

    fn list_notification_interests(&self) -> Vec<String> {
        Vec::new()
    }

    fn handle_notification(&self, _notification: &Notification) -> CoreResult<()> {
        Ok(())
    }

    fn on_register(&self) -> CoreResult<()> {
        Ok(())
    }

    fn on_remove(&self) -> CoreResult<()> {
        Ok(())
    }
}

/// A mediator with no interests around a single view component.
#[derive(Debug)]
pub struct SimpleMediator {
    name: String,
    component: RwLock<Value>,
    notifier: Notifier,
}

impl SimpleMediator {
    pub const NAME: &'static str = "Mediator";

    pub fn new(name: Option<&str>, component: Option<Value>) -> Self {
        Self {
            name: name.unwrap_or(Self::NAME).to_string(),
            component: RwLock::new(component.unwrap_or(Value::Null)),
            notifier: Notifier::new(),
        }
    }

    pub fn set_component(&self, component: Value) {
        *self.component.write() = component;
    }
}

impl Mediator for SimpleMediator {
    fn name(&self) -> &str {
        &self.name
    }

    fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn component(&self) -> Value {
        self.component.read().clone()
    }
}

/// # View
///
/// The multiton view actor of a core. It keeps mediators by name and owns
/// the [`ObserverDispatcher`] every notification of the core goes through.
///
/// Registering a mediator subscribes a single observer, whose context is the
/// mediator itself, to each of the mediator's interests. Removing the
/// mediator unsubscribes that context again.
pub struct View {
    multiton_key: String,
    dispatcher: ObserverDispatcher,
    mediator_map: DashMap<String, Arc<dyn Mediator>>,
}

impl View {
    pub(crate) fn new(key: &str) -> Self {
        Self::with_config(key, CoreConfig::default())
    }

    pub(crate) fn with_config(key: &str, config: CoreConfig) -> Self {
        Self {
            multiton_key: key.to_string(),
            dispatcher: ObserverDispatcher::new(config),
            mediator_map: DashMap::new(),
        }
    }

    /// The view for `key`, created with the default config if missing.
    pub fn instance(key: &str) -> CoreResult<Arc<View>> {
        Self::get_instance(key, |key| Ok(Arc::new(View::new(key))))
    }

    pub(crate) fn get_instance<F>(key: &str, factory: F) -> CoreResult<Arc<View>>
    where
        F: FnOnce(&str) -> CoreResult<Arc<View>>,
    {
        registries().views.get_or_create(key, factory)
    }

    /// Registers a fresh view under `key`, failing if one already exists.
    pub fn construct(key: &str) -> CoreResult<Arc<View>> {
        registries()
            .views
            .construct(key, |key| Ok(Arc::new(View::new(key))))
    }

    pub fn remove_view(key: &str) -> Option<Arc<View>> {
        registries().views.remove(key)
    }

    pub fn multiton_key(&self) -> &str {
        &self.multiton_key
    }

    pub fn dispatcher(&self) -> &ObserverDispatcher {
        &self.dispatcher
    }

    pub fn register_observer(&self, notification_name: &str, observer: Arc<Observer>) {
        self.dispatcher.register_observer(notification_name, observer);
    }

    pub fn notify_observers(&self, notification: &Notification) -> CoreResult<()> {
        self.dispatcher.notify_observers(notification)
    }

    pub fn remove_observer(&self, notification_name: &str, context: &NotifyContext) {
        self.dispatcher.remove_observer(notification_name, context);
    }

    /// Registers `mediator` under its name.
    ///
    /// A second mediator with an already registered name is ignored; remove
    /// the first one to replace it. If a concurrent `remove_mediator` takes
    /// the mediator out while its interests are being subscribed, those
    /// subscriptions are withdrawn again and `on_register` does not run.
    #[tracing::instrument(skip(self, mediator), level = "debug")]
    pub fn register_mediator(&self, mediator: Arc<dyn Mediator>) -> CoreResult<()> {
        let name = mediator.name().to_string();
        match self.mediator_map.entry(name.clone()) {
            Entry::Occupied(_) => {
                warn!("Mediator {} already registered with view {}", name, self.multiton_key);
                return Ok(());
            }
            Entry::Vacant(entry) => {
                entry.insert(mediator.clone());
            }
        }

        mediator.notifier().initialize(&self.multiton_key);

        let context = NotifyContext::of(&mediator);
        let target = mediator.clone();
        let observer = Arc::new(Observer::new(
            move |notification| target.handle_notification(notification),
            context,
        ));
        let interests = mediator.list_notification_interests();
        for interest in &interests {
            self.register_observer(interest, observer.clone());
        }

        // 購読中に取り除かれていたら購読を戻す
        let still_registered = self
            .mediator_map
            .get(&name)
            .is_some_and(|current| NotifyContext::of(current.value()) == context);
        if !still_registered {
            for interest in &interests {
                self.remove_observer(interest, &context);
            }
            debug!("Mediator {} was removed while registering", name);
            return Ok(());
        }

        debug!(
            "Mediator {} registered with {} interest(s)",
            name,
            interests.len()
        );
        mediator.on_register()
    }

    pub fn retrieve_mediator(&self, mediator_name: &str) -> Option<Arc<dyn Mediator>> {
        self.mediator_map
            .get(mediator_name)
            .map(|entry| entry.value().clone())
    }

    pub fn has_mediator(&self, mediator_name: &str) -> bool {
        self.mediator_map.contains_key(mediator_name)
    }

    /// Removes the named mediator and unsubscribes it from its interests.
    ///
    /// Returns `Ok(None)` if no mediator is registered under that name.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn remove_mediator(&self, mediator_name: &str) -> CoreResult<Option<Arc<dyn Mediator>>> {
        let Some((_, mediator)) = self.mediator_map.remove(mediator_name) else {
            return Ok(None);
        };

        let context = NotifyContext::of(&mediator);
        for interest in mediator.list_notification_interests() {
            self.remove_observer(&interest, &context);
        }
        debug!("Mediator {} removed", mediator_name);

        mediator.on_remove()?;
        Ok(Some(mediator))
    }

    pub fn mediator_names(&self) -> Vec<String> {
        self.mediator_map
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    struct CountingMediator {
        name: String,
        interests: Vec<String>,
        notifier: Notifier,
        handled: AtomicUsize,
        last_body: AtomicI64,
        registered: AtomicUsize,
        removed: AtomicUsize,
    }

    impl CountingMediator {
        fn new(name: &str, interests: &[&str]) -> Self {
            Self {
                name: name.to_string(),
                interests: interests.iter().map(|s| s.to_string()).collect(),
                notifier: Notifier::new(),
                handled: AtomicUsize::new(0),
                last_body: AtomicI64::new(0),
                registered: AtomicUsize::new(0),
                removed: AtomicUsize::new(0),
            }
        }
    }

    impl Mediator for CountingMediator {
        fn name(&self) -> &str {
            &self.name
        }

        fn notifier(&self) -> &Notifier {
            &self.notifier
        }

        fn list_notification_interests(&self) -> Vec<String> {
            self.interests.clone()
        }

        fn handle_notification(&self, notification: &Notification) -> CoreResult<()> {
            self.handled.fetch_add(1, Ordering::SeqCst);
            if let Some(body) = notification.body().and_then(|b| b.as_i64()) {
                self.last_body.store(body, Ordering::SeqCst);
            }
            Ok(())
        }

        fn on_register(&self) -> CoreResult<()> {
            self.registered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_remove(&self) -> CoreResult<()> {
            self.removed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_register_and_notify_mediator() {
        let view = View::new("ViewUnitKey1");
        let mediator = Arc::new(CountingMediator::new("M", &["A", "B"]));
        view.register_mediator(mediator.clone()).unwrap();

        assert_eq!(mediator.notifier.multiton_key().unwrap(), "ViewUnitKey1");
        assert_eq!(mediator.registered.load(Ordering::SeqCst), 1);

        view.notify_observers(&Notification::new("A").with_body(10i64)).unwrap();
        assert_eq!(mediator.last_body.load(Ordering::SeqCst), 10);

        view.remove_mediator("M").unwrap();
        view.notify_observers(&Notification::new("A").with_body(20i64)).unwrap();
        assert_eq!(mediator.last_body.load(Ordering::SeqCst), 10);
        assert_eq!(mediator.handled.load(Ordering::SeqCst), 1);
        assert_eq!(mediator.removed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_one_observer_per_interest() {
        let view = View::new("ViewUnitKey2");
        let mediator = Arc::new(CountingMediator::new("M", &["A", "B", "C"]));
        view.register_mediator(mediator).unwrap();

        for name in ["A", "B", "C"] {
            assert_eq!(view.dispatcher().observer_count(name), 1);
        }

        view.remove_mediator("M").unwrap();
        for name in ["A", "B", "C"] {
            assert!(!view.dispatcher().has_observers(name));
        }
    }

    #[test]
    fn test_duplicate_name_is_refused() {
        let view = View::new("ViewUnitKey3");
        let first = Arc::new(CountingMediator::new("Same", &["A"]));
        let second = Arc::new(CountingMediator::new("Same", &["A"]));
        view.register_mediator(first.clone()).unwrap();
        view.register_mediator(second.clone()).unwrap();

        assert_eq!(second.registered.load(Ordering::SeqCst), 0);
        assert!(!second.notifier.is_initialized());
        assert_eq!(view.dispatcher().observer_count("A"), 1);

        let retrieved = view.retrieve_mediator("Same").unwrap();
        assert_eq!(NotifyContext::of(&retrieved), NotifyContext::of(&first));
    }

    #[test]
    fn test_remove_unknown_mediator() {
        let view = View::new("ViewUnitKey4");
        assert!(view.remove_mediator("missing").unwrap().is_none());
    }

    #[test]
    fn test_simple_mediator_default_name() {
        let mediator = SimpleMediator::new(None, None);
        assert_eq!(mediator.name(), SimpleMediator::NAME);
        assert!(mediator.list_notification_interests().is_empty());
        assert_eq!(mediator.component(), Value::Null);
        assert_eq!(SimpleMediator::new(Some("custom"), None).name(), "custom");
    }

    #[test]
    fn test_simple_mediator_component() {
        let view = View::new("ViewUnitKey5");
        let mediator = Arc::new(SimpleMediator::new(
            Some("Panel"),
            Some(Value::from("login form")),
        ));
        view.register_mediator(mediator.clone()).unwrap();

        let retrieved = view.retrieve_mediator("Panel").unwrap();
        assert_eq!(retrieved.component(), Value::from("login form"));

        mediator.set_component(Value::Integer(2));
        assert_eq!(retrieved.component(), Value::Integer(2));
    }

    struct ShiftingMediator {
        interests: Mutex<Vec<String>>,
        queried: AtomicUsize,
        notifier: Notifier,
    }

    impl Mediator for ShiftingMediator {
        fn name(&self) -> &str {
            "Shifting"
        }

        fn notifier(&self) -> &Notifier {
            &self.notifier
        }

        fn list_notification_interests(&self) -> Vec<String> {
            self.queried.fetch_add(1, Ordering::SeqCst);
            self.interests.lock().clone()
        }
    }

    #[test]
    fn test_remove_reads_interests_again() {
        let view = View::new("ViewUnitKey6");
        let mediator = Arc::new(ShiftingMediator {
            interests: Mutex::new(vec!["A".to_string()]),
            queried: AtomicUsize::new(0),
            notifier: Notifier::new(),
        });
        view.register_mediator(mediator.clone()).unwrap();
        assert_eq!(mediator.queried.load(Ordering::SeqCst), 1);

        // an observer added under the mediator's context after registration
        // is only found if removal asks for the interests again
        mediator.interests.lock().push("B".to_string());
        view.register_observer(
            "B",
            Arc::new(Observer::detached(NotifyContext::of(&mediator))),
        );

        view.remove_mediator("Shifting").unwrap();
        assert_eq!(mediator.queried.load(Ordering::SeqCst), 2);
        assert!(!view.dispatcher().has_observers("A"));
        assert!(!view.dispatcher().has_observers("B"));
    }

    #[test]
    fn test_concurrent_register_and_remove_leave_no_orphans() {
        let view = View::new("ViewUnitKey7");
        for _ in 0..200 {
            let mediator = Arc::new(CountingMediator::new("Racer", &["A", "B"]));
            std::thread::scope(|scope| {
                scope.spawn(|| view.register_mediator(mediator.clone()).unwrap());
                scope.spawn(|| {
                    view.remove_mediator("Racer").unwrap();
                });
            });

            if view.has_mediator("Racer") {
                assert_eq!(view.dispatcher().observer_count("A"), 1);
                assert_eq!(view.dispatcher().observer_count("B"), 1);
                view.remove_mediator("Racer").unwrap();
            }
            assert!(!view.dispatcher().has_observers("A"));
            assert!(!view.dispatcher().has_observers("B"));
        }
    }
}
