#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use multicore_mvc::{CoreError, CoreResult, Mediator, Notification, Notifier, View};
use parking_lot::Mutex;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    // テストの前に一度だけ実行したい処理
    // tracing_subscriberの初期化
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

static NEXT_KEY: AtomicUsize = AtomicUsize::new(0);

/// A multiton key no other test in this binary uses.
pub fn unique_key(prefix: &str) -> String {
    format!("{}-{}", prefix, NEXT_KEY.fetch_add(1, Ordering::SeqCst))
}

/// Keeps every notification it handles.
pub struct RecordingMediator {
    name: String,
    interests: Vec<String>,
    notifier: Notifier,
    pub received: Mutex<Vec<Notification>>,
}

impl RecordingMediator {
    pub fn new(name: &str, interests: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            interests: interests.iter().map(|s| s.to_string()).collect(),
            notifier: Notifier::new(),
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn received_names(&self) -> Vec<String> {
        self.received
            .lock()
            .iter()
            .map(|note| note.name().to_string())
            .collect()
    }
}

impl Mediator for RecordingMediator {
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
        self.received.lock().push(notification.clone());
        Ok(())
    }
}

/// Removes itself from its view the first time it is notified.
pub struct SelfRemovingMediator {
    name: String,
    interest: String,
    notifier: Notifier,
    counter: Arc<AtomicUsize>,
}

impl SelfRemovingMediator {
    pub fn new(name: String, interest: &str, counter: Arc<AtomicUsize>) -> Arc<Self> {
        Arc::new(Self {
            name,
            interest: interest.to_string(),
            notifier: Notifier::new(),
            counter,
        })
    }
}

impl Mediator for SelfRemovingMediator {
    fn name(&self) -> &str {
        &self.name
    }

    fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn list_notification_interests(&self) -> Vec<String> {
        vec![self.interest.clone()]
    }

    fn handle_notification(&self, _notification: &Notification) -> CoreResult<()> {
        let view = View::instance(&self.notifier.multiton_key()?)?;
        view.remove_mediator(&self.name)?;
        self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fails every notification it receives.
pub struct FailingMediator {
    name: String,
    interest: String,
    notifier: Notifier,
}

impl FailingMediator {
    pub fn new(name: &str, interest: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            interest: interest.to_string(),
            notifier: Notifier::new(),
        })
    }
}

impl Mediator for FailingMediator {
    fn name(&self) -> &str {
        &self.name
    }

    fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn list_notification_interests(&self) -> Vec<String> {
        vec![self.interest.clone()]
    }

    fn handle_notification(&self, notification: &Notification) -> CoreResult<()> {
        Err(CoreError::handler(format!(
            "{} rejected {}",
            self.name,
            notification.name()
        )))
    }
}
