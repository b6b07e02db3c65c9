use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::{CoreResult, Notification};

/// Callback invoked for every notification an observer receives.
pub type NotifyFn = Arc<dyn Fn(&Notification) -> CoreResult<()> + Send + Sync>;

/// Identity of the object an observer was registered on behalf of.
///
/// Two contexts are equal only when they were taken from the same
/// allocation. Structural equality of the targets is irrelevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotifyContext(usize);

impl NotifyContext {
    pub fn of<T: ?Sized>(target: &Arc<T>) -> Self {
        Self(Arc::as_ptr(target) as *const () as usize)
    }

    pub fn of_weak<T: ?Sized>(target: &Weak<T>) -> Self {
        Self(Weak::as_ptr(target) as *const () as usize)
    }

    pub fn of_ref<T: ?Sized>(target: &T) -> Self {
        Self(target as *const T as *const () as usize)
    }
}

/// # Observer
///
/// Pairs a callback with the context used to find it again on removal.
/// The callback is never compared; only the context is.
#[derive(Clone)]
pub struct Observer {
    notify: Option<NotifyFn>,
    context: NotifyContext,
}

impl Observer {
    pub fn new<F>(notify: F, context: NotifyContext) -> Self
    where
        F: Fn(&Notification) -> CoreResult<()> + Send + Sync + 'static,
    {
        Self {
            notify: Some(Arc::new(notify)),
            context,
        }
    }

    /// An observer with no callback. Notifying it does nothing.
    pub fn detached(context: NotifyContext) -> Self {
        Self {
            notify: None,
            context,
        }
    }

    pub fn set_notify(&mut self, notify: Option<NotifyFn>) {
        self.notify = notify;
    }

    pub fn context(&self) -> NotifyContext {
        self.context
    }

    pub fn set_context(&mut self, context: NotifyContext) {
        self.context = context;
    }

    pub fn notify_observer(&self, notification: &Notification) -> CoreResult<()> {
        match &self.notify {
            Some(notify) => notify(notification),
            None => Ok(()),
        }
    }

    pub fn compare_notify_context(&self, context: &NotifyContext) -> bool {
        self.context == *context
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("has_notify", &self.notify.is_some())
            .field("context", &self.context)
            .finish()
    }
}
