use std::{collections::HashMap, sync::Arc};

use lazy_static::lazy_static;
use parking_lot::Mutex;
use tracing::debug;

use crate::{
    core::{controller::Controller, model::Model, view::View},
    facade::Facade,
    CoreError, CoreKind, CoreResult,
};

/// # KeyedRegistry
///
/// At most one instance per multiton key. Entries are created lazily by
/// [`KeyedRegistry::get_or_create`] and only ever leave through
/// [`KeyedRegistry::remove`]; an occupied key is never overwritten.
///
/// Factories run while the registry lock is held, so a factory must not
/// call back into the same registry.
pub struct KeyedRegistry<T: ?Sized> {
    kind: CoreKind,
    instances: Mutex<HashMap<String, Arc<T>>>,
}

impl<T: ?Sized> KeyedRegistry<T> {
    pub fn new(kind: CoreKind) -> Self {
        Self {
            kind,
            instances: Mutex::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> CoreKind {
        self.kind
    }

    /// Returns the instance for `key`, invoking `factory` only if none exists.
    pub fn get_or_create<F>(&self, key: &str, factory: F) -> CoreResult<Arc<T>>
    where
        F: FnOnce(&str) -> CoreResult<Arc<T>>,
    {
        let mut instances = self.instances.lock();
        if let Some(instance) = instances.get(key) {
            return Ok(instance.clone());
        }
        let instance = factory(key)?;
        debug!("{} created for multiton key {}", self.kind, key);
        instances.insert(key.to_string(), instance.clone());
        Ok(instance)
    }

    /// Claims `key` for a fresh instance built by `factory`.
    ///
    /// Fails with [`CoreError::AlreadyConstructed`] if the key is occupied;
    /// the factory is not invoked in that case.
    pub fn construct<F>(&self, key: &str, factory: F) -> CoreResult<Arc<T>>
    where
        F: FnOnce(&str) -> CoreResult<Arc<T>>,
    {
        let mut instances = self.instances.lock();
        if instances.contains_key(key) {
            return Err(CoreError::already_constructed(self.kind, key));
        }
        let instance = factory(key)?;
        debug!("{} constructed for multiton key {}", self.kind, key);
        instances.insert(key.to_string(), instance.clone());
        Ok(instance)
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.instances.lock().get(key).cloned()
    }

    pub fn has(&self, key: &str) -> bool {
        self.instances.lock().contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<Arc<T>> {
        self.remove_with(key, || {})
    }

    /// Removes `key`, running `teardown` while the registry lock is held.
    pub fn remove_with<F: FnOnce()>(&self, key: &str, teardown: F) -> Option<Arc<T>> {
        let mut instances = self.instances.lock();
        teardown();
        let removed = instances.remove(key);
        if removed.is_some() {
            debug!("{} removed for multiton key {}", self.kind, key);
        }
        removed
    }

    pub fn keys(&self) -> Vec<String> {
        self.instances.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.lock().is_empty()
    }
}

/// The four process-wide registries, one per actor kind.
pub struct CoreRegistries {
    pub facades: KeyedRegistry<Facade>,
    pub views: KeyedRegistry<View>,
    pub models: KeyedRegistry<Model>,
    pub controllers: KeyedRegistry<Controller>,
}

impl CoreRegistries {
    fn new() -> Self {
        Self {
            facades: KeyedRegistry::new(CoreKind::Facade),
            views: KeyedRegistry::new(CoreKind::View),
            models: KeyedRegistry::new(CoreKind::Model),
            controllers: KeyedRegistry::new(CoreKind::Controller),
        }
    }
}

lazy_static! {
    static ref REGISTRIES: CoreRegistries = CoreRegistries::new();
}

/// Registries shared by every core in the process. Created on first use;
/// entries live until `Facade::remove_core` or the per-kind `remove_*`.
pub fn registries() -> &'static CoreRegistries {
    &REGISTRIES
}
