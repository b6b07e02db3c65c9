use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::{keyed_registry::registries, observer::notifier::Notifier, CoreResult, Value};

/// A named holder of application data.
pub trait Proxy: Send + Sync {
    fn name(&self) -> &str;

    fn notifier(&self) -> &Notifier;

    fn data(&self) -> Value {
        Value::Null
    }

    fn on_register(&self) -> CoreResult<()> {
        Ok(())
    }

    fn on_remove(&self) -> CoreResult<()> {
        Ok(())
    }
}

/// A proxy around a single [`Value`].
#[derive(Debug)]
pub struct DataProxy {
    name: String,
    data: RwLock<Value>,
    notifier: Notifier,
}

impl DataProxy {
    pub const NAME: &'static str = "Proxy";

    pub fn new(name: Option<&str>, data: Option<Value>) -> Self {
        Self {
            name: name.unwrap_or(Self::NAME).to_string(),
            data: RwLock::new(data.unwrap_or(Value::Null)),
            notifier: Notifier::new(),
        }
    }

    pub fn set_data(&self, data: Value) {
        *self.data.write() = data;
    }
}

impl Proxy for DataProxy {
    fn name(&self) -> &str {
        &self.name
    }

    fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn data(&self) -> Value {
        self.data.read().clone()
    }
}

/// # Model
///
/// The multiton model actor of a core: proxies by name.
pub struct Model {
    multiton_key: String,
    proxy_map: DashMap<String, Arc<dyn Proxy>>,
}

impl Model {
    pub(crate) fn new(key: &str) -> Self {
        Self {
            multiton_key: key.to_string(),
            proxy_map: DashMap::new(),
        }
    }

    pub fn instance(key: &str) -> CoreResult<Arc<Model>> {
        registries()
            .models
            .get_or_create(key, |key| Ok(Arc::new(Model::new(key))))
    }

    pub fn construct(key: &str) -> CoreResult<Arc<Model>> {
        registries()
            .models
            .construct(key, |key| Ok(Arc::new(Model::new(key))))
    }

    pub fn remove_model(key: &str) -> Option<Arc<Model>> {
        registries().models.remove(key)
    }

    pub fn multiton_key(&self) -> &str {
        &self.multiton_key
    }

    /// Registers `proxy` under its name, replacing any proxy already there.
    #[tracing::instrument(skip(self, proxy), level = "debug")]
    pub fn register_proxy(&self, proxy: Arc<dyn Proxy>) -> CoreResult<()> {
        proxy.notifier().initialize(&self.multiton_key);
        self.proxy_map.insert(proxy.name().to_string(), proxy.clone());
        debug!("Proxy {} registered", proxy.name());
        proxy.on_register()
    }

    pub fn retrieve_proxy(&self, proxy_name: &str) -> Option<Arc<dyn Proxy>> {
        self.proxy_map
            .get(proxy_name)
            .map(|entry| entry.value().clone())
    }

    pub fn has_proxy(&self, proxy_name: &str) -> bool {
        self.proxy_map.contains_key(proxy_name)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub fn remove_proxy(&self, proxy_name: &str) -> CoreResult<Option<Arc<dyn Proxy>>> {
        let Some((_, proxy)) = self.proxy_map.remove(proxy_name) else {
            return Ok(None);
        };
        debug!("Proxy {} removed", proxy_name);
        proxy.on_remove()?;
        Ok(Some(proxy))
    }

    pub fn proxy_names(&self) -> Vec<String> {
        self.proxy_map
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }
}
