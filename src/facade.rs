use std::sync::Arc;

use tracing::debug;

use crate::{
    config::CoreConfig,
    core::{
        controller::{Command, Controller},
        model::{Model, Proxy},
        view::{Mediator, View},
    },
    keyed_registry::registries,
    CoreResult, Notification, Value,
};

/// # Facade
///
/// Composition root of one core. Binds the [`View`], [`Model`] and
/// [`Controller`] registered under a multiton key and forwards to them.
///
/// ```no_run
/// use multicore_mvc::{Facade, Value};
///
/// let facade = Facade::instance("ShellCore")?;
/// facade.send_notification("Startup", Some(Value::Integer(1)), None)?;
/// Facade::remove_core("ShellCore");
/// # Ok::<(), multicore_mvc::CoreError>(())
/// ```
pub struct Facade {
    multiton_key: String,
    model: Arc<Model>,
    view: Arc<View>,
    controller: Arc<Controller>,
}

impl Facade {
    pub(crate) fn new(key: &str) -> CoreResult<Arc<Facade>> {
        Self::with_config(key, CoreConfig::default())
    }

    /// Binds the actors registered under `key`, creating the missing ones.
    /// A view created here gets `config`; one that already exists keeps
    /// its own.
    pub(crate) fn with_config(key: &str, config: CoreConfig) -> CoreResult<Arc<Facade>> {
        let view = View::get_instance(key, |key| Ok(Arc::new(View::with_config(key, config))))?;
        let controller =
            Controller::get_instance(key, |key| Ok(Controller::with_view(key, view.clone())))?;
        let model = Model::instance(key)?;
        Ok(Arc::new(Facade {
            multiton_key: key.to_string(),
            model,
            view,
            controller,
        }))
    }

    pub fn instance(key: &str) -> CoreResult<Arc<Facade>> {
        Self::get_instance(key, |_| Ok(CoreConfig::default()))
    }

    pub fn instance_with_config(key: &str, config: CoreConfig) -> CoreResult<Arc<Facade>> {
        Self::get_instance(key, |_| Ok(config))
    }

    /// The facade for `key`. If the core does not exist yet, `config_factory`
    /// is called once to configure it; otherwise it is not called at all.
    pub fn get_instance<F>(key: &str, config_factory: F) -> CoreResult<Arc<Facade>>
    where
        F: FnOnce(&str) -> CoreResult<CoreConfig>,
    {
        registries()
            .facades
            .get_or_create(key, |key| Facade::with_config(key, config_factory(key)?))
    }

    pub fn construct(key: &str) -> CoreResult<Arc<Facade>> {
        registries().facades.construct(key, Facade::new)
    }

    pub fn has_core(key: &str) -> bool {
        registries().facades.has(key)
    }

    /// Tears down the model, view, controller and facade for `key`.
    ///
    /// Unknown keys are ignored.
    #[tracing::instrument(level = "debug")]
    pub fn remove_core(key: &str) {
        let removed = registries().facades.remove_with(key, || {
            Model::remove_model(key);
            View::remove_view(key);
            Controller::remove_controller(key);
        });
        if removed.is_some() {
            debug!("Core {} removed", key);
        }
    }

    pub fn multiton_key(&self) -> &str {
        &self.multiton_key
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn view(&self) -> &Arc<View> {
        &self.view
    }

    pub fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }

    // Model
    pub fn register_proxy(&self, proxy: Arc<dyn Proxy>) -> CoreResult<()> {
        self.model.register_proxy(proxy)
    }

    pub fn retrieve_proxy(&self, proxy_name: &str) -> Option<Arc<dyn Proxy>> {
        self.model.retrieve_proxy(proxy_name)
    }

    pub fn has_proxy(&self, proxy_name: &str) -> bool {
        self.model.has_proxy(proxy_name)
    }

    pub fn remove_proxy(&self, proxy_name: &str) -> CoreResult<Option<Arc<dyn Proxy>>> {
        self.model.remove_proxy(proxy_name)
    }

    // View
    pub fn register_mediator(&self, mediator: Arc<dyn Mediator>) -> CoreResult<()> {
        self.view.register_mediator(mediator)
    }

    pub fn retrieve_mediator(&self, mediator_name: &str) -> Option<Arc<dyn Mediator>> {
        self.view.retrieve_mediator(mediator_name)
    }

    pub fn has_mediator(&self, mediator_name: &str) -> bool {
        self.view.has_mediator(mediator_name)
    }

    pub fn remove_mediator(&self, mediator_name: &str) -> CoreResult<Option<Arc<dyn Mediator>>> {
        self.view.remove_mediator(mediator_name)
    }

    // Controller
    pub fn register_command<F>(&self, notification_name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Command> + Send + Sync + 'static,
    {
        self.controller.register_command(notification_name, factory);
    }

    pub fn has_command(&self, notification_name: &str) -> bool {
        self.controller.has_command(notification_name)
    }

    pub fn remove_command(&self, notification_name: &str) {
        self.controller.remove_command(notification_name);
    }

    pub fn notify_observers(&self, notification: &Notification) -> CoreResult<()> {
        self.view.notify_observers(notification)
    }

    pub fn send_notification(
        &self,
        name: &str,
        body: Option<Value>,
        note_type: Option<&str>,
    ) -> CoreResult<()> {
        let mut notification = Notification::new(name);
        notification.set_body(body);
        notification.set_type(note_type.map(str::to_string));
        self.notify_observers(&notification)
    }
}
