use std::{
    collections::VecDeque,
    sync::{Arc, Weak},
};

use dashmap::{mapref::entry::Entry, DashMap};
use tracing::debug;

use crate::{
    core::view::View,
    keyed_registry::registries,
    observer::{
        notifier::Notifier,
        observer::{NotifyContext, Observer},
    },
    CoreResult, Notification,
};

/// A handler created fresh for every notification it is bound to.
pub trait Command: Send {
    fn notifier(&self) -> &Notifier;

    fn execute(&mut self, notification: &Notification) -> CoreResult<()>;
}

/// Builds a new command instance per delivery.
pub type CommandFactory = Arc<dyn Fn() -> Box<dyn Command> + Send + Sync>;

/// A command that runs a list of sub-commands in the order they were added.
///
/// Each sub-command is created from its factory at execution time, receives
/// the macro's multiton key and the same notification. The first failing
/// sub-command stops the rest.
#[derive(Default)]
pub struct MacroCommand {
    notifier: Notifier,
    sub_commands: VecDeque<CommandFactory>,
}

impl MacroCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sub_command<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn Command> + Send + Sync + 'static,
    {
        self.sub_commands.push_back(Arc::new(factory));
    }

    pub fn with_sub_command<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Command> + Send + Sync + 'static,
    {
        self.add_sub_command(factory);
        self
    }

    pub fn len(&self) -> usize {
        self.sub_commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_commands.is_empty()
    }
}

impl Command for MacroCommand {
    fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn execute(&mut self, notification: &Notification) -> CoreResult<()> {
        let key = self.notifier.multiton_key()?;
        while let Some(factory) = self.sub_commands.pop_front() {
            let mut command = factory();
            command.notifier().initialize(&key);
            command.execute(notification)?;
        }
        Ok(())
    }
}

/// # Controller
///
/// The multiton controller actor of a core. Maps notification names to
/// command factories.
///
/// The controller owns one [`Observer`] that forwards to
/// [`Controller::execute_command`]. That observer is subscribed with the
/// view once per notification name, when the first factory for the name is
/// registered, and unsubscribed when the factory is removed. Replacing a
/// factory leaves the subscription alone.
pub struct Controller {
    multiton_key: String,
    view: Arc<View>,
    command_map: DashMap<String, CommandFactory>,
    observer: Arc<Observer>,
}

impl Controller {
    /// Builds a controller bound to the view registered for `key`.
    pub(crate) fn new(key: &str) -> CoreResult<Arc<Controller>> {
        let view = View::instance(key)?;
        Ok(Self::with_view(key, view))
    }

    pub(crate) fn with_view(key: &str, view: Arc<View>) -> Arc<Controller> {
        Arc::new_cyclic(|weak: &Weak<Controller>| {
            let target = weak.clone();
            let observer = Observer::new(
                move |notification| match target.upgrade() {
                    Some(controller) => controller.execute_command(notification),
                    None => Ok(()),
                },
                NotifyContext::of_weak(weak),
            );
            Controller {
                multiton_key: key.to_string(),
                view,
                command_map: DashMap::new(),
                observer: Arc::new(observer),
            }
        })
    }

    pub fn instance(key: &str) -> CoreResult<Arc<Controller>> {
        Self::get_instance(key, Controller::new)
    }

    pub(crate) fn get_instance<F>(key: &str, factory: F) -> CoreResult<Arc<Controller>>
    where
        F: FnOnce(&str) -> CoreResult<Arc<Controller>>,
    {
        registries().controllers.get_or_create(key, factory)
    }

    pub fn construct(key: &str) -> CoreResult<Arc<Controller>> {
        registries().controllers.construct(key, Controller::new)
    }

    pub fn remove_controller(key: &str) -> Option<Arc<Controller>> {
        registries().controllers.remove(key)
    }

    pub fn multiton_key(&self) -> &str {
        &self.multiton_key
    }

    pub fn view(&self) -> &Arc<View> {
        &self.view
    }

    /// Runs the command bound to the notification's name, if any.
    ///
    /// A new command is built for every call. Its error is returned as is.
    pub fn execute_command(&self, notification: &Notification) -> CoreResult<()> {
        let Some(factory) = self
            .command_map
            .get(notification.name())
            .map(|entry| entry.value().clone())
        else {
            return Ok(());
        };

        let mut command = factory();
        command.notifier().initialize(&self.multiton_key);
        command.execute(notification)
    }

    #[tracing::instrument(skip(self, factory), level = "debug")]
    pub fn register_command<F>(&self, notification_name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Command> + Send + Sync + 'static,
    {
        let factory: CommandFactory = Arc::new(factory);
        match self.command_map.entry(notification_name.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(factory);
                debug!("Command for {} replaced", notification_name);
            }
            Entry::Vacant(entry) => {
                self.view
                    .register_observer(notification_name, self.observer.clone());
                entry.insert(factory);
                debug!("Command for {} registered", notification_name);
            }
        }
    }

    pub fn has_command(&self, notification_name: &str) -> bool {
        self.command_map.contains_key(notification_name)
    }

    /// Unbinds the command for `notification_name`. Unknown names are ignored.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn remove_command(&self, notification_name: &str) {
        if let Entry::Occupied(entry) = self.command_map.entry(notification_name.to_string()) {
            self.view
                .remove_observer(notification_name, &self.observer.context());
            entry.remove();
            debug!("Command for {} removed", notification_name);
        }
    }

    pub fn command_names(&self) -> Vec<String> {
        self.command_map
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }
}
