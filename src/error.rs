use thiserror::Error;

/// Which process-wide registry an identity error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum CoreKind {
    Facade,
    View,
    Model,
    Controller,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{kind} instance for multiton key `{key}` already constructed")]
    AlreadyConstructed { kind: CoreKind, key: String },

    #[error("Multiton key for this notifier not yet initialized")]
    NotifierUninitialized,

    #[error("Handler error: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("{} observer(s) failed while notifying `{notification}`", .failures.len())]
    ObserverFailures {
        notification: String,
        failures: Vec<CoreError>,
    },

    #[error("Config error: {0}")]
    Config(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn already_constructed<S: Into<String>>(kind: CoreKind, key: S) -> Self {
        CoreError::AlreadyConstructed {
            kind,
            key: key.into(),
        }
    }

    /// Wraps a failure raised inside a mediator, proxy or command.
    pub fn handler<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        CoreError::Handler(error.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        CoreError::Config(message.into())
    }

    pub fn is_already_constructed(&self) -> bool {
        matches!(self, CoreError::AlreadyConstructed { .. })
    }
}
