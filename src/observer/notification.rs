use std::{any::Any, collections::HashMap, fmt, sync::Arc, time::Duration};

/// # Notification
///
/// A named message broadcast through a core's `View`. The name selects the
/// observer list; the body and type are optional and opaque to the framework.
///
/// ```rust
/// # use multicore_mvc::{Notification, Value};
/// let note = Notification::new("UserLoggedIn")
///     .with_body(Value::String("user_123".to_string()))
///     .with_type("session");
/// assert_eq!(note.name(), "UserLoggedIn");
/// assert_eq!(note.note_type(), Some("session"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Notification {
    name: String,
    body: Option<Value>,
    note_type: Option<String>,
}

impl Notification {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: None,
            note_type: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_type(mut self, note_type: impl Into<String>) -> Self {
        self.note_type = Some(note_type.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn note_type(&self) -> Option<&str> {
        self.note_type.as_deref()
    }

    // Setters are kept for call sites that fill in a notification before
    // sending it. Treat a notification as write-once after that.
    pub fn set_body(&mut self, body: Option<Value>) {
        self.body = body;
    }

    pub fn set_type(&mut self, note_type: Option<String>) {
        self.note_type = note_type;
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Notification Name: {}\nBody: {:?}\nType: {}",
            self.name,
            self.body,
            self.note_type.as_deref().unwrap_or("")
        )
    }
}

// 値の型
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    List(Vec<Value>),
    Duration(Duration),
    Map(HashMap<String, Value>),
    /// Arbitrary caller data, compared by identity.
    Opaque(OpaqueValue),
    Null,
}

impl Value {
    pub fn opaque<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Value::Opaque(OpaqueValue(value))
    }

    /// Returns the shared caller data if this is an `Opaque` of type `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Value::Opaque(opaque) => opaque.0.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone)]
pub struct OpaqueValue(Arc<dyn Any + Send + Sync>);

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}
