//! # Core actors
//!
//! Each multiton key owns one of each:
//!
//! - [`view::View`]: mediators and the [`dispatcher::ObserverDispatcher`]
//! - [`model::Model`]: proxies
//! - [`controller::Controller`]: command factories, subscribed through the view
//!
//! All three are reached through the process-wide registries in
//! [`crate::keyed_registry`].

pub mod controller;
pub mod dispatcher;
pub mod model;
pub mod view;
