//! Turns external notifications into coordinator calls.
//!
//! A screen attaches its router to an event channel while it is visible; dropping the
//! returned [`Subscription`] stops the listener. Events sent in between are not
//! replayed.

#[path = "router/events.rs"]
mod events;

#[path = "router/dispatcher.rs"]
mod dispatcher;

pub use dispatcher::{RefreshTriggerRouter, Subscription};
pub use events::{ListView, RefreshEvent, RouteAction};
