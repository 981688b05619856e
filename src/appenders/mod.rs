//! Output sinks

pub mod console;
pub mod file;
pub mod subscriber;

pub use console::ConsoleAppender;
pub use file::FileAppender;
pub use subscriber::{Subscriber, SubscriberHub, SubscriptionId};

pub use crate::core::Appender;
