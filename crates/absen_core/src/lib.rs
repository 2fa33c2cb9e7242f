pub mod alerts;
pub mod memory;
pub mod occurrence;
pub mod schedule;
pub mod service;
pub mod store;
pub mod timer;
pub mod trigger;

pub use crate::service::{ReminderService, ReminderServiceBuilder};
