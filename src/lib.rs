pub mod catalog;
pub mod configuration;
pub mod foundation;
pub mod login;
pub mod menu;
pub mod selection;
pub mod startup;
pub mod sync;

pub use configuration::*;
