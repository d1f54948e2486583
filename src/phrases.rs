//! Reply phrases and random selection over them.

mod catalog;
mod picker;

pub use catalog::PhraseCatalog;
pub use picker::RandomPicker;
