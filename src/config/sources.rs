//! File sources, lowest precedence first.

pub mod global_file;
pub mod local_file;
