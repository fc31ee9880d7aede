//! Built-in plugins.
//!
//! Each submodule contributes the plugins for one family of checks;
//! [`Registry::with_builtins`](crate::registry::Registry::with_builtins)
//! installs all of them.

pub mod array;
pub mod common;
pub mod date;
pub mod format;
pub mod number;
pub mod object;
pub mod schema;
pub mod string;

use crate::plugin::Plugin;

/// Every built-in plugin, in registration order.
pub(crate) fn builtins() -> Vec<Plugin> {
    let mut plugins = common::plugins();
    plugins.extend(string::plugins());
    plugins.extend(number::plugins());
    plugins.extend(array::plugins());
    plugins.extend(object::plugins());
    plugins.extend(date::plugins());
    plugins.extend(format::plugins());
    plugins.extend(schema::plugins());
    plugins
}
