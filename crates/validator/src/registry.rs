//! Plugin registry.
//!
//! The registry owns every plugin available to a builder session and answers
//! one question: which plugin implements method `m` for base type `t`?
//! Lookups go through a capability map keyed by method name and type tag;
//! registration order is preserved for the manifest.

use indexmap::IndexMap;
use tracing::debug;

use crate::builder::SchemaBuilder;
use crate::error::BuildError;
use crate::plugin::{Plugin, PluginDescriptor};
use crate::value::TypeTag;

/// An ordered, named collection of plugins.
///
/// ```
/// use sift_validator::registry::Registry;
/// use sift_validator::value::TypeTag;
///
/// let registry = Registry::with_builtins();
/// assert_eq!(registry.resolve("min", TypeTag::String).unwrap().name(), "string.min");
/// assert_eq!(registry.resolve("min", TypeTag::Number).unwrap().name(), "number.min");
/// assert!(registry.resolve("email", TypeTag::Number).is_err());
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    plugins: IndexMap<String, Plugin>,
    /// method -> type tag -> index into `plugins`.
    capabilities: IndexMap<String, IndexMap<TypeTag, usize>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in plugin set.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for plugin in crate::plugins::builtins() {
            registry.insert(plugin);
        }
        debug!(plugins = registry.len(), "registry initialized with built-in plugins");
        registry
    }

    /// Registers a plugin. Fails if the name is already taken.
    ///
    /// When two plugins expose the same method for the same base type, the
    /// later registration serves that pair.
    pub fn register(&mut self, plugin: Plugin) -> Result<(), BuildError> {
        if self.plugins.contains_key(plugin.name()) {
            return Err(BuildError::DuplicateName(plugin.name().to_owned()));
        }
        debug!(
            name = plugin.name(),
            method = plugin.method_name(),
            types = ?plugin.allowed_types(),
            "registering plugin"
        );
        self.insert(plugin);
        Ok(())
    }

    /// Chainable [`register`](Self::register).
    pub fn with(mut self, plugin: Plugin) -> Result<Self, BuildError> {
        self.register(plugin)?;
        Ok(self)
    }

    fn insert(&mut self, plugin: Plugin) {
        let index = self.plugins.len();
        let by_type = self
            .capabilities
            .entry(plugin.method_name().to_owned())
            .or_default();
        for tag in plugin.allowed_types().iter() {
            by_type.insert(tag, index);
        }
        self.plugins.insert(plugin.name().to_owned(), plugin);
    }

    /// Finds the plugin serving `method` on `base_type`.
    ///
    /// Fails with `TypeNotAllowed` when the method exists for other types
    /// only, and `UnknownMethod` when nothing provides it.
    pub fn resolve(&self, method: &str, base_type: TypeTag) -> Result<&Plugin, BuildError> {
        let Some(by_type) = self.capabilities.get(method) else {
            return Err(BuildError::UnknownMethod {
                method: method.to_owned(),
                base_type,
            });
        };
        by_type
            .get(&base_type)
            .or_else(|| by_type.get(&TypeTag::Any))
            .and_then(|&index| self.plugins.get_index(index))
            .map(|(_, plugin)| plugin)
            .ok_or_else(|| BuildError::TypeNotAllowed {
                method: method.to_owned(),
                base_type,
            })
    }

    /// Returns true if any plugin exposes `method`.
    #[must_use]
    pub fn has_method(&self, method: &str) -> bool {
        self.capabilities.contains_key(method)
    }

    /// Looks up a plugin by its unique name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.get(name)
    }

    /// Plugins in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.values()
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Metadata of every plugin, in registration order.
    #[must_use]
    pub fn manifest(&self) -> Vec<PluginDescriptor> {
        self.plugins.values().map(Plugin::descriptor).collect()
    }

    /// Starts a builder session over this registry.
    #[must_use]
    pub fn schema(&self) -> SchemaBuilder<'_> {
        SchemaBuilder::new(self)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("count", &self.plugins.len())
            .field("names", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{Category, HoistedValidator, Outcome, Rule};
    use crate::value::TypeSet;
    use serde_json::Value;
    use std::borrow::Cow;

    struct AlwaysValid;

    impl Rule for AlwaysValid {
        fn check(&self, _value: Option<&Value>, _root: &Value) -> Outcome {
            Outcome::Valid
        }

        fn message(&self, _value: Option<&Value>, _path: &str) -> Cow<'static, str> {
            Cow::Borrowed("")
        }
    }

    fn stub(name: &'static str, method: &'static str, types: TypeSet) -> Plugin {
        Plugin::new(name, method, |_| Ok(HoistedValidator::new("stub", AlwaysValid)))
            .for_types(types)
            .with_category(Category::Custom)
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = Registry::new();
        registry
            .register(stub("a", "check", TypeSet::ANY))
            .unwrap();
        let error = registry
            .register(stub("a", "other", TypeSet::ANY))
            .unwrap_err();
        assert_eq!(error, BuildError::DuplicateName("a".into()));
    }

    #[test]
    fn resolve_distinguishes_unknown_from_disallowed() {
        let registry = Registry::new()
            .with(stub("s.trimmed", "trimmed", TypeSet::of(&[TypeTag::String])))
            .unwrap();

        assert_eq!(
            registry.resolve("trimmed", TypeTag::String).unwrap().name(),
            "s.trimmed"
        );
        assert!(matches!(
            registry.resolve("trimmed", TypeTag::Number),
            Err(BuildError::TypeNotAllowed { .. })
        ));
        assert!(matches!(
            registry.resolve("nope", TypeTag::String),
            Err(BuildError::UnknownMethod { .. })
        ));
    }

    #[test]
    fn any_plugins_serve_every_type() {
        let registry = Registry::new()
            .with(stub("any.check", "check", TypeSet::ANY))
            .unwrap();
        for tag in TypeTag::ALL {
            assert!(registry.resolve("check", tag).is_ok());
        }
    }

    #[test]
    fn specific_plugin_wins_over_any() {
        let registry = Registry::new()
            .with(stub("any.len", "len", TypeSet::ANY))
            .unwrap()
            .with(stub("string.len", "len", TypeSet::of(&[TypeTag::String])))
            .unwrap();
        assert_eq!(registry.resolve("len", TypeTag::String).unwrap().name(), "string.len");
        assert_eq!(registry.resolve("len", TypeTag::Array).unwrap().name(), "any.len");
    }

    #[test]
    fn manifest_preserves_registration_order() {
        let registry = Registry::new()
            .with(stub("z", "z", TypeSet::ANY))
            .unwrap()
            .with(stub("a", "a", TypeSet::ANY))
            .unwrap();
        let names: Vec<_> = registry.manifest().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn builtins_cover_both_surfaces() {
        let registry = Registry::with_builtins();
        for method in ["required", "optional", "nullable", "min", "max", "email", "refine"] {
            assert!(registry.has_method(method), "missing `{method}`");
        }
    }
}
