// Rule lookup tables

use crate::{Arg, Valid};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registered predicate.
pub type RuleFn = Arc<dyn Fn(&[Arg]) -> bool + Send + Sync>;

static DEFAULT_REGISTRY: Lazy<Arc<RuleRegistry>> = Lazy::new(|| Arc::new(RuleRegistry::default()));

/// Named functions and class methods that rules resolve to.
///
/// `RuleRegistry::default()` holds the [`Valid`] helper class; start from
/// [`RuleRegistry::empty`] to opt out of it.
#[derive(Clone)]
pub struct RuleRegistry {
    functions: HashMap<String, RuleFn>,
    classes: HashMap<String, HashMap<String, RuleFn>>,
}

impl RuleRegistry {
    /// Registry with nothing in it.
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
            classes: HashMap::new(),
        }
    }

    /// Process-wide default registry.
    pub fn shared() -> Arc<RuleRegistry> {
        Arc::clone(&DEFAULT_REGISTRY)
    }

    /// Add a free function.
    pub fn function<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Arg]) -> bool + Send + Sync + 'static,
    {
        self.register_function(name, f);
        self
    }

    /// Add a method to `class`, creating the class when needed.
    pub fn method<F>(mut self, class: impl Into<String>, method: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Arg]) -> bool + Send + Sync + 'static,
    {
        self.register_method(class, method, f);
        self
    }

    pub fn register_function<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Arg]) -> bool + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(f));
    }

    pub fn register_method<F>(&mut self, class: impl Into<String>, method: impl Into<String>, f: F)
    where
        F: Fn(&[Arg]) -> bool + Send + Sync + 'static,
    {
        self.classes
            .entry(class.into())
            .or_default()
            .insert(method.into(), Arc::new(f));
    }

    pub fn get_function(&self, name: &str) -> Option<&RuleFn> {
        self.functions.get(name)
    }

    pub fn get_method(&self, class: &str, method: &str) -> Option<&RuleFn> {
        self.classes.get(class)?.get(method)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        Valid::register(&mut registry);
        registry
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<&String> = self.functions.keys().collect();
        functions.sort();
        let mut classes: Vec<&String> = self.classes.keys().collect();
        classes.sort();

        f.debug_struct("RuleRegistry")
            .field("functions", &functions)
            .field("classes", &classes)
            .finish()
    }
}
