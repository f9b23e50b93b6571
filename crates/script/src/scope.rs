//! Layered variable bindings.
//!
//! A [`Scope`] is a writable local layer over an optional frozen parent layer.
//! Assignments always land in the local layer, so rebinding a name never leaks
//! into the parent. Values themselves are shared, though: a list reached
//! through the parent is the same list, and `append` on it is seen everywhere.
use std::collections::HashMap;
use std::rc::Rc;

use svglabel_units::{LengthDimension, LengthUnit};

use crate::value::{HostValue, Value};

pub type Bindings<H> = HashMap<String, Value<H>>;

#[derive(Debug, Clone)]
pub struct Scope<H: HostValue> {
    parent: Option<Rc<Bindings<H>>>,
    local: Bindings<H>,
}

impl<H: HostValue> Default for Scope<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostValue> Scope<H> {
    /// An empty scope with no parent.
    pub fn new() -> Self {
        Self {
            parent: None,
            local: HashMap::new(),
        }
    }

    /// A fresh local layer over frozen bindings.
    pub fn over(parent: Rc<Bindings<H>>) -> Self {
        Self {
            parent: Some(parent),
            local: HashMap::new(),
        }
    }

    /// An empty scope holding the unit constants `inch`, `mm`, `cm`, `pt` and `px`.
    pub fn with_prelude() -> Self {
        let mut scope = Self::new();
        for unit in LengthUnit::ALL {
            scope.set(
                unit.script_name(),
                Value::Length(LengthDimension::new(1.0, unit)),
            );
        }
        scope
    }

    pub fn get(&self, name: &str) -> Option<&Value<H>> {
        self.local
            .get(name)
            .or_else(|| self.parent.as_ref().and_then(|p| p.get(name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value<H>) {
        self.local.insert(name.into(), value);
    }

    /// Collapses both layers into one shareable, read-only binding set.
    pub fn freeze(self) -> Rc<Bindings<H>> {
        match self.parent {
            None => Rc::new(self.local),
            Some(parent) if self.local.is_empty() => parent,
            Some(parent) => {
                let mut merged = (*parent).clone();
                merged.extend(self.local);
                Rc::new(merged)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NoHost;

    #[test]
    fn test_prelude_binds_units() {
        let scope: Scope<NoHost> = Scope::with_prelude();
        assert_eq!(
            scope.get("mm"),
            Some(&Value::Length(LengthDimension::new(
                1.0,
                LengthUnit::Millimeter
            )))
        );
        assert!(scope.contains("inch"));
        assert!(!scope.contains("in"));
    }

    #[test]
    fn test_local_rebinding_does_not_leak() {
        let mut global: Scope<NoHost> = Scope::new();
        global.set("x", Value::Number(1.0));
        let frozen = global.freeze();

        let mut row = Scope::over(frozen.clone());
        assert_eq!(row.get("x"), Some(&Value::Number(1.0)));
        row.set("x", Value::Number(2.0));
        assert_eq!(row.get("x"), Some(&Value::Number(2.0)));

        let other = Scope::over(frozen);
        assert_eq!(other.get("x"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_freeze_merges_layers() {
        let mut base: Scope<NoHost> = Scope::new();
        base.set("a", Value::Number(1.0));
        let mut layer = Scope::over(base.freeze());
        layer.set("b", Value::Number(2.0));
        let merged = layer.freeze();
        assert_eq!(merged.len(), 2);
    }
}
