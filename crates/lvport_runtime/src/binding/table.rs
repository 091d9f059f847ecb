//! Binding table
//!
//! Maps `namespace.name` to the native operation behind it. Namespaces are
//! driver modules (`SDL`, `lcd`, ...) or widget classes (`label`, ...). A
//! widget namespace can inherit from another one, so every class sees the
//! base `obj` functions.
//!
//! Native functions that cannot be marshalled are still registered, as
//! [`Binding::Unsupported`] with the reason, so a script gets a clear error
//! instead of a missing attribute.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::value::ScriptValue;
use crate::error::{BindingError, BindingResult};

/// Handler function type for bound calls
///
/// `C` is the binding context (engine backend, handle arena, drivers).
pub type Handler<C> = Arc<dyn Fn(&mut C, &[ScriptValue]) -> BindingResult<ScriptValue> + Send + Sync>;

/// One entry of a namespace
pub enum Binding<C> {
    /// Callable function
    Supported(Handler<C>),
    /// Known native function that is not exposed
    Unsupported(&'static str),
    /// Constant attribute (enum values, driver callback tokens)
    Value(ScriptValue),
}

impl<C> Clone for Binding<C> {
    fn clone(&self) -> Self {
        match self {
            Binding::Supported(h) => Binding::Supported(Arc::clone(h)),
            Binding::Unsupported(reason) => Binding::Unsupported(*reason),
            Binding::Value(v) => Binding::Value(v.clone()),
        }
    }
}

impl<C> fmt::Debug for Binding<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Supported(_) => write!(f, "Supported(..)"),
            Binding::Unsupported(reason) => f.debug_tuple("Unsupported").field(reason).finish(),
            Binding::Value(v) => f.debug_tuple("Value").field(v).finish(),
        }
    }
}

struct Namespace<C> {
    entries: HashMap<String, Binding<C>>,
    parent: Option<String>,
}

/// Registry of everything a script can reach
pub struct BindingTable<C> {
    namespaces: HashMap<String, Namespace<C>>,
}

impl<C> Default for BindingTable<C> {
    fn default() -> Self {
        Self {
            namespaces: HashMap::new(),
        }
    }
}

impl<C> BindingTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    fn namespace_mut(&mut self, namespace: &str) -> &mut Namespace<C> {
        self.namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| Namespace {
                entries: HashMap::new(),
                parent: None,
            })
    }

    /// Register a callable function
    pub fn register<F>(&mut self, namespace: &str, name: &str, handler: F)
    where
        F: Fn(&mut C, &[ScriptValue]) -> BindingResult<ScriptValue> + Send + Sync + 'static,
    {
        self.namespace_mut(namespace)
            .entries
            .insert(name.to_string(), Binding::Supported(Arc::new(handler)));
    }

    /// Register a native function that scripts cannot call
    pub fn register_unsupported(&mut self, namespace: &str, name: &str, reason: &'static str) {
        self.namespace_mut(namespace)
            .entries
            .insert(name.to_string(), Binding::Unsupported(reason));
    }

    /// Register a constant attribute
    pub fn register_value(&mut self, namespace: &str, name: &str, value: ScriptValue) {
        self.namespace_mut(namespace)
            .entries
            .insert(name.to_string(), Binding::Value(value));
    }

    /// Make names missing from `namespace` resolve in `parent`
    pub fn inherit(&mut self, namespace: &str, parent: &str) {
        self.namespace_mut(parent);
        self.namespace_mut(namespace).parent = Some(parent.to_string());
    }

    /// Remove an entry from `namespace` (not from its parents)
    pub fn unregister(&mut self, namespace: &str, name: &str) -> bool {
        self.namespaces
            .get_mut(namespace)
            .is_some_and(|ns| ns.entries.remove(name).is_some())
    }

    /// Look up an entry, following inheritance
    pub fn get(&self, namespace: &str, name: &str) -> Option<&Binding<C>> {
        let mut current = self.namespaces.get(namespace);
        // Bounded walk in case of an inheritance cycle
        for _ in 0..=self.namespaces.len() {
            let ns = current?;
            if let Some(binding) = ns.entries.get(name) {
                return Some(binding);
            }
            current = ns.parent.as_deref().and_then(|p| self.namespaces.get(p));
        }
        None
    }

    /// Call `namespace.name` with `args`
    pub fn call(
        &self,
        ctx: &mut C,
        namespace: &str,
        name: &str,
        args: &[ScriptValue],
    ) -> BindingResult<ScriptValue> {
        match self.get(namespace, name) {
            Some(Binding::Supported(handler)) => handler(ctx, args),
            Some(Binding::Unsupported(reason)) => Err(BindingError::Unsupported {
                namespace: namespace.to_string(),
                name: name.to_string(),
                reason: *reason,
            }),
            Some(Binding::Value(value)) => Err(BindingError::TypeMismatch {
                expected: "function",
                actual: value.type_name(),
            }),
            None => Err(BindingError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Read a constant attribute
    pub fn attr(&self, namespace: &str, name: &str) -> BindingResult<ScriptValue> {
        match self.get(namespace, name) {
            Some(Binding::Value(value)) => Ok(value.clone()),
            Some(Binding::Supported(_)) | Some(Binding::Unsupported(_)) => {
                Err(BindingError::TypeMismatch {
                    expected: "attribute",
                    actual: "function",
                })
            }
            None => Err(BindingError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
        }
    }

    pub fn is_supported(&self, namespace: &str, name: &str) -> bool {
        matches!(self.get(namespace, name), Some(Binding::Supported(_)))
    }

    /// Callable functions of a namespace, inherited ones included, sorted
    pub fn functions(&self, namespace: &str) -> Vec<&str> {
        self.collect(namespace, |b| matches!(b, Binding::Supported(_)))
    }

    /// Registered but unsupported functions of a namespace, sorted
    pub fn unsupported(&self, namespace: &str) -> Vec<(&str, &'static str)> {
        self.collect(namespace, |b| matches!(b, Binding::Unsupported(_)))
            .into_iter()
            .filter_map(|name| match self.get(namespace, name) {
                Some(Binding::Unsupported(reason)) => Some((name, *reason)),
                _ => None,
            })
            .collect()
    }

    fn collect(&self, namespace: &str, keep: impl Fn(&Binding<C>) -> bool) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let mut current = self.namespaces.get(namespace);
        for _ in 0..=self.namespaces.len() {
            let Some(ns) = current else { break };
            for (name, binding) in &ns.entries {
                // Entries shadowed by a closer namespace are skipped
                let visible = self
                    .get(namespace, name)
                    .is_some_and(|b| std::ptr::eq(b, binding));
                if visible && keep(binding) {
                    names.push(name);
                }
            }
            current = ns.parent.as_deref().and_then(|p| self.namespaces.get(p));
        }
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Registered namespace names, sorted
    pub fn namespaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.namespaces.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<C> fmt::Debug for BindingTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingTable")
            .field("namespaces", &self.namespaces())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::convert::{arg, check_arity};

    #[derive(Default)]
    struct Counter {
        total: i64,
    }

    fn table() -> BindingTable<Counter> {
        let mut table = BindingTable::new();
        table.register("math", "add", |ctx: &mut Counter, args: &[ScriptValue]| {
            check_arity("add", args, 1..=1)?;
            ctx.total += arg::<i64>(args, 0)?;
            Ok(ScriptValue::Int(ctx.total))
        });
        table.register_unsupported("math", "map", "needs a script callback");
        table.register_value("math", "ZERO", ScriptValue::Int(0));
        table.register("base", "hello", |_: &mut Counter, _: &[ScriptValue]| {
            Ok(ScriptValue::Str("hi".into()))
        });
        table.inherit("math", "base");
        table
    }

    #[test]
    fn test_call_dispatches_to_handler() {
        let table = table();
        let mut ctx = Counter::default();
        table.call(&mut ctx, "math", "add", &[ScriptValue::Int(2)]).unwrap();
        let v = table.call(&mut ctx, "math", "add", &[ScriptValue::Int(3)]).unwrap();
        assert_eq!(v, ScriptValue::Int(5));
    }

    #[test]
    fn test_unsupported_and_missing() {
        let table = table();
        let mut ctx = Counter::default();
        assert_eq!(
            table.call(&mut ctx, "math", "map", &[]),
            Err(BindingError::Unsupported {
                namespace: "math".into(),
                name: "map".into(),
                reason: "needs a script callback",
            })
        );
        assert!(matches!(
            table.call(&mut ctx, "math", "sub", &[]),
            Err(BindingError::NotFound { .. })
        ));
        assert!(matches!(
            table.call(&mut ctx, "nope", "add", &[]),
            Err(BindingError::NotFound { .. })
        ));
    }

    #[test]
    fn test_inheritance_and_listing() {
        let table = table();
        let mut ctx = Counter::default();
        assert_eq!(
            table.call(&mut ctx, "math", "hello", &[]),
            Ok(ScriptValue::Str("hi".into()))
        );
        assert_eq!(table.functions("math"), vec!["add", "hello"]);
        assert_eq!(table.functions("base"), vec!["hello"]);
        assert_eq!(table.unsupported("math"), vec![("map", "needs a script callback")]);
        assert_eq!(table.namespaces(), vec!["base", "math"]);
    }

    #[test]
    fn test_attributes() {
        let table = table();
        assert_eq!(table.attr("math", "ZERO"), Ok(ScriptValue::Int(0)));
        assert!(table.attr("math", "add").is_err());
        let mut ctx = Counter::default();
        assert!(table.call(&mut ctx, "math", "ZERO", &[]).is_err());
    }
}
