//! Render context: the only mutable state touched while rendering.

use std::collections::BTreeMap;
use std::sync::Arc;

use bon::Builder;

use crate::interpreter::escape::Escaper;
use crate::interpreter::helpers::{AsHelper, Helper, Partial};
use crate::interpreter::{RenderError, Registry};
use crate::parser::DEFAULT_MAX_DEPTH;
use crate::types::Value;

/// How `{{> name key=value}}` binds its arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartialScope {
    /// Bind arguments in a child scope that is dropped after the partial
    /// renders.
    #[default]
    Isolated,
    /// Bind arguments in the caller's current scope, where they remain
    /// visible after the partial returns.
    Shared,
}

/// Capabilities the evaluator needs from its host.
///
/// The evaluator passes the context by `&mut` through every render call.
/// Helpers receive the same context and may push scopes, bind variables, and
/// render blocks against it.
pub trait Context {
    /// Resolve a dotted variable path. Missing variables resolve to
    /// [`Value::Null`].
    fn get(&self, path: &str) -> Value;

    fn get_helper(&self, name: &str) -> Option<Arc<dyn Helper>>;

    /// Look up a block-parameter helper. These are registered separately
    /// from plain helpers.
    fn get_as_helper(&self, name: &str) -> Option<Arc<dyn AsHelper>>;

    fn get_partial(&self, name: &str) -> Option<Arc<dyn Partial>>;

    /// Bind a variable in the innermost scope.
    fn add_item(&mut self, key: &str, value: Value);

    fn escaper(&self) -> &dyn Escaper;

    /// Open a child scope. Bindings made until the matching
    /// [`pop_scope`](Context::pop_scope) shadow outer ones.
    fn push_scope(&mut self);

    fn pop_scope(&mut self);

    fn partial_scope(&self) -> PartialScope {
        PartialScope::Isolated
    }

    /// Called before a block renders. Returns an error once nesting exceeds
    /// the context's limit.
    fn enter_block(&mut self) -> Result<(), RenderError>;

    fn exit_block(&mut self);
}

/// A [`Context`] over a [`Registry`] and a tree of [`Value`]s.
///
/// Variables resolve through the scope stack, innermost first, and then
/// against the root data.
///
/// # Example
///
/// ```
/// use stache::{Context, PartialScope, Registry, SimpleContext, Value};
///
/// let registry = Registry::new();
/// let mut ctx = SimpleContext::builder()
///     .registry(&registry)
///     .data(stache::data! { "user" => stache::data! { "name" => "Ada" } })
///     .partial_scope(PartialScope::Shared)
///     .build();
///
/// assert_eq!(ctx.get("user.name"), Value::from("Ada"));
/// ctx.add_item("user", Value::from("shadowed"));
/// assert_eq!(ctx.get("user"), Value::from("shadowed"));
/// ```
#[derive(Builder)]
pub struct SimpleContext<'r> {
    registry: &'r Registry,

    /// Root data that paths resolve against.
    #[builder(default, into)]
    data: Value,

    /// Maximum nesting of rendered blocks and partials (default 64).
    #[builder(default = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[builder(default)]
    partial_scope: PartialScope,

    /// Binding scopes, innermost last. Never empty.
    #[builder(skip = vec![BTreeMap::new()])]
    scopes: Vec<BTreeMap<String, Value>>,

    #[builder(skip)]
    depth: usize,
}

impl<'r> SimpleContext<'r> {
    /// Create a context with default settings.
    pub fn new(registry: &'r Registry, data: impl Into<Value>) -> Self {
        SimpleContext::builder()
            .registry(registry)
            .data(data)
            .build()
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Current block nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of open scopes, including the root scope.
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Context for SimpleContext<'_> {
    fn get(&self, path: &str) -> Value {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let bound = self.scopes.iter().rev().find_map(|scope| scope.get(head));
        let found = match (bound, rest) {
            (Some(value), Some(rest)) => value.lookup(rest),
            (Some(value), None) => Some(value),
            (None, _) => self.data.lookup(path),
        };
        found.cloned().unwrap_or_default()
    }

    fn get_helper(&self, name: &str) -> Option<Arc<dyn Helper>> {
        self.registry.get_helper(name)
    }

    fn get_as_helper(&self, name: &str) -> Option<Arc<dyn AsHelper>> {
        self.registry.get_as_helper(name)
    }

    fn get_partial(&self, name: &str) -> Option<Arc<dyn Partial>> {
        self.registry.get_partial(name)
    }

    fn add_item(&mut self, key: &str, value: Value) {
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(key.to_string(), value);
            }
            None => self
                .scopes
                .push(BTreeMap::from([(key.to_string(), value)])),
        }
    }

    fn escaper(&self) -> &dyn Escaper {
        self.registry.escaper()
    }

    fn push_scope(&mut self) {
        self.scopes.push(BTreeMap::new());
    }

    fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    fn partial_scope(&self) -> PartialScope {
        self.partial_scope
    }

    fn enter_block(&mut self) -> Result<(), RenderError> {
        if self.depth >= self.max_depth {
            return Err(RenderError::MaxDepthExceeded {
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn exit_block(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
