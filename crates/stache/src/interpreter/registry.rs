//! Registry of helpers, block-parameter helpers, partials, and the escaper.

use std::collections::HashMap;
use std::sync::Arc;

use crate::interpreter::escape::{Escaper, HtmlEscaper};
use crate::interpreter::helpers::{AsHelper, Helper, Partial};
use crate::interpreter::{Context, RenderError};
use crate::parser::ParseError;
use crate::parser::ast::{Block, Parameter};
use crate::template::Template;

/// Name of the helper invoked when a helper lookup fails.
pub const HELPER_MISSING: &str = "helperMissing";

/// Everything a render context resolves by name.
///
/// Plain helpers and block-parameter helpers live in separate namespaces: a
/// `{{#each items as |item|}}` block only finds helpers registered with
/// [`Registry::register_as_helper`]. A registry is immutable during rendering
/// and can be shared between concurrent renders.
///
/// # Example
///
/// ```
/// use stache::{Registry, Template};
///
/// let mut registry = Registry::new();
/// registry.register_helper("shout", |ctx, params, _, _| {
///     let text = params.first().map(|p| p.render(ctx)).transpose()?;
///     Ok(text.unwrap_or_default().to_uppercase())
/// });
///
/// let template = Template::compile("{{shout name}}!").unwrap();
/// let out = template.render_with(&registry, stache::data! { "name" => "hey" }).unwrap();
/// assert_eq!(out, "HEY!");
/// ```
pub struct Registry {
    helpers: HashMap<String, Arc<dyn Helper>>,
    as_helpers: HashMap<String, Arc<dyn AsHelper>>,
    partials: HashMap<String, Arc<dyn Partial>>,
    escaper: Arc<dyn Escaper>,
}

impl Registry {
    /// Create an empty registry that escapes output as HTML.
    pub fn new() -> Self {
        Self {
            helpers: HashMap::new(),
            as_helpers: HashMap::new(),
            partials: HashMap::new(),
            escaper: Arc::new(HtmlEscaper),
        }
    }

    /// Replace the escaper used by `{{...}}` tags.
    pub fn with_escaper(mut self, escaper: impl Escaper + 'static) -> Self {
        self.escaper = Arc::new(escaper);
        self
    }

    /// Replace the escaper in place.
    pub fn set_escaper(&mut self, escaper: impl Escaper + 'static) {
        self.escaper = Arc::new(escaper);
    }

    /// The escaper applied to `{{...}}` output.
    pub fn escaper(&self) -> &dyn Escaper {
        self.escaper.as_ref()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Register a helper closure, replacing any helper of the same name.
    pub fn register_helper<F>(&mut self, name: impl Into<String>, helper: F)
    where
        F: Fn(&mut dyn Context, &[Parameter], Option<&Block>, Option<&Block>) -> Result<String, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.insert_helper(name, Arc::new(helper));
    }

    /// Register a helper implemented as a type.
    pub fn insert_helper(&mut self, name: impl Into<String>, helper: Arc<dyn Helper>) {
        self.helpers.insert(name.into(), helper);
    }

    /// Look up a plain helper by name.
    pub fn get_helper(&self, name: &str) -> Option<Arc<dyn Helper>> {
        self.helpers.get(name).cloned()
    }

    /// Whether a plain helper named `name` is registered.
    pub fn has_helper(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    /// Register a block-parameter helper closure.
    pub fn register_as_helper<F>(&mut self, name: impl Into<String>, helper: F)
    where
        F: Fn(
                &mut dyn Context,
                &[Parameter],
                &[String],
                Option<&Block>,
                Option<&Block>,
            ) -> Result<String, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.insert_as_helper(name, Arc::new(helper));
    }

    /// Register a block-parameter helper implemented as a type.
    pub fn insert_as_helper(&mut self, name: impl Into<String>, helper: Arc<dyn AsHelper>) {
        self.as_helpers.insert(name.into(), helper);
    }

    /// Look up a block-parameter helper by name. Plain helpers are not consulted.
    pub fn get_as_helper(&self, name: &str) -> Option<Arc<dyn AsHelper>> {
        self.as_helpers.get(name).cloned()
    }

    // =========================================================================
    // Partials
    // =========================================================================

    /// Register a partial, replacing any partial of the same name.
    pub fn register_partial(&mut self, name: impl Into<String>, partial: impl Partial + 'static) {
        self.partials.insert(name.into(), Arc::new(partial));
    }

    /// Compile `source` and register it as a partial.
    pub fn register_partial_str(
        &mut self,
        name: impl Into<String>,
        source: &str,
    ) -> Result<(), ParseError> {
        let template = Template::compile(source)?;
        self.register_partial(name, template);
        Ok(())
    }

    /// Look up a partial by name.
    pub fn get_partial(&self, name: &str) -> Option<Arc<dyn Partial>> {
        self.partials.get(name).cloned()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
