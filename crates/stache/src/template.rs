//! Compiled templates.

use crate::interpreter::{Context, Partial, Registry, RenderError, SimpleContext};
use crate::parser::{Block, ParseError, parse_template};
use crate::types::Value;

/// A parsed template, ready to render any number of times.
///
/// A `Template` is also a [`Partial`], so it can be registered by name and
/// included from other templates with `{{> name}}`.
///
/// # Example
///
/// ```
/// use stache::{Registry, Template};
///
/// let template = Template::compile("Hello {{name}}!").unwrap();
/// let registry = Registry::new();
/// let out = template
///     .render_with(&registry, stache::data! { "name" => "<World>" })
///     .unwrap();
/// assert_eq!(out, "Hello &lt;World&gt;!");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    root: Block,
}

impl Template {
    pub fn compile(source: &str) -> Result<Self, ParseError> {
        parse_template(source).map(|root| Self { root })
    }

    pub fn root(&self) -> &Block {
        &self.root
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn render(&self, ctx: &mut dyn Context) -> Result<String, RenderError> {
        self.root.render(ctx)
    }

    /// Render against `data` with a default [`SimpleContext`].
    pub fn render_with(
        &self,
        registry: &Registry,
        data: impl Into<Value>,
    ) -> Result<String, RenderError> {
        let mut ctx = SimpleContext::new(registry, data);
        self.render(&mut ctx)
    }
}

impl From<Block> for Template {
    fn from(root: Block) -> Self {
        Self { root }
    }
}

impl Partial for Template {
    fn call_with_context(&self, ctx: &mut dyn Context) -> Result<String, RenderError> {
        self.root.render(ctx)
    }
}
