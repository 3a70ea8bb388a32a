//! Extension points called by the evaluator.
//!
//! Helpers, block-parameter helpers, and partials are supplied by the host.
//! Each trait is implemented for plain closures of the matching shape, so
//! most hosts never name these traits directly.

use crate::interpreter::{Context, RenderError};
use crate::parser::ast::{Block, Parameter};

/// A named helper: `{{name a b}}`, `{{{name a b}}}`, `(name a b)`, or
/// `{{#name a b}}...{{/name}}`.
///
/// Parameters are passed unevaluated; call [`Parameter::evaluate`] or
/// [`Parameter::render`] to resolve them against the context. Block helpers
/// receive their body and optional else body, and decide how often and
/// against what context to render them.
pub trait Helper: Send + Sync {
    fn apply(
        &self,
        ctx: &mut dyn Context,
        params: &[Parameter],
        block: Option<&Block>,
        else_block: Option<&Block>,
    ) -> Result<String, RenderError>;
}

impl<F> Helper for F
where
    F: Fn(&mut dyn Context, &[Parameter], Option<&Block>, Option<&Block>) -> Result<String, RenderError>
        + Send
        + Sync,
{
    fn apply(
        &self,
        ctx: &mut dyn Context,
        params: &[Parameter],
        block: Option<&Block>,
        else_block: Option<&Block>,
    ) -> Result<String, RenderError> {
        self(ctx, params, block, else_block)
    }
}

/// A block helper with block parameters: `{{#name a as |x y|}}...{{/name}}`.
///
/// The helper binds `block_params` itself, typically with
/// [`Context::add_item`] inside a scope it pushes.
pub trait AsHelper: Send + Sync {
    fn apply_as(
        &self,
        ctx: &mut dyn Context,
        params: &[Parameter],
        block_params: &[String],
        block: Option<&Block>,
        else_block: Option<&Block>,
    ) -> Result<String, RenderError>;
}

impl<F> AsHelper for F
where
    F: Fn(
            &mut dyn Context,
            &[Parameter],
            &[String],
            Option<&Block>,
            Option<&Block>,
        ) -> Result<String, RenderError>
        + Send
        + Sync,
{
    fn apply_as(
        &self,
        ctx: &mut dyn Context,
        params: &[Parameter],
        block_params: &[String],
        block: Option<&Block>,
        else_block: Option<&Block>,
    ) -> Result<String, RenderError> {
        self(ctx, params, block_params, block, else_block)
    }
}

/// A named partial: `{{> name}}`.
pub trait Partial: Send + Sync {
    fn call_with_context(&self, ctx: &mut dyn Context) -> Result<String, RenderError>;
}

impl<F> Partial for F
where
    F: Fn(&mut dyn Context) -> Result<String, RenderError> + Send + Sync,
{
    fn call_with_context(&self, ctx: &mut dyn Context) -> Result<String, RenderError> {
        self(ctx)
    }
}
