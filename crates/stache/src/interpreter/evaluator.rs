//! Tree-walking evaluation of template ASTs.
//!
//! Every node renders to a string against a [`Context`]; blocks concatenate
//! the output of their items in order. Rendering never mutates the AST, so a
//! parsed template can be rendered any number of times. The only write to the
//! context made here is the argument binding of `{{> partial key=value}}`.

use crate::interpreter::registry::HELPER_MISSING;
use crate::interpreter::{Context, PartialScope, RenderError};
use crate::parser::ast::{
    AsHelperCall, Block, HelperCall, Node, Parameter, PartialCall, Replacement,
};
use crate::types::Value;

impl Block {
    /// Render every item in order and concatenate the results.
    ///
    /// Helpers call this to render the blocks they are given, usually after
    /// pushing a scope with their own bindings.
    pub fn render(&self, ctx: &mut dyn Context) -> Result<String, RenderError> {
        ctx.enter_block()?;
        let output = self.render_items(ctx);
        ctx.exit_block();
        output
    }

    fn render_items(&self, ctx: &mut dyn Context) -> Result<String, RenderError> {
        let mut output = String::new();
        for item in &self.items {
            output.push_str(&item.render(ctx)?);
        }
        Ok(output)
    }
}

impl Node {
    pub fn render(&self, ctx: &mut dyn Context) -> Result<String, RenderError> {
        match self {
            Node::TemplateContent(text) | Node::StringLiteral(text) => Ok(text.clone()),
            Node::Replacement(replacement) => render_replacement(replacement, ctx),
            Node::EscapedReplacement(replacement) => {
                let output = render_replacement(replacement, ctx)?;
                Ok(ctx.escaper().escape(&output))
            }
            Node::Helper(call) => render_helper(call, ctx),
            Node::EscapedHelper(call) => {
                let output = render_helper(call, ctx)?;
                Ok(ctx.escaper().escape(&output))
            }
            Node::AsHelper(call) => render_as_helper(call, ctx),
            Node::Partial(call) => render_partial(call, ctx),
            Node::PartialWithArgs(call) => render_partial_with_args(call, ctx),
            Node::Block(block) => block.render(ctx),
        }
    }
}

impl Parameter {
    /// Resolve this parameter to a value: paths are looked up in the
    /// context, nested nodes are rendered to a string.
    pub fn evaluate(&self, ctx: &mut dyn Context) -> Result<Value, RenderError> {
        match self {
            Parameter::Path(path) => Ok(ctx.get(path)),
            Parameter::Node(node) => node.render(ctx).map(Value::String),
        }
    }

    /// Resolve this parameter and convert the result to a string.
    pub fn render(&self, ctx: &mut dyn Context) -> Result<String, RenderError> {
        match self {
            Parameter::Path(path) => Ok(ctx.get(path).to_string()),
            Parameter::Node(node) => node.render(ctx),
        }
    }
}

/// A registered helper named like the path wins over the variable.
fn render_replacement(
    replacement: &Replacement,
    ctx: &mut dyn Context,
) -> Result<String, RenderError> {
    let output = match ctx.get_helper(&replacement.path) {
        Some(helper) => {
            tracing::trace!(helper = %replacement.path, "calling value helper");
            helper.apply(ctx, &[], None, None)?
        }
        None => ctx.get(&replacement.path).to_string(),
    };
    Ok(replacement.trim.apply(output))
}

/// Trim markers apply to inline helpers only; block output is returned as the
/// helper produced it.
fn render_helper(call: &HelperCall, ctx: &mut dyn Context) -> Result<String, RenderError> {
    let output = match ctx.get_helper(&call.name) {
        Some(helper) => {
            tracing::trace!(helper = %call.name, params = call.params.len(), "calling helper");
            helper.apply(ctx, &call.params, call.block.as_ref(), call.else_block.as_ref())?
        }
        None => helper_missing(&call.name, ctx)?,
    };
    if call.block.is_some() {
        return Ok(output);
    }
    Ok(call.trim.apply(output))
}

/// Block-parameter helpers have their own namespace but share the plain
/// `helperMissing` fallback. Their trim markers are not applied.
fn render_as_helper(call: &AsHelperCall, ctx: &mut dyn Context) -> Result<String, RenderError> {
    match ctx.get_as_helper(&call.name) {
        Some(helper) => {
            tracing::trace!(helper = %call.name, block_params = ?call.block_params, "calling as-helper");
            helper.apply_as(
                ctx,
                &call.params,
                &call.block_params,
                Some(&call.block),
                call.else_block.as_ref(),
            )
        }
        None => helper_missing(&call.name, ctx),
    }
}

/// Invoke `helperMissing` with the unknown name as its only parameter.
fn helper_missing(name: &str, ctx: &mut dyn Context) -> Result<String, RenderError> {
    tracing::warn!(helper = name, "helper not registered, calling {HELPER_MISSING}");
    let fallback = ctx
        .get_helper(HELPER_MISSING)
        .ok_or_else(|| RenderError::HelperMissingNotRegistered {
            name: name.to_string(),
        })?;
    fallback.apply(ctx, &[Parameter::literal(name)], None, None)
}

fn render_partial(call: &PartialCall, ctx: &mut dyn Context) -> Result<String, RenderError> {
    let partial = ctx
        .get_partial(&call.name)
        .ok_or_else(|| RenderError::PartialNotFound {
            name: call.name.clone(),
        })?;
    tracing::trace!(partial = %call.name, "rendering partial");
    let output = partial.call_with_context(ctx)?;
    Ok(call.trim.apply(output))
}

/// Bind each argument, evaluated against the caller's context, then render
/// the partial. Later arguments see the bindings of earlier ones.
fn render_partial_with_args(
    call: &PartialCall,
    ctx: &mut dyn Context,
) -> Result<String, RenderError> {
    let isolated = ctx.partial_scope() == PartialScope::Isolated;
    if isolated {
        ctx.push_scope();
    }
    let output = bind_arguments(call, ctx).and_then(|()| render_partial(call, ctx));
    if isolated {
        ctx.pop_scope();
    }
    output
}

fn bind_arguments(call: &PartialCall, ctx: &mut dyn Context) -> Result<(), RenderError> {
    for argument in &call.args {
        let value = argument.value.evaluate(ctx)?;
        ctx.add_item(&argument.key, value);
    }
    Ok(())
}
