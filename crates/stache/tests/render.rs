//! Integration tests for rendering templates

use std::sync::{Arc, Mutex};

use serde_json::json;
use stache::{
    Block, Context, NoEscape, Parameter, Registry, RenderError, SimpleContext, Template, Value,
    data, parse, render, render_template,
};

fn render_str(source: &str, registry: &Registry, data: Value) -> String {
    Template::compile(source)
        .unwrap()
        .render_with(registry, data)
        .unwrap()
}

fn json_data(value: serde_json::Value) -> Value {
    serde_json::from_value(value).unwrap()
}

/// `{{#if cond}}...{{else}}...{{/if}}`
fn if_helper(
    ctx: &mut dyn Context,
    params: &[Parameter],
    block: Option<&Block>,
    else_block: Option<&Block>,
) -> Result<String, RenderError> {
    let truthy = match params.first() {
        Some(param) => param.evaluate(ctx)?.is_truthy(),
        None => false,
    };
    let chosen = if truthy { block } else { else_block };
    chosen.map_or(Ok(String::new()), |b| b.render(ctx))
}

/// `{{#each items}}{{this}}{{/each}}`, binding each item as `this`.
fn each_helper(
    ctx: &mut dyn Context,
    params: &[Parameter],
    block: Option<&Block>,
    else_block: Option<&Block>,
) -> Result<String, RenderError> {
    let items = match params.first() {
        Some(param) => param.evaluate(ctx)?,
        None => Value::Null,
    };
    let items = items.as_list().map(<[Value]>::to_vec).unwrap_or_default();
    if items.is_empty() {
        return else_block.map_or(Ok(String::new()), |b| b.render(ctx));
    }
    let mut output = String::new();
    for item in items {
        ctx.push_scope();
        ctx.add_item("this", item);
        let rendered = block.map_or(Ok(String::new()), |b| b.render(ctx));
        ctx.pop_scope();
        output.push_str(&rendered?);
    }
    Ok(output)
}

/// `{{#each items as |item index|}}`
fn each_as_helper(
    ctx: &mut dyn Context,
    params: &[Parameter],
    block_params: &[String],
    block: Option<&Block>,
    else_block: Option<&Block>,
) -> Result<String, RenderError> {
    let items = match params.first() {
        Some(param) => param.evaluate(ctx)?,
        None => Value::Null,
    };
    let items = items.as_list().map(<[Value]>::to_vec).unwrap_or_default();
    if items.is_empty() {
        return else_block.map_or(Ok(String::new()), |b| b.render(ctx));
    }
    let mut output = String::new();
    for (index, item) in items.into_iter().enumerate() {
        ctx.push_scope();
        if let Some(name) = block_params.first() {
            ctx.add_item(name, item);
        }
        if let Some(name) = block_params.get(1) {
            ctx.add_item(name, Value::from(index));
        }
        let rendered = block.map_or(Ok(String::new()), |b| b.render(ctx));
        ctx.pop_scope();
        output.push_str(&rendered?);
    }
    Ok(output)
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_helper("if", if_helper);
    registry.register_helper("each", each_helper);
    registry.register_as_helper("each", each_as_helper);
    registry
}

// =============================================================================
// Replacements
// =============================================================================

#[test]
fn test_plain_text() {
    assert_eq!(render_str("Ho hi !", &Registry::new(), data! {}), "Ho hi !");
    assert_eq!(render_str("", &Registry::new(), data! {}), "");
}

#[test]
fn test_replacement() {
    let out = render_str("{{x}}", &Registry::new(), data! { "x" => "v" });
    assert_eq!(out, "v");
}

#[test]
fn test_replacement_is_escaped() {
    let out = render_str("{{x}}", &Registry::new(), data! { "x" => "<" });
    assert_eq!(out, "&lt;");
}

#[test]
fn test_triple_braces_are_raw() {
    let out = render_str("{{{x}}}", &Registry::new(), data! { "x" => "<b>" });
    assert_eq!(out, "<b>");
}

#[test]
fn test_custom_escaper() {
    let registry = Registry::new().with_escaper(NoEscape);
    let out = render_str("{{x}}", &registry, data! { "x" => "<b>" });
    assert_eq!(out, "<b>");
}

#[test]
fn test_missing_variable_renders_empty() {
    let out = render_str("[{{nothing.here}}]", &Registry::new(), data! {});
    assert_eq!(out, "[]");
}

#[test]
fn test_dotted_path_and_values() {
    let data = json_data(json!({
        "person": { "name": "Ada", "age": 36, "tags": ["a", "b"], "admin": true }
    }));
    let out = render_str(
        "{{person.name}} {{person.age}} {{person.tags}} {{person.tags.1}} {{person.admin}}",
        &Registry::new(),
        data,
    );
    assert_eq!(out, "Ada 36 a,b b true");
}

#[test]
fn test_replacement_trim() {
    let data = data! { "x" => " v " };
    assert_eq!(render_str("{{~ x ~}}", &Registry::new(), data.clone()), "v");
    assert_eq!(render_str("{{x}}", &Registry::new(), data.clone()), " v ");
    assert_eq!(render_str("[{{~x}}]", &Registry::new(), data.clone()), "[v ]");
    assert_eq!(render_str("[{{x~}}]", &Registry::new(), data), "[ v]");
}

#[test]
fn test_trim_applies_to_value_only() {
    let out = render_str("a {{~x~}} b", &Registry::new(), data! { "x" => " v " });
    assert_eq!(out, "a v b");
}

#[test]
fn test_registered_helper_wins_over_variable() {
    let mut registry = Registry::new();
    registry.register_helper("x", |_, _, _, _| Ok("<helper>".to_string()));
    let data = data! { "x" => "variable" };
    assert_eq!(render_str("{{x}}", &registry, data.clone()), "&lt;helper&gt;");
    assert_eq!(render_str("{{{x}}}", &registry, data), "<helper>");
}

// =============================================================================
// Helpers
// =============================================================================

#[test]
fn test_helper_receives_parameters() {
    let mut registry = Registry::new();
    registry.register_helper("concat", |ctx, params, _, _| {
        let mut output = String::new();
        for param in params {
            output.push_str(&param.render(ctx)?);
        }
        Ok(output)
    });
    let out = render_str(
        "{{concat a ' & ' b}}|{{{concat a ' & ' b}}}",
        &registry,
        data! { "a" => "x", "b" => "y" },
    );
    assert_eq!(out, "x &amp; y|x & y");
}

#[test]
fn test_helper_trim() {
    let mut registry = Registry::new();
    registry.register_helper("pad", |ctx, params, _, _| {
        let inner = params.first().map(|p| p.render(ctx)).transpose()?;
        Ok(format!("  {}  ", inner.unwrap_or_default()))
    });
    assert_eq!(render_str("[{{~pad 'x'~}}]", &registry, data! {}), "[x]");
    assert_eq!(render_str("[{{pad 'x'}}]", &registry, data! {}), "[  x  ]");
}

#[test]
fn test_subexpression_renders_first() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut registry = Registry::new();

    let log = Arc::clone(&calls);
    registry.register_helper("bar", move |ctx, params, _, _| {
        log.lock().unwrap().push("bar");
        let value = params.first().map(|p| p.render(ctx)).transpose()?;
        Ok(value.unwrap_or_default().to_uppercase())
    });
    let log = Arc::clone(&calls);
    registry.register_helper("foo", move |ctx, params, _, _| {
        let inner = params.first().map(|p| p.render(ctx)).transpose()?;
        log.lock().unwrap().push("foo");
        Ok(format!("foo({})", inner.unwrap_or_default()))
    });

    let out = render_str("{{foo (bar baz)}}", &registry, data! { "baz" => "qux" });
    assert_eq!(out, "foo(QUX)");
    assert_eq!(*calls.lock().unwrap(), vec!["bar", "foo"]);
}

#[test]
fn test_subexpression_evaluates_to_string() {
    let mut registry = Registry::new();
    registry.register_helper("len", |_, _, _, _| Ok("3".to_string()));
    registry.register_helper("show", |ctx, params, _, _| {
        let value = params.first().map(|p| p.evaluate(ctx)).transpose()?;
        Ok(format!("{value:?}"))
    });
    let out = render_str("{{{show (len)}}}", &registry, data! {});
    assert_eq!(out, r#"Some(String("3"))"#);
}

#[test]
fn test_helper_missing_fallback() {
    let mut registry = Registry::new();
    registry.register_helper(stache::HELPER_MISSING, |ctx, params, _, _| {
        let name = params.first().map(|p| p.render(ctx)).transpose()?;
        Ok(format!("missing:{}", name.unwrap_or_default()))
    });
    assert_eq!(render_str("{{nope a}}", &registry, data! {}), "missing:nope");
    assert_eq!(
        render_str("{{#nope}}body{{/nope}}", &registry, data! {}),
        "missing:nope"
    );
    assert_eq!(
        render_str("{{#nope xs as |x|}}body{{/nope}}", &registry, data! {}),
        "missing:nope"
    );
}

#[test]
fn test_missing_replacement_does_not_call_helper_missing() {
    let mut registry = Registry::new();
    registry.register_helper(stache::HELPER_MISSING, |_, _, _, _| Ok("missing".to_string()));
    assert_eq!(render_str("[{{nope}}]", &registry, data! {}), "[]");
}

#[test]
fn test_helper_missing_not_registered_is_fatal() {
    let template = Template::compile("{{nope a}}").unwrap();
    let err = template.render_with(&Registry::new(), data! {}).unwrap_err();
    assert!(
        matches!(&err, RenderError::HelperMissingNotRegistered { name } if name == "nope"),
        "{err:?}"
    );
}

#[test]
fn test_helper_error_propagates() {
    let mut registry = Registry::new();
    registry.register_helper("fail", |_, _, _, _| Err(RenderError::helper("fail", "boom")));
    let template = Template::compile("a{{fail}}b").unwrap();
    let err = template.render_with(&registry, data! {}).unwrap_err();
    assert_eq!(err.to_string(), "helper 'fail' failed: boom");
}

// =============================================================================
// Blocks
// =============================================================================

#[test]
fn test_if_else() {
    let source = "{{#if ok}}yes{{else}}no{{/if}}";
    assert_eq!(render_str(source, &registry(), data! { "ok" => true }), "yes");
    assert_eq!(render_str(source, &registry(), data! { "ok" => false }), "no");
    assert_eq!(render_str(source, &registry(), data! {}), "no");
}

#[test]
fn test_each_with_this() {
    let data = json_data(json!({
        "people": [{ "name": "Ada" }, { "name": "Grace" }]
    }));
    let out = render_str(
        "{{#each people}}<{{this.name}}>{{/each}}",
        &registry(),
        data,
    );
    assert_eq!(out, "<Ada><Grace>");
}

#[test]
fn test_as_helper_join() {
    let data = data! { "items" => vec!["a", "b"] };
    let out = render_str("{{#each items as |item|}}{{item}}{{/each}}", &registry(), data);
    assert_eq!(out, "ab");
}

#[test]
fn test_as_helper_index_and_else() {
    let source = "{{#each items as |item i|}}{{i}}={{item}};{{else}}empty{{/each}}";
    let data = data! { "items" => vec!["a", "b"] };
    assert_eq!(render_str(source, &registry(), data), "0=a;1=b;");
    let data = data! { "items" => Vec::<Value>::new() };
    assert_eq!(render_str(source, &registry(), data), "empty");
}

#[test]
fn test_block_params_do_not_leak() {
    let source = "{{#each items as |item|}}{{item}}{{/each}}[{{item}}]";
    let data = data! { "items" => vec!["a"] };
    assert_eq!(render_str(source, &registry(), data), "a[]");
}

#[test]
fn test_as_helpers_have_their_own_registry() {
    let mut registry = Registry::new();
    registry.register_helper("each", each_helper);
    let template = Template::compile("{{#each items as |item|}}{{item}}{{/each}}").unwrap();
    let err = template
        .render_with(&registry, data! { "items" => vec!["a"] })
        .unwrap_err();
    assert!(matches!(err, RenderError::HelperMissingNotRegistered { .. }));
}

#[test]
fn test_block_trim_markers_leave_output_untouched() {
    let source = "[{{~#if ok~}} yes {{~/if~}}]";
    assert_eq!(render_str(source, &registry(), data! { "ok" => true }), "[ yes ]");
}

#[test]
fn test_else_trim_markers_leave_output_untouched() {
    let source = "{{#if ok}} yes {{~else~}} no {{~/if}}";
    assert_eq!(render_str(source, &registry(), data! { "ok" => true }), " yes ");
    assert_eq!(render_str(source, &registry(), data! { "ok" => false }), " no ");
}

#[test]
fn test_as_helper_trim_markers_leave_output_untouched() {
    let source = "[{{~#each items as |item|~}} {{item}} {{~/each~}}]";
    let data = data! { "items" => vec!["a", "b"] };
    assert_eq!(render_str(source, &registry(), data), "[ a  b ]");
}

#[test]
fn test_block_helper_trims_its_own_output() {
    let mut registry = Registry::new();
    registry.register_helper("strip", |ctx, _, block, _| {
        let output = block.map_or(Ok(String::new()), |b| b.render(ctx))?;
        Ok(output.trim().to_string())
    });
    assert_eq!(render_str("[{{#strip~}} x {{/strip}}]", &registry, data! {}), "[x]");
}

#[test]
fn test_template_renders_repeatedly() {
    let template = Template::compile("{{#if ok}}{{name}}{{/if}}").unwrap();
    let registry = registry();
    let first = template
        .render_with(&registry, data! { "ok" => true, "name" => "a" })
        .unwrap();
    let second = template
        .render_with(&registry, data! { "ok" => true, "name" => "b" })
        .unwrap();
    assert_eq!((first.as_str(), second.as_str()), ("a", "b"));
}

#[test]
fn test_render_depth_limit() {
    let registry = registry();
    let ast = parse("{{#if a}}{{#if a}}x{{/if}}{{/if}}").unwrap();

    let mut ctx = SimpleContext::builder()
        .registry(&registry)
        .data(data! { "a" => true })
        .max_depth(2)
        .build();
    let err = render(&ast, &mut ctx).unwrap_err();
    assert!(matches!(err, RenderError::MaxDepthExceeded { max_depth: 2 }));

    let mut ctx = SimpleContext::builder()
        .registry(&registry)
        .data(data! { "a" => true })
        .max_depth(3)
        .build();
    assert_eq!(render(&ast, &mut ctx).unwrap(), "x");
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn test_render_template_reports_parse_errors() {
    let err = render_template("{{#a}}{{/b}}", &Registry::new(), data! {}).unwrap_err();
    assert!(matches!(err, RenderError::Parse(_)));
    let out = render_template("hi {{x}}", &Registry::new(), data! { "x" => 1 }).unwrap();
    assert_eq!(out, "hi 1");
}
