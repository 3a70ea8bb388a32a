pub mod interpreter;
pub mod parser;
pub mod template;
pub mod types;

pub use interpreter::{
    AsHelper, Context, Escaper, HELPER_MISSING, Helper, HtmlEscaper, NoEscape, Partial,
    PartialScope, Registry, RenderError, SimpleContext,
};
pub use parser::{Block, Node, Parameter, ParseError};
pub use template::Template;
pub use types::Value;

/// Parse template text into its root block.
pub fn parse(text: &str) -> Result<Block, ParseError> {
    parser::parse_template(text)
}

/// Render a parsed block against a context.
pub fn render(ast: &Block, ctx: &mut dyn Context) -> Result<String, RenderError> {
    ast.render(ctx)
}

/// Compile `source` and render it once against `data`.
///
/// Parse failures are reported as [`RenderError::Parse`].
pub fn render_template(
    source: &str,
    registry: &Registry,
    data: impl Into<Value>,
) -> Result<String, RenderError> {
    Template::compile(source)?.render_with(registry, data)
}

/// Creates a [`Value::Map`] from key-value pairs.
///
/// Values are converted via `Into<Value>`, so strings, integers, booleans,
/// vectors, and nested `data!` maps can be passed directly.
///
/// # Example
///
/// ```
/// use stache::{data, Value};
///
/// let d = data! { "count" => 3, "user" => data! { "name" => "Alice" } };
/// assert_eq!(d.lookup("count"), Some(&Value::Number(3)));
/// assert_eq!(d.lookup("user.name").and_then(Value::as_str), Some("Alice"));
/// assert_eq!(data! {}, Value::Map(Default::default()));
/// ```
#[macro_export]
macro_rules! data {
    {} => {
        $crate::Value::Map(::std::collections::BTreeMap::new())
    };
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut map = ::std::collections::BTreeMap::<String, $crate::Value>::new();
            $(
                map.insert($key.to_string(), ::std::convert::Into::<$crate::Value>::into($value));
            )+
            $crate::Value::Map(map)
        }
    };
}
