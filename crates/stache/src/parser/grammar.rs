//! Template grammar using winnow.
//!
//! Parses template text into CST fragments with ordered choice: every position
//! tries, in order, literal text, `{{path}}`, `{{{path}}}`, `{{helper ...}}`,
//! `{{{helper ...}}}`, `{{> partial}}`, `{{#block}}` and `{{#block ... as |x|}}`.
//! The first alternative that succeeds wins; a failing alternative rewinds the
//! input before the next one is tried.
//!
//! The parser state records the furthest position any labelled token failed
//! at, along with the labels that failed there, so a total failure can report
//! what was expected. It also bounds block and subexpression nesting.

use winnow::combinator::{alt, not, opt, preceded, repeat};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::stream::Stateful;
use winnow::token::{literal, take_till, take_while};

use super::ast::{BlockTrim, Trim};
use super::cst::{Braces, Fragment, Param};
use super::error::ParseError;

pub(crate) type Input<'i> = Stateful<&'i str, Tracker>;

/// Parser state that survives backtracking.
#[derive(Debug, Clone)]
pub(crate) struct Tracker {
    source_len: usize,
    /// Furthest byte offset at which a labelled token failed.
    furthest: usize,
    /// Labels of the tokens that failed at `furthest`.
    expected: Vec<String>,
    depth: usize,
    max_depth: usize,
    /// Offset of the first construct that exceeded `max_depth`.
    too_deep: Option<usize>,
}

impl Tracker {
    fn new(source_len: usize, max_depth: usize) -> Self {
        Self {
            source_len,
            furthest: 0,
            expected: Vec::new(),
            depth: 0,
            max_depth,
            too_deep: None,
        }
    }

    fn record(&mut self, at: usize, label: &str) {
        if at > self.furthest {
            self.furthest = at;
            self.expected.clear();
        }
        if at == self.furthest && !self.expected.iter().any(|e| e == label) {
            self.expected.push(label.to_string());
        }
    }
}

/// Parse a whole template into fragments.
pub(crate) fn parse_fragments(
    source: &str,
    max_depth: usize,
) -> Result<Vec<Fragment<'_>>, ParseError> {
    let mut input = Stateful {
        input: source,
        state: Tracker::new(source.len(), max_depth),
    };
    let result = items(&mut input);

    if let Some(at) = input.state.too_deep {
        return Err(ParseError::nesting_too_deep(source, at, max_depth));
    }
    match result {
        Ok(fragments) if input.input.is_empty() => Ok(fragments),
        _ => {
            let stopped = offset(&input);
            let tracker = input.state;
            if tracker.furthest >= stopped && !tracker.expected.is_empty() {
                Err(ParseError::syntax(
                    source,
                    tracker.furthest,
                    tracker.expected,
                ))
            } else {
                Err(ParseError::syntax(
                    source,
                    stopped,
                    vec!["template content".to_string()],
                ))
            }
        }
    }
}

/// Byte offset of the current position in the template source.
fn offset(input: &Input<'_>) -> usize {
    input.state.source_len - input.input.len()
}

fn backtrack<O>() -> ModalResult<O> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

/// Run `parser`, recording `label` as expected at the current position if it fails.
fn expect<'i, O>(
    label: &'static str,
    mut parser: impl Parser<Input<'i>, O, ErrMode<ContextError>>,
) -> impl FnMut(&mut Input<'i>) -> ModalResult<O> {
    move |input: &mut Input<'i>| {
        let at = offset(input);
        let result = parser.parse_next(input);
        if result.is_err() {
            input.state.record(at, label);
        }
        result
    }
}

fn enter(input: &mut Input<'_>) -> ModalResult<()> {
    if input.state.depth >= input.state.max_depth {
        let at = offset(input);
        input.state.too_deep.get_or_insert(at);
        return Err(ErrMode::Cut(ContextError::new()));
    }
    input.state.depth += 1;
    Ok(())
}

fn leave(input: &mut Input<'_>) {
    input.state.depth = input.state.depth.saturating_sub(1);
}

// =============================================================================
// Items
// =============================================================================

fn items<'i>(input: &mut Input<'i>) -> ModalResult<Vec<Fragment<'i>>> {
    repeat(0.., item).parse_next(input)
}

/// The order of these alternatives is significant: later ones are only
/// reached when every earlier one has failed at this position.
fn item<'i>(input: &mut Input<'i>) -> ModalResult<Fragment<'i>> {
    alt((
        content,
        replacement(Braces::Double),
        replacement(Braces::Triple),
        helper(Braces::Double),
        helper(Braces::Triple),
        partial,
        block_helper,
        as_block_helper,
    ))
    .parse_next(input)
}

/// Items of a block body, one nesting level down.
fn nested<'i>(input: &mut Input<'i>) -> ModalResult<Vec<Fragment<'i>>> {
    enter(input)?;
    let body = items(input);
    leave(input);
    body
}

/// Literal text: runs of non-brace characters and braces that do not open
/// a tag, merged into one fragment.
fn content<'i>(input: &mut Input<'i>) -> ModalResult<Fragment<'i>> {
    repeat::<_, _, (), _, _>(
        1..,
        alt((
            take_while(1.., |c: char| c != '{' && c != '}').void(),
            // A `{` not followed by another one, including a trailing `{`.
            ('{', not('{')).void(),
            '}'.void(),
        )),
    )
    .take()
    .map(Fragment::Text)
    .parse_next(input)
}

fn replacement<'i>(braces: Braces) -> impl FnMut(&mut Input<'i>) -> ModalResult<Fragment<'i>> {
    move |input: &mut Input<'i>| {
        literal(braces.open()).parse_next(input)?;
        let left = tilde(input)?;
        ws(input)?;
        let path = path(input)?;
        ws(input)?;
        let right = tilde(input)?;
        close(braces, input)?;
        Ok(Fragment::Replacement {
            path,
            braces,
            trim: Trim::new(left, right),
        })
    }
}

fn helper<'i>(braces: Braces) -> impl FnMut(&mut Input<'i>) -> ModalResult<Fragment<'i>> {
    move |input: &mut Input<'i>| {
        literal(braces.open()).parse_next(input)?;
        let left = tilde(input)?;
        ws(input)?;
        let name = identifier(input)?;
        let params = opt(preceded(ws, parameters))
            .parse_next(input)?
            .unwrap_or_default();
        ws(input)?;
        let right = tilde(input)?;
        close(braces, input)?;
        Ok(Fragment::Helper {
            name,
            params,
            braces,
            trim: Trim::new(left, right),
        })
    }
}

fn partial<'i>(input: &mut Input<'i>) -> ModalResult<Fragment<'i>> {
    "{{".parse_next(input)?;
    let left = tilde(input)?;
    expect("`>`", '>').parse_next(input)?;
    ws(input)?;
    let name = directory(input)?;
    ws(input)?;
    let args = opt(arguments).parse_next(input)?.unwrap_or_default();
    ws(input)?;
    let right = tilde(input)?;
    close(Braces::Double, input)?;
    Ok(Fragment::Partial {
        name,
        args,
        trim: Trim::new(left, right),
    })
}

/// `{{#name params}} body [{{else}} body] {{/name}}`, trim markers on every tag.
fn block_helper<'i>(input: &mut Input<'i>) -> ModalResult<Fragment<'i>> {
    "{{".parse_next(input)?;
    let open_left = tilde(input)?;
    expect("`#`", '#').parse_next(input)?;
    let name = identifier(input)?;
    let params = opt(preceded(space, parameters))
        .parse_next(input)?
        .unwrap_or_default();
    ws(input)?;
    let open_right = tilde(input)?;
    close(Braces::Double, input)?;

    let body = nested(input)?;
    let else_clause = opt(else_clause).parse_next(input)?;
    let close_trim = closing_tag(name).parse_next(input)?;

    let (else_tag, else_body) = match else_clause {
        Some((trim, body)) => (trim, Some(body)),
        None => (Trim::NONE, None),
    };
    Ok(Fragment::Block {
        name,
        params,
        block_params: None,
        body,
        else_body,
        trim: BlockTrim {
            open: Trim::new(open_left, open_right),
            else_tag,
            close: close_trim,
        },
    })
}

/// `{{#name params as |a b|}} body [{{else}} body] {{/name}}`.
///
/// The `{{else}}` tag of this form takes no trim markers.
fn as_block_helper<'i>(input: &mut Input<'i>) -> ModalResult<Fragment<'i>> {
    "{{".parse_next(input)?;
    let open_left = tilde(input)?;
    expect("`#`", '#').parse_next(input)?;
    let name = identifier(input)?;
    space(input)?;
    let params = parameters(input)?;
    space(input)?;
    expect("`as`", "as").parse_next(input)?;
    ws(input)?;
    expect("`|`", '|').parse_next(input)?;
    ws(input)?;
    let block_params = block_param_names(input)?;
    ws(input)?;
    expect("`|`", '|').parse_next(input)?;
    ws(input)?;
    let open_right = tilde(input)?;
    close(Braces::Double, input)?;

    let body = nested(input)?;
    let else_body = opt(plain_else_clause).parse_next(input)?;
    let close_trim = closing_tag(name).parse_next(input)?;

    Ok(Fragment::Block {
        name,
        params,
        block_params: Some(block_params),
        body,
        else_body,
        trim: BlockTrim {
            open: Trim::new(open_left, open_right),
            else_tag: Trim::NONE,
            close: close_trim,
        },
    })
}

/// `{{~else~}}` followed by the else body.
fn else_clause<'i>(input: &mut Input<'i>) -> ModalResult<(Trim, Vec<Fragment<'i>>)> {
    "{{".parse_next(input)?;
    let left = tilde(input)?;
    ws(input)?;
    expect("`else`", "else").parse_next(input)?;
    ws(input)?;
    let right = tilde(input)?;
    close(Braces::Double, input)?;
    let body = nested(input)?;
    Ok((Trim::new(left, right), body))
}

/// `{{else}}` without trim markers, followed by the else body.
fn plain_else_clause<'i>(input: &mut Input<'i>) -> ModalResult<Vec<Fragment<'i>>> {
    "{{".parse_next(input)?;
    ws(input)?;
    expect("`else`", "else").parse_next(input)?;
    ws(input)?;
    close(Braces::Double, input)?;
    nested(input)
}

/// Build the parser for the closing tag of the block opened as `name`.
fn closing_tag<'i>(name: &'i str) -> impl FnMut(&mut Input<'i>) -> ModalResult<Trim> {
    move |input: &mut Input<'i>| {
        "{{".parse_next(input)?;
        let left = tilde(input)?;
        expect("`/`", '/').parse_next(input)?;
        let at = offset(input);
        let matched: ModalResult<&str> = literal(name).parse_next(input);
        if matched.is_err() {
            input
                .state
                .record(at, &format!("closing tag `{{{{/{name}}}}}`"));
            return backtrack();
        }
        let right = tilde(input)?;
        close(Braces::Double, input)?;
        Ok(Trim::new(left, right))
    }
}

// =============================================================================
// Parameters
// =============================================================================

fn parameters<'i>(input: &mut Input<'i>) -> ModalResult<Vec<Param<'i>>> {
    let first = parameter(input)?;
    let rest: Vec<Param<'i>> = repeat(0.., preceded(space, parameter)).parse_next(input)?;
    let mut params = Vec::with_capacity(rest.len() + 1);
    params.push(first);
    params.extend(rest);
    Ok(params)
}

/// A path, quoted string, or `(subexpression)`; never the `as |` introducer.
fn parameter<'i>(input: &mut Input<'i>) -> ModalResult<Param<'i>> {
    preceded(
        not(block_params_intro),
        alt((
            path.map(Param::Path),
            quoted.map(Param::Str),
            subexpression,
        )),
    )
    .parse_next(input)
}

fn block_params_intro(input: &mut Input<'_>) -> ModalResult<()> {
    ("as", ws, '|').void().parse_next(input)
}

fn subexpression<'i>(input: &mut Input<'i>) -> ModalResult<Param<'i>> {
    '('.parse_next(input)?;
    ws(input)?;
    let name = identifier(input)?;
    enter(input)?;
    let params = opt(preceded(ws, parameters)).parse_next(input);
    leave(input);
    let params = params?.unwrap_or_default();
    ws(input)?;
    expect("`)`", ')').parse_next(input)?;
    Ok(Param::Subexpression { name, params })
}

fn arguments<'i>(input: &mut Input<'i>) -> ModalResult<Vec<(&'i str, Param<'i>)>> {
    let first = argument(input)?;
    let rest: Vec<(&'i str, Param<'i>)> =
        repeat(0.., preceded(space, argument)).parse_next(input)?;
    let mut args = Vec::with_capacity(rest.len() + 1);
    args.push(first);
    args.extend(rest);
    Ok(args)
}

/// `key=value`
fn argument<'i>(input: &mut Input<'i>) -> ModalResult<(&'i str, Param<'i>)> {
    let key = identifier(input)?;
    ws(input)?;
    expect("`=`", '=').parse_next(input)?;
    ws(input)?;
    let value = parameter(input)?;
    Ok((key, value))
}

fn block_param_names<'i>(input: &mut Input<'i>) -> ModalResult<Vec<&'i str>> {
    let first = identifier(input)?;
    let rest: Vec<&'i str> = repeat(0.., preceded(space, identifier)).parse_next(input)?;
    let mut names = Vec::with_capacity(rest.len() + 1);
    names.push(first);
    names.extend(rest);
    Ok(names)
}

// =============================================================================
// Tokens
// =============================================================================

/// `identifier(.segment)*`, where a segment may also be the keyword `else`.
fn path<'i>(input: &mut Input<'i>) -> ModalResult<&'i str> {
    (
        identifier,
        repeat::<_, _, (), _, _>(0.., ('.', alt((identifier, "else")))),
    )
        .take()
        .parse_next(input)
}

fn identifier<'i>(input: &mut Input<'i>) -> ModalResult<&'i str> {
    expect(
        "identifier",
        preceded(not(else_tag), take_while(1.., is_ident_char)),
    )
    .parse_next(input)
}

/// Partial names may contain `/`.
fn directory<'i>(input: &mut Input<'i>) -> ModalResult<&'i str> {
    expect(
        "partial name",
        preceded(
            not(else_tag),
            take_while(1.., |c: char| is_ident_char(c) || c == '/'),
        ),
    )
    .parse_next(input)
}

/// The keyword `else` closing its own tag, as in `{{else}}` or `{{else~}}`.
fn else_tag(input: &mut Input<'_>) -> ModalResult<()> {
    ("else", ws, opt('~'), "}}").void().parse_next(input)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '-' | '_' | '?')
}

fn quoted<'i>(input: &mut Input<'i>) -> ModalResult<&'i str> {
    alt((quoted_with('\''), quoted_with('"'))).parse_next(input)
}

/// Text between a pair of the same quote character.
fn quoted_with<'i>(quote: char) -> impl FnMut(&mut Input<'i>) -> ModalResult<&'i str> {
    let label = match quote {
        '\'' => "closing `'`",
        _ => "closing `\"`",
    };
    move |input: &mut Input<'i>| {
        literal(quote).parse_next(input)?;
        let text = take_till(0.., quote).parse_next(input)?;
        expect(label, literal(quote)).parse_next(input)?;
        Ok(text)
    }
}

fn tilde(input: &mut Input<'_>) -> ModalResult<bool> {
    opt('~').map(|t| t.is_some()).parse_next(input)
}

fn close(braces: Braces, input: &mut Input<'_>) -> ModalResult<()> {
    let label = match braces {
        Braces::Double => "`}}`",
        Braces::Triple => "`}}}`",
    };
    expect(label, literal(braces.close())).void().parse_next(input)
}

fn ws(input: &mut Input<'_>) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace()).void().parse_next(input)
}

fn space(input: &mut Input<'_>) -> ModalResult<()> {
    take_while(1.., |c: char| c.is_ascii_whitespace()).void().parse_next(input)
}
