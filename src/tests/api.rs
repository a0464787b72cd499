use super::*;
use crate::{inline_to_html, InlineState, RuleError, RuleHandler, RuleMatch};
use pretty_assertions::assert_eq;

#[test]
fn inline_to_html_convenience() {
    let mut refmap = RefMap::new();
    refmap.insert("foo", "/f", None);
    assert_eq!(
        inline_to_html("see [foo]", &refmap, &Options::default()),
        "see <a href=\"/f\">foo</a>"
    );
}

#[test]
fn refmap_lookups_normalize() {
    let mut refmap = RefMap::new();
    refmap.insert("  Foo \t Bar ", "/b", None);
    assert_eq!(refmap.get("foo bar").map(|r| r.url.as_str()), Some("/b"));
    assert_eq!(refmap.get("FOO   BAR").map(|r| r.url.as_str()), Some("/b"));
    assert_eq!(refmap.get("foobar"), None);
}

#[test]
fn empty_input_renders_empty() {
    assert_eq!(crate::html::render(&parse("")), "");
}

fn mention(
    _parser: &InlineParser,
    m: &RuleMatch,
    state: &mut InlineState,
    _prec: Option<usize>,
) -> Option<usize> {
    let name = &m.as_str()[1..];
    state.push(Token::Link(NodeLink {
        url: format!("/u/{}", name),
        title: None,
        children: vec![Token::Text(name.to_string())],
    }));
    Some(m.end())
}

#[test]
fn custom_rule_claims_its_syntax() {
    let mut parser = InlineParser::new(Options::default());
    parser
        .register_rule("mention", "@[A-Za-z0-9_]+", Box::new(mention))
        .unwrap();

    let tokens = parser.parse("hi @alice!", &RefMap::new());
    assert_eq!(
        tokens,
        vec![
            text("hi "),
            link("/u/alice", None, vec![text("alice")]),
            text("!"),
        ]
    );
}

fn noop(
    _parser: &InlineParser,
    _m: &RuleMatch,
    _state: &mut InlineState,
    _prec: Option<usize>,
) -> Option<usize> {
    None
}

#[test]
fn custom_rule_registration_errors() {
    let mut parser = InlineParser::new(Options::default());

    assert!(matches!(
        parser.register_rule("1bad", "x", Box::new(noop)),
        Err(RuleError::InvalidName(_))
    ));
    assert!(matches!(
        parser.register_rule("escape", "x", Box::new(noop)),
        Err(RuleError::DuplicateName(_))
    ));
    assert!(matches!(
        parser.register_rule("broken", "(", Box::new(noop)),
        Err(RuleError::Pattern(_))
    ));
}

fn braces(
    parser: &InlineParser,
    m: &RuleMatch,
    state: &mut InlineState,
    _prec: Option<usize>,
) -> Option<usize> {
    let src = state.src;
    let close = src[m.end()..].rfind('}')? + m.end();
    let interior = &src[m.end()..close];
    let children = parser.subparse(state, interior);
    state.push(Token::Strong(children));
    Some(close + 1)
}

#[test]
fn custom_rule_recursion_is_depth_limited() {
    let mut parser = InlineParser::new(Options::default());
    parser
        .register_rule("braces", r"\{", Box::new(braces))
        .unwrap();

    let input = format!("{}a{}", "{".repeat(150), "}".repeat(150));
    let tokens = parser.parse(&input, &RefMap::new());
    let rendered = crate::html::render(&tokens);
    assert!(rendered.contains('a'));
    // terminated well past the limit without exhausting the stack
    assert!(rendered.matches("<strong>").count() <= 101);
}
