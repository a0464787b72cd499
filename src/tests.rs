use crate::nodes::{NodeLink, Token};
use crate::{InlineParser, Options, RefMap};

mod api;
mod breaks;
mod emphasis;
mod raw;

fn parse(input: &str) -> Vec<Token> {
    parse_refs(input, &RefMap::new())
}

fn parse_refs(input: &str, refmap: &RefMap) -> Vec<Token> {
    InlineParser::new(Options::default()).parse(input, refmap)
}

fn html(input: &str, expected: &str) {
    html_refs(input, &RefMap::new(), expected);
}

fn html_refs(input: &str, refmap: &RefMap, expected: &str) {
    let actual = crate::html::render(&parse_refs(input, refmap));
    pretty_assertions::assert_eq!(actual, expected);
}

fn text(s: &str) -> Token {
    Token::Text(s.to_string())
}

fn link(url: &str, title: Option<&str>, children: Vec<Token>) -> Token {
    Token::Link(NodeLink {
        url: url.to_string(),
        title: title.map(str::to_string),
        children,
    })
}
