use super::*;
use pretty_assertions::assert_eq;

#[test]
fn emphasis_strong_and_both() {
    assert_eq!(parse("*a*"), vec![Token::Emph(vec![text("a")])]);
    assert_eq!(parse("**a**"), vec![Token::Strong(vec![text("a")])]);
    assert_eq!(
        parse("***a***"),
        vec![Token::Emph(vec![Token::Strong(vec![text("a")])])]
    );
    html("*a*", "<em>a</em>");
    html("**a**", "<strong>a</strong>");
    html("***a***", "<em><strong>a</strong></em>");
}

#[test]
fn strong_never_contains_an_empty_emphasis() {
    assert_eq!(parse("**a**"), vec![Token::Strong(vec![text("a")])]);
}

#[test]
fn underscore_emphasis_requires_word_boundaries() {
    assert_eq!(parse("_foo_"), vec![Token::Emph(vec![text("foo")])]);
    assert_eq!(parse("foo_bar_"), vec![text("foo_bar_")]);
    assert_eq!(parse("_foo_bar"), vec![text("_foo_bar")]);
}

#[test]
fn star_run_before_whitespace_stays_literal() {
    assert_eq!(parse("* a *"), vec![text("* a *")]);
}

#[test]
fn unterminated_emphasis_is_a_single_text_token() {
    assert_eq!(parse("*unterminated"), vec![text("*unterminated")]);
}

#[test]
fn emphasis_nests_across_weights() {
    assert_eq!(
        parse("**a *b* c**"),
        vec![Token::Strong(vec![
            text("a "),
            Token::Emph(vec![text("b")]),
            text(" c"),
        ])]
    );
}

#[test]
fn identical_weight_does_not_renest() {
    assert_eq!(
        parse("**a **b** c**"),
        vec![
            Token::Strong(vec![text("a **b")]),
            text(" c**"),
        ]
    );
}

#[test]
fn overlong_runs_split_into_hole_and_operator() {
    assert_eq!(
        parse("****a****"),
        vec![
            text("*"),
            Token::Emph(vec![Token::Strong(vec![text("a")])]),
            text("*"),
        ]
    );
}

#[test]
fn emphasis_across_newline() {
    assert_eq!(parse("*a\nb*"), vec![Token::Emph(vec![text("a"), Token::SoftBreak, text("b")])]);
}
