use super::*;
use pretty_assertions::assert_eq;

#[test]
fn standard_mode_newline_is_soft() {
    assert_eq!(
        parse("a\nb"),
        vec![text("a"), Token::SoftBreak, text("b")]
    );
    html("a\nb", "a\nb");
}

#[test]
fn two_trailing_spaces_make_a_hard_break() {
    assert_eq!(
        parse("a  \nb"),
        vec![text("a"), Token::LineBreak, text("b")]
    );
    html("a  \nb", "a<br />\nb");
}

#[test]
fn backslash_makes_a_hard_break() {
    assert_eq!(
        parse("a\\\nb"),
        vec![text("a"), Token::LineBreak, text("b")]
    );
}

#[test]
fn one_trailing_space_is_still_soft() {
    assert_eq!(
        parse("a \nb"),
        vec![text("a"), Token::SoftBreak, text("b")]
    );
}

#[test]
fn leading_whitespace_of_the_next_line_is_consumed() {
    assert_eq!(
        parse("a\n   b"),
        vec![text("a"), Token::SoftBreak, text("b")]
    );
}

#[test]
fn always_hard_mode_turns_every_newline_into_a_break() {
    let parser = crate::InlineParser::new(crate::Options { hard_wrap: true });
    let refmap = RefMap::new();
    assert_eq!(
        parser.parse("a\nb", &refmap),
        vec![text("a"), Token::LineBreak, text("b")]
    );
}
