use super::*;
use pretty_assertions::assert_eq;

#[test]
fn open_and_close_tags_pass_through_raw() {
    assert_eq!(
        parse("<b>bold</b>"),
        vec![
            Token::HtmlInline("<b>".to_string()),
            text("bold"),
            Token::HtmlInline("</b>".to_string()),
        ]
    );
    html("<b>bold</b>", "<b>bold</b>");
}

#[test]
fn tag_with_attributes() {
    assert_eq!(
        parse("<img src='x' alt=\"y\" />"),
        vec![Token::HtmlInline("<img src='x' alt=\"y\" />".to_string())]
    );
}

#[test]
fn html_comment() {
    assert_eq!(
        parse("a <!-- hidden --> b"),
        vec![
            text("a "),
            Token::HtmlInline("<!-- hidden -->".to_string()),
            text(" b"),
        ]
    );
}

#[test]
fn processing_instruction_and_declaration() {
    assert_eq!(
        parse("<?php echo 1 ?>"),
        vec![Token::HtmlInline("<?php echo 1 ?>".to_string())]
    );
    assert_eq!(
        parse("<!DOCTYPE html>"),
        vec![Token::HtmlInline("<!DOCTYPE html>".to_string())]
    );
}

#[test]
fn cdata_section() {
    assert_eq!(
        parse("<![CDATA[*not emphasis*]]>"),
        vec![Token::HtmlInline("<![CDATA[*not emphasis*]]>".to_string())]
    );
}

#[test]
fn invalid_markup_is_escaped_text() {
    assert_eq!(parse("<1>"), vec![text("&lt;1&gt;")]);
    assert_eq!(parse("a < b"), vec![text("a &lt; b")]);
}

#[test]
fn anchor_tags_toggle_the_link_context() {
    // the [x] shortcut cannot resolve, and the autolink inside the open
    // anchor stays literal
    assert_eq!(
        parse("<A HREF='u'><http://x></a>"),
        vec![
            Token::HtmlInline("<A HREF='u'>".to_string()),
            text("&lt;http://x&gt;"),
            Token::HtmlInline("</a>".to_string()),
        ]
    );
}
