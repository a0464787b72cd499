//! The bundled render sink: token tree in, HTML out.
//!
//! Payloads arrive pre-escaped from the parser (escaping happens once, at
//! token emission), so rendering is pure concatenation and tag wrapping.

use crate::nodes::Token;

/// Render a token sequence as HTML.
pub fn render(tokens: &[Token]) -> String {
    let mut f = HtmlFormatter::new();
    f.format_tokens(tokens);
    f.v
}

struct HtmlFormatter {
    v: String,
}

impl HtmlFormatter {
    fn new() -> Self {
        HtmlFormatter { v: String::new() }
    }

    fn format_tokens(&mut self, tokens: &[Token]) {
        for token in tokens {
            self.format(token);
        }
    }

    fn format(&mut self, token: &Token) {
        match token {
            Token::Text(raw) => self.v.push_str(raw),
            Token::Emph(children) => {
                self.v.push_str("<em>");
                self.format_tokens(children);
                self.v.push_str("</em>");
            }
            Token::Strong(children) => {
                self.v.push_str("<strong>");
                self.format_tokens(children);
                self.v.push_str("</strong>");
            }
            Token::Code(raw) => {
                self.v.push_str("<code>");
                self.v.push_str(raw);
                self.v.push_str("</code>");
            }
            Token::Link(link) => {
                self.v.push_str("<a href=\"");
                self.v.push_str(&link.url);
                self.v.push('"');
                if let Some(title) = &link.title {
                    self.v.push_str(" title=\"");
                    self.v.push_str(title);
                    self.v.push('"');
                }
                self.v.push('>');
                self.format_tokens(&link.children);
                self.v.push_str("</a>");
            }
            Token::Image(link) => {
                self.v.push_str("<img src=\"");
                self.v.push_str(&link.url);
                self.v.push_str("\" alt=\"");
                let mut alt = String::new();
                for child in &link.children {
                    child.text_content(&mut alt);
                }
                self.v.push_str(&alt);
                self.v.push('"');
                if let Some(title) = &link.title {
                    self.v.push_str(" title=\"");
                    self.v.push_str(title);
                    self.v.push('"');
                }
                self.v.push_str(" />");
            }
            Token::HtmlInline(raw) => self.v.push_str(raw),
            Token::LineBreak => self.v.push_str("<br />\n"),
            Token::SoftBreak => self.v.push('\n'),
        }
    }
}
