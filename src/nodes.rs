//! The inline token tree.

/// The details of a link's destination, or an image's source, plus the
/// parsed inline content (for images, the content collapses to alt text at
/// render time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLink {
    /// The destination URL, already escaped for the href attribute.
    pub url: String,

    /// The title, already entity-escaped; `None` when no title was given.
    pub title: Option<String>,

    /// The link text (or image description), recursively parsed.
    pub children: Vec<Token>,
}

/// One node of the inline token tree.
///
/// Leaf variants carry a `String` payload and container variants carry
/// ordered children, never both. `Text` and `Code` payloads are
/// HTML-escaped exactly once, when the token is emitted; `HtmlInline`
/// payloads are the raw source bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, escaped for the output alphabet.
    Text(String),

    /// Emphasised text. Contains **inlines**.
    Emph(Vec<Token>),

    /// Strong text. Contains **inlines**.
    Strong(Vec<Token>),

    /// A code span. The interior is never parsed further.
    Code(String),

    /// A link. Produced by inline, reference and shortcut-reference
    /// syntax, and by autolinks (URI and email forms).
    Link(NodeLink),

    /// An image.
    Image(NodeLink),

    /// Raw inline HTML, passed through unescaped.
    HtmlInline(String),

    /// A hard line break.
    LineBreak,

    /// A soft line break.
    SoftBreak,
}

impl Token {
    /// The plain-text content of this token and its descendants, used for
    /// image alt text.
    pub fn text_content(&self, out: &mut String) {
        match self {
            Token::Text(raw) | Token::Code(raw) => out.push_str(raw),
            Token::Emph(children) | Token::Strong(children) => {
                for child in children {
                    child.text_content(out);
                }
            }
            Token::Link(link) | Token::Image(link) => {
                for child in &link.children {
                    child.text_content(out);
                }
            }
            Token::HtmlInline(_) => {}
            Token::LineBreak | Token::SoftBreak => out.push('\n'),
        }
    }
}
