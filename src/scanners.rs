use crate::parser::RuleKind;
use regex::{Captures, Regex};
use std::fmt::Write;

// Start patterns for the built-in rules. Only enough of each construct to
// locate a candidate cheaply; the handlers confirm completion. The raw-HTML
// component patterns follow CommonMark's grammar and avoid lookaround.
lazy_static! {
    static ref PUNCTUATION: &'static str = r##"[!"\#$%&'()*+,\-./:;<=>?@\[\\\]^_`{|}~]"##;
    static ref ESCAPE: String = format!(r"(?:\\{})+", *PUNCTUATION);
    static ref SCHEME: &'static str = r"[A-Za-z][A-Za-z0-9.+-]{1,31}";
    static ref AUTO_LINK: String = format!(r"<{}:[^<>\x00-\x20]*>", *SCHEME);
    static ref AUTO_EMAIL: String = concat!(
        "<",
        "[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+",
        "@",
        "[a-zA-Z0-9]",
        "([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
        r"(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*",
        ">"
    )
    .to_string();
    static ref SPACE_CHAR: &'static str = r"(?:[ \t\v\f\r\n])";
    static ref TAG_NAME: &'static str = r"(?:[A-Za-z][A-Za-z0-9-]*)";
    static ref CLOSE_TAG: String = format!(r"(?:/{}{}*>)", *TAG_NAME, *SPACE_CHAR);
    static ref ATTRIBUTE_NAME: &'static str = r"(?:[a-zA-Z_:][a-zA-Z0-9:._-]*)";
    static ref ATTRIBUTE_VALUE: &'static str =
        r#"(?:[^"'=<>`\x00 ]+|['][^'\x00]*[']|["][^"\x00]*["])"#;
    static ref ATTRIBUTE_VALUE_SPEC: String =
        format!(r"(?:{}*={}*{})", *SPACE_CHAR, *SPACE_CHAR, *ATTRIBUTE_VALUE);
    static ref ATTRIBUTE: String = format!(
        r"(?:{}+{}{}?)",
        *SPACE_CHAR, *ATTRIBUTE_NAME, *ATTRIBUTE_VALUE_SPEC
    );
    static ref OPEN_TAG: String = format!(r"(?:{}{}*{}*/?>)", *TAG_NAME, *ATTRIBUTE, *SPACE_CHAR);
    static ref HTML_COMMENT: &'static str = r"(?:!---->|!---?[^\x00>-](-?[^\x00-])*-->)";
    static ref PROCESSING_INSTRUCTION: &'static str = r"(?:\?([^?>\x00]+|\?[^>\x00]|>)*\?>)";
    static ref DECLARATION: String = format!(r"(?:![A-Z]+{}+[^>\x00]*>)", *SPACE_CHAR);
    static ref CDATA: &'static str = r"(?:!\[CDATA\[([^\]\x00]+|\][^\]\x00]|\]\][^>\x00])*\]\]>)";
    static ref INLINE_HTML: String = format!(
        r"<(?:{}|{}|{}|{}|{}|{})",
        *OPEN_TAG, *CLOSE_TAG, *HTML_COMMENT, *PROCESSING_INSTRUCTION, *DECLARATION, *CDATA
    );
    static ref PREC_AUTO_LINK: String = format!(r"<{}:", *SCHEME);
    static ref PREC_INLINE_HTML: String = format!(r"</?{}|<!|<\?", *TAG_NAME);
}

/// The start pattern for a built-in rule, in the alternation-fragment form
/// the scanner compiler consumes.
pub(crate) fn start_pattern(kind: RuleKind, hard_wrap: bool) -> &'static str {
    lazy_static! {
        static ref LINEBREAK_STD: String = r"(?:\\| {2,})\n\s*".to_string();
        static ref LINEBREAK_HARD: String = r" *\n\s*".to_string();
    }

    match kind {
        RuleKind::Escape => ESCAPE.as_str(),
        RuleKind::Codespan => "`+",
        RuleKind::Emphasis => r"\*+|_+",
        RuleKind::Link => r"!?\[",
        RuleKind::AutoLink => AUTO_LINK.as_str(),
        RuleKind::AutoEmail => AUTO_EMAIL.as_str(),
        RuleKind::InlineHtml => INLINE_HTML.as_str(),
        RuleKind::Linebreak => {
            if hard_wrap {
                LINEBREAK_HARD.as_str()
            } else {
                LINEBREAK_STD.as_str()
            }
        }
        RuleKind::Softbreak => LINEBREAK_HARD.as_str(),
        RuleKind::PrecAutoLink => PREC_AUTO_LINK.as_str(),
        RuleKind::PrecInlineHtml => PREC_INLINE_HTML.as_str(),
        RuleKind::Custom(_) => unreachable!("custom rules carry their own pattern"),
    }
}

/// A compiled alternation over an ordered rule list. Finds the earliest
/// offset at which any active rule's start pattern matches, and which rule
/// it was: earliest offset wins, and at equal offsets the earlier rule in
/// the list wins (the regex engine's leftmost-first alternation).
pub(crate) struct Scanner {
    re: Regex,
    rules: Vec<(RuleKind, String)>,
}

impl Scanner {
    pub fn compile(rules: &[(RuleKind, String, String)]) -> Result<Scanner, regex::Error> {
        let mut alternation = String::new();
        for (ix, (_, name, pattern)) in rules.iter().enumerate() {
            if ix > 0 {
                alternation.push('|');
            }
            write!(alternation, "(?P<{}>{})", name, pattern).unwrap();
        }
        let re = Regex::new(&alternation)?;
        Ok(Scanner {
            re,
            rules: rules
                .iter()
                .map(|(kind, name, _)| (*kind, name.clone()))
                .collect(),
        })
    }

    /// Leftmost match at or after `pos`.
    pub fn find_at<'t>(&self, src: &'t str, pos: usize) -> Option<(RuleKind, Captures<'t>)> {
        let caps = self.re.captures_at(src, pos)?;
        let kind = self.rule_of(&caps);
        Some((kind, caps))
    }

    /// Match anchored at exactly `pos`.
    pub fn match_at<'t>(&self, src: &'t str, pos: usize) -> Option<(RuleKind, Captures<'t>)> {
        let caps = self.re.captures_at(src, pos)?;
        if caps.get(0).map(|m| m.start()) != Some(pos) {
            return None;
        }
        let kind = self.rule_of(&caps);
        Some((kind, caps))
    }

    fn rule_of(&self, caps: &Captures) -> RuleKind {
        for (kind, name) in &self.rules {
            if caps.name(name).is_some() {
                return *kind;
            }
        }
        unreachable!("exactly one alternation branch participates in a match")
    }
}

/// The closing-run pattern for an emphasis opener: lazily take everything up
/// to a same-character run of the opener's length, requiring the interior to
/// end on a character that is neither whitespace nor the marker. `_` closers
/// additionally require a trailing word boundary.
pub(crate) fn emphasis_closer(marker: u8, len: usize) -> &'static Regex {
    lazy_static! {
        static ref STAR: [Regex; 3] = [
            Regex::new(r"(?s)\A(.*?[^\s*])\*").unwrap(),
            Regex::new(r"(?s)\A(.*?[^\s*])\*\*").unwrap(),
            Regex::new(r"(?s)\A(.*?[^\s*])\*\*\*").unwrap(),
        ];
        static ref UNDERSCORE: [Regex; 3] = [
            Regex::new(r"(?s)\A(.*?[^\s_])_\b").unwrap(),
            Regex::new(r"(?s)\A(.*?[^\s_])__\b").unwrap(),
            Regex::new(r"(?s)\A(.*?[^\s_])___\b").unwrap(),
        ];
    }

    match marker {
        b'*' => &STAR[len - 1],
        b'_' => &UNDERSCORE[len - 1],
        _ => unreachable!("emphasis markers are * and _"),
    }
}

/// Parse a link label at `pos`: at most 500 characters containing no
/// unescaped brackets, followed by `]`. Returns the label interior and the
/// offset just past the `]`.
pub(crate) fn link_label(src: &str, pos: usize) -> Option<(&str, usize)> {
    lazy_static! {
        static ref LINK_LABEL: Regex = Regex::new(r"\A(?:[^\\\[\]]|\\.){0,500}").unwrap();
    }

    let m = LINK_LABEL.find(&src[pos..]).unwrap();
    let end = pos + m.end();
    if src.as_bytes().get(end) == Some(&b']') {
        Some((&src[pos..end], end + 1))
    } else {
        None
    }
}

/// Parse link text at `pos`: everything up to the `]` that unbalances the
/// opening bracket, honoring backslash escapes and nested balanced
/// brackets. Returns the text and the offset just past the `]`.
pub(crate) fn link_text(src: &str, pos: usize) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    let mut level = 1usize;
    let mut i = pos;
    while i < src.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'[' => level += 1,
            b']' => {
                level -= 1;
                if level == 0 {
                    return Some((&src[pos..i], i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Parse a link destination at `pos` (just after the `(` of an inline
/// link): optional whitespace with at most one newline, then either an
/// angle-bracketed destination or a bare one scanned with balanced
/// parentheses. Returns the raw destination and the offset past it.
pub(crate) fn link_destination(src: &str, pos: usize) -> Option<(&str, usize)> {
    lazy_static! {
        static ref SPNL: Regex = Regex::new(r"\A[ \t]*\n?[ \t]*").unwrap();
        static ref BRACKETED: Regex = Regex::new(r"\A<([^<>\n\\\x00]*)>").unwrap();
    }

    let pos = pos + SPNL.find(&src[pos..]).unwrap().end();

    if let Some(caps) = BRACKETED.captures(&src[pos..]) {
        let m = caps.get(1).unwrap();
        return Some((&src[pos + m.start()..pos + m.end()], pos + caps.get(0).unwrap().end()));
    }

    let bytes = src.as_bytes();
    let mut i = pos;
    let mut nb_p = 0usize;
    while i < src.len() {
        match bytes[i] {
            b'\\' if i + 1 < src.len() && crate::ctype::ispunct(bytes[i + 1]) => i += 1,
            b'(' => {
                nb_p += 1;
                if nb_p > 32 {
                    return None;
                }
            }
            b')' => {
                if nb_p == 0 {
                    break;
                }
                nb_p -= 1;
            }
            c if crate::ctype::isspace(c) => break,
            _ => {}
        }
        i += 1;
    }

    if i == pos {
        None
    } else {
        Some((&src[pos..i], i))
    }
}

/// Parse a link title at `pos`: required whitespace, then a `"`-, `'`- or
/// parenthesis-delimited title with backslash escapes. Returns the title
/// interior and the offset past the closing delimiter.
pub(crate) fn link_title(src: &str, pos: usize) -> Option<(&str, usize)> {
    lazy_static! {
        static ref ESCAPED_CHAR: String = format!(r"(?:\\{})", *PUNCTUATION);
        static ref LINK_TITLE: Regex = Regex::new(&format!(
            r#"(?s)\A\s+("({}|[^"\x00])*"|'({}|[^'\x00])*'|\(({}|[^)\x00])*\))"#,
            *ESCAPED_CHAR, *ESCAPED_CHAR, *ESCAPED_CHAR
        ))
        .unwrap();
    }

    let caps = LINK_TITLE.captures(&src[pos..])?;
    let delimited = caps.get(1).unwrap();
    Some((
        &src[pos + delimited.start() + 1..pos + delimited.end() - 1],
        pos + caps.get(0).unwrap().end(),
    ))
}

/// Match the closing `)` of an inline link, preceded by optional
/// whitespace. Returns the offset just past it.
pub(crate) fn paren_end(src: &str, pos: usize) -> Option<usize> {
    lazy_static! {
        static ref PAREN_END: Regex = Regex::new(r"\A\s*\)").unwrap();
    }

    PAREN_END.find(&src[pos..]).map(|m| pos + m.end())
}
