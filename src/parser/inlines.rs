use regex::Captures;

use crate::nodes::{NodeLink, Token};
use crate::parser::{InlineParser, RefMap, RuleKind, RuleMatch};
use crate::scanners;
use crate::strings::{escape_href, escape_html, normalize_code, safe_entity, unescape_char};

// Nested spans recurse; beyond this depth the interior stays literal text
// rather than risking the call stack on adversarial input.
const MAX_NESTING_DEPTH: usize = 100;

/// Nesting flags, copied (not shared) into each nested span so sibling
/// spans cannot observe each other.
#[derive(Debug, Default, Clone, Copy)]
pub struct Flags {
    pub in_link: bool,
    pub in_image: bool,
    pub in_emphasis: bool,
    pub in_strong: bool,
}

/// Per-span parse state: the source span, the output token list, nesting
/// flags and the shared read-only reference table. One is created per
/// inline span; nested spans get an independent copy via [`child`].
///
/// [`child`]: InlineState::child
pub struct InlineState<'i, 'r> {
    pub src: &'i str,
    pub tokens: Vec<Token>,
    pub flags: Flags,
    pub env: &'r RefMap,
    depth: usize,
}

impl<'i, 'r> InlineState<'i, 'r> {
    pub fn new(src: &'i str, env: &'r RefMap) -> InlineState<'i, 'r> {
        InlineState {
            src,
            tokens: Vec::new(),
            flags: Flags::default(),
            env,
            depth: 0,
        }
    }

    /// A state for a nested span: same environment, copied flags, fresh
    /// token list, one level deeper.
    pub fn child(&self, src: &'i str) -> InlineState<'i, 'r> {
        InlineState {
            src,
            tokens: Vec::new(),
            flags: self.flags,
            env: self.env,
            depth: self.depth + 1,
        }
    }

    /// Append a literal-text token. The payload must already be escaped.
    /// Adjacent text tokens merge, so degraded constructs coalesce into a
    /// single token.
    pub fn push_text(&mut self, raw: String) {
        if let Some(Token::Text(prev)) = self.tokens.last_mut() {
            prev.push_str(&raw);
            return;
        }
        self.tokens.push(Token::Text(raw));
    }

    /// Append any token.
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    // The precedence resolver's splice: a literal prefix placed ahead of
    // the tokens an inner handler just emitted.
    fn insert_text(&mut self, ix: usize, raw: String) {
        if ix > 0 {
            if let Some(Token::Text(prev)) = self.tokens.get_mut(ix - 1) {
                prev.push_str(&raw);
                return;
            }
        }
        self.tokens.insert(ix, Token::Text(raw));
    }
}

impl InlineParser {
    /// Parse `src` as a nested span under `state`'s flags, returning its
    /// tokens. For custom rule handlers that build container constructs.
    pub fn subparse<'i>(&self, state: &InlineState<'i, '_>, src: &'i str) -> Vec<Token> {
        self.parse_nested(state, src, |_| {})
    }

    pub(crate) fn parse_into(&self, state: &mut InlineState) {
        self.parse_at(state, 0);
    }

    // The main scan loop: find the next candidate, emit any skipped text,
    // dispatch the handler; a failed handler costs exactly one character.
    // Every path advances the cursor, so the loop terminates in at most
    // `src.len()` steps.
    fn parse_at(&self, state: &mut InlineState, mut pos: usize) {
        let src = state.src;
        while pos < src.len() {
            let (kind, caps) = match self.scanner.find_at(src, pos) {
                Some(found) => found,
                None => break,
            };
            let m = caps.get(0).unwrap();
            let end_pos = m.start();
            if end_pos > pos {
                state.push_text(safe_entity(&src[pos..end_pos]));
            }

            match self.dispatch(kind, &caps, state, None) {
                Some(new_pos) if new_pos > end_pos => pos = new_pos,
                _ => {
                    // move the cursor one character forward
                    let ch = src[end_pos..].chars().next().unwrap();
                    let next = end_pos + ch.len_utf8();
                    state.push_text(safe_entity(&src[end_pos..next]));
                    pos = next;
                }
            }
        }

        if pos == 0 {
            // special case, just pure text
            state.push_text(safe_entity(src));
        } else if pos < src.len() {
            state.push_text(safe_entity(&src[pos..]));
        }
    }

    fn dispatch<'i>(
        &self,
        kind: RuleKind,
        caps: &Captures<'i>,
        state: &mut InlineState<'i, '_>,
        prec_end: Option<usize>,
    ) -> Option<usize> {
        match kind {
            RuleKind::Escape => self.parse_escape(caps, state),
            RuleKind::Codespan => self.parse_codespan(caps, state, prec_end),
            RuleKind::Emphasis => self.parse_emphasis(caps, state),
            RuleKind::Link => self.parse_link(caps, state),
            RuleKind::AutoLink => self.parse_auto_link(caps, state, prec_end),
            RuleKind::AutoEmail => self.parse_auto_email(caps, state, prec_end),
            RuleKind::InlineHtml => self.parse_inline_html(caps, state, prec_end),
            RuleKind::Linebreak => {
                state.push(Token::LineBreak);
                Some(caps.get(0).unwrap().end())
            }
            RuleKind::Softbreak => {
                state.push(Token::SoftBreak);
                Some(caps.get(0).unwrap().end())
            }
            // Only ever present in the restricted scanner, which is never
            // dispatched from directly.
            RuleKind::PrecAutoLink | RuleKind::PrecInlineHtml => None,
            RuleKind::Custom(ix) => {
                let m = caps.get(0).unwrap();
                let rule_match = RuleMatch {
                    start: m.start(),
                    end: m.end(),
                    text: m.as_str(),
                };
                (self.custom[ix].handler)(self, &rule_match, state, prec_end)
            }
        }
    }

    // Code spans, autolinks and raw inline HTML bind tighter than emphasis
    // and brackets. Probe the candidate interior with the restricted
    // scanner; on a hit, confirm with the full scanner anchored at that
    // offset and run the matched handler. A completed inner construct
    // replaces the outer one: everything from the outer marker up to the
    // inner start becomes literal text, spliced ahead of the inner tokens.
    fn precedence_scan<'i>(
        &self,
        marker: &str,
        text: &'i str,
        pos: usize,
        state: &mut InlineState<'i, '_>,
    ) -> Option<usize> {
        let (_, probe) = self.prec_scanner.find_at(text, 0)?;
        let start_pos = probe.get(0).unwrap().start();
        let sc_pos = pos + start_pos;

        let (kind, caps) = self.scanner.match_at(state.src, sc_pos)?;

        let insert_at = state.tokens.len();
        let end_pos = self.dispatch(kind, &caps, state, Some(pos + text.len()))?;

        state.insert_text(insert_at, safe_entity(&format!("{}{}", marker, &text[..start_pos])));
        Some(end_pos)
    }

    fn parse_escape(&self, caps: &Captures, state: &mut InlineState) -> Option<usize> {
        let m = caps.get(0).unwrap();
        state.push_text(safe_entity(&unescape_char(m.as_str())));
        Some(m.end())
    }

    fn parse_codespan(
        &self,
        caps: &Captures,
        state: &mut InlineState,
        prec_end: Option<usize>,
    ) -> Option<usize> {
        let m = caps.get(0).unwrap();
        let marker_len = m.end() - m.start();
        let src = state.src;
        let bytes = src.as_bytes();
        let pos = m.end();

        // require a run of exactly the same length at the end
        let mut i = pos;
        while i < src.len() {
            if bytes[i] == b'`' {
                let run_start = i;
                while i < src.len() && bytes[i] == b'`' {
                    i += 1;
                }
                if i - run_start == marker_len {
                    if let Some(boundary) = prec_end {
                        if boundary > i {
                            return None;
                        }
                    }
                    let code = normalize_code(&src[pos..run_start]);
                    state.push(Token::Code(escape_html(&code)));
                    return Some(i);
                }
            } else {
                i += 1;
            }
        }

        if prec_end.is_none() {
            state.push_text(safe_entity(m.as_str()));
            return Some(pos);
        }
        None
    }

    fn parse_emphasis<'i>(
        &self,
        caps: &Captures<'i>,
        state: &mut InlineState<'i, '_>,
    ) -> Option<usize> {
        let m = caps.get(0).unwrap();
        let src = state.src;
        let run = m.as_str();
        let marker_char = run.as_bytes()[0];
        let pos = m.end();

        // left flank: the run must be followed by a non-space character;
        // `_` additionally must not start mid-word
        match src[pos..].chars().next() {
            None => return None,
            Some(c) if c.is_whitespace() => return None,
            Some(_) => {}
        }
        if marker_char == b'_' {
            if let Some(prev) = src[..m.start()].chars().next_back() {
                if prev.is_alphanumeric() || prev == '_' {
                    return None;
                }
            }
        }

        let (hole, marker_len) = if run.len() > 3 {
            if state.flags.in_emphasis || state.flags.in_strong {
                state.push_text(safe_entity(run));
                return Some(pos);
            }
            (&run[..run.len() - 3], 3)
        } else {
            if (run.len() == 1 && state.flags.in_emphasis)
                || (run.len() == 2 && state.flags.in_strong)
            {
                state.push_text(safe_entity(run));
                return Some(pos);
            }
            ("", run.len())
        };
        let marker = &run[run.len() - marker_len..];

        let m1 = match scanners::emphasis_closer(marker_char, marker_len).captures(&src[pos..]) {
            Some(m1) => m1,
            None => {
                // unterminated: the whole run, hole included, stays literal
                state.push_text(safe_entity(run));
                return Some(pos);
            }
        };
        let interior: &'i str = m1.get(1).unwrap().as_str();
        let end_pos = pos + m1.get(0).unwrap().end();

        if !hole.is_empty() {
            state.push_text(safe_entity(hole));
        }

        if let Some(resolved) = self.precedence_scan(marker, interior, pos, state) {
            return Some(resolved);
        }

        let token = match marker_len {
            1 => Token::Emph(self.parse_nested(state, interior, |f| f.in_emphasis = true)),
            2 => Token::Strong(self.parse_nested(state, interior, |f| f.in_strong = true)),
            _ => Token::Emph(vec![Token::Strong(self.parse_nested(state, interior, |f| {
                f.in_emphasis = true;
                f.in_strong = true;
            }))]),
        };
        state.push(token);
        Some(end_pos)
    }

    fn parse_link<'i>(
        &self,
        caps: &Captures<'i>,
        state: &mut InlineState<'i, '_>,
    ) -> Option<usize> {
        let m = caps.get(0).unwrap();
        let src = state.src;
        let pos = m.end();
        let marker = m.as_str();
        let is_image = marker.starts_with('!');

        if (is_image && state.flags.in_image) || (!is_image && state.flags.in_link) {
            state.push_text(marker.to_string());
            return Some(pos);
        }

        // a balanced no-bracket label first; failing that, arbitrary link
        // text up to the unbalancing bracket
        let (mut label, text, mut end_pos) = match scanners::link_label(src, pos) {
            Some((label, end)) => (Some(label), label, end),
            None => {
                let (text, end) = scanners::link_text(src, pos)?;
                (None, text, end)
            }
        };

        if end_pos >= src.len() && label.is_none() {
            return None;
        }

        if let Some(resolved) = self.precedence_scan(marker, text, pos, state) {
            return Some(resolved);
        }

        if end_pos < src.len() {
            let c = src.as_bytes()[end_pos];
            if c == b'(' {
                // standard link [text](<url> "title")
                if let Some((url, title, pos2)) = parse_std_link(src, end_pos + 1) {
                    self.add_link_token(is_image, text, url, title, state);
                    return Some(pos2);
                }
            } else if c == b'[' {
                // standard ref link [text][label]
                if let Some((label2, pos2)) = scanners::link_label(src, end_pos + 1) {
                    end_pos = pos2;
                    if !label2.is_empty() {
                        label = Some(label2);
                    }
                }
            }
        }

        let label = label?;
        let env: &RefMap = state.env;
        let rref = env.get(label)?;
        let url = escape_href(&rref.url);
        let title = rref.title.as_deref().map(safe_entity);
        self.add_link_token(is_image, text, url, title, state);
        Some(end_pos)
    }

    fn add_link_token<'i>(
        &self,
        is_image: bool,
        text: &'i str,
        url: String,
        title: Option<String>,
        state: &mut InlineState<'i, '_>,
    ) {
        let children = if is_image {
            self.parse_nested(state, text, |f| f.in_image = true)
        } else {
            self.parse_nested(state, text, |f| f.in_link = true)
        };
        let link = NodeLink {
            url,
            title,
            children,
        };
        state.push(if is_image {
            Token::Image(link)
        } else {
            Token::Link(link)
        });
    }

    fn parse_auto_link(
        &self,
        caps: &Captures,
        state: &mut InlineState,
        prec_end: Option<usize>,
    ) -> Option<usize> {
        let m = caps.get(0).unwrap();
        let pos = m.end();
        if let Some(boundary) = prec_end {
            if boundary > pos {
                return None;
            }
        }

        if state.flags.in_link {
            state.push_text(safe_entity(m.as_str()));
            return Some(pos);
        }

        let text = &m.as_str()[1..m.as_str().len() - 1];
        self.add_auto_link(escape_href(text), text, state);
        Some(pos)
    }

    fn parse_auto_email(
        &self,
        caps: &Captures,
        state: &mut InlineState,
        prec_end: Option<usize>,
    ) -> Option<usize> {
        let m = caps.get(0).unwrap();
        let pos = m.end();
        if let Some(boundary) = prec_end {
            if boundary > pos {
                return None;
            }
        }

        if state.flags.in_link {
            state.push_text(safe_entity(m.as_str()));
            return Some(pos);
        }

        let text = &m.as_str()[1..m.as_str().len() - 1];
        let url = format!("mailto:{}", text);
        self.add_auto_link(escape_href(&url), text, state);
        Some(pos)
    }

    fn add_auto_link(&self, url: String, text: &str, state: &mut InlineState) {
        state.push(Token::Link(NodeLink {
            url,
            title: None,
            children: vec![Token::Text(safe_entity(text))],
        }));
    }

    fn parse_inline_html(
        &self,
        caps: &Captures,
        state: &mut InlineState,
        prec_end: Option<usize>,
    ) -> Option<usize> {
        let m = caps.get(0).unwrap();
        let end_pos = m.end();
        if let Some(boundary) = prec_end {
            if boundary > end_pos {
                return None;
            }
        }

        let html = m.as_str();
        state.push(Token::HtmlInline(html.to_string()));

        // autolink recognition depends on knowing whether an anchor tag is
        // open, case-insensitive on the `a`
        if is_anchor_open(html) {
            state.flags.in_link = true;
        } else if is_anchor_close(html) {
            state.flags.in_link = false;
        }
        Some(end_pos)
    }

    fn parse_nested<'i>(
        &self,
        state: &InlineState<'i, '_>,
        src: &'i str,
        set_flags: impl FnOnce(&mut Flags),
    ) -> Vec<Token> {
        let mut child = state.child(src);
        set_flags(&mut child.flags);
        if child.depth > MAX_NESTING_DEPTH {
            // fail closed: past the depth limit the interior stays literal
            child.push_text(safe_entity(src));
        } else {
            self.parse_at(&mut child, 0);
        }
        child.tokens
    }
}

fn parse_std_link(src: &str, pos: usize) -> Option<(String, Option<String>, usize)> {
    let (href, href_pos) = scanners::link_destination(src, pos)?;
    let (title, next_pos) = match scanners::link_title(src, href_pos) {
        Some((title, title_pos)) => (Some(title), title_pos),
        None => (None, href_pos),
    };
    let end_pos = scanners::paren_end(src, next_pos)?;

    let url = escape_href(&unescape_char(href));
    let title = title.map(|t| safe_entity(&unescape_char(t)));
    Some((url, title, end_pos))
}

fn is_anchor_open(html: &str) -> bool {
    let bytes = html.as_bytes();
    bytes.len() >= 3 && (bytes[1] | 32) == b'a' && (bytes[2] == b' ' || bytes[2] == b'>')
}

fn is_anchor_close(html: &str) -> bool {
    let bytes = html.as_bytes();
    bytes.len() >= 4
        && bytes[1] == b'/'
        && (bytes[2] | 32) == b'a'
        && (bytes[3] == b' ' || bytes[3] == b'>')
}
