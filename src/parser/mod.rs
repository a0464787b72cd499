pub mod inlines;

use std::error::Error;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::nodes::Token;
use crate::scanners::{self, Scanner};
use crate::strings::normalize_label;

pub use crate::parser::inlines::{Flags, InlineState};

/// Options for inline parsing, selected once at engine construction.
#[derive(Debug, Default, Clone, Copy)]
pub struct Options {
    /// Treat every newline as a hard break. When unset, hard breaks
    /// require a backslash or two trailing spaces, and other newlines
    /// become soft breaks.
    pub hard_wrap: bool,
}

/// A reference link's resolved details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedReference {
    /// The destination URL of the reference link.
    pub url: String,

    /// The optional title of the reference link.
    pub title: Option<String>,
}

/// The reference-link definition table, built by the block layer before any
/// inline parsing begins and read-only afterwards. Keys are normalized
/// labels; both insertion and lookup normalize, so `[Foo Bar]` and
/// `[foo   bar]` address the same entry.
#[derive(Debug, Default)]
pub struct RefMap {
    map: FxHashMap<String, ResolvedReference>,
}

impl RefMap {
    pub fn new() -> Self {
        RefMap {
            map: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, label: &str, url: &str, title: Option<&str>) {
        self.map.insert(
            normalize_label(label),
            ResolvedReference {
                url: url.to_string(),
                title: title.map(str::to_string),
            },
        );
    }

    pub fn get(&self, label: &str) -> Option<&ResolvedReference> {
        self.map.get(&normalize_label(label))
    }
}

/// The closed set of inline rules. `Custom` indexes into the parser's
/// registered-rule table; everything else dispatches statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RuleKind {
    Escape,
    Codespan,
    Emphasis,
    Link,
    AutoLink,
    AutoEmail,
    InlineHtml,
    Linebreak,
    Softbreak,
    PrecAutoLink,
    PrecInlineHtml,
    Custom(usize),
}

impl RuleKind {
    fn group_name(self) -> &'static str {
        match self {
            RuleKind::Escape => "escape",
            RuleKind::Codespan => "codespan",
            RuleKind::Emphasis => "emphasis",
            RuleKind::Link => "link",
            RuleKind::AutoLink => "auto_link",
            RuleKind::AutoEmail => "auto_email",
            RuleKind::InlineHtml => "inline_html",
            RuleKind::Linebreak => "linebreak",
            RuleKind::Softbreak => "softbreak",
            RuleKind::PrecAutoLink => "prec_auto_link",
            RuleKind::PrecInlineHtml => "prec_inline_html",
            RuleKind::Custom(_) => unreachable!("custom rules carry their own name"),
        }
    }
}

// Active order for the main scanner. Custom rules slot in ahead of the
// break rules so they can claim text before the fallback constructs do.
const DEFAULT_RULES: [RuleKind; 7] = [
    RuleKind::Escape,
    RuleKind::Codespan,
    RuleKind::Emphasis,
    RuleKind::Link,
    RuleKind::AutoLink,
    RuleKind::AutoEmail,
    RuleKind::InlineHtml,
];

const PREC_RULES: [RuleKind; 3] = [
    RuleKind::Codespan,
    RuleKind::PrecAutoLink,
    RuleKind::PrecInlineHtml,
];

/// The portion of a scanner match handed to custom rule handlers.
pub struct RuleMatch<'t> {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) text: &'t str,
}

impl<'t> RuleMatch<'t> {
    /// Byte offset of the match in the current span.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset just past the match.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The matched text.
    pub fn as_str(&self) -> &'t str {
        self.text
    }
}

/// A custom inline rule's handler: receives the parser (for recursion into
/// nested spans), the start-pattern match, the parse state, and the
/// precedence boundary when invoked from the resolver. Returns the new
/// cursor position, or `None` if the construct did not complete.
pub type RuleHandler = Box<
    dyn Fn(&InlineParser, &RuleMatch, &mut InlineState, Option<usize>) -> Option<usize>
        + Send
        + Sync,
>;

pub(crate) struct CustomRule {
    pub name: String,
    pub handler: RuleHandler,
}

/// An error registering a custom inline rule. Registration is the only
/// fallible surface of the engine; parsing itself never fails.
#[derive(Debug)]
pub enum RuleError {
    /// Rule names must be ASCII identifiers usable as regex group names,
    /// and patterns may not declare named groups of their own.
    InvalidName(String),
    /// The name is already taken by a built-in or registered rule.
    DuplicateName(String),
    /// The start pattern did not compile.
    Pattern(regex::Error),
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuleError::InvalidName(name) => write!(f, "invalid rule name: {:?}", name),
            RuleError::DuplicateName(name) => write!(f, "duplicate rule name: {:?}", name),
            RuleError::Pattern(err) => write!(f, "invalid rule pattern: {}", err),
        }
    }
}

impl Error for RuleError {}

impl From<regex::Error> for RuleError {
    fn from(err: regex::Error) -> Self {
        RuleError::Pattern(err)
    }
}

/// The inline parsing engine. Construction compiles the two scanners (full
/// and precedence-restricted) for the active rule set; `parse` may then be
/// called any number of times, on any number of spans.
pub struct InlineParser {
    pub(crate) options: Options,
    pub(crate) custom: Vec<CustomRule>,
    custom_patterns: Vec<String>,
    pub(crate) scanner: Scanner,
    pub(crate) prec_scanner: Scanner,
}

impl InlineParser {
    pub fn new(options: Options) -> InlineParser {
        // Built-in patterns always compile.
        let scanner = Scanner::compile(&full_rule_specs(options, &[], &[])).unwrap();
        let prec_scanner = Scanner::compile(&prec_rule_specs()).unwrap();
        InlineParser {
            options,
            custom: Vec::new(),
            custom_patterns: Vec::new(),
            scanner,
            prec_scanner,
        }
    }

    /// Register a custom inline rule: a start pattern locating candidates,
    /// and a handler invoked on each candidate. The rule scans ahead of
    /// the line-break rules, after the built-in constructs.
    pub fn register_rule(
        &mut self,
        name: &str,
        pattern: &str,
        handler: RuleHandler,
    ) -> Result<(), RuleError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            || name.starts_with(|c: char| c.is_ascii_digit())
        {
            return Err(RuleError::InvalidName(name.to_string()));
        }
        let taken = self.custom.iter().any(|r| r.name == name)
            || DEFAULT_RULES
                .iter()
                .chain(&PREC_RULES)
                .chain(&[RuleKind::Linebreak, RuleKind::Softbreak])
                .any(|k| k.group_name() == name);
        if taken {
            return Err(RuleError::DuplicateName(name.to_string()));
        }
        if pattern.contains("(?P<") {
            return Err(RuleError::InvalidName(name.to_string()));
        }
        // Validate the pattern on its own before paying for recompilation.
        regex::Regex::new(pattern)?;

        self.custom.push(CustomRule {
            name: name.to_string(),
            handler,
        });
        self.custom_patterns.push(pattern.to_string());
        self.scanner = Scanner::compile(&full_rule_specs(
            self.options,
            &self.custom,
            &self.custom_patterns,
        ))?;
        Ok(())
    }

    /// Parse one inline span against a reference table, producing the
    /// token tree.
    pub fn parse(&self, src: &str, env: &RefMap) -> Vec<Token> {
        let mut state = InlineState::new(src, env);
        self.parse_into(&mut state);
        state.tokens
    }
}

fn full_rule_specs(
    options: Options,
    custom: &[CustomRule],
    custom_patterns: &[String],
) -> Vec<(RuleKind, String, String)> {
    let mut specs: Vec<(RuleKind, String, String)> = DEFAULT_RULES
        .iter()
        .map(|&kind| {
            (
                kind,
                kind.group_name().to_string(),
                scanners::start_pattern(kind, options.hard_wrap).to_string(),
            )
        })
        .collect();

    for (ix, rule) in custom.iter().enumerate() {
        specs.push((
            RuleKind::Custom(ix),
            rule.name.clone(),
            custom_patterns[ix].clone(),
        ));
    }

    specs.push((
        RuleKind::Linebreak,
        RuleKind::Linebreak.group_name().to_string(),
        scanners::start_pattern(RuleKind::Linebreak, options.hard_wrap).to_string(),
    ));
    if !options.hard_wrap {
        specs.push((
            RuleKind::Softbreak,
            RuleKind::Softbreak.group_name().to_string(),
            scanners::start_pattern(RuleKind::Softbreak, options.hard_wrap).to_string(),
        ));
    }

    specs
}

fn prec_rule_specs() -> Vec<(RuleKind, String, String)> {
    PREC_RULES
        .iter()
        .map(|&kind| {
            (
                kind,
                kind.group_name().to_string(),
                scanners::start_pattern(kind, false).to_string(),
            )
        })
        .collect()
}

/// Parse a span and render it as HTML in one step.
pub fn inline_to_html(src: &str, env: &RefMap, options: &Options) -> String {
    let parser = InlineParser::new(*options);
    crate::html::render(&parser.parse(src, env))
}
