//! A Markdown inline-span parser.
//!
//! `markspan` is the inline half of a Markdown compiler: given one span of
//! inline text (the content of a paragraph, heading or list item, already
//! stripped of block structure) and a table of reference-link definitions,
//! it produces an ordered [`Token`] tree covering emphasis, strong, links,
//! images, code spans, autolinks, raw inline HTML and line breaks. Block
//! structure and final output formatting are left to callers; a small HTML
//! sink is included in [`html`].
//!
//! ```
//! use markspan::{InlineParser, Options, RefMap};
//!
//! let parser = InlineParser::new(Options::default());
//! let mut refmap = RefMap::new();
//! refmap.insert("foo", "/f", None);
//!
//! let tokens = parser.parse("some *emphasis* and a [foo] link", &refmap);
//! assert_eq!(
//!     markspan::html::render(&tokens),
//!     "some <em>emphasis</em> and a <a href=\"/f\">foo</a> link"
//! );
//! ```

#[macro_use]
extern crate lazy_static;

mod character_set;
mod ctype;
mod entity;
mod parser;
mod scanners;
mod strings;

pub mod html;
pub mod nodes;

#[cfg(test)]
mod tests;

pub use crate::nodes::{NodeLink, Token};
pub use crate::parser::{
    inline_to_html, Flags, InlineParser, InlineState, Options, RefMap, ResolvedReference,
    RuleError, RuleHandler, RuleMatch,
};
