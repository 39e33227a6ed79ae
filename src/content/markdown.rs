//! Markdown rendering for post bodies.
//!
//! Thin wrapper around `pulldown-cmark` with the extensions a blog
//! actually needs (tables, footnotes, strikethrough, task lists).

use pulldown_cmark::{Options, Parser, html};

/// Render markdown text to an HTML string.
pub fn render(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
