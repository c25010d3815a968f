//! Markdown rendering
//!
//! Documents are served as HTML fragments hosted inside desktop windows, so
//! rendering produces a bare fragment with no surrounding page.

use pulldown_cmark::{html, Options, Parser};

/// Convert markdown source to an HTML fragment.
///
/// Leading metadata comments pass through as raw HTML blocks.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_output, parser);
    html_output
}
