//! Page content sanitation
//!
//! Strips markup that carries no meaning for instruction resolution (comments, scripts,
//! styles, svg, link/meta tags and structural wrapper tags) and collapses the result to its
//! non-blank lines. The removal runs on a streaming HTML rewriter, so untouched bytes are
//! copied through verbatim and nothing is ever inserted.

use lol_html::{RewriteStrSettings, doc_comments, element, rewrite_str};

/// Structural wrapper tags removed by default (tags only, content is kept)
pub const DEFAULT_WRAPPER_TAGS: &[&str] = &["html", "body", "div", "span", "section", "main", "header", "footer", "nav"];

/// Options controlling what the sanitizer removes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Remove `<svg>` subtrees
    pub strip_svg: bool,

    /// Tags whose opening/closing tags are dropped while their content is kept
    pub wrapper_tags: Vec<String>,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            strip_svg: true,
            wrapper_tags: DEFAULT_WRAPPER_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl SanitizeOptions {
    /// Create options with the default removal set
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `div`/`span` wrappers and svg icons so layout hints survive
    pub fn preserve_layout() -> Self {
        Self {
            strip_svg: false,
            wrapper_tags: DEFAULT_WRAPPER_TAGS
                .iter()
                .filter(|t| !matches!(**t, "div" | "span"))
                .map(|t| t.to_string())
                .collect(),
        }
    }

    /// Builder method: toggle svg removal
    pub fn strip_svg(mut self, strip: bool) -> Self {
        self.strip_svg = strip;
        self
    }

    /// Builder method: replace the wrapper tag set
    pub fn wrapper_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wrapper_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Whether `tag` is a plain element name that is safe to use as a selector
pub(crate) fn is_valid_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Sanitize raw page content with the given options
///
/// Removing a tag can join the text around it into new markup (`<<div></div>script>`), so
/// passes repeat until the output stops changing. Every pass only removes bytes.
pub fn sanitize(raw: &str, options: &SanitizeOptions) -> String {
    let mut current = collapse_blank_lines(&strip(raw, options));
    loop {
        let next = collapse_blank_lines(&strip(&current, options));
        if next.len() >= current.len() {
            return current;
        }
        current = next;
    }
}

/// One rewriter pass over `raw`
fn strip(raw: &str, options: &SanitizeOptions) -> String {
    let mut handlers = vec![
        element!("script", |el| {
            el.remove();
            Ok(())
        }),
        element!("style", |el| {
            el.remove();
            Ok(())
        }),
        element!("link", |el| {
            el.remove();
            Ok(())
        }),
        element!("meta", |el| {
            el.remove();
            Ok(())
        }),
    ];

    if options.strip_svg {
        handlers.push(element!("svg", |el| {
            el.remove();
            Ok(())
        }));
    }

    for tag in &options.wrapper_tags {
        if !is_valid_tag_name(tag) {
            log::warn!("Ignoring invalid wrapper tag '{}'", tag);
            continue;
        }
        handlers.push(element!(tag.as_str(), |el| {
            el.remove_and_keep_content();
            Ok(())
        }));
    }

    rewrite_str(
        raw,
        RewriteStrSettings {
            element_content_handlers: handlers,
            document_content_handlers: vec![doc_comments!(|c| {
                c.remove();
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .unwrap_or_else(|e| {
        log::debug!("HTML rewriter gave up ({}), keeping raw content", e);
        raw.to_string()
    })
}

/// Keep only the lines that contain something other than whitespace
fn collapse_blank_lines(text: &str) -> String {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
