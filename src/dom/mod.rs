//! Page content processing
//!
//! This module holds everything that works on captured markup rather than on a live page:
//! - sanitize: strip noise (scripts, styles, comments, wrapper tags) before prompting
//! - keyword_filter: narrow content to elements of candidate tags mentioning a keyword
//! - tag_family: map an extraction instruction to the tags it is about
//! - role / xpath: offline role and XPath evaluation used by [`crate::browser::StaticPage`]

pub mod keyword_filter;
pub mod role;
pub mod sanitize;
pub mod tag_family;
pub mod xpath;

pub use keyword_filter::{KEYWORD_SEPARATOR, filter_by_keyword, filter_by_tags};
pub use sanitize::{DEFAULT_WRAPPER_TAGS, SanitizeOptions, sanitize};
pub use tag_family::{TagFamily, classify};
