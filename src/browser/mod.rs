//! Browser driver abstraction
//!
//! The engine only talks to a page through [`PageDriver`]: read the content, count/click/fill
//! a [`Locator`], press keys and clone elements out of the live DOM. Two drivers ship with the
//! crate:
//! - [`ChromePage`]: a Chrome/Chromium tab driven over CDP (headless_chrome)
//! - [`StaticPage`]: an in-memory page over captured HTML that records interactions

pub mod chrome;
pub mod config;
pub mod session;
pub mod static_page;

pub use chrome::ChromePage;
pub use config::{ConnectionOptions, LaunchOptions};
pub use session::BrowserSession;
pub use static_page::{Interaction, StaticPage};

use crate::error::Result;
use crate::locator::Locator;
use std::time::Duration;

/// Narrow capability interface over a rendered page
pub trait PageDriver {
    /// Current page markup
    fn content(&self) -> Result<String>;

    /// Navigate to `url` and wait for the load to finish
    fn navigate(&self, url: &str) -> Result<()>;

    /// Number of elements the locator currently matches
    fn count(&self, locator: &Locator) -> Result<usize>;

    /// Click the element the locator resolves to
    fn click(&self, locator: &Locator) -> Result<()>;

    /// Replace the value of the element the locator resolves to
    fn fill(&self, locator: &Locator, value: &str) -> Result<()>;

    /// Dispatch a key press to the focused element
    fn press_key(&self, key: &str) -> Result<()>;

    /// Clones of every body element matching one of `tags`, concatenated in document order
    fn select_outer_html(&self, tags: &[&str]) -> Result<String>;

    /// Pause between interactions
    fn wait(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: PageDriver + ?Sized> PageDriver for &T {
    fn content(&self) -> Result<String> {
        (**self).content()
    }

    fn navigate(&self, url: &str) -> Result<()> {
        (**self).navigate(url)
    }

    fn count(&self, locator: &Locator) -> Result<usize> {
        (**self).count(locator)
    }

    fn click(&self, locator: &Locator) -> Result<()> {
        (**self).click(locator)
    }

    fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        (**self).fill(locator, value)
    }

    fn press_key(&self, key: &str) -> Result<()> {
        (**self).press_key(key)
    }

    fn select_outer_html(&self, tags: &[&str]) -> Result<String> {
        (**self).select_outer_html(tags)
    }

    fn wait(&self, duration: Duration) {
        (**self).wait(duration)
    }
}
