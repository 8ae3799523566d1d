//! # cuehand
//!
//! Natural-language browser actions and schema-driven extraction over Chrome DevTools Protocol
//! (CDP). An instruction such as "click the login button" or "type %password% into the password
//! field" is resolved by a structured-generation model into a target element and an action,
//! then executed against the live page.
//!
//! ## Pipeline
//!
//! 1. The page content is sanitized (comments, scripts, styles, svg, wrapper tags removed)
//!    and, for selector resolution, optionally narrowed to elements mentioning a keyword
//! 2. The oracle turns the instruction into a target (a CSS/XPath selector or a role with an
//!    exact accessible name) and an action (`click`, `fill` or `locate`)
//! 3. The target is resolved to a locator and counted against the live page
//! 4. The action runs only when the locator matched something
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cuehand::{ActOptions, BrowserSession, Cuehand, GeminiOracle, LaunchOptions};
//!
//! # fn main() -> cuehand::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! let cuehand = Cuehand::new(session.page()?, GeminiOracle::from_env()?);
//!
//! cuehand.goto("https://example.com/login")?;
//! cuehand.act_with(
//!     "type %user% into the username field",
//!     &ActOptions::new().variable("user", "alice"),
//! )?;
//! let result = cuehand.act("click the 'Log in' button")?;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```
//!
//! ### Extraction
//!
//! ```rust,no_run
//! # use cuehand::{BrowserSession, Cuehand, GeminiOracle, LaunchOptions};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Links {
//!     /// Link labels, in page order
//!     labels: Vec<String>,
//! }
//!
//! # fn main() -> cuehand::Result<()> {
//! # let session = BrowserSession::launch(LaunchOptions::default())?;
//! # let cuehand = Cuehand::new(session.page()?, GeminiOracle::from_env()?);
//! let links: Links = cuehand.extract("get all the links")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing without a browser or a model
//!
//! [`StaticPage`] evaluates locators over captured HTML and records interactions;
//! [`ScriptedOracle`] answers from a queue of canned JSON replies.
//!
//! ## Module Overview
//!
//! - [`browser`]: the [`PageDriver`] trait, the Chrome session and the in-memory page
//! - [`dom`]: sanitization, keyword narrowing, tag families, offline role/XPath evaluation
//! - [`oracle`]: the [`IntentOracle`] boundary, prompts and backends
//! - [`locator`]: target descriptors and element resolution
//! - [`actions`]: action intents, variable substitution and execution
//! - [`extract`]: schema-driven extraction
//! - [`error`]: error types and result aliases

pub mod actions;
pub mod browser;
pub mod config;
pub mod cuehand;
pub mod dom;
pub mod error;
pub mod extract;
pub mod intent;
pub mod locator;
pub mod oracle;

pub use actions::{ActOptions, ActResult, ActionExecutor, ActionIntent, ActionKind};
pub use browser::{BrowserSession, ChromePage, ConnectionOptions, Interaction, LaunchOptions, PageDriver, StaticPage};
pub use config::{CuehandConfig, NotFoundPolicy, ResolutionStrategy};
pub use cuehand::{Cuehand, ObserveResult};
pub use dom::SanitizeOptions;
pub use error::{CuehandError, Result};
pub use extract::ExtractionEngine;
pub use locator::{ElementResolver, Locator, Resolution, RoleDescriptor, TargetDescriptor};
#[cfg(feature = "gemini")]
pub use oracle::{GeminiOptions, GeminiOracle};
pub use oracle::{IntentOracle, OracleRequest, ScriptedOracle};
