//! Target descriptors and element resolution
//!
//! The oracle describes *which* element an instruction refers to, either as a raw selector
//! string or as a role + exact name pair. [`ElementResolver`] turns that description into a
//! [`Locator`] and counts its matches against the live page before anything acts on it.

use crate::browser::PageDriver;
use crate::error::{CuehandError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A live, re-evaluatable reference to zero or more elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Locator {
    /// CSS selector
    Css {
        selector: String,
        nth: Option<usize>,
    },
    /// XPath expression (without any `xpath=` marker)
    XPath {
        expression: String,
        nth: Option<usize>,
    },
    /// ARIA role with an accessible name
    Role {
        role: String,
        name: String,
        exact: bool,
        nth: Option<usize>,
    },
}

impl Locator {
    /// Create a CSS locator
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css { selector: selector.into(), nth: None }
    }

    /// Create an XPath locator
    pub fn xpath(expression: impl Into<String>) -> Self {
        Locator::XPath { expression: expression.into(), nth: None }
    }

    /// Create a role locator matching the accessible name exactly
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Locator::Role {
            role: role.into().trim().to_lowercase(),
            name: name.into(),
            exact: true,
            nth: None,
        }
    }

    /// Narrow the locator to its `index`-th match (0-based)
    pub fn nth(mut self, index: usize) -> Self {
        match &mut self {
            Locator::Css { nth, .. } | Locator::XPath { nth, .. } | Locator::Role { nth, .. } => *nth = Some(index),
        }
        self
    }

    /// Index the locator is narrowed to, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            Locator::Css { nth, .. } | Locator::XPath { nth, .. } | Locator::Role { nth, .. } => *nth,
        }
    }

    /// Role locators without an index refuse to act on more than one element.
    ///
    /// Selector locators act on their first match.
    pub fn is_strict(&self) -> bool {
        matches!(self, Locator::Role { nth: None, .. })
    }

    /// Parse an oracle-produced selector string.
    ///
    /// `xpath=...` and `xpath/...` carry an explicit XPath marker; bare expressions starting
    /// with `/` or `(` are XPath too. Everything else is CSS.
    pub fn parse_selector(selector: &str) -> Result<Self> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(CuehandError::InvalidSelector("selector is empty".to_string()));
        }

        if let Some(expression) = selector.strip_prefix("xpath=").or_else(|| selector.strip_prefix("xpath/")) {
            let expression = expression.trim();
            if expression.is_empty() {
                return Err(CuehandError::InvalidSelector(format!("'{}' has no XPath expression", selector)));
            }
            // `xpath//button` keeps its leading slashes, `xpath/button` gets one
            let expression = if selector.starts_with("xpath/") && !expression.starts_with('/') {
                format!("/{}", expression)
            } else {
                expression.to_string()
            };
            return Ok(Locator::xpath(expression));
        }

        if selector.starts_with('/') || selector.starts_with('(') {
            return Ok(Locator::xpath(selector));
        }

        Ok(Locator::css(selector))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css { selector, .. } => write!(f, "{}", selector)?,
            Locator::XPath { expression, .. } => write!(f, "xpath={}", expression)?,
            Locator::Role { role, name, .. } => write!(f, "'{}' ({})", name, role)?,
        }
        if let Some(index) = self.index() {
            write!(f, " [nth={}]", index)?;
        }
        Ok(())
    }
}

/// Role-based target description produced by the oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDescriptor {
    pub role: String,
    /// Exact, case-sensitive accessible name
    pub target_text: String,
    pub index: Option<usize>,
}

/// The oracle's description of which element an instruction refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetDescriptor {
    /// CSS or marked XPath selector string
    Selector(String),
    /// Role + exact name (+ index)
    Role(RoleDescriptor),
}

impl TargetDescriptor {
    /// Human-readable target, used in result messages
    pub fn describe(&self) -> String {
        match self {
            TargetDescriptor::Selector(selector) => selector.clone(),
            TargetDescriptor::Role(role) => format!("'{}' ({})", role.target_text, role.role),
        }
    }
}

/// A resolved locator with its match count at resolution time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub locator: Locator,
    pub count: usize,
}

impl Resolution {
    /// Whether the locator matched at least one element
    pub fn found(&self) -> bool {
        self.count > 0
    }
}

/// Resolves target descriptors against a page
pub struct ElementResolver<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
}

impl<'a, D: PageDriver + ?Sized> ElementResolver<'a, D> {
    pub fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Build the locator for a descriptor without touching the page
    pub fn locator_for(descriptor: &TargetDescriptor) -> Result<Locator> {
        match descriptor {
            TargetDescriptor::Selector(selector) => Locator::parse_selector(selector),
            TargetDescriptor::Role(role) => {
                let locator = Locator::role(&role.role, &role.target_text);
                Ok(match role.index {
                    Some(index) => locator.nth(index),
                    None => locator,
                })
            }
        }
    }

    /// Count the current matches of a locator
    pub fn count(&self, locator: &Locator) -> Result<usize> {
        self.driver.count(locator)
    }

    /// Build the locator for a descriptor and count its matches
    pub fn resolve(&self, descriptor: &TargetDescriptor) -> Result<Resolution> {
        let locator = Self::locator_for(descriptor)?;
        let count = self.count(&locator)?;
        log::debug!("Resolved {} to {} element(s)", locator, count);
        Ok(Resolution { locator, count })
    }
}
