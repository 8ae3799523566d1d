//! Instruction → tag family classification for extraction
//!
//! Rules are evaluated in a fixed priority order and the first matching rule wins.

/// A group of tag names treated as one target for extraction filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagFamily {
    /// Human-readable family name (e.g. "heading")
    pub name: &'static str,

    /// Tags belonging to the family
    pub tags: &'static [&'static str],
}

impl TagFamily {
    /// CSS selector list covering the family (`h1, h2, ...`)
    pub fn selector(&self) -> String {
        self.tags.join(", ")
    }
}

/// One classification rule: any `word` (optionally plural) or exact `token` selects `family`
struct FamilyRule {
    words: &'static [&'static str],
    tokens: &'static [&'static str],
    family: TagFamily,
}

impl FamilyRule {
    fn matches(&self, token: &str) -> bool {
        self.tokens.contains(&token)
            || self
                .words
                .iter()
                .any(|word| token == *word || token.strip_suffix('s') == Some(*word))
    }
}

const RULES: &[FamilyRule] = &[
    FamilyRule { words: &["link"], tokens: &[], family: TagFamily { name: "link", tags: &["a"] } },
    FamilyRule { words: &["button"], tokens: &[], family: TagFamily { name: "button", tags: &["button"] } },
    FamilyRule { words: &["input"], tokens: &[], family: TagFamily { name: "input", tags: &["input"] } },
    FamilyRule { words: &["form"], tokens: &[], family: TagFamily { name: "form", tags: &["form"] } },
    FamilyRule { words: &["image"], tokens: &["img"], family: TagFamily { name: "image", tags: &["img"] } },
    FamilyRule {
        words: &["heading"],
        tokens: &["h1", "h2", "h3", "h4", "h5", "h6"],
        family: TagFamily { name: "heading", tags: &["h1", "h2", "h3", "h4", "h5", "h6"] },
    },
    FamilyRule { words: &["paragraph"], tokens: &["p"], family: TagFamily { name: "paragraph", tags: &["p"] } },
    FamilyRule { words: &["div"], tokens: &[], family: TagFamily { name: "div", tags: &["div"] } },
    FamilyRule { words: &["span"], tokens: &[], family: TagFamily { name: "span", tags: &["span"] } },
    FamilyRule { words: &["table"], tokens: &[], family: TagFamily { name: "table", tags: &["table"] } },
    FamilyRule { words: &["list"], tokens: &["ul", "ol"], family: TagFamily { name: "list", tags: &["ul", "ol"] } },
];

/// Classify an instruction into at most one tag family.
///
/// Matching is on whole words of the lower-cased instruction, so "help" never selects
/// the paragraph family and "links" selects the link family.
pub fn classify(instruction: &str) -> Option<TagFamily> {
    let lowered = instruction.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    RULES
        .iter()
        .find(|rule| tokens.iter().any(|token| rule.matches(token)))
        .map(|rule| rule.family)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family_name(instruction: &str) -> Option<&'static str> {
        classify(instruction).map(|f| f.name)
    }

    #[test]
    fn test_first_rule_wins() {
        // link is checked before image
        let family = classify("get all the links and images").unwrap();
        assert_eq!(family.tags, &["a"]);
        assert_eq!(family_name("list every image and button"), Some("button"));
    }

    #[test]
    fn test_plural_and_singular() {
        assert_eq!(family_name("extract the link"), Some("link"));
        assert_eq!(family_name("extract the buttons"), Some("button"));
        assert_eq!(family_name("Collect all INPUTS"), Some("input"));
    }

    #[test]
    fn test_tag_tokens() {
        assert_eq!(family_name("what does the h2 say"), Some("heading"));
        assert_eq!(family_name("text of every <p> tag"), Some("paragraph"));
        assert_eq!(family_name("items in the ul"), Some("list"));
        assert_eq!(family_name("src of each img"), Some("image"));
    }

    #[test]
    fn test_no_substring_matches() {
        assert_eq!(family_name("help me find the price"), None);
        assert_eq!(family_name("extract the product description"), None);
        assert_eq!(family_name("tables"), Some("table"));
        assert_eq!(family_name("the platform name"), None);
    }

    #[test]
    fn test_heading_selector() {
        let family = classify("all headings").unwrap();
        assert_eq!(family.selector(), "h1, h2, h3, h4, h5, h6");
    }
}
