//! System prompts and prompt builders
//!
//! The prompts carry the role/action/selector vocabulary the rest of the engine relies on:
//! changing their wording changes what the oracle produces.

/// Keyword + candidate tags for narrowing
pub const KEYWORD_SYSTEM: &str = r#"You are an expert at picking the best keyword from an instruction.
A keyword is a word that can be searched for among many others to determine the best element.
E.g. "Find the login button": the keyword is "login". E.g. "Find the email field": the keyword is "email".

Based on the instruction, you also pick the best tags to filter the HTML content.
If the keyword is "login", it can only really be found in the following tags:
input, button, a, h1 (and the rest of the heading tags), span, p.

Be accurate with the keyword: if the user writes 'Log in' the keyword is Log in, not login.
Keywords are a single word unless the user states otherwise, e.g. 'Log in' vs login."#;

/// Selector for an element to act on
pub const SELECTOR_SYSTEM: &str = r#"You are an expert at picking selectors for clickable elements.

IMPORTANT: If the element itself is not clickable (like a span or div),
find its clickable parent (button, a, [role="button"], etc).

Use XPath to traverse up the DOM tree with ancestor::
Example: xpath=//span[contains(text(), "Search")]/ancestor::button

Only generate selectors in these formats:
1. CSS: button.class, a[href], input[name="username"]
2. XPath with ancestors: xpath=//span[contains(text(), "Search")]/ancestor::button

If finding by text, use: xpath=//*[contains(text(), "Search")]
- Find input by name: input[name="username"]

Return ONLY the selector string, nothing else."#;

/// Action kind and fill value
pub const ACTION_SYSTEM: &str = r#"You are an expert at picking browser actions to perform on a webpage.
You will be given an instruction and you need to pick the appropriate action to perform.

The actions you can perform are:
- click: click on the element
- fill: fill the element with the value (this is the only action that requires a value)
- locate: locate the element"#;

/// Role-based intent for act
pub const ROLE_INTENT_SYSTEM: &str = r#"Extract intent.
targetText: exact case-sensitive text (e.g., 'Log in', 'Username')
role: button | link | textbox
action: click | fill | locate
value: for fill actions
index: for positional access (0=first, 1=second)"#;

/// Role-based query for observe
pub const ROLE_QUERY_SYSTEM: &str = r#"Extract intent.
targetText: exact case-sensitive text
role: button | link | textbox
index: for positional access"#;

/// Selector for an element whose presence is checked
pub const OBSERVE_SYSTEM: &str = r#"You are an expert at picking the appropriate selector for an element on a webpage.
You will be given a piece of HTML content and an instruction describing an element.
Return the selector that would match the described element, in one of these formats:
1. CSS: button.class, a[href], input[name="username"]
2. XPath: xpath=//*[contains(text(), "Search")]

If no element in the content matches the description, return an empty selector.
Return ONLY the selector string, nothing else."#;

/// Schema-driven extraction
pub const EXTRACT_SYSTEM: &str = r#"You are an expert web content extraction agent.
You are given an instruction and the HTML of a webpage.
Your task is to extract only the requested structured data, matching the provided schema exactly.
Be concise, precise, and return only relevant information."#;

/// Prompt pairing page content with an instruction
pub fn content_prompt(content: &str, instruction: &str) -> String {
    format!("Content: {}, Instruction: {}", content, instruction)
}

/// Prompt carrying only the instruction
pub fn instruction_prompt(instruction: &str) -> String {
    format!("Instruction: {}", instruction)
}

/// Prompt for extraction
pub fn extract_prompt(instruction: &str, content: &str) -> String {
    format!("Instruction: {}\nHTML Content: {}", instruction, content)
}
