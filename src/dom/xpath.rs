//! XPath evaluation over a parsed document, limited to the forms element selectors use:
//! `/` and `//` steps, the child, parent and ancestor axes, `*` or tag name tests, and
//! predicates made of a position or `contains()`, `=` and `@attr` checks joined with `and`.

use crate::error::{CuehandError, Result};
use scraper::{ElementRef, Html};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Parent,
    Ancestor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    Text,
    StringValue,
    Attr(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Exists(Operand),
    Equals(Operand, String),
    Contains(Operand, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    All(Vec<Condition>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    /// Step was introduced by `//`
    descendant: bool,
    axis: Axis,
    /// `None` matches any element
    name: Option<String>,
    predicates: Vec<Predicate>,
}

fn unsupported(expression: &str, reason: impl std::fmt::Display) -> CuehandError {
    CuehandError::InvalidSelector(format!("unsupported XPath '{}': {}", expression, reason))
}

/// Split `src` on a top-level separator (outside quotes, brackets and parentheses)
fn split_top_level<'s>(src: &'s str, separator: &str) -> Vec<&'s str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in src.char_indices() {
        if i < start {
            continue;
        }
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if depth == 0 && src[i..].starts_with(separator) => {
                parts.push(&src[start..i]);
                start = i + separator.len();
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '[' | '(' => depth += 1,
                ']' | ')' => depth -= 1,
                _ => {}
            },
        }
    }

    parts.push(&src[start..]);
    parts
}

fn parse_literal(expression: &str, src: &str) -> Result<String> {
    let src = src.trim();
    let quoted = src.len() >= 2 && (src.starts_with('"') && src.ends_with('"') || src.starts_with('\'') && src.ends_with('\''));
    if !quoted {
        return Err(unsupported(expression, format!("expected a string literal, got '{}'", src)));
    }
    Ok(src[1..src.len() - 1].to_string())
}

fn parse_operand(expression: &str, src: &str) -> Result<Operand> {
    let compact: String = src.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.as_str() {
        "text()" => Ok(Operand::Text),
        "." => Ok(Operand::StringValue),
        attr if attr.starts_with('@') && attr.len() > 1 => Ok(Operand::Attr(attr[1..].to_ascii_lowercase())),
        other => Err(unsupported(expression, format!("unknown operand '{}'", other))),
    }
}

fn parse_condition(expression: &str, src: &str) -> Result<Condition> {
    let src = src.trim();

    if let Some(inner) = src
        .strip_prefix("contains")
        .and_then(|rest| rest.trim_start().strip_prefix('('))
        .and_then(|rest| rest.trim_end().strip_suffix(')'))
    {
        return match split_top_level(inner, ",").as_slice() {
            [operand, literal] => Ok(Condition::Contains(
                parse_operand(expression, operand)?,
                parse_literal(expression, literal)?,
            )),
            _ => Err(unsupported(expression, "contains() takes two arguments")),
        };
    }

    match split_top_level(src, "=").as_slice() {
        [lhs, rhs] => Ok(Condition::Equals(parse_operand(expression, lhs)?, parse_literal(expression, rhs)?)),
        [single] => Ok(Condition::Exists(parse_operand(expression, single)?)),
        _ => Err(unsupported(expression, format!("cannot parse predicate '{}'", src))),
    }
}

fn parse_predicate(expression: &str, body: &str) -> Result<Predicate> {
    let body = body.trim();

    if !body.is_empty() && body.chars().all(|c| c.is_ascii_digit()) {
        return match body.parse::<usize>() {
            Ok(position) if position > 0 => Ok(Predicate::Position(position)),
            _ => Err(unsupported(expression, "positions start at 1")),
        };
    }

    split_top_level(body, " and ")
        .into_iter()
        .map(|part| parse_condition(expression, part))
        .collect::<Result<Vec<_>>>()
        .map(Predicate::All)
}

fn parse_step(expression: &str, src: &str, descendant: bool) -> Result<Step> {
    let src = src.trim();
    if src == ".." {
        return Ok(Step { descendant, axis: Axis::Parent, name: None, predicates: Vec::new() });
    }

    let (head, mut rest) = src.split_at(split_top_level(src, "[")[0].len());
    let (axis, test) = match head.split_once("::") {
        Some(("child", test)) => (Axis::Child, test),
        Some(("parent", test)) => (Axis::Parent, test),
        Some(("ancestor", test)) => (Axis::Ancestor, test),
        Some((other, _)) => return Err(unsupported(expression, format!("axis '{}'", other))),
        None => (Axis::Child, head),
    };

    let name = match test.trim() {
        "*" => None,
        name if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') => {
            Some(name.to_ascii_lowercase())
        }
        other => return Err(unsupported(expression, format!("node test '{}'", other))),
    };

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let Some(body) = rest.strip_prefix('[') else {
            return Err(unsupported(expression, format!("unexpected '{}'", rest)));
        };
        let close = split_top_level(body, "]")[0].len();
        if close >= body.len() {
            return Err(unsupported(expression, "unterminated predicate"));
        }
        predicates.push(parse_predicate(expression, &body[..close])?);
        rest = body[close + 1..].trim_start();
    }

    Ok(Step { descendant, axis, name, predicates })
}

fn parse(expression: &str) -> Result<Vec<Step>> {
    let mut rest = expression.trim();
    if !rest.starts_with('/') {
        return Err(unsupported(expression, "only absolute location paths are supported"));
    }

    let mut steps = Vec::new();
    while !rest.is_empty() {
        let descendant = rest.starts_with("//");
        rest = rest.trim_start_matches('/');

        let end = split_top_level(rest, "/")[0].len();
        steps.push(parse_step(expression, &rest[..end], descendant)?);
        rest = &rest[end..];
    }
    Ok(steps)
}

fn direct_texts<'a>(el: &ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    el.children().filter_map(|child| child.value().as_text().map(|t| &**t))
}

fn condition_holds(el: &ElementRef<'_>, condition: &Condition) -> bool {
    // `text()` is a node set: any direct text node may satisfy the check
    match condition {
        Condition::Exists(Operand::Text) => direct_texts(el).next().is_some(),
        Condition::Exists(Operand::StringValue) => true,
        Condition::Exists(Operand::Attr(name)) => el.value().attr(name).is_some(),
        Condition::Equals(Operand::Text, value) => direct_texts(el).any(|t| t == value),
        Condition::Equals(Operand::StringValue, value) => el.text().collect::<String>() == *value,
        Condition::Equals(Operand::Attr(name), value) => el.value().attr(name) == Some(value.as_str()),
        Condition::Contains(Operand::Text, value) => direct_texts(el).any(|t| t.contains(value.as_str())),
        Condition::Contains(Operand::StringValue, value) => el.text().collect::<String>().contains(value.as_str()),
        Condition::Contains(Operand::Attr(name), value) => {
            el.value().attr(name).is_some_and(|v| v.contains(value.as_str()))
        }
    }
}

/// Apply one step to a context element (`None` is the document node)
fn apply_step<'a>(document: &'a Html, context: Option<ElementRef<'a>>, step: &Step) -> Vec<ElementRef<'a>> {
    let mut contexts = vec![context];
    if step.descendant {
        // `//` is `/descendant-or-self::node()/`
        let descendants = match context {
            Some(el) => el.descendants().skip(1).filter_map(ElementRef::wrap).collect::<Vec<_>>(),
            None => document.root_element().descendants().filter_map(ElementRef::wrap).collect(),
        };
        contexts.extend(descendants.into_iter().map(Some));
    }

    let mut matched = Vec::new();
    for context in contexts {
        let candidates: Vec<ElementRef<'a>> = match (context, step.axis) {
            (None, Axis::Child) => vec![document.root_element()],
            (None, _) => Vec::new(),
            (Some(el), Axis::Child) => el.children().filter_map(ElementRef::wrap).collect(),
            (Some(el), Axis::Parent) => el.parent().and_then(ElementRef::wrap).into_iter().collect(),
            (Some(el), Axis::Ancestor) => el.ancestors().filter_map(ElementRef::wrap).collect(),
        };

        let mut candidates: Vec<ElementRef<'a>> = candidates
            .into_iter()
            .filter(|el| step.name.as_deref().is_none_or(|name| el.value().name().eq_ignore_ascii_case(name)))
            .collect();

        for predicate in &step.predicates {
            candidates = match predicate {
                Predicate::Position(position) => candidates.get(position - 1).copied().into_iter().collect(),
                Predicate::All(conditions) => candidates
                    .into_iter()
                    .filter(|el| conditions.iter().all(|c| condition_holds(el, c)))
                    .collect(),
            };
        }
        matched.extend(candidates);
    }
    matched
}

/// Select the elements an XPath expression addresses, in document order
pub fn select<'a>(document: &'a Html, expression: &str) -> Result<Vec<ElementRef<'a>>> {
    let steps = parse(expression)?;
    let mut contexts: Vec<Option<ElementRef<'a>>> = vec![None];

    for step in &steps {
        let mut seen = HashSet::new();
        contexts = contexts
            .into_iter()
            .flat_map(|context| apply_step(document, context, step))
            .filter(|el| seen.insert(el.id()))
            .map(Some)
            .collect();
    }

    let selected: HashSet<_> = contexts.into_iter().flatten().map(|el| el.id()).collect();
    Ok(document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| selected.contains(&el.id()))
        .collect())
}
