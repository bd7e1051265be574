//! Parser for the condition language.
//!
//! Two forms are accepted. The legacy form writes comparisons in parentheses:
//! `state`, `!state`, `$prop(eq_x)`, `$prop(lt_5)`, `$prop(empty)`. The
//! current form writes them inline: `$prop==x`, `$prop[lt]5`, `horizontal`.
//! In both forms `,` means AND; the current form additionally allows `|`
//! (OR), binding tighter than `,`.

use super::tree::{BindingKind, ConditionComparison, ConditionTree, ConditionTreeLeaf};
use super::value::PropertyValue;
use crate::error::ConditionParseError;

/// Parses condition text into a tree. Blank input yields `Empty`.
pub fn parse_conditions(text: &str) -> Result<ConditionTree, ConditionParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(ConditionTree::Empty);
    }

    let mut tree = ConditionTree::Empty;
    for group in trimmed.split(',') {
        let mut alternatives = ConditionTree::Empty;
        let group = group.trim();
        if group.is_empty() {
            return Err(ConditionParseError::EmptyTerm(text.to_string()));
        }
        for term in group.split('|') {
            let leaf = parse_term(term.trim())?;
            alternatives = ConditionTree::or(alternatives, ConditionTree::Leaf(leaf));
        }
        tree = ConditionTree::and(tree, alternatives);
    }
    Ok(tree)
}

fn parse_term(term: &str) -> Result<ConditionTreeLeaf, ConditionParseError> {
    if term.is_empty() {
        return Err(ConditionParseError::EmptyTerm(term.to_string()));
    }

    let (negated, rest) = match term.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, term),
    };

    if let Some(body) = rest.strip_prefix('$') {
        parse_property_term(term, body, negated)
    } else {
        // A bare name is a state test: `horizontal` / `!horizontal`.
        validate_name(rest)?;
        Ok(ConditionTreeLeaf {
            kind: BindingKind::State,
            name: rest.to_string(),
            comparison: truthiness(negated),
            operand: PropertyValue::Boolean(true),
        })
    }
}

fn parse_property_term(
    term: &str,
    body: &str,
    negated: bool,
) -> Result<ConditionTreeLeaf, ConditionParseError> {
    // Legacy form: name(op) or name(op_operand).
    if let Some(open) = body.find('(') {
        let Some(inner) = body[open..].strip_prefix('(').and_then(|s| s.strip_suffix(')')) else {
            return Err(ConditionParseError::Malformed(term.to_string()));
        };
        let name = &body[..open];
        validate_name(name)?;
        if negated {
            return Err(ConditionParseError::Malformed(term.to_string()));
        }
        let (comparison, operand) = parse_legacy_comparison(term, inner)?;
        return Ok(leaf(name, comparison, operand));
    }

    // Current form: an inline comparison token, or a bare truthiness test.
    for (token, comparison) in INLINE_COMPARISONS {
        if let Some(at) = body.find(token) {
            let name = &body[..at];
            let operand_text = &body[at + token.len()..];
            validate_name(name)?;
            if negated {
                return Err(ConditionParseError::Malformed(term.to_string()));
            }
            let operand = match comparison {
                ConditionComparison::Empty | ConditionComparison::NotEmpty => {
                    if !operand_text.is_empty() {
                        return Err(ConditionParseError::Malformed(term.to_string()));
                    }
                    PropertyValue::Boolean(true)
                }
                _ => {
                    if operand_text.is_empty() {
                        return Err(ConditionParseError::Malformed(term.to_string()));
                    }
                    PropertyValue::parse(operand_text)
                }
            };
            return Ok(leaf(name, *comparison, operand));
        }
    }

    if let Some(bracket) = body.find('[') {
        // An unrecognised [..] comparison.
        let close = body[bracket..].find(']').map(|i| bracket + i + 1);
        let comparison = close
            .map(|end| &body[bracket..end])
            .unwrap_or(&body[bracket..]);
        return Err(ConditionParseError::UnknownComparison {
            comparison: comparison.to_string(),
            term: term.to_string(),
        });
    }

    validate_name(body)?;
    Ok(ConditionTreeLeaf {
        kind: BindingKind::Property,
        name: body.to_string(),
        comparison: truthiness(negated),
        operand: PropertyValue::Boolean(true),
    })
}

// Longer tokens first so `[lteq]` is not consumed as `[lt]`.
const INLINE_COMPARISONS: &[(&str, ConditionComparison)] = &[
    ("[notempty]", ConditionComparison::NotEmpty),
    ("[empty]", ConditionComparison::Empty),
    ("[lteq]", ConditionComparison::LessOrEqual),
    ("[gteq]", ConditionComparison::GreaterOrEqual),
    ("[lt]", ConditionComparison::Less),
    ("[gt]", ConditionComparison::Greater),
    ("==", ConditionComparison::Equal),
    ("!=", ConditionComparison::NotEqual),
];

fn parse_legacy_comparison(
    term: &str,
    inner: &str,
) -> Result<(ConditionComparison, PropertyValue), ConditionParseError> {
    if inner == "empty" {
        return Ok((ConditionComparison::Empty, PropertyValue::Boolean(true)));
    }
    let Some((op, operand_text)) = inner.split_once('_') else {
        return Err(ConditionParseError::UnknownComparison {
            comparison: inner.to_string(),
            term: term.to_string(),
        });
    };
    let comparison = match op {
        "eq" => ConditionComparison::Equal,
        "neq" => ConditionComparison::NotEqual,
        "lt" => ConditionComparison::Less,
        "gt" => ConditionComparison::Greater,
        "lteq" => ConditionComparison::LessOrEqual,
        "gteq" => ConditionComparison::GreaterOrEqual,
        other => {
            return Err(ConditionParseError::UnknownComparison {
                comparison: other.to_string(),
                term: term.to_string(),
            });
        }
    };
    Ok((comparison, PropertyValue::parse(operand_text)))
}

fn leaf(name: &str, comparison: ConditionComparison, operand: PropertyValue) -> ConditionTreeLeaf {
    ConditionTreeLeaf {
        kind: BindingKind::Property,
        name: name.to_string(),
        comparison,
        operand,
    }
}

fn truthiness(negated: bool) -> ConditionComparison {
    if negated {
        ConditionComparison::Falsy
    } else {
        ConditionComparison::Truthy
    }
}

/// Whether `name` is a valid property or state name:
/// `[a-zA-Z][a-zA-Z0-9]*`.
pub fn is_valid_property_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}

fn validate_name(name: &str) -> Result<(), ConditionParseError> {
    if is_valid_property_name(name) {
        Ok(())
    } else {
        Err(ConditionParseError::InvalidName(name.to_string()))
    }
}
