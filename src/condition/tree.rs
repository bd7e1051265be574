use super::value::PropertyValue;
use crate::error::ConditionError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The comparison applied by a condition leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionComparison {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Empty,
    NotEmpty,
    Truthy,
    Falsy,
}

impl ConditionComparison {
    /// Applies the comparison to a bound value and the leaf's operand.
    ///
    /// Ordering and equality comparisons require matching kinds; the unary
    /// comparisons never inspect the operand.
    pub fn apply(
        self,
        bound: &PropertyValue,
        operand: &PropertyValue,
    ) -> Result<bool, ConditionError> {
        match self {
            ConditionComparison::Truthy => return Ok(bound.is_truthy()),
            ConditionComparison::Falsy => return Ok(!bound.is_truthy()),
            ConditionComparison::Empty => return Ok(bound.is_empty()),
            ConditionComparison::NotEmpty => return Ok(!bound.is_empty()),
            _ => {}
        }

        let ordering = match (bound, operand) {
            (PropertyValue::String(a), PropertyValue::String(b)) => a.cmp(b),
            (PropertyValue::Boolean(a), PropertyValue::Boolean(b)) => a.cmp(b),
            (PropertyValue::Number(a), PropertyValue::Number(b)) => {
                // NaN never compares equal nor ordered; report it as unequal.
                match a.partial_cmp(b) {
                    Some(ord) => ord,
                    None => {
                        return Ok(matches!(self, ConditionComparison::NotEqual));
                    }
                }
            }
            _ => {
                return Err(ConditionError::TypeMismatch {
                    found: bound.clone(),
                    found_kind: bound.kind(),
                    operand: operand.clone(),
                    operand_kind: operand.kind(),
                });
            }
        };

        Ok(match self {
            ConditionComparison::Equal => ordering.is_eq(),
            ConditionComparison::NotEqual => !ordering.is_eq(),
            ConditionComparison::Less => ordering.is_lt(),
            ConditionComparison::Greater => ordering.is_gt(),
            ConditionComparison::LessOrEqual => ordering.is_le(),
            ConditionComparison::GreaterOrEqual => ordering.is_ge(),
            _ => unreachable!("unary comparisons returned above"),
        })
    }

    fn symbol(self) -> &'static str {
        match self {
            ConditionComparison::Equal => "==",
            ConditionComparison::NotEqual => "!=",
            ConditionComparison::Less => "[lt]",
            ConditionComparison::Greater => "[gt]",
            ConditionComparison::LessOrEqual => "[lteq]",
            ConditionComparison::GreaterOrEqual => "[gteq]",
            ConditionComparison::Empty => "[empty]",
            ConditionComparison::NotEmpty => "[notempty]",
            ConditionComparison::Truthy => "",
            ConditionComparison::Falsy => "!",
        }
    }
}

/// Whether a leaf binds against a user-settable property or a derived state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingKind {
    Property,
    State,
}

/// A single comparison against one bound property or state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionTreeLeaf {
    pub kind: BindingKind,
    pub name: String,
    pub comparison: ConditionComparison,
    pub operand: PropertyValue,
}

impl ConditionTreeLeaf {
    /// The `horizontal` state leaf used by orientation-dependent variants.
    pub fn state(name: &str, truthy: bool) -> Self {
        Self {
            kind: BindingKind::State,
            name: name.to_string(),
            comparison: if truthy {
                ConditionComparison::Truthy
            } else {
                ConditionComparison::Falsy
            },
            operand: PropertyValue::Boolean(true),
        }
    }

    /// A `property == value` leaf.
    pub fn property_equals(name: &str, value: PropertyValue) -> Self {
        Self {
            kind: BindingKind::Property,
            name: name.to_string(),
            comparison: ConditionComparison::Equal,
            operand: value,
        }
    }

    fn evaluate(&self, ctx: &EvaluationContext) -> Result<bool, ConditionError> {
        let bound = match self.kind {
            BindingKind::Property => ctx
                .property(&self.name)
                .cloned()
                .ok_or_else(|| ConditionError::UnboundProperty(self.name.clone()))?,
            BindingKind::State => PropertyValue::Boolean(
                ctx.state(&self.name)
                    .ok_or_else(|| ConditionError::UnboundState(self.name.clone()))?,
            ),
        };
        self.comparison.apply(&bound, &self.operand)
    }
}

impl fmt::Display for ConditionTreeLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            BindingKind::Property => "$",
            BindingKind::State => "",
        };
        match self.comparison {
            ConditionComparison::Truthy => write!(f, "{}{}", prefix, self.name),
            ConditionComparison::Falsy => write!(f, "!{}{}", prefix, self.name),
            ConditionComparison::Empty | ConditionComparison::NotEmpty => {
                write!(f, "{}{}{}", prefix, self.name, self.comparison.symbol())
            }
            cmp => write!(f, "{}{}{}{}", prefix, self.name, cmp.symbol(), self.operand),
        }
    }
}

/// The boolean operator joining two condition subtrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOperator {
    And,
    Or,
}

/// A boolean expression over property/state comparisons.
///
/// `Empty` is the identity element of both operators: it evaluates true, and
/// `and`/`or`/`simplify` absorb it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConditionTree {
    #[default]
    Empty,
    Leaf(ConditionTreeLeaf),
    Binary {
        operator: ConditionOperator,
        left: Box<ConditionTree>,
        right: Box<ConditionTree>,
    },
}

impl ConditionTree {
    /// Joins two trees with AND, absorbing `Empty` on either side.
    pub fn and(left: ConditionTree, right: ConditionTree) -> ConditionTree {
        Self::join(ConditionOperator::And, left, right)
    }

    /// Joins two trees with OR, absorbing `Empty` on either side.
    pub fn or(left: ConditionTree, right: ConditionTree) -> ConditionTree {
        Self::join(ConditionOperator::Or, left, right)
    }

    fn join(operator: ConditionOperator, left: ConditionTree, right: ConditionTree) -> Self {
        match (left, right) {
            (ConditionTree::Empty, other) | (other, ConditionTree::Empty) => other,
            (left, right) => ConditionTree::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    /// Evaluates the tree against the given bindings.
    ///
    /// A missing binding is an error, never defaulted. Both operators
    /// short-circuit.
    pub fn evaluate(&self, ctx: &EvaluationContext) -> Result<bool, ConditionError> {
        match self {
            ConditionTree::Empty => Ok(true),
            ConditionTree::Leaf(leaf) => leaf.evaluate(ctx),
            ConditionTree::Binary {
                operator: ConditionOperator::And,
                left,
                right,
            } => {
                if !left.evaluate(ctx)? {
                    return Ok(false);
                }
                right.evaluate(ctx)
            }
            ConditionTree::Binary {
                operator: ConditionOperator::Or,
                left,
                right,
            } => {
                if left.evaluate(ctx)? {
                    return Ok(true);
                }
                right.evaluate(ctx)
            }
        }
    }

    /// Removes redundant `Empty` terms. Evaluates identically to the input
    /// under every binding; no satisfiability pruning is attempted.
    pub fn simplify(self) -> ConditionTree {
        match self {
            ConditionTree::Binary {
                operator,
                left,
                right,
            } => Self::join(operator, left.simplify(), right.simplify()),
            other => other,
        }
    }
}

// Display renders the current condition syntax: `|` for OR, `,` for AND.
impl fmt::Display for ConditionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionTree::Empty => Ok(()),
            ConditionTree::Leaf(leaf) => write!(f, "{}", leaf),
            ConditionTree::Binary {
                operator,
                left,
                right,
            } => {
                let sep = match operator {
                    ConditionOperator::And => ",",
                    ConditionOperator::Or => "|",
                };
                write!(f, "{}{}{}", left, sep, right)
            }
        }
    }
}

/// The property and state bindings a condition tree is evaluated against.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    properties: AHashMap<String, PropertyValue>,
    states: AHashMap<String, bool>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.properties.insert(name.into(), value);
    }

    pub fn set_state(&mut self, name: impl Into<String>, value: bool) {
        self.states.insert(name.into(), value);
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn state(&self, name: &str) -> Option<bool> {
        self.states.get(name).copied()
    }
}
