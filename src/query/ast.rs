//! The query expression tree.
//!
//! A parsed query is a closed sum type, matched exhaustively by the compiler
//! and the traversal helpers so that adding an expression kind forces every
//! consumer to be revisited. Trees are finite and immutable once built;
//! cycles exist only in the implication graph, never here.

use std::fmt;

/// A comparison operator appearing in a `tag op value` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    /// `==` (also written `=` or `eq`).
    Equal,
    /// `!=` / `ne`.
    NotEqual,
    /// `<` / `lt`.
    LessThan,
    /// `>` / `gt`.
    GreaterThan,
    /// `<=` / `le`.
    LessOrEqual,
    /// `>=` / `ge`.
    GreaterOrEqual,
}

impl ComparisonOperator {
    /// The SQL spelling of the operator.
    pub fn sql(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Matches every file; produced by an empty query.
    Empty,
    /// Matches files carrying the named tag, explicitly or via implication.
    Tag(String),
    /// Matches files whose value for `tag` satisfies `operator value`.
    Comparison {
        /// Tag name on the left-hand side.
        tag: String,
        /// The comparison operator.
        operator: ComparisonOperator,
        /// Literal value text on the right-hand side.
        value: String,
    },
    /// Logical negation.
    Not(Box<Expression>),
    /// Logical conjunction (also produced by juxtaposition).
    And(Box<Expression>, Box<Expression>),
    /// Logical disjunction.
    Or(Box<Expression>, Box<Expression>),
}

impl Expression {
    /// Every tag name referenced by `Tag` and `Comparison` nodes, in
    /// insertion order, duplicates preserved. Used by callers to check names
    /// exist before running the compiled query.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        // Explicit worklist rather than recursion: left-deep and/or spines
        // can be much deeper than the parser's nesting cap.
        let mut pending = vec![self];
        while let Some(expression) = pending.pop() {
            match expression {
                Expression::Empty => {}
                Expression::Tag(name) => names.push(name.as_str()),
                Expression::Comparison { tag, .. } => names.push(tag.as_str()),
                Expression::Not(operand) => pending.push(operand),
                Expression::And(left, right) | Expression::Or(left, right) => {
                    pending.push(right);
                    pending.push(left);
                }
            }
        }
        names
    }

    /// Every literal value text referenced by `Comparison` nodes, in
    /// insertion order, duplicates preserved.
    pub fn value_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut pending = vec![self];
        while let Some(expression) = pending.pop() {
            match expression {
                Expression::Empty | Expression::Tag(_) => {}
                Expression::Comparison { value, .. } => names.push(value.as_str()),
                Expression::Not(operand) => pending.push(operand),
                Expression::And(left, right) | Expression::Or(left, right) => {
                    pending.push(right);
                    pending.push(left);
                }
            }
        }
        names
    }
}
