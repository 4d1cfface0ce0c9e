//! Compilation of expression trees into SQL predicates.
//!
//! Each expression node compiles to a closed boolean test against the `file`
//! table's `id` column, so boolean composition (including De Morgan negation)
//! is sound without re-deriving sub-closures. Tag and comparison nodes close
//! over the implication graph with a recursive CTE seeded from the queried
//! (tag, value) pair and walked against the edge direction, collecting every
//! pair that implies the seed. The recursion uses `UNION`, not `UNION ALL`:
//! the deduplication is what guarantees termination on a cyclic implication
//! graph.

use super::ast::{ComparisonOperator, Expression};
use super::builder::SqlBuilder;
use super::errors::QueryError;

/// Maximum node depth of the compiler walk. Left-deep `and`/`or` spines grow
/// deeper than the parser's nesting cap, so the walk carries its own guard.
pub const MAX_COMPILE_DEPTH: usize = 512;

/// Options controlling predicate generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Match only explicit taggings; implications are ignored entirely.
    pub explicit_only: bool,
    /// Compare tag and value names case-insensitively.
    pub ignore_case: bool,
}

/// The collation suffix for name comparisons under the given case rule.
pub(crate) fn collation_for(ignore_case: bool) -> &'static str {
    if ignore_case {
        " COLLATE NOCASE"
    } else {
        ""
    }
}

/// Appends the boolean predicate for `expression` to `builder`. The caller
/// wraps the result in a statement and appends any path and sort clauses to
/// the same builder.
pub fn append_expression(
    expression: &Expression,
    builder: &mut SqlBuilder,
    options: CompileOptions,
) -> Result<(), QueryError> {
    append_branch(expression, builder, options, 0)
}

fn append_branch(
    expression: &Expression,
    builder: &mut SqlBuilder,
    options: CompileOptions,
    depth: usize,
) -> Result<(), QueryError> {
    if depth >= MAX_COMPILE_DEPTH {
        return Err(QueryError::TooDeep {
            max: MAX_COMPILE_DEPTH,
        });
    }

    match expression {
        Expression::Empty => {
            builder.append_sql("1 = 1");
            Ok(())
        }
        Expression::Tag(name) => {
            append_tag_branch(name, builder, options);
            Ok(())
        }
        Expression::Comparison {
            tag,
            operator,
            value,
        } => {
            append_comparison_branch(tag, *operator, value, builder, options);
            Ok(())
        }
        Expression::Not(operand) => {
            builder.append_sql("NOT (");
            append_branch(operand, builder, options, depth + 1)?;
            builder.append_sql(")");
            Ok(())
        }
        Expression::And(left, right) => {
            append_branch(left, builder, options, depth + 1)?;
            builder.append_sql("AND");
            append_branch(right, builder, options, depth + 1)?;
            Ok(())
        }
        Expression::Or(left, right) => {
            builder.append_sql("(");
            append_branch(left, builder, options, depth + 1)?;
            builder.append_sql("OR");
            append_branch(right, builder, options, depth + 1)?;
            builder.append_sql(")");
            Ok(())
        }
    }
}

fn append_tag_branch(name: &str, builder: &mut SqlBuilder, options: CompileOptions) {
    let collation = collation_for(options.ignore_case);

    if options.explicit_only {
        builder.append_sql(&format!(
            "id IN (SELECT file_id
       FROM file_tag
       WHERE tag_id = (SELECT id
                       FROM tag
                       WHERE name{collation} = "
        ));
        builder.append_param(name.to_owned());
        builder.append_sql(
            "
                      )
      )",
        );
        return;
    }

    builder.append_sql(&format!(
        "id IN (SELECT file_id
       FROM file_tag
       INNER JOIN (WITH RECURSIVE working (tag_id, value_id) AS
                   (
                       SELECT id, 0
                       FROM tag
                       WHERE name{collation} = "
    ));
    builder.append_param(name.to_owned());
    builder.append_sql(
        "
                       UNION
                       SELECT i.tag_id, i.value_id
                       FROM implication i, working
                       WHERE i.implied_tag_id = working.tag_id AND
                             (working.value_id = 0 OR i.implied_value_id = working.value_id)
                   )
                   SELECT tag_id, value_id
                   FROM working) pairs
       ON file_tag.tag_id = pairs.tag_id AND
          (pairs.value_id = 0 OR file_tag.value_id = pairs.value_id)
      )",
    );
}

fn append_comparison_branch(
    tag: &str,
    operator: ComparisonOperator,
    value: &str,
    builder: &mut SqlBuilder,
    options: CompileOptions,
) {
    let collation = collation_for(options.ignore_case);

    // a numeric literal switches the stored value to a numeric compare;
    // anything else falls back to a (collated) text compare
    let value_term = if value.parse::<f64>().is_ok() {
        "CAST(v.name AS float)"
    } else {
        "v.name"
    };

    // `!=` must hold only when no value for the tag matches, so it compiles
    // as the negation of the `==` form
    let operator = match operator {
        ComparisonOperator::NotEqual => {
            builder.append_sql("NOT");
            ComparisonOperator::Equal
        }
        operator => operator,
    };

    if options.explicit_only {
        builder.append_sql(&format!(
            "id IN (SELECT file_id
       FROM file_tag
       INNER JOIN value v
       ON file_tag.value_id = v.id
       WHERE tag_id = (SELECT id
                       FROM tag
                       WHERE name{collation} = "
        ));
        builder.append_param(tag.to_owned());
        builder.append_sql(&format!(
            ") AND
             {value_term}{collation} {operator} "
        ));
        builder.append_param(value.to_owned());
        builder.append_sql(
            "
      )",
        );
        return;
    }

    builder.append_sql(&format!(
        "id IN (SELECT file_id
       FROM file_tag
       INNER JOIN (WITH RECURSIVE matching (tag_id, value_id) AS
                   (
                       SELECT t.id, v.id
                       FROM tag t, value v
                       WHERE t.name{collation} = "
    ));
    builder.append_param(tag.to_owned());
    builder.append_sql(&format!(
        " AND
                             {value_term}{collation} {operator} "
    ));
    builder.append_param(value.to_owned());
    builder.append_sql(
        "
                       UNION
                       SELECT i.tag_id, i.value_id
                       FROM implication i, matching
                       WHERE i.implied_tag_id = matching.tag_id AND
                             (matching.value_id = 0 OR i.implied_value_id = matching.value_id)
                   )
                   SELECT tag_id, value_id
                   FROM matching) pairs
       ON file_tag.tag_id = pairs.tag_id AND
          (pairs.value_id = 0 OR file_tag.value_id = pairs.value_id)
      )",
    );
}
