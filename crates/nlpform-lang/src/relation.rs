use nlpform_solver::ConstraintOp;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("Constraint `{0}` has no relational operator (expected ==, <= or >=)")]
    MissingRelation(String),
    #[error("Constraint `{0}` must contain exactly one of ==, <= or >=")]
    UnsupportedRelation(String),
}

/// A constraint string split on its relational operator
#[derive(Debug, Clone, PartialEq)]
pub struct SplitConstraint<'a> {
    pub left: &'a str,
    pub op: ConstraintOp,
    pub right: &'a str,
    /// Byte offsets of `left` and `right` within the original string
    pub left_start: usize,
    pub right_start: usize,
}

// Checked in this order: `<=` and `>=` both end with `=`
const RELATIONS: [(&str, ConstraintOp); 3] = [
    ("==", ConstraintOp::Eq),
    ("<=", ConstraintOp::Le),
    (">=", ConstraintOp::Ge),
];

fn has_relational_char(text: &str) -> bool {
    text.contains(['<', '>', '=', '!'])
}

/// Split `text` once on the first recognized relational operator.
///
/// Both halves are trimmed. Any leftover relational character (strict `<`,
/// `!=`, a second relation) makes the string a format error.
pub fn split_constraint(text: &str) -> Result<SplitConstraint<'_>, FormatError> {
    let Some((token, op)) = RELATIONS.iter().find(|(token, _)| text.contains(token)) else {
        return Err(if has_relational_char(text) {
            FormatError::UnsupportedRelation(text.to_string())
        } else {
            FormatError::MissingRelation(text.to_string())
        });
    };

    let (left_raw, right_raw) = text
        .split_once(token)
        .ok_or_else(|| FormatError::MissingRelation(text.to_string()))?;
    let (left, right) = (left_raw.trim(), right_raw.trim());
    let left_start = left_raw.len() - left_raw.trim_start().len();
    let right_start = left_raw.len() + token.len() + (right_raw.len() - right_raw.trim_start().len());

    if has_relational_char(left) || has_relational_char(right) {
        return Err(FormatError::UnsupportedRelation(text.to_string()));
    }

    Ok(SplitConstraint {
        left,
        op: *op,
        right,
        left_start,
        right_start,
    })
}
