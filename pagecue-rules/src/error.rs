//! Error types for rule evaluation.

use thiserror::Error;

/// Result type for rule operations.
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors raised while interpreting rules.
///
/// Evaluation itself never returns these; they surface from
/// [`Operator::from_str`](std::str::FromStr) and are reported as warnings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The condition names an operator this engine does not know.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
}
