use thiserror::Error;
use vela_common::ids::RuleId;

#[derive(Debug, Error)]
pub enum VisibilityError {
    #[error("invalid rule {rule_id}: {reason}")]
    InvalidRule { rule_id: RuleId, reason: String },
}

pub type VisibilityResult<T> = Result<T, VisibilityError>;
