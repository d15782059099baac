use thiserror::Error;

use crate::category::CategoryKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("unknown {kind} {name:?} (expected one of: {})", .kind.names().join(", "))]
    UnknownCategory { kind: CategoryKind, name: String },
}
