//! Functional core for polly: poll domain types, the vote state machine,
//! validation, error types and the entity store interface.

pub mod poll;
pub mod storage;
