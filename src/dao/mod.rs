/// Database model definitions.
pub mod models;
/// Question bank loading and sampling.
pub mod question_bank;
/// Storage abstraction layer for persistence operations.
pub mod storage;
/// User account storage and retrieval operations.
pub mod user_store;
