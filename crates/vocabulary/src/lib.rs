//! Vocabulary: the garment types and worker names offered as choices.
//!
//! Known names are partly derived from transactional records (whatever has
//! been stocked or issued) and partly registered explicitly. Explicit
//! registration is kept in its own set so that naming something never
//! fabricates a stock record or a ledger entry.

pub mod registry;

pub use registry::{VocabularyKind, VocabularyRegistry};
