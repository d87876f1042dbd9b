mod unified_model;

pub use unified_model::{DuplicateStrategy, ImportCounts, ImportResult, UnifiedExport};
