//! Document matching engine

pub mod analyzer;
pub mod document;
pub mod embedding_manager;
pub mod embeddings;
pub mod field_matcher;
pub mod pathway;
pub mod segmenter;
pub mod text_processor;

pub use analyzer::{ChecklistEvaluator, ComplianceReport, FieldResult};
pub use document::Page;
pub use pathway::Pathway;
