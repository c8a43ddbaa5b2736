pub mod extraction;
pub mod normalize;
pub mod segment;
pub mod provenance;
pub mod readability; // Flesch-Kincaid grade for patient summaries
pub mod summarize;
pub mod storage;
pub mod processor; // Ingest and summarize orchestration
