// Library interface for epaper modules
// This allows tests and other binaries to import modules

pub mod events;
pub mod extractive;
pub mod ingestion;
pub mod llm;
pub mod models;
pub mod processing;
pub mod scraping;
pub mod storage;
pub mod up_ahead;
pub mod user_plan;
