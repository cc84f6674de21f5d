//! Resolution pipeline services

pub mod extractor;
pub mod gemini_client;
pub mod jira_client;
pub mod matcher;
pub mod normalizer;
pub mod orchestrator;
pub mod record_updater;
pub mod validator;
pub mod vocabulary;

pub use extractor::{ExtractorSettings, ProductExtractor};
pub use gemini_client::GeminiClient;
pub use jira_client::JiraClient;
pub use matcher::{find_match, MatchTier, VocabularyMatch};
pub use normalizer::normalize;
pub use orchestrator::{ResolutionOrchestrator, ResolveError};
pub use record_updater::{RecordUpdater, UpdateError};
pub use validator::ProductValidator;
pub use vocabulary::VocabularyWriter;
