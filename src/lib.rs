pub mod chat;
pub mod config;
pub mod constants;
pub mod knowledge;
pub mod normalizer;
pub mod prediction;
pub mod prompt;
pub mod quick_answer;
pub mod topic_filter;
pub mod web_server;

pub use chat::{ChatError, ChatService, Reply, ReplySource};
pub use config::{Config, PredictionSettings};
pub use knowledge::KnowledgeFacts;
pub use prediction::{JobOutput, JobStatus, PredictionClient, PredictionError, PredictionJob};
