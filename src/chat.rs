// Question answering pipeline shared by the HTTP API and the `ask` command.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::constants::REFUSAL_REPLY;
use crate::knowledge::KnowledgeFacts;
use crate::normalizer::normalize;
use crate::prediction::{PredictionClient, PredictionError};
use crate::prompt::build_prompt;
use crate::quick_answer::quick_answer;
use crate::topic_filter::is_in_scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub reply: String,
    pub source: ReplySource,
}

impl Reply {
    pub fn local(text: impl Into<String>) -> Self {
        Self {
            reply: text.into(),
            source: ReplySource::Local,
        }
    }

    pub fn remote(text: impl Into<String>) -> Self {
        Self {
            reply: text.into(),
            source: ReplySource::Remote,
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No message provided")]
    BadRequest,
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

impl ChatError {
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::BadRequest => "bad_request",
            ChatError::Prediction(e) => e.kind(),
        }
    }
}

pub struct ChatService {
    facts: Arc<KnowledgeFacts>,
    client: PredictionClient,
}

impl ChatService {
    pub fn new(facts: Arc<KnowledgeFacts>, client: PredictionClient) -> Self {
        Self { facts, client }
    }

    pub fn facts(&self) -> &KnowledgeFacts {
        &self.facts
    }

    /// Answer one user message: off-topic refusal, then local quick answers,
    /// then the remote model.
    #[instrument(skip_all)]
    pub async fn answer(&self, message: Option<&str>) -> Result<Reply, ChatError> {
        let question = message
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or(ChatError::BadRequest)?;

        if !is_in_scope(question) {
            debug!("Question is out of scope, refusing locally");
            return Ok(Reply::local(REFUSAL_REPLY));
        }

        if let Some(answer) = quick_answer(question, &self.facts) {
            debug!("Answered from knowledge base");
            return Ok(Reply::local(answer));
        }

        let prompt = build_prompt(question, &self.facts);
        let job = self.client.run(&prompt).await?;
        info!(id = %job.id, "Answered by remote model");
        Ok(Reply::remote(normalize(&job)))
    }
}
