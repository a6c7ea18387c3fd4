use crate::constants::REPLY_SEPARATOR;
use crate::prediction::{JobOutput, PredictionJob};

/// Turn a finished prediction into display text. Never fails and never
/// returns an empty string: when the model produced nothing usable the whole
/// job record is returned instead.
pub fn normalize(job: &PredictionJob) -> String {
    match &job.output {
        JobOutput::List(chunks) if !chunks.is_empty() => chunks.join(REPLY_SEPARATOR),
        JobOutput::Text(text) if !text.is_empty() => text.clone(),
        JobOutput::Structured(value) => value.to_string(),
        JobOutput::List(_) | JobOutput::Text(_) | JobOutput::Absent => job.to_json().to_string(),
    }
}
