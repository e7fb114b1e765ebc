//! OpenAI-backed peer reviewer
//!
//! Sends the hypothesis and methodology to a chat-completions endpoint with
//! a fixed reviewer prompt, then parses the scored JSON reply. The model is
//! asked for the four sub-scores; the overall score and the approval
//! decision are computed here, never trusted from the model.

use crate::traits::Reviewer;
use async_trait::async_trait;
use meridian_core::{HypothesisReview, MeridianError, Result, ReviewConfig, ReviewScores};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const REVIEW_TEMPERATURE: f64 = 0.4;
const REVIEW_MAX_TOKENS: usize = 800;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// The JSON shape the reviewer prompt asks the model to produce
#[derive(Debug, Deserialize)]
struct ReviewPayload {
    novelty_score: f64,
    feasibility_score: f64,
    impact_score: f64,
    rigor_score: f64,
    #[serde(default)]
    reviewer_confidence: f64,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    feedback: String,
}

/// Reviewer backed by an OpenAI-compatible chat-completions API
pub struct OpenAiReviewer {
    api_url: String,
    model: String,
    api_key: String,
    approval_threshold: f64,
    client: reqwest::Client,
}

impl OpenAiReviewer {
    /// Build from config, reading the API key from the configured env var
    pub fn from_config(config: &ReviewConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            MeridianError::Config(format!(
                "Reviewer API key not set: {} is missing",
                config.api_key_env
            ))
        })?;

        Ok(Self {
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            api_key,
            approval_threshold: config.approval_threshold,
            client: reqwest::Client::new(),
        })
    }

    fn system_prompt(field: &str) -> String {
        format!(
            "You are a rigorous peer reviewer for scientific research proposals in {field}.\n\
             Evaluate research hypotheses for:\n\
             1. Novelty (1-10): Is this hypothesis truly novel and original?\n\
             2. Feasibility (1-10): Can this be tested with current technology and reasonable resources?\n\
             3. Impact (1-10): Would success significantly advance the field?\n\
             4. Rigor (1-10): Is the methodology sound and well-designed?\n\
             Provide constructive, specific feedback. Be critical but fair."
        )
    }

    fn user_prompt(hypothesis: &str, methodology: &str, field: &str) -> String {
        format!(
            "Please review this research hypothesis:\n\n\
             **Hypothesis:** {hypothesis}\n\n\
             **Proposed Methodology:** {methodology}\n\n\
             **Research Field:** {field}\n\n\
             Reply with a JSON object:\n\
             {{\n\
               \"novelty_score\": <number 1-10>,\n\
               \"feasibility_score\": <number 1-10>,\n\
               \"impact_score\": <number 1-10>,\n\
               \"rigor_score\": <number 1-10>,\n\
               \"reviewer_confidence\": <number 1-10>,\n\
               \"strengths\": [<2-3 strength points>],\n\
               \"weaknesses\": [<2-3 weakness points>],\n\
               \"recommendations\": [<2-3 improvement suggestions>],\n\
               \"feedback\": \"<overall assessment in 2-3 sentences>\"\n\
             }}"
        )
    }
}

#[async_trait]
impl Reviewer for OpenAiReviewer {
    async fn review_hypothesis(
        &self,
        hypothesis_id: &str,
        hypothesis: &str,
        methodology: &str,
        field: &str,
    ) -> Result<HypothesisReview> {
        tracing::info!("Reviewing hypothesis {} (field: {})", hypothesis_id, field);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Self::system_prompt(field),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::user_prompt(hypothesis, methodology, field),
                },
            ],
            temperature: REVIEW_TEMPERATURE,
            max_tokens: REVIEW_MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(&request)
            .send()
            .await
            .map_err(|e| MeridianError::Api(format!("Failed to send review request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(MeridianError::Api(format!(
                "Review API error {}: {}",
                status, error_text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| MeridianError::Api(format!("Failed to parse review response: {}", e)))?;

        let content = &chat
            .choices
            .first()
            .ok_or_else(|| MeridianError::Api("No choices in review response".to_string()))?
            .message
            .content;

        let payload = parse_review_payload(content)?;

        let scores = ReviewScores {
            novelty: payload.novelty_score,
            feasibility: payload.feasibility_score,
            impact: payload.impact_score,
            rigor: payload.rigor_score,
        };

        let mut review =
            HypothesisReview::from_scores(hypothesis_id, scores, self.approval_threshold);
        review.feedback = payload.feedback;
        review.reviewer_confidence = payload.reviewer_confidence;
        review.strengths = payload.strengths;
        review.weaknesses = payload.weaknesses;
        review.recommendations = payload.recommendations;

        tracing::info!(
            "Review complete for {}: overall {} ({})",
            hypothesis_id,
            review.overall_score,
            if review.approved { "approved" } else { "rejected" }
        );

        Ok(review)
    }
}

/// Parse the model reply, tolerating a fenced ```json block around the object
fn parse_review_payload(content: &str) -> Result<ReviewPayload> {
    let json_str = extract_fenced_block(content).unwrap_or(content);
    serde_json::from_str(json_str.trim())
        .map_err(|e| MeridianError::Api(format!("Malformed review payload: {}", e)))
}

/// Extract the body of the first fenced code block, if any
fn extract_fenced_block(content: &str) -> Option<&str> {
    let start = content.find("```")?;
    let after_fence = &content[start + 3..];
    // Skip an optional language tag on the fence line
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fenced_json() {
        let content = "Here is my review:\n```json\n{\"novelty_score\": 8}\n```\nDone.";
        assert_eq!(
            extract_fenced_block(content).unwrap().trim(),
            "{\"novelty_score\": 8}"
        );
    }

    #[test]
    fn test_extract_fence_without_language_tag() {
        let content = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_fenced_block(content).unwrap().trim(), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_bare_payload() {
        let content = r#"{
            "novelty_score": 8,
            "feasibility_score": 7,
            "impact_score": 9,
            "rigor_score": 8,
            "reviewer_confidence": 8,
            "strengths": ["clear mechanism"],
            "weaknesses": ["small cohort"],
            "recommendations": ["add controls"],
            "feedback": "Strong proposal."
        }"#;
        let payload = parse_review_payload(content).unwrap();
        assert_eq!(payload.novelty_score, 8.0);
        assert_eq!(payload.strengths.len(), 1);
    }

    #[test]
    fn test_parse_fenced_payload_with_surrounding_prose() {
        let content = "Review follows.\n```json\n{\"novelty_score\": 6, \"feasibility_score\": 5, \"impact_score\": 7, \"rigor_score\": 6}\n```";
        let payload = parse_review_payload(content).unwrap();
        assert_eq!(payload.rigor_score, 6.0);
        // Optional fields default
        assert!(payload.feedback.is_empty());
    }

    #[test]
    fn test_malformed_payload_is_api_error() {
        let result = parse_review_payload("not json at all");
        assert!(matches!(result, Err(MeridianError::Api(_))));
    }
}
