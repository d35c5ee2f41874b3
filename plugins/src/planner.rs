//! Planning delegate backed by an OpenAI-compatible chat-completions endpoint.
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use genius_core::api::PlanningDelegate;

use crate::http::{parse_json_response, HttpError};

const TEMPERATURE: f32 = 0.2;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

pub struct ChatCompletionsDelegate {
    api_key: String,
    model: String,
    http: reqwest::Client,
    url: String,
}

impl ChatCompletionsDelegate {
    pub fn new(
        base_url: &str,
        api_key: String,
        model: String,
        timeout_ms: u64,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            api_key,
            model,
            http,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }
}

fn first_choice_content(v: &Value) -> Option<String> {
    v.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl PlanningDelegate for ChatCompletionsDelegate {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> anyhow::Result<Option<String>> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: TEMPERATURE,
        };
        tracing::debug!(
            target: "genius.planner",
            stage = "planner.http.in",
            url = %self.url,
            model = %self.model,
            prompt_len = user_prompt.len()
        );

        let req = self.http.post(&self.url).json(&body);
        let resp = self
            .auth(req)
            .send()
            .await
            .map_err(|err| HttpError::from_reqwest(err, self.url.clone()))?;
        let status = resp.status();
        let v = parse_json_response(resp, |_| None).await?;
        let content = first_choice_content(&v).filter(|c| !c.trim().is_empty());

        tracing::debug!(
            target: "genius.planner",
            stage = "planner.http.out",
            status = %status,
            has_content = content.is_some()
        );
        Ok(content)
    }
}
