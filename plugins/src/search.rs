//! Serper (google.serper.dev) web search used to enrich instructions.
use async_trait::async_trait;
use serde_json::Value;

use genius_core::api::SearchProvider;

use crate::http::{parse_json_response, HttpError};

const RELATED_LIMIT: usize = 3;

pub struct SerperSearch {
    api_key: String,
    enabled: bool,
    http: reqwest::Client,
    url: String,
}

impl SerperSearch {
    pub fn new(base_url: &str, api_key: String, enabled: bool, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            api_key,
            enabled,
            http,
            url: base_url.trim().to_string(),
        })
    }

    /// One query, formatted for inclusion in an instruction message.
    pub async fn search(&self, query: &str, num_results: usize) -> anyhow::Result<String> {
        if !self.is_available() {
            anyhow::bail!("web search unavailable: SERPER_API_KEY not configured");
        }

        tracing::debug!(
            target: "genius.search",
            stage = "search.http.in",
            query_len = query.len(),
            num_results
        );
        let resp = self
            .http
            .post(&self.url)
            .header("X-API-KEY", &self.api_key)
            .json(&serde_json::json!({ "q": query }))
            .send()
            .await
            .map_err(|err| HttpError::from_reqwest(err, self.url.clone()))?;
        let status = resp.status();
        let v = parse_json_response(resp, |code| Some(status_message(code))).await?;
        tracing::debug!(target: "genius.search", stage = "search.http.out", status = %status);

        Ok(format_results(&v, num_results))
    }
}

fn status_message(code: u16) -> String {
    let mut msg = format!("Serper API request failed with status {}", code);
    match code {
        401 => msg.push_str(" (Invalid API key)"),
        429 => msg.push_str(" (Rate limit exceeded)"),
        _ => {}
    }
    msg
}

pub fn format_results(data: &Value, num_results: usize) -> String {
    let organic = data
        .get("organic")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if organic.is_empty() {
        return "No search results found".to_string();
    }

    let mut parts = Vec::new();

    if let Some(answer_box) = data.get("answerBox") {
        let answer = answer_box
            .get("answer")
            .and_then(Value::as_str)
            .or_else(|| answer_box.get("snippet").and_then(Value::as_str));
        if let Some(a) = answer {
            parts.push(format!("**Answer:** {}", a));
        }
    }

    parts.push("**Search Results:**".to_string());
    for (i, result) in organic.iter().take(num_results).enumerate() {
        let title = result
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("No title");
        let mut text = format!("{}. **{}**", i + 1, title);
        if let Some(link) = result.get("link").and_then(Value::as_str).filter(|l| !l.is_empty()) {
            text.push_str(&format!("\n   URL: {}", link));
        }
        if let Some(snippet) = result
            .get("snippet")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
        {
            text.push_str(&format!("\n   {}", snippet));
        }
        parts.push(text);
    }

    let related: Vec<&str> = data
        .get("relatedSearches")
        .and_then(Value::as_array)
        .map(|r| {
            r.iter()
                .take(RELATED_LIMIT)
                .filter_map(|s| s.get("query").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    if !related.is_empty() {
        parts.push(format!("**Related searches:** {}", related.join(", ")));
    }

    parts.join("\n\n")
}

#[async_trait]
impl SearchProvider for SerperSearch {
    fn name(&self) -> &str {
        "serper"
    }

    fn is_available(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }

    async fn search_many(
        &self,
        queries: &[String],
        max_results_per_query: usize,
    ) -> anyhow::Result<String> {
        if queries.is_empty() {
            anyhow::bail!("no search queries provided");
        }

        let mut sections = Vec::new();
        for (i, query) in queries.iter().enumerate() {
            match self.search(query, max_results_per_query).await {
                Ok(text) => sections.push(format!("### Query {}: {}\n{}", i + 1, query, text)),
                Err(e) => {
                    tracing::debug!(target: "genius.search", query = %query, error = %e, "query failed")
                }
            }
        }

        if sections.is_empty() {
            anyhow::bail!("no successful search results obtained");
        }
        Ok(sections.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;

    fn sample() -> Value {
        serde_json::json!({
            "answerBox": {"snippet": "Use exponential backoff."},
            "organic": [
                {"title": "Retry patterns", "link": "https://a.example", "snippet": "Backoff and jitter."},
                {"title": "Second", "link": "", "snippet": ""},
                {"title": "Third", "link": "https://c.example"}
            ],
            "relatedSearches": [{"query": "r1"}, {"query": "r2"}, {"query": "r3"}, {"query": "r4"}]
        })
    }

    #[test]
    fn test_format_results() {
        assert_eq!(
            format_results(&sample(), 2),
            "**Answer:** Use exponential backoff.\n\n\
             **Search Results:**\n\n\
             1. **Retry patterns**\n   URL: https://a.example\n   Backoff and jitter.\n\n\
             2. **Second**\n\n\
             **Related searches:** r1, r2, r3"
        );
    }

    #[test]
    fn test_format_without_organic() {
        let v = serde_json::json!({"answerBox": {"answer": "42"}});
        assert_eq!(format_results(&v, 2), "No search results found");
    }

    #[tokio::test]
    async fn test_search_sends_api_key() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/search")
            .match_header("x-api-key", "serper-key")
            .match_body(Matcher::Json(serde_json::json!({"q": "rust retries"})))
            .with_status(200)
            .with_body(sample().to_string())
            .create_async()
            .await;

        let search =
            SerperSearch::new(&format!("{}/search", server.url()), "serper-key".into(), true, 1_000)
                .unwrap();
        let out = search.search("rust retries", 1).await.unwrap();
        assert!(out.contains("1. **Retry patterns**"));
        assert!(!out.contains("2. **Second**"));
    }

    #[tokio::test]
    async fn test_status_messages() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/search")
            .with_status(401)
            .create_async()
            .await;

        let search =
            SerperSearch::new(&format!("{}/search", server.url()), "bad".into(), true, 1_000).unwrap();
        let err = search.search("q", 2).await.unwrap_err();
        assert!(err
            .to_string()
            .contains("Serper API request failed with status 401 (Invalid API key)"));
        assert_eq!(
            status_message(429),
            "Serper API request failed with status 429 (Rate limit exceeded)"
        );
    }

    #[tokio::test]
    async fn test_search_many_skips_failed_queries() {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("POST", "/search")
            .match_body(Matcher::Json(serde_json::json!({"q": "good"})))
            .with_status(200)
            .with_body(sample().to_string())
            .create_async()
            .await;
        let _bad = server
            .mock("POST", "/search")
            .match_body(Matcher::Json(serde_json::json!({"q": "bad"})))
            .with_status(429)
            .create_async()
            .await;

        let search =
            SerperSearch::new(&format!("{}/search", server.url()), "k".into(), true, 1_000).unwrap();
        let out = search
            .search_many(&["bad".to_string(), "good".to_string()], 1)
            .await
            .unwrap();
        assert!(out.starts_with("### Query 2: good\n"));
        assert!(!out.contains("Query 1"));
    }

    #[tokio::test]
    async fn test_unavailable_without_key_or_flag() {
        let no_key = SerperSearch::new("http://127.0.0.1:9", String::new(), true, 100).unwrap();
        assert!(!no_key.is_available());
        let disabled = SerperSearch::new("http://127.0.0.1:9", "k".into(), false, 100).unwrap();
        assert!(!disabled.is_available());
        assert!(disabled.search_many(&["q".into()], 1).await.is_err());
        assert!(no_key.search_many(&[], 1).await.is_err());
    }
}
