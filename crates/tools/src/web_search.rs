//! Web search tool — stub that returns mock search results.
//!
//! In production this would call a real search API (Brave, Google, etc.).
//! The stub returns plausible results so the full turn cycle can be tested
//! end-to-end without network access.

use async_trait::async_trait;
use serde_json::Value;
use valet_core::error::ToolError;
use valet_core::tool::Tool;

pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns a list of relevant results with titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 3)",
                    "default": 3
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let num_results = args
            .get("num_results")
            .and_then(Value::as_u64)
            .unwrap_or(3)
            .min(5) as usize;

        // Deterministic mock results based on query content.
        let results = generate_mock_results(query, num_results);
        Ok(serde_json::to_value(results).unwrap_or_default())
    }
}

#[derive(Clone, serde::Serialize, serde::Deserialize)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

fn generate_mock_results(query: &str, count: usize) -> Vec<SearchResult> {
    let q = query.to_lowercase();

    // Context-aware mock results for common topics.
    let templates: Vec<(&str, Vec<SearchResult>)> = vec![
        ("rust", vec![
            SearchResult {
                title: "The Rust Programming Language".into(),
                url: "https://doc.rust-lang.org/book/".into(),
                snippet: "Rust is a systems programming language focused on safety, speed, and concurrency.".into(),
            },
            SearchResult {
                title: "Rust by Example".into(),
                url: "https://doc.rust-lang.org/rust-by-example/".into(),
                snippet: "A collection of runnable examples that illustrate Rust concepts and standard library usage.".into(),
            },
            SearchResult {
                title: "crates.io: Rust Package Registry".into(),
                url: "https://crates.io/".into(),
                snippet: "The Rust community's crate registry for sharing and discovering Rust libraries.".into(),
            },
        ]),
        ("news", vec![
            SearchResult {
                title: "Top Stories - World News".into(),
                url: "https://news.example.com/world".into(),
                snippet: "The latest headlines and breaking news from around the world.".into(),
            },
            SearchResult {
                title: "Technology News".into(),
                url: "https://news.example.com/tech".into(),
                snippet: "Coverage of software, hardware, and the technology industry.".into(),
            },
        ]),
        ("weather", vec![
            SearchResult {
                title: "Weather Forecast - National Weather Service".into(),
                url: "https://weather.gov/".into(),
                snippet: "Current conditions and forecasts for locations across the United States.".into(),
            },
            SearchResult {
                title: "OpenWeatherMap".into(),
                url: "https://openweathermap.org/".into(),
                snippet: "Free weather API providing current weather data and forecasts for any location.".into(),
            },
        ]),
    ];

    for (keyword, results) in &templates {
        if q.contains(keyword) {
            return results.iter().take(count).cloned().collect();
        }
    }

    // Generic fallback.
    (0..count)
        .map(|i| SearchResult {
            title: format!("Result {} for: {}", i + 1, query),
            url: format!("https://example.com/search?q={}&p={}", urlencod(query), i + 1),
            snippet: format!(
                "This is a mock search result for the query '{}'. In production, this would contain real content.",
                query
            ),
        })
        .collect()
}

fn urlencod(s: &str) -> String {
    s.replace(' ', "+")
}
