//! Message sending collaborator.

// crates.io
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
// multiwrap
use crate::prelude::*;

#[async_trait]
pub trait Notify: Send + Sync {
	async fn notify<S>(&self, object: &S, addition: &str)
	where
		S: Serialize + Sync;
}
#[async_trait]
impl Notify for () {
	async fn notify<S>(&self, _: &S, _: &str)
	where
		S: Serialize + Sync,
	{
	}
}

/// POSTs every notification to each webhook, Slack ones get a `text` message.
#[derive(Debug)]
pub struct Webhooks {
	http: Client,
	urls: Vec<String>,
}
impl Webhooks {
	pub fn new(urls: Vec<String>) -> Result<Self> {
		Ok(Self { http: util::http_json_client()?, urls })
	}
}
#[async_trait]
impl Notify for Webhooks {
	async fn notify<S>(&self, object: &S, addition: &str)
	where
		S: Serialize + Sync,
	{
		let json = body(object, addition);

		for u in &self.urls {
			let body = if is_slack(u) {
				serde_json::json!({ "text": json.to_string() })
			} else {
				json.clone()
			};

			if let Err(e) = self.http.post(u).json(&body).send().await {
				tracing::warn!("failed to notify {u}, {e}");
			}
		}
	}
}

fn body<S>(object: &S, addition: &str) -> Value
where
	S: Serialize,
{
	serde_json::json!({
		"object": object,
		"addition": addition,
	})
}

fn is_slack(url: &str) -> bool {
	url.starts_with("https://hooks.slack.com/services/")
}

#[test]
fn body_should_work() {
	assert!(is_slack("https://hooks.slack.com/services/T0/B0/X"));
	assert!(!is_slack("https://example.com/hook"));

	let b = body(&MultisigStatus::Executed, "multisig transaction executed");

	assert_eq!(b["object"], "executed");
	assert_eq!(b["addition"], "multisig transaction executed");
}
