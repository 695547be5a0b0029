use crate::config;
use crate::logging::*;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SaveRequest {
    response: String,
}

/// Side channel posting each answer to a local recorder endpoint. Failures
/// are logged and never reach the display path.
pub struct Archiver {
    url: String,
    client: reqwest::Client,
}

impl Archiver {
    pub fn new(url: String) -> Archiver {
        Archiver {
            url,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Option<Archiver> {
        config::get("SAVE_RESPONSE_URL").ok().map(Archiver::new)
    }

    /// Fire-and-forget; the request outcome is only logged.
    pub fn record(&self, text: &str) {
        let log = DEFAULT.new(o!("function" => "Archiver::record"));
        let client = self.client.clone();
        let url = self.url.clone();
        let payload = SaveRequest {
            response: text.to_string(),
        };
        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(response) => {
                    debug!(log, "response saved"; "status" => response.status().as_u16())
                }
                Err(err) => warn!(log, "saving response failed"; "error" => %err),
            }
        });
    }
}
