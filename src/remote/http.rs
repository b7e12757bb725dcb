use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart;

use super::envelope;
use super::{CollectionSource, WriteReply};
use crate::error::{AppError, AppResult};
use crate::record::Record;
use crate::screen::{Screen, Transport};

/// A spreadsheet-backed script endpoint.
///
/// Reads are `GET <url>?action=<verb>`; writes are POSTs in whatever
/// encoding the screen's transport names. When a direct read fails at the
/// transport level and a relay is configured, the read is retried once
/// through `<relay><percent-encoded target>`, so the relay is configured as
/// a prefix such as `https://relay.example/raw?url=`.
pub struct ScriptEndpoint {
    name: String,
    url: String,
    relay: Option<String>,
    client: Client,
}

impl ScriptEndpoint {
    pub fn new(name: &str, url: &str, relay: Option<&str>) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("aperture/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            name: name.to_string(),
            url: url.to_string(),
            relay: relay.map(String::from),
            client,
        })
    }

    async fn get_text(&self, url: &str, query: &[(String, String)]) -> AppResult<String> {
        let resp = self.client.get(url).query(query).send().await?;
        if !resp.status().is_success() {
            return Err(AppError::Transport(format!("HTTP {} from {url}", resp.status())));
        }
        Ok(resp.text().await?)
    }

    async fn get_via_relay(&self, relay: &str, query: &[(String, String)]) -> AppResult<String> {
        let target = reqwest::Url::parse_with_params(&self.url, query)
            .map_err(|e| AppError::Config(format!("invalid endpoint URL {}: {e}", self.url)))?;
        self.get_text(&relay_request_url(relay, target.as_str()), &[])
            .await
    }
}

/// The relay URL is a prefix; the target is appended percent-encoded.
fn relay_request_url(relay: &str, target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{relay}{encoded}")
}

#[async_trait]
impl CollectionSource for ScriptEndpoint {
    fn id(&self) -> &str {
        &self.name
    }

    async fn fetch_raw(
        &self,
        screen: &Screen,
        params: &[(String, String)],
    ) -> AppResult<Vec<Record>> {
        let mut query = vec![("action".to_string(), screen.read_action.to_string())];
        query.extend(params.iter().cloned());

        let body = match self.get_text(&self.url, &query).await {
            Ok(body) => body,
            Err(AppError::Transport(direct)) => match &self.relay {
                Some(relay) => {
                    tracing::debug!("Direct read of {} failed: {direct}, trying relay", self.name);
                    self.get_via_relay(relay, &query).await.map_err(|e| {
                        AppError::Transport(format!("{direct}; relay also failed: {e}"))
                    })?
                }
                None => return Err(AppError::Transport(direct)),
            },
            Err(e) => return Err(e),
        };

        envelope::read_collection(&screen.envelope, &body)
    }

    async fn send(&self, screen: &Screen, fields: &[(String, String)]) -> AppResult<WriteReply> {
        let request = self.client.post(&self.url);

        let resp = match screen.transport {
            Transport::Form | Transport::FireAndForget => request.form(fields).send().await?,
            Transport::Multipart => {
                let form = fields
                    .iter()
                    .fold(multipart::Form::new(), |form, (k, v)| {
                        form.text(k.clone(), v.clone())
                    });
                request.multipart(form).send().await?
            }
        };

        if screen.transport == Transport::FireAndForget {
            tracing::debug!(
                "Write to {} sent without reading the response (HTTP {})",
                self.name,
                resp.status()
            );
            return Ok(WriteReply::Opaque);
        }

        if !resp.status().is_success() {
            return Err(AppError::Transport(format!(
                "HTTP {} from {}",
                resp.status(),
                self.name
            )));
        }

        let body = resp.text().await?;
        Ok(WriteReply::Ack(envelope::read_ack(&screen.envelope, &body)?))
    }
}
