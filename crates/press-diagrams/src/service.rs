//! Remote diagram services over HTTP GET.

use std::io::Write;
use std::time::Duration;

use base64::Engine;
use base64::prelude::{BASE64_STANDARD, BASE64_URL_SAFE};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use ureq::Agent;

use crate::consts::SERVICE_TIMEOUT;
use crate::{DiagramError, DiagramMethod};

/// Create HTTP agent with the specified timeout.
///
/// Non-2xx statuses are returned as responses so callers can report them.
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Encode diagram source the way Kroki GET URLs expect:
/// zlib at maximum compression, then URL-safe base64.
pub fn kroki_encode(source: &str) -> Result<String, DiagramError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(source.as_bytes())
        .map_err(|e| DiagramError::Encode(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| DiagramError::Encode(e.to_string()))?;
    Ok(BASE64_URL_SAFE.encode(compressed))
}

/// Fetch `url` and return the body of a 200 response.
fn fetch_image(agent: &Agent, url: &str) -> Result<Vec<u8>, DiagramError> {
    let response = agent
        .get(url)
        .call()
        .map_err(|e| DiagramError::Http(e.to_string()))?;

    let status = response.status().as_u16();
    if status != 200 {
        return Err(DiagramError::Status { status });
    }

    let bytes = response
        .into_body()
        .read_to_vec()
        .map_err(|e| DiagramError::Http(e.to_string()))?;
    if bytes.is_empty() {
        return Err(DiagramError::EmptyOutput);
    }
    Ok(bytes)
}

/// mermaid.ink image service.
pub struct MermaidInk {
    base_url: String,
    agent: Agent,
}

impl MermaidInk {
    /// Create a client for the service at `base_url` (e.g. `https://mermaid.ink`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            agent: create_agent(SERVICE_TIMEOUT),
        }
    }

    /// Set the request deadline.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// Image URL for `source`.
    #[must_use]
    pub fn url_for(&self, source: &str) -> String {
        format!(
            "{}/img/{}",
            self.base_url.trim_end_matches('/'),
            BASE64_STANDARD.encode(source)
        )
    }
}

impl DiagramMethod for MermaidInk {
    fn name(&self) -> &'static str {
        "mermaid.ink"
    }

    fn attempt(&self, source: &str) -> Result<Vec<u8>, DiagramError> {
        fetch_image(&self.agent, &self.url_for(source))
    }
}

/// Kroki rendering service (PNG output).
pub struct Kroki {
    base_url: String,
    agent: Agent,
}

impl Kroki {
    /// Create a client for the service at `base_url` (e.g. `https://kroki.io`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            agent: create_agent(SERVICE_TIMEOUT),
        }
    }

    /// Set the request deadline.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// PNG URL for `source`.
    pub fn url_for(&self, source: &str) -> Result<String, DiagramError> {
        Ok(format!(
            "{}/mermaid/png/{}",
            self.base_url.trim_end_matches('/'),
            kroki_encode(source)?
        ))
    }
}

impl DiagramMethod for Kroki {
    fn name(&self) -> &'static str {
        "kroki"
    }

    fn attempt(&self, source: &str) -> Result<Vec<u8>, DiagramError> {
        fetch_image(&self.agent, &self.url_for(source)?)
    }
}
