/*!
 * HTTP transport for `sendMessage` calls.
 *
 * Uses `ureq`, a blocking client with no async runtime. Every request
 * already runs on its own short-lived thread, so blocking I/O costs nothing
 * here.
 *
 * - **Single attempt**: no retries, no backoff.
 * - **Status check only**: HTTP 200 is success. Any other status is a
 *   failure; the body is read only so it can go into the log line.
 */
use std::time::Duration;

use ureq::Agent;

use crate::error::DispatchError;
use crate::protocol::request::SendRequest;

/**
 * Performs one outbound call for one request.
 *
 * Implementations are shared by every send thread, hence `Send + Sync`.
 */
pub trait Transport: Send + Sync + 'static {
    fn execute(&self, request: &SendRequest) -> Result<(), DispatchError>;
}

/// Production transport backed by a shared `ureq::Agent`.
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    /**
     * Creates the agent.
     *
     * Timeouts:
     * - 10 s connect
     * - `timeout` total per request
     *
     * Status codes are inspected by hand, so the agent must not turn 4xx/5xx
     * into errors.
     */
    pub fn new(timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(10)))
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &SendRequest) -> Result<(), DispatchError> {
        let response = self
            .agent
            .post(request.url().as_str())
            .send_empty()
            .map_err(DispatchError::transport)?;

        let status = response.status().as_u16();
        if status == 200 {
            return Ok(());
        }

        let body = response
            .into_body()
            .read_to_string()
            .unwrap_or_else(|_| "<unreadable body>".into());

        Err(DispatchError::Status { status, body })
    }
}
