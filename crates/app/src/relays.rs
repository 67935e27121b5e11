//! Relay targets for corrected segments.

use hamming_relay_core::relay::Relay;
use hamming_relay_core::{RelayError, Segment};
use std::time::Duration;

/// Posts each segment as JSON to a fixed HTTP endpoint.
pub struct HttpRelay {
    agent: ureq::Agent,
    url: String,
}

impl HttpRelay {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            url: url.into(),
        }
    }
}

impl Relay for HttpRelay {
    fn deliver(&self, segment: &Segment) -> Result<(), RelayError> {
        match self.agent.post(&self.url).send_json(segment) {
            Ok(response) if response.status() == 200 => Ok(()),
            Ok(response) => {
                let status = response.status();
                Err(RelayError::Rejected {
                    status,
                    body: response.into_string().unwrap_or_default(),
                })
            }
            Err(ureq::Error::Status(status, response)) => Err(RelayError::Rejected {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(e) => Err(RelayError::Unreachable(format!("{}: {e}", self.url))),
        }
    }
}

/// Logs each segment instead of sending it anywhere. Used by offline runs.
#[derive(Debug, Default)]
pub struct LogRelay;

impl Relay for LogRelay {
    fn deliver(&self, segment: &Segment) -> Result<(), RelayError> {
        log::debug!(
            "DATA TRANSFER {}",
            serde_json::to_string(segment).unwrap_or_else(|_| segment.segment.clone())
        );
        Ok(())
    }
}
