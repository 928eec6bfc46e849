//! Dead-man's-switch pings (healthchecks.io style endpoints).

use std::time::Duration;

use crate::error::NotifyError;

/// Which endpoint to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ping {
    Start,
    Success,
    Fail,
}

pub struct HealthcheckPinger {
    base: String,
    agent: ureq::Agent,
}

impl HealthcheckPinger {
    pub fn new(base: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();
        Self {
            base: base.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn url(&self, ping: Ping) -> String {
        match ping {
            Ping::Start => format!("{}/start", self.base),
            Ping::Success => self.base.clone(),
            Ping::Fail => format!("{}/fail", self.base),
        }
    }

    pub fn ping(&self, ping: Ping) -> Result<(), NotifyError> {
        let url = self.url(ping);
        self.agent
            .get(&url)
            .call()
            .map_err(|e| NotifyError::Http {
                url: url.clone(),
                source: Box::new(e),
            })?;
        tracing::debug!(url = %url, "health-check pinged");
        Ok(())
    }
}
