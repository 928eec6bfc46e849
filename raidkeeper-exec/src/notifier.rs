//! The notifier used by the `run` command: mail plus optional pings.

use raidkeeper_core::config::NotifyConfig;
use raidkeeper_engine::Notifier;
use raidkeeper_report::{Report, Severity};

use crate::error::NotifyError;
use crate::healthcheck::{HealthcheckPinger, Ping};
use crate::mail::MailNotifier;

pub struct Notifiers {
    mail: MailNotifier,
    healthcheck: Option<HealthcheckPinger>,
}

impl Notifiers {
    pub fn new(mail: MailNotifier, healthcheck: Option<HealthcheckPinger>) -> Self {
        Self { mail, healthcheck }
    }

    pub fn from_config(config: &NotifyConfig) -> Self {
        let healthcheck = config
            .healthcheck_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .map(HealthcheckPinger::new);
        Self::new(MailNotifier::from_config(config), healthcheck)
    }

    fn ping(&self, ping: Ping) {
        if let Some(hc) = &self.healthcheck {
            if let Err(err) = hc.ping(ping) {
                tracing::warn!(error = %err, "health-check ping failed");
            }
        }
    }
}

impl Notifier for Notifiers {
    type Error = NotifyError;

    fn run_started(&mut self) {
        self.ping(Ping::Start);
    }

    fn send(&mut self, report: &Report) -> Result<(), NotifyError> {
        let ping = match report.severity {
            Severity::Error => Ping::Fail,
            Severity::Completed | Severity::Warning => Ping::Success,
        };
        self.ping(ping);
        self.mail.send(report)
    }
}
