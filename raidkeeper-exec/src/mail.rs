//! Report delivery through a local `sendmail`-compatible binary.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use raidkeeper_core::config::NotifyConfig;
use raidkeeper_report::Report;

use crate::error::{io_err, NotifyError};

const BOUNDARY: &str = "raidkeeper-report-part";

#[derive(Debug, Clone)]
pub struct MailNotifier {
    sendmail: PathBuf,
    to: Option<String>,
    from: Option<String>,
}

impl MailNotifier {
    pub fn new(sendmail: impl Into<PathBuf>, to: Option<String>, from: Option<String>) -> Self {
        Self {
            sendmail: sendmail.into(),
            to: to.filter(|t| !t.trim().is_empty()),
            from: from.filter(|f| !f.trim().is_empty()),
        }
    }

    pub fn from_config(config: &NotifyConfig) -> Self {
        Self::new(
            config.sendmail.clone(),
            config.email_to.clone(),
            config.email_from.clone(),
        )
    }

    /// Send `report`. Without a recipient this does nothing.
    pub fn send(&self, report: &Report) -> Result<(), NotifyError> {
        let Some(to) = self.to.as_deref() else {
            tracing::debug!("no recipient configured, report not mailed");
            return Ok(());
        };
        let message = compose(report, to, self.from.as_deref());

        let mut child = Command::new(&self.sendmail)
            .args(["-t", "-oi"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| io_err(&self.sendmail, e))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(message.as_bytes())
                .map_err(|e| io_err(&self.sendmail, e))?;
        }
        let status = child.wait().map_err(|e| io_err(&self.sendmail, e))?;
        if !status.success() {
            return Err(NotifyError::Sendmail {
                path: self.sendmail.clone(),
                status,
            });
        }
        tracing::info!(to = %to, subject = %report.subject, "report mailed");
        Ok(())
    }
}

/// Full RFC 5322 message with text and HTML alternatives.
pub fn compose(report: &Report, to: &str, from: Option<&str>) -> String {
    let mut msg = format!("To: {to}\n");
    if let Some(from) = from {
        msg.push_str(&format!("From: {from}\n"));
    }
    msg.push_str(&format!("Subject: {}\n", one_line(&report.subject)));
    msg.push_str("MIME-Version: 1.0\n");
    msg.push_str(&format!(
        "Content-Type: multipart/alternative; boundary=\"{BOUNDARY}\"\n\n"
    ));
    for (mime, body) in [("text/plain", &report.text), ("text/html", &report.html)] {
        msg.push_str(&format!("--{BOUNDARY}\n"));
        msg.push_str(&format!("Content-Type: {mime}; charset=utf-8\n"));
        msg.push_str("Content-Transfer-Encoding: 8bit\n\n");
        msg.push_str(body);
        if !body.ends_with('\n') {
            msg.push('\n');
        }
    }
    msg.push_str(&format!("--{BOUNDARY}--\n"));
    msg
}

fn one_line(s: &str) -> String {
    s.split(['\r', '\n']).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidkeeper_report::Severity;

    fn report() -> Report {
        Report {
            severity: Severity::Completed,
            subject: "[nas] [COMPLETED] DIFF + SYNC Jobs".to_string(),
            text: "## Log\n\nEverything OK\n".to_string(),
            html: "<pre>Everything OK</pre>".to_string(),
        }
    }

    #[test]
    fn message_has_headers_and_both_parts() {
        let msg = compose(&report(), "admin@example.com", Some("nas@example.com"));
        assert!(msg.starts_with("To: admin@example.com\nFrom: nas@example.com\n"));
        assert!(msg.contains("Subject: [nas] [COMPLETED] DIFF + SYNC Jobs\n"));
        assert!(msg.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(msg.contains("Content-Type: text/html; charset=utf-8"));
        assert!(msg.contains("<pre>Everything OK</pre>\n"));
        assert!(msg.ends_with(&format!("--{BOUNDARY}--\n")));
    }

    #[test]
    fn subject_cannot_inject_headers() {
        let mut r = report();
        r.subject = "oops\nBcc: someone@example.com".to_string();
        let msg = compose(&r, "admin@example.com", None);
        assert!(msg.contains("Subject: oops Bcc: someone@example.com\n"));
        assert!(!msg.contains("From:"));
    }

    #[test]
    fn no_recipient_is_a_no_op() {
        let mailer = MailNotifier::new("/nonexistent/sendmail", Some("  ".into()), None);
        mailer.send(&report()).expect("nothing to send");
    }

    #[cfg(unix)]
    #[test]
    fn pipes_message_into_sendmail() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("mail.out");
        let script = dir.path().join("sendmail");
        std::fs::write(&script, format!("#!/bin/sh\ncat > '{}'\n", out.display())).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        MailNotifier::new(&script, Some("admin@example.com".into()), None)
            .send(&report())
            .unwrap();
        let sent = std::fs::read_to_string(out).unwrap();
        assert!(sent.starts_with("To: admin@example.com\n"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_sendmail_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("sendmail");
        std::fs::write(&script, "#!/bin/sh\ncat >/dev/null\nexit 75\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = MailNotifier::new(&script, Some("admin@example.com".into()), None)
            .send(&report())
            .unwrap_err();
        assert!(matches!(err, NotifyError::Sendmail { .. }));
    }
}
