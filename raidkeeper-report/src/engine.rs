//! Tera rendering engine: [`ReportBuilder`] and the finished [`Report`].

use tera::Tera;

use raidkeeper_core::RunOutcome;

use crate::context::ReportContext;
use crate::error::ReportError;
use crate::html::text_to_html;
use crate::subject::{self, Severity};

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const REPORT_TEMPLATE: &str = "report.txt";

const TPLS: &[(&str, &str)] = &[(REPORT_TEMPLATE, include_str!("templates/report.txt.tera"))];

fn build_tera() -> Result<Tera, ReportError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TPLS.iter().map(|(n, c)| (*n, *c)))?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A finished notification: subject plus text and HTML bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub severity: Severity,
    pub subject: String,
    pub text: String,
    pub html: String,
}

// ---------------------------------------------------------------------------
// ReportBuilder
// ---------------------------------------------------------------------------

/// Renders reports from run outcomes. Create once and reuse.
pub struct ReportBuilder {
    tera: Tera,
    subject_prefix: String,
}

impl ReportBuilder {
    /// Construct a builder whose subjects start with `subject_prefix`
    /// (may be empty).
    pub fn new(subject_prefix: impl Into<String>) -> Result<Self, ReportError> {
        Ok(ReportBuilder {
            tera: build_tera()?,
            subject_prefix: subject_prefix.into(),
        })
    }

    /// Report for a run that went through its whole sequence.
    pub fn build(&self, outcome: &RunOutcome, log: &str) -> Result<Report, ReportError> {
        let (severity, subject) = subject::classify(outcome);
        let subject = self.prefixed(&subject);
        let ctx = ReportContext::from_outcome(outcome, severity, subject, log.to_string());
        self.render(ctx)
    }

    /// Diagnostic report for a run aborted by a fatal precondition.
    pub fn build_fatal(
        &self,
        outcome: &RunOutcome,
        reason: &str,
        detail: &str,
        log: &str,
    ) -> Result<Report, ReportError> {
        let (_, subject) = subject::fatal(reason);
        let subject = self.prefixed(&subject);
        let ctx = ReportContext::fatal(outcome, subject, detail.to_string(), log.to_string());
        self.render(ctx)
    }

    fn render(&self, ctx: ReportContext) -> Result<Report, ReportError> {
        let text = self.tera.render(REPORT_TEMPLATE, &ctx.to_tera_context()?)?;
        let html = text_to_html(&text);
        Ok(Report {
            severity: ctx.severity,
            subject: ctx.subject,
            text,
            html,
        })
    }

    fn prefixed(&self, subject: &str) -> String {
        let prefix = self.subject_prefix.trim();
        if prefix.is_empty() {
            subject.to_string()
        } else {
            format!("{prefix} {subject}")
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
