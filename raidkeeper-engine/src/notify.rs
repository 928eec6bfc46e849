//! Notification seam between the coordinator and delivery transports.

use raidkeeper_report::Report;

/// Delivers finished reports. Failures are logged by the coordinator and
/// never change the run's outcome.
pub trait Notifier {
    type Error: std::fmt::Display;

    /// Called once before the first step runs.
    fn run_started(&mut self) {}

    fn send(&mut self, report: &Report) -> Result<(), Self::Error>;
}

impl<N: Notifier + ?Sized> Notifier for &mut N {
    type Error = N::Error;

    fn run_started(&mut self) {
        (**self).run_started()
    }

    fn send(&mut self, report: &Report) -> Result<(), Self::Error> {
        (**self).send(report)
    }
}
