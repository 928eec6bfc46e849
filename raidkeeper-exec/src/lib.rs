//! Side effects for raidkeeper: array-tool processes, report mail,
//! health-check pings and the tracing subscriber.

mod error;
pub mod healthcheck;
mod logging;
pub mod mail;
pub mod notifier;
pub mod process;

pub use error::{ExecError, NotifyError};
pub use healthcheck::{HealthcheckPinger, Ping};
pub use logging::init_tracing;
pub use mail::MailNotifier;
pub use notifier::Notifiers;
pub use process::ProcessArrayTool;
