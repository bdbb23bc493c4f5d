//! Progress and completion notifications.
//!
//! Callers register a [`Notifier`] per call instead of the core reaching
//! for a global logger or event loop.

use crate::Outcome;
use std::fmt;

/// Which orchestrator call an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Encrypt => f.write_str("encrypt"),
            Operation::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Steps of an orchestrator call, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reading,
    DerivingKey,
    Transforming,
    Verifying,
    Writing,
}

#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    Stage { operation: Operation, stage: Stage },
    Finished { operation: Operation, outcome: &'a Outcome },
}

/// Receiver for [`Event`]s. Must be callable from any worker thread.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &Event<'_>);
}

impl<F> Notifier for F
where
    F: Fn(&Event<'_>) + Send + Sync,
{
    fn notify(&self, event: &Event<'_>) {
        self(event)
    }
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &Event<'_>) {
        match event {
            Event::Stage { operation, stage } => log::debug!("{operation}: {stage:?}"),
            Event::Finished { operation, outcome } if outcome.success() => {
                log::info!("{operation}: {}", outcome.message())
            }
            Event::Finished { operation, outcome } => {
                log::warn!("{operation}: {}", outcome.message())
            }
        }
    }
}

pub(crate) fn emit(notifier: Option<&dyn Notifier>, event: Event<'_>) {
    if let Some(n) = notifier {
        n.notify(&event);
    }
}
