//! The unattended inbox responder: poll, reply, label, sleep, repeat.

pub mod compose;
pub mod labels;
pub mod processor;
pub mod scheduler;

pub use compose::{ReplyEnvelope, compose};
pub use labels::LabelRegistry;
pub use processor::{MessageProcessor, ProcessingOutcome, SkipReason, Stage};
pub use scheduler::{CycleReport, Pacing, PollScheduler};

use crate::config::ResponderSettings;
use crate::error::AppResult;
use crate::gateway::MailboxGateway;

/// Wires a scheduler from validated responder settings.
pub fn build<'a, G: MailboxGateway + ?Sized>(
    gateway: &'a G,
    settings: &ResponderSettings,
) -> AppResult<PollScheduler<'a, G>> {
    settings.validate()?;
    let pacing = Pacing::new(settings.min_interval(), settings.max_interval())?;
    let processor = MessageProcessor::new(gateway, &settings.label_name, &settings.reply_body);

    Ok(PollScheduler::new(
        gateway,
        processor,
        settings.effective_query(),
        settings.batch_size,
        pacing,
    ))
}
