use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::gateway::MailboxGateway;

use super::processor::{MessageProcessor, ProcessingOutcome};

/// Bounds for the randomized pause between poll cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    min: Duration,
    max: Duration,
}

impl Pacing {
    pub fn new(min: Duration, max: Duration) -> AppResult<Self> {
        if min > max {
            return Err(AppError::Config(format!(
                "poll interval minimum {min:?} exceeds maximum {max:?}"
            )));
        }

        Ok(Self { min, max })
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Uniform draw from `[min, max]` at millisecond resolution. Bounds past
    /// `u64::MAX` milliseconds saturate.
    pub fn next_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let min = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rng.gen_range(min..=max))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub listed: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub list_error: Option<String>,
}

impl CycleReport {
    fn record(&mut self, outcome: &ProcessingOutcome) {
        match outcome {
            ProcessingOutcome::Completed => self.completed += 1,
            ProcessingOutcome::Skipped { .. } => self.skipped += 1,
            ProcessingOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn summary(&self) -> String {
        match &self.list_error {
            Some(error) => format!("poll failed: {error}"),
            None => format!(
                "{} listed, {} completed, {} skipped, {} failed",
                self.listed, self.completed, self.skipped, self.failed
            ),
        }
    }
}

/// Drives poll cycles: list, drain sequentially, then sleep a jittered delay.
pub struct PollScheduler<'a, G: ?Sized> {
    gateway: &'a G,
    processor: MessageProcessor<'a, G>,
    query: String,
    batch_size: u32,
    pacing: Pacing,
}

impl<'a, G: MailboxGateway + ?Sized> PollScheduler<'a, G> {
    pub fn new(
        gateway: &'a G,
        processor: MessageProcessor<'a, G>,
        query: impl Into<String>,
        batch_size: u32,
        pacing: Pacing,
    ) -> Self {
        Self {
            gateway,
            processor,
            query: query.into(),
            batch_size,
            pacing,
        }
    }

    /// Polls forever. Errors inside a cycle are logged and the next cycle is
    /// still scheduled; only an external shutdown ends the loop.
    pub async fn run(&self) {
        info!(
            query = %self.query,
            min_secs = self.pacing.min().as_secs_f64(),
            max_secs = self.pacing.max().as_secs_f64(),
            "poll loop started"
        );

        loop {
            self.tick().await;
        }
    }

    /// One cycle followed by its pacing sleep. Returns the report and the
    /// delay that was slept.
    pub async fn tick(&self) -> (CycleReport, Duration) {
        let report = self.run_cycle().await;
        let delay = self.pacing.next_delay(&mut rand::thread_rng());

        info!(delay_secs = delay.as_secs_f64(), "{}; sleeping", report.summary());
        tokio::time::sleep(delay).await;

        (report, delay)
    }

    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        let refs = match self.gateway.list_messages(&self.query, self.batch_size).await {
            Ok(refs) => refs,
            Err(err) => {
                error!(query = %self.query, error = %err, "failed to list messages");
                report.list_error = Some(err.to_string());
                return report;
            }
        };

        report.listed = refs.len();
        for message in &refs {
            let outcome = self.processor.process(&message.id).await;
            report.record(&outcome);
        }

        report
    }
}
