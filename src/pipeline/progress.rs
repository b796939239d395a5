/// Receives `(percent, status)` updates from a pipeline run.
///
/// Percentages rise from 0 to 100; a failed run ends with a single `-1` report whose message
/// starts with `Error:`.
pub trait ProgressSink {
    fn report(&mut self, percent: i32, message: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(i32, &str),
{
    fn report(&mut self, percent: i32, message: &str) {
        self(percent, message)
    }
}

/// Discards every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: i32, _message: &str) {}
}

/// Forwards updates to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, percent: i32, message: &str) {
        if percent < 0 {
            tracing::error!("{message}");
        } else {
            tracing::info!(percent, "{message}");
        }
    }
}
