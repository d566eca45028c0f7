//! Record formatting, sinks, and the span logging handoff.
//!
//! Accepted spans become one line-oriented textual record each:
//!
//! ```text
//! [SPAN_LOG] trace_id:42 span_id:7 service:echo method:Echo.ping start:1700000000000 end_time:1700000000250 cost:250 remote_ip:10.0.0.9
//! ```
//!
//! The handoff to the host scheduler is a [`Runnable`] task owning the
//! span: running it either emits the record and fires the caller's
//! continuation, or discards the span without emission. Exactly one of
//! the two happens per span, and ownership moves exactly once.
//!
//! Where the record goes is a [`RecordSink`] decision: the `tracing`
//! facade by default, any `io::Write`, or an in-memory buffer.

use crate::core::clock::{Clock, SystemClock};
use crate::core::config::SamplingConfig;
use crate::core::Span;
use crate::sampling::SpanSampler;
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::sync::Arc;

/// Fixed prefix identifying a span record line.
pub const RECORD_TAG: &str = "[SPAN_LOG]";

/// Starting capacity for a rendered record.
const RECORD_CAPACITY: usize = 160;

/// Destination for rendered span records.
///
/// A sink must tolerate concurrent `emit` calls but may assume each
/// call delivers one complete record; partial records are never
/// emitted. Emission failures stay inside the sink, they are never
/// surfaced to the span's owner.
pub trait RecordSink: Send + Sync {
    /// Delivers one complete record line (without trailing newline).
    fn emit(&self, record: &str);
}

/// Emits records through the `tracing` facade under the `span_log`
/// target. This is the default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn emit(&self, record: &str) {
        tracing::info!(target: "span_log", "{record}");
    }
}

/// Writes records line by line to any `io::Write`.
#[derive(Debug)]
pub struct WriterSink<W: std::io::Write + Send> {
    writer: Mutex<W>,
}

impl<W: std::io::Write + Send> WriterSink<W> {
    /// Wraps a writer. Each record becomes one line.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: std::io::Write + Send> RecordSink for WriterSink<W> {
    fn emit(&self, record: &str) {
        let mut writer = self.writer.lock();
        if let Err(err) = writeln!(writer, "{record}") {
            tracing::warn!(target: "span_log", "failed to write span record: {err}");
        }
    }
}

/// Captures records in memory. Intended for tests and inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Returns a copy of all records emitted so far.
    pub fn records(&self) -> Vec<String> {
        self.records.lock().clone()
    }
}

impl RecordSink for MemorySink {
    fn emit(&self, record: &str) {
        self.records.lock().push(record.to_owned());
    }
}

/// What running a log task did with its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The span was formatted and its record emitted
    Emitted,
    /// The span was released without emission
    Discarded,
}

/// A unit of work handed to the host scheduler.
///
/// The host runs the task to completion synchronously; the task owns
/// its span and releases it when run. Dropping a task unrun also
/// releases the span, so the exactly-once ownership transfer holds on
/// every path.
pub trait Runnable: Send {
    /// Consumes the task, releasing the span it owns.
    fn run(self: Box<Self>) -> Outcome;
}

/// Continuation invoked after a span's record has been emitted, before
/// the span is released.
pub type Continuation = Box<dyn FnOnce(&Span) + Send>;

/// Task that formats its span, emits the record, and fires the
/// caller's continuation.
pub struct SpanLogTask {
    span: Span,
    sink: Arc<dyn RecordSink>,
    callback: Option<Continuation>,
}

impl SpanLogTask {
    /// Creates a log task without a continuation.
    pub fn new(span: Span, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            span,
            sink,
            callback: None,
        }
    }

    /// Attaches a continuation to run after emission.
    pub fn with_callback(mut self, callback: Continuation) -> Self {
        self.callback = Some(callback);
        self
    }
}

impl Runnable for SpanLogTask {
    fn run(mut self: Box<Self>) -> Outcome {
        let record = render_record(&self.span);
        self.sink.emit(&record);
        if let Some(callback) = self.callback.take() {
            callback(&self.span);
        }
        Outcome::Emitted
    }
}

/// Task that releases a rejected span without emission.
pub struct DiscardTask {
    _span: Span,
}

impl DiscardTask {
    /// Takes ownership of a span destined for release.
    pub fn new(span: Span) -> Self {
        Self { _span: span }
    }
}

impl Runnable for DiscardTask {
    fn run(self: Box<Self>) -> Outcome {
        Outcome::Discarded
    }
}

/// Renders a span into its single-line record.
///
/// `trace_id`, `span_id`, `service`, `method`, and `start` are always
/// present (unset numerics render as `-`); `parent_span_id`, then
/// `end_time`, then the `cost`/`remote_ip` pair appear only when set.
pub fn render_record(span: &Span) -> String {
    let mut record = String::with_capacity(RECORD_CAPACITY);
    record.push_str(RECORD_TAG);
    write_required(&mut record, "trace_id", span.trace_id);
    write_required(&mut record, "span_id", span.span_id);
    let _ = write!(record, " service:{}", span.service_name);
    let _ = write!(record, " method:{}", span.method_name);
    write_required(&mut record, "start", span.start_time);

    if let Some(parent) = span.parent_span_id {
        let _ = write!(record, " parent_span_id:{parent}");
    }
    if let Some(end) = span.end_time {
        let _ = write!(record, " end_time:{end}");
    }
    if let Some(cost) = span.cost {
        let _ = write!(record, " cost:{cost} remote_ip:{}", span.remote_ip);
    }
    record
}

fn write_required<T: std::fmt::Display>(out: &mut String, key: &str, value: Option<T>) {
    match value {
        Some(v) => {
            let _ = write!(out, " {key}:{v}");
        }
        None => {
            let _ = write!(out, " {key}:-");
        }
    }
}

/// Factory turning spans into scheduler tasks.
///
/// This is the composition seam: callers submit a span exactly once
/// and get back the task that will release it.
pub trait SpanLogger: Send + Sync {
    /// Takes ownership of `span` and returns the task that will emit
    /// or discard it.
    fn create_log_task(&self, span: Span) -> Box<dyn Runnable>;
}

/// Logger that discards every span without emission.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpanLogger;

impl SpanLogger for NoopSpanLogger {
    fn create_log_task(&self, span: Span) -> Box<dyn Runnable> {
        Box::new(DiscardTask::new(span))
    }
}

/// Logger that consults a [`SpanSampler`] and emits accepted spans to
/// its sink.
pub struct SamplingSpanLogger<C: Clock = SystemClock> {
    sampler: SpanSampler<C>,
    sink: Arc<dyn RecordSink>,
    on_emitted: Option<Arc<dyn Fn(&Span) + Send + Sync>>,
}

impl SamplingSpanLogger<SystemClock> {
    /// Creates a logger accepting at most `span_limit` spans per
    /// millisecond.
    pub fn new(span_limit: u32, sink: Arc<dyn RecordSink>) -> Self {
        Self::with_sampler(SpanSampler::new(span_limit), sink)
    }

    /// Creates a logger from a [`SamplingConfig`].
    pub fn from_config(config: &SamplingConfig, sink: Arc<dyn RecordSink>) -> Self {
        Self::new(config.span_limit, sink)
    }
}

impl<C: Clock> SamplingSpanLogger<C> {
    /// Creates a logger around an existing sampler.
    pub fn with_sampler(sampler: SpanSampler<C>, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            sampler,
            sink,
            on_emitted: None,
        }
    }

    /// Registers a continuation invoked after each emitted record,
    /// before the span is released. Rejected spans never reach it.
    pub fn on_emitted<F: Fn(&Span) + Send + Sync + 'static>(mut self, callback: F) -> Self {
        self.on_emitted = Some(Arc::new(callback));
        self
    }

    /// The sampler backing this logger.
    pub fn sampler(&self) -> &SpanSampler<C> {
        &self.sampler
    }
}

impl<C: Clock> SpanLogger for SamplingSpanLogger<C> {
    fn create_log_task(&self, span: Span) -> Box<dyn Runnable> {
        if self.sampler.should_log(&span) {
            let mut task = SpanLogTask::new(span, Arc::clone(&self.sink));
            if let Some(callback) = &self.on_emitted {
                let callback = Arc::clone(callback);
                task = task.with_callback(Box::new(move |span| callback(span)));
            }
            Box::new(task)
        } else {
            Box::new(DiscardTask::new(span))
        }
    }
}
