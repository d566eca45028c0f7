use serde::{Deserialize, Serialize};

/// Represents one traced unit of work: a single RPC call or operation.
///
/// A span is created empty by the instrumenting caller and filled in as
/// the work progresses: identity and start time at entry, end time and
/// remote address at exit. Numeric fields use `Option` so "not yet
/// assigned" is distinct from any valid value; the empty string plays
/// the same role for `service_name`, `method_name`, and `remote_ip`.
///
/// Ownership moves exactly once: the caller hands the span to a
/// [`SpanLogger`](crate::logging::SpanLogger), and whichever task comes
/// back releases it when run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Trace this span belongs to. A set trace id marks the span as
    /// already selected upstream and the sampler will never reject it.
    pub trace_id: Option<u64>,
    /// Identifier of this span within the trace
    pub span_id: Option<u32>,
    /// Parent span, if this is a nested call
    pub parent_span_id: Option<u32>,
    /// Name of the service handling the call
    pub service_name: String,
    /// Name of the method invoked
    pub method_name: String,
    /// Protocol-defined payload type tag
    pub data_type: Option<i32>,
    /// Protocol-defined compression type tag
    pub compress_type: Option<i32>,
    /// When the call started, in unix milliseconds
    pub start_time: Option<u64>,
    /// When the call finished, in unix milliseconds
    pub end_time: Option<u64>,
    /// Elapsed time of the call in milliseconds (`end_time - start_time`)
    pub cost: Option<u64>,
    /// Address of the remote peer
    pub remote_ip: String,
    /// Status code of the call
    pub status: Option<i32>,
    /// Error code of the call, if it failed
    pub error: Option<i32>,
}

impl Span {
    /// Creates a new span builder
    pub fn builder() -> SpanBuilder {
        SpanBuilder::default()
    }

    /// Fills `cost` from `end_time - start_time`.
    ///
    /// Deriving the cost is the caller's responsibility at call exit;
    /// this is a no-op unless both timestamps are set. Returns the
    /// computed cost for convenience.
    pub fn compute_cost(&mut self) -> Option<u64> {
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            self.cost = Some(end.saturating_sub(start));
        }
        self.cost
    }

    /// Returns true if this span was already selected upstream
    /// (carries a trace id) and must bypass rate limiting.
    pub fn is_force_included(&self) -> bool {
        self.trace_id.is_some()
    }

    /// Returns true if this span is a root span (has no parent)
    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }
}

/// Builder for creating Span instances
#[derive(Debug, Default)]
pub struct SpanBuilder {
    span: Span,
}

impl SpanBuilder {
    /// Sets the trace id, marking the span as force-included.
    pub fn trace_id(mut self, trace_id: u64) -> Self {
        self.span.trace_id = Some(trace_id);
        self
    }

    /// Sets the span id.
    pub fn span_id(mut self, span_id: u32) -> Self {
        self.span.span_id = Some(span_id);
        self
    }

    /// Sets the parent span id.
    pub fn parent_span_id(mut self, parent_span_id: u32) -> Self {
        self.span.parent_span_id = Some(parent_span_id);
        self
    }

    /// Sets the service name.
    pub fn service_name<S: Into<String>>(mut self, service_name: S) -> Self {
        self.span.service_name = service_name.into();
        self
    }

    /// Sets the method name.
    pub fn method_name<S: Into<String>>(mut self, method_name: S) -> Self {
        self.span.method_name = method_name.into();
        self
    }

    /// Sets the payload type tag.
    pub fn data_type(mut self, data_type: i32) -> Self {
        self.span.data_type = Some(data_type);
        self
    }

    /// Sets the compression type tag.
    pub fn compress_type(mut self, compress_type: i32) -> Self {
        self.span.compress_type = Some(compress_type);
        self
    }

    /// Sets the start timestamp in unix milliseconds.
    pub fn start_time(mut self, start_time: u64) -> Self {
        self.span.start_time = Some(start_time);
        self
    }

    /// Sets the end timestamp in unix milliseconds.
    pub fn end_time(mut self, end_time: u64) -> Self {
        self.span.end_time = Some(end_time);
        self
    }

    /// Sets the call cost in milliseconds.
    pub fn cost(mut self, cost: u64) -> Self {
        self.span.cost = Some(cost);
        self
    }

    /// Sets the remote peer address.
    pub fn remote_ip<S: Into<String>>(mut self, remote_ip: S) -> Self {
        self.span.remote_ip = remote_ip.into();
        self
    }

    /// Sets the status code.
    pub fn status(mut self, status: i32) -> Self {
        self.span.status = Some(status);
        self
    }

    /// Sets the error code.
    pub fn error(mut self, error: i32) -> Self {
        self.span.error = Some(error);
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> Span {
        self.span
    }
}
