use crate::function::{FunctionEntry, Resolution};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// Request identifier backed by ULID, used to correlate log lines.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse a caller-supplied id (e.g. `x-request-id`) when it is a valid ULID.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.parse::<RequestId>().ok())
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(RequestId)
    }
}

/// Per-request scratch state passed through the invocation pipeline.
///
/// Created once per request by the transport, filled from the catalog
/// resolution, and discarded when the response has been written. The
/// shaping decision recorded here is what the transport reads to choose
/// between scalar and sequence encoding.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    request_id: RequestId,
    path: String,
    function: Option<Arc<FunctionEntry>>,
    argument: Option<String>,
    single_requested: Option<bool>,
    debug: bool,
    output_single: Option<bool>,
}

impl InvocationContext {
    #[must_use]
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Attach the catalog's resolution (function and literal argument).
    #[must_use]
    pub fn with_resolution(mut self, resolution: Option<Resolution>) -> Self {
        if let Some(Resolution { function, argument }) = resolution {
            self.function = Some(function);
            self.argument = argument;
        }
        self
    }

    #[must_use]
    pub fn with_function(mut self, function: Arc<FunctionEntry>) -> Self {
        self.function = Some(function);
        self
    }

    #[must_use]
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = Some(argument.into());
        self
    }

    #[must_use]
    pub fn with_single_requested(mut self, single: bool) -> Self {
        self.single_requested = Some(single);
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Request path, used when reporting resolution failures.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn function(&self) -> Option<&Arc<FunctionEntry>> {
        self.function.as_ref()
    }

    #[must_use]
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// The caller's "single output requested" hint; absent means no.
    #[must_use]
    pub fn single_requested(&self) -> bool {
        self.single_requested.unwrap_or(false)
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Shaping decision: `Some(true)` for a single value, `Some(false)` for a
    /// sequence, `None` when nothing was shaped (sink acknowledgements).
    #[must_use]
    pub fn output_single(&self) -> Option<bool> {
        self.output_single
    }

    pub(crate) fn record_output_single(&mut self, single: bool) {
        self.output_single = Some(single);
    }
}
