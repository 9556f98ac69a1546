//! Invocation Engine - runs the resolved function against the element stream.

use super::context::{InvocationContext, RequestId};
use super::payload::RequestPayload;
use super::shaper::shape;
use crate::error::{panic_message, InvocationError};
use crate::function::{
    Consumer, Converter, EnvelopeUnpacker, FunctionEntry, Handler, LiteralConverter,
    MessageUnpacker,
};
use crate::runtime_config::RuntimeConfig;
use crate::stream::{self, tap, CachedStream, ElementStream};
use may::coroutine;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Outcome status of a successful invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStatus {
    /// Output is the function's result
    Ok,
    /// Input was handed to a sink; output echoes what was accepted
    Accepted,
}

impl InvocationStatus {
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            InvocationStatus::Ok => 200,
            InvocationStatus::Accepted => 202,
        }
    }
}

/// Still-lazy result handed back to the transport.
pub struct Invocation {
    pub status: InvocationStatus,
    pub body: ElementStream,
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Executes transforms, sinks and sources for a request.
///
/// The invoker never blocks on the element stream: it composes the stream
/// operators, records the shaping decision on the context and returns. Sinks
/// are started on their own coroutine and acknowledged immediately.
#[derive(Clone)]
pub struct Invoker {
    converter: Arc<dyn Converter>,
    unpacker: Arc<dyn MessageUnpacker>,
    stack_size: usize,
}

impl Default for Invoker {
    fn default() -> Self {
        Self::new(&RuntimeConfig::default())
    }
}

impl Invoker {
    /// Invoker with the literal converter and envelope unpacker.
    #[must_use]
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            converter: Arc::new(LiteralConverter),
            unpacker: Arc::new(EnvelopeUnpacker),
            stack_size: config.stack_size,
        }
    }

    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    #[must_use]
    pub fn with_unpacker(mut self, unpacker: Arc<dyn MessageUnpacker>) -> Self {
        self.unpacker = unpacker;
        self
    }

    /// Handle a POST: feed the payload to a transform or a sink.
    ///
    /// # Errors
    ///
    /// [`InvocationError::NoSuchFunction`] when no transform or sink is
    /// attached, [`InvocationError::Spawn`] when the sink coroutine cannot start.
    pub fn post(
        &self,
        ctx: &mut InvocationContext,
        payload: RequestPayload,
    ) -> Result<Invocation, InvocationError> {
        let entry = attached(ctx)?;
        let start = Instant::now();

        let invocation = match &entry.handler {
            Handler::Transform(function) => {
                let mut input = payload.into_stream();
                if ctx.debug() {
                    input = tap(input, &entry.name, "input");
                }
                let mut output = function.apply(input);
                if entry.signature.message_output {
                    output = self.unpack(&entry, output);
                }
                if ctx.debug() {
                    output = tap(output, &entry.name, "output");
                }
                let single = ctx.single_requested();
                let body = shape(ctx, &entry.signature, single, output);
                Invocation {
                    status: InvocationStatus::Ok,
                    body,
                }
            }
            Handler::Sink(consumer) => {
                let mut input = payload.into_stream();
                if ctx.debug() {
                    input = tap(input, &entry.name, "input");
                }
                // one cursor for the consumer, one echoed back to the caller
                let cache = CachedStream::new(input);
                self.spawn_consumer(
                    Arc::clone(consumer),
                    cache.stream(),
                    &entry,
                    ctx.request_id(),
                )?;
                Invocation {
                    status: InvocationStatus::Accepted,
                    body: cache.stream(),
                }
            }
            Handler::Source(_) => return Err(no_such_function(ctx)),
        };

        info!(
            request_id = %ctx.request_id(),
            function = %entry.name,
            kind = %entry.kind(),
            status = invocation.status.code(),
            setup_us = start.elapsed().as_micros() as u64,
            "Handled POST"
        );
        Ok(invocation)
    }

    /// Handle a GET: a transform with a literal argument, or a source.
    ///
    /// # Errors
    ///
    /// [`InvocationError::NoSuchFunction`] when no transform or source is
    /// attached; [`InvocationError::MissingArgument`] or
    /// [`InvocationError::Conversion`] when the literal argument is absent or
    /// does not convert.
    pub fn get(&self, ctx: &mut InvocationContext) -> Result<Invocation, InvocationError> {
        let entry = attached(ctx)?;

        let body = match &entry.handler {
            Handler::Transform(function) => {
                let literal = ctx
                    .argument()
                    .ok_or_else(|| InvocationError::MissingArgument {
                        function: entry.name.to_string(),
                    })?;
                let value = self.converter.convert(&entry, literal)?;
                debug!(
                    request_id = %ctx.request_id(),
                    function = %entry.name,
                    argument = %literal,
                    value = %value,
                    "Converted GET argument"
                );
                let mut output = stream::first(function.apply(stream::just(value)));
                ctx.record_output_single(true);
                if entry.signature.message_output {
                    output = self.unpack(&entry, output);
                }
                if ctx.debug() {
                    output = tap(output, &entry.name, "output");
                }
                output
            }
            Handler::Source(supplier) => {
                let mut output = supplier.get();
                if ctx.debug() {
                    output = tap(output, &entry.name, "output");
                }
                let single = ctx.single_requested();
                let mut output = shape(ctx, &entry.signature, single, output);
                if entry.signature.message_output {
                    output = self.unpack(&entry, output);
                }
                output
            }
            Handler::Sink(_) => return Err(no_such_function(ctx)),
        };

        info!(
            request_id = %ctx.request_id(),
            function = %entry.name,
            kind = %entry.kind(),
            output_single = ?ctx.output_single(),
            "Handled GET"
        );
        Ok(Invocation {
            status: InvocationStatus::Ok,
            body,
        })
    }

    fn unpack(&self, entry: &Arc<FunctionEntry>, output: ElementStream) -> ElementStream {
        let unpacker = Arc::clone(&self.unpacker);
        let entry = Arc::clone(entry);
        stream::map_ok(output, move |element| unpacker.unpack(&entry, element))
    }

    fn spawn_consumer(
        &self,
        consumer: Arc<dyn Consumer>,
        input: ElementStream,
        entry: &FunctionEntry,
        request_id: RequestId,
    ) -> Result<(), InvocationError> {
        let name = entry.name.to_string();
        let builder = coroutine::Builder::new()
            .name(format!("sink:{name}"))
            .stack_size(self.stack_size);

        // SAFETY: may::coroutine::Builder::spawn() is marked unsafe by the may runtime.
        // The closure owns everything it touches (Arc'd consumer, cached input) and
        // panics are caught inside, so no reference outlives the request.
        let spawned = unsafe {
            builder.spawn(move || {
                let started = Instant::now();
                let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    consumer.accept(input);
                }));
                match outcome {
                    Ok(()) => debug!(
                        request_id = %request_id,
                        function = %name,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Consumer finished"
                    ),
                    Err(panic) => error!(
                        request_id = %request_id,
                        function = %name,
                        panic_message = %panic_message(panic.as_ref()),
                        "Consumer panicked"
                    ),
                }
            })
        };

        match spawned {
            Ok(_detached) => Ok(()),
            Err(e) => {
                error!(
                    request_id = %request_id,
                    function = %entry.name,
                    stack_size = self.stack_size,
                    error = %e,
                    "Failed to spawn consumer coroutine"
                );
                Err(InvocationError::Spawn(e.to_string()))
            }
        }
    }
}

fn attached(ctx: &InvocationContext) -> Result<Arc<FunctionEntry>, InvocationError> {
    ctx.function()
        .map(Arc::clone)
        .ok_or_else(|| no_such_function(ctx))
}

fn no_such_function(ctx: &InvocationContext) -> InvocationError {
    debug!(request_id = %ctx.request_id(), path = %ctx.path(), "No function attached");
    InvocationError::NoSuchFunction {
        path: ctx.path().to_string(),
    }
}
