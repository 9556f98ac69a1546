use super::ElementStream;
use tracing::{debug, warn};

/// Diagnostic observation point.
///
/// Logs every element as it is pulled through, tagged with `function` and
/// `stage` (e.g. `input`, `output`). Values and ordering are untouched and
/// nothing is buffered.
#[must_use]
pub fn tap(stream: ElementStream, function: &str, stage: &'static str) -> ElementStream {
    let function = function.to_owned();
    let mut index: usize = 0;
    Box::new(stream.inspect(move |el| {
        match el {
            Ok(value) => debug!(
                target: "brrtfn::tap",
                function = %function,
                stage = stage,
                index = index,
                value = %value,
                "onNext"
            ),
            Err(err) => warn!(
                target: "brrtfn::tap",
                function = %function,
                stage = stage,
                index = index,
                error = %err,
                "onError"
            ),
        }
        index += 1;
    }))
}
