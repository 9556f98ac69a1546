use super::{Element, ElementStream};
use may::sync::Mutex;
use std::sync::Arc;

struct CacheState {
    upstream: Mutex<Option<ElementStream>>,
    buffer: Mutex<Vec<Element>>,
}

/// Replayable view over a cold element stream.
///
/// The upstream is pulled at most once per element; every element pulled is
/// appended to a shared buffer. Each [`Replay`] created from the cache walks
/// the buffer from the start and, once it reaches the end, pulls the next
/// element from upstream on behalf of all cursors. Two replays therefore see
/// the same elements, exactly once each, in upstream order, regardless of
/// which one runs ahead.
///
/// The buffer lock is never held across an upstream pull: a cursor that is
/// behind reads buffered elements while another cursor waits on a slow
/// producer. Locks are always taken upstream first, then buffer.
#[derive(Clone)]
pub struct CachedStream {
    shared: Arc<CacheState>,
}

impl CachedStream {
    pub fn new(upstream: ElementStream) -> Self {
        Self {
            shared: Arc::new(CacheState {
                upstream: Mutex::new(Some(upstream)),
                buffer: Mutex::new(Vec::new()),
            }),
        }
    }

    /// New cursor starting at the first element.
    #[must_use]
    pub fn replay(&self) -> Replay {
        Replay {
            shared: Arc::clone(&self.shared),
            cursor: 0,
        }
    }

    /// Replay boxed as an [`ElementStream`].
    #[must_use]
    pub fn stream(&self) -> ElementStream {
        Box::new(self.replay())
    }

    /// Number of elements pulled from upstream so far.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.shared.buffered_len()
    }
}

impl CacheState {
    fn buffered(&self, cursor: usize) -> Option<Element> {
        let buffer = self.buffer.lock().unwrap_or_else(|p| p.into_inner());
        buffer.get(cursor).cloned()
    }

    fn buffered_len(&self) -> usize {
        let buffer = self.buffer.lock().unwrap_or_else(|p| p.into_inner());
        buffer.len()
    }
}

/// Cursor over a [`CachedStream`].
pub struct Replay {
    shared: Arc<CacheState>,
    cursor: usize,
}

impl Replay {
    fn advance(&mut self, el: Element) -> Option<Element> {
        self.cursor += 1;
        Some(el)
    }
}

impl Iterator for Replay {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        if let Some(el) = self.shared.buffered(self.cursor) {
            return self.advance(el);
        }

        let mut upstream = self
            .shared
            .upstream
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        // another cursor may have pulled while this one waited
        if let Some(el) = self.shared.buffered(self.cursor) {
            return self.advance(el);
        }
        match upstream.as_mut().and_then(Iterator::next) {
            Some(el) => {
                let mut buffer = self.shared.buffer.lock().unwrap_or_else(|p| p.into_inner());
                buffer.push(el.clone());
                drop(buffer);
                self.advance(el)
            }
            None => {
                // upstream exhausted; release the producer
                *upstream = None;
                None
            }
        }
    }
}
