//! Bounded capture buffers for script output.

use std::sync::{Arc, Mutex};

/// Marker appended when captured output exceeds its cap.
pub(crate) const TRUNCATION_MARKER: &str = "\n[output truncated]";

/// A bounded, shareable stdout capture buffer.
///
/// The interpreter thread appends through one clone while the dispatching
/// task keeps another, so partial output survives a timeout. Writes beyond
/// the cap are dropped and the snapshot gains a truncation marker.
#[derive(Debug, Clone)]
pub(crate) struct OutputBuffer {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    data: String,
    limit: usize,
    truncated: bool,
}

impl OutputBuffer {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { data: String::new(), limit, truncated: false })),
        }
    }

    /// Append a chunk, respecting the byte cap.
    pub(crate) fn push(&self, chunk: &str) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if inner.truncated {
            return;
        }
        let remaining = inner.limit.saturating_sub(inner.data.len());
        if chunk.len() <= remaining {
            inner.data.push_str(chunk);
        } else {
            let keep = floor_char_boundary(chunk, remaining);
            let head = &chunk[..keep];
            inner.data.push_str(head);
            inner.truncated = true;
        }
    }

    /// Current contents, with the truncation marker when the cap was hit.
    pub(crate) fn snapshot(&self) -> String {
        let Ok(inner) = self.inner.lock() else {
            return String::new();
        };
        if inner.truncated {
            let mut s = inner.data.clone();
            s.push_str(TRUNCATION_MARKER);
            s
        } else {
            inner.data.clone()
        }
    }
}

/// Truncate raw captured bytes to `limit`, marking the cut.
pub(crate) fn truncate_lossy(raw: &[u8], limit: usize) -> String {
    let mut s = String::from_utf8_lossy(raw).into_owned();
    if s.len() <= limit {
        return s;
    }
    let end = floor_char_boundary(&s, limit);
    s.truncate(end);
    s.push_str(TRUNCATION_MARKER);
    s
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
