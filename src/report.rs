//! Progress side channel.
//!
//! Reporters only observe; summarization results never depend on them.

/// Listener notified while input is scanned and while the tree is summarized.
pub trait Reporter {
    /// One object was scanned. `from` is the offset scanning resumed at,
    /// `to` the offset just past the object, `total` the buffer length.
    fn object_read(&mut self, from: usize, to: usize, total: usize) {
        let _ = (from, to, total);
    }

    /// `done` of `total` tree nodes have been summarized.
    fn nodes_summarized(&mut self, done: usize, total: usize) {
        let _ = (done, total);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {}

/// Logs at `info` each time scanning crosses a percent boundary of the
/// input, and each time summarization crosses a tenth of the tree.
#[derive(Clone, Debug, Default)]
pub struct LogReporter {
    last_decile: Option<usize>,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for LogReporter {
    fn object_read(&mut self, from: usize, to: usize, total: usize) {
        if rides_over_boundary(from, to, total) {
            let percent = 100 * to / total;
            log::info!("{percent} percent done ({to}/{total})");
        }
    }

    fn nodes_summarized(&mut self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let decile = 10 * done / total;
        if self.last_decile.is_none_or(|last| decile > last) {
            self.last_decile = Some(decile);
            log::info!("summarized {done}/{total} nodes");
        }
    }
}

/// True when `[from, to)` crosses a multiple of one percent of `total`.
fn rides_over_boundary(from: usize, to: usize, total: usize) -> bool {
    if total == 0 {
        return false;
    }
    let boundary = (total / 100).max(1);
    from / boundary != to / boundary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_crossing() {
        assert!(!rides_over_boundary(0, 5, 1000));
        assert!(rides_over_boundary(5, 12, 1000));
        assert!(rides_over_boundary(0, 1, 10));
        assert!(!rides_over_boundary(0, 0, 0));
    }

    #[test]
    fn node_progress_is_throttled() {
        let mut rep = LogReporter::new();
        rep.nodes_summarized(1, 100);
        assert_eq!(rep.last_decile, Some(0));
        rep.nodes_summarized(5, 100);
        assert_eq!(rep.last_decile, Some(0));
        rep.nodes_summarized(31, 100);
        assert_eq!(rep.last_decile, Some(3));
        rep.nodes_summarized(100, 100);
        assert_eq!(rep.last_decile, Some(10));
    }
}
