//! Progress reporting and cooperative cancellation for long builds.
//!
//! Builds call the monitor after every processed point (Vamana pass) and after
//! every finished label (stitched build). Returning [`ControlFlow::Break`]
//! aborts the build with [`VamanaError::Cancelled`](crate::VamanaError::Cancelled).

use std::ops::ControlFlow;

/// Observer of build progress.
pub trait BuildMonitor {
    /// Called after `done` of `total` points of a pass have been inserted.
    fn on_point(&self, done: usize, total: usize) -> ControlFlow<()> {
        let _ = (done, total);
        ControlFlow::Continue(())
    }

    /// Called after the sub-graph for `label` is built (`done` of `total` labels).
    fn on_label(&self, label: u32, done: usize, total: usize) -> ControlFlow<()> {
        let _ = (label, done, total);
        ControlFlow::Continue(())
    }
}

/// Monitor that never interrupts.
pub struct NoMonitor;

impl BuildMonitor for NoMonitor {}

/// Point-level monitor backed by a closure `(done, total) -> ControlFlow<()>`.
pub struct FnMonitor<F: Fn(usize, usize) -> ControlFlow<()>>(pub F);

impl<F: Fn(usize, usize) -> ControlFlow<()>> BuildMonitor for FnMonitor<F> {
    fn on_point(&self, done: usize, total: usize) -> ControlFlow<()> {
        self.0(done, total)
    }
}
