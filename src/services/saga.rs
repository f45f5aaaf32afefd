//! Best-effort compensation for multi-step workflows.
//!
//! Each completed step may register an undo action. On failure the actions
//! run in reverse registration order; an undo that fails is recorded as a
//! [`Diagnostic`] and never stops the remaining undos.

use futures_util::future::BoxFuture;

use crate::errors::{AppError, Diagnostic};

type Compensation = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), AppError>> + Send>;

pub struct Saga {
    name: &'static str,
    compensations: Vec<(&'static str, Compensation)>,
    diagnostics: Vec<Diagnostic>,
}

impl Saga {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            compensations: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn on_failure<F>(&mut self, step: &'static str, undo: F)
    where
        F: FnOnce() -> BoxFuture<'static, Result<(), AppError>> + Send + 'static,
    {
        self.compensations.push((step, Box::new(undo)));
    }

    /// Records a tolerated failure of a forward step.
    pub fn tolerate(&mut self, step: &'static str, err: &AppError) {
        log::warn!("{}: {} failed, continuing: {}", self.name, step, err);
        self.diagnostics.push(Diagnostic::new(step, err.to_string()));
    }

    /// Keeps every effect; returns the diagnostics gathered so far.
    pub fn complete(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Undoes registered steps newest first and wraps `cause` with everything that went wrong.
    pub async fn abort(mut self, cause: AppError) -> AppError {
        while let Some((step, undo)) = self.compensations.pop() {
            match undo().await {
                Ok(()) => log::info!("{}: compensated '{}'", self.name, step),
                Err(err) => {
                    log::warn!("{}: compensation '{}' failed: {}", self.name, step, err);
                    self.diagnostics.push(Diagnostic::new(step, err.to_string()));
                }
            }
        }
        AppError::Compensated {
            cause: Box::new(cause),
            diagnostics: self.diagnostics,
        }
    }
}
