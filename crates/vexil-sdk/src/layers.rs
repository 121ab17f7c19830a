//! Evaluation layers wrapping every flag state query
//!
//! Layers are composed around the engine's state lookup, outermost first.
//! Each one receives the flag name, the context and a [`Next`] to continue
//! the chain; it may inspect or replace the result.

use std::sync::{Arc, Mutex, PoisonError};
use vexil_core::EvaluationContext;

use crate::error::Result;

/// Middleware around a single flag state query
pub trait EvaluationLayer: Send + Sync {
    fn evaluate(&self, flag_name: &str, ctx: &EvaluationContext, next: Next<'_>) -> Result<Option<bool>>;
}

/// The remainder of a layer chain
pub struct Next<'a> {
    flag_name: &'a str,
    ctx: &'a EvaluationContext,
    layers: &'a [Arc<dyn EvaluationLayer>],
    inner: &'a dyn Fn() -> Result<Option<bool>>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        flag_name: &'a str,
        ctx: &'a EvaluationContext,
        layers: &'a [Arc<dyn EvaluationLayer>],
        inner: &'a dyn Fn() -> Result<Option<bool>>,
    ) -> Self {
        Self {
            flag_name,
            ctx,
            layers,
            inner,
        }
    }

    /// Run the remaining layers and the state lookup itself
    pub fn run(self) -> Result<Option<bool>> {
        match self.layers.split_first() {
            Some((layer, rest)) => layer.evaluate(
                self.flag_name,
                self.ctx,
                Next::new(self.flag_name, self.ctx, rest, self.inner),
            ),
            None => (self.inner)(),
        }
    }
}

/// One recorded flag check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagCheck {
    pub flag: String,
    pub state: Option<bool>,
}

/// Records every successful flag check, for debugging panels
#[derive(Debug, Default)]
pub struct FlagCheckRecorder {
    checks: Mutex<Vec<FlagCheck>>,
}

impl FlagCheckRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks recorded so far, in order
    pub fn checks(&self) -> Vec<FlagCheck> {
        self.checks.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        self.checks.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl EvaluationLayer for FlagCheckRecorder {
    fn evaluate(&self, flag_name: &str, _: &EvaluationContext, next: Next<'_>) -> Result<Option<bool>> {
        let state = next.run()?;
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FlagCheck {
                flag: flag_name.to_string(),
                state,
            });
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ForceOn;

    impl EvaluationLayer for ForceOn {
        fn evaluate(&self, _: &str, _: &EvaluationContext, _: Next<'_>) -> Result<Option<bool>> {
            Ok(Some(true))
        }
    }

    fn run(layers: &[Arc<dyn EvaluationLayer>], state: Option<bool>) -> Result<Option<bool>> {
        let ctx = EvaluationContext::new();
        let inner = move || -> Result<Option<bool>> { Ok(state) };
        Next::new("F", &ctx, layers, &inner).run()
    }

    #[test]
    fn test_no_layers_runs_inner() {
        assert_eq!(run(&[], Some(false)).unwrap(), Some(false));
    }

    #[test]
    fn test_recorder_records_in_order() {
        let recorder = Arc::new(FlagCheckRecorder::new());
        let layers: Vec<Arc<dyn EvaluationLayer>> = vec![recorder.clone()];
        run(&layers, Some(true)).unwrap();
        run(&layers, None).unwrap();

        assert_eq!(
            recorder.checks(),
            vec![
                FlagCheck { flag: "F".to_string(), state: Some(true) },
                FlagCheck { flag: "F".to_string(), state: None },
            ]
        );
        recorder.clear();
        assert!(recorder.checks().is_empty());
    }

    #[test]
    fn test_outer_layer_sees_inner_override() {
        let recorder = Arc::new(FlagCheckRecorder::new());
        let layers: Vec<Arc<dyn EvaluationLayer>> = vec![recorder.clone(), Arc::new(ForceOn)];
        assert_eq!(run(&layers, Some(false)).unwrap(), Some(true));
        assert_eq!(recorder.checks()[0].state, Some(true));
    }
}
