//! Executes a resolved pass script against a graph.

use log::{debug, info};

use crate::{
    cfg::Cfg,
    pipeline::{
        config::PipelineConfig,
        pass::{BlockPass, Pass},
        registry::PassRegistry,
        script::{PassKind, Script},
    },
    Error, Result,
};

/// A script step bound to its registered pass.
#[derive(Clone, Copy)]
enum Bound<'r> {
    Graph(&'r dyn Pass),
    Block(&'r dyn BlockPass),
}

impl Bound<'_> {
    fn name(&self) -> &'static str {
        match self {
            Bound::Graph(pass) => pass.name(),
            Bound::Block(pass) => pass.name(),
        }
    }

    fn kind(&self) -> PassKind {
        match self {
            Bound::Graph(_) => PassKind::Graph,
            Bound::Block(_) => PassKind::Block,
        }
    }

    fn run(&self, cfg: &mut Cfg) -> Result<bool> {
        match self {
            Bound::Graph(pass) => pass.run(cfg),
            Bound::Block(pass) => cfg.for_each_block_mut(|block| pass.run_on_block(block)),
        }
    }
}

/// A pass script whose every step has been resolved against a registry.
///
/// Construction fails if any name is unknown, so a [`Pipeline`] that exists can only fail
/// at run time because a pass itself failed.
pub struct Pipeline<'r> {
    steps: Vec<Bound<'r>>,
    config: PipelineConfig,
}

impl<'r> Pipeline<'r> {
    /// Resolves every step of `script` in `registry`.
    ///
    /// # Arguments
    ///
    /// * `script` - The steps to run, in order.
    /// * `registry` - Where the step names are looked up.
    /// * `config` - Iteration and logging settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPass`] for the first step whose name is not registered for
    /// its kind. Nothing has run at that point.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blockscope::cfg::Cfg;
    /// use blockscope::ir::{BasicBlock, Inst};
    /// use blockscope::pipeline::{PassRegistry, Pipeline, PipelineConfig, Script};
    ///
    /// let registry = PassRegistry::with_builtins();
    /// let script = Script::parse("xform: number_postorder")?;
    /// let pipeline = Pipeline::from_script(&script, &registry, PipelineConfig::default())?;
    ///
    /// let mut cfg = Cfg::new();
    /// cfg.add_block(BasicBlock::with_items("blk1", vec![Inst::ret()]))?;
    /// assert!(pipeline.run(&mut cfg)?);
    /// assert_eq!(cfg.dfs_number("blk1"), Some(1));
    /// # Ok::<(), blockscope::Error>(())
    /// ```
    pub fn from_script(
        script: &Script,
        registry: &'r PassRegistry,
        config: PipelineConfig,
    ) -> Result<Self> {
        let mut steps = Vec::with_capacity(script.len());
        for step in script.steps() {
            let bound = match step.kind {
                PassKind::Graph => registry.get(&step.name).map(Bound::Graph),
                PassKind::Block => registry.get_block(&step.name).map(Bound::Block),
            };
            let Some(bound) = bound else {
                return Err(Error::UnknownPass(format!(
                    "{}: {} (script line {})",
                    step.kind, step.name, step.line
                )));
            };
            steps.push(bound);
        }
        debug!("Resolved {} pipeline steps", steps.len());
        Ok(Pipeline { steps, config })
    }

    /// Number of resolved steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the pipeline has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the configuration the pipeline was built with.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the steps in script order.
    ///
    /// The script is applied up to `max_iterations` times and stops early after a round
    /// without changes. Returns `true` if any step changed the graph.
    ///
    /// # Errors
    ///
    /// Returns the first error a pass reports. The run stops there and the graph keeps
    /// whatever the earlier steps did to it.
    pub fn run(&self, cfg: &mut Cfg) -> Result<bool> {
        let mut any_changed = false;

        for iteration in 0..self.config.max_iterations {
            let mut round_changed = false;

            for step in &self.steps {
                debug!("Running {}: {}", step.kind(), step.name());
                let changed = step.run(cfg)?;
                if changed && self.config.log_changes {
                    info!("{}: {} changed the graph", step.kind(), step.name());
                } else {
                    debug!("{}: {} changed={changed}", step.kind(), step.name());
                }
                round_changed |= changed;
            }

            any_changed |= round_changed;
            if !round_changed {
                debug!("Pipeline stable after {} rounds", iteration + 1);
                break;
            }
        }

        Ok(any_changed)
    }
}

impl std::fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let steps: Vec<String> = self
            .steps
            .iter()
            .map(|s| format!("{}: {}", s.kind(), s.name()))
            .collect();
        f.debug_struct("Pipeline")
            .field("steps", &steps)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        ir::{BasicBlock, Expr, Inst},
        test::{add_imm, diamond_cfg},
    };

    struct RecordingPass {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Pass for RecordingPass {
        fn name(&self) -> &'static str {
            self.name
        }

        fn run(&self, _cfg: &mut Cfg) -> Result<bool> {
            self.log.borrow_mut().push(self.name);
            Ok(false)
        }
    }

    struct FailingPass;

    impl BlockPass for FailingPass {
        fn name(&self) -> &'static str {
            "fail_on_ret"
        }

        fn run_on_block(&self, block: &mut BasicBlock) -> Result<bool> {
            if block.last() == Some(&Inst::ret()) {
                return Err(malformed_error!("block {} returns", block.addr));
            }
            block.push(Inst::lit("visited"));
            Ok(true)
        }
    }

    // Helper function to create a registry with the builtins and `fail_on_ret`
    fn registry() -> PassRegistry {
        let mut registry = PassRegistry::with_builtins();
        registry.register_block(FailingPass);
        registry
    }

    #[test]
    fn test_steps_run_in_script_order() {
        let registry = PassRegistry::with_builtins();
        let script =
            Script::parse("xform_bblock: remove_trailing_jumps\nxform: number_postorder").unwrap();
        let pipeline =
            Pipeline::from_script(&script, &registry, PipelineConfig::default()).unwrap();
        assert_eq!(pipeline.len(), 2);

        let mut cfg = diamond_cfg();
        assert!(pipeline.run(&mut cfg).unwrap());
        assert_eq!(cfg.block("then").unwrap().items, vec![add_imm("r0", 1)]);
        assert_eq!(cfg.dfs_number("entry"), Some(4));
    }

    #[test]
    fn test_unknown_pass_rejected_before_running() {
        let registry = PassRegistry::with_builtins();
        let script = Script::parse("xform: number_postorder\nxform: nope").unwrap();
        match Pipeline::from_script(&script, &registry, PipelineConfig::default()) {
            Err(Error::UnknownPass(msg)) => assert!(msg.contains("nope")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_kind_mismatch_is_unknown() {
        let registry = PassRegistry::with_builtins();
        let script = Script::parse("xform: remove_dead").unwrap();
        assert!(matches!(
            Pipeline::from_script(&script, &registry, PipelineConfig::default()),
            Err(Error::UnknownPass(_))
        ));
    }

    #[test]
    fn test_first_error_aborts() {
        let registry = registry();
        let script =
            Script::parse("xform_bblock: fail_on_ret\nxform: number_postorder").unwrap();
        let pipeline =
            Pipeline::from_script(&script, &registry, PipelineConfig::default()).unwrap();

        let mut cfg = diamond_cfg();
        assert!(matches!(pipeline.run(&mut cfg), Err(Error::Malformed { .. })));
        // "else" and "entry" precede "exit" in natural order and were already visited
        assert_eq!(cfg.block("else").unwrap().last(), Some(&Inst::lit("visited")));
        assert_eq!(cfg.block("then").unwrap().last(), Some(&Inst::goto(Expr::addr("exit"))));
        assert_eq!(cfg.dfs_number("entry"), None);
    }

    #[test]
    fn test_stable_round_stops_iteration() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = PassRegistry::new();
        for name in ["a", "b"] {
            registry.register(RecordingPass {
                name,
                log: Rc::clone(&log),
            });
        }
        let script = Script::parse("xform: b\nxform: a\nxform: b").unwrap();
        let config = PipelineConfig::default().with_max_iterations(10);
        let pipeline = Pipeline::from_script(&script, &registry, config).unwrap();

        let mut cfg = diamond_cfg();
        assert!(!pipeline.run(&mut cfg).unwrap());
        assert_eq!(*log.borrow(), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_repeated_rounds_until_stable() {
        let registry = PassRegistry::with_builtins();
        let script = Script::parse("xform_bblock: remove_trailing_jumps").unwrap();
        let config = PipelineConfig::default().with_max_iterations(3);
        let pipeline = Pipeline::from_script(&script, &registry, config).unwrap();

        let mut cfg = diamond_cfg();
        cfg.block_mut("then")
            .unwrap()
            .push(Inst::goto(Expr::addr("exit")));
        assert!(pipeline.run(&mut cfg).unwrap());
        // two trailing gotos need two rounds
        assert_eq!(cfg.block("then").unwrap().items, vec![add_imm("r0", 1)]);
    }

    #[test]
    fn test_zero_iterations_runs_nothing() {
        let registry = PassRegistry::with_builtins();
        let script = Script::parse("xform: number_postorder").unwrap();
        let config = PipelineConfig::default().with_max_iterations(0);
        let pipeline = Pipeline::from_script(&script, &registry, config).unwrap();
        let mut cfg = diamond_cfg();
        assert!(!pipeline.run(&mut cfg).unwrap());
        assert_eq!(cfg.dfs_number("entry"), None);
    }
}
