//! Rhai engine with every helper registered
//!
//! Provides the execution environment for utility scripts.

mod bindings;
pub mod convert;

pub use bindings::register_all;

use crate::config::Settings;
use anyhow::{Context, Result};
use rhai::{Dynamic, Engine, Scope};
use std::path::Path;
use std::sync::Arc;

/// Script engine preloaded with the helper functions
pub struct UtilEngine {
    engine: Engine,
    settings: Arc<Settings>,
}

impl UtilEngine {
    pub fn new(settings: Settings) -> Self {
        let settings = Arc::new(settings);
        let mut engine = Engine::new();
        register_all(&mut engine, &settings);
        Self { engine, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    fn scope(&self) -> Scope<'static> {
        let mut scope = Scope::new();
        scope.push_constant("DIR_SEP", self.settings.path_separator.to_string());
        scope.push_constant("MAX_DEPTH", self.settings.max_depth as i64);
        scope
    }

    /// Compile and run a script file, returning its final value.
    pub fn run(&self, script_path: &Path) -> Result<Dynamic> {
        let script = std::fs::read_to_string(script_path)
            .with_context(|| format!("Failed to read script: {}", script_path.display()))?;
        let ast = self
            .engine
            .compile(&script)
            .map_err(|e| anyhow::anyhow!("Failed to compile {}: {}", script_path.display(), e))?;
        self.engine
            .eval_ast_with_scope::<Dynamic>(&mut self.scope(), &ast)
            .map_err(|e| anyhow::anyhow!("{} failed: {}", script_path.display(), e))
    }

    /// Evaluate inline source.
    pub fn eval(&self, source: &str) -> Result<Dynamic> {
        self.engine
            .eval_with_scope::<Dynamic>(&mut self.scope(), source)
            .map_err(|e| anyhow::anyhow!("Script failed: {}", e))
    }
}

impl Default for UtilEngine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
