use scopechain_api::ScopeRef;
use scopechain_core::{ExecutionContext, ResolverConfig};
use std::path::Path;
use std::sync::Arc;

/// Process-level entry point: owns the runtime root context and hands out
/// template and scripting contexts beneath it.
pub struct ScopeRuntime {
    root: Arc<ExecutionContext>,
}

impl ScopeRuntime {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            root: ExecutionContext::runtime(config),
        }
    }

    /// Bootstraps a runtime from a JSON config file.
    pub fn from_path(path: &Path) -> scopechain_core::Result<Self> {
        let config = ResolverConfig::load(path)?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ResolverConfig {
        self.root.settings()
    }

    pub fn root(&self) -> &Arc<ExecutionContext> {
        &self.root
    }

    pub fn server_scope(&self) -> ScopeRef {
        self.root.default_assignment_scope()
    }

    /// Context for one template run.
    pub fn new_template(&self) -> Arc<ExecutionContext> {
        ExecutionContext::template(Some(&self.root))
    }

    pub fn new_scripting(&self) -> Arc<ExecutionContext> {
        ExecutionContext::scripting(Some(&self.root))
    }

    /// Run `body` in a fresh template context and release its scopes when
    /// `body` returns, so closures it stored there do not keep the run alive.
    pub fn run_template<R>(&self, body: impl FnOnce(&Arc<ExecutionContext>) -> R) -> R {
        let template = self.new_template();
        let result = body(&template);
        template.release_scopes();
        result
    }

    /// Log files go to the config's `log_dir` under `component`. Keep the
    /// returned guard alive for as long as logs should be flushed.
    pub fn init_logging(&self, component: &str) -> impl Drop {
        scopechain_core::logging::init_logging(component, self.config())
    }
}

impl Default for ScopeRuntime {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}
