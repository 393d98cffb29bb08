//! Execution contexts: the chain every identifier lookup walks.
//!
//! Each node owns a fixed set of scopes determined by its variant and holds
//! a reference to its parent. The topology never changes after
//! construction; only the template stack is mutable.

mod resolve;
mod stack;

pub use resolve::VisibleScopes;
pub use stack::{TemplateGuard, TemplatePath};

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::function::{Function, Param};
use crate::scopes::{Arguments, ArgumentsScope, BaseScope};
use parking_lot::Mutex;
use scopechain_api::{Key, Scope, ScopeRef};
use std::fmt;
use std::sync::Arc;

/// Scopes owned by one function or closure invocation.
pub struct FunctionFrame {
    function: Arc<Function>,
    called_name: Key,
    arguments: Arc<ArgumentsScope>,
    /// `local` then `arguments`, in search order.
    scopes: [ScopeRef; 2],
}

impl FunctionFrame {
    fn new(function: Arc<Function>, called_name: Key, arguments: ArgumentsScope) -> Self {
        let arguments = Arc::new(arguments);
        let local: ScopeRef = BaseScope::local().shared();
        let scopes = [local, arguments.clone() as ScopeRef];
        Self {
            function,
            called_name,
            arguments,
            scopes,
        }
    }

    pub fn function(&self) -> &Arc<Function> {
        &self.function
    }

    /// Name the function was invoked under, which may differ from its
    /// declared name.
    pub fn called_name(&self) -> Key {
        self.called_name
    }

    pub fn local_scope(&self) -> &ScopeRef {
        &self.scopes[0]
    }

    pub fn arguments_scope(&self) -> &Arc<ArgumentsScope> {
        &self.arguments
    }

    fn scopes(&self) -> &[ScopeRef] {
        &self.scopes
    }
}

pub enum ContextKind {
    /// Process root. Its `server` scope is the outermost global tier.
    Runtime { server: ScopeRef },
    /// Entry point of a template or script run.
    Template { variables: ScopeRef },
    /// Script top level nested under a wider runtime; its `variables` are
    /// never visible to global lookups.
    Scripting { variables: ScopeRef },
    Function(FunctionFrame),
    Closure(FunctionFrame),
}

pub struct ExecutionContext {
    parent: Option<Arc<ExecutionContext>>,
    kind: ContextKind,
    templates: Mutex<Vec<TemplatePath>>,
    settings: Arc<ResolverConfig>,
}

impl ExecutionContext {
    fn build(parent: Option<&Arc<ExecutionContext>>, kind: ContextKind) -> Arc<Self> {
        let settings = parent
            .map(|p| p.settings.clone())
            .unwrap_or_else(|| Arc::new(ResolverConfig::default()));
        let context = Self {
            parent: parent.cloned(),
            kind,
            templates: Mutex::new(Vec::new()),
            settings,
        };
        tracing::trace!(
            "Created {} context at depth {}",
            context.kind_name(),
            context.depth()
        );
        Arc::new(context)
    }

    pub fn runtime(config: ResolverConfig) -> Arc<Self> {
        Self::runtime_with_server(config, BaseScope::server().shared())
    }

    pub fn runtime_with_server(config: ResolverConfig, server: ScopeRef) -> Arc<Self> {
        tracing::debug!(
            "Creating runtime context (null_is_undefined={})",
            config.null_is_undefined
        );
        Arc::new(Self {
            parent: None,
            kind: ContextKind::Runtime { server },
            templates: Mutex::new(Vec::new()),
            settings: Arc::new(config),
        })
    }

    pub fn template(parent: Option<&Arc<ExecutionContext>>) -> Arc<Self> {
        Self::template_with_variables(parent, BaseScope::variables().shared())
    }

    /// Template run over an existing, possibly shared, `variables` scope.
    pub fn template_with_variables(
        parent: Option<&Arc<ExecutionContext>>,
        variables: ScopeRef,
    ) -> Arc<Self> {
        Self::build(parent, ContextKind::Template { variables })
    }

    pub fn scripting(parent: Option<&Arc<ExecutionContext>>) -> Arc<Self> {
        Self::build(
            parent,
            ContextKind::Scripting {
                variables: BaseScope::variables().shared(),
            },
        )
    }

    /// Context for one call of `function`, bound from `arguments`.
    ///
    /// A closure value always produces a closure context; the call site
    /// cannot change that. The parent is the calling context and must exist.
    pub fn function_call(
        parent: &Arc<ExecutionContext>,
        function: &Arc<Function>,
        arguments: Arguments,
    ) -> Result<Arc<Self>> {
        Self::function_call_as(parent, function, function.name(), arguments)
    }

    pub fn function_call_as(
        parent: &Arc<ExecutionContext>,
        function: &Arc<Function>,
        called_name: Key,
        arguments: Arguments,
    ) -> Result<Arc<Self>> {
        let arguments = ArgumentsScope::bind(function, arguments)?;
        Ok(Self::with_arguments(parent, function, called_name, arguments))
    }

    /// Like [`ExecutionContext::function_call_as`] with an already-built
    /// arguments scope.
    pub fn with_arguments(
        parent: &Arc<ExecutionContext>,
        function: &Arc<Function>,
        called_name: Key,
        arguments: ArgumentsScope,
    ) -> Arc<Self> {
        let frame = FunctionFrame::new(function.clone(), called_name, arguments);
        let kind = if function.is_closure() {
            ContextKind::Closure(frame)
        } else {
            ContextKind::Function(frame)
        };
        Self::build(Some(parent), kind)
    }

    /// Create a closure whose declaring context is `self`.
    pub fn define_closure(self: &Arc<Self>, name: Key, params: Vec<Param>) -> Arc<Function> {
        Function::closure(name, params, self)
    }

    pub fn parent(&self) -> Option<&Arc<ExecutionContext>> {
        self.parent.as_ref()
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn kind(&self) -> &ContextKind {
        &self.kind
    }

    pub fn settings(&self) -> &ResolverConfig {
        &self.settings
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ContextKind::Runtime { .. } => "runtime",
            ContextKind::Template { .. } => "template",
            ContextKind::Scripting { .. } => "scripting",
            ContextKind::Function(_) => "function",
            ContextKind::Closure(_) => "closure",
        }
    }

    /// Number of ancestors above this context.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent.as_deref();
        while let Some(context) = current {
            depth += 1;
            current = context.parent.as_deref();
        }
        depth
    }

    pub fn frame(&self) -> Option<&FunctionFrame> {
        match &self.kind {
            ContextKind::Function(frame) | ContextKind::Closure(frame) => Some(frame),
            _ => None,
        }
    }

    /// Scope that receives unscoped assignments of new names.
    pub fn default_assignment_scope(&self) -> ScopeRef {
        match &self.kind {
            ContextKind::Runtime { server } => server.clone(),
            ContextKind::Template { variables } | ContextKind::Scripting { variables } => {
                variables.clone()
            }
            ContextKind::Function(frame) | ContextKind::Closure(frame) => {
                frame.local_scope().clone()
            }
        }
    }

    /// Clear every scope this context owns.
    ///
    /// Call when a run or call ends to break cycles formed by closures stored
    /// in those scopes. A template built over a shared `variables` scope
    /// clears that shared scope too.
    pub fn release_scopes(&self) {
        for scope in self.nearby_scopes() {
            scope.clear();
        }
        tracing::trace!("Released scopes of {} context", self.kind_name());
    }

    /// Scopes this context owns, in nearby search order.
    fn nearby_scopes(&self) -> &[ScopeRef] {
        match &self.kind {
            ContextKind::Runtime { server } => std::slice::from_ref(server),
            ContextKind::Template { variables } | ContextKind::Scripting { variables } => {
                std::slice::from_ref(variables)
            }
            ContextKind::Function(frame) | ContextKind::Closure(frame) => frame.scopes(),
        }
    }

    fn declaring_context(&self) -> Option<&Arc<ExecutionContext>> {
        match &self.kind {
            ContextKind::Closure(frame) => frame.function.declaring_context(),
            _ => None,
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("ExecutionContext");
        out.field("kind", &self.kind_name())
            .field("depth", &self.depth());
        if let Some(frame) = self.frame() {
            out.field("function", &frame.called_name);
        }
        out.finish()
    }
}
