use super::{ExecutionContext, FunctionFrame};
use scopechain_api::Key;
use std::path::{Path, PathBuf};

/// A template (or script file) currently executing in a context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplatePath {
    path: PathBuf,
}

impl TemplatePath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Pops its template, and anything still pushed above it, when dropped,
/// including during unwinding.
#[must_use = "the template is popped as soon as the guard is dropped"]
pub struct TemplateGuard<'a> {
    context: &'a ExecutionContext,
    depth: usize,
}

impl Drop for TemplateGuard<'_> {
    fn drop(&mut self) {
        let mut templates = self.context.templates.lock();
        if templates.len() != self.depth {
            tracing::warn!(
                "Template stack at {} entries, guard expected {}",
                templates.len(),
                self.depth
            );
        }
        // Our entry is already gone; anything below it belongs to outer guards.
        if templates.len() < self.depth {
            return;
        }
        if let Some(left) = templates.get(self.depth - 1) {
            tracing::trace!("Left template {}", left.path.display());
        }
        templates.truncate(self.depth - 1);
    }
}

impl ExecutionContext {
    /// Push `template` for the lifetime of the returned guard.
    pub fn push_template(&self, template: TemplatePath) -> TemplateGuard<'_> {
        tracing::trace!("Entering template {}", template.path.display());
        let mut templates = self.templates.lock();
        templates.push(template);
        TemplateGuard {
            context: self,
            depth: templates.len(),
        }
    }

    /// Run `body` with `template` pushed.
    pub fn with_template<R>(&self, template: TemplatePath, body: impl FnOnce() -> R) -> R {
        let _guard = self.push_template(template);
        body()
    }

    /// Pop this context's innermost template without a guard.
    pub fn pop_template(&self) -> Option<TemplatePath> {
        self.templates.lock().pop()
    }

    pub fn has_templates(&self) -> bool {
        !self.templates.lock().is_empty()
    }

    /// This context's own templates, innermost first.
    pub fn templates(&self) -> Vec<TemplatePath> {
        self.templates.lock().iter().rev().cloned().collect()
    }

    /// Innermost template running anywhere up the chain.
    pub fn find_closest_template(&self) -> Option<TemplatePath> {
        let mut current = Some(self);
        while let Some(context) = current {
            if let Some(template) = context.templates.lock().last() {
                return Some(template.clone());
            }
            current = context.parent.as_deref();
        }
        None
    }

    /// Outermost template in the chain: the one the run started from.
    pub fn find_base_template(&self) -> Option<TemplatePath> {
        if let Some(template) = self
            .parent
            .as_ref()
            .and_then(|parent| parent.find_base_template())
        {
            return Some(template);
        }
        self.templates.lock().first().cloned()
    }

    /// Nearest function or closure invocation, this context included.
    pub fn find_closest_function(&self) -> Option<&FunctionFrame> {
        let mut current = Some(self);
        while let Some(context) = current {
            if let Some(frame) = context.frame() {
                return Some(frame);
            }
            current = context.parent.as_deref();
        }
        None
    }

    pub fn find_closest_function_name(&self) -> Option<Key> {
        self.find_closest_function().map(FunctionFrame::called_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Function;
    use crate::scopes::Arguments;

    #[test]
    fn test_guard_pops_on_drop() {
        let context = ExecutionContext::template(None);
        {
            let _guard = context.push_template(TemplatePath::new("/app/index.bxs"));
            assert!(context.has_templates());
            assert_eq!(
                context.find_closest_template().unwrap().file_name(),
                Some("index.bxs")
            );
        }
        assert!(!context.has_templates());
        assert_eq!(context.find_closest_template(), None);
    }

    #[test]
    fn test_guard_pops_during_unwind() {
        let context = ExecutionContext::template(None);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: () = context.with_template(TemplatePath::new("/app/fails.bxs"), || {
                panic!("template failed");
            });
        }));
        assert!(result.is_err());
        assert!(!context.has_templates());
    }

    #[test]
    fn test_guard_after_manual_pop_keeps_outer_template() {
        let context = ExecutionContext::template(None);
        let outer = context.push_template(TemplatePath::new("/app/outer.bxs"));
        let inner = context.push_template(TemplatePath::new("/app/inner.bxs"));

        assert_eq!(
            context.pop_template(),
            Some(TemplatePath::new("/app/inner.bxs"))
        );
        drop(inner);
        assert_eq!(
            context.find_closest_template(),
            Some(TemplatePath::new("/app/outer.bxs"))
        );

        drop(outer);
        assert!(!context.has_templates());
    }

    #[test]
    fn test_guard_drops_entries_pushed_above_it() {
        let context = ExecutionContext::template(None);
        let outer = context.push_template(TemplatePath::new("/app/outer.bxs"));
        std::mem::forget(context.push_template(TemplatePath::new("/app/leaked.bxs")));

        drop(outer);
        assert!(!context.has_templates());
    }

    #[test]
    fn test_closest_and_base_template() {
        let template = ExecutionContext::template(None);
        let _base = template.push_template(TemplatePath::new("/app/index.bxs"));
        let _include = template.push_template(TemplatePath::new("/app/header.bxs"));

        let function = Function::udf(Key::of("render"), vec![]);
        let call = ExecutionContext::function_call(&template, &function, Arguments::none()).unwrap();
        assert_eq!(
            call.find_closest_template(),
            Some(TemplatePath::new("/app/header.bxs"))
        );
        assert_eq!(
            call.find_base_template(),
            Some(TemplatePath::new("/app/index.bxs"))
        );

        let _body = call.push_template(TemplatePath::new("/app/render.bxs"));
        assert_eq!(
            call.find_closest_template(),
            Some(TemplatePath::new("/app/render.bxs"))
        );
        assert_eq!(
            template.templates(),
            vec![
                TemplatePath::new("/app/header.bxs"),
                TemplatePath::new("/app/index.bxs"),
            ]
        );
    }

    #[test]
    fn test_closest_function_name_uses_called_name() {
        let template = ExecutionContext::template(None);
        assert!(template.find_closest_function().is_none());

        let function = Function::udf(Key::of("render"), vec![]);
        let call = ExecutionContext::function_call_as(
            &template,
            &function,
            Key::of("draw"),
            Arguments::none(),
        )
        .unwrap();
        let nested = ExecutionContext::scripting(Some(&call));

        assert_eq!(nested.find_closest_function_name(), Some(Key::of("draw")));
        let frame = nested.find_closest_function().unwrap();
        assert_eq!(frame.function().name(), Key::of("render"));
    }
}
