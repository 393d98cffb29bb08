use scopechain_api::{Key, Value};
use scopechain_core::{Arguments, ExecutionContext, Function, Param, ResolverConfig};
use std::sync::Arc;

/// Runtime root with a template beneath it.
#[allow(dead_code)]
pub fn setup_template() -> (Arc<ExecutionContext>, Arc<ExecutionContext>) {
    setup_template_with(ResolverConfig::default())
}

#[allow(dead_code)]
pub fn setup_template_with(
    config: ResolverConfig,
) -> (Arc<ExecutionContext>, Arc<ExecutionContext>) {
    let runtime = ExecutionContext::runtime(config);
    let template = ExecutionContext::template(Some(&runtime));
    (runtime, template)
}

/// Invoke a parameterless function named `name` under `parent`.
#[allow(dead_code)]
pub fn call(parent: &Arc<ExecutionContext>, name: &str) -> Arc<ExecutionContext> {
    let function = Function::udf(Key::of(name), vec![]);
    ExecutionContext::function_call(parent, &function, Arguments::none())
        .expect("parameterless call binds")
}

#[allow(dead_code)]
pub fn call_with(
    parent: &Arc<ExecutionContext>,
    name: &str,
    params: &[&str],
    values: Vec<Value>,
) -> Arc<ExecutionContext> {
    let params = params.iter().map(|p| Param::optional(Key::of(p))).collect();
    let function = Function::udf(Key::of(name), params);
    ExecutionContext::function_call(parent, &function, Arguments::Positional(values))
        .expect("positional call binds")
}

/// Invoke `closure` under `caller`.
#[allow(dead_code)]
pub fn invoke(caller: &Arc<ExecutionContext>, closure: &Arc<Function>) -> Arc<ExecutionContext> {
    ExecutionContext::function_call(caller, closure, Arguments::none())
        .expect("closure call binds")
}

#[allow(dead_code)]
pub fn read(context: &ExecutionContext, name: &str) -> Option<Value> {
    context
        .resolve_nearby(&Key::of(name), None)
        .ok()
        .and_then(|hit| hit.value)
}
