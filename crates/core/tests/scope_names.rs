mod common;

use common::{call, invoke, setup_template};
use scopechain_api::{ApiError, Key, Scope, ScopeRef, Value, keys, same_scope};
use scopechain_core::ExecutionContext;

#[test]
fn test_arguments_scope_is_nearby_only() {
    let (_runtime, template) = setup_template();
    let function = call(&template, "f");

    let scope = function.get_scope_nearby(&keys::ARGUMENTS).unwrap();
    let arguments: ScopeRef = function.frame().unwrap().arguments_scope().clone();
    assert!(same_scope(&scope, &arguments));

    let err = template.get_scope(&keys::ARGUMENTS).unwrap_err();
    assert_eq!(err, ApiError::ScopeNotFound("arguments".to_string()));
    // Encapsulation applies to scope names too.
    assert!(function.get_scope(&keys::ARGUMENTS).is_err());
    assert!(function.get_scope(&keys::LOCAL).is_err());
}

#[test]
fn test_scope_lookup_does_not_need_data() {
    let (runtime, template) = setup_template();
    let function = call(&template, "f");

    for context in [&template, &function] {
        let server = context.get_scope(&keys::SERVER).unwrap();
        assert!(server.is_empty());
        assert!(same_scope(&server, &runtime.default_assignment_scope()));
        let variables = context.get_scope(&keys::VARIABLES).unwrap();
        assert!(same_scope(&variables, &template.default_assignment_scope()));
    }
    assert!(function.get_scope_nearby(&Key::of("Local")).is_ok());
}

#[test]
fn test_unknown_scope_name_fails_at_root() {
    let (_runtime, template) = setup_template();
    let function = call(&template, "f");
    let err = function.get_scope_nearby(&Key::of("session")).unwrap_err();
    assert!(err.to_string().contains("[session]"));
    assert!(!function.is_key_visible_scope(&Key::of("session")));
}

#[test]
fn test_scripting_variables_not_a_global_scope() {
    let runtime = ExecutionContext::runtime(Default::default());
    let script = ExecutionContext::scripting(Some(&runtime));
    assert!(script.get_scope_nearby(&keys::VARIABLES).is_ok());
    assert!(script.get_scope(&keys::VARIABLES).is_err());
    assert!(call(&script, "f").get_scope(&keys::VARIABLES).is_err());
}

#[test]
fn test_closure_sees_declaring_scopes_by_name() {
    let (runtime, template) = setup_template();
    let closure = template.define_closure(Key::of("cb"), vec![]);
    let caller = ExecutionContext::scripting(Some(&runtime));
    let context = invoke(&caller, &closure);

    let variables = context.get_scope_nearby(&keys::VARIABLES).unwrap();
    assert!(same_scope(&variables, &template.default_assignment_scope()));
    assert!(context.get_scope(&keys::VARIABLES).is_err());

    let hit = context.resolve_nearby(&keys::VARIABLES, None).unwrap();
    assert!(hit.is_scope);
    assert_eq!(
        hit.value().and_then(Value::as_scope).map(|s| s.name()),
        Some(*keys::VARIABLES)
    );
}
