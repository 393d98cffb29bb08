use scopechain_api::{Key, Scope, Value, keys};
use scopechain_core::{Arguments, ContextError, ExecutionContext, Function, ResolverConfig};
use scopechain_runtime::ScopeRuntime;
use std::io::Write;
use std::sync::Arc;

#[test]
fn test_templates_share_server_scope() {
    let runtime = ScopeRuntime::default();
    runtime
        .server_scope()
        .assign(Key::of("appName"), Value::from("shop"));

    let first = runtime.new_template();
    let second = runtime.new_template();
    first.assign(Key::of("page"), Value::from("home")).unwrap();

    let hit = second.resolve_nearby(&Key::of("appName"), None).unwrap();
    assert_eq!(hit.value(), Some(&Value::from("shop")));
    assert_eq!(hit.scope_name(), *keys::SERVER);
    assert!(second.resolve_nearby(&Key::of("page"), None).is_err());
}

#[test]
fn test_from_path_loads_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resolver.json");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, r#"{{ "null_is_undefined": true, "log_level": "debug" }}"#).unwrap();

    let runtime = ScopeRuntime::from_path(&path).unwrap();
    assert!(runtime.config().null_is_undefined);
    assert_eq!(runtime.config().log_level, "debug");

    let script = runtime.new_scripting();
    let function = Function::udf(Key::of("f"), vec![]);
    let call = ExecutionContext::function_call(&script, &function, Arguments::none()).unwrap();
    assert!(call.settings().null_is_undefined);
}

#[test]
fn test_from_path_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let missing = ScopeRuntime::from_path(&dir.path().join("missing.json"));
    assert!(matches!(missing, Err(ContextError::Io(_))));

    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        ScopeRuntime::from_path(&path),
        Err(ContextError::Json(_))
    ));

    std::fs::write(&path, r#"{ "log_level": " " }"#).unwrap();
    assert!(matches!(
        ScopeRuntime::from_path(&path),
        Err(ContextError::Config(_))
    ));
}

#[test]
fn test_root_has_no_parent() {
    let runtime = ScopeRuntime::default();
    assert!(!runtime.root().has_parent());
    assert_eq!(runtime.root().kind_name(), "runtime");
    assert!(runtime.new_template().has_parent());
}

#[test]
fn test_init_logging_writes_to_configured_dir() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = ScopeRuntime::new(ResolverConfig {
        log_dir: Some(dir.path().to_path_buf()),
        log_level: "trace".to_string(),
        ..Default::default()
    });

    let guard = runtime.init_logging("facade-test");
    let template = runtime.new_template();
    assert!(template.resolve_nearby(&Key::of("missing"), None).is_err());
    drop(guard);

    let written = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(written, 1);
}

#[test]
fn test_run_template_releases_stored_closures() {
    let runtime = ScopeRuntime::default();
    let weak = runtime.run_template(|template| {
        let closure = template.define_closure(Key::of("onClick"), vec![]);
        template.assign(Key::of("onClick"), closure.to_value()).unwrap();
        assert!(template.find_function(&Key::of("onClick")).is_ok());
        Arc::downgrade(template)
    });
    assert!(weak.upgrade().is_none());
}
