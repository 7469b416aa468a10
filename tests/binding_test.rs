//! Tests for interface bindings: factory, router, and the shared method cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use huginn::{
    BindingHandle, BindingRegistry, BoundInterface, ClassDescriptor, ExecutionUnit, Failure,
    HuginnError, InterfaceBindingFactory, InterfaceDescriptor, Invocable, MethodKey,
    MethodResolver, ObjectMethod, Result, TypeDescriptor, TypeName, Value,
};
use serde_json::json;

// ============================================================================
// Fixtures
// ============================================================================

struct Session {
    id: u32,
}

/// Unit that reports which method it was built for and which session ran it.
struct EchoUnit {
    method: MethodKey,
}

impl ExecutionUnit<Session> for EchoUnit {
    fn execute(&self, session: &Session, args: &[Value]) -> Result<Value> {
        Ok(json!({
            "method": self.method.name(),
            "session": session.id,
            "args": args,
        }))
    }
}

/// Resolver that counts how often it is consulted.
struct CountingResolver {
    calls: AtomicUsize,
    failure: Failure,
}

impl CountingResolver {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failure: Failure::msg("constraint violated"),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MethodResolver<Session> for CountingResolver {
    fn resolve(
        &self,
        interface: &InterfaceDescriptor,
        method: &MethodKey,
    ) -> Result<Arc<dyn ExecutionUnit<Session>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match method.name() {
            "findName" | "countAll" => Ok(Arc::new(EchoUnit {
                method: method.clone(),
            })),
            "explode" => {
                let failure = self.failure.clone();
                Ok(Arc::new(move |_: &Session, _: &[Value]| -> Result<Value> {
                    Err(HuginnError::Execution(failure.clone()))
                }))
            }
            _ => Err(HuginnError::UnboundMethod {
                interface: interface.name().clone(),
                method: method.clone(),
            }),
        }
    }
}

fn user_mapper() -> Arc<InterfaceDescriptor> {
    InterfaceDescriptor::builder("UserMapper")
        .method("findName", &["i64"])
        .method("countAll", &[] as &[&str])
        .method("explode", &[] as &[&str])
        .method("unbound", &[] as &[&str])
        .default_method("version", &[] as &[&str], |_this, _args| Ok(json!("v1")))
        .default_method("describe", &["i64"], |this, args| {
            let found = this.invoke_named("findName", args)?;
            Ok(json!(format!("user via {}", found["method"].as_str().unwrap_or("?"))))
        })
        .build()
        .unwrap()
}

fn factory(resolver: &Arc<CountingResolver>) -> InterfaceBindingFactory<Session> {
    InterfaceBindingFactory::new(user_mapper(), resolver.clone())
}

fn key(name: &str, params: &[&str]) -> MethodKey {
    MethodKey::new("UserMapper", name, params.iter().copied())
}

// ============================================================================
// Shared cache
// ============================================================================

#[test]
fn handles_are_distinct_but_share_one_cache() {
    let resolver = CountingResolver::new();
    let factory = factory(&resolver);

    let first = factory.create(Session { id: 1 });
    let second = factory.create(Session { id: 2 });
    assert_ne!(first.identity(), second.identity());

    first.call("findName", &[json!(10)]).unwrap();
    let unit_after_first = factory.method_cache().get(&key("findName", &["i64"])).unwrap();

    second.call("findName", &[json!(20)]).unwrap();
    let unit_after_second = factory.method_cache().get(&key("findName", &["i64"])).unwrap();

    assert_eq!(resolver.calls(), 1);
    assert!(Arc::ptr_eq(&unit_after_first, &unit_after_second));
    assert_eq!(factory.method_cache().len(), 1);
}

#[test]
fn call_context_is_threaded_to_the_unit() {
    let resolver = CountingResolver::new();
    let factory = factory(&resolver);

    let a = factory.create(Session { id: 1 }).call("findName", &[json!(5)]).unwrap();
    let b = factory.create(Session { id: 2 }).call("findName", &[json!(6)]).unwrap();

    assert_eq!(a, json!({"method": "findName", "session": 1, "args": [5]}));
    assert_eq!(b, json!({"method": "findName", "session": 2, "args": [6]}));
}

#[test]
fn each_method_gets_its_own_entry() {
    let resolver = CountingResolver::new();
    let factory = factory(&resolver);
    let handle = factory.create(Session { id: 1 });

    handle.call("findName", &[json!(1)]).unwrap();
    let count = handle.call("countAll", &[]).unwrap();

    assert_eq!(count["method"], json!("countAll"));
    assert_eq!(resolver.calls(), 2);
    assert_eq!(factory.method_cache().len(), 2);
}

#[test]
fn concurrent_misses_settle_on_one_entry() {
    const THREADS: usize = 8;
    let resolver = CountingResolver::new();
    let factory = factory(&resolver);
    let barrier = Barrier::new(THREADS);

    let results: Vec<Value> = thread::scope(|s| {
        let workers: Vec<_> = (0..THREADS)
            .map(|i| {
                let factory = &factory;
                let barrier = &barrier;
                s.spawn(move || {
                    let handle = factory.create(Session { id: i as u32 });
                    barrier.wait();
                    handle.call("findName", &[json!(i)]).unwrap()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    let calls = resolver.calls();
    assert!((1..=THREADS).contains(&calls), "resolver called {calls} times");
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result["method"], json!("findName"));
        assert_eq!(result["session"], json!(i));
    }

    let cache = factory.method_cache();
    assert_eq!(cache.len(), 1);
    let k = key("findName", &["i64"]);
    let one = cache.get(&k).unwrap();
    let two = cache.get(&k).unwrap();
    assert!(Arc::ptr_eq(&one, &two));

    // Later calls never resolve again.
    factory.create(Session { id: 99 }).call("findName", &[json!(0)]).unwrap();
    assert_eq!(resolver.calls(), calls);
}

// ============================================================================
// Routing paths
// ============================================================================

#[test]
fn base_object_methods_never_reach_the_resolver() {
    let resolver = CountingResolver::new();
    let factory = factory(&resolver);
    let handle = factory.create(Session { id: 1 });

    let text = handle.invoke(&ObjectMethod::ToString.key(), &[]).unwrap();
    assert!(text.as_str().unwrap().contains("UserMapper"));

    let hash = handle.invoke(&ObjectMethod::HashCode.key(), &[]).unwrap();
    assert_eq!(hash, json!(handle.identity()));

    let same = handle
        .invoke(&ObjectMethod::Equals.key(), &[json!(handle.identity())])
        .unwrap();
    let other = handle
        .invoke(&ObjectMethod::Equals.key(), &[json!(handle.identity() + 1)])
        .unwrap();
    assert_eq!(same, json!(true));
    assert_eq!(other, json!(false));

    assert_eq!(resolver.calls(), 0);
    assert!(factory.method_cache().is_empty());
}

#[test]
fn default_method_runs_its_own_body() {
    let resolver = CountingResolver::new();
    let factory = factory(&resolver);
    let handle = factory.create(Session { id: 1 });

    assert_eq!(handle.call("version", &[]).unwrap(), json!("v1"));
    assert_eq!(resolver.calls(), 0);
    assert!(!factory.method_cache().contains(&key("version", &[])));
}

#[test]
fn default_method_calls_route_through_the_handle() {
    let resolver = CountingResolver::new();
    let factory = factory(&resolver);
    let handle = factory.create(Session { id: 3 });

    let described = handle.call("describe", &[json!(1)]).unwrap();
    assert_eq!(described, json!("user via findName"));

    // Only the abstract method the body called was resolved.
    assert_eq!(resolver.calls(), 1);
    assert!(factory.method_cache().contains(&key("findName", &["i64"])));
    assert!(!factory.method_cache().contains(&key("describe", &["i64"])));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn missing_binding_is_a_resolution_error() {
    let resolver = CountingResolver::new();
    let factory = factory(&resolver);
    let handle = factory.create(Session { id: 1 });

    let err = handle.call("unbound", &[]).unwrap_err();
    assert!(err.is_resolution());
    assert!(matches!(err, HuginnError::UnboundMethod { .. }));
    assert!(factory.method_cache().is_empty());
}

#[test]
fn execution_failure_keeps_its_identity() {
    let resolver = CountingResolver::new();
    let factory = factory(&resolver);
    let handle = factory.create(Session { id: 1 });

    let err = handle.call("explode", &[]).unwrap_err();
    let failure = err.failure().expect("execution failure");
    assert!(failure.ptr_eq(&resolver.failure));
    assert_eq!(err.to_string(), "constraint violated");
}

#[test]
fn foreign_method_is_rejected() {
    let resolver = CountingResolver::new();
    let handle = factory(&resolver).create(Session { id: 1 });

    let foreign = MethodKey::new("OrderMapper", "findName", ["i64"]);
    let err = handle.invoke(&foreign, &[json!(1)]).unwrap_err();
    assert!(matches!(err, HuginnError::NoSuchMethod { .. }));
    assert_eq!(resolver.calls(), 0);
}

#[test]
fn wrong_arity_is_rejected_before_resolution() {
    let resolver = CountingResolver::new();
    let handle = factory(&resolver).create(Session { id: 1 });

    let err = handle.invoke(&key("findName", &["i64"]), &[]).unwrap_err();
    assert!(matches!(
        err,
        HuginnError::InvalidArguments {
            expected: 1,
            actual: 0,
            ..
        }
    ));
    assert_eq!(resolver.calls(), 0);
}

#[test]
fn factory_rejects_class_descriptor() {
    let resolver: Arc<dyn MethodResolver<Session>> = CountingResolver::new();
    let class = Arc::new(ClassDescriptor::new("UserMapperImpl").implements(user_mapper()));
    let err = InterfaceBindingFactory::try_new(TypeDescriptor::from(class), resolver).unwrap_err();
    assert!(matches!(err, HuginnError::NotAnInterface(_)));
    assert!(err.is_configuration());
}

// ============================================================================
// Typed facade
// ============================================================================

struct UserMapper(BindingHandle<Session>);

impl BoundInterface<Session> for UserMapper {
    fn from_handle(handle: BindingHandle<Session>) -> Self {
        UserMapper(handle)
    }
}

impl UserMapper {
    fn find_name(&self, id: i64) -> Result<Value> {
        self.0.call("findName", &[json!(id)])
    }
}

#[test]
fn typed_facade_routes_through_handle() {
    let resolver = CountingResolver::new();
    let mapper: UserMapper = factory(&resolver).create_as(Session { id: 4 });
    let found = mapper.find_name(42).unwrap();
    assert_eq!(found["session"], json!(4));
    assert_eq!(found["args"], json!([42]));
}

// ============================================================================
// Preload & registry
// ============================================================================

fn order_mapper() -> Arc<InterfaceDescriptor> {
    InterfaceDescriptor::builder("OrderMapper")
        .method("countAll", &[] as &[&str])
        .method("findName", &["i64"])
        .default_method("version", &[] as &[&str], |_this, _args| Ok(json!("v2")))
        .build()
        .unwrap()
}

#[test]
fn preload_resolves_every_abstract_method() {
    let resolver = CountingResolver::new();
    let factory = InterfaceBindingFactory::new(order_mapper(), resolver.clone());
    factory.preload().unwrap();
    assert_eq!(resolver.calls(), 2);
    assert_eq!(factory.method_cache().len(), 2);

    factory.create(Session { id: 1 }).call("countAll", &[]).unwrap();
    assert_eq!(resolver.calls(), 2);
}

#[test]
fn registry_binds_and_hands_out_handles() {
    let resolver = CountingResolver::new();
    let mut registry = BindingRegistry::new(resolver.clone());
    registry.add_interface(user_mapper()).unwrap();
    registry.add_interface(order_mapper()).unwrap();

    let names: Vec<&str> = registry.interfaces().into_iter().map(TypeName::as_str).collect();
    assert_eq!(names, vec!["OrderMapper", "UserMapper"]);
    assert!(registry.has_interface(&"UserMapper".into()));

    let handle = registry.handle(&"OrderMapper".into(), Session { id: 7 }).unwrap();
    assert_eq!(handle.call("countAll", &[]).unwrap()["session"], json!(7));
}

#[test]
fn registry_rejects_duplicates_and_unknown_names() {
    let resolver = CountingResolver::new();
    let mut registry = BindingRegistry::new(resolver);
    registry.add_interface(user_mapper()).unwrap();

    let dup = registry.add_interface(user_mapper()).unwrap_err();
    assert!(matches!(dup, HuginnError::AlreadyBound(_)));

    let unknown = registry
        .handle(&"Nope".into(), Session { id: 1 })
        .unwrap_err();
    assert!(matches!(unknown, HuginnError::UnknownBinding(_)));
    assert!(unknown.is_resolution());
}

#[test]
fn registry_rejects_classes() {
    let resolver = CountingResolver::new();
    let mut registry = BindingRegistry::new(resolver);
    let class = Arc::new(ClassDescriptor::new("Impl"));
    let err = registry.add_interface(class).unwrap_err();
    assert!(matches!(err, HuginnError::NotAnInterface(_)));
    assert!(registry.is_empty());
}

#[test]
fn eager_registration_rolls_back_on_unbound_method() {
    let resolver = CountingResolver::new();
    let mut registry = BindingRegistry::new(resolver.clone());
    registry.set_eager_resolution(true);

    let err = registry.add_interface(user_mapper()).unwrap_err();
    assert!(matches!(err, HuginnError::UnboundMethod { .. }));
    assert!(!registry.has_interface(&"UserMapper".into()));

    registry.add_interface(order_mapper()).unwrap();
    assert!(registry.has_interface(&"OrderMapper".into()));
    let factory = registry.factory(&"OrderMapper".into()).unwrap();
    assert_eq!(factory.method_cache().len(), 2);
}
