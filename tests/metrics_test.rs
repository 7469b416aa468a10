//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use huginn::telemetry;
use huginn::{
    ClassDescriptor, DynObject, ExecutionUnit, FnInterceptor, HuginnError,
    InterfaceBindingFactory, InterfaceDescriptor, Invocable, MethodKey, MethodResolver,
    ObjectMethod, Result, Signature, Value, wrap,
};

// ============================================================================
// Fixtures
// ============================================================================

fn mapper() -> Arc<InterfaceDescriptor> {
    InterfaceDescriptor::builder("UserMapper")
        .method("countAll", &[] as &[&str])
        .method("unbound", &[] as &[&str])
        .build()
        .unwrap()
}

fn factory() -> InterfaceBindingFactory<()> {
    let resolver = |interface: &InterfaceDescriptor,
                    method: &MethodKey|
     -> Result<Arc<dyn ExecutionUnit<()>>> {
        match method.name() {
            "countAll" => Ok(Arc::new(|_: &(), _: &[Value]| -> Result<Value> {
                Ok(Value::from(12))
            })),
            _ => Err(HuginnError::UnboundMethod {
                interface: interface.name().clone(),
                method: method.clone(),
            }),
        }
    };
    InterfaceBindingFactory::new(mapper(), Arc::new(resolver) as Arc<dyn MethodResolver<()>>)
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Sum counter values for a metric name carrying a given label value.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == label && l.value() == value)
        })
        .map(|(_, _, _, v)| match v {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn routed_calls_record_cache_and_route_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let factory = factory();
        factory.create(()).call("countAll", &[]).unwrap();
        factory.create(()).call("countAll", &[]).unwrap();
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::METHOD_CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::METHOD_CACHE_HITS_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::METHOD_RESOLUTIONS_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::ROUTE_TOTAL, "path", "unit"),
        2
    );
    assert!(
        has_histogram(&snapshot, telemetry::ROUTE_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[test]
fn preload_counts_resolutions() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        let factory = factory();
        let preloaded = factory.preload();
        factory.create(()).call("countAll", &[]).unwrap();
        preloaded
    });
    // `unbound` has no binding, but `countAll` was resolved before it.
    assert!(result.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::METHOD_RESOLUTIONS_TOTAL,
            "interface",
            "UserMapper"
        ),
        1
    );
    assert_eq!(counter_total(&snapshot, telemetry::METHOD_CACHE_HITS_TOTAL), 1);
}

#[test]
fn object_methods_skip_the_cache() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let handle = factory().create(());
        handle.invoke(&ObjectMethod::HashCode.key(), &[]).unwrap();
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::METHOD_CACHE_MISSES_TOTAL), 0);
    assert_eq!(counter_total(&snapshot, telemetry::METHOD_CACHE_HITS_TOTAL), 0);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::ROUTE_TOTAL, "path", "object"),
        1
    );
}

#[test]
fn failed_resolution_records_error_status() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result =
        metrics::with_local_recorder(&recorder, || factory().create(()).call("unbound", &[]));
    assert!(result.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::METHOD_RESOLUTIONS_TOTAL), 0);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::ROUTE_TOTAL, "status", "error"),
        1
    );
}

#[test]
fn interception_and_wrap_outcomes_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let interceptor = Arc::new(FnInterceptor::new(
            "count",
            vec![Signature::new(mapper(), "countAll", Vec::<String>::new())],
            |invocation| invocation.proceed(),
        ));

        let wrapped = wrap(Arc::new(factory().create(())), interceptor.clone()).unwrap();
        wrapped.invoke_named("countAll", &[]).unwrap();
        wrapped.invoke_named("countAll", &[]).unwrap();

        let unrelated = DynObject::builder(Arc::new(ClassDescriptor::new("Plain")))
            .build()
            .unwrap();
        wrap(unrelated, interceptor).unwrap();
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::INTERCEPTIONS_TOTAL), 2);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::WRAPS_TOTAL, "outcome", "wrapped"),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::WRAPS_TOTAL, "outcome", "unchanged"),
        1
    );
}

#[test]
fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let factory = factory();
    assert_eq!(
        factory.create(()).call("countAll", &[]).unwrap(),
        Value::from(12)
    );
}
