use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc, Barrier,
    },
    thread,
};
use tracing_test::traced_test;
use wirebox::{injectable, upcast, Inject, InstantiateErrorKind, Injector, ResolveErrorKind};

trait Greeter {
    fn greet(&self) -> &'static str;
}

type DynGreeter = dyn Greeter + Send + Sync;

struct English;

impl Greeter for English {
    fn greet(&self) -> &'static str {
        "hello"
    }
}

struct Spanish;

impl Greeter for Spanish {
    fn greet(&self) -> &'static str {
        "hola"
    }
}

fn counting_greeter(
    call_count: &Arc<AtomicU8>,
) -> impl FnMut() -> Result<English, InstantiateErrorKind> + Clone + Send + Sync {
    let call_count = call_count.clone();
    move || {
        call_count.fetch_add(1, Ordering::SeqCst);
        Ok(English)
    }
}

#[test]
#[traced_test]
fn test_transient_binding_produces_distinct_instances() {
    let call_count = Arc::new(AtomicU8::new(0));

    let injector = Injector::new();
    injector.provide_bound(
        counting_greeter(&call_count),
        upcast!(English => DynGreeter),
    );

    let res_1 = injector.get::<DynGreeter>().unwrap();
    let res_2 = injector.get::<DynGreeter>().unwrap();
    let res_3 = injector.get::<DynGreeter>().unwrap();

    assert!(!Arc::ptr_eq(&res_1, &res_2));
    assert!(!Arc::ptr_eq(&res_1, &res_3));
    assert!(!Arc::ptr_eq(&res_2, &res_3));
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
}

#[test]
#[traced_test]
fn test_singleton_binding_reuses_one_instance() {
    let call_count = Arc::new(AtomicU8::new(0));

    let injector = Injector::new();
    injector.provide_singleton_bound(
        counting_greeter(&call_count),
        upcast!(English => DynGreeter),
    );

    let res_1 = injector.get::<DynGreeter>().unwrap();
    let res_2 = injector.get::<DynGreeter>().unwrap();
    let res_3 = injector.get::<DynGreeter>().unwrap();

    assert!(Arc::ptr_eq(&res_1, &res_2));
    assert!(Arc::ptr_eq(&res_1, &res_3));
    assert_eq!(call_count.load(Ordering::SeqCst), 1);
}

#[test]
#[traced_test]
fn test_failing_factory_transient_fails_every_call() {
    let call_count = Arc::new(AtomicU8::new(0));

    let injector = Injector::new();
    injector.provide({
        let call_count = call_count.clone();
        move || {
            call_count.fetch_add(1, Ordering::SeqCst);
            Err::<English, _>(InstantiateErrorKind::NoInstance)
        }
    });

    for _ in 0..3 {
        assert!(matches!(
            injector.get::<English>(),
            Err(ResolveErrorKind::Factory(_))
        ));
    }
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
}

#[test]
#[traced_test]
fn test_failing_factory_singleton_caches_first_failure() {
    let call_count = Arc::new(AtomicU8::new(0));

    let injector = Injector::new();
    injector.provide_singleton({
        let call_count = call_count.clone();
        move || {
            call_count.fetch_add(1, Ordering::SeqCst);
            Err::<English, _>(InstantiateErrorKind::NoInstance)
        }
    });

    for _ in 0..3 {
        assert!(matches!(
            injector.get::<English>(),
            Err(ResolveErrorKind::Factory(_))
        ));
    }
    assert_eq!(call_count.load(Ordering::SeqCst), 1);
}

#[test]
#[traced_test]
fn test_contains_never_constructs() {
    let call_count = Arc::new(AtomicU8::new(0));

    let injector = Injector::new();
    assert!(!injector.contains::<DynGreeter>());

    injector.provide_bound(
        counting_greeter(&call_count),
        upcast!(English => DynGreeter),
    );

    assert!(injector.contains::<DynGreeter>());
    assert_eq!(call_count.load(Ordering::SeqCst), 0);
}

#[test]
#[traced_test]
fn test_collection_keeps_registration_order_and_single_get_takes_last() {
    let injector = Injector::new();
    injector.provide_bound(
        || Ok::<_, InstantiateErrorKind>(English),
        upcast!(English => DynGreeter),
    );
    injector.provide_bound(
        || Ok::<_, InstantiateErrorKind>(Spanish),
        upcast!(Spanish => DynGreeter),
    );

    let all = injector.get_all::<DynGreeter>().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].greet(), "hello");
    assert_eq!(all[1].greet(), "hola");

    let last = injector.get::<DynGreeter>().unwrap();
    assert_eq!(last.greet(), "hola");
}

#[test]
#[traced_test]
fn test_collection_does_not_fall_back_to_construction() {
    #[derive(Default)]
    struct Constructible;

    injectable!(Constructible);

    let injector = Injector::new();

    // The single-instance path would construct this in place.
    assert!(injector.get_or_construct::<Constructible>().is_ok());
    assert!(injector.get_all::<Constructible>().unwrap().is_empty());
}

#[test]
#[traced_test]
fn test_try_registration_is_noop_when_bound() {
    let call_count = Arc::new(AtomicU8::new(0));

    let injector = Injector::new();
    injector.provide_bound(
        || Ok::<_, InstantiateErrorKind>(English),
        upcast!(English => DynGreeter),
    );
    injector.try_provide_bound(
        counting_greeter(&call_count),
        upcast!(English => DynGreeter),
    );

    assert_eq!(injector.get_all::<DynGreeter>().unwrap().len(), 1);
    assert_eq!(injector.get::<DynGreeter>().unwrap().greet(), "hello");
    assert_eq!(call_count.load(Ordering::SeqCst), 0);
}

#[test]
#[traced_test]
fn test_try_registration_applies_when_absent() {
    let injector = Injector::new();
    injector.try_provide_bound(
        || Ok::<_, InstantiateErrorKind>(Spanish),
        upcast!(Spanish => DynGreeter),
    );

    assert_eq!(injector.get::<DynGreeter>().unwrap().greet(), "hola");
}

#[test]
#[traced_test]
fn test_implicit_construction_walks_dependency_chain() {
    #[derive(Default)]
    struct Config {
        url: &'static str,
    }

    struct Database {
        config: Arc<Config>,
    }

    struct Repository {
        database: Arc<Database>,
    }

    injectable!(Config);
    injectable!(Database { config: Config });
    injectable!(Repository { database: Database });

    let injector = Injector::new();

    // Nothing registered: the whole chain is constructed in place.
    let repository = injector.get_or_construct::<Repository>().unwrap();
    assert_eq!(repository.database.config.url, "");

    // A registered dependency takes precedence over in-place construction.
    injector.add_instance(Arc::new(Config { url: "postgres://localhost" }));
    let repository = injector.get_or_construct::<Repository>().unwrap();
    assert_eq!(repository.database.config.url, "postgres://localhost");
}

#[test]
#[traced_test]
fn test_upcast_dispatches_to_concrete_override() {
    struct Loud;

    impl Greeter for Loud {
        fn greet(&self) -> &'static str {
            "HELLO"
        }
    }

    let injector = Injector::new();
    injector.provide_bound(
        || Ok::<_, InstantiateErrorKind>(Loud),
        upcast!(Loud => DynGreeter),
    );

    let greeter = injector.get::<DynGreeter>().unwrap();
    assert_eq!(greeter.greet(), "HELLO");
}

#[test]
#[traced_test]
fn test_instance_binding_shares_the_given_allocation() {
    let value = Arc::new(English);

    let injector = Injector::new();
    injector.add_instance(value.clone());

    let res_1 = injector.get::<English>().unwrap();
    let res_2 = injector.get::<English>().unwrap();

    assert!(Arc::ptr_eq(&value, &res_1));
    assert!(Arc::ptr_eq(&value, &res_2));
}

#[test]
#[traced_test]
fn test_instance_outlives_the_injector() {
    let injector = Injector::new();
    injector.add_instance_bound(Arc::new(Spanish), upcast!(Spanish => DynGreeter));

    let greeter = injector.get::<DynGreeter>().unwrap();
    drop(injector);
    assert_eq!(greeter.greet(), "hola");
}

#[test]
#[traced_test]
fn test_factory_receives_injected_arguments() {
    struct Config {
        prefix: &'static str,
    }

    struct Banner {
        line: String,
    }

    let injector = Injector::new();
    injector.add_instance(Arc::new(Config { prefix: ">> " }));
    injector.provide(|Inject(config): Inject<Config>| {
        Ok::<_, InstantiateErrorKind>(Banner {
            line: format!("{}ready", config.prefix),
        })
    });

    let banner = injector.get::<Banner>().unwrap();
    assert_eq!(banner.line, ">> ready");
}

#[test]
#[traced_test]
fn test_concurrent_singleton_first_retrieval_caches_one_outcome() {
    struct Pool;

    let injector = Injector::new();
    injector.provide_singleton(|| Ok::<_, InstantiateErrorKind>(Pool));

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let injector = injector.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                injector.get::<Pool>().unwrap()
            })
        })
        .collect();
    let instances: Vec<Arc<Pool>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    // Racing first retrievals may each run the factory, but exactly one
    // outcome is cached and every caller gets it.
    let first = &instances[0];
    assert!(instances.iter().all(|instance| Arc::ptr_eq(first, instance)));
    assert!(Arc::ptr_eq(first, &injector.get::<Pool>().unwrap()));
}

#[test]
#[traced_test]
fn test_concurrent_registrations_are_not_lost() {
    let barrier = Arc::new(Barrier::new(8));

    let injector = Injector::new();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let injector = injector.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                injector.provide(|| Ok::<_, InstantiateErrorKind>(English));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(injector.get_all::<English>().unwrap().len(), 8);
}

#[test]
#[traced_test]
fn test_singleton_constructor_binding() {
    #[derive(Default)]
    struct Pool;

    injectable!(Pool);

    let injector = Injector::new();
    injector.add_singleton::<Pool>();

    let res_1 = injector.get::<Pool>().unwrap();
    let res_2 = injector.get::<Pool>().unwrap();

    assert!(Arc::ptr_eq(&res_1, &res_2));
}
