use routecore::fault::{Classified, ErrorType, Fault, FaultRegistry};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

static EXCEPTION: ErrorType = ErrorType::root("Exception");
static RUNTIME: ErrorType = ErrorType::child("RuntimeException", &EXCEPTION);
static ILLEGAL_ARGUMENT: ErrorType = ErrorType::child("IllegalArgumentException", &RUNTIME);
static NUMBER_FORMAT: ErrorType = ErrorType::child("NumberFormatException", &ILLEGAL_ARGUMENT);
static IO: ErrorType = ErrorType::child("IOException", &EXCEPTION);

type Handler = Box<dyn Fn(&dyn std::fmt::Display, &str) -> String + Send + Sync>;

fn handler(label: &'static str) -> Handler {
    Box::new(move |error: &dyn std::fmt::Display, path: &str| {
        format!("{label}: {error} at {path}")
    })
}

#[derive(Debug)]
struct BadNumber(String);

impl std::fmt::Display for BadNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "not a number: {}", self.0)
    }
}

impl Classified for BadNumber {
    fn error_type(&self) -> &'static ErrorType {
        &NUMBER_FORMAT
    }
}

#[test]
fn test_derived_type_resolves_to_base_handler() {
    let mut faults = FaultRegistry::new();
    faults.register(Fault::new(&RUNTIME, "runtime"));

    let fault = faults.resolve(&NUMBER_FORMAT).unwrap();
    assert_eq!(*fault.handler(), "runtime");
    assert_eq!(fault.error_type(), &RUNTIME);
    assert!(faults.resolve(&IO).is_none());
}

#[test]
fn test_late_direct_registration_does_not_change_cached_result() {
    let mut faults = FaultRegistry::new();
    faults.register(Fault::new(&EXCEPTION, "base"));

    let first = faults.resolve(&ILLEGAL_ARGUMENT).unwrap();
    assert_eq!(*first.handler(), "base");

    faults.register(Fault::new(&ILLEGAL_ARGUMENT, "derived"));

    let second = faults.resolve(&ILLEGAL_ARGUMENT).unwrap();
    assert_eq!(*second.handler(), "base");
    assert!(Arc::ptr_eq(&first, &second));

    // Never looked up before the registration: sees its nearest handler.
    let fresh = faults.resolve(&NUMBER_FORMAT).unwrap();
    assert_eq!(*fresh.handler(), "derived");
}

#[test]
fn test_cached_miss_is_not_revisited() {
    let mut faults = FaultRegistry::new();
    assert!(faults.resolve(&IO).is_none());
    faults.register(Fault::new(&EXCEPTION, "catch_all"));
    assert!(faults.resolve(&IO).is_none());
    assert_eq!(*faults.resolve(&RUNTIME).unwrap().handler(), "catch_all");
}

#[test]
fn test_handler_invocation_through_classified_error() {
    let mut faults: FaultRegistry<Handler> = FaultRegistry::new();
    faults.register(Fault::new(&ILLEGAL_ARGUMENT, handler("bad request")));

    let error = BadNumber("abc".to_string());
    let fault = faults.resolve_for(&error).unwrap();
    let response = (fault.handler())(&error as &dyn std::fmt::Display, "/sum");
    assert_eq!(response, "bad request: not a number: abc at /sum");
}

#[test]
fn test_concurrent_first_lookup_agrees() {
    let mut faults = FaultRegistry::new();
    faults.register(Fault::new(&RUNTIME, "runtime"));
    let faults = Arc::new(faults);

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let faults = Arc::clone(&faults);
            let barrier = Arc::clone(&barrier);
            let seen = Arc::clone(&seen);
            thread::spawn(move || {
                barrier.wait();
                let fault = faults.resolve(&NUMBER_FORMAT).unwrap();
                seen.lock().unwrap().push(fault);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), threads);
    assert!(seen.iter().all(|f| *f.handler() == "runtime"));
    assert!(seen.iter().all(|f| f.error_type() == &RUNTIME));
    assert_eq!(faults.cached_len(), 1);
}
