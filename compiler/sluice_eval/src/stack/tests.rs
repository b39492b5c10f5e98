use super::*;
use pretty_assertions::assert_eq;
use sluice_diagnostic::ErrorCode;

fn entry(name: &str) -> StackEntry {
    StackEntry {
        function_name: name.to_string(),
        location: SourceLocation::line(1, 1, 5),
    }
}

#[test]
fn push_and_pop_track_the_innermost_call() {
    let mut stack = CallStack::default();
    assert!(stack.is_empty());
    stack.push(entry("outer")).unwrap();
    stack.push(entry("inner")).unwrap();
    assert_eq!(stack.depth(), 2);
    assert_eq!(stack.current().unwrap().function_name, "inner");

    assert_eq!(stack.pop().unwrap().function_name, "inner");
    assert_eq!(stack.entries(), &[entry("outer")]);
}

#[test]
fn overflow_is_rejected_without_pushing() {
    let mut stack = CallStack::new(2);
    stack.push(entry("a")).unwrap();
    stack.push(entry("b")).unwrap();
    let err = stack.push(entry("c")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Invalid);
    assert_eq!(err.message(), "maximum call depth of 2 exceeded calling c");
    assert_eq!(stack.depth(), 2);
}
