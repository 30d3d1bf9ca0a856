use faultline_engine::{Condition, RuntimeContext};
use faultline_signature::{parse_signature, MethodSignature};

fn sig(text: &str) -> MethodSignature {
    parse_signature(text).unwrap()
}

#[test]
fn test_on_nth_call_triggers_exactly_once() {
    let target = sig("Foo.Bar(int)");
    let n = 3u64;
    let condition = Condition::on_nth_call(n).unwrap();

    let fired: Vec<bool> = (1..=n + 5)
        .map(|count| condition.trigger(&RuntimeContext::new(&target, None, count)))
        .collect();

    assert_eq!(fired.iter().filter(|&&f| f).count(), 1);
    assert!(fired[(n - 1) as usize]);
}

#[test]
fn test_every_nth_call_triggers_on_multiples() {
    let target = sig("Foo.Bar(int)");
    let condition = Condition::every_nth_call(2).unwrap();

    let fired: Vec<bool> = (1..=20)
        .map(|count| condition.trigger(&RuntimeContext::new(&target, None, count)))
        .collect();

    for (i, fired) in fired.iter().enumerate() {
        let count = (i + 1) as u64;
        assert_eq!(*fired, count % 2 == 0, "wrong decision at call {count}");
    }
}

#[test]
fn test_on_nth_call_by_counts_only_matching_callers() {
    let target = sig("Foo.Bar(int)");
    let wanted = sig("Acme.Worker.Run()");
    let other = sig("Acme.Other.Run()");
    let condition = Condition::on_nth_call_by(2, wanted.clone()).unwrap();

    // First matching call: counter 1, no trigger.
    assert!(!condition.trigger(&RuntimeContext::new(&target, Some(&wanted), 1)));
    // Other callers never advance the private counter.
    for count in 2..=6 {
        assert!(!condition.trigger(&RuntimeContext::new(&target, Some(&other), count)));
    }
    assert!(!condition.trigger(&RuntimeContext::new(&target, None, 7)));
    // Second matching call: triggers.
    assert!(condition.trigger(&RuntimeContext::new(&target, Some(&wanted), 8)));
    // And never again.
    assert!(!condition.trigger(&RuntimeContext::new(&target, Some(&wanted), 9)));
}

#[test]
fn test_called_by_matches_immediate_caller() {
    let target = sig("Foo.Bar(int)");
    let wanted = sig("Acme.Worker.Run()");
    let other = sig("Acme.Other.Run()");
    let condition = Condition::called_by(wanted.clone());

    assert!(condition.trigger(&RuntimeContext::new(&target, Some(&wanted), 1)));
    assert!(!condition.trigger(&RuntimeContext::new(&target, Some(&other), 2)));
    assert!(!condition.trigger(&RuntimeContext::new(&target, None, 3)));
}

#[test]
fn test_stack_contains_searches_every_frame() {
    let target = sig("Foo.Bar(int)");
    let wanted = sig("Acme.Deep.Origin()");
    let condition = Condition::stack_contains(wanted.clone());

    let with_wanted = vec![
        sig("Foo.Bar(int)"),
        sig("Acme.Worker.Run()"),
        sig("Acme.Deep.Origin()"),
    ];
    let without_wanted = vec![sig("Foo.Bar(int)"), sig("Acme.Worker.Run()")];

    assert!(condition.trigger(&RuntimeContext::from_stack(&target, &with_wanted, 1)));
    assert!(!condition.trigger(&RuntimeContext::from_stack(&target, &without_wanted, 2)));
    // No captured stack means no match.
    assert!(!condition.trigger(&RuntimeContext::new(&target, Some(&wanted), 3)));
}

#[test]
fn test_from_stack_derives_caller_from_frame_one() {
    let target = sig("Foo.Bar(int)");
    let stack = vec![sig("Foo.Bar(int)"), sig("Acme.Worker.Run()")];
    let context = RuntimeContext::from_stack(&target, &stack, 1);
    assert_eq!(context.caller(), Some(&stack[1]));

    let entry_point_stack = vec![sig("Foo.Bar(int)")];
    let context = RuntimeContext::from_stack(&target, &entry_point_stack, 1);
    assert_eq!(context.caller(), None);
}

#[test]
fn test_construction_rejects_zero_counts() {
    assert!(Condition::on_nth_call(0).is_err());
    assert!(Condition::every_nth_call(0).is_err());
    assert!(Condition::on_nth_call_by(0, sig("Foo.Caller()")).is_err());
    assert!(Condition::on_nth_call(1).is_ok());
}
