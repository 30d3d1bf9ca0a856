use faultline_signature::{parse_signature, MethodSignature, SignatureParseError};

#[test]
fn test_canonicalization_is_idempotent() {
    let inputs = [
        "Foo.Bar(int)",
        "Foo.Bar()",
        " Foo . Bar ( int , string ) ",
        "System.Collections.Generic.List<System.Int32>.Add(System.Int32)",
        "Namespace.Outer<E>.Inner<F,G>.MethodName<H>(E, F, H, List<H>)",
        "Foo.Bar(out int, ref string)",
        "Foo.Bar(int[], string[,])",
        "Foo.Baz`2(T, E)",
    ];
    for input in inputs {
        let parsed = parse_signature(input).unwrap();
        let reparsed = parse_signature(&parsed.to_string()).unwrap();
        assert_eq!(parsed, reparsed, "round-trip failed for '{input}'");
    }
}

#[test]
fn test_equality_is_structural() {
    let a = parse_signature("Foo.Bar(int, string)").unwrap();
    let b = parse_signature("Foo . Bar(int,string)").unwrap();
    assert_eq!(a, b);

    let different_params = parse_signature("Foo.Bar(int)").unwrap();
    assert_ne!(a, different_params);

    let different_case = parse_signature("Foo.bar(int, string)").unwrap();
    assert_ne!(a, different_case);

    let different_arity = parse_signature("Foo.Bar<T>(int, string)").unwrap();
    assert_ne!(a, different_arity);
}

#[test]
fn test_signature_keys_a_hash_map() {
    use std::collections::HashMap;

    let mut map: HashMap<MethodSignature, u32> = HashMap::new();
    map.insert(parse_signature("Foo.Bar(int)").unwrap(), 1);

    let probe = parse_signature("Foo.Bar( int )").unwrap();
    assert_eq!(map.get(&probe), Some(&1));
}

#[test]
fn test_nested_generics_not_split() {
    let sig = parse_signature("Foo.Bar(Dictionary<string,int>, List<List<bool>>)").unwrap();
    assert_eq!(
        sig.parameters(),
        ["Dictionary<string,int>", "List<List<bool>>"]
    );
}

#[test]
fn test_multidimensional_array_not_split() {
    let sig = parse_signature("Foo.Bar(int[,], string)").unwrap();
    assert_eq!(sig.parameters(), ["int[,]", "string"]);
}

#[test]
fn test_display_renders_backtick_arity() {
    let sig = parse_signature("Foo.Bar<T,E>(T, E)").unwrap();
    assert_eq!(sig.to_string(), "Foo.Bar`2(T,E)");
}

#[test]
fn test_from_str_round_trip() {
    let sig: MethodSignature = "Foo.Bar(int)".parse().unwrap();
    assert_eq!(sig.to_string(), "Foo.Bar(int)");
}

#[test]
fn test_error_cases() {
    assert!(matches!(
        parse_signature(""),
        Err(SignatureParseError::Empty)
    ));
    assert!(matches!(
        parse_signature("Foo.Bar"),
        Err(SignatureParseError::MissingParameterList { .. })
    ));
    assert!(matches!(
        parse_signature("Foo.Bar(int"),
        Err(SignatureParseError::UnterminatedParameterList { .. })
    ));
    assert!(matches!(
        parse_signature("Bar(int)"),
        Err(SignatureParseError::MissingDeclaringType { .. })
    ));
    assert!(matches!(
        parse_signature("Foo.(int)"),
        Err(SignatureParseError::EmptyMethodName { .. })
    ));
    assert!(matches!(
        parse_signature("Foo..Bar(int)"),
        Err(SignatureParseError::EmptyTypeSegment { .. })
    ));
    assert!(matches!(
        parse_signature("Foo.Bar(List<int)"),
        Err(SignatureParseError::UnbalancedBrackets { .. })
    ));
}

#[test]
fn test_errors_never_yield_partial_signatures() {
    // A malformed tail must not leave a usable prefix behind.
    let result = parse_signature("Foo.Bar(int))");
    assert!(result.is_err());
}
