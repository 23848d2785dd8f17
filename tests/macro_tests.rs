use serde_conformance::{value, Number, Value, ValueMap};

#[test]
fn test_value_macro_null() {
    let value = value!(null);
    assert_eq!(value, Value::Null);
}

#[test]
fn test_value_macro_booleans() {
    assert_eq!(value!(true), Value::Bool(true));
    assert_eq!(value!(false), Value::Bool(false));
}

#[test]
fn test_value_macro_numbers() {
    assert_eq!(value!(42), Value::Number(Number::Integer(42)));
    assert_eq!(value!(3.5), Value::Number(Number::Float(3.5)));
    assert_eq!(value!(-123), Value::Number(Number::Integer(-123)));
    assert_eq!(value!(u64::MAX), Value::Number(Number::Unsigned(u64::MAX)));
    assert_eq!(value!(f64::NAN), Value::Number(Number::NaN));
    assert_eq!(value!(f64::NEG_INFINITY), Value::Number(Number::NegativeInfinity));
}

#[test]
fn test_value_macro_strings() {
    assert_eq!(value!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(value!(""), Value::String(String::new()));
}

#[test]
fn test_value_macro_expressions() {
    let missing: Option<i32> = None;
    assert_eq!(value!(missing), Value::Null);
    assert_eq!(value!(Some("x")), Value::String("x".to_string()));

    let n = 7;
    assert_eq!(value!([(n), (n * 2)]), Value::Array(vec![Value::from(7), Value::from(14)]));
}

#[test]
fn test_value_macro_arrays() {
    assert_eq!(value!([]), Value::Array(vec![]));

    let mixed = value!([1, "hello", true, null, [], {}]);
    assert_eq!(
        mixed,
        Value::Array(vec![
            Value::Number(Number::Integer(1)),
            Value::String("hello".to_string()),
            Value::Bool(true),
            Value::Null,
            Value::Array(vec![]),
            Value::Object(ValueMap::new()),
        ])
    );
}

#[test]
fn test_value_macro_nested() {
    let nested = value!({
        "user": {
            "id": 123,
            "name": "Bob",
            "nickname": null
        },
        "tags": ["admin", "developer"],
        "count": 42
    });

    let obj = nested.as_object().expect("object");
    let keys: Vec<_> = obj.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["user", "tags", "count"]);

    let user = obj.get("user").and_then(Value::as_object).expect("user object");
    assert_eq!(user.get("id"), Some(&Value::Number(Number::Integer(123))));
    assert_eq!(user.get("nickname"), Some(&Value::Null));

    let tags = obj.get("tags").and_then(Value::as_array).expect("tags array");
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[1].as_str(), Some("developer"));

    assert!(nested.contains_null());
    assert!(!value!({ "count": 0 }).contains_null());
}

#[test]
fn test_value_methods() {
    let null_val = value!(null);
    assert!(null_val.is_null());
    assert!(!null_val.is_array());
    assert!(!null_val.is_object());
    assert!(!null_val.is_zero_value());
    assert_eq!(null_val.type_name(), "null");

    assert_eq!(value!(true).as_bool(), Some(true));
    assert_eq!(value!(1).type_name(), "integer");
    assert_eq!(value!(1.0).type_name(), "float");
    assert_eq!(Value::Enum("Green".to_string()).as_str(), Some("Green"));

    for zero in [value!(0), value!(0.0), value!(""), value!(false), value!([]), value!({})] {
        assert!(zero.is_zero_value(), "{}", zero);
    }
    assert!(!value!(-0.5).is_zero_value());
}

#[test]
fn test_value_display() {
    let v = value!({ "name": "Ada", "scores": [1, 2.5], "note": null });
    assert_eq!(v.to_string(), r#"{"name": "Ada", "scores": [1, 2.5], "note": null}"#);
    assert_eq!(value!(f64::INFINITY).to_string(), "Infinity");
}
