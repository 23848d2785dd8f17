/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// ```rust
/// use serde_conformance::{value, Value};
///
/// let v = value!({ "flag": true, "items": [1, 2], "note": null });
/// assert_eq!(v.as_object().map(|o| o.len()), Some(3));
/// assert_eq!(value!(null), Value::Null);
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::ValueMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::ValueMap::new();
        $(
            object.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::Object(object)
    }};

    // Anything else converts through `From`.
    ($other:expr) => {
        $crate::Value::from($other)
    };
}
