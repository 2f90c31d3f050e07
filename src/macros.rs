// Macros to make building argument lists for capability invocations more ergonomic

/// Builds a `Vec<Value>` from a list of expressions convertible into [crate::Value]
///
/// `args![]` is the empty argument list
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($v:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($v)),+]
    };
}

macro_rules! node_names {
    ($hierarchy:expr, $ids:expr) => {
        $ids.into_iter()
            .map(|id| $hierarchy.name_of(id).to_string())
            .collect::<Vec<String>>()
    };
}
