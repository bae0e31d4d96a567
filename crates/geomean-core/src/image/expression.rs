//! Platform-neutral expression graph backing lazy image handles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node in a deferred computation graph.
///
/// Expressions are built client-side and only evaluated once a platform is
/// asked to compute a value or start a task that references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// A literal JSON value.
    Constant(Value),
    /// An ordered list of sub-expressions.
    Array(Vec<Expression>),
    /// A call of a named platform function with named arguments.
    Invocation {
        /// Fully qualified function name, e.g. `Image.load`.
        function: String,
        /// Named arguments, kept sorted for a stable encoding.
        arguments: BTreeMap<String, Expression>,
    },
}

impl Expression {
    /// Creates a constant expression.
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    /// Creates an invocation of `function` with the given named arguments.
    pub fn invoke<I, K>(function: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = (K, Expression)>,
        K: Into<String>,
    {
        Self::Invocation {
            function: function.into(),
            arguments: arguments
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Returns the function name when this node is an invocation.
    pub fn function(&self) -> Option<&str> {
        match self {
            Self::Invocation { function, .. } => Some(function),
            _ => None,
        }
    }

    /// Returns a named argument when this node is an invocation.
    pub fn argument(&self, name: &str) -> Option<&Expression> {
        match self {
            Self::Invocation { arguments, .. } => arguments.get(name),
            _ => None,
        }
    }

    /// Returns the literal when this node is a constant.
    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Self::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the elements when this node is an array.
    pub fn as_array(&self) -> Option<&[Expression]> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn invoke_collects_sorted_arguments() {
        let expr = Expression::invoke(
            "Image.clipToBoundsAndScale",
            [
                ("scale", Expression::constant(30.0)),
                ("input", Expression::constant("x")),
            ],
        );

        assert_eq!(expr.function(), Some("Image.clipToBoundsAndScale"));
        assert_eq!(
            expr.argument("scale").and_then(Expression::as_constant),
            Some(&json!(30.0))
        );

        let Expression::Invocation { arguments, .. } = &expr else {
            panic!("expected invocation");
        };
        let names: Vec<_> = arguments.keys().map(String::as_str).collect();
        assert_eq!(names, ["input", "scale"]);
    }

    #[test]
    fn accessors_return_none_for_other_variants() {
        let constant = Expression::constant(1);
        assert!(constant.function().is_none());
        assert!(constant.argument("x").is_none());
        assert!(constant.as_array().is_none());

        let array = Expression::Array(vec![constant.clone()]);
        assert_eq!(array.as_array().map(<[_]>::len), Some(1));
        assert!(array.as_constant().is_none());
    }
}
