//! Earth Engine `Expression` graphs.

use std::collections::BTreeMap;

use geomean_core::Expression;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key of the single root value in encoded expressions.
const ROOT: &str = "0";

/// A serialized computation graph.
///
/// `values` maps node names to nodes and `result` names the root. Encoded
/// graphs are trees rooted at a single value; shared subgraphs are inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EeExpression {
    /// Name of the node holding the result.
    pub result: String,
    /// Named nodes of the graph.
    pub values: BTreeMap<String, ValueNode>,
}

impl From<&Expression> for EeExpression {
    fn from(expression: &Expression) -> Self {
        Self {
            result: ROOT.to_owned(),
            values: BTreeMap::from([(ROOT.to_owned(), ValueNode::from(expression))]),
        }
    }
}

/// One node of an [`EeExpression`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueNode {
    /// A literal JSON value.
    ConstantValue(Value),
    /// A list of nodes.
    ArrayValue {
        /// Elements of the list.
        values: Vec<ValueNode>,
    },
    /// A call of an API function.
    FunctionInvocationValue {
        /// Fully qualified function name.
        #[serde(rename = "functionName")]
        function_name: String,
        /// Named arguments.
        arguments: BTreeMap<String, ValueNode>,
    },
}

impl From<&Expression> for ValueNode {
    fn from(expression: &Expression) -> Self {
        match expression {
            Expression::Constant(value) => Self::ConstantValue(value.clone()),
            Expression::Array(values) => Self::ArrayValue {
                values: values.iter().map(Self::from).collect(),
            },
            Expression::Invocation {
                function,
                arguments,
            } => Self::FunctionInvocationValue {
                function_name: function.clone(),
                arguments: arguments
                    .iter()
                    .map(|(name, value)| (name.clone(), Self::from(value)))
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use geomean_core::{AssetId, Image, ImageCollection, ProjectId};
    use serde_json::json;

    use super::*;

    #[test]
    fn encodes_mean_of_loaded_assets() {
        let project = ProjectId::new("p").unwrap();
        let mean = ImageCollection::from_images(vec![Image::load(&AssetId::new(&project, "a"))]).mean();

        let encoded = serde_json::to_value(EeExpression::from(mean.expression())).unwrap();
        assert_eq!(
            encoded,
            json!({
                "result": "0",
                "values": {
                    "0": {
                        "functionInvocationValue": {
                            "functionName": "ImageCollection.reduce",
                            "arguments": {
                                "collection": {
                                    "functionInvocationValue": {
                                        "functionName": "ImageCollection.fromImages",
                                        "arguments": {
                                            "images": {
                                                "arrayValue": {
                                                    "values": [{
                                                        "functionInvocationValue": {
                                                            "functionName": "Image.load",
                                                            "arguments": {
                                                                "id": { "constantValue": "projects/p/assets/a" }
                                                            }
                                                        }
                                                    }]
                                                }
                                            }
                                        }
                                    }
                                },
                                "reducer": {
                                    "functionInvocationValue": {
                                        "functionName": "Reducer.mean",
                                        "arguments": {}
                                    }
                                }
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn decodes_what_it_encodes() {
        let project = ProjectId::new("p").unwrap();
        let bounds = Image::load(&AssetId::new(&project, "a")).geometry().bounds();
        let encoded = EeExpression::from(bounds.expression());

        let decoded: EeExpression =
            serde_json::from_str(&serde_json::to_string(&encoded).unwrap()).unwrap();
        assert_eq!(decoded, encoded);
    }
}
