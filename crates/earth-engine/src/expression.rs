//! Expression graphs for the imagery service.
//!
//! Computations are described as a tree of constant values and function
//! invocations which the service evaluates server-side. Only the functions
//! this application needs are exposed.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use terra_common::{BoundingBox, DateWindow};

/// Property holding an image's acquisition time.
const TIME_START_PROPERTY: &str = "system:time_start";

/// One node of an expression graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueNode {
    ConstantValue(Value),
    FunctionInvocationValue(FunctionInvocation),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInvocation {
    pub function_name: String,
    pub arguments: BTreeMap<String, ValueNode>,
}

impl ValueNode {
    pub fn constant(value: impl Into<Value>) -> Self {
        ValueNode::ConstantValue(value.into())
    }

    pub fn invoke<'a>(
        function_name: &str,
        arguments: impl IntoIterator<Item = (&'a str, ValueNode)>,
    ) -> Self {
        ValueNode::FunctionInvocationValue(FunctionInvocation {
            function_name: function_name.to_string(),
            arguments: arguments
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        })
    }

    /// Name of the invoked function, if this node is an invocation.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            ValueNode::FunctionInvocationValue(f) => Some(&f.function_name),
            _ => None,
        }
    }

    /// Argument of an invocation node.
    pub fn argument(&self, name: &str) -> Option<&ValueNode> {
        match self {
            ValueNode::FunctionInvocationValue(f) => f.arguments.get(name),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Functions used by the gateway
    // ------------------------------------------------------------------

    pub fn image_load(id: &str) -> Self {
        Self::invoke("Image.load", [("id", Self::constant(id))])
    }

    pub fn image_constant(value: f64) -> Self {
        Self::invoke("Image.constant", [("value", Self::constant(value))])
    }

    pub fn image_collection_load(id: &str) -> Self {
        Self::invoke("ImageCollection.load", [("id", Self::constant(id))])
    }

    /// Keep the images whose acquisition time falls in `[start, end)`.
    pub fn filter_date(collection: ValueNode, window: &DateWindow) -> Self {
        let range = Self::invoke(
            "DateRange",
            [
                ("start", Self::constant(window.start_str())),
                ("end", Self::constant(window.end_str())),
            ],
        );
        let filter = Self::invoke(
            "Filter.dateRangeContains",
            [
                ("leftValue", range),
                ("rightField", Self::constant(TIME_START_PROPERTY)),
            ],
        );
        Self::invoke(
            "Collection.filter",
            [("collection", collection), ("filter", filter)],
        )
    }

    pub fn collection_size(collection: ValueNode) -> Self {
        Self::invoke("Collection.size", [("collection", collection)])
    }

    pub fn collection_first(collection: ValueNode) -> Self {
        Self::invoke("Collection.first", [("collection", collection)])
    }

    pub fn select(image: ValueNode, band: &str) -> Self {
        Self::invoke(
            "Image.select",
            [
                ("input", image),
                ("bandSelectors", Self::constant(vec![band])),
            ],
        )
    }

    pub fn rectangle(bbox: &BoundingBox) -> Self {
        Self::invoke(
            "GeometryConstructors.Rectangle",
            [
                ("coordinates", Self::constant(bbox.as_array().to_vec())),
                ("geodesic", Self::constant(false)),
            ],
        )
    }

    /// Clip to `region` and rescale to `width` x `height` pixels.
    pub fn clip_to_bounds_and_scale(image: ValueNode, region: &BoundingBox, width: u32, height: u32) -> Self {
        Self::invoke(
            "Image.clipToBoundsAndScale",
            [
                ("input", image),
                ("geometry", Self::rectangle(region)),
                ("width", Self::constant(width)),
                ("height", Self::constant(height)),
            ],
        )
    }

    /// Map band values to display colors.
    pub fn visualize(image: ValueNode, min: f64, max: f64, palette: &[String], gamma: Option<f64>) -> Self {
        let mut arguments = vec![
            ("image", image),
            ("min", Self::constant(min)),
            ("max", Self::constant(max)),
        ];
        if !palette.is_empty() {
            arguments.push(("palette", Self::constant(palette.to_vec())));
        }
        if let Some(gamma) = gamma {
            arguments.push(("gamma", Self::constant(gamma)));
        }
        Self::invoke("Image.visualize", arguments)
    }
}

/// A complete expression: a table of named values and the one to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub result: String,
    pub values: BTreeMap<String, ValueNode>,
}

impl Expression {
    pub fn new(root: ValueNode) -> Self {
        let mut values = BTreeMap::new();
        values.insert("0".to_string(), root);
        Self {
            result: "0".to_string(),
            values,
        }
    }

    /// The node the expression evaluates to.
    pub fn root(&self) -> Option<&ValueNode> {
        self.values.get(&self.result)
    }
}
