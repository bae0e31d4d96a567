//! Lazy, client-side image handles.
//!
//! Nothing in this module talks to the imagery platform. Each operation
//! returns a new handle wrapping a larger [`Expression`]; the graph is only
//! evaluated remotely when it is passed to a value computation or a task.
//!
//! ```rust
//! use geomean_core::{AssetId, Image, ImageCollection, ProjectId};
//!
//! let project = ProjectId::new("my-project")?;
//! let images = ["a", "b"]
//!     .into_iter()
//!     .map(|title| Image::load(&AssetId::new(&project, title)))
//!     .collect();
//!
//! let mean = ImageCollection::from_images(images).mean();
//! assert_eq!(mean.expression().function(), Some("ImageCollection.reduce"));
//! # Ok::<(), geomean_core::Error>(())
//! ```

mod expression;
mod region;

pub use expression::Expression;
pub use region::Region;

use crate::AssetId;

/// Handle to a (possibly derived) raster on the imagery platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    expression: Expression,
}

impl Image {
    /// Wraps an existing expression that evaluates to an image.
    pub fn from_expression(expression: Expression) -> Self {
        Self { expression }
    }

    /// References a stored image asset.
    pub fn load(asset: &AssetId) -> Self {
        Self::from_expression(Expression::invoke(
            "Image.load",
            [("id", Expression::constant(asset.as_str()))],
        ))
    }

    /// Returns the footprint geometry of this image.
    pub fn geometry(&self) -> Geometry {
        Geometry::from_expression(Expression::invoke(
            "Element.geometry",
            [("feature", self.expression.clone())],
        ))
    }

    /// Clips this image to `region` and resamples it to `scale` units per pixel.
    pub fn clip_to_bounds_and_scale(&self, region: &Region, scale: f64) -> Self {
        Self::from_expression(Expression::invoke(
            "Image.clipToBoundsAndScale",
            [
                ("input", self.expression.clone()),
                ("geometry", region.to_expression()),
                ("scale", Expression::constant(scale)),
            ],
        ))
    }

    /// Returns the asset id when this handle is a plain asset load.
    pub fn asset_id(&self) -> Option<&str> {
        if self.expression.function() != Some("Image.load") {
            return None;
        }

        self.expression
            .argument("id")
            .and_then(Expression::as_constant)
            .and_then(serde_json::Value::as_str)
    }

    /// Returns the underlying expression.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Consumes the handle, returning the underlying expression.
    pub fn into_expression(self) -> Expression {
        self.expression
    }
}

/// An ordered collection of image handles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageCollection {
    images: Vec<Image>,
}

impl ImageCollection {
    /// Creates a collection from a list of images.
    pub fn from_images(images: Vec<Image>) -> Self {
        Self { images }
    }

    /// Returns the number of images in the collection.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns whether the collection has no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Returns the images in the collection.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Returns the expression constructing this collection.
    pub fn to_expression(&self) -> Expression {
        let images = self
            .images
            .iter()
            .map(|image| image.expression.clone())
            .collect();

        Expression::invoke(
            "ImageCollection.fromImages",
            [("images", Expression::Array(images))],
        )
    }

    /// Reduces the collection to its pixel-wise mean.
    pub fn mean(&self) -> Image {
        Image::from_expression(Expression::invoke(
            "ImageCollection.reduce",
            [
                ("collection", self.to_expression()),
                ("reducer", Expression::invoke("Reducer.mean", Vec::<(String, Expression)>::new())),
            ],
        ))
    }
}

impl FromIterator<Image> for ImageCollection {
    fn from_iter<T: IntoIterator<Item = Image>>(iter: T) -> Self {
        Self::from_images(iter.into_iter().collect())
    }
}

/// Handle to a geometry derived from an image.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    expression: Expression,
}

impl Geometry {
    /// Wraps an existing expression that evaluates to a geometry.
    pub fn from_expression(expression: Expression) -> Self {
        Self { expression }
    }

    /// Returns the bounding rectangle of this geometry.
    pub fn bounds(&self) -> Geometry {
        Self::from_expression(Expression::invoke(
            "Geometry.bounds",
            [("geometry", self.expression.clone())],
        ))
    }

    /// Returns the underlying expression.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}
