//! Geographic regions returned by bounds computations.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Expression;
use crate::{Error, Result};

/// A polygon given as a list of linear rings of `[x, y]` positions.
///
/// The first ring is the exterior; any further rings are holes. This is the
/// `coordinates` member of a GeoJSON `Polygon`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region {
    rings: Vec<Vec<[f64; 2]>>,
}

/// GeoJSON geometry as returned by a value computation.
#[derive(Debug, Deserialize)]
struct GeoJsonGeometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: serde_json::Value,
}

impl Region {
    /// Creates a region from polygon rings.
    pub fn new(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Self { rings }
    }

    /// Creates a rectangular region from its corner coordinates.
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(vec![vec![
            [min_x, min_y],
            [max_x, min_y],
            [max_x, max_y],
            [min_x, max_y],
            [min_x, min_y],
        ]])
    }

    /// Parses the `coordinates` of a GeoJSON `Polygon` value.
    pub fn from_geojson(value: serde_json::Value) -> Result<Self> {
        let geometry: GeoJsonGeometry = serde_json::from_value(value)?;

        if geometry.kind != "Polygon" {
            return Err(Error::serialization()
                .with_message("bounds must be a Polygon")
                .with_context(geometry.kind));
        }

        let rings: Vec<Vec<[f64; 2]>> = serde_json::from_value(geometry.coordinates)?;
        if rings.first().is_none_or(Vec::is_empty) {
            return Err(Error::serialization().with_message("bounds polygon has no exterior ring"));
        }

        Ok(Self::new(rings))
    }

    /// Returns the polygon rings.
    pub fn rings(&self) -> &[Vec<[f64; 2]>] {
        &self.rings
    }

    /// Returns the expression that constructs this region as a geometry.
    pub fn to_expression(&self) -> Expression {
        Expression::invoke(
            "GeometryConstructors.Polygon",
            [
                ("coordinates", Expression::constant(json!(self.rings))),
                ("evenOdd", Expression::constant(true)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_polygon_geojson() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
        });

        let region = Region::from_geojson(value).unwrap();
        assert_eq!(region, Region::rectangle(0.0, 0.0, 1.0, 1.0));
        assert_eq!(region.rings()[0].len(), 5);
    }

    #[test]
    fn rejects_non_polygon_geometry() {
        let value = json!({ "type": "Point", "coordinates": [0.0, 0.0] });
        assert!(Region::from_geojson(value).is_err());
    }

    #[test]
    fn rejects_empty_polygon() {
        let value = json!({ "type": "Polygon", "coordinates": [] });
        assert!(Region::from_geojson(value).is_err());
    }

    #[test]
    fn expression_embeds_coordinates() {
        let region = Region::rectangle(-1.0, -2.0, 3.0, 4.0);
        let expr = region.to_expression();

        assert_eq!(expr.function(), Some("GeometryConstructors.Polygon"));
        let coordinates = expr
            .argument("coordinates")
            .and_then(Expression::as_constant)
            .unwrap();
        assert_eq!(coordinates[0][2], json!([3.0, 4.0]));
    }
}
