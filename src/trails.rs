//! Trail repository: filter and proximity queries over the trail collection.

use bson::{doc, Document};
use mongodb::options::{FindOptions, ReplaceOptions};
use mongodb::sync::{Collection, Cursor};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::mapper::DocMapper;
use crate::models::{Trail, TrailPreview};
use crate::Datasource;

/// Max number of documents returned per listing request.
pub const RESULT_LIMIT: i64 = 150;

/// Dotted path to the indexed start-position point.
const START_POS_COORDINATES: &str = "startPos.coordinates";
/// Dotted path to the indexed per-point geometry.
const GEO_POINTS_COORDINATES: &str = "geoPoints.coordinates";

const NEAR: &str = "$near";
const MIN_DISTANCE: &str = "$minDistance";
const MAX_DISTANCE: &str = "$maxDistance";
const GEO_NEAR: &str = "$geoNear";
const LIMIT_STAGE: &str = "$limit";

pub struct TrailDao {
    collection: Collection<Document>,
}

impl TrailDao {
    pub fn new(datasource: &Datasource) -> Self {
        TrailDao {
            collection: datasource.collection(Trail::COLLECTION_NAME),
        }
    }

    /// Exact lookup; `code` is unique within a country, but a duplicate in
    /// the store still yields the first match rather than a failure.
    pub fn get_by_code_and_country(&self, code: &str, country: &str) -> Result<Trail> {
        let filter = doc! { Trail::COUNTRY: country, Trail::CODE: code };
        let options = FindOptions::builder().limit(1).build();
        let cursor = self.collection.find(filter, options)?;
        to_trails(cursor)?.into_iter().next().ok_or(Error::NotFound)
    }

    pub fn get_by_code(&self, code: &str) -> Result<Vec<Trail>> {
        let cursor = self.collection.find(doc! { Trail::CODE: code }, None)?;
        to_trails(cursor)
    }

    /// Trails whose start position lies within `meters` of the given point,
    /// nearest first (index order), capped at `limit` (at most
    /// [`RESULT_LIMIT`]).
    pub fn find_near_start_by_distance(
        &self,
        longitude: f64,
        latitude: f64,
        meters: f64,
        limit: i64,
    ) -> Result<Vec<Trail>> {
        debug!(longitude, latitude, meters, limit, "near-start query");
        let options = FindOptions::builder().limit(capped(limit)).build();
        let cursor = self
            .collection
            .find(near_start_filter(longitude, latitude, meters), options)?;
        to_trails(cursor)
    }

    /// Trails with any path point within `meters` of the given point. The
    /// store annotates distance and matched location and deduplicates per
    /// trail; results come back nearest first, capped at `limit` (at most
    /// [`RESULT_LIMIT`]).
    pub fn find_near_any_point(
        &self,
        longitude: f64,
        latitude: f64,
        meters: f64,
        limit: i64,
    ) -> Result<Vec<Trail>> {
        debug!(longitude, latitude, meters, limit, "any-point geo query");
        let pipeline = geo_near_pipeline(longitude, latitude, meters, capped(limit));
        let cursor = self.collection.aggregate(pipeline, None)?;
        to_trails(cursor)
    }

    /// Unfiltered listing, bounded by [`RESULT_LIMIT`]. A light listing
    /// elides the embedded geometry at the store, so those trails come back
    /// with empty coordinate arrays.
    pub fn get_trails(&self, light: bool, limit: i64) -> Result<Vec<Trail>> {
        let projection = if light { Some(light_projection()) } else { None };
        let options = FindOptions::builder()
            .limit(capped(limit))
            .projection(projection)
            .build();
        let cursor = self.collection.find(None, options)?;
        to_trails(cursor)
    }

    /// Replace-or-insert keyed by `code`. Last writer wins; the store's
    /// replace-with-upsert primitive is the only serialization.
    pub fn upsert(&self, trail: &Trail) -> Result<()> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection
            .replace_one(doc! { Trail::CODE: trail.code.as_str() }, trail.to_doc(), options)?;
        info!(code = %trail.code, "trail upserted");
        Ok(())
    }

    /// Reports whether a document was actually removed.
    pub fn delete(&self, code: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { Trail::CODE: code }, None)?;
        info!(code, deleted = result.deleted_count, "trail delete");
        Ok(result.deleted_count > 0)
    }

    pub fn get_all_previews(&self) -> Result<Vec<TrailPreview>> {
        let options = FindOptions::builder()
            .projection(preview_projection())
            .build();
        let cursor = self.collection.find(None, options)?;
        to_previews(cursor)
    }

    pub fn preview_by_code(&self, code: &str) -> Result<Vec<TrailPreview>> {
        let options = FindOptions::builder()
            .projection(preview_projection())
            .build();
        let cursor = self.collection.find(doc! { Trail::CODE: code }, options)?;
        to_previews(cursor)
    }
}

fn to_trails(cursor: Cursor<Document>) -> Result<Vec<Trail>> {
    let mut trails = Vec::new();
    for doc in cursor {
        trails.push(Trail::from_doc(&doc?)?);
    }
    Ok(trails)
}

fn to_previews(cursor: Cursor<Document>) -> Result<Vec<TrailPreview>> {
    let mut previews = Vec::new();
    for doc in cursor {
        previews.push(TrailPreview::from_doc(&doc?)?);
    }
    Ok(previews)
}

/// A stored limit of 0 means unlimited, so non-positive requests get the
/// full page bound instead of an unbounded read.
fn capped(limit: i64) -> i64 {
    if (1..=RESULT_LIMIT).contains(&limit) {
        limit
    } else {
        RESULT_LIMIT
    }
}

fn near_start_filter(longitude: f64, latitude: f64, meters: f64) -> Document {
    doc! {
        START_POS_COORDINATES: {
            NEAR: { "coordinates": [longitude, latitude] },
            MIN_DISTANCE: 0,
            MAX_DISTANCE: meters,
        }
    }
}

fn geo_near_pipeline(longitude: f64, latitude: f64, meters: f64, limit: i64) -> Vec<Document> {
    vec![
        doc! {
            GEO_NEAR: {
                "near": { "type": "Point", "coordinates": [longitude, latitude] },
                "distanceField": "distanceToIt",
                "key": GEO_POINTS_COORDINATES,
                "includeLocs": "closestLocation",
                "maxDistance": meters,
                "spherical": true,
                "uniqueDocs": true,
            }
        },
        doc! { LIMIT_STAGE: limit },
    ]
}

fn preview_projection() -> Document {
    doc! {
        Trail::CODE: 1,
        Trail::START_POS: 1,
        Trail::FINAL_POS: 1,
        Trail::CLASSIFICATION: 1,
        Trail::LAST_UPDATE_DATE: 1,
    }
}

fn light_projection() -> Document {
    doc! {
        Trail::COORDINATES: 0,
        Trail::GEO_POINTS: 0,
        Trail::GEO_LINE: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;

    #[test]
    fn dotted_paths_match_the_field_constants() {
        assert_eq!(
            START_POS_COORDINATES,
            format!("{}.{}", Trail::START_POS, Position::COORDINATES)
        );
        assert_eq!(
            GEO_POINTS_COORDINATES,
            format!("{}.{}", Trail::GEO_POINTS, Position::COORDINATES)
        );
    }

    #[test]
    fn near_start_filter_bounds_the_radius() {
        let filter = near_start_filter(11.34, 44.49, 500.0);
        let near = filter.get_document(START_POS_COORDINATES).unwrap();
        let point = near.get_document(NEAR).unwrap();
        let pair = point.get_array("coordinates").unwrap();
        assert_eq!(pair[0].as_f64().unwrap(), 11.34);
        assert_eq!(pair[1].as_f64().unwrap(), 44.49);
        assert_eq!(near.get_i32(MIN_DISTANCE).unwrap(), 0);
        assert_eq!(near.get_f64(MAX_DISTANCE).unwrap(), 500.0);
    }

    #[test]
    fn geo_near_pipeline_selects_then_limits() {
        let pipeline = geo_near_pipeline(11.34, 44.49, 1200.0, 10);
        assert_eq!(pipeline.len(), 2);

        let stage = pipeline[0].get_document(GEO_NEAR).unwrap();
        let near = stage.get_document("near").unwrap();
        assert_eq!(near.get_str("type").unwrap(), "Point");
        assert_eq!(stage.get_str("key").unwrap(), GEO_POINTS_COORDINATES);
        assert_eq!(stage.get_str("distanceField").unwrap(), "distanceToIt");
        assert_eq!(stage.get_str("includeLocs").unwrap(), "closestLocation");
        assert_eq!(stage.get_f64("maxDistance").unwrap(), 1200.0);
        assert!(stage.get_bool("spherical").unwrap());
        assert!(stage.get_bool("uniqueDocs").unwrap());

        assert_eq!(pipeline[1].get_i64(LIMIT_STAGE).unwrap(), 10);
    }

    #[test]
    fn preview_projection_fetches_preview_fields_only() {
        let projection = preview_projection();
        assert_eq!(projection.len(), 5);
        assert!(!projection.contains_key(Trail::COORDINATES));
        assert!(!projection.contains_key(Trail::GEO_LINE));
    }

    #[test]
    fn light_projection_elides_the_geometry() {
        let projection = light_projection();
        assert_eq!(projection.get_i32(Trail::COORDINATES).unwrap(), 0);
        assert_eq!(projection.get_i32(Trail::GEO_POINTS).unwrap(), 0);
        assert_eq!(projection.get_i32(Trail::GEO_LINE).unwrap(), 0);
    }

    #[test]
    fn listings_never_exceed_the_page_bound() {
        assert_eq!(capped(20), 20);
        assert_eq!(capped(RESULT_LIMIT), RESULT_LIMIT);
        assert_eq!(capped(4000), RESULT_LIMIT);
    }

    #[test]
    fn degenerate_limits_never_request_an_unbounded_page() {
        // A limit of 0 in the store means no limit at all.
        assert_eq!(capped(0), RESULT_LIMIT);
        assert_eq!(capped(-1), RESULT_LIMIT);
    }
}
