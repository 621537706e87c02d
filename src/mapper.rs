//! Document<->domain mapping.
//!
//! The field-name constants on the model types are the persisted-layout
//! contract; nothing here validates domain invariants. Well-formed records
//! always map, missing optional fields map to empty/absent, and anything
//! else surfaces as a `MappingError` naming the offending field.

use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    AccessibilityNotification, Coordinates, GeoLineString, LinkedMedia, Position, Resolution,
    StatsTrailMetadata, Trail, TrailClassification, TrailCoordinates, TrailPreview,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("missing required field '{0}'")]
    MissingField(String),
    #[error("field '{0}' has an unexpected type")]
    WrongType(String),
    #[error("field '{field}' holds unknown value '{value}'")]
    UnknownValue { field: String, value: String },
}

/// Bidirectional mapping between a domain entity and its stored document.
///
/// `from_doc(to_doc(e))` must equal `e` for every entity, store-generated
/// fields excepted (`geoPoints` on trails is derived on write and never read
/// back). The store keeps dates at millisecond precision, so entities must be
/// stamped with millisecond-precision timestamps; [`stored_now`] provides
/// one.
pub trait DocMapper: Sized {
    fn to_doc(&self) -> Document;
    fn from_doc(doc: &Document) -> Result<Self, MappingError>;
}

/// Current instant truncated to the millisecond precision the store keeps,
/// so a freshly stamped entity survives the document round trip unchanged.
pub fn stored_now() -> DateTime<Utc> {
    bson::DateTime::now().to_chrono()
}

fn req_str(doc: &Document, field: &str) -> Result<String, MappingError> {
    match doc.get(field) {
        Some(Bson::String(s)) => Ok(s.clone()),
        Some(_) => Err(MappingError::WrongType(field.to_string())),
        None => Err(MappingError::MissingField(field.to_string())),
    }
}

fn number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

fn req_f64(doc: &Document, field: &str) -> Result<f64, MappingError> {
    match doc.get(field) {
        Some(value) => number(value).ok_or_else(|| MappingError::WrongType(field.to_string())),
        None => Err(MappingError::MissingField(field.to_string())),
    }
}

fn opt_f64(doc: &Document, field: &str) -> Result<Option<f64>, MappingError> {
    match doc.get(field) {
        None | Some(Bson::Null) => Ok(None),
        Some(value) => number(value)
            .map(Some)
            .ok_or_else(|| MappingError::WrongType(field.to_string())),
    }
}

fn req_date(doc: &Document, field: &str) -> Result<DateTime<Utc>, MappingError> {
    match doc.get(field) {
        Some(Bson::DateTime(dt)) => Ok(dt.to_chrono()),
        Some(_) => Err(MappingError::WrongType(field.to_string())),
        None => Err(MappingError::MissingField(field.to_string())),
    }
}

fn req_doc<'a>(doc: &'a Document, field: &str) -> Result<&'a Document, MappingError> {
    match doc.get(field) {
        Some(Bson::Document(d)) => Ok(d),
        Some(_) => Err(MappingError::WrongType(field.to_string())),
        None => Err(MappingError::MissingField(field.to_string())),
    }
}

/// Absent array -> empty; present array must hold strings.
fn opt_string_array(doc: &Document, field: &str) -> Result<Vec<String>, MappingError> {
    match doc.get(field) {
        None | Some(Bson::Null) => Ok(Vec::new()),
        Some(Bson::Array(items)) => items
            .iter()
            .map(|item| match item {
                Bson::String(s) => Ok(s.clone()),
                _ => Err(MappingError::WrongType(field.to_string())),
            })
            .collect(),
        Some(_) => Err(MappingError::WrongType(field.to_string())),
    }
}

/// Absent array -> empty; present array elements are mapped with `map`.
fn opt_mapped_array<T>(
    doc: &Document,
    field: &str,
    map: impl Fn(&Document) -> Result<T, MappingError>,
) -> Result<Vec<T>, MappingError> {
    match doc.get(field) {
        None | Some(Bson::Null) => Ok(Vec::new()),
        Some(Bson::Array(items)) => items
            .iter()
            .map(|item| match item {
                Bson::Document(d) => map(d),
                _ => Err(MappingError::WrongType(field.to_string())),
            })
            .collect(),
        Some(_) => Err(MappingError::WrongType(field.to_string())),
    }
}

impl DocMapper for Coordinates {
    fn to_doc(&self) -> Document {
        let mut doc = doc! {
            Coordinates::LATITUDE: self.latitude,
            Coordinates::LONGITUDE: self.longitude,
        };
        if let Some(altitude) = self.altitude {
            doc.insert(Coordinates::ALTITUDE, altitude);
        }
        doc
    }

    fn from_doc(doc: &Document) -> Result<Self, MappingError> {
        Ok(Coordinates {
            latitude: req_f64(doc, Coordinates::LATITUDE)?,
            longitude: req_f64(doc, Coordinates::LONGITUDE)?,
            altitude: opt_f64(doc, Coordinates::ALTITUDE)?,
        })
    }
}

impl DocMapper for TrailCoordinates {
    fn to_doc(&self) -> Document {
        let mut doc = self.coordinates.to_doc();
        doc.insert(
            TrailCoordinates::DISTANCE_FROM_TRAIL_START,
            self.distance_from_trail_start,
        );
        doc
    }

    fn from_doc(doc: &Document) -> Result<Self, MappingError> {
        Ok(TrailCoordinates {
            coordinates: Coordinates::from_doc(doc)?,
            distance_from_trail_start: req_f64(doc, TrailCoordinates::DISTANCE_FROM_TRAIL_START)?,
        })
    }
}

impl DocMapper for Position {
    fn to_doc(&self) -> Document {
        doc! {
            Position::NAME: self.name.as_str(),
            Position::TAGS: self.tags.clone(),
            Position::COORDINATES: self.coordinates.to_doc(),
        }
    }

    fn from_doc(doc: &Document) -> Result<Self, MappingError> {
        Ok(Position {
            name: req_str(doc, Position::NAME)?,
            tags: opt_string_array(doc, Position::TAGS)?,
            coordinates: Coordinates::from_doc(req_doc(doc, Position::COORDINATES)?)?,
        })
    }
}

impl DocMapper for GeoLineString {
    fn to_doc(&self) -> Document {
        doc! {
            GeoLineString::TYPE: GeoLineString::LINE_STRING,
            GeoLineString::COORDINATES: self
                .coordinates
                .iter()
                .map(|pair| Bson::Array(vec![Bson::Double(pair[0]), Bson::Double(pair[1])]))
                .collect::<Vec<_>>(),
        }
    }

    fn from_doc(doc: &Document) -> Result<Self, MappingError> {
        let kind = req_str(doc, GeoLineString::TYPE)?;
        if kind != GeoLineString::LINE_STRING {
            return Err(MappingError::UnknownValue {
                field: GeoLineString::TYPE.to_string(),
                value: kind,
            });
        }
        let pairs = match doc.get(GeoLineString::COORDINATES) {
            Some(Bson::Array(items)) => items,
            Some(_) => return Err(MappingError::WrongType(GeoLineString::COORDINATES.to_string())),
            None => return Err(MappingError::MissingField(GeoLineString::COORDINATES.to_string())),
        };
        let mut coordinates = Vec::with_capacity(pairs.len());
        for pair in pairs {
            match pair {
                Bson::Array(values) if values.len() == 2 => {
                    let lon = number(&values[0]);
                    let lat = number(&values[1]);
                    match (lon, lat) {
                        (Some(lon), Some(lat)) => coordinates.push([lon, lat]),
                        _ => {
                            return Err(MappingError::WrongType(
                                GeoLineString::COORDINATES.to_string(),
                            ))
                        }
                    }
                }
                _ => return Err(MappingError::WrongType(GeoLineString::COORDINATES.to_string())),
            }
        }
        Ok(GeoLineString { coordinates })
    }
}

impl DocMapper for StatsTrailMetadata {
    fn to_doc(&self) -> Document {
        doc! {
            StatsTrailMetadata::TOT_RISE: self.tot_rise,
            StatsTrailMetadata::TOT_FALL: self.tot_fall,
            StatsTrailMetadata::ETA: self.eta,
            StatsTrailMetadata::LENGTH: self.length,
            StatsTrailMetadata::HIGHEST_PLACE: self.highest_place,
            StatsTrailMetadata::LOWEST_PLACE: self.lowest_place,
        }
    }

    fn from_doc(doc: &Document) -> Result<Self, MappingError> {
        Ok(StatsTrailMetadata {
            tot_rise: req_f64(doc, StatsTrailMetadata::TOT_RISE)?,
            tot_fall: req_f64(doc, StatsTrailMetadata::TOT_FALL)?,
            eta: req_f64(doc, StatsTrailMetadata::ETA)?,
            length: req_f64(doc, StatsTrailMetadata::LENGTH)?,
            highest_place: req_f64(doc, StatsTrailMetadata::HIGHEST_PLACE)?,
            lowest_place: req_f64(doc, StatsTrailMetadata::LOWEST_PLACE)?,
        })
    }
}

impl DocMapper for LinkedMedia {
    fn to_doc(&self) -> Document {
        doc! {
            LinkedMedia::ID: self.id.as_str(),
            LinkedMedia::DESCRIPTION: self.description.as_str(),
        }
    }

    fn from_doc(doc: &Document) -> Result<Self, MappingError> {
        Ok(LinkedMedia {
            id: req_str(doc, LinkedMedia::ID)?,
            description: req_str(doc, LinkedMedia::DESCRIPTION)?,
        })
    }
}

fn classification_from(doc: &Document) -> Result<TrailClassification, MappingError> {
    let value = req_str(doc, Trail::CLASSIFICATION)?;
    TrailClassification::parse(&value).ok_or(MappingError::UnknownValue {
        field: Trail::CLASSIFICATION.to_string(),
        value,
    })
}

impl DocMapper for Trail {
    fn to_doc(&self) -> Document {
        // geoPoints is derived from the geometry on every write so the
        // 2dsphere index always covers the current path; it is never read
        // back into the domain.
        let geo_points: Vec<Document> = self
            .coordinates
            .iter()
            .map(|c| {
                doc! {
                    "type": "Point",
                    "coordinates": [c.coordinates.longitude, c.coordinates.latitude],
                }
            })
            .collect();
        doc! {
            Trail::NAME: self.name.as_str(),
            Trail::DESCRIPTION: self.description.as_str(),
            Trail::CODE: self.code.as_str(),
            Trail::START_POS: self.start_pos.to_doc(),
            Trail::FINAL_POS: self.final_pos.to_doc(),
            Trail::LOCATIONS: self.locations.iter().map(Position::to_doc).collect::<Vec<_>>(),
            Trail::COORDINATES: self.coordinates.iter().map(TrailCoordinates::to_doc).collect::<Vec<_>>(),
            Trail::CLASSIFICATION: self.classification.as_str(),
            Trail::COUNTRY: self.country.as_str(),
            Trail::LAST_UPDATE_DATE: bson::DateTime::from_chrono(self.last_update),
            Trail::SECTION_CARED_BY: self.maintaining_section.as_str(),
            Trail::STATS_METADATA: self.stats_metadata.to_doc(),
            Trail::GEO_LINE: self.geo_line.to_doc(),
            Trail::GEO_POINTS: geo_points,
            Trail::MEDIA: self.media.iter().map(LinkedMedia::to_doc).collect::<Vec<_>>(),
        }
    }

    fn from_doc(doc: &Document) -> Result<Self, MappingError> {
        // Geometry arrays and the geo line are absent on light/projected
        // reads and map to empty rather than failing.
        let geo_line = match doc.get(Trail::GEO_LINE) {
            None | Some(Bson::Null) => GeoLineString::default(),
            Some(Bson::Document(d)) => GeoLineString::from_doc(d)?,
            Some(_) => return Err(MappingError::WrongType(Trail::GEO_LINE.to_string())),
        };
        Ok(Trail {
            name: req_str(doc, Trail::NAME)?,
            description: req_str(doc, Trail::DESCRIPTION)?,
            code: req_str(doc, Trail::CODE)?,
            start_pos: Position::from_doc(req_doc(doc, Trail::START_POS)?)?,
            final_pos: Position::from_doc(req_doc(doc, Trail::FINAL_POS)?)?,
            locations: opt_mapped_array(doc, Trail::LOCATIONS, Position::from_doc)?,
            coordinates: opt_mapped_array(doc, Trail::COORDINATES, TrailCoordinates::from_doc)?,
            classification: classification_from(doc)?,
            country: req_str(doc, Trail::COUNTRY)?,
            last_update: req_date(doc, Trail::LAST_UPDATE_DATE)?,
            maintaining_section: req_str(doc, Trail::SECTION_CARED_BY)?,
            stats_metadata: StatsTrailMetadata::from_doc(req_doc(doc, Trail::STATS_METADATA)?)?,
            geo_line,
            media: opt_mapped_array(doc, Trail::MEDIA, LinkedMedia::from_doc)?,
        })
    }
}

impl TrailPreview {
    /// Previews come only from projected reads, so there is no document
    /// representation to write back.
    pub fn from_doc(doc: &Document) -> Result<Self, MappingError> {
        Ok(TrailPreview {
            code: req_str(doc, Trail::CODE)?,
            start_pos: Position::from_doc(req_doc(doc, Trail::START_POS)?)?,
            final_pos: Position::from_doc(req_doc(doc, Trail::FINAL_POS)?)?,
            classification: classification_from(doc)?,
            last_update: req_date(doc, Trail::LAST_UPDATE_DATE)?,
        })
    }
}

impl DocMapper for AccessibilityNotification {
    fn to_doc(&self) -> Document {
        let mut doc = doc! {
            AccessibilityNotification::OBJECT_ID: self.id.as_str(),
            AccessibilityNotification::TRAIL_CODE: self.trail_code.as_str(),
            AccessibilityNotification::DESCRIPTION: self.description.as_str(),
            AccessibilityNotification::REPORT_DATE: bson::DateTime::from_chrono(self.report_date),
        };
        // The store keeps resolution state as field presence; the resolved
        // variant is the only one that writes the sentinel fields.
        if let Resolution::Resolved {
            resolution,
            resolution_date,
        } = &self.state
        {
            doc.insert(AccessibilityNotification::RESOLUTION, resolution.as_str());
            doc.insert(
                AccessibilityNotification::RESOLUTION_DATE,
                bson::DateTime::from_chrono(*resolution_date),
            );
        }
        doc
    }

    fn from_doc(doc: &Document) -> Result<Self, MappingError> {
        let state = match doc.get(AccessibilityNotification::RESOLUTION) {
            None | Some(Bson::Null) => Resolution::Unresolved,
            Some(Bson::String(resolution)) => Resolution::Resolved {
                resolution: resolution.clone(),
                resolution_date: req_date(doc, AccessibilityNotification::RESOLUTION_DATE)?,
            },
            Some(_) => {
                return Err(MappingError::WrongType(
                    AccessibilityNotification::RESOLUTION.to_string(),
                ))
            }
        };
        Ok(AccessibilityNotification {
            id: req_str(doc, AccessibilityNotification::OBJECT_ID)?,
            trail_code: req_str(doc, AccessibilityNotification::TRAIL_CODE)?,
            description: req_str(doc, AccessibilityNotification::DESCRIPTION)?,
            report_date: req_date(doc, AccessibilityNotification::REPORT_DATE)?,
            state,
        })
    }
}
