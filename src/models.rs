use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WGS84 point. Altitude is advisory and filled in lazily, usually by the
/// elevation provider or by a GPX track that carried it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
}

impl Coordinates {
    pub const LATITUDE: &'static str = "latitude";
    pub const LONGITUDE: &'static str = "longitude";
    pub const ALTITUDE: &'static str = "altitude";

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinates {
            latitude,
            longitude,
            altitude: None,
        }
    }

    pub fn with_altitude(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Coordinates {
            latitude,
            longitude,
            altitude: Some(altitude),
        }
    }
}

/// One point of a trail geometry, carrying the cumulative distance walked
/// from the trail start. The ordered sequence of these defines the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailCoordinates {
    pub coordinates: Coordinates,
    pub distance_from_trail_start: f64,
}

impl TrailCoordinates {
    pub const DISTANCE_FROM_TRAIL_START: &'static str = "distanceFromTrailStart";
}

/// A named point of interest on or near a trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub name: String,
    pub tags: Vec<String>,
    pub coordinates: Coordinates,
}

impl Position {
    pub const NAME: &'static str = "name";
    pub const TAGS: &'static str = "tags";
    pub const COORDINATES: &'static str = "coordinates";
}

/// GeoJSON LineString mirror of the trail geometry, persisted alongside it so
/// the store can keep a geospatial index on the line. Pairs are `[lon, lat]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoLineString {
    pub coordinates: Vec<[f64; 2]>,
}

impl GeoLineString {
    pub const TYPE: &'static str = "type";
    pub const COORDINATES: &'static str = "coordinates";
    pub const LINE_STRING: &'static str = "LineString";

    /// Derives the line from a trail geometry, which keeps it consistent
    /// with the coordinates it mirrors.
    pub fn from_trail_coordinates(coordinates: &[TrailCoordinates]) -> Self {
        GeoLineString {
            coordinates: coordinates
                .iter()
                .map(|c| [c.coordinates.longitude, c.coordinates.latitude])
                .collect(),
        }
    }
}

/// CAI-style trail difficulty classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrailClassification {
    /// Tourist walk.
    T,
    /// Hiking.
    E,
    /// Expert hikers.
    Ee,
    /// Expert hikers with equipment.
    Eea,
}

impl TrailClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrailClassification::T => "T",
            TrailClassification::E => "E",
            TrailClassification::Ee => "EE",
            TrailClassification::Eea => "EEA",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "T" => Some(TrailClassification::T),
            "E" => Some(TrailClassification::E),
            "EE" => Some(TrailClassification::Ee),
            "EEA" => Some(TrailClassification::Eea),
            _ => None,
        }
    }
}

/// Aggregated figures computed from the trail geometry at import time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsTrailMetadata {
    pub tot_rise: f64,
    pub tot_fall: f64,
    pub eta: f64,
    pub length: f64,
    pub highest_place: f64,
    pub lowest_place: f64,
}

impl StatsTrailMetadata {
    pub const TOT_RISE: &'static str = "totRise";
    pub const TOT_FALL: &'static str = "totFall";
    pub const ETA: &'static str = "eta";
    pub const LENGTH: &'static str = "length";
    pub const HIGHEST_PLACE: &'static str = "highestPlace";
    pub const LOWEST_PLACE: &'static str = "lowestPlace";
}

/// Reference to a media item (photo, document) attached to a trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedMedia {
    pub id: String,
    pub description: String,
}

impl LinkedMedia {
    pub const ID: &'static str = "id";
    pub const DESCRIPTION: &'static str = "description";
}

/// Aggregate root of the catalog. A trail exclusively owns its embedded
/// positions, geometry and media; `code` is unique within a country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    pub name: String,
    pub description: String,
    pub code: String,
    pub start_pos: Position,
    pub final_pos: Position,
    pub locations: Vec<Position>,
    pub coordinates: Vec<TrailCoordinates>,
    pub classification: TrailClassification,
    pub country: String,
    pub last_update: DateTime<Utc>,
    pub maintaining_section: String,
    pub stats_metadata: StatsTrailMetadata,
    pub geo_line: GeoLineString,
    pub media: Vec<LinkedMedia>,
}

impl Trail {
    pub const COLLECTION_NAME: &'static str = "core.Trail";

    pub const NAME: &'static str = "name";
    pub const DESCRIPTION: &'static str = "description";
    pub const CODE: &'static str = "code";
    pub const START_POS: &'static str = "startPos";
    pub const FINAL_POS: &'static str = "finalPos";
    pub const LOCATIONS: &'static str = "locations";
    pub const COORDINATES: &'static str = "coordinates";
    pub const CLASSIFICATION: &'static str = "classification";
    pub const COUNTRY: &'static str = "country";
    pub const LAST_UPDATE_DATE: &'static str = "lastUpdate";
    pub const SECTION_CARED_BY: &'static str = "maintainingSection";
    pub const STATS_METADATA: &'static str = "statsMetadata";
    pub const GEO_LINE: &'static str = "geoLine";
    pub const GEO_POINTS: &'static str = "geoPoints";
    pub const MEDIA: &'static str = "media";
}

/// Read-only projection of a trail, built from projected reads only. It never
/// carries the embedded geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailPreview {
    pub code: String,
    pub start_pos: Position,
    pub final_pos: Position,
    pub classification: TrailClassification,
    pub last_update: DateTime<Utc>,
}

/// Resolution state of an accessibility notification. The store encodes this
/// as presence/absence of the `resolution` field; the domain keeps it as an
/// explicit tagged state. The only transition is `Unresolved -> Resolved`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resolution {
    Unresolved,
    Resolved {
        resolution: String,
        resolution_date: DateTime<Utc>,
    },
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }
}

/// Report that a trail section is obstructed or otherwise inaccessible.
/// References its trail by `code` only; no cascade is implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityNotification {
    pub id: String,
    pub trail_code: String,
    pub description: String,
    pub report_date: DateTime<Utc>,
    pub state: Resolution,
}

impl AccessibilityNotification {
    pub const COLLECTION_NAME: &'static str = "core.AccessibilityNotifications";

    pub const OBJECT_ID: &'static str = "_id";
    pub const TRAIL_CODE: &'static str = "code";
    pub const DESCRIPTION: &'static str = "description";
    pub const REPORT_DATE: &'static str = "reportDate";
    pub const RESOLUTION: &'static str = "resolution";
    pub const RESOLUTION_DATE: &'static str = "resolutionDate";
}

/// Payload for reporting a new accessibility problem. The store assigns the
/// identifier on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationReport {
    pub trail_code: String,
    pub description: String,
    pub report_date: DateTime<Utc>,
}

/// Payload for resolving a previously reported problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationResolution {
    pub id: String,
    pub resolution: String,
    pub resolution_date: DateTime<Utc>,
}
