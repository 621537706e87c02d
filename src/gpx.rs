//! GPX track reading for the import utilities.

use elementtree::Element;

use std::fs::File;
use std::io::prelude::*;

use crate::error::{Error, Result};
use crate::geo;
use crate::models::{Coordinates, TrailCoordinates};

const GPX_NS: &str = "http://www.topografix.com/GPX/1/1";

#[derive(Debug, Clone, PartialEq)]
pub struct GpxPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
}

pub fn read_whole_file(filename: &str) -> Result<String> {
    let mut file = File::open(filename)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Extracts the trackpoints of every segment of the first track, in file
/// order. Points without an elevation keep `None` there.
pub fn parse_gpx(gpx_data: &str) -> Result<Vec<GpxPoint>> {
    let root = Element::from_reader(gpx_data.as_bytes())
        .map_err(|e| Error::Gpx(format!("not parseable xml: {}", e)))?;
    let trk = root
        .find((GPX_NS, "trk"))
        .ok_or_else(|| Error::Gpx("no trk element".to_string()))?;

    let mut points = Vec::new();
    for trkseg in trk.find_all((GPX_NS, "trkseg")) {
        for trkpt in trkseg.find_all((GPX_NS, "trkpt")) {
            let latitude = required_attr(trkpt, "lat")?;
            let longitude = required_attr(trkpt, "lon")?;
            let elevation = match trkpt.find((GPX_NS, "ele")) {
                Some(ele) => Some(
                    ele.text()
                        .parse()
                        .map_err(|_| Error::Gpx(format!("bad ele value '{}'", ele.text())))?,
                ),
                None => None,
            };
            points.push(GpxPoint {
                latitude,
                longitude,
                elevation,
            });
        }
    }
    if points.is_empty() {
        return Err(Error::Gpx("track has no points".to_string()));
    }
    Ok(points)
}

/// Turns raw trackpoints into the trail geometry, accumulating the distance
/// walked from the start.
pub fn to_trail_coordinates(points: &[GpxPoint]) -> Vec<TrailCoordinates> {
    let mut walked = 0.0;
    let mut previous: Option<Coordinates> = None;
    points
        .iter()
        .map(|p| {
            let coordinates = Coordinates {
                latitude: p.latitude,
                longitude: p.longitude,
                altitude: p.elevation,
            };
            if let Some(prev) = &previous {
                walked += geo::distance_meters(prev, &coordinates);
            }
            previous = Some(coordinates.clone());
            TrailCoordinates {
                coordinates,
                distance_from_trail_start: walked,
            }
        })
        .collect()
}

fn required_attr(trkpt: &Element, name: &str) -> Result<f64> {
    trkpt
        .get_attr(name)
        .ok_or_else(|| Error::Gpx(format!("trkpt without {}", name)))?
        .parse()
        .map_err(|_| Error::Gpx(format!("bad {} value", name)))
}
