//! Spatial and temporal extents used by the global map and date filters.

use crate::error::{PortalError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A geographic bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundingBoxFields")]
pub struct BoundingBox {
    /// Westernmost longitude.
    pub west: f64,
    /// Southernmost latitude.
    pub south: f64,
    /// Easternmost longitude.
    pub east: f64,
    /// Northernmost latitude.
    pub north: f64,
}

impl BoundingBox {
    /// Create a validated bounding box.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self> {
        let bbox = Self {
            west,
            south,
            east,
            north,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    fn validate(&self) -> Result<()> {
        let lat_ok = |v: f64| (-90.0..=90.0).contains(&v);
        let lon_ok = |v: f64| (-180.0..=180.0).contains(&v);

        if !lat_ok(self.south) || !lat_ok(self.north) {
            return Err(PortalError::InvalidBoundingBox(format!(
                "latitude out of range in {}",
                self
            )));
        }
        if !lon_ok(self.west) || !lon_ok(self.east) {
            return Err(PortalError::InvalidBoundingBox(format!(
                "longitude out of range in {}",
                self
            )));
        }
        if self.south > self.north {
            return Err(PortalError::InvalidBoundingBox(format!(
                "south above north in {}",
                self
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct BoundingBoxFields {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl TryFrom<BoundingBoxFields> for BoundingBox {
    type Error = PortalError;

    fn try_from(f: BoundingBoxFields) -> Result<Self> {
        Self::new(f.west, f.south, f.east, f.north)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            format_coordinate(self.west),
            format_coordinate(self.south),
            format_coordinate(self.east),
            format_coordinate(self.north)
        )
    }
}

impl FromStr for BoundingBox {
    type Err = PortalError;

    /// Parse `W,S,E,N`.
    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| PortalError::InvalidBoundingBox(format!("{s:?}: {e}")))?;

        match parts.as_slice() {
            [west, south, east, north] => Self::new(*west, *south, *east, *north),
            _ => Err(PortalError::InvalidBoundingBox(format!(
                "{s:?}: expected four comma-separated values"
            ))),
        }
    }
}

/// Format a coordinate with at most six fractional digits.
pub fn format_coordinate(value: f64) -> String {
    let text = format!("{:.6}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// A time window; either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TemporalRangeFields")]
pub struct TemporalRange {
    /// Inclusive start.
    pub start: Option<NaiveDateTime>,
    /// Inclusive end.
    pub end: Option<NaiveDateTime>,
}

impl TemporalRange {
    /// Create a validated range.
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(PortalError::InvalidTemporalRange(format!(
                    "start {s} is after end {e}"
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Parse a range from `start/end` where either side may be empty.
    pub fn parse(s: &str) -> Result<Self> {
        let (start, end) = s
            .split_once('/')
            .ok_or_else(|| PortalError::InvalidTemporalRange(format!("{s:?}: expected start/end")))?;
        let side = |v: &str| -> Result<Option<NaiveDateTime>> {
            let v = v.trim();
            if v.is_empty() {
                Ok(None)
            } else {
                parse_datetime(v)
                    .map(Some)
                    .ok_or_else(|| PortalError::InvalidTemporalRange(format!("{v:?}: not a date")))
            }
        };
        Self::new(side(start)?, side(end)?)
    }
}

#[derive(Deserialize)]
struct TemporalRangeFields {
    #[serde(default)]
    start: Option<NaiveDateTime>,
    #[serde(default)]
    end: Option<NaiveDateTime>,
}

impl TryFrom<TemporalRangeFields> for TemporalRange {
    type Error = PortalError;

    fn try_from(f: TemporalRangeFields) -> Result<Self> {
        Self::new(f.start, f.end)
    }
}

/// Parse a date or date-time in the forms the catalog uses.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y-%m-%d %H:%M:%S",
    ];

    let value = value.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bounding_box_parse_and_display() {
        let bbox: BoundingBox = "-10.5, 35, 30.25, 71.123456789".parse().unwrap();
        assert_eq!(bbox.west, -10.5);
        assert_eq!(bbox.to_string(), "-10.5,35,30.25,71.123457");
    }

    #[test]
    fn bounding_box_rejects_bad_input() {
        assert!("1,2,3".parse::<BoundingBox>().is_err());
        assert!("a,b,c,d".parse::<BoundingBox>().is_err());
        assert!(BoundingBox::new(0.0, 10.0, 1.0, 5.0).is_err());
        assert!(BoundingBox::new(0.0, -95.0, 1.0, 5.0).is_err());
    }

    #[test]
    fn temporal_range_parse() {
        let range = TemporalRange::parse("2020-01-01/2020-12-31T12:00:00Z").unwrap();
        assert_eq!(range.start, parse_datetime("2020-01-01T00:00:00Z"));
        assert_eq!(range.end.unwrap().to_string(), "2020-12-31 12:00:00");

        let open = TemporalRange::parse("/2020-01-01").unwrap();
        assert_eq!(open.start, None);

        assert!(TemporalRange::parse("2021-01-01/2020-01-01").is_err());
        assert!(TemporalRange::parse("2021-01-01").is_err());
    }

    #[test]
    fn deserializing_validates_extents() {
        let bbox: BoundingBox =
            serde_json::from_str(r#"{"west": -10, "south": 35, "east": 30, "north": 71}"#).unwrap();
        assert_eq!(bbox.to_string(), "-10,35,30,71");

        let flipped = serde_json::from_str::<BoundingBox>(
            r#"{"west": 0, "south": 10, "east": 1, "north": 5}"#,
        );
        assert!(flipped.unwrap_err().to_string().contains("south above north"));

        let range: TemporalRange = serde_json::from_str(r#"{"start": "2020-01-01T00:00:00"}"#).unwrap();
        assert_eq!(range.end, None);
        assert!(serde_json::from_str::<TemporalRange>(
            r#"{"start": "2021-01-01T00:00:00", "end": "2020-01-01T00:00:00"}"#
        )
        .is_err());
    }
}
