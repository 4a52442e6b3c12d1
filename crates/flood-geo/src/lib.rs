use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Where the people in a rescue request are, as reported by the citizen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLocation {
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub address_text: Option<String>,
    #[serde(default)]
    pub flood_depth_m: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("coordinate out of range")]
    CoordinateOutOfRange,
    #[error("flood depth must be a non-negative number")]
    NegativeFloodDepth,
    #[error("location needs a coordinate or an address")]
    Empty,
}

impl RequestLocation {
    pub fn validate(&self) -> Result<(), LocationError> {
        let has_address = self
            .address_text
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty());
        if self.coordinate.is_none() && !has_address {
            return Err(LocationError::Empty);
        }
        if let Some(coordinate) = self.coordinate {
            if !coordinate.is_valid() {
                return Err(LocationError::CoordinateOutOfRange);
            }
        }
        if let Some(depth) = self.flood_depth_m {
            if !depth.is_finite() || depth < 0.0 {
                return Err(LocationError::NegativeFloodDepth);
            }
        }
        Ok(())
    }
}
