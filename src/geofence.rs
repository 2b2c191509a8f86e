use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self { latitude, longitude }),
            _ => None,
        }
    }
}

/// Distance between a recorded position and a client site.
///
/// The store never computes distances itself; whatever this returns is
/// persisted as `distance_from_client`, in kilometres.
pub trait DistanceCalculator: Send + Sync {
    fn distance_km(&self, from: Coordinates, to: Coordinates) -> f64;
}

impl<F> DistanceCalculator for F
where
    F: Fn(Coordinates, Coordinates) -> f64 + Send + Sync,
{
    fn distance_km(&self, from: Coordinates, to: Coordinates) -> f64 {
        self(from, to)
    }
}
