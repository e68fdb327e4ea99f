use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::error::EquityError;

/// Identifier wrapper for a participant, unique within one request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const EARTH_RADIUS_KM: f64 = 6371.0088;

    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance in kilometres.
    pub fn haversine_km(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();
        Self::EARTH_RADIUS_KM * c
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Supported ways of reaching the meeting point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportMode {
    Walking,
    Cycling,
    Driving,
    Transit,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Walking,
        TransportMode::Cycling,
        TransportMode::Driving,
        TransportMode::Transit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::Cycling => "cycling",
            TransportMode::Driving => "driving",
            TransportMode::Transit => "transit",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransportMode {
    type Err = EquityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "walking" | "walk" => Ok(Self::Walking),
            "cycling" | "bike" | "bicycling" => Ok(Self::Cycling),
            "driving" | "drive" | "car" => Ok(Self::Driving),
            "transit" | "public_transport" | "bus" | "train" => Ok(Self::Transit),
            _ => Err(EquityError::UnknownMode(value.trim().to_string())),
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// Person taking part in a meet-up request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub mode: Option<TransportMode>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_travel_time_minutes: Option<f64>,
}

impl Participant {
    pub fn new(id: impl Into<String>, coordinate: Coordinate, mode: TransportMode) -> Self {
        Self {
            id: ParticipantId::new(id),
            coordinate,
            mode: Some(mode),
            weight: default_weight(),
            known_travel_time_minutes: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_known_travel_time(mut self, minutes: f64) -> Self {
        self.known_travel_time_minutes = Some(minutes);
        self
    }

    pub fn without_mode(mut self) -> Self {
        self.mode = None;
        self
    }

    pub fn validate(&self) -> Result<(), EquityError> {
        if self.id.0.trim().is_empty() {
            return Err(EquityError::invalid("participant id must not be empty"));
        }
        if !self.coordinate.is_valid() {
            return Err(EquityError::invalid(format!(
                "participant {} has coordinate {} outside WGS84 bounds",
                self.id, self.coordinate
            )));
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(EquityError::invalid(format!(
                "participant {} weight must be positive, got {}",
                self.id, self.weight
            )));
        }
        if let Some(minutes) = self.known_travel_time_minutes {
            if !minutes.is_finite() || minutes < 0.0 {
                return Err(EquityError::invalid(format!(
                    "participant {} travel time must be non-negative, got {minutes}",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// Validates a whole participant list: at least `required` entries, unique ids, valid fields.
pub fn validate_participants(
    participants: &[Participant],
    required: usize,
) -> Result<(), EquityError> {
    if participants.len() < required {
        return Err(EquityError::InsufficientParticipants {
            required,
            actual: participants.len(),
        });
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for participant in participants {
        participant.validate()?;
        if !seen.insert(&participant.id) {
            return Err(EquityError::invalid(format!(
                "duplicate participant id {}",
                participant.id
            )));
        }
    }
    Ok(())
}

/// Where a travel time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelTimeSource {
    Provided,
    Estimated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelTimeSample {
    pub participant_id: ParticipantId,
    pub minutes: f64,
    pub source: TravelTimeSource,
}

impl TravelTimeSample {
    pub fn provided(participant_id: ParticipantId, minutes: f64) -> Self {
        Self {
            participant_id,
            minutes,
            source: TravelTimeSource::Provided,
        }
    }

    pub fn estimated(participant_id: ParticipantId, minutes: f64) -> Self {
        Self {
            participant_id,
            minutes,
            source: TravelTimeSource::Estimated,
        }
    }
}

/// Coarse departure window used to contextualize travel times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
    #[default]
    Unknown,
}

impl TimeOfDay {
    pub fn from_time(time: NaiveTime) -> Self {
        match time.hour() {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn is_peak(&self) -> bool {
        matches!(self, Self::Morning | Self::Evening)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_aliases_case_insensitively() {
        assert_eq!("Walk".parse::<TransportMode>().unwrap(), TransportMode::Walking);
        assert_eq!(" BUS ".parse::<TransportMode>().unwrap(), TransportMode::Transit);
        assert_eq!("car".parse::<TransportMode>().unwrap(), TransportMode::Driving);

        match "hovercraft".parse::<TransportMode>() {
            Err(EquityError::UnknownMode(mode)) => assert_eq!(mode, "hovercraft"),
            other => panic!("expected unknown mode, got {other:?}"),
        }
    }

    #[test]
    fn mode_deserializes_from_upper_case() {
        let mode: TransportMode = serde_json::from_str("\"TRANSIT\"").expect("mode parses");
        assert_eq!(mode, TransportMode::Transit);
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Raffles Place to Changi Airport, roughly 17 km.
        let raffles = Coordinate::new(1.2840, 103.8514);
        let changi = Coordinate::new(1.3644, 103.9915);
        let distance = raffles.haversine_km(&changi);
        assert!((15.0..19.0).contains(&distance), "distance was {distance}");
        assert_eq!(raffles.haversine_km(&raffles), 0.0);
    }

    #[test]
    fn rejects_out_of_range_coordinates_and_weights() {
        let bad_lat = Participant::new("a", Coordinate::new(91.0, 0.0), TransportMode::Driving);
        assert!(matches!(bad_lat.validate(), Err(EquityError::InvalidInput { .. })));

        let zero_weight =
            Participant::new("b", Coordinate::new(1.0, 103.0), TransportMode::Driving)
                .with_weight(0.0);
        assert!(matches!(zero_weight.validate(), Err(EquityError::InvalidInput { .. })));

        let negative_time =
            Participant::new("c", Coordinate::new(1.0, 103.0), TransportMode::Driving)
                .with_known_travel_time(-1.0);
        assert!(negative_time.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let participants = vec![
            Participant::new("dup", Coordinate::new(1.30, 103.80), TransportMode::Walking),
            Participant::new("dup", Coordinate::new(1.31, 103.81), TransportMode::Transit),
        ];
        let err = validate_participants(&participants, 1).expect_err("duplicates rejected");
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn time_of_day_buckets() {
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).expect("valid time");
        assert_eq!(TimeOfDay::from_time(at(8, 30)), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_time(at(12, 0)), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_time(at(18, 45)), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_time(at(23, 10)), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_time(at(4, 59)), TimeOfDay::Night);
    }
}
