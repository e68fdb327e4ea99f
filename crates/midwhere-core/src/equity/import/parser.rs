use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) struct ParticipantRow {
    pub(crate) line: u64,
    pub(crate) id: String,
    pub(crate) lat: f64,
    pub(crate) lng: f64,
    pub(crate) mode: Option<String>,
    pub(crate) weight: Option<f64>,
    pub(crate) travel_time_minutes: Option<f64>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ParticipantRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut record = csv::StringRecord::new();
    let mut rows = Vec::new();

    // Record positions track physical lines, so quoted multi-line fields keep numbering exact.
    while csv_reader.read_record(&mut record)? {
        let line = record.position().map(|position| position.line()).unwrap_or(0);
        let raw: RawRow = record.deserialize(Some(&headers))?;
        rows.push(ParticipantRow {
            line,
            id: raw.id,
            lat: raw.lat,
            lng: raw.lng,
            mode: raw.mode,
            weight: raw.weight,
            travel_time_minutes: raw.travel_time_minutes,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct RawRow {
    id: String,
    lat: f64,
    lng: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    mode: Option<String>,
    #[serde(default, deserialize_with = "empty_number_as_none")]
    weight: Option<f64>,
    #[serde(default, deserialize_with = "empty_number_as_none")]
    travel_time_minutes: Option<f64>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn empty_number_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match empty_string_as_none(deserializer)? {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|err| serde::de::Error::custom(format!("invalid number '{raw}': {err}"))),
        None => Ok(None),
    }
}
