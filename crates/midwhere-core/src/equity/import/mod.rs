mod parser;

use std::io::Read;
use std::path::Path;

use super::domain::{validate_participants, Coordinate, Participant, ParticipantId, TransportMode};
use super::error::EquityError;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: u64, source: EquityError },
    Participants(EquityError),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read participant file: {}", err),
            ImportError::Csv(err) => write!(f, "invalid participant CSV data: {}", err),
            ImportError::Row { line, source } => write!(f, "line {}: {}", line, source),
            ImportError::Participants(err) => write!(f, "invalid participant list: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Row { source, .. } => Some(source),
            ImportError::Participants(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads participants from CSV with headers `id,lat,lng,mode,weight,travel_time_minutes`.
pub struct ParticipantImporter;

impl ParticipantImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Participant>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Participant>, ImportError> {
        let mut participants = Vec::new();

        for row in parser::parse_rows(reader)? {
            let line = row.line;
            let mode = row
                .mode
                .as_deref()
                .map(str::parse::<TransportMode>)
                .transpose()
                .map_err(|source| ImportError::Row { line, source })?;

            let participant = Participant {
                id: ParticipantId(row.id),
                coordinate: Coordinate::new(row.lat, row.lng),
                mode,
                weight: row.weight.unwrap_or(1.0),
                known_travel_time_minutes: row.travel_time_minutes,
            };
            participant
                .validate()
                .map_err(|source| ImportError::Row { line, source })?;
            participants.push(participant);
        }

        validate_participants(&participants, 1).map_err(ImportError::Participants)?;
        Ok(participants)
    }
}
