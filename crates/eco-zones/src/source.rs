//! Where fresh constraint data comes from.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::weather::WeatherCondition;
use crate::zone::GreenZone;
use crate::ZoneResult;

/// Raw zones and weather as delivered by a source, before indexing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConstraintBundle {
    #[serde(default)]
    pub zones: Vec<GreenZone>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

impl ConstraintBundle {
    pub fn from_reader<R: Read>(reader: R) -> ZoneResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// A provider polled by [`ConstraintStore::refresh_from`](crate::ConstraintStore::refresh_from).
pub trait ConstraintSource: Send + Sync {
    fn fetch(&self) -> ZoneResult<ConstraintBundle>;
}

/// Reads a `{ "zones": [...], "weather": [...] }` JSON document from disk on
/// every fetch.
pub struct JsonConstraintSource {
    path: PathBuf,
}

impl JsonConstraintSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConstraintSource for JsonConstraintSource {
    fn fetch(&self) -> ZoneResult<ConstraintBundle> {
        let file = std::fs::File::open(&self.path)?;
        ConstraintBundle::from_reader(std::io::BufReader::new(file))
    }
}
