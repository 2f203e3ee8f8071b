//! Module for the instrument geometry collaborator

// internal modules
use crate::detector::{Detector, DetectorId};
use crate::error::{Error, Result};
use crate::geometry::BeamGeometry;

// external crates
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Everything the normalization needs to know about an instrument
///
/// Implementations must be shareable between threads, since detectors are
/// looked up from inside the parallel detector loop.
pub trait Instrument: Sync {
    /// Position of the neutron source, if defined
    fn source_position(&self) -> Option<Vector3<f64>>;

    /// Position of the sample, if defined
    fn sample_position(&self) -> Option<Vector3<f64>>;

    /// Every detector id known to the instrument, monitors included
    fn detector_ids(&self) -> Vec<DetectorId>;

    /// Look up a detector by id
    fn detector(&self, id: DetectorId) -> Result<Detector>;

    /// All detectors sharing a spectrum with `id`, including `id` itself
    ///
    /// Fails with [Error::NotGrouped] if the detector is not part of a group.
    fn group_members(&self, id: DetectorId) -> Result<Vec<DetectorId>>;

    /// Look up a detector that is fit to contribute signal
    ///
    /// Monitors and masked detectors are errors, to be skipped by the caller.
    fn resolve(&self, id: DetectorId) -> Result<Detector> {
        let detector = self.detector(id)?;
        if detector.is_monitor {
            Err(Error::MonitorDetector(id))
        } else if detector.is_masked {
            Err(Error::MaskedDetector(id))
        } else {
            Ok(detector)
        }
    }

    /// Beam geometry from the source and sample positions
    fn beam_geometry(&self) -> Result<BeamGeometry> {
        let source = self.source_position().ok_or(Error::MissingSource)?;
        let sample = self.sample_position().ok_or(Error::MissingSample)?;
        BeamGeometry::new(source, sample)
    }
}

/// A fully described instrument held in memory
///
/// Groups are lists of detector ids that share one spectrum. A detector may be
/// in at most one group; if it appears in several the last one wins.
///
/// ```rust
/// # use fluxnorm_instrument::{Detector, InMemoryInstrument, Instrument, Error};
/// # use nalgebra::Vector3;
/// let instrument = InMemoryInstrument::new()
///     .with_source(Vector3::new(0.0, 0.0, -10.0))
///     .with_sample(Vector3::zeros())
///     .with_detector(Detector::new(1, Vector3::new(1.0, 0.0, 3.0)))
///     .with_detector(Detector::new(2, Vector3::new(1.1, 0.0, 3.0)))
///     .with_detector(Detector::new(3, Vector3::new(0.0, 0.0, -1.0)).monitor())
///     .with_group(vec![1, 2]);
///
/// assert_eq!(instrument.detector_ids(), vec![1, 2, 3]);
/// assert_eq!(instrument.group_members(2), Ok(vec![1, 2]));
/// assert_eq!(instrument.group_members(3), Err(Error::NotGrouped(3)));
/// assert_eq!(instrument.resolve(3), Err(Error::MonitorDetector(3)));
/// assert_eq!(instrument.resolve(4), Err(Error::DetectorNotFound(4)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "InstrumentDescription", into = "InstrumentDescription")]
pub struct InMemoryInstrument {
    source: Option<Vector3<f64>>,
    sample: Option<Vector3<f64>>,
    detectors: BTreeMap<DetectorId, Detector>,
    groups: Vec<Vec<DetectorId>>,
    group_of: HashMap<DetectorId, usize>,
}

impl InMemoryInstrument {
    /// Empty instrument with no source, sample, or detectors
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source position
    pub fn with_source(mut self, position: Vector3<f64>) -> Self {
        self.source = Some(position);
        self
    }

    /// Set the sample position
    pub fn with_sample(mut self, position: Vector3<f64>) -> Self {
        self.sample = Some(position);
        self
    }

    /// Add a detector, replacing any existing detector with the same id
    pub fn with_detector(mut self, detector: Detector) -> Self {
        self.detectors.insert(detector.id, detector);
        self
    }

    /// Add several detectors
    pub fn with_detectors(mut self, detectors: impl IntoIterator<Item = Detector>) -> Self {
        self.detectors.extend(detectors.into_iter().map(|d| (d.id, d)));
        self
    }

    /// Add a group of detectors sharing one spectrum
    pub fn with_group(mut self, members: Vec<DetectorId>) -> Self {
        let index = self.groups.len();
        self.group_of.extend(members.iter().map(|id| (*id, index)));
        self.groups.push(members);
        self
    }

    /// Number of detectors
    pub fn n_detectors(&self) -> usize {
        self.detectors.len()
    }
}

impl Instrument for InMemoryInstrument {
    fn source_position(&self) -> Option<Vector3<f64>> {
        self.source
    }

    fn sample_position(&self) -> Option<Vector3<f64>> {
        self.sample
    }

    fn detector_ids(&self) -> Vec<DetectorId> {
        self.detectors.keys().copied().collect()
    }

    fn detector(&self, id: DetectorId) -> Result<Detector> {
        self.detectors
            .get(&id)
            .copied()
            .ok_or(Error::DetectorNotFound(id))
    }

    fn group_members(&self, id: DetectorId) -> Result<Vec<DetectorId>> {
        self.group_of
            .get(&id)
            .and_then(|index| self.groups.get(*index))
            .cloned()
            .ok_or(Error::NotGrouped(id))
    }
}

/// Serialised representation of an [InMemoryInstrument]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InstrumentDescription {
    #[serde(default)]
    source: Option<Vector3<f64>>,
    #[serde(default)]
    sample: Option<Vector3<f64>>,
    detectors: Vec<Detector>,
    #[serde(default)]
    groups: Vec<Vec<DetectorId>>,
}

impl From<InstrumentDescription> for InMemoryInstrument {
    fn from(description: InstrumentDescription) -> Self {
        let mut instrument = InMemoryInstrument::new().with_detectors(description.detectors);
        instrument.source = description.source;
        instrument.sample = description.sample;
        description
            .groups
            .into_iter()
            .fold(instrument, |i, group| i.with_group(group))
    }
}

impl From<InMemoryInstrument> for InstrumentDescription {
    fn from(instrument: InMemoryInstrument) -> Self {
        Self {
            source: instrument.source,
            sample: instrument.sample,
            detectors: instrument.detectors.into_values().collect(),
            groups: instrument.groups,
        }
    }
}
