//! Module for the normalization pass over every run and detector

// internal modules
use crate::beam::IncidentBeam;
use crate::cache::DimensionCache;
use crate::contribution::Accumulator;
use crate::error::{Error, Result};
use crate::frame::FrameTransform;
use crate::output::NormalizationOutput;
use crate::request::NormalizationRequest;
use crate::run::RunMetadata;
use crate::summary::{DetectorOutcome, LoopSummary};
use crate::trajectory::Trajectory;

// fluxnorm modules
use fluxnorm_grid::{AccumulationGrid, AffineIndexMatrix, Extent, FullAxis};
use fluxnorm_instrument::{unique_detectors, BeamGeometry, DetectorId, DetectorRecord, Instrument};
use fluxnorm_utils::f;

// external crates
use log::{debug, error, info, trace, warn};
use rayon::prelude::*;

/// Fill a normalization grid for every run of a request
///
/// Everything that can fail for the pass as a whole is checked before any
/// detector is looked at: missing or invalid incident energies, degenerate
/// energy bounds, missing or singular orientations, missing extra-axis logs,
/// and the instrument source and sample.
///
/// Detectors that cannot contribute are skipped one at a time and counted in
/// the [LoopSummary]. A run whose logged extra-axis values lie outside the
/// measured data is skipped as a whole. If that applies to every run, the pass
/// is skipped with a single warning and an all-zero grid.
///
/// ```rust
/// # use fluxnorm_grid::{Axis, AxisSource, DataExtents, Extent, FullAxis, GridDefinition};
/// # use fluxnorm_instrument::{Detector, InMemoryInstrument};
/// # use fluxnorm_norm::{normalize, NormalizationRequest, RunMetadata};
/// # use nalgebra::{Matrix3, Vector3};
/// let grid = GridDefinition::new(vec![
///     (Axis::uniform("h", -1.0, 1.0, 10).unwrap(), AxisSource::Full(FullAxis::H)),
///     (Axis::uniform("l", -2.0, 4.0, 12).unwrap(), AxisSource::Full(FullAxis::L)),
/// ])
/// .unwrap();
///
/// let extents = DataExtents::new(
///     Extent::new(-1.0, 1.0),
///     Extent::new(-1.0, 1.0),
///     Extent::new(-2.0, 4.0),
///     Extent::new(-5.0, 15.0),
/// );
///
/// let run = RunMetadata::new("run_1")
///     .with_incident_energy(20.0)
///     .with_ub_matrix(Matrix3::identity() / std::f64::consts::TAU);
///
/// let instrument = InMemoryInstrument::new()
///     .with_source(Vector3::new(0.0, 0.0, -10.0))
///     .with_sample(Vector3::zeros())
///     .with_detector(Detector::new(1, Vector3::new(0.1, 0.0, 4.0)));
///
/// let request = NormalizationRequest::new(grid, extents).with_run(run);
/// let output = normalize(&request, &instrument).unwrap();
///
/// assert!(!output.skipped);
/// assert_eq!(output.summary.contributed, 1);
/// assert!((output.total() - 20.0).abs() < 1e-9);
/// ```
pub fn normalize<I: Instrument + ?Sized>(request: &NormalizationRequest, instrument: &I) -> Result<NormalizationOutput> {
    let shape = request.grid.shape();
    let n_cells = request.grid.n_cells();

    let (runs, affine, beam) = prepare(request, instrument).inspect_err(|e| error!("Unable to normalise: {e}"))?;

    let (active, skipped): (Vec<&PreparedRun>, Vec<&PreparedRun>) = runs.iter().partition(|r| r.skip.is_none());
    let reasons = skipped
        .iter()
        .filter_map(|r| r.skip.as_deref())
        .collect::<Vec<&str>>();

    if active.is_empty() {
        let reason = reasons.join("; ");
        warn!("Binning limits are outside the measured data, not applying normalization: {reason}");
        return Ok(NormalizationOutput::skipped(n_cells, shape, reason));
    }

    for reason in &reasons {
        info!("Skipping {reason}");
    }

    let ids = match &request.detectors {
        Some(ids) => ids.clone(),
        None => instrument.detector_ids(),
    };
    let ids = unique_detectors(instrument, &ids);
    debug!("Normalising {} runs over {} unique detectors", active.len(), ids.len());

    let signal = AccumulationGrid::zeros(n_cells);
    let mut summary = LoopSummary::default();

    for run in active {
        let detector_loop = DetectorLoop {
            request,
            instrument,
            beam: &beam,
            run,
            accumulator: Accumulator::new(
                &request.grid,
                &affine,
                run.cache.beam(),
                &run.extras,
                request.config.delta_threshold,
            ),
            signal: &signal,
        };

        let run_summary = detector_loop.run(&ids);
        info!("Run \"{}\": {run_summary}", run.metadata.name);
        summary = summary.merge(run_summary);
    }

    Ok(NormalizationOutput::new(signal.into_vec(), shape, summary))
}

/// Everything fixed for the duration of one run
#[derive(Debug)]
struct PreparedRun<'a> {
    metadata: &'a RunMetadata,
    frame: FrameTransform,
    cache: DimensionCache,
    /// Values of the extra axes in full-space column order
    extras: Vec<f64>,
    /// Reason to skip the whole run
    skip: Option<String>,
}

/// Build everything that is shared across detectors, failing on the first
/// configuration problem
fn prepare<'a, I: Instrument + ?Sized>(
    request: &'a NormalizationRequest,
    instrument: &I,
) -> Result<(Vec<PreparedRun<'a>>, AffineIndexMatrix, BeamGeometry)> {
    if request.runs.is_empty() {
        return Err(Error::NoRuns);
    }

    let affine = AffineIndexMatrix::from_definition(&request.grid, &request.extents.extra_names())?;
    let beam = instrument.beam_geometry()?;

    let runs = request
        .runs
        .iter()
        .map(|run| prepare_run(request, run))
        .collect::<Result<Vec<PreparedRun>>>()?;

    Ok((runs, affine, beam))
}

fn prepare_run<'a>(request: &NormalizationRequest, run: &'a RunMetadata) -> Result<PreparedRun<'a>> {
    let ei = run
        .incident_energy
        .ok_or_else(|| Error::MissingIncidentEnergy(run.name.clone()))?;
    let beam = IncidentBeam::new(ei, energy_bounds(request))?;

    if !(run.proton_charge.is_finite() && run.proton_charge >= 0.0) {
        return Err(Error::InvalidProtonCharge {
            run: run.name.clone(),
            charge: run.proton_charge,
        });
    }

    let frame = FrameTransform::from_run(run)?;
    let cache = DimensionCache::new(&request.grid, &request.extents, beam, &request.config);

    let mut extras = Vec::with_capacity(request.extents.extra.len());
    let mut skip = None;

    for extra in &request.extents.extra {
        let value = run.log(&extra.name).ok_or_else(|| Error::MissingExtraAxisLog {
            run: run.name.clone(),
            axis: extra.name.clone(),
        })?;

        // no time was spent measuring outside of the data extent
        let measured = match request.grid.extra_axis(&extra.name) {
            Some(axis) => extra.extent.intersect(&Extent::from(axis)),
            None => extra.extent,
        };

        if skip.is_none() && !measured.contains(value) {
            skip = Some(f!(
                "run \"{}\": {} = {} is outside [{}, {}]",
                run.name,
                extra.name,
                value,
                measured.minimum,
                measured.maximum
            ));
        }

        extras.push(value);
    }

    Ok(PreparedRun {
        metadata: run,
        frame,
        cache,
        extras,
        skip,
    })
}

/// Energy transfer range traced by every trajectory
///
/// A kept energy axis clips trajectories to its own bounds, even with a
/// single bin. Otherwise the whole range of the data is used.
fn energy_bounds(request: &NormalizationRequest) -> Extent {
    request
        .grid
        .output_axis(FullAxis::DeltaE)
        .map(Extent::from)
        .unwrap_or(request.extents.delta_e)
}

/// The per-detector work for a single run
struct DetectorLoop<'a, I: ?Sized> {
    request: &'a NormalizationRequest,
    instrument: &'a I,
    beam: &'a BeamGeometry,
    run: &'a PreparedRun<'a>,
    accumulator: Accumulator<'a>,
    signal: &'a AccumulationGrid,
}

impl<I: Instrument + ?Sized> DetectorLoop<'_, I> {
    /// Process every detector, in parallel if configured
    fn run(&self, ids: &[DetectorId]) -> LoopSummary {
        let process = |summary: LoopSummary, id: &DetectorId| summary.record(self.process(*id));

        if self.request.config.parallel {
            ids.par_iter()
                .fold(LoopSummary::default, process)
                .reduce(LoopSummary::default, LoopSummary::merge)
        } else {
            ids.iter().fold(LoopSummary::default(), process)
        }
    }

    /// Add the contribution of a single detector
    fn process(&self, id: DetectorId) -> DetectorOutcome {
        let detector = match self.instrument.resolve(id) {
            Ok(detector) => detector,
            Err(e) => {
                trace!("Skipping detector {id}: {e}");
                return DetectorOutcome::from(&e);
            }
        };

        let charge = self.run.metadata.proton_charge;
        let scale = match &self.request.solid_angles {
            None => charge,
            Some(solid_angles) => match solid_angles.get(&id) {
                Some(s) if s.is_finite() && *s >= 0.0 => s * charge,
                _ => {
                    trace!("Skipping detector {id}: no valid solid angle");
                    return DetectorOutcome::MissingSolidAngle;
                }
            },
        };

        let record = DetectorRecord::from_detector(&detector, self.beam);
        let trajectory = Trajectory::new(&record, &self.run.frame, self.run.cache.beam());
        let points = trajectory.intersections(&self.run.cache, self.request.config.bounds_tolerance);

        match self.accumulator.add_trajectory(&points, scale, self.signal) {
            Ok(0) => {
                trace!("Detector {id} does not reach the grid");
                DetectorOutcome::MissedGrid
            }
            Ok(updates) => DetectorOutcome::Contributed { updates },
            Err(e) => {
                trace!("Skipping detector {id}: {e}");
                DetectorOutcome::Failed
            }
        }
    }
}
