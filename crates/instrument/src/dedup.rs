//! Module for reducing grouped detectors to one per spectrum

// internal modules
use crate::detector::DetectorId;
use crate::instrument::Instrument;

// external crates
use log::trace;
use std::collections::HashSet;

/// Reduce a list of detector ids to one representative per spectrum
///
/// Detectors grouped into a single spectrum all see the same flux, so only the
/// first member of each group is kept. Ids that are not grouped are kept as
/// they are. Order follows the first appearance of each group in `ids`.
///
/// No check is made here that a detector is live; masked, monitor, and
/// missing detectors are dealt with one at a time in the main loop.
///
/// ```rust
/// # use fluxnorm_instrument::{unique_detectors, Detector, InMemoryInstrument};
/// # use nalgebra::Vector3;
/// let instrument = InMemoryInstrument::new()
///     .with_detectors((1..=6).map(|id| Detector::new(id, Vector3::z())))
///     .with_group(vec![2, 3, 4])
///     .with_group(vec![6, 5]);
///
/// let ids = unique_detectors(&instrument, &[1, 2, 3, 4, 5, 6]);
/// assert_eq!(ids, vec![1, 2, 6]);
/// ```
pub fn unique_detectors<I: Instrument + ?Sized>(instrument: &I, ids: &[DetectorId]) -> Vec<DetectorId> {
    let mut seen = HashSet::with_capacity(ids.len());
    let mut unique = Vec::new();

    for &id in ids {
        if seen.contains(&id) {
            continue;
        }

        match instrument.group_members(id) {
            Ok(members) if !members.is_empty() => {
                unique.push(members[0]);
                seen.extend(members);
            }
            _ => {
                trace!("Detector {id} is not grouped, keeping as is");
                unique.push(id);
            }
        }
        seen.insert(id);
    }

    unique
}
