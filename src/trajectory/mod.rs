//! Trajectory assembly across calendar months
//!
//! The cache hands out one month at a time. Consecutive months overlap by one
//! boundary sample, so every month after the first contributes its rows minus
//! the first one.

use crate::celestial::{names, Body, State};
use crate::constants::{DAY_S, STEP_S};
use crate::data::cache::CacheStore;
use crate::data::meta::MetadataStore;
use crate::time::MonthKey;
use crate::Result;
use log::{info, warn};

/// Tolerance on the sample spacing at a stitch, in seconds
const STEP_TOLERANCE_S: f64 = 0.5;

/// Seconds between two samples
fn step_secs(earlier: &State, later: &State) -> f64 {
    (later.time - earlier.time) * DAY_S
}

/// Whether two samples are one sampling step apart
fn is_regular_step(step: f64) -> bool {
    (step - STEP_S).abs() <= STEP_TOLERANCE_S
}

/// Anything able to produce the rows of one identifier for one month
pub trait MonthSource {
    fn month_states(&self, id: &str, month: MonthKey) -> Result<Vec<State>>;
}

impl MonthSource for CacheStore {
    fn month_states(&self, id: &str, month: MonthKey) -> Result<Vec<State>> {
        CacheStore::month_states(self, id, month)
    }
}

/// Stitch `months` consecutive months of `id`, starting at `first_month`
pub fn assemble_trajectory<S: MonthSource + ?Sized>(
    source: &S,
    id: &str,
    first_month: MonthKey,
    months: usize,
) -> Result<Vec<State>> {
    let mut trajectory: Vec<State> = Vec::new();
    let mut month = first_month;

    for n in 0..months {
        let rows = source.month_states(id, month)?;
        let skip = usize::from(n > 0);

        if let (Some(last), Some(next)) = (trajectory.last(), rows.get(skip)) {
            let step = step_secs(last, next);
            if step <= 0.0 {
                warn!(
                    "Trajectory of {} does not advance at the start of {} ({} after {})",
                    id, month, next.time, last.time
                );
            } else if !is_regular_step(step) {
                warn!(
                    "Trajectory of {} steps {:.1} s instead of {} s at the start of {}",
                    id, step, STEP_S, month
                );
            }
        }
        trajectory.extend(rows.into_iter().skip(skip));
        month = month.next();
    }

    Ok(trajectory)
}

/// Load every tracked body over the preload span
///
/// Each identifier is resolved through the month source first, which also
/// records its metadata. Identifiers still missing from the metadata document
/// afterwards are skipped.
pub fn preload_bodies<S: MonthSource + ?Sized>(
    source: &S,
    meta: &MetadataStore,
    ids: &[String],
    first_month: MonthKey,
    months: usize,
) -> Result<Vec<Body>> {
    let mut trajectories = Vec::with_capacity(ids.len());
    for id in ids {
        trajectories.push(assemble_trajectory(source, id, first_month, months)?);
    }
    info!("Preload of {} bodies done", ids.len());

    let doc = meta.load()?;
    let mut bodies = Vec::with_capacity(ids.len());
    for (id, trajectory) in ids.iter().zip(trajectories) {
        let Some(body_meta) = doc.lookup(id) else {
            warn!("No metadata for {}, skipping it", id);
            continue;
        };
        let name = if body_meta.name.is_empty() {
            names::target_name(id).unwrap_or(id.as_str()).to_string()
        } else {
            body_meta.name
        };
        bodies.push(
            Body::new(id, &name, &body_meta.desc, body_meta.gm, body_meta.radius)
                .with_trajectory(trajectory),
        );
    }

    Ok(bodies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::celestial::BodyCategory;
    use crate::data::meta::{MetaDocument, MetaEntry};
    use crate::UnisimError;
    use std::collections::HashMap;
    use tempfile::tempdir;

    /// Five rows per month, one minute apart, starting at the month's JD
    struct Months;

    impl MonthSource for Months {
        fn month_states(&self, id: &str, month: MonthKey) -> Result<Vec<State>> {
            if id == "missing" {
                return Err(UnisimError::TransportError("offline".to_string()));
            }
            let start = month.start().jd();
            Ok((0..5)
                .map(|i| State::new(start + i as f64 / 1440.0, [i as f64; 3], [0.0; 3]))
                .collect())
        }
    }

    /// Months whose tables overlap exactly at the boundary
    struct Overlapping(HashMap<u32, Vec<f64>>);

    impl MonthSource for Overlapping {
        fn month_states(&self, _id: &str, month: MonthKey) -> Result<Vec<State>> {
            Ok(self.0[&month.month]
                .iter()
                .map(|&t| State::new(t, [t; 3], [0.0; 3]))
                .collect())
        }
    }

    #[test]
    fn test_two_month_stitch() {
        let traj = assemble_trajectory(&Months, "399", MonthKey::new(2025, 1), 2).unwrap();

        assert_eq!(traj.len(), 9);
        assert!(traj.windows(2).all(|w| w[1].time > w[0].time));
        // Row 5 is the second row of February
        assert_eq!(traj[5].x, 1.0);
    }

    #[test]
    fn test_single_month_is_untouched() {
        let traj = assemble_trajectory(&Months, "399", MonthKey::new(2025, 1), 1).unwrap();
        assert_eq!(traj.len(), 5);
        assert_eq!(traj[0].x, 0.0);
    }

    #[test]
    fn test_overlap_sample_appears_once() {
        let source = Overlapping(HashMap::from([
            (1, vec![0.0, 1.0, 2.0]),
            (2, vec![2.0, 3.0, 4.0]),
            (3, vec![4.0, 5.0]),
        ]));
        let traj = assemble_trajectory(&source, "10", MonthKey::new(2025, 1), 3).unwrap();
        let times: Vec<f64> = traj.iter().map(|s| s.time).collect();

        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_stitch_step_detection() {
        // Rows as the cache hands them out: the window end is dropped and the
        // next month's first row is skipped, leaving a two minute step
        let feb = MonthKey::new(2025, 2).start().jd();
        let at = |jd: f64| State::new(jd, [0.0; 3], [0.0; 3]);
        let jan_last = at(feb - 1.0 / 1440.0);
        let feb_first = at(feb);
        let feb_second = at(feb + 1.0 / 1440.0);

        assert!((step_secs(&jan_last, &feb_second) - 120.0).abs() < 1e-3);
        assert!(!is_regular_step(step_secs(&jan_last, &feb_second)));
        assert!(is_regular_step(step_secs(&jan_last, &feb_first)));
        assert!(!is_regular_step(step_secs(&feb_first, &jan_last)));
    }

    #[test]
    fn test_source_error_propagates() {
        let result = assemble_trajectory(&Months, "missing", MonthKey::new(2025, 1), 2);
        assert!(matches!(result, Err(UnisimError::TransportError(_))));
    }

    #[test]
    fn test_preload_skips_unknown_bodies() {
        let temp_dir = tempdir().unwrap();
        let meta = MetadataStore::new(temp_dir.path().join("meta.json"));
        let mut doc = MetaDocument::default();
        doc.insert_if_absent(
            BodyCategory::Celestial,
            "399",
            MetaEntry {
                name: "Earth (399)".to_string(),
                desc: String::new(),
                gm: Some(3.986e14),
                radius: [6.371e6; 3],
            },
        );
        doc.insert_if_absent(
            BodyCategory::Barycenter,
            "3",
            MetaEntry {
                name: String::new(),
                desc: String::new(),
                gm: None,
                radius: [1.0; 3],
            },
        );
        meta.save(&doc).unwrap();

        let ids: Vec<String> = ["399", "3", "1P"].iter().map(|s| s.to_string()).collect();
        let bodies = preload_bodies(&Months, &meta, &ids, MonthKey::new(2025, 1), 2).unwrap();

        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0].id, "399");
        assert_eq!(bodies[0].gm, 3.986e14);
        assert_eq!(bodies[0].trajectory.len(), 9);
        assert_eq!(bodies[1].name, "Earth-Moon Barycenter");
        assert!(!bodies[1].has_size());
    }
}
