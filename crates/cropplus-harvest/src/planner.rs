//! Bounded-area harvest planning.
//!
//! The planner scans a cuboid around the clicked node: `range` blocks out
//! horizontally and one block up and down, in nested x, y, z order. Every
//! recognised, enabled, fully grown node is a candidate; the plan keeps the
//! first `max_crops` of them in scan order. Nothing is sorted by distance.

use std::sync::Arc;

use cropplus_types::{BlockPos, CropSite, MassHarvestPlan};
use tracing::debug;

use crate::policy;
use crate::view::ConfigurationView;

/// Read access to the host's nodes.
pub trait NodeLookup {
    /// The node at `pos`, or `None` for empty or unloaded cells.
    fn site_at(&self, pos: &BlockPos) -> Option<CropSite>;
}

/// Offsets `(dx, dy, dz)` of every cell in a scan of half-extent `range`,
/// in scan order. Yields `3 * (2 * range + 1)^2` cells.
pub fn candidate_cells(range: u32) -> impl Iterator<Item = (i32, i32, i32)> {
    let r = i32::try_from(range).unwrap_or(i32::MAX);
    let lo = r.saturating_neg();
    (lo..=r).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| (lo..=r).map(move |dz| (dx, dy, dz)))
    })
}

/// Enumerates and caps mass-harvest candidates.
#[derive(Debug, Clone)]
pub struct AreaHarvestPlanner {
    config: Arc<dyn ConfigurationView>,
}

impl AreaHarvestPlanner {
    /// Create a planner that reads crop switches from `config`.
    pub fn new(config: Arc<dyn ConfigurationView>) -> Self {
        Self { config }
    }

    /// Scan around `center` and keep at most `max_crops` candidates.
    ///
    /// Planned sites still have to pass eligibility one by one when the
    /// harvest is executed.
    pub fn plan<L>(
        &self,
        center: &BlockPos,
        range: u32,
        max_crops: usize,
        lookup: &L,
    ) -> MassHarvestPlan
    where
        L: NodeLookup + ?Sized,
    {
        let mut sites = Vec::new();
        let mut candidates_found: usize = 0;

        for (dx, dy, dz) in candidate_cells(range) {
            let Some(pos) = center.offset(dx, dy, dz) else {
                continue;
            };
            let Some(site) = lookup.site_at(&pos) else {
                continue;
            };
            if !self.is_candidate(&site) {
                continue;
            }
            candidates_found = candidates_found.saturating_add(1);
            if sites.len() < max_crops {
                sites.push(site);
            }
        }

        let plan = MassHarvestPlan {
            center: center.clone(),
            range,
            max_crops,
            sites,
            candidates_found,
        };
        debug!(
            center = %center,
            range,
            found = plan.candidates_found,
            planned = plan.len(),
            "Mass harvest planned"
        );
        plan
    }

    fn is_candidate(&self, site: &CropSite) -> bool {
        site.kind
            .is_some_and(|kind| policy::crop_enabled(self.config.as_ref(), kind))
            && site.is_fully_grown()
    }
}
