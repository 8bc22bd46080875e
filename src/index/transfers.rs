//! Builds the symmetric walking-transfer graph.
//!
//! The pairwise distance scan is the one O(stops²) step in index
//! construction, so it is split across `rayon` by the outer stop index.
//! Each parallel task only ever writes into its own local map; the final
//! merge sorts every stop's neighbor list by neighbor id, so the result is
//! identical regardless of how the scheduler interleaves tasks.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::geo::{walk_seconds, Coordinate, TRANSFER_RADIUS_METERS};
use crate::index::StopId;

pub(super) fn build_transfers(
    stop_coords: &BTreeMap<StopId, Coordinate>,
) -> BTreeMap<StopId, Vec<(StopId, u32)>> {
    let ids: Vec<StopId> = stop_coords.keys().copied().collect();
    let n = ids.len();

    let partials: Vec<BTreeMap<StopId, Vec<(StopId, u32)>>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut local: BTreeMap<StopId, Vec<(StopId, u32)>> = BTreeMap::new();
            let a = ids[i];
            let coord_a = stop_coords[&a];
            for &b in &ids[i + 1..] {
                let coord_b = stop_coords[&b];
                let distance = coord_a.haversine_meters(&coord_b);
                if distance <= TRANSFER_RADIUS_METERS {
                    let walk = walk_seconds(distance);
                    local.entry(a).or_default().push((b, walk));
                    local.entry(b).or_default().push((a, walk));
                }
            }
            local
        })
        .collect();

    let mut merged: BTreeMap<StopId, Vec<(StopId, u32)>> = BTreeMap::new();
    for partial in partials {
        for (stop, edges) in partial {
            merged.entry(stop).or_default().extend(edges);
        }
    }
    for edges in merged.values_mut() {
        edges.sort_unstable_by_key(|(neighbor, _)| *neighbor);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_stops_within_radius_symmetrically() {
        let mut coords = BTreeMap::new();
        coords.insert(1, Coordinate::new(40.0, -73.0));
        coords.insert(2, Coordinate::new(40.0001, -73.0)); // ~11m away
        coords.insert(3, Coordinate::new(41.0, -73.0)); // far away

        let transfers = build_transfers(&coords);
        assert_eq!(transfers.get(&1).unwrap().iter().map(|(s, _)| *s).collect::<Vec<_>>(), vec![2]);
        assert_eq!(transfers.get(&2).unwrap().iter().map(|(s, _)| *s).collect::<Vec<_>>(), vec![1]);
        assert!(!transfers.contains_key(&3));
    }
}
