//! Flattening of region lists into per-axis boundary point arrays.

use crate::region::GridRegion;
use gl_core::Real;

/// Convert an ordered region list into an explicit ascending boundary array.
///
/// The result has length (total cell count + 1); the first point is the
/// axis origin and the last point is pinned exactly to the final region's
/// max so accumulated floating error never shortens the axis.
pub fn flatten_regions(regions: &[GridRegion]) -> Vec<Real> {
    let total_cells: usize = regions.iter().map(|r| r.cell_widths.len()).sum();
    let mut points = Vec::with_capacity(total_cells + 1);

    let mut cursor = regions.first().map_or(0.0, |r| r.min);
    points.push(cursor);
    for region in regions {
        for width in &region.cell_widths {
            cursor += width;
            points.push(cursor);
        }
    }
    if let (Some(last), Some(region)) = (points.last_mut(), regions.last()) {
        *last = region.max;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::MeshDistribution;

    #[test]
    fn covers_axis_exactly() {
        let regions = vec![
            GridRegion::from_gap(0.0, 3.0, 3, MeshDistribution::Uniform).unwrap(),
            GridRegion {
                min: 3.0,
                max: 3.2,
                cell_widths: vec![0.2],
            },
            GridRegion::from_gap(3.2, 10.0, 4, MeshDistribution::Uniform).unwrap(),
        ];
        let points = flatten_regions(&regions);
        assert_eq!(points.len(), 3 + 1 + 4 + 1);
        assert_eq!(points[0], 0.0);
        assert_eq!(*points.last().unwrap(), 10.0);
        for pair in points.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn single_region_with_no_partitions() {
        let regions = vec![GridRegion::from_gap(0.0, 5.0, 5, MeshDistribution::Uniform).unwrap()];
        let points = flatten_regions(&regions);
        assert_eq!(points.len(), 6);
        assert_eq!(points[0], 0.0);
        assert_eq!(*points.last().unwrap(), 5.0);
    }
}
