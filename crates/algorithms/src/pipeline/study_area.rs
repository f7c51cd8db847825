//! Resolve the study area from the boundary archive

use super::config::StudyArea;
use climstress_core::archive::BoundaryArchive;
use climstress_core::{Region, Result};
use tracing::{debug, info};

/// Look up the named boundary and simplify it when a tolerance is set
pub fn resolve_region<A>(archive: &A, area: &StudyArea) -> Result<Region>
where
    A: BoundaryArchive + ?Sized,
{
    area.validate()?;
    let region = archive.boundary(&area.boundary)?;
    let region = match area.simplify_tolerance {
        Some(tolerance) if tolerance > 0.0 => {
            let simple = region.simplified(tolerance)?;
            debug!(
                boundary = %area.boundary,
                tolerance,
                vertices_before = vertex_count(&region),
                vertices_after = vertex_count(&simple),
                "simplified boundary"
            );
            simple
        }
        _ => region,
    };
    let bbox = region.bounding_rect();
    info!(
        boundary = %region.name(),
        min_x = bbox.min().x,
        min_y = bbox.min().y,
        max_x = bbox.max().x,
        max_y = bbox.max().y,
        "study area resolved"
    );
    Ok(region)
}

fn vertex_count(region: &Region) -> usize {
    region
        .geometry()
        .0
        .iter()
        .map(|p| p.exterior().0.len() + p.interiors().iter().map(|r| r.0.len()).sum::<usize>())
        .sum()
}
