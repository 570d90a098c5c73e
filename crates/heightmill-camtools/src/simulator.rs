//! Ball-nose engagement simulator
//!
//! Finds the height at which a spherical tool tip centred over `(x, y)` first
//! touches the heightmap. Every sample under the tool's circular footprint
//! lifts the sphere by `h + sqrt(r^2 - d^2)`, and the tool has to clear the
//! highest of them. This is a grey-scale dilation of the surface by a
//! hemisphere, evaluated one point at a time.

use heightmill_core::{Diagnostics, Heightmap, Tool};
use tracing::trace;

/// Contributions at or below this height are never accepted as contact.
pub const CONTACT_FLOOR: f64 = -9999.0;

/// Evaluates tool contact heights over a borrowed heightmap
#[derive(Debug, Clone, Copy)]
pub struct EngagementSimulator<'a> {
    heightmap: &'a Heightmap,
    tool: Tool,
}

impl<'a> EngagementSimulator<'a> {
    /// Create a simulator for one heightmap and tool
    pub fn new(heightmap: &'a Heightmap, tool: Tool) -> Self {
        Self { heightmap, tool }
    }

    /// Contact height of the sphere centre, or `None` when no sample lies
    /// under the footprint
    pub fn contact_height(&self, x: f64, y: f64) -> Option<f64> {
        let map = self.heightmap;
        let res = map.res();
        let radius = self.tool.radius;
        let radius_sq = radius * radius;

        let cx = (x / res).round();
        let cy = (y / res).round();
        if !cx.is_finite() || !cy.is_finite() {
            return None;
        }
        let cx = cx as isize;
        let cy = cy as isize;

        // Index-space search radius; the physical test below is exact.
        // A footprint wider than the grid sees the whole grid.
        let grid_span = map.width().max(map.height()) as f64;
        let reach = (radius / res).ceil().min(grid_span) as isize + 1;
        let reach_sq = reach.saturating_mul(reach);

        let x_lo = cx.saturating_sub(reach).max(0);
        let y_lo = cy.saturating_sub(reach).max(0);
        let x_hi = cx.saturating_add(reach).min(map.width() as isize - 1);
        let y_hi = cy.saturating_add(reach).min(map.height() as isize - 1);

        let mut best: Option<f64> = None;
        for gy in y_lo..=y_hi {
            let dy = gy - cy;
            for gx in x_lo..=x_hi {
                let dx = gx - cx;
                if dx * dx + dy * dy > reach_sq {
                    continue;
                }

                let tdx = gx as f64 * res - x;
                let tdy = gy as f64 * res - y;
                let dist_sq = tdx * tdx + tdy * tdy;
                if dist_sq > radius_sq {
                    continue;
                }

                let Some(h) = map.get(gx as usize, gy as usize) else {
                    continue;
                };
                let z = h + (radius_sq - dist_sq).sqrt();
                if !z.is_finite() || z <= CONTACT_FLOOR {
                    continue;
                }
                best = Some(match best {
                    Some(current) if current > z => current,
                    _ => z,
                });
            }
        }
        best
    }

    /// Contact height with the last-good-height fallback applied
    ///
    /// A sample with no contact reuses the previous good height and is
    /// counted as an issue. Every call counts as one processed sample.
    pub fn height_at(&self, x: f64, y: f64, diagnostics: &mut Diagnostics) -> f64 {
        match self.contact_height(x, y) {
            Some(z) => {
                diagnostics.record_contact(z);
                z
            }
            None => {
                let z = diagnostics.record_fallback();
                trace!("No contact at X{:.3} Y{:.3}, reusing Z{:.3}", x, y, z);
                z
            }
        }
    }
}

/// Contact height of `tool` over `heightmap` at `(x, y)`
pub fn height_at(
    heightmap: &Heightmap,
    tool: Tool,
    x: f64,
    y: f64,
    diagnostics: &mut Diagnostics,
) -> f64 {
    EngagementSimulator::new(heightmap, tool).height_at(x, y, diagnostics)
}
