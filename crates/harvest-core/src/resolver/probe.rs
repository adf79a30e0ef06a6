//! Tile queries behind the resolver: overlap probing and ground scans.

use glam::Vec2;
use tilegrid::TileGrid;

use crate::config::ResolverConfig;
use crate::shape::{Aabb, CollisionShape};

/// First collidable tile a hypothetical shape overlaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileHit {
    /// Tile coordinate.
    pub tile: (u32, u32),
    /// Layer the tile was found in.
    pub layer: usize,
    /// Tile rectangle after the margin shrink.
    pub rect: Aabb,
    /// The tile is a ramp whose surface the shape reached.
    pub diagonal: bool,
    /// The shape's center X lies within the ramp tile's span.
    pub center_on_diagonal: bool,
}

/// Surface found by a downward ground scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    /// World Y of the surface.
    pub y: f32,
    /// The surface belongs to a ramp.
    pub diagonal: bool,
}

/// Inclusive tile range covering `bounds`, grown by one tile and clamped.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn candidate_range(grid: &TileGrid, bounds: &Aabb) -> ((u32, u32), (u32, u32)) {
    let (min_x, min_y) = grid.world_to_tile(bounds.min());
    let (max_x, max_y) = grid.world_to_tile(bounds.max());
    let lo = grid.clamp_coords(min_x.saturating_sub(1), min_y.saturating_sub(1));
    let hi = grid.clamp_coords(max_x.saturating_add(1), max_y.saturating_add(1));
    (lo, hi)
}

/// Scans the candidate range for the first collidable tile `shape` overlaps.
///
/// Rows are scanned top to bottom, columns left to right, layers in order.
/// A ramp only counts once the shape's bottom edge is below the ramp surface
/// sampled at the shape's center X; above it, the shape is in open air.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
pub fn probe(grid: &TileGrid, config: &ResolverConfig, shape: &CollisionShape) -> Option<TileHit> {
    let bounds = shape.bounds();
    let ((x0, y0), (x1, y1)) = candidate_range(grid, &bounds);
    let size = grid.tile_size() as f32;
    let center_x = bounds.center().x;

    for ty in y0..=y1 {
        for tx in x0..=x1 {
            for (layer, id) in grid.stack_at(tx, ty) {
                let class = grid.tile_class(id);
                if !class.collidable {
                    continue;
                }
                let origin = grid.tile_to_world(tx as i32, ty as i32);
                let rect = Aabb::new(origin.x, origin.y, size, size).shrink(config.tile_margin);

                let (diagonal, center_on_diagonal) = match class.slope {
                    Some(slope) => {
                        let surface =
                            slope.surface_y(origin.x, origin.y + size, center_x, grid.tile_size());
                        if bounds.bottom() <= surface {
                            continue;
                        }
                        (true, center_x >= origin.x && center_x < origin.x + size)
                    }
                    None => (false, false),
                };

                if shape.collides_with_aabb(&rect) {
                    return Some(TileHit {
                        tile: (tx, ty),
                        layer,
                        rect,
                        diagonal,
                        center_on_diagonal,
                    });
                }
            }
        }
    }
    None
}

/// Ground surface in the column under world `x`, scanning down from
/// `feet_y - max_step`.
///
/// The first row holding a flat tile whose top is at or below the scan line,
/// or a ramp whose surface at `x` is, ends the scan. Within that row the
/// highest surface wins.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
pub fn ground_y_at(grid: &TileGrid, config: &ResolverConfig, x: f32, feet_y: f32) -> Option<GroundHit> {
    let line = feet_y - config.max_step;
    let (tx, start_row) = grid.world_to_tile(Vec2::new(x, line));
    if tx < 0 || tx >= grid.width() as i32 {
        return None;
    }
    let size = grid.tile_size() as f32;

    for ty in start_row.max(0)..grid.height() as i32 {
        let origin = grid.tile_to_world(tx, ty);
        let best = grid
            .stack_at(tx as u32, ty as u32)
            .filter_map(|(_, id)| {
                let class = grid.tile_class(id);
                if !class.collidable {
                    return None;
                }
                match class.slope {
                    Some(slope) => {
                        let surface = slope.surface_y(origin.x, origin.y + size, x, grid.tile_size());
                        (surface >= line).then_some(GroundHit {
                            y: surface,
                            diagonal: true,
                        })
                    }
                    None => (origin.y >= line).then_some(GroundHit {
                        y: origin.y,
                        diagonal: false,
                    }),
                }
            })
            .min_by(|a, b| a.y.total_cmp(&b.y));

        if best.is_some() {
            return best;
        }
    }
    None
}

/// Ground an entity lands on, combining probes at both edges.
///
/// The edge probes sit `probe_inset` inside the bounding box; a third probe
/// at the center decides whether the entity is over a ramp. Over a ramp:
///
/// - edges more than `seam_threshold` apart keep only the one nearer the feet
/// - an edge that hit a ramp beats one that hit a flat tile
/// - when both edges hit a ramp, the one nearer the feet wins
///
/// Otherwise the higher edge wins. With no edge hit the center probe is used.
#[must_use]
pub fn ground_under(
    grid: &TileGrid,
    config: &ResolverConfig,
    position: Vec2,
    size: Vec2,
) -> Option<GroundHit> {
    let feet = position.y + size.y;
    let (left, right, center) = edge_probes(grid, config, position, size);

    if !center.is_some_and(|c| c.diagonal) {
        return higher(left, right).or(center);
    }

    let (left, right) = match (left, right) {
        (Some(l), Some(r)) if (l.y - r.y).abs() > config.seam_threshold => {
            if left_is_nearer(l, r, feet) {
                (Some(l), None)
            } else {
                (None, Some(r))
            }
        }
        sides => sides,
    };

    match (left, right) {
        (Some(l), Some(r)) if l.diagonal && r.diagonal => {
            Some(if left_is_nearer(l, r, feet) { l } else { r })
        }
        (Some(l), _) if l.diagonal => Some(l),
        (_, Some(r)) if r.diagonal => Some(r),
        _ => higher(left, right).or(center),
    }
}

/// Highest surface under either edge of a bounding box.
///
/// Grounded entities rest on this, so a box at a ramp crest stays on the flat
/// top tile while its center is still over the slope.
#[must_use]
pub fn support_under(
    grid: &TileGrid,
    config: &ResolverConfig,
    position: Vec2,
    size: Vec2,
) -> Option<GroundHit> {
    let (left, right, center) = edge_probes(grid, config, position, size);
    higher(left, right).or(center)
}

fn edge_probes(
    grid: &TileGrid,
    config: &ResolverConfig,
    position: Vec2,
    size: Vec2,
) -> (Option<GroundHit>, Option<GroundHit>, Option<GroundHit>) {
    let feet = position.y + size.y;
    let probe_at = |x: f32| ground_y_at(grid, config, x, feet);
    (
        probe_at(position.x + config.probe_inset),
        probe_at(position.x + size.x - config.probe_inset),
        probe_at(position.x + size.x * 0.5),
    )
}

fn higher(a: Option<GroundHit>, b: Option<GroundHit>) -> Option<GroundHit> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.y < a.y { b } else { a }),
        (a, b) => a.or(b),
    }
}

/// Left wins ties.
fn left_is_nearer(left: GroundHit, right: GroundHit, feet: f32) -> bool {
    (left.y - feet).abs() <= (right.y - feet).abs()
}
