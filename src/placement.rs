use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::surface::PlayArea;

/// Box geometry in logical pixels, plus the retry cap for rejection sampling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Geometry {
    pub box_size: f64,
    pub padding: f64,
    pub min_distance: f64,
    pub max_attempts: u32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            box_size: 80.0,
            padding: 20.0,
            min_distance: 120.0,
            max_attempts: 100,
        }
    }
}

/// Top-left corner of a box inside the play area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub top: f64,
    pub left: f64,
}

impl Position {
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        ((self.top - other.top).powi(2) + (self.left - other.left).powi(2)).sqrt()
    }
}

/// Result of placing a single box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Position,
    /// Candidates drawn, 0 when the area was too small to sample at all.
    pub attempts: u32,
    /// False when the fallback corner was used or the attempt cap ran out.
    pub separated: bool,
}

/// Place one box so that it keeps `min_distance` from every box in `existing`.
///
/// Never fails: an area too small for a padded box yields `(padding, padding)`,
/// and once `max_attempts` candidates have been rejected the last one is
/// accepted as is.
pub fn place<R: Rng + ?Sized>(
    rng: &mut R,
    existing: &[Position],
    area: PlayArea,
    geometry: &Geometry,
) -> Placement {
    let min_top = geometry.padding;
    let min_left = geometry.padding;
    let max_top = area.height - geometry.box_size - geometry.padding;
    let max_left = area.width - geometry.box_size - geometry.padding;

    if max_top < min_top || max_left < min_left {
        return Placement {
            position: Position::new(geometry.padding, geometry.padding),
            attempts: 0,
            separated: existing.is_empty(),
        };
    }

    let max_attempts = geometry.max_attempts.max(1);
    let mut attempts = 0;
    loop {
        let candidate = Position::new(
            rng.gen::<f64>() * (max_top - min_top) + min_top,
            rng.gen::<f64>() * (max_left - min_left) + min_left,
        );
        attempts += 1;

        let separated = existing
            .iter()
            .all(|placed| placed.distance(&candidate) >= geometry.min_distance);

        if separated || attempts >= max_attempts {
            return Placement {
                position: candidate,
                attempts,
                separated,
            };
        }
    }
}

/// Place `count` boxes one after another, each respecting the ones before it.
pub fn place_all<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    area: PlayArea,
    geometry: &Geometry,
) -> Vec<Position> {
    let mut positions: Vec<Position> = Vec::with_capacity(count);
    for idx in 0..count {
        let placement = place(rng, &positions, area, geometry);
        if !placement.separated {
            log::debug!(
                "box {} accepted without separation after {} attempts at ({:.1}, {:.1})",
                idx,
                placement.attempts,
                placement.position.top,
                placement.position.left
            );
        }
        positions.push(placement.position);
    }
    positions
}

/// Smallest distance between any two positions, `None` for fewer than two.
pub fn min_pairwise_distance(positions: &[Position]) -> Option<f64> {
    positions
        .iter()
        .tuple_combinations()
        .map(|(a, b)| a.distance(b))
        .min_by(|a, b| a.total_cmp(b))
}
