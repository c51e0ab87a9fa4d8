use boxclick::placement::{place, place_all, Geometry, Position};
use boxclick::surface::PlayArea;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

proptest! {
    #[test]
    fn separated_placements_keep_min_distance(
        seed in any::<u64>(),
        width in 120.0f64..2000.0,
        height in 120.0f64..1200.0,
        count in 2usize..=5,
    ) {
        let geometry = Geometry::default();
        let area = PlayArea::new(width, height);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut placed: Vec<Position> = Vec::new();

        for _ in 0..count {
            let placement = place(&mut rng, &placed, area, &geometry);
            prop_assert!(placement.attempts >= 1);
            prop_assert!(placement.attempts <= geometry.max_attempts);
            if placement.separated {
                for other in &placed {
                    prop_assert!(other.distance(&placement.position) >= geometry.min_distance);
                }
            } else {
                prop_assert_eq!(placement.attempts, geometry.max_attempts);
            }
            placed.push(placement.position);
        }
    }

    #[test]
    fn placements_stay_inside_padded_area(
        seed in any::<u64>(),
        width in 120.0f64..2000.0,
        height in 120.0f64..1200.0,
        count in 1usize..=5,
    ) {
        let area = PlayArea::new(width, height);
        let mut rng = StdRng::seed_from_u64(seed);

        for p in place_all(&mut rng, count, area, &Geometry::default()) {
            prop_assert!(p.top >= 20.0 && p.top <= height - 100.0 + 1e-9);
            prop_assert!(p.left >= 20.0 && p.left <= width - 100.0 + 1e-9);
        }
    }

    #[test]
    fn degenerate_areas_fall_back_to_corner(
        seed in any::<u64>(),
        width in 0.0f64..119.9,
        height in 0.0f64..2000.0,
        count in 1usize..=5,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let positions = place_all(&mut rng, count, PlayArea::new(width, height), &Geometry::default());

        prop_assert_eq!(positions.len(), count);
        for p in positions {
            prop_assert_eq!(p, Position::new(20.0, 20.0));
        }
    }
}
