//! Random spawn locations on the torus.

use std::f32::consts::TAU;

use chrobry_core::{heading, Torus};
use glam::Vec2;
use rand::Rng;

/// Point at a uniform angle and a distance in `[min, max)` from `center`.
pub(crate) fn ring<R: Rng + ?Sized>(
    torus: &Torus,
    center: Vec2,
    min: f32,
    max: f32,
    rng: &mut R,
) -> Vec2 {
    let angle = rng.gen_range(0.0..TAU);
    let distance = if max > min {
        rng.gen_range(min..max)
    } else {
        min
    };
    torus.offset(center, heading(angle) * distance)
}

/// Uniform point anywhere on the map.
pub(crate) fn anywhere<R: Rng + ?Sized>(torus: &Torus, rng: &mut R) -> Vec2 {
    Vec2::new(
        rng.gen_range(0.0..torus.width()),
        rng.gen_range(0.0..torus.height()),
    )
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn ring_points_respect_the_annulus_across_seams() {
        let torus = Torus::default();
        let center = Vec2::new(50.0, 5_990.0);
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..500 {
            let point = ring(&torus, center, 800.0, 1_500.0, &mut rng);
            let distance = torus.distance(center, point);
            assert!((799.9..1_500.1).contains(&distance), "{distance}");
            assert!(point.x >= 0.0 && point.x < torus.width());
            assert!(point.y >= 0.0 && point.y < torus.height());
        }
    }

    #[test]
    fn anywhere_stays_on_the_map() {
        let torus = Torus::new(100.0, 40.0).expect("valid torus");
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..200 {
            let point = anywhere(&torus, &mut rng);
            assert!(point.x < 100.0 && point.y < 40.0);
        }
    }
}
