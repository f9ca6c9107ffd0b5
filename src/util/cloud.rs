//! Random particle clouds for demos and smoke tests.

use glam::Vec3;
use rand::Rng;

/// Fill `slots` with points uniformly distributed in a ball of `radius`
/// around the origin.
pub fn fill_ball(slots: &mut [Vec3], radius: f32, rng: &mut impl Rng) {
    for slot in slots {
        *slot = point_in_ball(rng) * radius;
    }
}

// Rejection sampling from the enclosing cube; accepts ~52% of draws.
fn point_in_ball(rng: &mut impl Rng) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_ball(count: usize, radius: f32) -> Vec<Vec3> {
        let mut points = vec![Vec3::ZERO; count];
        fill_ball(&mut points, radius, &mut rand::rng());
        points
    }

    #[test]
    fn points_stay_inside_radius() {
        let points = random_ball(2_000, 3.0);
        assert_eq!(points.len(), 2_000);
        assert!(points.iter().all(|p| p.length() <= 3.0 + 1e-5));
    }

    #[test]
    fn cloud_is_roughly_centered() {
        let points = random_ball(10_000, 1.0);
        let centroid = points.iter().copied().sum::<Vec3>() / 10_000.0;
        assert!(centroid.length() < 0.1);
    }
}
