//! Planar geometry helpers (meters, degrees)

use nalgebra::Vector2;

/// Position or velocity on the pitch, in meters (or meters per step)
pub type Vec2 = Vector2<f64>;

/// Normalize an angle in degrees to the range (-180, 180]
pub fn normalize_dir(dir: f64) -> f64 {
    let wrapped = dir.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Direction in degrees from `from` to `to`
pub fn direction(from: &Vec2, to: &Vec2) -> f64 {
    polar_dir(&(to - from))
}

/// Direction in degrees of a vector; zero for the null vector
pub fn polar_dir(v: &Vec2) -> f64 {
    v.y.atan2(v.x).to_degrees()
}

/// Vector with the given magnitude pointing along `dir` degrees
pub fn polar(magnitude: f64, dir: f64) -> Vec2 {
    let rad = dir.to_radians();
    Vec2::new(magnitude * rad.cos(), magnitude * rad.sin())
}

pub fn distance(a: &Vec2, b: &Vec2) -> f64 {
    (a - b).norm()
}

/// Absolute angular difference between two headings, in [0, 180]
pub fn angle_between(a: f64, b: f64) -> f64 {
    normalize_dir(a - b).abs()
}
