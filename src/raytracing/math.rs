#[allow(non_snake_case)]
pub mod box3D;
pub mod ray;
pub mod rsqrt;
pub mod vec3;

pub use box3D::*;
pub use ray::*;
pub use rsqrt::*;
pub use vec3::*;
