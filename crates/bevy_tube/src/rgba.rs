//! RGBA pixel type used by the procedural texture generators.

/// RGBA pixel with 8 bits per channel.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Rgba {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

impl Rgba {
  /// Creates a new RGBA pixel.
  #[inline]
  pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
    Self { r, g, b, a }
  }

  /// Black with the given alpha.
  #[inline]
  pub const fn black(a: u8) -> Self {
    Self::new(0, 0, 0, a)
  }
}

/// Flattens pixels into the tightly packed byte layout `Image::new` expects.
pub fn to_bytes(pixels: &[Rgba]) -> Vec<u8> {
  pixels.iter().flat_map(|p| [p.r, p.g, p.b, p.a]).collect()
}

/// Converts a unit-range value to a byte, rounding half up.
#[inline]
pub(crate) fn unit_to_byte(v: f32) -> u8 {
  (255.0 * v.clamp(0.0, 1.0) + 0.5).floor() as u8
}
