//! Versioned integer hash used for stipple sampling
//!
//! Stipple output must be bit-reproducible across platforms, so draws come from
//! a fixed integer mix rather than a library RNG. Changing any constant here
//! changes every stipple export and must bump [`HASH_VERSION`].

/// Version tag of the mix function below
pub const HASH_VERSION: u32 = 1;

/// Independent draw streams derived from one sample index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Horizontal candidate position
    X = 0,
    /// Vertical candidate position
    Y = 1,
    /// Keep/discard threshold
    Threshold = 2,
}

/// lowbias32 integer mix (two multiply-xorshift rounds)
pub const fn mix32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

/// Hash a sample index within a stream and seed to a unit-interval draw
///
/// The result lies in `[0, 1)` with 24 bits of resolution.
pub fn unit_draw(index: u32, stream: Stream, seed: u32) -> f64 {
    let key = index
        .wrapping_mul(3)
        .wrapping_add(stream as u32)
        .wrapping_add(mix32(seed ^ 0x9e37_79b9));
    f64::from(mix32(key) >> 8) / f64::from(1u32 << 24)
}
