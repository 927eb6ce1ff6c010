//! Scalar reference numerics the demo programs are checked against.

use vliw_core::{Result, VliwError};

/// Magic constant of the fast inverse square root.
pub const FAST_INV_SQRT_MAGIC: i32 = 0x5F37_59DF;

/// Newton iterations unrolled by [`sqrt_newton`].
pub const NEWTON_ITERATIONS: usize = 5;

/// Square root by five Newton iterations starting from `n` itself.
pub fn sqrt_newton(n: f64) -> Result<f64> {
    if n < 0.0 {
        return Err(VliwError::InvalidArgument(format!(
            "cannot take the square root of {}",
            n
        )));
    }
    if n == 0.0 {
        return Ok(0.0);
    }
    let mut s = n;
    for _ in 0..NEWTON_ITERATIONS {
        s = 0.5 * (s + n / s);
    }
    Ok(s)
}

/// Approximate `1 / sqrt(n)`: binary32 bit trick plus one Newton step.
pub fn fast_inv_sqrt(n: f64) -> f64 {
    let half = n * 0.5;
    let bits = (n as f32).to_bits() as i32;
    let guess = FAST_INV_SQRT_MAGIC - (bits >> 1);
    let y = f32::from_bits(guess as u32) as f64;
    y * (1.5 - half * (y * y))
}

fn mean_square_plus(x: &[f64], gamma: &[f64], epsilon: f64) -> Result<f64> {
    if x.is_empty() {
        return Err(VliwError::InvalidArgument("empty input vector".to_string()));
    }
    if x.len() != gamma.len() {
        return Err(VliwError::InvalidArgument(format!(
            "x has {} elements but gamma has {}",
            x.len(),
            gamma.len()
        )));
    }
    let sum_sq = x.iter().fold(0.0, |acc, v| acc + v * v);
    Ok(sum_sq / x.len() as f64 + epsilon)
}

/// `x[i] / sqrt(mean(x^2) + epsilon) * gamma[i]`
pub fn rms_norm(x: &[f64], gamma: &[f64], epsilon: f64) -> Result<Vec<f64>> {
    let rms = mean_square_plus(x, gamma, epsilon)?.sqrt();
    Ok(x.iter().zip(gamma).map(|(v, g)| v / rms * g).collect())
}

/// [`rms_norm`] with the square root taken by [`sqrt_newton`].
pub fn rms_norm_newton(x: &[f64], gamma: &[f64], epsilon: f64) -> Result<Vec<f64>> {
    let rms = sqrt_newton(mean_square_plus(x, gamma, epsilon)?)?;
    Ok(x.iter().zip(gamma).map(|(v, g)| v / rms * g).collect())
}

/// [`rms_norm`] with the reciprocal taken by [`fast_inv_sqrt`].
pub fn rms_norm_fast_inv_sqrt(x: &[f64], gamma: &[f64], epsilon: f64) -> Result<Vec<f64>> {
    let inv = fast_inv_sqrt(mean_square_plus(x, gamma, epsilon)?);
    Ok(x.iter().zip(gamma).map(|(v, g)| v * inv * g).collect())
}
