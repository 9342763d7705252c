// This code is part of Qobs.
//
// (C) Copyright Qobs Developers 2025
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

use num_complex::{Complex, Complex64};

/// Create a new [`Complex<f64>`] with arguments that can convert [`Into<f64>`].
///
/// Unlike `num_complex::c64`, the two parts may be different types, so `c64(0.5, 0)` works.
#[inline]
pub fn c64<T: Into<f64>, V: Into<f64>>(re: T, im: V) -> Complex64 {
    Complex::new(re.into(), im.into())
}

/// Create a new [`Complex<f64>`] in a `const` context.
#[macro_export]
macro_rules! c64 {
    ($re: expr, $im: expr $(,)*) => {
        ::num_complex::Complex64::new($re as f64, $im as f64)
    };
}

pub const C_ZERO: Complex64 = c64!(0, 0);
pub const C_ONE: Complex64 = c64!(1, 0);
pub const C_M_ONE: Complex64 = c64!(-1, 0);
pub const IM: Complex64 = c64!(0, 1);
pub const M_IM: Complex64 = c64!(0, -1);

/// Multiply `value` by `i ** power`, without going through a general complex multiplication.
#[inline]
pub fn mul_i_pow(value: Complex64, power: u8) -> Complex64 {
    match power % 4 {
        0 => value,
        1 => Complex64::new(-value.im, value.re),
        2 => -value,
        _ => Complex64::new(value.im, -value.re),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn powers_of_i() {
        let value = c64(1.5, -0.25);
        assert_eq!(mul_i_pow(value, 0), value);
        assert_eq!(mul_i_pow(value, 1), value * IM);
        assert_eq!(mul_i_pow(value, 2), value * IM * IM);
        assert_eq!(mul_i_pow(value, 3), value * M_IM);
        assert_eq!(mul_i_pow(value, 4), value);
    }
}
