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

//! The `std::ops` surface shared by the operator-sum types.
//!
//! The implementing type needs the inherent methods
//!
//! * `merge_from(&mut self, other: &Self, factor: Complex64)`, adding `factor * other` in place and
//!   pruning afterwards;
//! * `expand_product(&self, other: &Self) -> Self`, the operator product `self · other`;
//! * `scale_in_place(&mut self, factor: Complex64)`;
//!
//! and everything else is derived from those.  The operators do not check coefficients for
//! overflow; the inherent `add`, `sub`, `compose` and `scale` methods do, and return a `Result`.

macro_rules! impl_operator_arithmetic {
    ($ty:ty) => {
        impl ::std::ops::AddAssign<&$ty> for $ty {
            fn add_assign(&mut self, rhs: &$ty) {
                self.merge_from(rhs, ::num_complex::Complex64::new(1.0, 0.0));
            }
        }
        impl ::std::ops::AddAssign for $ty {
            fn add_assign(&mut self, rhs: $ty) {
                *self += &rhs;
            }
        }
        impl ::std::ops::Add<&$ty> for $ty {
            type Output = $ty;

            fn add(mut self, rhs: &$ty) -> $ty {
                self += rhs;
                self
            }
        }
        impl ::std::ops::Add for $ty {
            type Output = $ty;

            fn add(mut self, rhs: $ty) -> $ty {
                self += &rhs;
                self
            }
        }
        impl ::std::ops::Add for &$ty {
            type Output = $ty;

            fn add(self, rhs: &$ty) -> $ty {
                let mut out = self.clone();
                out += rhs;
                out
            }
        }

        impl ::std::ops::SubAssign<&$ty> for $ty {
            fn sub_assign(&mut self, rhs: &$ty) {
                self.merge_from(rhs, ::num_complex::Complex64::new(-1.0, 0.0));
            }
        }
        impl ::std::ops::SubAssign for $ty {
            fn sub_assign(&mut self, rhs: $ty) {
                *self -= &rhs;
            }
        }
        impl ::std::ops::Sub<&$ty> for $ty {
            type Output = $ty;

            fn sub(mut self, rhs: &$ty) -> $ty {
                self -= rhs;
                self
            }
        }
        impl ::std::ops::Sub for $ty {
            type Output = $ty;

            fn sub(mut self, rhs: $ty) -> $ty {
                self -= &rhs;
                self
            }
        }
        impl ::std::ops::Sub for &$ty {
            type Output = $ty;

            fn sub(self, rhs: &$ty) -> $ty {
                let mut out = self.clone();
                out -= rhs;
                out
            }
        }

        impl ::std::ops::Mul for &$ty {
            type Output = $ty;

            fn mul(self, rhs: &$ty) -> $ty {
                self.expand_product(rhs)
            }
        }
        impl ::std::ops::Mul<&$ty> for $ty {
            type Output = $ty;

            fn mul(self, rhs: &$ty) -> $ty {
                self.expand_product(rhs)
            }
        }
        impl ::std::ops::Mul for $ty {
            type Output = $ty;

            fn mul(self, rhs: $ty) -> $ty {
                self.expand_product(&rhs)
            }
        }
        impl ::std::ops::MulAssign<&$ty> for $ty {
            fn mul_assign(&mut self, rhs: &$ty) {
                *self = self.expand_product(rhs);
            }
        }
        impl ::std::ops::MulAssign for $ty {
            fn mul_assign(&mut self, rhs: $ty) {
                *self = self.expand_product(&rhs);
            }
        }

        impl ::std::ops::MulAssign<::num_complex::Complex64> for $ty {
            fn mul_assign(&mut self, rhs: ::num_complex::Complex64) {
                self.scale_in_place(rhs);
            }
        }
        impl ::std::ops::MulAssign<f64> for $ty {
            fn mul_assign(&mut self, rhs: f64) {
                self.scale_in_place(::num_complex::Complex64::new(rhs, 0.0));
            }
        }
        impl ::std::ops::Mul<::num_complex::Complex64> for $ty {
            type Output = $ty;

            fn mul(mut self, rhs: ::num_complex::Complex64) -> $ty {
                self *= rhs;
                self
            }
        }
        impl ::std::ops::Mul<::num_complex::Complex64> for &$ty {
            type Output = $ty;

            fn mul(self, rhs: ::num_complex::Complex64) -> $ty {
                self.clone() * rhs
            }
        }
        impl ::std::ops::Mul<f64> for $ty {
            type Output = $ty;

            fn mul(mut self, rhs: f64) -> $ty {
                self *= rhs;
                self
            }
        }
        impl ::std::ops::Mul<f64> for &$ty {
            type Output = $ty;

            fn mul(self, rhs: f64) -> $ty {
                self.clone() * rhs
            }
        }
        impl ::std::ops::Mul<$ty> for ::num_complex::Complex64 {
            type Output = $ty;

            fn mul(self, rhs: $ty) -> $ty {
                rhs * self
            }
        }
        impl ::std::ops::Mul<&$ty> for ::num_complex::Complex64 {
            type Output = $ty;

            fn mul(self, rhs: &$ty) -> $ty {
                rhs * self
            }
        }
        impl ::std::ops::Mul<$ty> for f64 {
            type Output = $ty;

            fn mul(self, rhs: $ty) -> $ty {
                rhs * self
            }
        }

        impl ::std::ops::Neg for $ty {
            type Output = $ty;

            fn neg(mut self) -> $ty {
                self.scale_in_place(::num_complex::Complex64::new(-1.0, 0.0));
                self
            }
        }
        impl ::std::ops::Neg for &$ty {
            type Output = $ty;

            fn neg(self) -> $ty {
                -self.clone()
            }
        }
    };
}

pub(crate) use impl_operator_arithmetic;
