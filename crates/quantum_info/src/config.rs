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

//! Process-wide numerical settings.

use std::env;
use std::sync::OnceLock;

/// Coefficients whose magnitude is at most this are pruned after every mutating operation, unless
/// overridden by the environment or per operator.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// The environment variable that overrides [DEFAULT_TOLERANCE].
pub const TOLERANCE_ENV_VAR: &str = "QOBS_TOLERANCE";

static TOLERANCE: OnceLock<f64> = OnceLock::new();

/// The pruning tolerance that newly created operators start with.
///
/// The environment is read once, on first call.
#[inline]
pub fn default_tolerance() -> f64 {
    *TOLERANCE.get_or_init(|| tolerance_from_env(env::var(TOLERANCE_ENV_VAR).ok().as_deref()))
}

fn tolerance_from_env(value: Option<&str>) -> f64 {
    let Some(value) = value else {
        return DEFAULT_TOLERANCE;
    };
    match value.trim().parse::<f64>() {
        Ok(tol) if tol.is_finite() && tol >= 0.0 => {
            tracing::debug!(tolerance = tol, "pruning tolerance taken from {TOLERANCE_ENV_VAR}");
            tol
        }
        _ => {
            tracing::warn!(
                value,
                "ignoring unusable {TOLERANCE_ENV_VAR}, using {DEFAULT_TOLERANCE}"
            );
            DEFAULT_TOLERANCE
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn env_values() {
        assert_eq!(tolerance_from_env(None), DEFAULT_TOLERANCE);
        assert_eq!(tolerance_from_env(Some("1e-6")), 1e-6);
        assert_eq!(tolerance_from_env(Some(" 0 ")), 0.0);
        assert_eq!(tolerance_from_env(Some("-1")), DEFAULT_TOLERANCE);
        assert_eq!(tolerance_from_env(Some("NaN")), DEFAULT_TOLERANCE);
        assert_eq!(tolerance_from_env(Some("small")), DEFAULT_TOLERANCE);
    }
}
