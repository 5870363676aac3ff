// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-axis PID controller over 3D vectors.
//!
//! The integral term accumulates without decay and is only cleared by
//! [`VectorPid::reset`]. A long grab held against an obstacle therefore
//! winds it up; the holder resets the controller on release.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// PID gains and output clamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidGains {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
    /// Maximum output magnitude; the output is rescaled, not truncated per axis
    pub output_clamp: Option<f32>,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 5.0,
            ki: 0.2,
            kd: 0.25,
            output_clamp: Some(3.0),
        }
    }
}

/// Vector PID controller
#[derive(Debug, Clone)]
pub struct VectorPid {
    gains: PidGains,
    integral: Vec3,
    previous_error: Vec3,
    value: Vec3,
}

impl VectorPid {
    /// Create a controller with zeroed internal state
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: Vec3::ZERO,
            previous_error: Vec3::ZERO,
            value: Vec3::ZERO,
        }
    }

    /// Compute the corrective vector driving `current` towards `target`.
    ///
    /// A zero (or negative) `dt` contributes nothing to the integral and
    /// yields a zero derivative term.
    pub fn calculate(&mut self, current: Vec3, target: Vec3, dt: f32) -> Vec3 {
        let error = target - current;

        let derivative = if dt > 0.0 {
            self.integral += error * dt;
            (error - self.previous_error) / dt
        } else {
            Vec3::ZERO
        };
        self.previous_error = error;

        let output =
            error * self.gains.kp + self.integral * self.gains.ki + derivative * self.gains.kd;

        self.value = match self.gains.output_clamp {
            Some(max) if output.length_squared() > max * max => output.normalize_or_zero() * max,
            _ => output,
        };
        self.value
    }

    /// Zero the integral and previous error; gains and clamp are kept
    pub fn reset(&mut self) {
        self.integral = Vec3::ZERO;
        self.previous_error = Vec3::ZERO;
        self.value = Vec3::ZERO;
    }

    /// Output of the last [`calculate`](Self::calculate) call
    pub fn value(&self) -> Vec3 {
        self.value
    }

    /// Accumulated integral
    pub fn integral(&self) -> Vec3 {
        self.integral
    }

    /// Error seen by the last call
    pub fn previous_error(&self) -> Vec3 {
        self.previous_error
    }

    /// Configured gains
    pub fn gains(&self) -> &PidGains {
        &self.gains
    }
}

impl Default for VectorPid {
    fn default() -> Self {
        Self::new(PidGains::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn unclamped(kp: f32, ki: f32, kd: f32) -> VectorPid {
        VectorPid::new(PidGains {
            kp,
            ki,
            kd,
            output_clamp: None,
        })
    }

    #[test]
    fn test_terms_combine() {
        let mut pid = unclamped(2.0, 1.0, 0.5);
        let out = pid.calculate(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 0.5);

        // P = 2, I = 1 * (1 * 0.5), D = 0.5 * (1 / 0.5)
        assert!((out.x - 3.5).abs() < EPS);
        assert_eq!(out.y, 0.0);
        assert_eq!(pid.value(), out);
        assert!((pid.integral().x - 0.5).abs() < EPS);

        // Same error again: derivative vanishes, integral grows
        let out = pid.calculate(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 0.5);
        assert!((out.x - 3.0).abs() < EPS);
    }

    #[test]
    fn test_clamp_preserves_direction() {
        let mut pid = VectorPid::new(PidGains {
            kp: 10.0,
            ki: 0.0,
            kd: 0.0,
            output_clamp: Some(3.0),
        });
        let out = pid.calculate(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0), 0.02);

        assert!((out.length() - 3.0).abs() < EPS);
        // 3-4-5 triangle scaled to length 3
        assert!((out.x - 1.8).abs() < EPS);
        assert!((out.y - 2.4).abs() < EPS);
    }

    #[test]
    fn test_clamp_not_applied_below_limit() {
        let mut pid = VectorPid::new(PidGains {
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            output_clamp: Some(3.0),
        });
        let out = pid.calculate(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 0.02);
        assert_eq!(out, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_zero_dt_is_finite() {
        let mut pid = VectorPid::default();
        let out = pid.calculate(Vec3::ZERO, Vec3::splat(2.0), 0.0);

        assert!(out.is_finite());
        assert_eq!(pid.integral(), Vec3::ZERO);
        assert_eq!(pid.previous_error(), Vec3::splat(2.0));
    }

    #[test]
    fn test_reset_keeps_gains() {
        let gains = PidGains {
            kp: 1.5,
            ki: 0.3,
            kd: 0.1,
            output_clamp: Some(2.0),
        };
        let mut pid = VectorPid::new(gains);
        pid.calculate(Vec3::ZERO, Vec3::ONE, 0.1);
        pid.calculate(Vec3::ZERO, Vec3::ONE, 0.1);
        assert_ne!(pid.integral(), Vec3::ZERO);

        pid.reset();
        assert_eq!(pid.integral(), Vec3::ZERO);
        assert_eq!(pid.previous_error(), Vec3::ZERO);
        assert_eq!(*pid.gains(), gains);
    }

    #[test]
    fn test_integral_accumulates_without_decay() {
        let mut pid = unclamped(0.0, 1.0, 0.0);
        for _ in 0..100 {
            pid.calculate(Vec3::ZERO, Vec3::X, 0.1);
        }
        assert!((pid.integral().x - 10.0).abs() < 1e-3);
    }
}
