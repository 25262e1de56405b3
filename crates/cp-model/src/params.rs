//! Physical constants of the cart-pendulum plant.

use crate::error::{ModelError, ModelResult};
use cp_core::units::{Accel, Length, Mass};
use cp_core::ensure_positive;

/// Immutable plant parameters in SI units.
///
/// Fields are private so that every instance has passed validation: all four
/// values are finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantParameters {
    cart_mass: f64,
    pendulum_mass: f64,
    pendulum_length: f64,
    gravity: f64,
}

impl PlantParameters {
    /// Create validated parameters.
    ///
    /// # Arguments
    ///
    /// * `cart_mass` - Cart mass M (kg)
    /// * `pendulum_mass` - Pendulum rod mass m (kg)
    /// * `pendulum_length` - Rod length l (m)
    /// * `gravity` - Gravitational acceleration g (m/s^2)
    pub fn new(
        cart_mass: f64,
        pendulum_mass: f64,
        pendulum_length: f64,
        gravity: f64,
    ) -> ModelResult<Self> {
        let check = |v: f64, what: &'static str| {
            ensure_positive(v, what).map_err(|_| ModelError::InvalidModel {
                what: format!("{what} must be finite and positive (got {v})"),
            })
        };
        Ok(Self {
            cart_mass: check(cart_mass, "cart mass")?,
            pendulum_mass: check(pendulum_mass, "pendulum mass")?,
            pendulum_length: check(pendulum_length, "pendulum length")?,
            gravity: check(gravity, "gravity")?,
        })
    }

    /// Create validated parameters from `uom` quantities.
    pub fn from_si(
        cart_mass: Mass,
        pendulum_mass: Mass,
        pendulum_length: Length,
        gravity: Accel,
    ) -> ModelResult<Self> {
        use uom::si::acceleration::meter_per_second_squared;
        use uom::si::length::meter;
        use uom::si::mass::kilogram;

        Self::new(
            cart_mass.get::<kilogram>(),
            pendulum_mass.get::<kilogram>(),
            pendulum_length.get::<meter>(),
            gravity.get::<meter_per_second_squared>(),
        )
    }

    /// The reference benchmark plant: M = 1 kg, m = 0.1 kg, l = 0.5 m, g = 9.81 m/s^2.
    pub fn benchmark() -> Self {
        Self {
            cart_mass: 1.0,
            pendulum_mass: 0.1,
            pendulum_length: 0.5,
            gravity: 9.81,
        }
    }

    pub fn cart_mass(&self) -> f64 {
        self.cart_mass
    }

    pub fn pendulum_mass(&self) -> f64 {
        self.pendulum_mass
    }

    pub fn pendulum_length(&self) -> f64 {
        self.pendulum_length
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// M + m.
    pub fn total_mass(&self) -> f64 {
        self.cart_mass + self.pendulum_mass
    }
}

impl Default for PlantParameters {
    fn default() -> Self {
        Self::benchmark()
    }
}
