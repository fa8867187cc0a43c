use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Macronutrient breakdown in grams.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Macros {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl Macros {
    pub fn is_valid(&self) -> bool {
        is_valid_amount(self.protein_g) && is_valid_amount(self.carbs_g) && is_valid_amount(self.fat_g)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            protein_g: self.protein_g * factor,
            carbs_g: self.carbs_g * factor,
            fat_g: self.fat_g * factor,
        }
    }

    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            protein_g: round_to(self.protein_g, decimals),
            carbs_g: round_to(self.carbs_g, decimals),
            fat_g: round_to(self.fat_g, decimals),
        }
    }
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Macros) -> Macros {
        Macros {
            protein_g: self.protein_g + rhs.protein_g,
            carbs_g: self.carbs_g + rhs.carbs_g,
            fat_g: self.fat_g + rhs.fat_g,
        }
    }
}

/// Finite and non-negative.
pub fn is_valid_amount(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

pub fn round_to(v: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (v * factor).round() / factor
}
