//! Collector plate shape encoding

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Absorber plate shape, encoded as an integer feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Hexagonal,
    Circular,
    Triangular,
    Flat,
    Concentric,
}

impl Shape {
    /// All shapes, ordered by code
    pub const ALL: [Shape; 5] = [
        Shape::Hexagonal,
        Shape::Circular,
        Shape::Triangular,
        Shape::Flat,
        Shape::Concentric,
    ];

    /// Look up a shape by its exact (case-sensitive) name
    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|shape| shape.name() == name)
            .ok_or_else(|| ValidationError::InvalidShape {
                given: name.to_string(),
                choices: Self::names(),
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            Shape::Hexagonal => "Hexagonal",
            Shape::Circular => "Circular",
            Shape::Triangular => "Triangular",
            Shape::Flat => "Flat",
            Shape::Concentric => "Concentric",
        }
    }

    /// Integer code fed to the model
    pub fn code(self) -> u8 {
        match self {
            Shape::Hexagonal => 0,
            Shape::Circular => 1,
            Shape::Triangular => 2,
            Shape::Flat => 3,
            Shape::Concentric => 4,
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.name()).collect()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
