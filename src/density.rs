// File: ./src/density.rs
use serde::Serialize;
use std::fmt;

/// Coarse size bucket of the displayed list, consumed by layout code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Low,
    Medium,
    High,
}

impl Density {
    /// Up to 3 shown is low, 4 to 6 medium, 7 or more high.
    pub fn classify(count: usize) -> Density {
        match count {
            0..=3 => Density::Low,
            4..=6 => Density::Medium,
            _ => Density::High,
        }
    }

    /// Class name used by the HTML templates.
    pub fn css_class(&self) -> &'static str {
        match self {
            Density::Low => "density-low",
            Density::Medium => "density-medium",
            Density::High => "density-high",
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Density::Low => "low",
            Density::Medium => "medium",
            Density::High => "high",
        };
        f.write_str(name)
    }
}
