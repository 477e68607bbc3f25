//! Command-line options.

use crate::camera::{Constraints, FacingMode};
use crate::filters::ColorFilter;
use crate::state::FilterState;
use clap::{Parser, ValueEnum};

/// Color filter to start with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StartFilter {
    #[default]
    None,
    Grayscale,
    Thermal,
}

/// Camera direction as spelled on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Facing {
    #[default]
    User,
    Environment,
}

impl From<Facing> for FacingMode {
    fn from(facing: Facing) -> Self {
        match facing {
            Facing::User => FacingMode::User,
            Facing::Environment => FacingMode::Environment,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "webcam-filters")]
#[command(about = "Live webcam preview with grayscale, thermal and mirror filters")]
#[command(version)]
pub struct Config {
    /// Camera index to open
    #[arg(short, long, default_value_t = 0)]
    pub camera: u32,

    /// Preferred capture width; the device may pick something close
    #[arg(long, default_value_t = 1920)]
    pub ideal_width: u32,

    /// Preferred capture height
    #[arg(long, default_value_t = 1080)]
    pub ideal_height: u32,

    /// Preferred camera direction
    #[arg(long, value_enum, default_value_t = Facing::User)]
    pub facing: Facing,

    /// Start with the image mirrored
    #[arg(long)]
    pub mirror: bool,

    /// Color filter to start with
    #[arg(long, value_enum, default_value_t = StartFilter::None)]
    pub filter: StartFilter,

    /// Open the camera immediately instead of waiting for Space
    #[arg(long)]
    pub autostart: bool,

    /// Initial window width
    #[arg(long, default_value_t = 960)]
    pub window_width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 540)]
    pub window_height: u32,
}

impl Config {
    pub fn constraints(&self) -> Constraints {
        Constraints {
            width: self.ideal_width,
            height: self.ideal_height,
            facing: self.facing.into(),
        }
    }

    pub fn initial_filter(&self) -> FilterState {
        let color = match self.filter {
            StartFilter::None => None,
            StartFilter::Grayscale => Some(ColorFilter::Grayscale),
            StartFilter::Thermal => Some(ColorFilter::Thermal),
        };
        FilterState::new(self.mirror, color)
    }
}
