//! Filter state: which transforms the compositor applies on the next tick.

use crate::filters::ColorFilter;
use std::fmt;

/// One press of a filter control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterSelection {
    Mirror,
    Grayscale,
    Thermal,
    None,
}

/// Mirror flag plus at most one color filter.
///
/// Grayscale and thermal share a single slot, so they can never be enabled
/// together; mirroring is independent and composes with either.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    mirrored: bool,
    color: Option<ColorFilter>,
}

impl FilterState {
    pub const fn new(mirrored: bool, color: Option<ColorFilter>) -> Self {
        Self { mirrored, color }
    }

    pub fn mirrored(&self) -> bool {
        self.mirrored
    }

    pub fn grayscale_enabled(&self) -> bool {
        self.color == Some(ColorFilter::Grayscale)
    }

    pub fn thermal_enabled(&self) -> bool {
        self.color == Some(ColorFilter::Thermal)
    }

    pub fn color_filter(&self) -> Option<ColorFilter> {
        self.color
    }

    /// State after one press of `selection`.
    ///
    /// Mirror toggles only the mirror. Grayscale and thermal each toggle
    /// themselves and switch the other off. None clears everything.
    #[must_use]
    pub fn select(self, selection: FilterSelection) -> Self {
        match selection {
            FilterSelection::Mirror => Self {
                mirrored: !self.mirrored,
                ..self
            },
            FilterSelection::Grayscale => self.toggle_color(ColorFilter::Grayscale),
            FilterSelection::Thermal => self.toggle_color(ColorFilter::Thermal),
            FilterSelection::None => Self::default(),
        }
    }

    fn toggle_color(self, filter: ColorFilter) -> Self {
        let color = if self.color == Some(filter) {
            None
        } else {
            Some(filter)
        };
        Self { color, ..self }
    }

    /// Display label; derived from the color filter, never read back.
    pub fn label(&self) -> &'static str {
        self.color.map_or("none", ColorFilter::label)
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mirrored {
            write!(f, "{} (mirrored)", self.label())
        } else {
            f.write_str(self.label())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [FilterState; 6] = [
        FilterState::new(false, None),
        FilterState::new(true, None),
        FilterState::new(false, Some(ColorFilter::Grayscale)),
        FilterState::new(true, Some(ColorFilter::Grayscale)),
        FilterState::new(false, Some(ColorFilter::Thermal)),
        FilterState::new(true, Some(ColorFilter::Thermal)),
    ];

    #[test]
    fn grayscale_and_thermal_never_both_on() {
        for start in ALL {
            for sel in [
                FilterSelection::Mirror,
                FilterSelection::Grayscale,
                FilterSelection::Thermal,
                FilterSelection::None,
            ] {
                let next = start.select(sel);
                assert!(!(next.grayscale_enabled() && next.thermal_enabled()));
            }
        }
    }

    #[test]
    fn enabling_one_color_filter_clears_the_other() {
        let thermal = FilterState::new(true, Some(ColorFilter::Thermal));
        let gray = thermal.select(FilterSelection::Grayscale);
        assert!(gray.grayscale_enabled());
        assert!(!gray.thermal_enabled());
        assert!(gray.mirrored());

        let back = gray.select(FilterSelection::Thermal);
        assert!(back.thermal_enabled());
        assert!(!back.grayscale_enabled());
    }

    #[test]
    fn selecting_the_active_filter_turns_it_off() {
        let gray = FilterState::default().select(FilterSelection::Grayscale);
        assert_eq!(gray.select(FilterSelection::Grayscale), FilterState::default());
    }

    #[test]
    fn none_clears_everything() {
        for start in ALL {
            let cleared = start.select(FilterSelection::None);
            assert!(!cleared.mirrored());
            assert!(!cleared.grayscale_enabled());
            assert!(!cleared.thermal_enabled());
        }
    }

    #[test]
    fn mirror_toggles_independently() {
        let s = FilterState::new(false, Some(ColorFilter::Thermal)).select(FilterSelection::Mirror);
        assert!(s.mirrored());
        assert!(s.thermal_enabled());
        assert!(!s.select(FilterSelection::Mirror).mirrored());
    }

    #[test]
    fn label_follows_color_filter() {
        assert_eq!(FilterState::default().label(), "none");
        assert_eq!(FilterState::new(true, None).label(), "none");
        assert_eq!(FilterState::new(false, Some(ColorFilter::Thermal)).label(), "thermal");
        assert_eq!(
            FilterState::new(true, Some(ColorFilter::Grayscale)).to_string(),
            "grayscale (mirrored)"
        );
    }
}
