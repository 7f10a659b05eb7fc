use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `whole` covered by `value`. An empty whole yields `None` instead of dividing by zero.
/// The result is not capped, going over a goal gives more than 100%.
pub fn minutes_percentage(value: u32, whole: u32) -> Option<Percentage> {
    if whole == 0 {
        return None;
    }
    Percentage::new_opt(value as f64 / whole as f64 * 100.)
}
