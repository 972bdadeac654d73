use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0.round())
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

/// Share of `value` in `whole`. An empty whole has no meaningful share, so it yields `None`.
pub fn seconds_percentage(value: u64, whole: u64) -> Option<Percentage> {
    if whole == 0 {
        return None;
    }
    Percentage::new_opt(value as f64 / whole as f64 * 100.)
}

#[cfg(test)]
mod tests {
    use super::seconds_percentage;

    #[test]
    fn test_seconds_percentage() {
        assert_eq!(*seconds_percentage(3, 4).unwrap(), 75.);
        assert_eq!(seconds_percentage(1, 3).unwrap().to_string(), "33%");
        assert!(seconds_percentage(0, 0).is_none());
    }
}
