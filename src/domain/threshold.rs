// Threshold domain model

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdsMode {
    #[default]
    Absolute,
    Percentage,
}

/// One colour band. `value: None` marks the base band, which has no lower bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdStep {
    pub value: Option<f64>,
    pub color: String,
}

impl ThresholdStep {
    pub fn base(color: &str) -> Self {
        Self {
            value: None,
            color: color.to_string(),
        }
    }

    pub fn at(value: f64, color: &str) -> Self {
        Self {
            value: Some(value),
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    pub mode: ThresholdsMode,
    pub steps: Vec<ThresholdStep>,
}

impl Thresholds {
    pub fn absolute(steps: Vec<ThresholdStep>) -> Self {
        Self {
            mode: ThresholdsMode::Absolute,
            steps,
        }
    }

    /// A single colour for every value.
    pub fn single(color: &str) -> Self {
        Self::absolute(vec![ThresholdStep::base(color)])
    }

    /// First step unbounded, every following step bounded and strictly ascending.
    pub fn is_well_ordered(&self) -> bool {
        let Some((first, rest)) = self.steps.split_first() else {
            return false;
        };
        if first.value.is_some() {
            return false;
        }

        let mut previous = f64::NEG_INFINITY;
        for step in rest {
            match step.value {
                Some(value) if value > previous => previous = value,
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_ordered_ramp() {
        let ramp = Thresholds::absolute(vec![
            ThresholdStep::base("red"),
            ThresholdStep::at(20.0, "orange"),
            ThresholdStep::at(40.0, "yellow"),
        ]);
        assert!(ramp.is_well_ordered());
        assert!(Thresholds::single("blue").is_well_ordered());
    }

    #[test]
    fn test_rejects_bounded_base_and_descending_steps() {
        let bounded_base = Thresholds::absolute(vec![ThresholdStep::at(0.0, "red")]);
        assert!(!bounded_base.is_well_ordered());

        let descending = Thresholds::absolute(vec![
            ThresholdStep::base("red"),
            ThresholdStep::at(40.0, "yellow"),
            ThresholdStep::at(20.0, "orange"),
        ]);
        assert!(!descending.is_well_ordered());

        let second_base = Thresholds::absolute(vec![
            ThresholdStep::base("red"),
            ThresholdStep::base("green"),
        ]);
        assert!(!second_base.is_well_ordered());

        assert!(!Thresholds::absolute(Vec::new()).is_well_ordered());
    }
}
