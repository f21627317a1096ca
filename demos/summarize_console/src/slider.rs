use summarize::summarization::LengthRange;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SliderError {
    #[error("{label} must be between {min} and {max}, got {value}")]
    OutOfRange {
        label: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("{label} must move in steps of {step} from {min}, got {value}")]
    OffStep {
        label: &'static str,
        value: u32,
        min: u32,
        step: u32,
    },
}

/// A bounded numeric control. Rejects values outside its range or off its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slider {
    label: &'static str,
    range: LengthRange,
    value: u32,
}

impl Slider {
    pub fn new(label: &'static str, range: LengthRange) -> Self {
        Self {
            label,
            range,
            value: range.default,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn range(&self) -> LengthRange {
        self.range
    }

    pub fn set(&mut self, value: u32) -> Result<(), SliderError> {
        self.check(value)?;
        self.value = value;
        Ok(())
    }

    pub fn check(&self, value: u32) -> Result<(), SliderError> {
        if !self.range.contains(value) {
            return Err(SliderError::OutOfRange {
                label: self.label,
                value,
                min: self.range.min,
                max: self.range.max,
            });
        }
        if !self.range.is_on_step(value) {
            return Err(SliderError::OffStep {
                label: self.label,
                value,
                min: self.range.min,
                step: self.range.step,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use summarize::summarization::{MAX_LENGTH_RANGE, MIN_LENGTH_RANGE};

    #[test]
    fn test_starts_at_default() {
        assert_eq!(Slider::new("Max Summary Length", MAX_LENGTH_RANGE).value(), 150);
        assert_eq!(Slider::new("Min Summary Length", MIN_LENGTH_RANGE).value(), 30);
    }

    #[test]
    fn test_set_within_range() {
        let mut slider = Slider::new("Max Summary Length", MAX_LENGTH_RANGE);
        slider.set(500).unwrap();
        assert_eq!(slider.value(), 500);
        slider.set(50).unwrap();
        assert_eq!(slider.value(), 50);
    }

    #[test]
    fn test_rejects_out_of_range_and_keeps_value() {
        let mut slider = Slider::new("Min Summary Length", MIN_LENGTH_RANGE);
        assert_eq!(
            slider.set(0),
            Err(SliderError::OutOfRange {
                label: "Min Summary Length",
                value: 0,
                min: 10,
                max: 200,
            })
        );
        assert!(slider.set(210).is_err());
        assert_eq!(slider.value(), 30);
    }

    #[test]
    fn test_rejects_off_step() {
        let mut slider = Slider::new("Max Summary Length", MAX_LENGTH_RANGE);
        assert!(matches!(slider.set(155), Err(SliderError::OffStep { step: 10, .. })));
        assert_eq!(slider.value(), 150);
    }
}
