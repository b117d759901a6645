use crate::error::{ChartError, ChartResult};

/// Linear mapping from a data domain onto a pixel span.
///
/// The span may be reversed (`start > end`), which is how Y axes grow upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    pub fn domain_to_pixel(self, value: f64, span_start: f64, span_end: f64) -> ChartResult<f64> {
        if !span_start.is_finite() || !span_end.is_finite() {
            return Err(ChartError::InvalidData(
                "pixel span must be finite".to_owned(),
            ));
        }
        if !value.is_finite() {
            return Err(ChartError::InvalidData("value must be finite".to_owned()));
        }

        // Halved operands keep `end - start` finite for domains near `f64::MAX`.
        let normalized = (value * 0.5 - self.domain_start * 0.5)
            / (self.domain_end * 0.5 - self.domain_start * 0.5);
        Ok(span_start + normalized * (span_end - span_start))
    }
}
