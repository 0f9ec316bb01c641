use std::collections::VecDeque;

/// Default number of (step, fraction) samples kept for slope estimation.
pub const DEFAULT_SLOPE_CAPACITY: usize = 32;

/// Fixed-capacity ring buffer of (step, budget-fraction) samples with an
/// ordinary least-squares slope over whatever it currently holds.
#[derive(Clone, Debug)]
pub struct SlopeWindow {
    points: VecDeque<(f64, f64)>,
    capacity: usize,
}

impl Default for SlopeWindow {
    fn default() -> Self {
        Self::new(DEFAULT_SLOPE_CAPACITY)
    }
}

impl SlopeWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.max(2)),
            capacity: capacity.max(2),
        }
    }

    pub fn push(&mut self, step: u64, fraction: f64) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back((step as f64, fraction));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Least-squares slope of fraction over step. Fewer than two samples,
    /// or a degenerate x spread, yields 0.0.
    pub fn slope(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        let n_f = n as f64;
        let mean_x: f64 = self.points.iter().map(|(x, _)| x).sum::<f64>() / n_f;
        let mean_y: f64 = self.points.iter().map(|(_, y)| y).sum::<f64>() / n_f;
        let mut num = 0.0;
        let mut den = 0.0;
        for (x, y) in &self.points {
            num += (x - mean_x) * (y - mean_y);
            den += (x - mean_x) * (x - mean_x);
        }
        if den == 0.0 {
            return 0.0;
        }
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fewer_than_two_points_yields_zero() {
        let mut window = SlopeWindow::default();
        assert_eq!(window.slope(), 0.0);
        window.push(1, 0.5);
        assert_eq!(window.slope(), 0.0);
    }

    #[test]
    fn linear_series_recovers_exact_slope() {
        let mut window = SlopeWindow::default();
        for step in 0..10u64 {
            window.push(step, 0.05 * step as f64);
        }
        assert!((window.slope() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn flat_series_has_zero_slope() {
        let mut window = SlopeWindow::default();
        for step in 0..5u64 {
            window.push(step, 0.3);
        }
        assert!(window.slope().abs() < 1e-12);
    }

    #[test]
    fn duplicate_steps_do_not_divide_by_zero() {
        let mut window = SlopeWindow::new(4);
        window.push(7, 0.1);
        window.push(7, 0.9);
        assert_eq!(window.slope(), 0.0);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut window = SlopeWindow::new(3);
        // Early steep samples are pushed out by a flat tail.
        window.push(0, 0.0);
        window.push(1, 0.9);
        for step in 2..5u64 {
            window.push(step, 0.9);
        }
        assert_eq!(window.len(), 3);
        assert!(window.slope().abs() < 1e-12);
    }
}
