//! Trailing rolling calculators over a single entity's series
//!
//! Each calculator is fed values in time order and yields `None` until its
//! trailing window is full. Feed one calculator per entity; nothing here knows
//! about entity boundaries.

use statrs::statistics::{Data, Distribution};
use std::collections::VecDeque;

/// LogReturn - ln(price_t / price_{t-1})
#[derive(Debug, Clone, Default)]
pub struct LogReturn {
    prev_price: Option<f64>,
}

impl LogReturn {
    /// Create new LogReturn calculator
    pub fn new() -> Self {
        Self { prev_price: None }
    }

    /// Update with new price
    pub fn update(&mut self, price: f64) -> Option<f64> {
        let ret = self.prev_price.map(|prev| (price / prev).ln());
        self.prev_price = Some(price);
        ret
    }

    /// Compute log returns for a slice of prices
    pub fn compute(prices: &[f64]) -> Vec<Option<f64>> {
        let mut log_returns = Self::new();
        prices.iter().map(|&p| log_returns.update(p)).collect()
    }
}

/// RollingMean - trailing arithmetic mean
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    values: VecDeque<f64>,
}

impl RollingMean {
    /// Create new RollingMean with given window size
    pub fn new(window: usize) -> Self {
        if window == 0 {
            panic!("Window size must be greater than 0");
        }
        Self {
            window,
            values: VecDeque::with_capacity(window),
        }
    }

    /// Add a value and compute the current mean
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);

        if self.values.len() > self.window {
            self.values.pop_front();
        }

        if self.values.len() == self.window {
            Some(self.values.iter().sum::<f64>() / self.window as f64)
        } else {
            None
        }
    }

    /// Compute rolling means for a slice of values
    pub fn compute(window: usize, values: &[f64]) -> Vec<Option<f64>> {
        let mut mean = Self::new(window);
        values.iter().map(|&v| mean.update(v)).collect()
    }
}

/// RollingStd - trailing sample standard deviation (n - 1 denominator)
#[derive(Debug, Clone)]
pub struct RollingStd {
    window: usize,
    values: VecDeque<f64>,
}

impl RollingStd {
    /// Create new RollingStd with given window size
    pub fn new(window: usize) -> Self {
        if window < 2 {
            panic!("Window must be at least 2");
        }
        Self {
            window,
            values: VecDeque::with_capacity(window),
        }
    }

    /// Add a value and compute the current standard deviation
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);

        if self.values.len() > self.window {
            self.values.pop_front();
        }

        if self.values.len() == self.window {
            let data = Data::new(self.values.iter().copied().collect::<Vec<f64>>());
            data.std_dev()
        } else {
            None
        }
    }

    /// Compute rolling standard deviations for a slice of values
    pub fn compute(window: usize, values: &[f64]) -> Vec<Option<f64>> {
        let mut std = Self::new(window);
        values.iter().map(|&v| std.update(v)).collect()
    }
}
