use crate::config::RiskThresholds;
use crate::location::Coordinate;
use crate::risk_oracle::interface::{RiskLabel, RiskOracle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Answers every query with the same vegetation index and remembers what it
/// was asked.
pub struct RiskOracleFake {
    vegetation_index: Option<f64>,
    thresholds: RiskThresholds,
    calls: AtomicUsize,
    queried: Mutex<Vec<Coordinate>>,
}

impl RiskOracleFake {
    pub fn new(vegetation_index: Option<f64>, thresholds: RiskThresholds) -> Self {
        Self {
            vegetation_index,
            thresholds,
            calls: AtomicUsize::new(0),
            queried: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn shared(vegetation_index: Option<f64>) -> Arc<Self> {
        Arc::new(Self::new(vegetation_index, RiskThresholds::default()))
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn queried(&self) -> Vec<Coordinate> {
        self.queried
            .lock()
            .map(|queried| queried.clone())
            .unwrap_or_default()
    }
}

impl RiskOracle for RiskOracleFake {
    fn assess(&self, coordinate: Coordinate) -> RiskLabel {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queried) = self.queried.lock() {
            queried.push(coordinate);
        }
        RiskLabel::from_vegetation_index(self.vegetation_index, &self.thresholds)
    }
}
