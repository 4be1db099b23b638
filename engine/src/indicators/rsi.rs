// Relative Strength Index (RSI) math with Wilder's smoothing, shared by the
// initializer and the live updater.

pub fn gain_loss(diff: f64) -> (f64, f64) {
    if diff > 0.0 {
        (diff, 0.0)
    } else {
        (0.0, -diff)
    }
}

// RSI from smoothed averages.
//
// No losses and some gains is 100. No movement at all (both averages zero)
// has no defined ratio and is reported as the neutral 50.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WilderAverages {
    pub avg_gain: f64,
    pub avg_loss: f64,
}

impl WilderAverages {
    // SMA of the first `period` moves, Wilder steps after that.
    // None with fewer than period + 1 closes.
    pub fn seed(closes: &[f64], period: usize) -> Option<Self> {
        if period == 0 || closes.len() < period + 1 {
            return None;
        }

        let mut moves = closes.windows(2).map(|w| gain_loss(w[1] - w[0]));

        let (mut gains, mut losses) = (0.0, 0.0);
        for (gain, loss) in moves.by_ref().take(period) {
            gains += gain;
            losses += loss;
        }

        let seeded = WilderAverages {
            avg_gain: gains / period as f64,
            avg_loss: losses / period as f64,
        };
        Some(moves.fold(seeded, |avgs, (gain, loss)| avgs.smoothed(gain, loss, period)))
    }

    // One Wilder step: `avg = (avg * (period - 1) + value) / period`.
    pub fn smoothed(&self, gain: f64, loss: f64, period: usize) -> Self {
        let p = period as f64;
        WilderAverages {
            avg_gain: (self.avg_gain * (p - 1.0) + gain) / p,
            avg_loss: (self.avg_loss * (p - 1.0) + loss) / p,
        }
    }

    pub fn rsi(&self) -> f64 {
        rsi_from_averages(self.avg_gain, self.avg_loss)
    }
}
