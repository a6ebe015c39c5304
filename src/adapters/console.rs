//! Console Renderer - Compact Single-Line Market View
//!
//! Turns a `PollState` into one status line that the CLI redraws in
//! place on every update. Handles the loading state (no snapshot yet)
//! and the stale state (last cycle failed) independently.

use std::io::{self, Write};

use crate::domain::poll_state::PollState;

/// Formats poll state for a terminal.
#[derive(Debug, Clone)]
pub struct ConsoleRenderer {
    /// Asset name shown before the price, e.g. "Bitcoin".
    asset_label: String,
}

impl ConsoleRenderer {
    pub fn new(asset_label: impl Into<String>) -> Self {
        Self {
            asset_label: asset_label.into(),
        }
    }

    /// Render the status line for `state`.
    pub fn render(&self, state: &PollState) -> String {
        let Some(snapshot) = &state.last_good else {
            return match &state.last_error {
                Some(e) => format!("Failed to fetch real-time data: {e}"),
                None => format!("Waiting for first {} market snapshot...", self.asset_label),
            };
        };

        let mut line = String::with_capacity(256);

        if let Some(e) = &state.last_error {
            line.push_str(&format!("[STALE x{}] {e} | ", state.consecutive_failures));
        }

        line.push_str(&format!(
            "{} Price: ${:.2} | Factors: ",
            self.asset_label,
            snapshot.price()
        ));

        let factors: Vec<String> = snapshot
            .features()
            .iter()
            .map(|(feature, value)| format!("{}: {value:.2}", feature.key()))
            .collect();
        line.push_str(&factors.join(" | "));

        line
    }

    /// Redraw the status line on stdout, overwriting the previous one.
    ///
    /// # Errors
    /// Propagates stdout write failures.
    pub fn redraw(&self, state: &PollState) -> io::Result<()> {
        let mut out = io::stdout().lock();
        write!(out, "\r\x1b[2K{}", self.render(state))?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::errors::FetchError;
    use crate::domain::snapshot::{Feature, FeatureSet, MarketSnapshot};

    fn with_snapshot() -> PollState {
        let features = FeatureSet::from_fn(|_| 0.0)
            .with(Feature::MarketSentiment, 0.123)
            .with(Feature::GoldPrices, 1925.4);
        let snapshot = MarketSnapshot::try_new(65_000.0, features, Utc::now()).unwrap();
        PollState::default().advance(Ok(snapshot))
    }

    #[test]
    fn test_loading_line() {
        let renderer = ConsoleRenderer::new("Bitcoin");
        let line = renderer.render(&PollState::default());
        assert_eq!(line, "Waiting for first Bitcoin market snapshot...");
    }

    #[test]
    fn test_error_before_any_data() {
        let renderer = ConsoleRenderer::new("Bitcoin");
        let state = PollState::default().advance(Err(FetchError::UnexpectedStatus { status: 429 }));
        assert_eq!(
            renderer.render(&state),
            "Failed to fetch real-time data: unexpected HTTP status 429"
        );
    }

    #[test]
    fn test_fresh_line_lists_every_factor() {
        let renderer = ConsoleRenderer::new("Bitcoin");
        let line = renderer.render(&with_snapshot());

        assert!(line.starts_with("Bitcoin Price: $65000.00 | Factors: Market_Sentiment: 0.12"));
        assert!(line.contains("Gold_Prices: 1925.40"));
        for feature in Feature::ALL {
            assert!(line.contains(feature.key()), "missing {feature}");
        }
        assert!(!line.contains("STALE"));
    }

    #[test]
    fn test_stale_prefix_keeps_last_price() {
        let renderer = ConsoleRenderer::new("Bitcoin");
        let state = with_snapshot()
            .advance(Err(FetchError::network("connection refused")))
            .advance(Err(FetchError::network("connection refused")));

        let line = renderer.render(&state);
        assert!(line.starts_with("[STALE x2] price source unreachable: connection refused | "));
        assert!(line.contains("Bitcoin Price: $65000.00"));
    }
}
