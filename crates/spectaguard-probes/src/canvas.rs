use crate::hashing::content_hash;
use crate::platform::CanvasSurface;
use crate::probe::Probe;
use async_trait::async_trait;
use spectaguard_core::{
    CanvasDetails, CanvasEvidence, ProbeDetails, ProbeId, ProbeResult, ProbeStatus, RawEvidence,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Uniqueness above which the result is a warning.
const WARNING_THRESHOLD: u8 = 70;

/// Characters of the encoded surface kept as display evidence.
const EVIDENCE_PREFIX_LEN: usize = 100;

const IMAGE_FORMAT_MARKER: &str = "data:image/png";

/// Source of wall-clock milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// One drawing instruction of a [`CanvasScene`].
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum DrawOp {
    TextBaseline(&'static str),
    Font(&'static str),
    FillStyle(&'static str),
    FillRect { x: f64, y: f64, w: f64, h: f64 },
    FillText { text: &'static str, x: f64, y: f64 },
    CompositeOperation(&'static str),
    BeginPath,
    Arc { x: f64, y: f64, radius: f64, start: f64, end: f64, anticlockwise: bool },
    ClosePath,
    Fill,
}

/// A fixed drawing rendered onto an offscreen surface.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasScene {
    /// Surface width in pixels
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
    /// Instructions in paint order
    pub ops: Vec<DrawOp>,
}

impl CanvasScene {
    /// Text glyphs, an emoji, a translucent fill and a composited arc.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            width: 200,
            height: 50,
            ops: vec![
                DrawOp::TextBaseline("top"),
                DrawOp::Font("14px Arial"),
                DrawOp::FillStyle("#f60"),
                DrawOp::FillRect { x: 125.0, y: 1.0, w: 62.0, h: 20.0 },
                DrawOp::FillStyle("#069"),
                DrawOp::FillText { text: "Canvas fingerprint test \u{1F512}", x: 2.0, y: 15.0 },
                DrawOp::FillStyle("rgba(102, 204, 0, 0.7)"),
                DrawOp::FillText { text: "Privacy Test 123", x: 4.0, y: 35.0 },
                DrawOp::CompositeOperation("multiply"),
                DrawOp::FillStyle("rgb(255, 0, 255)"),
                DrawOp::BeginPath,
                DrawOp::Arc {
                    x: 50.0,
                    y: 50.0,
                    radius: 50.0,
                    start: 0.0,
                    end: std::f64::consts::TAU,
                    anticlockwise: true,
                },
                DrawOp::ClosePath,
                DrawOp::Fill,
            ],
        }
    }
}

/// Estimates how identifying the platform's raster output is.
///
/// The uniqueness heuristic includes a wall-clock term standing in for
/// hardware rendering variance, so two runs on an unchanged system may score
/// differently.
pub struct CanvasProbe {
    surface: Arc<dyn CanvasSurface>,
    clock: Clock,
}

impl CanvasProbe {
    /// Create a probe rendering onto `surface`, using the system clock.
    #[must_use]
    pub fn new(surface: Arc<dyn CanvasSurface>) -> Self {
        Self {
            surface,
            clock: Arc::new(|| chrono::Utc::now().timestamp_millis()),
        }
    }

    /// Replace the clock feeding the variance term.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl Probe for CanvasProbe {
    fn id(&self) -> ProbeId {
        ProbeId::Canvas
    }

    async fn run(&self) -> ProbeResult {
        let encoded = match self.surface.render(&CanvasScene::standard()) {
            Ok(data) => data,
            Err(e) => {
                warn!(probe = %self.id(), error = %e, "canvas rendering failed");
                return ProbeResult::failed(self.failure_score(), e.to_string());
            }
        };

        let hash = content_hash(&encoded, self.surface.digest_available());
        if hash.is_low_confidence() {
            debug!("digest unavailable, canvas hash is a rolling checksum");
        }

        let uniqueness = canvas_uniqueness(&encoded, (self.clock)());
        let status = if uniqueness > WARNING_THRESHOLD {
            ProbeStatus::Warning
        } else {
            ProbeStatus::Ok
        };

        debug!(uniqueness, data_length = encoded.len(), "canvas evaluated");

        let mut prefix: String = encoded.chars().take(EVIDENCE_PREFIX_LEN).collect();
        prefix.push_str("...");

        ProbeResult::completed(
            status,
            100 - uniqueness,
            ProbeDetails::Canvas(CanvasDetails {
                canvas_hash: hash,
                uniqueness_score: uniqueness,
                data_length: encoded.len(),
            }),
            Some(RawEvidence::Canvas(CanvasEvidence {
                data_url_prefix: prefix,
            })),
        )
    }
}

/// Additive uniqueness heuristic over the encoded surface, 0-100.
///
/// `now_millis` selects a +10/+20/+30 variance bucket.
#[must_use]
pub fn canvas_uniqueness(encoded: &str, now_millis: i64) -> u8 {
    let len = encoded.len();
    let mut score: u8 = 0;

    if len > 10_000 {
        score += 20;
    } else if len > 5_000 {
        score += 10;
    }

    if encoded.contains(IMAGE_FORMAT_MARKER) {
        score += 10;
    }

    // Emoji rendering lengthens the output.
    if len > 8_000 {
        score += 15;
    }

    score += match now_millis.rem_euclid(100) {
        71..=99 => 30,
        41..=70 => 20,
        _ => 10,
    };

    score.min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fixture::FixedCanvas;
    use spectaguard_core::PlatformError;

    fn fixed_clock(millis: i64) -> Clock {
        Arc::new(move || millis)
    }

    #[test]
    fn test_clock_buckets() {
        let data = "x";
        assert_eq!(canvas_uniqueness(data, 1_000), 10);
        assert_eq!(canvas_uniqueness(data, 1_040), 10);
        assert_eq!(canvas_uniqueness(data, 1_041), 20);
        assert_eq!(canvas_uniqueness(data, 1_070), 20);
        assert_eq!(canvas_uniqueness(data, 1_071), 30);
        assert_eq!(canvas_uniqueness(data, 1_099), 30);
    }

    #[test]
    fn test_length_and_marker_terms() {
        let small = FixedCanvas::png(1_000).output.unwrap();
        assert_eq!(canvas_uniqueness(&small, 0), 20);

        let medium = FixedCanvas::png(6_000).output.unwrap();
        assert_eq!(canvas_uniqueness(&medium, 0), 30);

        let emoji = FixedCanvas::png(9_000).output.unwrap();
        assert_eq!(canvas_uniqueness(&emoji, 0), 45);

        let large = FixedCanvas::png(12_000).output.unwrap();
        assert_eq!(canvas_uniqueness(&large, 99), 75);
    }

    #[test]
    fn test_standard_scene_shape() {
        let scene = CanvasScene::standard();
        assert_eq!((scene.width, scene.height), (200, 50));
        assert!(scene
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::CompositeOperation("multiply"))));
    }

    #[tokio::test]
    async fn test_probe_warning_for_large_output() {
        let probe = CanvasProbe::new(Arc::new(FixedCanvas::png(12_000))).with_clock(fixed_clock(99));
        let result = probe.run().await;

        assert_eq!(result.status, ProbeStatus::Warning);
        assert_eq!(result.score, 25);
        let Some(RawEvidence::Canvas(evidence)) = result.raw else {
            panic!("expected canvas evidence");
        };
        assert_eq!(evidence.data_url_prefix.chars().count(), EVIDENCE_PREFIX_LEN + 3);
    }

    #[tokio::test]
    async fn test_probe_ok_for_small_output() {
        let probe = CanvasProbe::new(Arc::new(FixedCanvas::png(1_000))).with_clock(fixed_clock(5));
        let result = probe.run().await;

        assert_eq!(result.status, ProbeStatus::Ok);
        assert_eq!(result.score, 80);
    }

    #[tokio::test]
    async fn test_score_may_vary_across_runs() {
        // The clock term means identical output can score differently; only
        // the bounds are stable.
        let surface = Arc::new(FixedCanvas::png(6_000));
        for millis in [0, 50, 90] {
            let result = CanvasProbe::new(surface.clone())
                .with_clock(fixed_clock(millis))
                .run()
                .await;
            assert!((50..=70).contains(&result.score), "score {}", result.score);
        }
    }

    #[tokio::test]
    async fn test_render_failure() {
        let surface = FixedCanvas::failing(PlatformError::Unavailable("2d context".to_string()));
        let result = CanvasProbe::new(Arc::new(surface)).run().await;
        assert_eq!(result.status, ProbeStatus::Failed);
        assert_eq!(result.score, 0);
        assert!(result.details.is_none());
    }

    #[tokio::test]
    async fn test_checksum_fallback_flagged() {
        let surface = FixedCanvas::png(2_000).without_digest();
        let result = CanvasProbe::new(Arc::new(surface)).run().await;
        let Some(ProbeDetails::Canvas(details)) = result.details else {
            panic!("expected canvas details");
        };
        assert!(details.canvas_hash.is_low_confidence());
    }
}
