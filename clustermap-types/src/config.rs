use serde::{Deserialize, Serialize};

/// Padding, in screen pixels, kept free around a region the map is asked
/// to fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgePadding {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl EdgePadding {
    /// Same padding on every edge.
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            left: value,
            right: value,
            bottom: value,
        }
    }

    pub fn is_valid(&self) -> bool {
        [self.top, self.left, self.right, self.bottom]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl Default for EdgePadding {
    fn default() -> Self {
        Self::uniform(50.0)
    }
}

/// Size of the map surface in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(375.0, 812.0)
    }
}

/// Easing used by a layout transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    #[default]
    Spring,
    Linear,
    EaseInEaseOut,
}

/// Transition applied by the host when markers move after a region change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutAnimation {
    pub kind: AnimationKind,
    /// Transition length in milliseconds
    pub duration_ms: u64,
    /// Spring damping in `(0, 1]`, only meaningful for `AnimationKind::Spring`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spring_damping: Option<f64>,
}

impl LayoutAnimation {
    pub fn spring() -> Self {
        Self {
            kind: AnimationKind::Spring,
            duration_ms: 700,
            spring_damping: Some(0.4),
        }
    }

    pub fn linear() -> Self {
        Self {
            kind: AnimationKind::Linear,
            duration_ms: 500,
            spring_damping: None,
        }
    }

    pub fn ease_in_ease_out() -> Self {
        Self {
            kind: AnimationKind::EaseInEaseOut,
            duration_ms: 300,
            spring_damping: None,
        }
    }
}

impl Default for LayoutAnimation {
    fn default() -> Self {
        Self::spring()
    }
}
