//! What a client is shown after each interaction.
//!
//! Every interaction resolves to a [`FrameView`]: an image, a status line,
//! the label of the primary button, and the prediction currently on display.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::prediction::Prediction;

// ---------------------------------------------------------------------------
// Status images and messages
// ---------------------------------------------------------------------------

pub const IMAGE_GENERATING: &str =
    "https://via.placeholder.com/400x400/667eea/ffffff?text=AI+is+generating...+Click+refresh+in+5+seconds!";
pub const IMAGE_STILL_GENERATING: &str =
    "https://via.placeholder.com/400x400/ff9800/ffffff?text=Still+generating...+Try+again+in+5+seconds!";
pub const IMAGE_ERROR: &str = "https://via.placeholder.com/400x400/ff0000/ffffff?text=Error+Occurred";

pub const MSG_GENERATING: &str = "Generating AI prediction...";
pub const MSG_PROMOTED: &str = "New AI prediction ready!";
pub const MSG_STILL_GENERATING: &str = "AI is still working...";
pub const MSG_REFRESHED: &str = "Refreshed!";
pub const MSG_ERROR: &str = "Error occurred";

pub const LABEL_GENERATE: &str = "Generate New";
pub const LABEL_CHECK_STATUS: &str = "Check Status";
pub const LABEL_CHECK_AGAIN: &str = "Check Again";
pub const LABEL_TRY_AGAIN: &str = "Try Again";

// ---------------------------------------------------------------------------
// FrameView
// ---------------------------------------------------------------------------

/// Presentation returned by trigger, poll and the other interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameView {
    pub image: String,
    pub status_message: String,
    pub button_label: String,
    /// The prediction the client should render alongside the image.
    pub prediction: Prediction,
}

impl FrameView {
    pub fn new(
        image: impl Into<String>,
        status_message: impl Into<String>,
        button_label: impl Into<String>,
        prediction: Prediction,
    ) -> Self {
        Self {
            image: image.into(),
            status_message: status_message.into(),
            button_label: button_label.into(),
            prediction,
        }
    }

    /// Shown right after a trigger.
    pub fn generating(current: Prediction) -> Self {
        Self::new(IMAGE_GENERATING, MSG_GENERATING, LABEL_CHECK_STATUS, current)
    }

    /// Shown when a completed job was just promoted.
    pub fn promoted(prediction: Prediction) -> Self {
        Self::new(prediction.image.clone(), MSG_PROMOTED, LABEL_GENERATE, prediction)
    }

    /// Shown while at least one job is still pending.
    pub fn still_generating(current: Prediction) -> Self {
        Self::new(IMAGE_STILL_GENERATING, MSG_STILL_GENERATING, LABEL_CHECK_AGAIN, current)
    }

    /// Shown when nothing is pending: the current item, unchanged.
    pub fn refreshed(current: Prediction) -> Self {
        Self::new(current.image.clone(), MSG_REFRESHED, LABEL_GENERATE, current)
    }
}

// ---------------------------------------------------------------------------
// Buttons
// ---------------------------------------------------------------------------

/// The four interactions a frame client can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Generate,
    Buy,
    Price,
    Refresh,
}

impl Button {
    /// Map a 1-based button index to its action.
    pub fn from_index(index: u8) -> Result<Self, CoreError> {
        match index {
            1 => Ok(Self::Generate),
            2 => Ok(Self::Buy),
            3 => Ok(Self::Price),
            4 => Ok(Self::Refresh),
            other => Err(CoreError::Validation(format!(
                "Unknown button index {other}. Must be between 1 and 4"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promoted_view_uses_prediction_image() {
        let mut p = Prediction::seed();
        p.image = "https://img/promoted.png".into();
        let view = FrameView::promoted(p);
        assert_eq!(view.image, "https://img/promoted.png");
        assert_eq!(view.status_message, MSG_PROMOTED);
    }

    #[test]
    fn still_generating_keeps_prediction() {
        let seed = Prediction::seed();
        let view = FrameView::still_generating(seed.clone());
        assert_eq!(view.prediction, seed);
        assert_eq!(view.button_label, LABEL_CHECK_AGAIN);
    }

    #[test]
    fn button_indices() {
        assert_eq!(Button::from_index(1).unwrap(), Button::Generate);
        assert_eq!(Button::from_index(4).unwrap(), Button::Refresh);
        assert!(matches!(Button::from_index(0), Err(CoreError::Validation(_))));
        assert!(matches!(Button::from_index(5), Err(CoreError::Validation(_))));
    }
}
