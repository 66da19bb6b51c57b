//! Notifications the placement session raises for the UI.

use std::fmt;

/// Something the user should be told about.
///
/// All of these are transient; the session stays usable after any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementEvent {
    /// Placement was requested with nothing selected.
    NoSelection,
    /// No surface under the tap, or tracking has not started.
    NoSurface,
    /// A new placement started loading `requested` models.
    Placing { generation: u64, requested: usize },
    /// One body's model could not be loaded and is left out.
    AssetFailed {
        index: usize,
        name: String,
        reason: String,
    },
    /// Every load of the placement has resolved.
    Ready {
        generation: u64,
        placed: usize,
        omitted: usize,
    },
    /// A model was shrunk to keep the camera outside it. Raised at most once
    /// per placement.
    AutoShrunk { index: usize },
    /// The camera is inside the body at `index`.
    InsideModel { index: usize },
    /// All placed models were removed.
    Cleared,
}

impl fmt::Display for PlacementEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSelection => write!(f, "select at least one body first"),
            Self::NoSurface => write!(f, "no surface found yet, move the phone slowly"),
            Self::Placing { requested, .. } => write!(f, "loading {requested} model(s)"),
            Self::AssetFailed { name, reason, .. } => {
                write!(f, "failed to load model for {name}: {reason}")
            }
            Self::Ready {
                placed, omitted, ..
            } => {
                if *omitted == 0 {
                    write!(f, "{placed} model(s) placed")
                } else {
                    write!(f, "{placed} model(s) placed, {omitted} unavailable")
                }
            }
            Self::AutoShrunk { .. } => write!(f, "model was auto-shrunk to fit"),
            Self::InsideModel { .. } => write!(f, "you're inside the model, step back"),
            Self::Cleared => write!(f, "cleared"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_mentions_omitted() {
        let event = PlacementEvent::Ready {
            generation: 1,
            placed: 2,
            omitted: 1,
        };
        assert_eq!(event.to_string(), "2 model(s) placed, 1 unavailable");
    }
}
