use std::sync::Arc;

use crate::actions::control_targets;
use crate::artwork::DecodedArtwork;
use crate::color::BackgroundColor;
use crate::reconcile::TrackDisplayState;

use super::{ArtworkView, Placeholder, ToggleIcon, WidgetViewModel};

/// Build the view for one widget instance.
pub fn render(
    state: &TrackDisplayState,
    artwork: &DecodedArtwork,
    color: BackgroundColor,
    launch_command: &[String],
) -> WidgetViewModel {
    // Empty decodes take the placeholder path too.
    let artwork = match artwork {
        DecodedArtwork::Bitmap(img) if img.width() > 0 && img.height() > 0 => {
            ArtworkView::Bitmap(Arc::clone(img))
        }
        _ => ArtworkView::Placeholder(Placeholder::DarkerGray),
    };

    let toggle_icon = if state.is_playing {
        ToggleIcon::Pause
    } else {
        ToggleIcon::Play
    };

    WidgetViewModel {
        title: state.title.clone(),
        subtitle: state.subtitle.clone(),
        artwork,
        background: color,
        toggle_icon,
        actions: control_targets(launch_command),
    }
}
