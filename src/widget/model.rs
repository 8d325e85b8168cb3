use std::sync::Arc;

use image::RgbaImage;
use serde::Serialize;

use crate::actions::ControlTargets;
use crate::color::BackgroundColor;

/// Identifier of one widget surface managed by the host.
pub type WidgetId = u32;

/// Stock image shown when there is no artwork bitmap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    DarkerGray,
}

impl Placeholder {
    pub fn resource(self) -> &'static str {
        match self {
            Placeholder::DarkerGray => "darker_gray",
        }
    }

    /// Opaque ARGB fill for hosts that draw the placeholder themselves.
    pub fn argb(self) -> u32 {
        match self {
            Placeholder::DarkerGray => 0xFFAA_AAAA,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ArtworkView {
    Bitmap(Arc<RgbaImage>),
    Placeholder(Placeholder),
}

/// Icon on the play/pause control. It shows the action a tap performs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleIcon {
    Play,
    Pause,
}

impl ToggleIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            ToggleIcon::Play => "▶",
            ToggleIcon::Pause => "⏸",
        }
    }
}

/// Everything one widget instance shows for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetViewModel {
    pub title: String,
    pub subtitle: String,
    pub artwork: ArtworkView,
    pub background: BackgroundColor,
    pub toggle_icon: ToggleIcon,
    pub actions: ControlTargets,
}
