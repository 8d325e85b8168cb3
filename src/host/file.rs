use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use serde::Serialize;
use tracing::debug;

use crate::actions::ControlTargets;
use crate::widget::{ArtworkView, ToggleIcon, WidgetId, WidgetViewModel};

use super::{HostError, WidgetHost};

/// Commits each instance as `widget-<id>.json` (+ `widget-<id>-art.png`)
/// in a directory, for bars and desktop widgets to pick up.
#[derive(Debug, Clone)]
pub struct FileHost {
    dir: PathBuf,
}

#[derive(Serialize)]
struct CommittedView<'a> {
    instance: WidgetId,
    title: &'a str,
    subtitle: &'a str,
    background: String,
    background_argb: u32,
    toggle_icon: ToggleIcon,
    artwork: CommittedArtwork,
    actions: &'a ControlTargets,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum CommittedArtwork {
    Bitmap {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    Placeholder {
        resource: &'static str,
        argb: u32,
    },
}

impl FileHost {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn view_path(&self, id: WidgetId) -> PathBuf {
        self.dir.join(format!("widget-{id}.json"))
    }

    pub fn art_path(&self, id: WidgetId) -> PathBuf {
        self.dir.join(format!("widget-{id}-art.png"))
    }
}

impl WidgetHost for FileHost {
    fn commit(&mut self, id: WidgetId, view: &WidgetViewModel) -> Result<(), HostError> {
        fs::create_dir_all(&self.dir)?;

        let art_path = self.art_path(id);
        let artwork = match &view.artwork {
            ArtworkView::Bitmap(img) => {
                let tmp = art_path.with_extension("png.tmp");
                img.save_with_format(&tmp, ImageFormat::Png)?;
                fs::rename(&tmp, &art_path)?;
                CommittedArtwork::Bitmap {
                    path: art_path,
                    width: img.width(),
                    height: img.height(),
                }
            }
            ArtworkView::Placeholder(p) => {
                remove_if_present(&art_path)?;
                CommittedArtwork::Placeholder {
                    resource: p.resource(),
                    argb: p.argb(),
                }
            }
        };

        let committed = CommittedView {
            instance: id,
            title: &view.title,
            subtitle: &view.subtitle,
            background: view.background.to_string(),
            background_argb: view.background.argb(),
            toggle_icon: view.toggle_icon,
            artwork,
            actions: &view.actions,
        };

        let path = self.view_path(id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&committed)?)?;
        fs::rename(&tmp, &path)?;
        debug!(instance = id, path = %path.display(), "view committed");
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<(), HostError> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}
