//! Terminal widget surface rendered with `ratatui`.

use std::collections::BTreeMap;

use image::imageops::{self, FilterType};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::color::BackgroundColor;
use crate::widget::{ArtworkView, WidgetId, WidgetViewModel};

use super::{HostError, WidgetHost};

/// Key help shown in the footer, in display order.
const CONTROLS: [(&str, &str); 6] = [
    ("space/p", "play/pause"),
    ("h", "previous"),
    ("l", "next"),
    ("enter/o", "open app"),
    ("r", "refresh"),
    ("q", "quit"),
];

/// Keeps the last committed view of every instance and draws them side by side.
#[derive(Debug, Default)]
pub struct TerminalHost {
    views: BTreeMap<WidgetId, WidgetViewModel>,
    order: Vec<WidgetId>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first instance's view; its controls are the ones the keyboard drives.
    pub fn primary(&self) -> Option<&WidgetViewModel> {
        self.order.first().and_then(|id| self.views.get(id))
    }

    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(3)])
            .split(frame.area());

        if self.order.is_empty() {
            let waiting = Paragraph::new("waiting for first refresh…")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(waiting, chunks[0]);
        } else {
            let n = self.order.len() as u32;
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(self.order.iter().map(|_| Constraint::Ratio(1, n)))
                .split(chunks[0]);
            for (id, area) in self.order.iter().zip(columns.iter()) {
                if let Some(view) = self.views.get(id) {
                    draw_instance(frame, *id, view, *area);
                }
            }
        }

        let footer = Paragraph::new(controls_text())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" controls ")
                    .padding(Padding::horizontal(1)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(footer, chunks[1]);
    }
}

impl WidgetHost for TerminalHost {
    fn commit(&mut self, id: WidgetId, view: &WidgetViewModel) -> Result<(), HostError> {
        if !self.order.contains(&id) {
            self.order.push(id);
        }
        self.views.insert(id, view.clone());
        Ok(())
    }
}

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn draw_instance(frame: &mut Frame, id: WidgetId, view: &WidgetViewModel, area: Rect) {
    let bg = blend_over_black(view.background);
    let block = Block::bordered()
        .title(format!(" widget {id} "))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Two pixel rows per cell, so `rows * 2` columns keeps the art square.
    let art_rows = inner.height.min(inner.width / 3);
    let art_cols = art_rows.saturating_mul(2);
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(art_cols), Constraint::Min(8)])
        .split(inner);

    if art_rows > 0 {
        frame.render_widget(
            Paragraph::new(artwork_lines(&view.artwork, art_cols, art_rows)),
            parts[0],
        );
    }

    let text = vec![
        Line::from(Span::styled(
            view.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(view.subtitle.as_str()),
        Line::from(""),
        Line::from(format!("⏮   {}   ⏭", view.toggle_icon.glyph())),
    ];
    let paragraph = Paragraph::new(text)
        .block(Block::default().padding(Padding::horizontal(1)))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, parts[1]);
}

/// Half-block rendering: each cell shows two vertically stacked pixels.
fn artwork_lines(artwork: &ArtworkView, cols: u16, rows: u16) -> Vec<Line<'static>> {
    let (w, h) = (u32::from(cols), u32::from(rows) * 2);
    let pixel: Box<dyn Fn(u32, u32) -> Color> = match artwork {
        ArtworkView::Bitmap(img) => {
            let scaled = imageops::resize(&**img, w, h, FilterType::Triangle);
            Box::new(move |x, y| {
                let p = scaled.get_pixel(x, y).0;
                Color::Rgb(p[0], p[1], p[2])
            })
        }
        ArtworkView::Placeholder(p) => {
            let [r, g, b] = BackgroundColor(p.argb()).rgb();
            Box::new(move |_, _| Color::Rgb(r, g, b))
        }
    };

    (0..u32::from(rows))
        .map(|row| {
            let spans: Vec<Span<'static>> = (0..w)
                .map(|x| {
                    Span::styled(
                        "▀",
                        Style::default().fg(pixel(x, row * 2)).bg(pixel(x, row * 2 + 1)),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Terminals have no alpha; composite the translucent background over black.
fn blend_over_black(color: BackgroundColor) -> Color {
    let a = u16::from(color.alpha());
    let [r, g, b] = color.rgb().map(|c| ((u16::from(c) * a) / 255) as u8);
    Color::Rgb(r, g, b)
}
