//! Piano render surface.
//!
//! Key descriptors arrive in layout units; this module scales them to
//! terminal cells, paints white keys first and black keys over them, and
//! keeps the scale factors around so mouse cells can be mapped back to
//! layout units for hit testing.

use keybed::input::InputDispatcher;
use keybed::layout::{self, KeyDescriptor, KeyKind};
use ratatui::{
    layout::{Alignment, Position, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Paragraph},
    Frame,
};

const WHITE_KEY: Color = Color::Rgb(0xFF, 0xFF, 0xFF);
const WHITE_KEY_ACTIVE: Color = Color::Rgb(0xD3, 0xD3, 0xD3);
const BLACK_KEY: Color = Color::Rgb(0x33, 0x33, 0x33);
const BLACK_KEY_ACTIVE: Color = Color::Rgb(0x55, 0x55, 0x55);
const KEY_SEAM: Color = Color::Rgb(0x33, 0x33, 0x33);

/// Cell-space mapping of one rendered frame.
pub struct PianoGeometry {
    area: Rect,
    scale_x: f32,
    scale_y: f32,
}

impl PianoGeometry {
    /// Map a terminal cell back to layout units and hit test the keys.
    pub fn hit(&self, keys: &[KeyDescriptor], column: u16, row: u16) -> Option<usize> {
        if !self.area.contains(Position::new(column, row)) {
            return None;
        }
        // Probe the center of the cell.
        let x = ((column - self.area.x) as f32 + 0.5) / self.scale_x;
        let y = ((row - self.area.y) as f32 + 0.5) / self.scale_y;
        layout::hit_test(keys, x, y)
    }
}

/// Draw the keyboard and return the geometry used, for hit testing.
pub fn render_piano(
    frame: &mut Frame,
    area: Rect,
    keys: &[KeyDescriptor],
    dispatcher: &InputDispatcher,
) -> PianoGeometry {
    let total = layout::total_width(keys).max(layout::UNIT_WIDTH);
    let geometry = PianoGeometry {
        area,
        scale_x: area.width as f32 / total,
        // The surface keeps the chrome margin below the keys.
        scale_y: area.height as f32 / (layout::FULL_HEIGHT + layout::CHROME_MARGIN),
    };

    // Two passes honor stack order: whites tile the row, blacks sit on top.
    for pass in [KeyKind::White, KeyKind::Black] {
        for (position, key) in keys.iter().enumerate() {
            if key.kind != pass {
                continue;
            }
            if let Some(rect) = cell_rect(&geometry, key) {
                draw_key(frame, rect, key, dispatcher.is_active(position));
            }
        }
    }

    geometry
}

/// Scale a key rect to cells. Edges are rounded (not sizes) so neighboring
/// white keys stay flush; keys partly off the surface are clipped, fully
/// off-surface keys return None.
fn cell_rect(g: &PianoGeometry, key: &KeyDescriptor) -> Option<Rect> {
    let sx0 = (key.rect.x * g.scale_x).round() as i32;
    let sx1 = (((key.rect.x + key.rect.width) * g.scale_x).round() as i32).max(sx0 + 1);
    let sy0 = (key.rect.y * g.scale_y).round() as i32;
    let sy1 = (((key.rect.y + key.rect.height) * g.scale_y).round() as i32).max(sy0 + 1);

    let (w, h) = (g.area.width as i32, g.area.height as i32);
    let x0 = sx0.clamp(0, w);
    let x1 = sx1.clamp(0, w);
    let y0 = sy0.clamp(0, h);
    let y1 = sy1.clamp(0, h);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(Rect::new(
        g.area.x + x0 as u16,
        g.area.y + y0 as u16,
        (x1 - x0) as u16,
        (y1 - y0) as u16,
    ))
}

fn draw_key(frame: &mut Frame, rect: Rect, key: &KeyDescriptor, active: bool) {
    let (bg, fg) = match (key.kind, active) {
        (KeyKind::White, false) => (WHITE_KEY, Color::Rgb(0x55, 0x55, 0x55)),
        (KeyKind::White, true) => (WHITE_KEY_ACTIVE, Color::Rgb(0x33, 0x33, 0x33)),
        (KeyKind::Black, false) => (BLACK_KEY, Color::Rgb(0xCC, 0xCC, 0xCC)),
        (KeyKind::Black, true) => (BLACK_KEY_ACTIVE, Color::Rgb(0xEE, 0xEE, 0xEE)),
    };

    frame.render_widget(Block::default().style(Style::default().bg(bg)), rect);

    // Seam on the left edge of wide white keys so the row reads as keys.
    if key.kind == KeyKind::White && rect.width >= 3 {
        let seam = Rect::new(rect.x, rect.y, 1, rect.height);
        frame.render_widget(Block::default().style(Style::default().bg(KEY_SEAM)), seam);
    }

    // Octave label and uppercased trigger, bottom-aligned inside the key.
    let mut lines: Vec<Line> = Vec::new();
    if let Some(label) = &key.label {
        lines.push(Line::from(label.as_str()));
    }
    if let Some(trigger) = key.trigger {
        lines.push(Line::from(trigger.to_ascii_uppercase().to_string()));
    }
    let text_height = lines.len() as u16;
    if text_height > 0 && rect.height > text_height && rect.width >= 3 {
        let text_area = Rect::new(
            rect.x + 1,
            rect.y + rect.height - text_height,
            rect.width - 1,
            text_height,
        );
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .style(Style::default().fg(fg).bg(bg)),
            text_area,
        );
    }
}
