use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

use crate::app::App;
use crate::halfblock::HalfBlockCanvas;
use crate::scale::Rgb;
use crate::slider::{self, Tick};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let (map_area, slider_area, status_area) = layout_chunks(frame.area());
    render_map(frame, app, map_area);
    render_slider(frame, app, slider_area);
    render_status_bar(frame, app, status_area);
}

/// Vertical split: map, slider (track + ticks + labels), status bar.
pub fn layout_chunks(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(3), // Slider
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// The clickable slider track row, inset one column on each side so edge
/// labels have room. Mouse handling maps into the same rect.
pub fn slider_track_rect(area: Rect) -> Rect {
    let (_, slider_area, _) = layout_chunks(area);
    Rect {
        x: slider_area.x + 1,
        y: slider_area.y,
        width: slider_area.width.saturating_sub(2),
        height: 1,
    }
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" World Map: {} ", app.metric.label());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Half blocks double the vertical resolution of the inner area
    let mut canvas = HalfBlockCanvas::new(inner.width as usize, inner.height as usize);
    app.renderer.paint(&mut canvas);

    frame.render_widget(MapWidget { canvas }, inner);
}

/// Paints the half-block canvas into the buffer cell by cell.
struct MapWidget {
    canvas: HalfBlockCanvas,
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for cy in 0..area.height as usize {
            for cx in 0..area.width as usize {
                if let Some((ch, fg, bg)) = self.canvas.cell(cx, cy).glyph() {
                    let cell = &mut buf[(area.x + cx as u16, area.y + cy as u16)];
                    cell.set_char(ch).set_fg(rgb(fg));
                    if let Some(bg) = bg {
                        cell.set_bg(rgb(bg));
                    }
                }
            }
        }
    }
}

fn rgb((r, g, b): Rgb) -> Color {
    Color::Rgb(r, g, b)
}

/// Slider: track with thumb on the first row, tick marks on the second,
/// year labels on the third.
struct SliderWidget {
    ticks: Vec<Tick>,
    thumb_column: u16,
    track: Rect,
}

impl Widget for SliderWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for col in 0..self.track.width {
            buf[(self.track.x + col, self.track.y)]
                .set_char('─')
                .set_fg(Color::DarkGray);
        }

        let tick_row = self.track.y + 1;
        let label_row = self.track.y + 2;
        let right_edge = area.x + area.width;

        for tick in &self.ticks {
            let x = self.track.x + tick.column;
            if x >= right_edge {
                continue;
            }
            if tick_row < area.y + area.height {
                buf[(x, tick_row)].set_char('╵').set_fg(Color::DarkGray);
            }
            if tick.labeled && label_row < area.y + area.height {
                let label = tick.year.to_string();
                // Center the label under its tick, clipped to the area
                let half = (label.len() / 2) as u16;
                let start = x.saturating_sub(half).max(area.x);
                for (i, ch) in label.chars().enumerate() {
                    let px = start + i as u16;
                    if px < right_edge {
                        buf[(px, label_row)].set_char(ch).set_fg(Color::Gray);
                    }
                }
            }
        }

        let thumb_x = self.track.x + self.thumb_column.min(self.track.width.saturating_sub(1));
        if thumb_x < right_edge {
            buf[(thumb_x, self.track.y)]
                .set_char('◆')
                .set_fg(Color::Yellow);
        }
    }
}

fn render_slider(frame: &mut Frame, app: &App, area: Rect) {
    if area.height < 3 || area.width < 4 {
        return;
    }
    let track = Rect {
        x: area.x + 1,
        y: area.y,
        width: area.width - 2,
        height: 1,
    };
    let widget = SliderWidget {
        ticks: slider::build_ticks(app.bounds, track.width),
        thumb_column: slider::column_for_year(app.bounds, track.width, app.year),
        track,
    };
    frame.render_widget(widget, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = Line::from(vec![
        Span::styled(" Year: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.year.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | Metric: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.metric.label(), Style::default().fg(Color::Magenta)),
        Span::styled(
            if app.fetching { " | fetching… " } else { " " },
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            "| ←/→:year Home/End:ends drag:slider q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}
