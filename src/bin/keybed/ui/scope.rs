//! Output oscilloscope strip.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Render the recent output as a line chart, with peak/RMS in the title.
pub fn render_scope(frame: &mut Frame, area: Rect, audio_buffer: &[f32]) {
    let (peak, rms) = stats(audio_buffer);
    let block = Block::default()
        .title(format!(" Output  peak {peak:.2}  rms {rms:.2} "))
        .borders(Borders::ALL);

    let data: Vec<(f64, f64)> = audio_buffer
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / audio_buffer.len() as f64, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

fn stats(buffer: &[f32]) -> (f32, f32) {
    if buffer.is_empty() {
        return (0.0, 0.0);
    }
    let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
    (peak, rms)
}
