use color_eyre::Result;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Clear, Paragraph, Wrap},
};

use crate::components::popups::{centered_rect_fixed, draw_popup_frame};
use crate::tui::Frame;

use super::FormPopup;

/// Row of the scrollbar thumb on a track of `track_height` cells, or `None`
/// when every field fits.
pub fn compute_scrollbar_thumb(
    total: usize,
    visible: usize,
    scroll: usize,
    track_height: u16,
) -> Option<usize> {
    if track_height == 0 || total == 0 || visible == 0 || total <= visible {
        return None;
    }

    let max_thumb_y = track_height.saturating_sub(1) as usize;
    let denom = total.saturating_sub(visible).max(1);
    let ratio = (scroll as f32) / (denom as f32);
    let thumb_y = (ratio * (max_thumb_y as f32)).round() as usize;
    Some(thumb_y.min(max_thumb_y))
}

pub fn render_form_popup(popup: &mut FormPopup, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    if area.width < 5 || area.height < 5 {
        return Ok(());
    }

    let w = popup.schema().min_width.min(area.width);
    let h = popup.schema().min_height.min(area.height);
    let dialog = centered_rect_fixed(area, w, h);
    let inner = draw_popup_frame(f, dialog, popup.schema().title.clone());
    f.render_widget(Clear, inner);

    popup.set_last_inner_height(inner.height);

    let mut lines: Vec<Line> = Vec::new();

    if let Some(desc) = &popup.schema().description {
        for l in desc.lines() {
            lines.push(Line::from(Span::styled(
                l.to_string(),
                Style::default().fg(Color::Gray),
            )));
        }
        lines.push(Line::raw(""));
    }

    if !popup.state().global_errors.is_empty() {
        lines.push(
            Line::from("Errors:").style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        );
        for e in &popup.state().global_errors {
            lines.push(Line::from(Span::styled(
                format!("• {e}"),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::raw(""));
    }

    // schema/state are borrowed only after the mutable calls
    popup.ensure_visible(inner.height);
    let (start, end) = popup.visible_bounds(inner.height);
    let schema = popup.schema();
    let state = popup.state();

    for (idx, field) in schema.fields[start..end].iter().enumerate() {
        let focused = start + idx == popup.focused_index();

        let label = if field.required {
            format!("{} *:", field.label)
        } else {
            format!("{}:", field.label)
        };
        let mut spans = vec![Span::styled(
            label,
            Style::default().fg(Color::White).add_modifier(if focused {
                Modifier::BOLD
            } else {
                Modifier::empty()
            }),
        )];

        let value = if focused && popup.is_editing() && field.is_textual() {
            format!("{}▏", popup.input_value())
        } else {
            popup.field_display_value(field)
        };
        let value_style = if focused {
            Style::default().fg(Color::Black).bg(Color::White)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(value, value_style));
        lines.push(Line::from(spans));

        if let Some(h) = &field.help {
            lines.push(Line::from(Span::styled(
                h.as_str(),
                Style::default().fg(Color::DarkGray),
            )));
        }

        if let Some(err) = state.errors.get(&field.key) {
            lines.push(Line::from(Span::styled(
                err.as_str(),
                Style::default().fg(Color::Red),
            )));
        }

        lines.push(Line::raw(""));
    }

    lines.push(
        Line::from(vec![
            Span::styled("Up/Down", Style::default().fg(Color::White)),
            Span::raw(": Navigate   "),
            Span::styled("Enter", Style::default().fg(Color::White)),
            Span::raw(if popup.is_editing() {
                ": Confirm edit   "
            } else {
                ": Edit   "
            }),
            Span::styled("Left/Right", Style::default().fg(Color::White)),
            Span::raw(": Adjust   "),
            Span::styled("Ctrl+S", Style::default().fg(Color::White)),
            Span::raw(": Save   "),
            Span::styled("Esc", Style::default().fg(Color::White)),
            Span::raw(": Cancel"),
        ])
        .fg(Color::DarkGray),
    );

    f.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true }),
        inner,
    );

    let total = popup.field_count();
    let visible = FormPopup::visible_capacity(inner.height);
    if inner.width >= 1 {
        let track = Rect {
            x: inner.x + inner.width.saturating_sub(1),
            y: inner.y,
            width: 1,
            height: inner.height,
        };
        if let Some(thumb) = compute_scrollbar_thumb(total, visible, popup.scroll(), track.height) {
            let track_lines: Vec<Line> = (0..track.height)
                .map(|i| {
                    if i as usize == thumb {
                        Line::from(Span::styled("█", Style::default().fg(Color::Gray)))
                    } else {
                        Line::from(Span::styled("│", Style::default().fg(Color::DarkGray)))
                    }
                })
                .collect();
            f.render_widget(Paragraph::new(Text::from(track_lines)), track);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::compute_scrollbar_thumb;

    #[test]
    fn no_scrollbar_when_everything_fits() {
        assert_eq!(compute_scrollbar_thumb(4, 5, 0, 10), None);
        assert_eq!(compute_scrollbar_thumb(4, 4, 0, 10), None);
        assert_eq!(compute_scrollbar_thumb(10, 3, 0, 0), None);
    }

    #[test]
    fn thumb_moves_from_top_to_bottom() {
        assert_eq!(compute_scrollbar_thumb(10, 4, 0, 11), Some(0));
        assert_eq!(compute_scrollbar_thumb(10, 4, 3, 11), Some(5));
        assert_eq!(compute_scrollbar_thumb(10, 4, 6, 11), Some(10));
        assert_eq!(compute_scrollbar_thumb(10, 4, 9, 11), Some(10));
    }
}
