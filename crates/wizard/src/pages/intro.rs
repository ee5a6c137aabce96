use color_eyre::Result;
use pdd_core::Session;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::tui::Frame;

use super::Page;

const STEPS: [(&str, &str); 4] = [
    ("2 Project", "land area, tree density, species and duration"),
    ("3 Estimate", "projected trees, biomass, CO2e and usable credits"),
    ("4 Sections", "the narrative chapters of the PDD"),
    ("5 Export", "fill the DOCX template and save the document"),
];

/// Landing page explaining the workflow.
pub struct IntroPage;

impl Page for IntroPage {
    fn title(&self) -> &str {
        "Intro"
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, session: &Session) -> Result<()> {
        let heading = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD);
        let key = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(Span::styled("Agroforestry PDD wizard", heading)),
            Line::raw(""),
            Line::raw(
                "Collects the facts of an agroforestry plantation, estimates the carbon \
                 credits it can generate and writes a Project Design Document (PDD) draft.",
            ),
            Line::raw(""),
        ];
        for (step, what) in STEPS {
            lines.push(Line::from(vec![
                Span::styled(format!("  {step:<12}"), key),
                Span::raw(what),
            ]));
        }
        lines.extend([
            Line::raw(""),
            Line::from(vec![
                Span::raw("Session "),
                Span::styled(session.id().to_string(), Style::default().fg(Color::Cyan)),
                Span::raw(format!(" is {}.", session.state())),
            ]),
            Line::raw(""),
            Line::from(vec![
                Span::styled("1-5", key),
                Span::raw(" / "),
                Span::styled("[ ]", key),
                Span::raw(": switch step   "),
                Span::styled("d", key),
                Span::raw(": show entered data   "),
                Span::styled("q", key),
                Span::raw(": quit"),
            ]),
        ]);

        let para = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Welcome "))
            .wrap(Wrap { trim: false });
        frame.render_widget(para, area);
        Ok(())
    }
}
