use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::{
    app::App,
    clock::Clock,
    session::{GamePhase, Target, SLOT_COUNT},
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

/// Colour for an avocado by how much of its life is left
fn urgency_color(target: &Target, now: u64) -> Color {
    let left = target.remaining(now) as f64 / target.lifetime.max(1) as f64;
    if left > 0.5 {
        Color::Green
    } else if left > 0.25 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn world_best_text(world_best: Option<u64>) -> String {
    match world_best {
        Some(best) => best.to_string(),
        None => "-".to_string(),
    }
}

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = self.engine.session();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title + scores
                Constraint::Length(1), // padding
                Constraint::Min(3),    // slots
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
            ])
            .split(area);

        let header = Line::from(vec![
            Span::styled("whack-avo", bold_style.fg(Color::Green)),
            Span::raw("   "),
            Span::styled(format!("score {}", session.score), bold_style),
            Span::raw("   "),
            Span::styled(format!("best {}", self.personal_best), dim_style),
            Span::raw("   "),
            Span::styled(
                format!("world {}", world_best_text(self.world_best)),
                dim_style,
            ),
            Span::raw("   "),
            Span::styled(format!("{:.1}s", session.elapsed() as f64 / 1000.0), dim_style),
        ]);
        Paragraph::new(header)
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let slot_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, SLOT_COUNT as u32); SLOT_COUNT as usize])
            .split(chunks[2]);

        let now = self.engine.now();
        for (idx, slot_area) in slot_areas.iter().enumerate() {
            let slot = idx as u8 + 1;
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", slot))
                .border_style(dim_style);

            let content = match session
                .active_targets
                .iter()
                .find(|t| t.visible && t.slot == slot)
            {
                Some(target) => Span::styled(
                    target.label.to_string(),
                    bold_style.fg(urgency_color(target, now)),
                ),
                None => Span::styled("·", dim_style),
            };

            // vertically centre the letter inside the hole
            let inner_height = slot_area.height.saturating_sub(2);
            let mut lines = vec![Line::raw(""); (inner_height / 2) as usize];
            lines.push(Line::from(content));

            Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Center)
                .render(*slot_area, buf);
        }

        let legend = match session.phase() {
            GamePhase::Idle => "(enter) start / (esc)ape",
            GamePhase::Playing => "type the letters! / (esc)ape",
            GamePhase::GameOver => "(enter) play again / (r)eset / (esc)ape",
        };
        Paragraph::new(Span::styled(legend, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        let banner = match session.phase() {
            GamePhase::Idle => Some((
                "Whack the avocados!".to_string(),
                "press the letter on each avocado before it sinks. one slip and it's over."
                    .to_string(),
                Color::Green,
            )),
            GamePhase::GameOver => Some((
                "GAME OVER".to_string(),
                format!(
                    "score {}   best {}   world {}",
                    session.score,
                    self.personal_best,
                    world_best_text(self.world_best)
                ),
                Color::Red,
            )),
            GamePhase::Playing => None,
        };

        if let Some((title, detail, color)) = banner {
            let width = area.width.min(60);
            let height = area.height.min(5);
            let popup = Rect::new(
                area.x + (area.width - width) / 2,
                area.y + (area.height - height) / 2,
                width,
                height,
            );
            Clear.render(popup, buf);
            Paragraph::new(vec![
                Line::from(Span::styled(title, bold_style.fg(color))),
                Line::from(Span::raw(detail)),
            ])
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(popup, buf);
        }
    }
}
