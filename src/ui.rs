use dalgona::{
    challenge::{Outcome, Rgb},
    flow::FlowStage,
    timers::TimerKind,
    variant::Variant,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

const POINT_GLYPH: &str = "●";
const NEEDLE_GLYPH: &str = "▼";

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let stage = self.flow.stage();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(Line::from(vec![
            Span::styled("dalgona", bold_style.fg(Color::Yellow)),
            Span::styled(format!("  {stage}"), Style::default().add_modifier(Modifier::DIM)),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        match stage {
            FlowStage::Intro => render_message(
                "Press Enter to start",
                bold_style.fg(Color::Yellow),
                chunks[1],
                buf,
            ),
            FlowStage::Instruction => self.render_instruction(chunks[1], buf),
            FlowStage::Selection => self.render_selection(chunks[1], buf),
            FlowStage::Challenge => self.render_challenge(chunks[1], buf),
            _ => self.render_result(chunks[1], buf),
        }

        Paragraph::new(Span::styled(footer(stage), italic_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }
}

fn footer(stage: FlowStage) -> &'static str {
    match stage {
        FlowStage::Intro | FlowStage::Instruction => "(enter) next / (r)eset / (esc)ape",
        FlowStage::Selection => "(1-4) shape / (enter) start / (r)eset / (esc)ape",
        FlowStage::Challenge => "(←/→) move needle / (↑) lift / (r)eset / (esc)ape",
        _ => "(r)eset / (esc)ape",
    }
}

/// One line of text in the vertical middle of `area`
fn render_message(text: &str, style: Style, area: Rect, buf: &mut Buffer) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(1) / 2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);
    Paragraph::new(Span::styled(text.to_string(), style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(rows[1], buf);
}

impl App {
    fn render_instruction(&self, area: Rect, buf: &mut Buffer) {
        let scene = self.flow.host();
        let status = if let Some(left) = self.flow.timers().remaining(TimerKind::InstructionAdvance) {
            format!("choose your shape in {left:.1}s")
        } else if let Some(left) = scene.video_remaining() {
            format!("how to play ... {left:.1}s")
        } else {
            "press enter when ready".to_string()
        };
        render_message(
            &status,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            area,
            buf,
        );
    }

    fn render_selection(&self, area: Rect, buf: &mut Buffer) {
        let selected = self.flow.selection().variant();
        let lines = Variant::ALL
            .iter()
            .map(|&v| {
                let count = self.flow.selection().point_set(v).len();
                let label = format!(
                    "({}) {:<10} {count} points",
                    v.index() + 1,
                    self.config.variant_name(v)
                );
                if v == selected {
                    Line::from(Span::styled(
                        format!("> {label}"),
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::raw(format!("  {label}")))
                }
            })
            .collect::<Vec<Line>>();

        let top = area.height.saturating_sub(lines.len() as u16) / 2;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(top), Constraint::Min(0)])
            .split(area);
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(rows[1], buf);
    }

    fn render_challenge(&self, area: Rect, buf: &mut Buffer) {
        let challenge = self.flow.challenge();
        let timer = challenge.timer();
        let tracker = challenge.tracker();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // time left
                Constraint::Length(3), // hold
                Constraint::Min(0),
                Constraint::Length(1), // needle
                Constraint::Length(1), // points
                Constraint::Length(1), // ids
                Constraint::Min(0),
            ])
            .split(area);

        let time_ratio = timer.remaining_fraction().clamp(0.0, 1.0);
        let time_color = if time_ratio > 0.5 {
            Color::Green
        } else if time_ratio > 0.2 {
            Color::Yellow
        } else {
            Color::Red
        };
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("time"))
            .gauge_style(Style::default().fg(time_color))
            .ratio(time_ratio)
            .label(format!("{:.1}s left", timer.remaining()))
            .render(chunks[0], buf);

        Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(format!(
                "hold {}/{}",
                tracker.completed_count(),
                tracker.targets().len()
            )))
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(tracker.progress().clamp(0.0, 1.0))
            .render(chunks[1], buf);

        let needle = self.needle_point();
        let ids = tracker
            .targets()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<String>>();
        let cell_width = ids.iter().map(|s| s.width()).max().unwrap_or(1).max(1) + 2;

        let pad = |s: &str| {
            let fill = cell_width.saturating_sub(s.width());
            let left = fill / 2;
            format!("{}{s}{}", " ".repeat(left), " ".repeat(fill - left))
        };

        let mut needle_row = Vec::new();
        let mut point_row = Vec::new();
        let mut id_row = Vec::new();
        for (id, label) in tracker.targets().iter().zip(&ids) {
            let marker = if needle == Some(*id) { NEEDLE_GLYPH } else { " " };
            needle_row.push(Span::styled(pad(marker), Style::default().fg(Color::Yellow)));

            let accent = tracker
                .point(*id)
                .map(|p| p.accent())
                .unwrap_or_default();
            let mut style = Style::default().fg(color(accent));
            if tracker.engaged() == Some(*id) {
                style = style.add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK);
            }
            point_row.push(Span::styled(pad(POINT_GLYPH), style));
            id_row.push(Span::styled(pad(label.as_str()), Style::default().add_modifier(Modifier::DIM)));
        }

        for (row, spans) in [(3, needle_row), (4, point_row), (5, id_row)] {
            Paragraph::new(Line::from(spans))
                .alignment(Alignment::Center)
                .render(chunks[row], buf);
        }
    }

    fn render_result(&self, area: Rect, buf: &mut Buffer) {
        let stage = self.flow.stage();
        let timers = self.flow.timers();
        let Some((variant, outcome)) = self.flow.last_result() else {
            render_message("", Style::default(), area, buf);
            return;
        };
        let shape = self.config.variant_name(variant);

        let (headline, style) = match (stage, outcome) {
            (FlowStage::ResultPending, Outcome::Success) => (
                format!("the {shape} comes out clean..."),
                Style::default().fg(Color::Green),
            ),
            (FlowStage::ResultPending, Outcome::Failure) => (
                format!("the {shape} cracks..."),
                Style::default().fg(Color::Red),
            ),
            (FlowStage::ResultShown, Outcome::Success) => (
                "SUCCESS".to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            (FlowStage::ResultShown, Outcome::Failure) => (
                "FAILED".to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            _ => (
                "thanks for playing".to_string(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        };

        let countdown = TimerKind::ALL
            .iter()
            .find_map(|&kind| timers.remaining(kind).map(|left| (kind, left)))
            .map(|(kind, left)| match kind {
                TimerKind::AutoReset => format!("back to start in {left:.0}s"),
                _ => format!("{left:.0}s"),
            })
            .unwrap_or_default();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(area.height.saturating_sub(2) / 2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);
        Paragraph::new(Span::styled(headline, style))
            .alignment(Alignment::Center)
            .render(rows[1], buf);
        Paragraph::new(Span::styled(
            countdown,
            Style::default().add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(rows[2], buf);
    }
}
