use boxclick::{
    placement::Position,
    round::{BoxStyle, RoundView},
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{Action, App};

const HORIZONTAL_MARGIN: u16 = 1;
const BUTTON_GAP: u16 = 2;
const LEVEL_PREFIX: &str = "Level: ";
const TITLE: &str = "Click the Box: Reaction Test";
const START_HINT: &str = "Press Start (or Enter) to begin";
const LEGEND: &str = "(click) box / button   (enter) start / retry   (1-4) level   (r)eset   (esc)ape";

/// Clickable regions of the last drawn frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenLayout {
    /// Difficulty buttons, after the "Level:" label
    pub selector: Rect,
    /// Inside of the play area border; boxes are positioned relative to it
    pub play: Rect,
    pub buttons: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
    pub action: Action,
    pub active: bool,
}

impl Button {
    pub fn new(label: &str, action: Action) -> Self {
        Self {
            label: label.to_string(),
            action,
            active: false,
        }
    }
}

/// Lay buttons out left to right on the first row of `area`
pub fn layout_buttons(area: Rect, buttons: &[Button]) -> Vec<(Rect, Action)> {
    let right = area.right();
    let mut x = area.x;
    let mut placed = Vec::with_capacity(buttons.len());

    for button in buttons {
        if x >= right {
            break;
        }
        let width = button.label.width() as u16;
        placed.push((
            Rect::new(x, area.y, width.min(right - x), area.height.min(1)),
            button.action,
        ));
        x = x.saturating_add(width).saturating_add(BUTTON_GAP);
    }

    placed
}

fn render_buttons(f: &mut Frame, area: Rect, buttons: &[Button]) {
    for ((rect, _), button) in layout_buttons(area, buttons).into_iter().zip(buttons) {
        let style = if button.active {
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        };
        f.render_widget(
            Paragraph::new(Span::styled(button.label.as_str(), style)),
            rect,
        );
    }
}

/// Centre message of the play area, most urgent first
fn play_message(view: &RoundView) -> Option<(&'static str, Style)> {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    if let Some(error) = view.error {
        Some((error, bold.fg(Color::Red)))
    } else if view.show_success {
        Some((boxclick::round::SUCCESS_MESSAGE, bold.fg(Color::Green)))
    } else if view.show_waiting {
        Some((
            boxclick::round::WAITING_MESSAGE,
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
    } else if view.show_start {
        Some((START_HINT, Style::default().fg(Color::Gray)))
    } else {
        None
    }
}

pub fn draw(app: &mut App, f: &mut Frame) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // difficulty selector
            Constraint::Min(6),    // play area
            Constraint::Length(3), // statistics
            Constraint::Length(1), // buttons
            Constraint::Length(1), // legend
        ])
        .split(area);

    let play_block = Block::bordered().title(" Play area ");
    let play = play_block.inner(chunks[2]);

    let selector_row = chunks[1];
    let prefix_width = (LEVEL_PREFIX.width() as u16).min(selector_row.width);
    let selector = Rect::new(
        selector_row.x + prefix_width,
        selector_row.y,
        selector_row.width - prefix_width,
        selector_row.height,
    );

    app.layout = Some(ScreenLayout {
        selector,
        play,
        buttons: chunks[4],
    });
    let view = app.machine.view();
    let box_size = app.machine.geometry().box_size;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    f.render_widget(
        Paragraph::new(Span::styled(TITLE, bold.fg(Color::Cyan))).alignment(Alignment::Center),
        chunks[0],
    );

    f.render_widget(Paragraph::new(LEVEL_PREFIX), selector_row);
    render_buttons(f, selector, &app.selector_buttons());

    f.render_widget(play_block, chunks[2]);
    if view.show_boxes {
        for b in &view.boxes {
            let color = match b.style {
                BoxStyle::Target => Color::Green,
                BoxStyle::Decoy => Color::Red,
            };
            let rect = app
                .cells
                .box_rect(play, Position::new(b.top, b.left), box_size);
            f.render_widget(Block::default().style(Style::default().bg(color)), rect);
        }
    }
    if let Some((message, style)) = play_message(&view) {
        let row = Rect::new(play.x, play.y + play.height / 2, play.width, play.height.min(1));
        f.render_widget(
            Paragraph::new(Span::styled(message, style)).alignment(Alignment::Center),
            row,
        );
    }

    let stats = Paragraph::new(Line::from(vec![
        Span::raw("Last: "),
        Span::styled(view.last.clone(), bold),
        Span::raw("   Average: "),
        Span::styled(view.average.clone(), bold),
        Span::raw("   Best: "),
        Span::styled(view.best.clone(), bold.fg(Color::Green)),
        Span::raw(format!("   Rounds: {}", view.samples)),
    ]))
    .block(Block::bordered().title(" Statistics "))
    .alignment(Alignment::Center);
    f.render_widget(stats, chunks[3]);

    render_buttons(f, chunks[4], &app.action_buttons());

    f.render_widget(
        Paragraph::new(Span::styled(
            LEGEND,
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        chunks[5],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxclick::config::Config;
    use boxclick::round::WRONG_TARGET_MESSAGE;
    use rand::{rngs::StdRng, SeedableRng};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use std::time::{Duration, Instant};

    fn render(app: &mut App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn count_bg(buffer: &Buffer, color: Color) -> usize {
        buffer.content().iter().filter(|c| c.bg == color).count()
    }

    fn revealed_app() -> (App, Instant) {
        let mut app = App::new(&Config::default(), StdRng::seed_from_u64(11));
        render(&mut app, 100, 40);
        let t0 = Instant::now();
        app.apply(Action::Start, t0);
        let revealed = t0 + Duration::from_millis(2000);
        assert!(app.on_tick(revealed));
        (app, revealed)
    }

    #[test]
    fn test_layout_buttons_left_to_right() {
        let buttons = [
            Button::new(" Start ", Action::Start),
            Button::new(" Reset stats ", Action::ResetStats),
        ];
        let placed = layout_buttons(Rect::new(2, 10, 60, 1), &buttons);

        assert_eq!(placed[0], (Rect::new(2, 10, 7, 1), Action::Start));
        assert_eq!(placed[1], (Rect::new(11, 10, 13, 1), Action::ResetStats));
    }

    #[test]
    fn test_layout_buttons_clips_to_area() {
        let buttons = [
            Button::new(" Start ", Action::Start),
            Button::new(" Reset stats ", Action::ResetStats),
        ];
        let placed = layout_buttons(Rect::new(0, 0, 12, 1), &buttons);

        assert_eq!(placed.len(), 2);
        assert_eq!(placed[1].0, Rect::new(9, 0, 3, 1));

        assert!(layout_buttons(Rect::new(0, 0, 5, 1), &buttons[1..])
            .iter()
            .all(|(r, _)| r.width <= 5));
    }

    #[test]
    fn test_idle_screen() {
        let mut app = App::new(&Config::default(), StdRng::seed_from_u64(1));
        let rendered = text(&render(&mut app, 100, 40));

        assert!(rendered.contains(TITLE));
        assert!(rendered.contains("Level:"));
        assert!(rendered.contains("1 (2 boxes)"));
        assert!(rendered.contains("4 (5 boxes)"));
        assert!(rendered.contains(START_HINT));
        assert!(rendered.contains("Start"));
        assert!(!rendered.contains("Try again"));
        assert!(rendered.contains("Last: —"));
        assert!(rendered.contains("Rounds: 0"));
        assert!(app.layout.is_some());
    }

    #[test]
    fn test_layout_records_play_area() {
        let mut app = App::new(&Config::default(), StdRng::seed_from_u64(1));
        render(&mut app, 100, 40);

        let layout = app.layout.unwrap();
        assert_eq!(layout.play, Rect::new(2, 3, 96, 31));
        assert_eq!(layout.selector.x, 1 + LEVEL_PREFIX.width() as u16);
        assert_eq!(layout.buttons.y, 38);
    }

    #[test]
    fn test_revealed_boxes_are_painted() {
        let (mut app, _) = revealed_app();
        let buffer = render(&mut app, 100, 40);

        // default geometry: 80 px boxes over 10x20 px cells
        assert_eq!(count_bg(&buffer, Color::Green), 32);
        assert_eq!(count_bg(&buffer, Color::Red), 32);
        assert!(!text(&buffer).contains(START_HINT));
    }

    #[test]
    fn test_success_and_error_messages() {
        let (mut app, revealed) = revealed_app();
        let id = app
            .machine
            .boxes()
            .iter()
            .find(|b| b.is_correct)
            .unwrap()
            .id
            .clone();
        app.machine.click(&id, revealed + Duration::from_millis(275));

        let rendered = text(&render(&mut app, 100, 40));
        assert!(rendered.contains(boxclick::round::SUCCESS_MESSAGE));
        assert!(rendered.contains("Last: 275 ms"));
        assert!(rendered.contains("Best: 275 ms"));
        assert!(rendered.contains("Try again"));

        app.apply(Action::TryAgain, revealed + Duration::from_millis(1000));
        let again = revealed + Duration::from_millis(3000);
        assert!(app.on_tick(again));
        let id = app
            .machine
            .boxes()
            .iter()
            .find(|b| !b.is_correct)
            .unwrap()
            .id
            .clone();
        app.machine.click(&id, again);

        let rendered = text(&render(&mut app, 100, 40));
        assert!(rendered.contains(WRONG_TARGET_MESSAGE));
        assert!(!rendered.contains(boxclick::round::SUCCESS_MESSAGE));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let (mut app, _) = revealed_app();
        render(&mut app, 12, 4);
        render(&mut app, 1, 1);
    }
}
