// Preview Module - terminal stand-in for the LED hardware, plus the key bindings of the control panel
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use std::io::{self, Stdout};

use beamlights::{AnimationState, BeamLayout, Rgb, Settings};

/// What a key press asks the driver to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    /// Button A on the hardware control box
    CycleDisplayMode,
    /// Button B on the hardware control box
    CycleColorMode,
    CyclePattern,
    CycleFirePalette,
    Tap,
    BpmUp,
    BpmDown,
}

pub fn key_action(key: KeyEvent) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(KeyAction::CycleDisplayMode),
        KeyCode::Char('b') | KeyCode::Char('B') => Some(KeyAction::CycleColorMode),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(KeyAction::CyclePattern),
        KeyCode::Char('f') | KeyCode::Char('F') => Some(KeyAction::CycleFirePalette),
        KeyCode::Char(' ') => Some(KeyAction::Tap),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Some(KeyAction::BpmUp),
        KeyCode::Char('-') | KeyCode::Down => Some(KeyAction::BpmDown),
        _ => None,
    }
}

/// Everything the header shows besides the pixels
pub struct Status<'a> {
    pub settings: &'a Settings,
    pub state: &'a AnimationState,
    pub bpm: f64,
    pub beat: Option<u64>,
}

pub struct Preview {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Preview {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(Self { terminal })
    }

    pub fn draw(&mut self, layout: &BeamLayout, frame: &[Rgb], brightness: u8, status: &Status) -> Result<()> {
        self.terminal.draw(|f| render(f, layout, frame, brightness, status))?;
        Ok(())
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        self.terminal.show_cursor().ok();
        disable_raw_mode().ok();
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).ok();
    }
}

/// One text row per beam, in logical order (mirrored beams are flipped back)
fn beam_lines(layout: &BeamLayout, frame: &[Rgb], brightness: u8) -> Vec<Line<'static>> {
    (0..layout.beam_count())
        .map(|beam| {
            let mut spans = vec![Span::styled(format!("{:>2} ", beam), Style::default().fg(Color::Gray))];
            spans.extend((0..layout.beam_height()).map(|offset| {
                let pixel = layout.pixel(frame, beam, offset).scaled(brightness);
                if pixel.is_black() {
                    Span::styled("·", Style::default().fg(Color::DarkGray))
                } else {
                    Span::styled("█", Style::default().fg(Color::Rgb(pixel.r, pixel.g, pixel.b)))
                }
            }));
            Line::from(spans)
        })
        .collect()
}

fn render(f: &mut Frame, layout: &BeamLayout, frame: &[Rgb], brightness: u8, status: &Status) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                                  // Header
            Constraint::Length(layout.beam_count() as u16 + 2),     // Beams
            Constraint::Length(4),                                  // Slots
            Constraint::Min(3),                                     // Footer
        ])
        .split(f.size());

    let pattern = match status.settings.forced_shape() {
        Some(shape) => shape.name(),
        None => "per slot",
    };
    let beat = status.beat.map_or("-".to_string(), |b| b.to_string());
    let header = format!(
        "Mode: {} | Colors: {} | Shape: {} | Fire: {} | {:.1} BPM | Beat {}",
        status.settings.display_mode.name(),
        status.settings.color_mode.name(),
        pattern,
        status.settings.fire_palette.name(),
        status.bpm,
        beat,
    );
    f.render_widget(
        Paragraph::new(header).block(Block::default().borders(Borders::ALL).title("Beamlights")),
        chunks[0],
    );

    f.render_widget(
        Paragraph::new(beam_lines(layout, frame, brightness)).block(Block::default().borders(Borders::ALL)),
        chunks[1],
    );

    let state = status.state;
    let slots: Vec<Span> = state
        .slot_shapes
        .iter()
        .zip(state.slot_colors.iter())
        .enumerate()
        .flat_map(|(slot, (shape, color))| {
            let marker = if slot == state.active_color_slot { ">" } else { " " };
            vec![
                Span::raw(format!("{}{} ", marker, slot)),
                Span::styled("■ ", Style::default().fg(Color::Rgb(color.r, color.g, color.b))),
                Span::raw(format!("{:<11}", shape.name())),
            ]
        })
        .collect();
    let slot_text = vec![
        Line::from(slots),
        Line::from(format!(
            "Pattern row {} | Beams {:04b} | Rolls {}",
            state.active_beat_pattern, state.active_beam_mask, state.rolls
        )),
    ];
    f.render_widget(
        Paragraph::new(slot_text).block(Block::default().borders(Borders::ALL).title("Slots")),
        chunks[2],
    );

    let footer = "a: display mode | b: color mode | p: shape | f: fire palette | space: tap tempo | +/-: BPM | q: quit";
    f.render_widget(
        Paragraph::new(Span::styled(footer, Style::default().fg(Color::Gray))).block(Block::default().borders(Borders::ALL)),
        chunks[3],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn control_box_buttons_map_to_modes() {
        assert_eq!(key_action(press(KeyCode::Char('a'))), Some(KeyAction::CycleDisplayMode));
        assert_eq!(key_action(press(KeyCode::Char('b'))), Some(KeyAction::CycleColorMode));
        assert_eq!(key_action(press(KeyCode::Char(' '))), Some(KeyAction::Tap));
        assert_eq!(key_action(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_action(key), Some(KeyAction::Quit));
        assert_eq!(key_action(press(KeyCode::Char('c'))), None);
    }

    #[test]
    fn beam_rows_follow_logical_order() {
        let layout = BeamLayout::new(2, 3);
        let mut frame = layout.new_buffer();
        layout.fill_beam(&mut frame, 1, 0, 1, Rgb::WHITE);
        let lines = beam_lines(&layout, &frame, 255);
        assert_eq!(lines.len(), 2);
        // label span + one span per pixel
        assert_eq!(lines[1].spans.len(), 4);
        assert_eq!(lines[1].spans[1].content, "█");
        assert_eq!(lines[1].spans[2].content, "·");
    }
}
