use std::io::{self, BufRead, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use crate::event::Event;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Input capability, probed once at startup. Raw gives per-keypress events
/// (arrows, Esc); Line falls back to one buffered stdin line per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTier {
    Raw,
    Line,
}

/// Scoped terminal-mode acquisition. The terminal is restored exactly once,
/// on `release` or on drop, whichever comes first — including unwind paths.
pub struct ScreenGuard {
    raw_mode: bool,
    released: bool,
}

impl ScreenGuard {
    pub fn acquire() -> io::Result<(Tui, Self)> {
        execute!(io::stdout(), EnterAlternateScreen)?;
        // Raw mode can fail on dumb terminals; the line tier covers that.
        let raw_mode = enable_raw_mode().is_ok();
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok((terminal, Self { raw_mode, released: false }))
    }

    pub fn tier(&self) -> InputTier {
        if self.raw_mode {
            InputTier::Raw
        } else {
            InputTier::Line
        }
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if self.raw_mode {
            let _ = disable_raw_mode();
        }
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Unconditional restore for the panic hook, where no guard is reachable.
pub fn restore() -> io::Result<()> {
    let _ = disable_raw_mode();
    execute!(io::stdout(), LeaveAlternateScreen)
}

/// The key event an external interrupt is translated into. Matches what a
/// raw-mode terminal delivers for Ctrl+C, so `Event::is_quit` covers both.
fn interrupt_key() -> KeyEvent {
    KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
}

/// Map one buffered stdin line to the key it stands for: first character,
/// lowercased, with the empty line meaning Enter.
fn parse_line_key(line: &str) -> KeyEvent {
    match line.trim().chars().next() {
        None => KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
        Some(c) => KeyEvent::new(KeyCode::Char(c.to_ascii_lowercase()), KeyModifiers::NONE),
    }
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tier: InputTier, tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        if tier == InputTier::Line {
            // Blocking stdin reader on its own thread; it parks between
            // lines and dies with the process or when the channel closes.
            let line_tx = tx.clone();
            std::thread::spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    if line_tx.send(Event::Key(parse_line_key(&line))).is_err() {
                        break;
                    }
                }
            });
        }

        let task = tokio::spawn(async move {
            let mut reader = (tier == InputTier::Raw).then(EventStream::new);
            let mut tick_interval = interval(tick_rate);
            let mut render_interval = interval(render_rate);

            loop {
                let raw_event = async {
                    match reader.as_mut() {
                        Some(r) => r.next().await,
                        None => futures::future::pending().await,
                    }
                };

                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    // Without raw mode SIGINT would otherwise kill the
                    // process before the screen guard runs; feed it through
                    // the channel as the quit key instead.
                    _ = tokio::signal::ctrl_c() => {
                        tx.send(Event::Key(interrupt_key())).ok();
                    }
                    _ = tick_interval.tick() => {
                        tx.send(Event::Tick).ok();
                    }
                    _ = render_interval.tick() => {
                        tx.send(Event::Render).ok();
                    }
                    Some(Ok(evt)) = raw_event => {
                        if let CrosstermEvent::Key(key) = evt {
                            if key.kind == event::KeyEventKind::Press {
                                tx.send(Event::Key(key)).ok();
                            }
                        }
                    }
                }
            }
        });

        Self { rx, cancel, task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_is_enter() {
        assert_eq!(parse_line_key("").code, KeyCode::Enter);
        assert_eq!(parse_line_key("   ").code, KeyCode::Enter);
    }

    #[test]
    fn letters_are_lowercased() {
        assert_eq!(parse_line_key("Q").code, KeyCode::Char('q'));
        assert_eq!(parse_line_key("O").code, KeyCode::Char('o'));
        assert_eq!(parse_line_key("C").code, KeyCode::Char('c'));
        assert_eq!(parse_line_key("k").code, KeyCode::Char('k'));
    }

    #[test]
    fn only_first_character_counts() {
        assert_eq!(parse_line_key("quit\n").code, KeyCode::Char('q'));
    }

    #[test]
    fn interrupt_maps_to_quit_event() {
        assert!(Event::Key(interrupt_key()).is_quit());
    }

    #[test]
    fn guard_release_is_idempotent() {
        let mut guard = ScreenGuard {
            raw_mode: false,
            released: false,
        };
        assert!(!guard.is_released());
        guard.release();
        assert!(guard.is_released());
        guard.release();
        assert!(guard.is_released());
    }

    #[test]
    fn guard_without_raw_mode_reports_line_tier() {
        let mut guard = ScreenGuard {
            raw_mode: false,
            released: false,
        };
        assert_eq!(guard.tier(), InputTier::Line);
        guard.release();
    }
}
