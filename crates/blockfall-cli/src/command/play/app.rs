use std::sync::mpsc::{self, Receiver};

use blockfall_engine::{GameController, GameEvent, GamePhase, GameSnapshot};
use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

use crate::{
    tui::{App, Tui},
    ui::widgets::{GameDisplay, KeyBinding, KeyBindingDisplay},
};

/// How often pending snapshots are picked up for drawing.
const REFRESH_RATE: f64 = 30.0;

/// A player action decoded from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Move(i32, i32),
    Rotate,
    HardDrop,
    TogglePause,
    Start,
    Restart,
    Menu,
    Quit,
}

impl Command {
    pub(crate) fn from_key(code: KeyCode, phase: GamePhase) -> Option<Self> {
        let command = match code {
            KeyCode::Left => Command::Move(-1, 0),
            KeyCode::Right => Command::Move(1, 0),
            KeyCode::Down => Command::Move(0, -1),
            KeyCode::Up | KeyCode::Char('x') => Command::Rotate,
            KeyCode::Char(' ') => Command::HardDrop,
            KeyCode::Char('p') => Command::TogglePause,
            KeyCode::Enter if phase.is_menu() || phase.is_game_over() => Command::Start,
            KeyCode::Char('r') if !phase.is_menu() => Command::Restart,
            KeyCode::Char('m') => Command::Menu,
            KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
            _ => return None,
        };
        Some(command)
    }
}

fn key_bindings(phase: GamePhase) -> &'static [KeyBinding<'static>] {
    match phase {
        GamePhase::Menu => &[(&["Enter"], "Start"), (&["Q"], "Quit")],
        GamePhase::Playing => &[
            (&["←", "→"], "Move"),
            (&["↓"], "Soft Drop"),
            (&["↑", "X"], "Rotate"),
            (&["Space"], "Hard Drop"),
            (&["P"], "Pause"),
            (&["R"], "Restart"),
            (&["Q"], "Quit"),
        ],
        GamePhase::Paused => &[
            (&["P"], "Resume"),
            (&["R"], "Restart"),
            (&["M"], "Menu"),
            (&["Q"], "Quit"),
        ],
        GamePhase::GameOver => &[
            (&["Enter", "R"], "New Game"),
            (&["M"], "Menu"),
            (&["Q"], "Quit"),
        ],
    }
}

/// Interactive game screen.
///
/// Key presses are forwarded to the controller. The controller's observer
/// pushes snapshots into a channel, and the newest one is drawn.
pub struct PlayApp {
    controller: GameController,
    snapshots: Receiver<GameSnapshot>,
    snapshot: GameSnapshot,
    is_exiting: bool,
}

impl PlayApp {
    pub fn new(controller: GameController) -> Self {
        let (tx, rx) = mpsc::channel();
        controller.subscribe(move |_: GameEvent, snapshot: &GameSnapshot| {
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(snapshot.clone());
        });
        let snapshot = controller.snapshot();
        Self {
            controller,
            snapshots: rx,
            snapshot,
            is_exiting: false,
        }
    }

    pub fn into_controller(self) -> GameController {
        self.controller
    }

    fn drain_snapshots(&mut self) {
        while let Ok(snapshot) = self.snapshots.try_recv() {
            self.snapshot = snapshot;
        }
    }

    fn execute(&mut self, command: Command) {
        let controller = &self.controller;
        // Rejected commands leave the game untouched, so the result is not needed.
        let _applied = match command {
            Command::Move(dx, dy) => controller.move_piece(dx, dy),
            Command::Rotate => controller.rotate_piece(),
            Command::HardDrop => controller.drop_piece(),
            Command::TogglePause => controller.pause_game(),
            Command::Menu => controller.show_menu(),
            Command::Start => {
                controller.start_game();
                true
            }
            Command::Restart => {
                controller.restart_game();
                true
            }
            Command::Quit => {
                self.is_exiting = true;
                true
            }
        };
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(REFRESH_RATE);
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        if let Some(key) = event.as_key_press_event()
            && let Some(command) = Command::from_key(key.code, self.snapshot.phase)
        {
            self.execute(command);
            self.drain_snapshots();
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let game_display = GameDisplay::new(&self.snapshot);
        let help = KeyBindingDisplay::new(key_bindings(self.snapshot.phase));

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(25), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(game_display, main_area);
        frame.render_widget(help, help_area);
    }

    fn update(&mut self, _tui: &mut Tui) {
        self.drain_snapshots();
    }
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{KeyValueScoreStore, MemoryStorage, PieceGenerator};

    use super::*;

    fn app() -> PlayApp {
        let store = KeyValueScoreStore::new(MemoryStorage::new());
        PlayApp::new(GameController::with_generator(store, PieceGenerator::from_seed(3)))
    }

    #[test]
    fn test_key_mapping() {
        let playing = GamePhase::Playing;
        assert_eq!(Command::from_key(KeyCode::Left, playing), Some(Command::Move(-1, 0)));
        assert_eq!(Command::from_key(KeyCode::Right, playing), Some(Command::Move(1, 0)));
        assert_eq!(Command::from_key(KeyCode::Down, playing), Some(Command::Move(0, -1)));
        assert_eq!(Command::from_key(KeyCode::Up, playing), Some(Command::Rotate));
        assert_eq!(Command::from_key(KeyCode::Char('x'), playing), Some(Command::Rotate));
        assert_eq!(Command::from_key(KeyCode::Char(' '), playing), Some(Command::HardDrop));
        assert_eq!(Command::from_key(KeyCode::Char('p'), playing), Some(Command::TogglePause));
        assert_eq!(Command::from_key(KeyCode::Esc, playing), Some(Command::Quit));
        assert_eq!(Command::from_key(KeyCode::Char('z'), playing), None);
    }

    #[test]
    fn test_enter_and_restart_depend_on_phase() {
        assert_eq!(Command::from_key(KeyCode::Enter, GamePhase::Menu), Some(Command::Start));
        assert_eq!(
            Command::from_key(KeyCode::Enter, GamePhase::GameOver),
            Some(Command::Start)
        );
        assert_eq!(Command::from_key(KeyCode::Enter, GamePhase::Playing), None);
        assert_eq!(Command::from_key(KeyCode::Char('r'), GamePhase::Menu), None);
        assert_eq!(
            Command::from_key(KeyCode::Char('r'), GamePhase::Paused),
            Some(Command::Restart)
        );
    }

    #[test]
    fn test_commands_update_snapshot() {
        let mut app = app();
        assert_eq!(app.snapshot.phase, GamePhase::Menu);

        app.execute(Command::Start);
        app.drain_snapshots();
        assert_eq!(app.snapshot.phase, GamePhase::Playing);

        app.execute(Command::HardDrop);
        app.drain_snapshots();
        let filled = &app.snapshot.filled_blocks;
        assert_eq!(filled.len(), 4);
        assert_eq!(filled.iter().map(|block| block.position.y).min(), Some(0));
        assert!(app.snapshot.current_piece.is_some());

        app.execute(Command::TogglePause);
        app.drain_snapshots();
        assert_eq!(app.snapshot.phase, GamePhase::Paused);

        app.execute(Command::Quit);
        assert!(app.should_exit());
        app.into_controller().wait_for_persistence();
    }
}
