use crate::model::{Corner, NudgeDirection, Point, Position};

/// Single active interaction mode. Pointer coordinates are page percentages;
/// the egui layer converts from screen space (including zoom) before calling
/// in, so none of this math depends on display scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interaction {
    Idle,
    Dragging {
        /// Pointer offset from the rectangle's top-left at pointer-down.
        grab_offset: Point,
    },
    Resizing {
        corner: Corner,
        /// Pointer position at the previous move event; resize deltas are
        /// computed per move, not cumulatively from the drag start.
        last_pointer: Point,
    },
}

/// One open run of the position editor. Owns a working copy of the caller's
/// position; nothing escapes except through [`EditorSession::save`], so
/// cancelling (dropping the session) leaves the caller's state untouched.
#[derive(Clone, Debug)]
pub struct EditorSession {
    position: Position,
    pub lock_aspect: bool,
    current_page: u16,
    total_pages: u16,
}

impl EditorSession {
    /// Opens a session with the caller's saved position, or the
    /// caller-specified default when nothing has been confirmed yet.
    pub fn open(saved: Option<Position>, default: Position) -> Self {
        Self {
            position: saved.unwrap_or(default).clamp_to_bounds(),
            lock_aspect: true,
            current_page: 1,
            total_pages: 1,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Hands the placement back to the caller. The session is consumed; a
    /// later edit starts a fresh session over the committed copy.
    pub fn save(self) -> Position {
        self.position
    }

    pub fn current_page(&self) -> u16 {
        self.current_page
    }

    /// Called when the asset's page count is known (or when a new asset is
    /// loaded): page selection resets to 1.
    pub fn set_page_count(&mut self, total: u16) {
        self.total_pages = total.max(1);
        self.current_page = 1;
    }

    pub fn go_to_page(&mut self, page: u16) {
        self.current_page = page.clamp(1, self.total_pages);
    }
}

/// Interaction state machine, kept separate from the session so the app can
/// drop it on teardown while the session (and its position) survives until
/// save or cancel.
#[derive(Clone, Copy, Debug, Default)]
pub struct InteractionState {
    mode: Option<InteractionMode>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum InteractionMode {
    Dragging { grab_offset: Point },
    Resizing { corner: Corner, last_pointer: Point },
}

impl InteractionState {
    pub fn current(&self) -> Interaction {
        match self.mode {
            None => Interaction::Idle,
            Some(InteractionMode::Dragging { grab_offset }) => Interaction::Dragging { grab_offset },
            Some(InteractionMode::Resizing {
                corner,
                last_pointer,
            }) => Interaction::Resizing {
                corner,
                last_pointer,
            },
        }
    }

    pub fn is_idle(&self) -> bool {
        self.mode.is_none()
    }

    /// Pointer-down inside the rectangle body.
    pub fn begin_drag(&mut self, session: &EditorSession, pointer: Point) {
        let p = session.position();
        self.mode = Some(InteractionMode::Dragging {
            grab_offset: Point {
                x: pointer.x - p.x,
                y: pointer.y - p.y,
            },
        });
    }

    /// Pointer-down within the hit radius of a corner handle.
    pub fn begin_resize(&mut self, corner: Corner, pointer: Point) {
        self.mode = Some(InteractionMode::Resizing {
            corner,
            last_pointer: pointer,
        });
    }

    /// Pointer-move while Dragging or Resizing; a no-op in Idle.
    pub fn pointer_move(&mut self, session: &mut EditorSession, pointer: Point) {
        match &mut self.mode {
            None => {}
            Some(InteractionMode::Dragging { grab_offset }) => {
                let p = session.position;
                let dx = (pointer.x - grab_offset.x) - p.x;
                let dy = (pointer.y - grab_offset.y) - p.y;
                session.position = p.translate(dx, dy);
            }
            Some(InteractionMode::Resizing {
                corner,
                last_pointer,
            }) => {
                let dx = pointer.x - last_pointer.x;
                let dy = pointer.y - last_pointer.y;
                session.position =
                    session
                        .position
                        .resize(*corner, dx, dy, session.lock_aspect);
                *last_pointer = pointer;
            }
        }
    }

    /// Pointer-up or touch-end: back to Idle. Later pointer events mutate
    /// nothing until a new pointer-down.
    pub fn pointer_up(&mut self) {
        self.mode = None;
    }
}

impl EditorSession {
    /// Arrow-key move; ignored while a pointer interaction is active.
    pub fn nudge(&mut self, state: &InteractionState, direction: NudgeDirection, step: f32) {
        if state.is_idle() {
            self.position = self.position.nudge(direction, step);
        }
    }

    /// `+`/`-` keys; ignored while a pointer interaction is active.
    pub fn grow(&mut self, state: &InteractionState, delta: f32) {
        if state.is_idle() {
            self.position = self.position.grow(delta, self.lock_aspect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MIN_SIZE_PCT;

    fn default_pos() -> Position {
        Position::new(50.0, 50.0, 15.0, 15.0)
    }

    #[test]
    fn opens_with_saved_position_when_present() {
        let saved = Position::new(10.0, 70.0, 20.0, 20.0);
        let session = EditorSession::open(Some(saved), default_pos());
        assert_eq!(session.position(), saved);
    }

    #[test]
    fn opens_with_caller_default_otherwise() {
        let session = EditorSession::open(None, Position::new(50.0, 70.0, 15.0, 15.0));
        assert_eq!(session.position(), Position::new(50.0, 70.0, 15.0, 15.0));
    }

    #[test]
    fn cancel_leaves_caller_position_untouched() {
        let saved = Position::new(50.0, 70.0, 15.0, 15.0);
        let mut session = EditorSession::open(Some(saved), default_pos());
        let mut state = InteractionState::default();
        state.begin_drag(&session, Point { x: 55.0, y: 75.0 });
        state.pointer_move(&mut session, Point { x: 15.0, y: 15.0 });
        state.pointer_up();
        assert_ne!(session.position(), saved);
        drop(session); // cancel
        assert_eq!(saved, Position::new(50.0, 70.0, 15.0, 15.0));
    }

    #[test]
    fn save_commits_aspect_locked_se_resize() {
        let mut session = EditorSession::open(None, default_pos());
        session.lock_aspect = true;
        let mut state = InteractionState::default();
        // se corner of (50,50,15,15) sits at (65,65)
        state.begin_resize(Corner::Se, Point { x: 65.0, y: 65.0 });
        state.pointer_move(&mut session, Point { x: 75.0, y: 75.0 });
        state.pointer_up();
        assert_eq!(session.save(), Position::new(50.0, 50.0, 25.0, 25.0));
    }

    #[test]
    fn drag_keeps_grab_offset() {
        let mut session = EditorSession::open(None, default_pos());
        let mut state = InteractionState::default();
        // grab 5% into the rectangle
        state.begin_drag(&session, Point { x: 55.0, y: 55.0 });
        state.pointer_move(&mut session, Point { x: 35.0, y: 45.0 });
        let p = session.position();
        assert_eq!((p.x, p.y), (30.0, 40.0));
        assert_eq!((p.width, p.height), (15.0, 15.0));
    }

    #[test]
    fn resize_delta_resets_every_move() {
        let mut session = EditorSession::open(None, default_pos());
        session.lock_aspect = false;
        let mut state = InteractionState::default();
        state.begin_resize(Corner::Se, Point { x: 65.0, y: 65.0 });
        state.pointer_move(&mut session, Point { x: 70.0, y: 65.0 });
        state.pointer_move(&mut session, Point { x: 72.0, y: 65.0 });
        // cumulative-from-start math would have produced 15 + 5 + 7 = 27
        assert_eq!(session.position().width, 22.0);
    }

    #[test]
    fn no_mutation_after_pointer_up() {
        let mut session = EditorSession::open(None, default_pos());
        let before = session.position();
        let mut state = InteractionState::default();
        state.begin_drag(&session, Point { x: 55.0, y: 55.0 });
        state.pointer_up();
        state.pointer_move(&mut session, Point { x: 5.0, y: 5.0 });
        assert_eq!(session.position(), before);
    }

    #[test]
    fn idle_only_shortcuts_wait_out_pointer_interactions() {
        // save/cancel keys dispatch on is_idle; mid-drag and mid-resize the
        // editor must stay up until pointer-up returns the state to idle
        let session = EditorSession::open(None, default_pos());
        let mut state = InteractionState::default();
        assert!(state.is_idle());

        state.begin_drag(&session, Point { x: 55.0, y: 55.0 });
        assert!(!state.is_idle());
        state.pointer_up();
        assert!(state.is_idle());

        state.begin_resize(Corner::Se, Point { x: 65.0, y: 65.0 });
        assert!(!state.is_idle());
        state.pointer_up();
        assert!(state.is_idle());
    }

    #[test]
    fn nudge_ignored_mid_drag() {
        let mut session = EditorSession::open(None, default_pos());
        let before = session.position();
        let mut state = InteractionState::default();
        state.begin_drag(&session, Point { x: 55.0, y: 55.0 });
        session.nudge(&state, NudgeDirection::Left, 5.0);
        assert_eq!(session.position(), before);
        state.pointer_up();
        session.nudge(&state, NudgeDirection::Left, 5.0);
        assert_eq!(session.position().x, before.x - 5.0);
    }

    #[test]
    fn grow_and_shrink_respect_min_size() {
        let mut session = EditorSession::open(None, Position::new(10.0, 10.0, 5.0, 5.0));
        let state = InteractionState::default();
        session.grow(&state, -1.0);
        assert_eq!(session.position().width, MIN_SIZE_PCT);
        session.grow(&state, 1.0);
        assert_eq!(session.position().width, 6.0);
    }

    #[test]
    fn page_selection_resets_on_new_asset() {
        let mut session = EditorSession::open(None, default_pos());
        session.set_page_count(5);
        session.go_to_page(4);
        assert_eq!(session.current_page(), 4);
        session.set_page_count(3); // new asset loaded
        assert_eq!(session.current_page(), 1);
        session.go_to_page(7);
        assert_eq!(session.current_page(), 3);
        session.go_to_page(0);
        assert_eq!(session.current_page(), 1);
    }
}
