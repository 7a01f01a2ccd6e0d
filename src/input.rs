// src/input.rs
// Per-frame input snapshot for the frame loop.
// The platform layer fills a `RawInput` with held key state; `InputState`
// turns that into edge-triggered presses once per frame.

use glam::Vec2;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    Pause,
    Reset,
    Wireframe,
}

impl Action {
    const ALL: [Action; 3] = [Action::Pause, Action::Reset, Action::Wireframe];

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// Held state as reported by the platform layer this frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RawInput {
    pub pause: bool,
    pub reset: bool,
    pub wireframe: bool,
    /// Mouse button that drags the camera.
    pub mouse_down: bool,
    pub pointer: Vec2,
    /// Scroll wheel delta this frame.
    pub scroll: f32,
}

impl RawInput {
    #[inline]
    fn held(&self, action: Action) -> bool {
        match action {
            Action::Pause => self.pause,
            Action::Reset => self.reset,
            Action::Wireframe => self.wireframe,
        }
    }
}

/// What one frame should react to.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub frame: u64,
    pub pause_pressed: bool,
    pub reset_pressed: bool,
    pub wireframe_pressed: bool,
    /// Pointer movement while dragging, for the camera orbit.
    pub orbit_delta: Vec2,
    pub zoom_delta: f32,
}

impl InputSnapshot {
    /// Snapshot with only the given presses set.
    pub fn pressing(actions: &[Action]) -> Self {
        let mut snapshot = Self::default();
        for action in actions {
            match action {
                Action::Pause => snapshot.pause_pressed = true,
                Action::Reset => snapshot.reset_pressed = true,
                Action::Wireframe => snapshot.wireframe_pressed = true,
            }
        }
        snapshot
    }
}

// Internal per-button state (small POD)
#[derive(Copy, Clone, Debug, Default)]
struct ButtonState {
    down: bool,
    last_down_frame: u64,
    last_up_frame: u64,
}

/// Edge detection across frames.
#[derive(Debug, Default)]
pub struct InputState {
    frame: u64,
    buttons: [ButtonState; 3],
    pointer_prev: Option<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold this frame's raw state in and report presses that began now.
    pub fn update(&mut self, raw: &RawInput) -> InputSnapshot {
        self.frame += 1;
        for action in Action::ALL {
            let button = &mut self.buttons[action.slot()];
            let held = raw.held(action);
            if held && !button.down {
                button.last_down_frame = self.frame;
            } else if !held && button.down {
                button.last_up_frame = self.frame;
            }
            button.down = held;
        }

        let orbit_delta = match (raw.mouse_down, self.pointer_prev) {
            (true, Some(prev)) => raw.pointer - prev,
            _ => Vec2::ZERO,
        };
        self.pointer_prev = raw.mouse_down.then_some(raw.pointer);

        InputSnapshot {
            frame: self.frame,
            pause_pressed: self.pressed(Action::Pause),
            reset_pressed: self.pressed(Action::Reset),
            wireframe_pressed: self.pressed(Action::Wireframe),
            orbit_delta,
            zoom_delta: raw.scroll,
        }
    }

    #[inline]
    pub fn down(&self, action: Action) -> bool {
        self.buttons[action.slot()].down
    }

    /// Went down this frame.
    #[inline]
    pub fn pressed(&self, action: Action) -> bool {
        let b = &self.buttons[action.slot()];
        b.down && b.last_down_frame == self.frame
    }

    /// Went up this frame.
    #[inline]
    pub fn released(&self, action: Action) -> bool {
        let b = &self.buttons[action.slot()];
        !b.down && b.last_up_frame == self.frame
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
