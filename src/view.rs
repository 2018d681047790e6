use crate::math::{self, Point};

/// Multiplier applied to `scale` per zoom-in frame.
pub const ZOOM_STEP: f32 = 0.9;
/// Fraction of `scale` the center moves per pan frame.
pub const PAN_STEP: f32 = 0.1;

pub const DEFAULT_CENTER: Point = Point::new(-0.5, 0.0);
/// Width of the complex plane visible across the window at startup.
pub const DEFAULT_SPAN: f32 = 3.5;
pub const DEFAULT_MAX_ITERATIONS: u32 = 10_000;

/// Pan/zoom transform over the complex plane.
///
/// `scale` is plane units per pixel and is always positive; it only ever
/// changes by multiplication with a positive factor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewState {
    pub center: Point,
    pub scale: f32,
    pub max_iterations: u32,
}

impl ViewState {
    /// Default framing of the set for a window `width` pixels wide.
    pub fn framing(width: u32) -> Self {
        Self {
            center: DEFAULT_CENTER,
            scale: DEFAULT_SPAN / width as f32,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn zoom_in(&mut self) {
        self.scale *= ZOOM_STEP;
    }

    pub fn zoom_out(&mut self) {
        self.scale /= ZOOM_STEP;
    }

    pub fn pan_up(&mut self) {
        self.center.y += self.scale * PAN_STEP;
    }

    pub fn pan_down(&mut self) {
        self.center.y -= self.scale * PAN_STEP;
    }

    pub fn pan_left(&mut self) {
        self.center.x -= self.scale * PAN_STEP;
    }

    pub fn pan_right(&mut self) {
        self.center.x += self.scale * PAN_STEP;
    }

    /// Escape time of the point currently under the middle of the screen.
    pub fn depth_at_center(&self) -> u32 {
        math::escape_time(self.center, self.max_iterations)
    }
}

/// Logical inputs the viewer reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ViewAction {
    ZoomIn,
    ZoomOut,
    Up,
    Down,
    Left,
    Right,
    Quit,
}

impl ViewAction {
    /// Evaluation order within a frame: zoom first, then pans.
    pub const ALL: [ViewAction; 7] = [
        ViewAction::ZoomIn,
        ViewAction::ZoomOut,
        ViewAction::Up,
        ViewAction::Down,
        ViewAction::Left,
        ViewAction::Right,
        ViewAction::Quit,
    ];
}

/// Anything that can answer "is this action's key held right now".
pub trait ActionState {
    fn is_down(&self, action: ViewAction) -> bool;
}

/// What the render loop should do after a controller tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Result of one controller tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tick {
    pub control: LoopControl,
    pub changed: bool,
}

/// Applies every held action to `view` once. Called exactly once per frame,
/// so navigation speed follows the frame rate.
pub fn apply_held(view: &mut ViewState, keys: &impl ActionState) -> Tick {
    let before = *view;
    let mut control = LoopControl::Continue;

    for action in ViewAction::ALL {
        if !keys.is_down(action) {
            continue;
        }
        match action {
            ViewAction::ZoomIn => view.zoom_in(),
            ViewAction::ZoomOut => view.zoom_out(),
            ViewAction::Up => view.pan_up(),
            ViewAction::Down => view.pan_down(),
            ViewAction::Left => view.pan_left(),
            ViewAction::Right => view.pan_right(),
            ViewAction::Quit => control = LoopControl::Quit,
        }
    }

    Tick {
        control,
        changed: *view != before,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct Held(HashSet<ViewAction>);

    impl Held {
        fn of(actions: &[ViewAction]) -> Self {
            Self(actions.iter().copied().collect())
        }
    }

    impl ActionState for Held {
        fn is_down(&self, action: ViewAction) -> bool {
            self.0.contains(&action)
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= f32::EPSILON * a.abs().max(b.abs()) * 4.0
    }

    #[test]
    fn default_framing_for_800px() {
        let view = ViewState::framing(800);
        assert_eq!(view.center, Point::new(-0.5, 0.0));
        assert!(close(view.scale, 0.004375));
        assert_eq!(view.max_iterations, 10_000);
        assert_eq!(view.depth_at_center(), 10_000);
    }

    #[test]
    fn zoom_in_shrinks_and_zoom_out_grows() {
        let mut view = ViewState::framing(800);
        let mut last = view.scale;
        for _ in 0..50 {
            view.zoom_in();
            assert!(view.scale < last);
            assert!(view.scale > 0.0);
            last = view.scale;
        }
        for _ in 0..50 {
            view.zoom_out();
            assert!(view.scale > last);
            last = view.scale;
        }
    }

    #[test]
    fn zoom_out_then_in_restores_scale() {
        let mut view = ViewState::framing(800);
        let start = view.scale;
        view.zoom_out();
        view.zoom_in();
        assert!(close(view.scale, start));
    }

    #[test]
    fn right_then_left_restores_center() {
        let mut view = ViewState::framing(800);
        let start = view.center;
        view.pan_right();
        view.pan_left();
        assert!((view.center.x - start.x).abs() < 1e-6);
        assert_eq!(view.center.y, start.y);
    }

    #[test]
    fn pans_move_by_a_tenth_of_scale() {
        let mut view = ViewState::framing(800);
        let step = view.scale * PAN_STEP;
        view.pan_up();
        assert!(close(view.center.y, step));
        view.pan_down();
        view.pan_down();
        assert!(close(view.center.y, -step));
    }

    #[test]
    fn tick_without_keys_is_a_no_op() {
        let mut view = ViewState::framing(800);
        let tick = apply_held(&mut view, &Held::of(&[]));
        assert_eq!(tick, Tick { control: LoopControl::Continue, changed: false });
        assert_eq!(view, ViewState::framing(800));
    }

    #[test]
    fn zoom_in_frame_then_zoom_out_frame() {
        let mut view = ViewState::framing(800);
        let start = view.scale;

        let tick = apply_held(&mut view, &Held::of(&[ViewAction::ZoomIn]));
        assert!(tick.changed);
        apply_held(&mut view, &Held::of(&[ViewAction::ZoomOut]));

        assert!(close(view.scale, start));
    }

    #[test]
    fn pans_use_scale_after_zoom_in_same_frame() {
        let mut view = ViewState::framing(800);
        let zoomed = view.scale * ZOOM_STEP;
        apply_held(&mut view, &Held::of(&[ViewAction::ZoomIn, ViewAction::Right]));
        assert!(close(view.scale, zoomed));
        assert!(close(view.center.x, -0.5 + zoomed * PAN_STEP));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut view = ViewState::framing(800);
        apply_held(&mut view, &Held::of(&[ViewAction::Up, ViewAction::Down]));
        assert!(view.center.y.abs() < 1e-9);
    }

    #[test]
    fn quit_key_requests_termination() {
        let mut view = ViewState::framing(800);
        let tick = apply_held(&mut view, &Held::of(&[ViewAction::Quit, ViewAction::Left]));
        assert_eq!(tick.control, LoopControl::Quit);
        assert!(tick.changed);
    }
}
