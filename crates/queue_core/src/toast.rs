use crate::CursorPosition;

pub const DEFAULT_TOAST_TEXT: &str = "Added to queue";

/// Delay before a freshly inserted toast starts fading in (one animation frame).
pub const TOAST_FRAME_TICK_MS: u64 = 16;
/// Time from insertion until the fade-out starts.
pub const TOAST_HOLD_MS: u64 = 1_800;
pub const TOAST_FADE_OUT_MS: u64 = 180;

const POINTER_OFFSET: i32 = 12;
const EDGE_MARGIN: i32 = 16;
// Approximate toast box used only for clamping.
const TOAST_WIDTH: i32 = 240;
const TOAST_HEIGHT: i32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPlacement {
    /// `left`/`top` offsets of a toast shown next to the pointer.
    NearPointer { left: i32, top: i32 },
    /// `right`/`bottom` offsets of the fallback corner.
    Corner { right: i32, bottom: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Entering,
    Visible,
    Leaving,
}

/// Explicit coordinates win over the frame's own last pointer position.
pub fn place_toast(
    requested: Option<CursorPosition>,
    last_pointer: Option<CursorPosition>,
    viewport: Viewport,
) -> ToastPlacement {
    match requested.or(last_pointer) {
        Some(pos) if pos.x >= 0 && pos.y >= 0 => ToastPlacement::NearPointer {
            left: clamp_axis(
                pos.x.saturating_add(POINTER_OFFSET),
                viewport.width.saturating_sub(TOAST_WIDTH),
            ),
            top: clamp_axis(
                pos.y.saturating_add(POINTER_OFFSET),
                viewport.height.saturating_sub(TOAST_HEIGHT),
            ),
        },
        _ => ToastPlacement::Corner {
            right: EDGE_MARGIN,
            bottom: EDGE_MARGIN,
        },
    }
}

// Lower bound wins when the viewport is smaller than the toast.
fn clamp_axis(value: i32, free_space: i32) -> i32 {
    value
        .min(free_space.saturating_sub(EDGE_MARGIN))
        .max(EDGE_MARGIN)
}
