//! Application context.

use std::collections::VecDeque;
use std::sync::Arc;

use winit::window::{CursorGrabMode, Window};

use crate::render::Renderer;

/// Rolling frame time average
#[derive(Debug, Clone)]
pub struct FrameStats {
    samples: VecDeque<f32>,
    window: usize,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FrameStats {
    pub fn new(window: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(window),
            window: window.max(1),
        }
    }

    pub fn push(&mut self, dt: f32) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(dt);
    }

    /// Mean frame time in seconds, zero before the first sample
    pub fn average_frame_time(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    pub fn fps(&self) -> f32 {
        let average = self.average_frame_time();
        if average > 0.0 {
            1.0 / average
        } else {
            0.0
        }
    }
}

/// Window, renderer and frame timing, available in every handler callback.
pub struct AppContext {
    pub(crate) window: Arc<Window>,
    pub(crate) renderer: Renderer,
    /// Window width in physical pixels.
    pub(crate) width: u32,
    /// Window height in physical pixels.
    pub(crate) height: u32,
    pub(crate) frame_number: u64,
    /// Clamped time since the last frame in seconds.
    pub(crate) delta_time: f32,
    /// Time since application start in seconds.
    pub(crate) elapsed_time: f32,
    pub(crate) cursor_grabbed: bool,
    pub(crate) stats: FrameStats,
}

impl AppContext {
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn cursor_grabbed(&self) -> bool {
        self.cursor_grabbed
    }

    /// Hide and confine the cursor for mouse look, or release it.
    pub fn set_cursor_grab(&mut self, grab: bool) {
        if grab == self.cursor_grabbed {
            return;
        }
        let result = if grab {
            self.window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Locked))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(err) = result {
            log::warn!("Cursor grab not available: {err}");
        }
        self.window.set_cursor_visible(!grab);
        self.cursor_grabbed = grab;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_report_zero() {
        let stats = FrameStats::default();
        assert_eq!(stats.average_frame_time(), 0.0);
        assert_eq!(stats.fps(), 0.0);
    }

    #[test]
    fn average_covers_the_last_window_only() {
        let mut stats = FrameStats::new(4);
        for _ in 0..10 {
            stats.push(0.1);
        }
        for _ in 0..4 {
            stats.push(0.025);
        }
        assert!((stats.average_frame_time() - 0.025).abs() < 1e-6);
        assert!((stats.fps() - 40.0).abs() < 1e-3);
    }
}
