//! Scroll-to-top affordance

/// Offset in pixels past which the button shows
pub const SCROLL_THRESHOLD: f64 = 300.0;

/// Visibility of the scroll-to-top button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

/// Two-state machine driven by the vertical scroll offset
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollAffordance {
    state: Visibility,
}

impl ScrollAffordance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == Visibility::Visible
    }

    /// Apply a sampled offset, returning the new state
    pub fn sample(&mut self, offset: f64) -> Visibility {
        self.state = if offset > SCROLL_THRESHOLD {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        self.state
    }
}

/// Coalesces scroll events to at most one sample per animation frame
#[derive(Debug, Default)]
pub struct FrameThrottle {
    affordance: ScrollAffordance,
    frame_pending: bool,
    subscribed: bool,
}

impl FrameThrottle {
    /// Subscribe and take the initial sample
    pub fn attach(initial_offset: f64) -> Self {
        let mut throttle = Self {
            subscribed: true,
            ..Default::default()
        };
        throttle.affordance.sample(initial_offset);
        throttle
    }

    /// A scroll event arrived; returns true if a frame must be requested
    pub fn on_scroll(&mut self) -> bool {
        if !self.subscribed || self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// The requested frame fired
    pub fn on_frame(&mut self, offset: f64) -> Visibility {
        if self.frame_pending && self.subscribed {
            self.frame_pending = false;
            self.affordance.sample(offset);
        }
        self.affordance.state()
    }

    /// Unsubscribe; returns true if a pending frame must be cancelled
    pub fn teardown(&mut self) -> bool {
        self.subscribed = false;
        std::mem::take(&mut self.frame_pending)
    }

    pub fn state(&self) -> Visibility {
        self.affordance.state()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}
