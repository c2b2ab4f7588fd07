//! Drawable size provider.
//!
//! The host reports the CSS-pixel size and device pixel ratio of the surface.
//! [`Viewport`] clamps the ratio and broadcasts every change to its
//! subscribers over `flume` channels. Subscribers (camera controller, render
//! pipeline) hold a [`ResizeListener`] and drain it before they use the size,
//! so a frame never starts with a stale size.

use flume::{Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Surface size in CSS pixels plus the effective pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl ViewportSize {
    /// Drawable size in physical pixels, at least 1×1.
    #[must_use]
    pub fn physical(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[derive(Debug)]
pub struct Viewport {
    size: ViewportSize,
    pixel_ratio_range: [f32; 2],
    subscribers: Vec<Sender<ViewportSize>>,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32, pixel_ratio_range: [f32; 2]) -> Self {
        let [lo, hi] = pixel_ratio_range;
        let range = if lo.is_finite() && hi.is_finite() && lo > 0.0 && lo <= hi {
            pixel_ratio_range
        } else {
            log::warn!("Invalid pixel ratio range {pixel_ratio_range:?}, using [1, 1.5]");
            [1.0, 1.5]
        };
        let mut viewport = Self {
            size: ViewportSize {
                width,
                height,
                pixel_ratio: 1.0,
            },
            pixel_ratio_range: range,
            subscribers: Vec::new(),
        };
        viewport.size.pixel_ratio = viewport.clamp_ratio(device_pixel_ratio);
        viewport
    }

    #[must_use]
    pub fn size(&self) -> ViewportSize {
        self.size
    }

    #[must_use]
    pub fn pixel_ratio_range(&self) -> [f32; 2] {
        self.pixel_ratio_range
    }

    /// New listener, seeded with the current size.
    pub fn subscribe(&mut self) -> ResizeListener {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        ResizeListener {
            rx,
            current: self.size,
        }
    }

    /// Applies a host resize and notifies every live listener.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) {
        let size = ViewportSize {
            width,
            height,
            pixel_ratio: self.clamp_ratio(device_pixel_ratio),
        };
        if size == self.size {
            return;
        }
        self.size = size;
        log::debug!("Viewport resized to {width}x{height} @{}", size.pixel_ratio);
        self.subscribers.retain(|tx| tx.send(size).is_ok());
    }

    fn clamp_ratio(&self, ratio: f32) -> f32 {
        let [lo, hi] = self.pixel_ratio_range;
        if ratio.is_nan() { lo } else { ratio.clamp(lo, hi) }
    }
}

/// Receiving end of viewport notifications.
#[derive(Debug)]
pub struct ResizeListener {
    rx: Receiver<ViewportSize>,
    current: ViewportSize,
}

impl ResizeListener {
    /// Drains pending notifications. Returns the newest size if any arrived.
    pub fn poll(&mut self) -> Option<ViewportSize> {
        let latest = self.rx.try_iter().last()?;
        self.current = latest;
        Some(latest)
    }

    /// Size as of the last [`ResizeListener::poll`].
    #[must_use]
    pub fn current(&self) -> ViewportSize {
        self.current
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_clamped() {
        let mut viewport = Viewport::new(800, 600, 3.0, [1.0, 1.5]);
        assert_eq!(viewport.size().pixel_ratio, 1.5);
        viewport.resize(800, 600, 0.5);
        assert_eq!(viewport.size().pixel_ratio, 1.0);
        assert_eq!(viewport.size().physical(), (800, 600));
    }

    #[test]
    fn listener_sees_only_latest_size() {
        let mut viewport = Viewport::new(800, 600, 1.0, [1.0, 1.5]);
        let mut listener = viewport.subscribe();
        assert_eq!(listener.poll(), None);
        viewport.resize(1024, 768, 1.0);
        viewport.resize(640, 480, 2.0);
        let size = listener.poll().unwrap();
        assert_eq!(size.physical(), (960, 720));
        assert_eq!(listener.poll(), None);
        assert_eq!(listener.current(), size);
    }

    #[test]
    fn dropped_listeners_are_pruned() {
        let mut viewport = Viewport::new(800, 600, 1.0, [1.0, 1.5]);
        drop(viewport.subscribe());
        viewport.resize(10, 10, 1.0);
        assert!(viewport.subscribers.is_empty());
    }
}
