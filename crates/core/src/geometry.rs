// Screen-space geometry for picture-in-picture

use serde::{Deserialize, Serialize};

/// Integer screen rectangle, edges inclusive-exclusive like a platform view rect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Saturates instead of overflowing on extreme host-supplied edges
    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// Reduced width:height ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub numerator: i32,
    pub denominator: i32,
}

impl Rational {
    pub fn new(numerator: i32, denominator: i32) -> Self {
        // The divisor can be 2^31, so divide in i64
        let divisor = i64::from(gcd(numerator.unsigned_abs(), denominator.unsigned_abs()).max(1));
        Self {
            numerator: (i64::from(numerator) / divisor) as i32,
            denominator: (i64::from(denominator) / divisor) as i32,
        }
    }

    pub fn as_f32(&self) -> f32 {
        if self.denominator == 0 {
            return 0.0;
        }
        self.numerator as f32 / self.denominator as f32
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Picture-in-picture window bounds derived from the video size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PictureInPictureBounds {
    pub rect: Rect,
    pub aspect_ratio: Rational,
}

impl PictureInPictureBounds {
    /// Recompute from the session bounds and the natural video size
    pub fn derive(screen_bounds: Rect, video_width: i32, video_height: i32) -> Self {
        let rect = compute_bounds(screen_bounds, video_width, video_height);
        Self {
            rect,
            aspect_ratio: Rational::new(rect.width(), rect.height()),
        }
    }
}

/// Shrink `screen_bounds` vertically so it matches the video aspect ratio,
/// keeping it centered. Left and right edges never move.
///
/// Degenerate video sizes leave the bounds untouched.
pub fn compute_bounds(screen_bounds: Rect, video_width: i32, video_height: i32) -> Rect {
    if video_width <= 0 || video_height <= 0 {
        log::warn!(
            "Ignoring degenerate video size {}x{} for PiP bounds",
            video_width,
            video_height
        );
        return screen_bounds;
    }

    let aspect_ratio = video_width as f32 / video_height as f32;
    let new_height = (screen_bounds.width() as f32 / aspect_ratio) as i32;
    let diff = screen_bounds.height().saturating_sub(new_height) / 2;

    Rect::new(
        screen_bounds.left,
        screen_bounds.top.saturating_add(diff),
        screen_bounds.right,
        screen_bounds.bottom.saturating_sub(diff),
    )
}
