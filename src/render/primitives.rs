//! Primitive rendering functions.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;

// ============================================================================
// Line Drawing
// ============================================================================

/// Draw a line with Bresenham's algorithm using a square pen `width` pixels wide.
pub fn draw_line(fb: &mut Framebuffer, from: (i32, i32), to: (i32, i32), width: u32, color: Rgba) {
    let (mut x, mut y) = from;
    let (x1, y1) = to;
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let reach = (width.max(1) as i32 - 1) / 2;
    let lo = -reach;
    let hi = width.max(1) as i32 - 1 - reach;

    loop {
        for oy in lo..=hi {
            for ox in lo..=hi {
                fb.blend_pixel(x + ox, y + oy, color);
            }
        }

        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draw a one-pixel horizontal line from `x0` to `x1` inclusive.
pub fn draw_hline(fb: &mut Framebuffer, x0: i32, x1: i32, y: i32, color: Rgba) {
    for x in x0.min(x1)..=x0.max(x1) {
        fb.blend_pixel(x, y, color);
    }
}

/// Draw a one-pixel vertical line from `y0` to `y1` inclusive.
pub fn draw_vline(fb: &mut Framebuffer, x: i32, y0: i32, y1: i32, color: Rgba) {
    for y in y0.min(y1)..=y0.max(y1) {
        fb.blend_pixel(x, y, color);
    }
}

// ============================================================================
// Circle Drawing
// ============================================================================

/// Draw a filled circle with the midpoint algorithm.
pub fn draw_circle(fb: &mut Framebuffer, cx: i32, cy: i32, radius: i32, color: Rgba) {
    if radius <= 0 {
        fb.blend_pixel(cx, cy, color);
        return;
    }

    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;
    // Widest half-span per row; each row is drawn once so translucent
    // colors are not blended twice.
    let mut halves = vec![0; (2 * radius + 1) as usize];
    let mut widen = |dy: i32, half: i32| {
        let slot = &mut halves[(dy + radius) as usize];
        *slot = (*slot).max(half);
    };

    while x >= y {
        widen(y, x);
        widen(-y, x);
        widen(x, y);
        widen(-x, y);

        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }

    for (slot, half) in halves.into_iter().enumerate() {
        let dy = slot as i32 - radius;
        draw_hline(fb, cx - half, cx + half, cy + dy, color);
    }
}
