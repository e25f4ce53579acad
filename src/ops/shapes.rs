use crate::canvas::{IPoint, PixelBuffer, PixelRect};

/// Geometry rasterized by [`rasterize`]. All coordinates are in continuous
/// canvas space, where pixel `(x, y)` is sampled at `(x + 0.5, y + 0.5)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    /// Segment with round caps (pen and eraser strokes).
    Capsule {
        a: (f32, f32),
        b: (f32, f32),
        radius: f32,
    },
    /// Segment with flat caps (the Line shape).
    FlatLine {
        a: (f32, f32),
        b: (f32, f32),
        half_width: f32,
    },
    BoxFill {
        cx: f32,
        cy: f32,
        hx: f32,
        hy: f32,
    },
    /// Pen centred on the box edge; corners stay square.
    BoxOutline {
        cx: f32,
        cy: f32,
        hx: f32,
        hy: f32,
        half_width: f32,
    },
    EllipseFill {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
    },
    EllipseOutline {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        half_width: f32,
    },
}

impl Primitive {
    /// Anti-aliased coverage in [0, 1] at a sample point.
    fn coverage(&self, px: f32, py: f32) -> f32 {
        match *self {
            Primitive::Capsule { a, b, radius } => {
                let d = sdf_line_segment(px, py, a.0, a.1, b.0, b.1) - radius;
                smoothstep(0.5, -0.5, d)
            }
            Primitive::FlatLine { a, b, half_width } => {
                let (dx, dy) = (b.0 - a.0, b.1 - a.1);
                let len = (dx * dx + dy * dy).sqrt();
                if len < 1e-6 {
                    return 0.0;
                }
                // Rotate into the segment frame and treat it as a box.
                let (ux, uy) = (dx / len, dy / len);
                let (mx, my) = (px - (a.0 + b.0) * 0.5, py - (a.1 + b.1) * 0.5);
                let along = mx * ux + my * uy;
                let across = -mx * uy + my * ux;
                smoothstep(0.5, -0.5, sdf_box(along, across, len * 0.5, half_width))
            }
            Primitive::BoxFill { cx, cy, hx, hy } => {
                smoothstep(0.5, -0.5, sdf_box(px - cx, py - cy, hx, hy))
            }
            Primitive::BoxOutline {
                cx,
                cy,
                hx,
                hy,
                half_width,
            } => {
                let (lx, ly) = (px - cx, py - cy);
                let outer = smoothstep(
                    0.5,
                    -0.5,
                    sdf_box(lx, ly, hx + half_width, hy + half_width),
                );
                let (ix, iy) = (hx - half_width, hy - half_width);
                let inner = if ix > 0.0 && iy > 0.0 {
                    smoothstep(0.5, -0.5, sdf_box(lx, ly, ix, iy))
                } else {
                    0.0
                };
                (outer - inner).max(0.0)
            }
            Primitive::EllipseFill { cx, cy, rx, ry } => {
                smoothstep(0.5, -0.5, sdf_ellipse(px - cx, py - cy, rx, ry))
            }
            Primitive::EllipseOutline {
                cx,
                cy,
                rx,
                ry,
                half_width,
            } => {
                let d = sdf_ellipse(px - cx, py - cy, rx, ry);
                smoothstep(0.5, -0.5, d.abs() - half_width)
            }
        }
    }

    /// Conservative bounds `(min_x, min_y, max_x, max_y)` before AA padding.
    fn bounds(&self) -> (f32, f32, f32, f32) {
        match *self {
            Primitive::Capsule { a, b, radius: r }
            | Primitive::FlatLine {
                a,
                b,
                half_width: r,
            } => (
                a.0.min(b.0) - r,
                a.1.min(b.1) - r,
                a.0.max(b.0) + r,
                a.1.max(b.1) + r,
            ),
            Primitive::BoxFill { cx, cy, hx, hy } | Primitive::EllipseFill {
                cx,
                cy,
                rx: hx,
                ry: hy,
            } => (cx - hx, cy - hy, cx + hx, cy + hy),
            Primitive::BoxOutline {
                cx,
                cy,
                hx,
                hy,
                half_width: w,
            }
            | Primitive::EllipseOutline {
                cx,
                cy,
                rx: hx,
                ry: hy,
                half_width: w,
            } => (cx - hx - w, cy - hy - w, cx + hx + w, cy + hy + w),
        }
    }
}

/// Blend `prim` into `buf` with `color`, visiting only the clipped bounding box.
pub fn rasterize(buf: &mut PixelBuffer, prim: &Primitive, color: [u8; 4]) {
    let (min_x, min_y, max_x, max_y) = prim.bounds();
    let pad = 2.0;
    let x0 = ((min_x - pad).floor() as i64).max(0);
    let y0 = ((min_y - pad).floor() as i64).max(0);
    let x1 = ((max_x + pad).ceil() as i64).min(buf.width() as i64);
    let y1 = ((max_y + pad).ceil() as i64).min(buf.height() as i64);
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    for y in y0..y1 {
        let py = y as f32 + 0.5;
        for x in x0..x1 {
            let cov = prim.coverage(x as f32 + 0.5, py);
            if cov > 0.001 {
                buf.blend_pixel(x as u32, y as u32, color, cov);
            }
        }
    }
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

#[inline]
fn centre(p: IPoint) -> (f32, f32) {
    (p.x as f32 + 0.5, p.y as f32 + 0.5)
}

/// Centre and half-extents of a box whose edges pass through pixel centres.
#[inline]
fn box_geometry(rect: PixelRect) -> (f32, f32, f32, f32) {
    let hx = rect.width as f32 * 0.5;
    let hy = rect.height as f32 * 0.5;
    (rect.x as f32 + 0.5 + hx, rect.y as f32 + 0.5 + hy, hx, hy)
}

impl PixelBuffer {
    /// Anti-aliased line of `width` pixels. With `round_caps` a zero-length
    /// segment draws a dot; with flat caps it draws nothing.
    pub fn draw_line(&mut self, p0: IPoint, p1: IPoint, color: [u8; 4], width: f32, round_caps: bool) {
        let half = width.max(1.0) * 0.5;
        let prim = if round_caps {
            Primitive::Capsule {
                a: centre(p0),
                b: centre(p1),
                radius: half,
            }
        } else {
            Primitive::FlatLine {
                a: centre(p0),
                b: centre(p1),
                half_width: half,
            }
        };
        rasterize(self, &prim, color);
    }

    pub fn draw_rect(&mut self, rect: PixelRect, color: [u8; 4], width: f32) {
        if rect.is_empty() {
            return;
        }
        let (cx, cy, hx, hy) = box_geometry(rect);
        let prim = Primitive::BoxOutline {
            cx,
            cy,
            hx,
            hy,
            half_width: width.max(1.0) * 0.5,
        };
        rasterize(self, &prim, color);
    }

    pub fn fill_rect(&mut self, rect: PixelRect, color: [u8; 4]) {
        if rect.is_empty() {
            return;
        }
        let (cx, cy, hx, hy) = box_geometry(rect);
        rasterize(self, &Primitive::BoxFill { cx, cy, hx, hy }, color);
    }

    pub fn draw_ellipse(&mut self, rect: PixelRect, color: [u8; 4], width: f32) {
        if rect.is_empty() {
            return;
        }
        let (cx, cy, rx, ry) = box_geometry(rect);
        let prim = Primitive::EllipseOutline {
            cx,
            cy,
            rx,
            ry,
            half_width: width.max(1.0) * 0.5,
        };
        rasterize(self, &prim, color);
    }

    pub fn fill_ellipse(&mut self, rect: PixelRect, color: [u8; 4]) {
        if rect.is_empty() {
            return;
        }
        let (cx, cy, rx, ry) = box_geometry(rect);
        rasterize(self, &Primitive::EllipseFill { cx, cy, rx, ry }, color);
    }
}

// ============================================================================
// SDF functions: return signed distance (negative = inside)
// ============================================================================

/// Box centred at origin with half-extents (hx, hy).
#[inline]
fn sdf_box(px: f32, py: f32, hx: f32, hy: f32) -> f32 {
    let dx = px.abs() - hx;
    let dy = py.abs() - hy;
    let outside = (dx.max(0.0) * dx.max(0.0) + dy.max(0.0) * dy.max(0.0)).sqrt();
    let inside = dx.max(dy).min(0.0);
    outside + inside
}

/// Ellipse centred at origin (first-order approximation).
#[inline]
fn sdf_ellipse(px: f32, py: f32, rx: f32, ry: f32) -> f32 {
    let rx = rx.max(1e-3);
    let ry = ry.max(1e-3);
    let nx = px / rx;
    let ny = py / ry;
    let len = (nx * nx + ny * ny).sqrt();
    if len < 1e-8 {
        return -rx.min(ry);
    }
    let scale = (rx * rx * ny * ny + ry * ry * nx * nx).sqrt() / (rx * ry * len);
    (len - 1.0) / scale
}

/// Unsigned distance to a segment; degenerates to point distance.
#[inline]
fn sdf_line_segment(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq < 1e-12 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
