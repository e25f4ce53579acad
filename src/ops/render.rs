//! Stroke and shape rendering on top of the `PixelBuffer` primitives.
//!
//! Glow is a stack of wider, translucent passes drawn underneath the solid
//! pass. It is never drawn in [`RenderMode::Preview`].

use crate::canvas::{IPoint, PixelBuffer, PixelRect};
use crate::components::tools::{BrushStyle, Tool};

/// Grid overlay spacing in display pixels.
pub const GRID_SPACING: u32 = 25;
/// Grid line colour (straight-alpha RGBA).
pub const GRID_COLOR: [u8; 4] = [0, 0, 0, 40];

/// Halo passes as `(extra_width, alpha)`, outermost first.
pub const GLOW_PASSES: [(f32, u8); 3] = [(12.0, 100), (8.0, 80), (4.0, 60)];

/// Whether a shape is drawn for the live drag or for the final commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    Preview,
    Commit,
}

/// `(pass_width, alpha)` for each glow pass around a `brush_width` stroke.
pub fn glow_passes(brush_width: f32) -> impl Iterator<Item = (f32, u8)> {
    GLOW_PASSES
        .iter()
        .map(move |&(extra, alpha)| (brush_width + extra, alpha))
}

/// One continuous-tool segment, written straight into `buf`.
///
/// Pen honours glow; Eraser always paints opaque white.
pub fn render_stroke_segment(
    buf: &mut PixelBuffer,
    tool: Tool,
    style: &BrushStyle,
    from: IPoint,
    to: IPoint,
) {
    let width = style.width() as f32;
    match tool {
        Tool::Eraser => buf.draw_line(from, to, [255, 255, 255, 255], width, true),
        Tool::Pen => {
            if style.glow {
                for (w, alpha) in glow_passes(width) {
                    buf.draw_line(from, to, style.rgba(alpha), w, true);
                }
            }
            buf.draw_line(from, to, style.rgba(255), width, true);
        }
        _ => {}
    }
}

/// A deferred-tool shape spanning the drag from `start` to `end`.
pub fn render_shape(
    buf: &mut PixelBuffer,
    tool: Tool,
    style: &BrushStyle,
    start: IPoint,
    end: IPoint,
    mode: RenderMode,
) {
    let width = style.width() as f32;
    let glow = style.glow && mode == RenderMode::Commit;
    let solid = style.rgba(255);

    match tool {
        Tool::Line => {
            if glow {
                for (w, alpha) in glow_passes(width) {
                    buf.draw_line(start, end, style.rgba(alpha), w, false);
                }
            }
            buf.draw_line(start, end, solid, width, false);
        }
        Tool::Rect | Tool::Ellipse => {
            let rect = PixelRect::from_corners(start, end);
            if rect.is_empty() {
                return;
            }
            let is_rect = tool == Tool::Rect;
            if style.fill_shapes {
                if is_rect {
                    buf.fill_rect(rect, solid);
                } else {
                    buf.fill_ellipse(rect, solid);
                }
                return;
            }
            let mut outline = |color: [u8; 4], w: f32| {
                if is_rect {
                    buf.draw_rect(rect, color, w);
                } else {
                    buf.draw_ellipse(rect, color, w);
                }
            };
            if glow {
                for (w, alpha) in glow_passes(width) {
                    outline(style.rgba(alpha), w);
                }
            }
            outline(solid, width);
        }
        Tool::Pen | Tool::Eraser => {}
    }
}

/// Offsets of grid lines along an axis of `extent` pixels.
pub fn grid_lines(extent: u32) -> impl Iterator<Item = u32> {
    (0..extent).step_by(GRID_SPACING as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::WHITE;
    use image::Rgba;

    fn red_style(width: i32, glow: bool, fill: bool) -> BrushStyle {
        let mut style = BrushStyle::default();
        style.color = [255, 0, 0];
        style.set_width(width);
        style.glow = glow;
        style.fill_shapes = fill;
        style
    }

    fn is_partial_red(px: Rgba<u8>) -> bool {
        px[0] == 255 && px[1] > 0 && px[1] < 255 && px[1] == px[2]
    }

    #[test]
    fn glow_widths_and_alphas_follow_the_pass_formula() {
        let passes: Vec<_> = glow_passes(8.0).collect();
        assert_eq!(passes, vec![(20.0, 100), (16.0, 80), (12.0, 60)]);
        for (i, (w, a)) in (1..=3).rev().zip(passes) {
            assert_eq!(w, 8.0 + 4.0 * i as f32);
            assert_eq!(a as i32, 40 + 20 * i);
        }
    }

    #[test]
    fn glowing_rect_outline_has_halo_and_hollow_interior() {
        let mut buf = PixelBuffer::new(140, 90);
        let style = red_style(8, true, false);
        render_shape(
            &mut buf,
            Tool::Rect,
            &style,
            IPoint::new(10, 10),
            IPoint::new(110, 60),
            RenderMode::Commit,
        );
        // Solid pass on the edge.
        assert_eq!(buf.get_pixel(10, 35), Rgba([255, 0, 0, 255]));
        assert_eq!(buf.get_pixel(110, 35), Rgba([255, 0, 0, 255]));
        // Halo outside the solid band, same hue, translucent.
        assert!(is_partial_red(buf.get_pixel(1, 35)), "{:?}", buf.get_pixel(1, 35));
        assert!(is_partial_red(buf.get_pixel(119, 35)));
        // Halo brightens towards the edge.
        assert!(buf.get_pixel(4, 35)[1] < buf.get_pixel(1, 35)[1]);
        // No fill.
        assert_eq!(buf.get_pixel(60, 35), WHITE);
        assert_eq!(buf.get_pixel(135, 85), WHITE);
    }

    #[test]
    fn preview_mode_suppresses_glow() {
        let mut preview = PixelBuffer::new(140, 90);
        let mut plain = PixelBuffer::new(140, 90);
        let (a, b) = (IPoint::new(10, 10), IPoint::new(110, 60));
        render_shape(&mut preview, Tool::Ellipse, &red_style(8, true, false), a, b, RenderMode::Preview);
        render_shape(&mut plain, Tool::Ellipse, &red_style(8, false, false), a, b, RenderMode::Commit);
        assert_eq!(preview, plain);
    }

    #[test]
    fn fill_replaces_outline_and_ignores_glow() {
        let mut filled = PixelBuffer::new(140, 90);
        render_shape(
            &mut filled,
            Tool::Rect,
            &red_style(8, true, true),
            IPoint::new(110, 60),
            IPoint::new(10, 10),
            RenderMode::Commit,
        );
        assert_eq!(filled.get_pixel(60, 35), Rgba([255, 0, 0, 255]));
        assert_eq!(filled.get_pixel(3, 35), WHITE);
    }

    #[test]
    fn fill_flag_does_not_apply_to_lines() {
        let mut buf = PixelBuffer::new(100, 100);
        render_shape(
            &mut buf,
            Tool::Line,
            &red_style(4, false, true),
            IPoint::new(10, 10),
            IPoint::new(90, 90),
            RenderMode::Commit,
        );
        assert_eq!(buf.get_pixel(50, 50), Rgba([255, 0, 0, 255]));
        assert_eq!(buf.get_pixel(80, 20), WHITE);
    }

    #[test]
    fn zero_area_shapes_change_nothing() {
        let mut buf = PixelBuffer::new(60, 60);
        let before = buf.clone();
        for tool in [Tool::Rect, Tool::Ellipse] {
            render_shape(
                &mut buf,
                tool,
                &red_style(8, true, false),
                IPoint::new(20, 20),
                IPoint::new(20, 20),
                RenderMode::Commit,
            );
        }
        assert_eq!(buf, before);
    }

    #[test]
    fn eraser_paints_opaque_white_without_glow() {
        let mut buf = PixelBuffer::new(40, 40);
        buf.fill(Rgba([0, 0, 0, 255]));
        render_stroke_segment(&mut buf, Tool::Eraser, &red_style(6, true, false), IPoint::new(20, 20), IPoint::new(20, 20));
        assert_eq!(buf.get_pixel(20, 20), WHITE);
        assert_eq!(buf.get_pixel(20, 27), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn pen_glow_tints_around_the_stroke() {
        let mut buf = PixelBuffer::new(40, 40);
        render_stroke_segment(&mut buf, Tool::Pen, &red_style(4, true, false), IPoint::new(20, 20), IPoint::new(20, 20));
        assert_eq!(buf.get_pixel(20, 20), Rgba([255, 0, 0, 255]));
        assert!(is_partial_red(buf.get_pixel(20, 26)));
        assert_eq!(buf.get_pixel(20, 35), WHITE);
    }

    #[test]
    fn grid_lines_are_spaced_evenly() {
        let lines: Vec<_> = grid_lines(80).collect();
        assert_eq!(lines, vec![0, 25, 50, 75]);
    }
}
