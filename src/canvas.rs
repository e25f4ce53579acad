use image::{Rgba, RgbaImage};
use std::fmt;
use std::sync::Arc;

use crate::components::history::HistoryManager;

/// Edge length of one storage tile, in pixels.
pub const CHUNK_SIZE: u32 = 64;

/// Smallest canvas created for a new document or a loaded image.
pub const MIN_CANVAS_WIDTH: u32 = 800;
pub const MIN_CANVAS_HEIGHT: u32 = 600;
/// Largest edge any canvas may have; bigger requests are clamped.
pub const MAX_CANVAS_DIMENSION: u32 = 16384;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Returned for out-of-bounds reads.
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// ============================================================================
// GEOMETRY
// ============================================================================

/// Integer canvas coordinate. `(x, y)` addresses the centre of pixel `(x, y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IPoint {
    pub x: i32,
    pub y: i32,
}

impl IPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with integer origin and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalised box spanned by two drag corners, in any order. Spans wider
    /// than `i32::MAX` saturate.
    pub fn from_corners(a: IPoint, b: IPoint) -> Self {
        let span = |p: i32, q: i32| i32::try_from(p.abs_diff(q)).unwrap_or(i32::MAX);
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: span(a.x, b.x),
            height: span(a.y, b.y),
        }
    }

    /// Zero-area boxes produce no visible output.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

// ============================================================================
// PIXEL BUFFER
// ============================================================================

/// Width×height grid of straight-alpha RGBA pixels.
///
/// Storage is a grid of `CHUNK_SIZE`² tiles, each behind an `Arc`. `clone()`
/// only bumps reference counts; every write goes through `Arc::make_mut`, so a
/// shared tile is copied the first time either side touches it. Observably a
/// clone is a fully independent deep copy.
#[derive(Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    chunks_per_row: u32,
    chunks: Vec<Arc<RgbaImage>>,
}

impl PixelBuffer {
    // ---- construction -------------------------------------------------------

    /// White-filled buffer. Dimensions are clamped to
    /// `1..=MAX_CANVAS_DIMENSION`.
    pub fn new(width: u32, height: u32) -> Self {
        Self::new_filled(width, height, WHITE)
    }

    pub fn new_filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        let width = width.clamp(1, MAX_CANVAS_DIMENSION);
        let height = height.clamp(1, MAX_CANVAS_DIMENSION);
        let chunks_per_row = width.div_ceil(CHUNK_SIZE);
        let chunks_per_col = height.div_ceil(CHUNK_SIZE);
        let tile_count = chunks_per_row as usize * chunks_per_col as usize;
        // Every tile starts out sharing one allocation.
        let tile = Arc::new(RgbaImage::from_pixel(CHUNK_SIZE, CHUNK_SIZE, color));
        Self {
            width,
            height,
            chunks_per_row,
            chunks: vec![tile; tile_count],
        }
    }

    /// Import a flat image; pixels are copied verbatim (no blending).
    pub fn from_rgba_image(src: &RgbaImage) -> Self {
        let mut buf = Self::new(src.width(), src.height());
        for (x, y, px) in src.enumerate_pixels() {
            buf.put_pixel(x, y, *px);
        }
        buf
    }

    /// Import raw row-major RGBA bytes. `None` if the length does not match.
    pub fn from_raw_rgba(width: u32, height: u32, data: &[u8]) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize * 4 {
            return None;
        }
        let img = RgbaImage::from_raw(width, height, data.to_vec())?;
        Some(Self::from_rgba_image(&img))
    }

    /// Flatten into a contiguous image (used for export and display upload).
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width, self.height);
        let row_bytes = self.width as usize * 4;
        let out_raw: &mut [u8] = &mut out;
        for y in 0..self.height {
            let cy = y / CHUNK_SIZE;
            let ly = y % CHUNK_SIZE;
            for cx in 0..self.chunks_per_row {
                let x0 = cx * CHUNK_SIZE;
                let run = CHUNK_SIZE.min(self.width - x0) as usize;
                let chunk = &self.chunks[self.flat_index(cx, cy)];
                let src_off = ly as usize * CHUNK_SIZE as usize * 4;
                let dst_off = y as usize * row_bytes + x0 as usize * 4;
                out_raw[dst_off..dst_off + run * 4]
                    .copy_from_slice(&chunk.as_raw()[src_off..src_off + run * 4]);
            }
        }
        out
    }

    // ---- indexing helpers ----------------------------------------------------

    #[inline(always)]
    fn flat_index(&self, cx: u32, cy: u32) -> usize {
        (cy * self.chunks_per_row + cx) as usize
    }

    #[inline(always)]
    fn chunk_coord(x: u32, y: u32) -> (u32, u32) {
        (x / CHUNK_SIZE, y / CHUNK_SIZE)
    }

    #[inline(always)]
    fn local(x: u32, y: u32) -> (u32, u32) {
        (x % CHUNK_SIZE, y % CHUNK_SIZE)
    }

    // ---- pixel access -------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Read a pixel (fully transparent outside the buffer).
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        if x >= self.width || y >= self.height {
            return TRANSPARENT;
        }
        let (cx, cy) = Self::chunk_coord(x, y);
        let (lx, ly) = Self::local(x, y);
        *self.chunks[self.flat_index(cx, cy)].get_pixel(lx, ly)
    }

    /// Write a pixel; out-of-bounds writes are dropped.
    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: Rgba<u8>) {
        if x >= self.width || y >= self.height {
            return;
        }
        *self.pixel_mut(x, y) = pixel;
    }

    /// Source-over blend `color` (straight alpha) at `coverage` ∈ [0, 1].
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [u8; 4], coverage: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let src_a = color[3] as f32 / 255.0 * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = self.pixel_mut(x, y);
        *dst = blend_over(*dst, color, src_a);
    }

    #[inline]
    fn pixel_mut(&mut self, x: u32, y: u32) -> &mut Rgba<u8> {
        let (cx, cy) = Self::chunk_coord(x, y);
        let (lx, ly) = Self::local(x, y);
        let idx = self.flat_index(cx, cy);
        Arc::make_mut(&mut self.chunks[idx]).get_pixel_mut(lx, ly)
    }

    // ---- bulk operations ----------------------------------------------------

    /// Fill every pixel with `color`, dropping all existing tiles.
    pub fn fill(&mut self, color: Rgba<u8>) {
        let tile = Arc::new(RgbaImage::from_pixel(CHUNK_SIZE, CHUNK_SIZE, color));
        for slot in &mut self.chunks {
            *slot = Arc::clone(&tile);
        }
    }

    /// Copy `source` into `self` with its origin at (0, 0), clipped to the
    /// smaller of the two extents. Pixels outside the overlap are untouched.
    ///
    /// Tiles lying entirely inside both buffers are shared rather than copied.
    pub fn blit(&mut self, source: &PixelBuffer) {
        let overlap_w = self.width.min(source.width);
        let overlap_h = self.height.min(source.height);
        let tiles_x = overlap_w.div_ceil(CHUNK_SIZE);
        let tiles_y = overlap_h.div_ceil(CHUNK_SIZE);

        for cy in 0..tiles_y {
            for cx in 0..tiles_x {
                let x0 = cx * CHUNK_SIZE;
                let y0 = cy * CHUNK_SIZE;
                let x1 = (x0 + CHUNK_SIZE).min(overlap_w);
                let y1 = (y0 + CHUNK_SIZE).min(overlap_h);
                let dst_idx = self.flat_index(cx, cy);
                let src_idx = source.flat_index(cx, cy);

                if x1 - x0 == CHUNK_SIZE && y1 - y0 == CHUNK_SIZE {
                    self.chunks[dst_idx] = Arc::clone(&source.chunks[src_idx]);
                    continue;
                }

                let src_tile = &source.chunks[src_idx];
                let dst_tile = Arc::make_mut(&mut self.chunks[dst_idx]);
                for y in y0..y1 {
                    for x in x0..x1 {
                        let (lx, ly) = Self::local(x, y);
                        dst_tile.put_pixel(lx, ly, *src_tile.get_pixel(lx, ly));
                    }
                }
            }
        }
    }

    /// Approximate pixel memory owned exclusively by this buffer. Tiles shared
    /// with snapshots only count their pointer.
    pub fn memory_bytes(&self) -> usize {
        let chunk_byte_size = (CHUNK_SIZE * CHUNK_SIZE * 4) as usize;
        self.chunks
            .iter()
            .map(|arc| {
                if Arc::strong_count(arc) == 1 {
                    chunk_byte_size
                } else {
                    std::mem::size_of::<usize>() * 2
                }
            })
            .sum()
    }
}

impl PartialEq for PixelBuffer {
    /// Pixel-exact comparison of the visible area.
    fn eq(&self, other: &Self) -> bool {
        if self.width != other.width || self.height != other.height {
            return false;
        }
        for cy in 0..self.height.div_ceil(CHUNK_SIZE) {
            for cx in 0..self.chunks_per_row {
                let idx = self.flat_index(cx, cy);
                let (a, b) = (&self.chunks[idx], &other.chunks[idx]);
                if Arc::ptr_eq(a, b) {
                    continue;
                }
                let x_end = CHUNK_SIZE.min(self.width - cx * CHUNK_SIZE);
                let y_end = CHUNK_SIZE.min(self.height - cy * CHUNK_SIZE);
                for ly in 0..y_end {
                    for lx in 0..x_end {
                        if a.get_pixel(lx, ly) != b.get_pixel(lx, ly) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }
}

impl Eq for PixelBuffer {}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("chunks", &self.chunks.len())
            .finish()
    }
}

/// Straight-alpha source-over. `src_a` already includes coverage.
#[inline]
fn blend_over(dst: Rgba<u8>, src: [u8; 4], src_a: f32) -> Rgba<u8> {
    if src_a >= 1.0 {
        return Rgba([src[0], src[1], src[2], 255]);
    }
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return TRANSPARENT;
    }
    let mix = |s: u8, d: u8| -> u8 {
        let v = (s as f32 * src_a + d as f32 * dst_a * (1.0 - src_a)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

// ============================================================================
// CANVAS STATE: committed buffer and its lifecycle
// ============================================================================

/// Owner of the committed buffer: the single source of truth for what has
/// been painted. `None` until the first canvas is created.
#[derive(Default)]
pub struct CanvasState {
    committed: Option<PixelBuffer>,
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_canvas(&self) -> bool {
        self.committed.is_some()
    }

    pub fn committed(&self) -> Option<&PixelBuffer> {
        self.committed.as_ref()
    }

    pub fn committed_mut(&mut self) -> Option<&mut PixelBuffer> {
        self.committed.as_mut()
    }

    /// Swap in a buffer restored from history.
    pub fn replace_committed(&mut self, buffer: PixelBuffer) {
        self.committed = Some(buffer);
    }

    /// Current `(width, height)`, if a canvas exists.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.committed.as_ref().map(|b| (b.width(), b.height()))
    }

    /// Raise a requested size to the 800×600 document floor (and cap it at
    /// `MAX_CANVAS_DIMENSION`).
    pub fn clamp_to_floor(width: i32, height: i32) -> (u32, u32) {
        (
            (width.max(0) as u32).clamp(MIN_CANVAS_WIDTH, MAX_CANVAS_DIMENSION),
            (height.max(0) as u32).clamp(MIN_CANVAS_HEIGHT, MAX_CANVAS_DIMENSION),
        )
    }

    /// Allocate a new white canvas of at least 800×600.
    ///
    /// With `preserve_content` the previous committed buffer is blitted in at
    /// the origin (growing appends white, shrinking crops) and history is kept.
    /// Without it the old content is discarded and both history stacks are
    /// cleared.
    pub fn create_canvas(
        &mut self,
        width: i32,
        height: i32,
        preserve_content: bool,
        history: &mut HistoryManager,
    ) -> (u32, u32) {
        let (w, h) = Self::clamp_to_floor(width, height);
        self.reallocate(w, h, preserve_content, history);
        (w, h)
    }

    /// Follow a host-surface size change at the exact requested size.
    ///
    /// Non-positive sizes are ignored and oversized ones are capped. Before
    /// any canvas exists this creates the first one, clamped to the document
    /// floor.
    pub fn resize_surface(
        &mut self,
        width: i32,
        height: i32,
        history: &mut HistoryManager,
    ) -> bool {
        if width <= 0 || height <= 0 {
            return false;
        }
        if self.committed.is_none() {
            self.create_canvas(width, height, true, history);
            return true;
        }
        let width = (width as u32).min(MAX_CANVAS_DIMENSION);
        let height = (height as u32).min(MAX_CANVAS_DIMENSION);
        if self.size() == Some((width, height)) {
            return false;
        }
        self.reallocate(width, height, true, history);
        true
    }

    fn reallocate(
        &mut self,
        width: u32,
        height: u32,
        preserve_content: bool,
        history: &mut HistoryManager,
    ) {
        let mut fresh = PixelBuffer::new(width, height);
        if preserve_content && let Some(old) = self.committed.take() {
            fresh.blit(&old);
        }
        if !preserve_content {
            history.clear();
        }
        log_info!(
            "canvas allocated {}x{} (preserve_content={})",
            width,
            height,
            preserve_content
        );
        self.committed = Some(fresh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn checker(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if (x / 7 + y / 5) % 2 == 0 {
                    buf.put_pixel(x, y, Rgba([(x % 256) as u8, (y % 256) as u8, 40, 255]));
                }
            }
        }
        buf
    }

    #[test]
    fn new_buffer_is_white_everywhere() {
        let buf = PixelBuffer::new(130, 70);
        assert_eq!(buf.width(), 130);
        assert_eq!(buf.height(), 70);
        assert_eq!(buf.get_pixel(0, 0), WHITE);
        assert_eq!(buf.get_pixel(129, 69), WHITE);
        assert_eq!(buf.get_pixel(130, 0), TRANSPARENT);
    }

    #[test]
    fn zero_dimensions_are_raised_to_one() {
        let buf = PixelBuffer::new(0, 0);
        assert_eq!((buf.width(), buf.height()), (1, 1));
    }

    #[test]
    fn clone_is_independent_of_original() {
        let mut original = PixelBuffer::new(100, 100);
        let snapshot = original.clone();
        original.put_pixel(10, 10, RED);
        assert_eq!(original.get_pixel(10, 10), RED);
        assert_eq!(snapshot.get_pixel(10, 10), WHITE);

        let mut copy = original.clone();
        copy.put_pixel(10, 10, WHITE);
        assert_eq!(original.get_pixel(10, 10), RED);
    }

    #[test]
    fn equality_compares_visible_pixels() {
        let a = checker(90, 90);
        let mut b = a.clone();
        assert_eq!(a, b);
        b.put_pixel(89, 89, RED);
        assert_ne!(a, b);
        assert_ne!(PixelBuffer::new(10, 10), PixelBuffer::new(10, 11));
    }

    #[test]
    fn rgba_image_round_trip_preserves_pixels() {
        let buf = checker(150, 77);
        let flat = buf.to_rgba_image();
        assert_eq!(flat.dimensions(), (150, 77));
        assert_eq!(PixelBuffer::from_rgba_image(&flat), buf);
    }

    #[test]
    fn raw_import_rejects_wrong_length() {
        assert!(PixelBuffer::from_raw_rgba(2, 2, &[0; 15]).is_none());
        assert!(PixelBuffer::from_raw_rgba(0, 2, &[]).is_none());
        let buf = PixelBuffer::from_raw_rgba(2, 1, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(buf.get_pixel(1, 0), Rgba([5, 6, 7, 8]));
    }

    #[test]
    fn blend_full_opacity_replaces_and_partial_mixes() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.blend_pixel(0, 0, [10, 20, 30, 255], 1.0);
        assert_eq!(buf.get_pixel(0, 0), Rgba([10, 20, 30, 255]));

        buf.blend_pixel(1, 0, [0, 0, 0, 255], 0.5);
        let px = buf.get_pixel(1, 0);
        assert_eq!(px[3], 255);
        assert!((126..=129).contains(&px[0]), "got {:?}", px);

        buf.blend_pixel(2, 0, [0, 0, 0, 255], 0.0);
        assert_eq!(buf.get_pixel(2, 0), WHITE);
    }

    #[test]
    fn blit_into_larger_buffer_keeps_new_area_white() {
        let src = checker(100, 80);
        let mut dst = PixelBuffer::new(200, 150);
        dst.blit(&src);
        for y in 0..80 {
            for x in 0..100 {
                assert_eq!(dst.get_pixel(x, y), src.get_pixel(x, y));
            }
        }
        assert_eq!(dst.get_pixel(100, 10), WHITE);
        assert_eq!(dst.get_pixel(10, 80), WHITE);
        assert_eq!(dst.get_pixel(199, 149), WHITE);
    }

    #[test]
    fn blit_into_smaller_buffer_crops() {
        let src = checker(200, 150);
        let mut dst = PixelBuffer::new(70, 65);
        dst.blit(&src);
        for y in 0..65 {
            for x in 0..70 {
                assert_eq!(dst.get_pixel(x, y), src.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn blit_shares_interior_tiles_without_aliasing_writes() {
        let mut src = checker(128, 128);
        let mut dst = PixelBuffer::new(128, 128);
        dst.blit(&src);
        assert_eq!(dst, src);
        dst.put_pixel(5, 5, RED);
        assert_ne!(src.get_pixel(5, 5), RED);
        src.put_pixel(6, 6, RED);
        assert_ne!(dst.get_pixel(6, 6), RED);
    }

    #[test]
    fn shared_tiles_count_less_memory() {
        let a = PixelBuffer::new(128, 128);
        let lone = PixelBuffer::from_rgba_image(&a.to_rgba_image());
        assert!(a.memory_bytes() < lone.memory_bytes());
    }

    #[test]
    fn rect_from_corners_normalises() {
        let r = PixelRect::from_corners(IPoint::new(110, 60), IPoint::new(10, 10));
        assert_eq!(r, PixelRect::new(10, 10, 100, 50));
        assert!(!r.is_empty());
        assert!(PixelRect::from_corners(IPoint::new(5, 5), IPoint::new(5, 50)).is_empty());
    }

    #[test]
    fn rect_from_extreme_corners_saturates() {
        let r = PixelRect::from_corners(IPoint::new(i32::MIN, 0), IPoint::new(i32::MAX, 10));
        assert_eq!(r, PixelRect::new(i32::MIN, 0, i32::MAX, 10));
        let r = PixelRect::from_corners(IPoint::new(-5, i32::MAX), IPoint::new(5, i32::MIN));
        assert_eq!((r.width, r.height), (10, i32::MAX));
    }

    #[test]
    fn oversized_buffers_are_capped() {
        let buf = PixelBuffer::new(u32::MAX, 3);
        assert_eq!((buf.width(), buf.height()), (MAX_CANVAS_DIMENSION, 3));
        assert_eq!(
            CanvasState::clamp_to_floor(i32::MAX, 100),
            (MAX_CANVAS_DIMENSION, MIN_CANVAS_HEIGHT)
        );
    }

    #[test]
    fn huge_surface_resize_is_capped() {
        let mut state = CanvasState::new();
        let mut history = HistoryManager::default();
        state.create_canvas(800, 600, false, &mut history);
        assert!(state.resize_surface(i32::MAX, 700, &mut history));
        assert_eq!(state.size(), Some((MAX_CANVAS_DIMENSION, 700)));
        assert!(!state.resize_surface(i32::MAX, 700, &mut history));
    }

    #[test]
    fn create_canvas_clamps_to_floor() {
        let mut state = CanvasState::new();
        let mut history = HistoryManager::default();
        assert_eq!(state.create_canvas(100, -4, false, &mut history), (800, 600));
        assert_eq!(state.size(), Some((800, 600)));
        assert_eq!(state.create_canvas(1024, 700, false, &mut history), (1024, 700));
    }

    #[test]
    fn new_document_discards_content_and_history() {
        let mut state = CanvasState::new();
        let mut history = HistoryManager::default();
        state.create_canvas(800, 600, false, &mut history);
        history.begin_gesture(state.committed().unwrap());
        state.committed_mut().unwrap().put_pixel(3, 3, RED);

        state.create_canvas(800, 600, false, &mut history);
        assert_eq!(state.committed().unwrap().get_pixel(3, 3), WHITE);
        assert!(!history.can_undo());
    }

    #[test]
    fn resize_grows_and_shrinks_top_left_anchored() {
        let mut state = CanvasState::new();
        let mut history = HistoryManager::default();
        state.create_canvas(800, 600, false, &mut history);
        let original = checker(800, 600);
        state.replace_committed(original.clone());
        history.begin_gesture(&original);

        assert!(state.resize_surface(1000, 600, &mut history));
        let grown = state.committed().unwrap();
        assert_eq!((grown.width(), grown.height()), (1000, 600));
        for y in (0..600).step_by(13) {
            for x in (0..800).step_by(11) {
                assert_eq!(grown.get_pixel(x, y), original.get_pixel(x, y));
            }
            for x in 800..1000 {
                assert_eq!(grown.get_pixel(x, y), WHITE);
            }
        }

        assert!(state.resize_surface(600, 600, &mut history));
        let shrunk = state.committed().unwrap();
        assert_eq!((shrunk.width(), shrunk.height()), (600, 600));
        for y in 0..600 {
            for x in 0..600 {
                assert_eq!(shrunk.get_pixel(x, y), original.get_pixel(x, y));
            }
        }
        assert!(history.can_undo(), "resizing keeps history");
    }

    #[test]
    fn resize_ignores_invalid_and_unchanged_sizes() {
        let mut state = CanvasState::new();
        let mut history = HistoryManager::default();
        assert!(!state.resize_surface(0, 500, &mut history));
        assert!(!state.has_canvas());

        assert!(state.resize_surface(300, 200, &mut history));
        assert_eq!(state.size(), Some((800, 600)), "first canvas honours the floor");
        assert!(!state.resize_surface(800, 600, &mut history));
        assert!(!state.resize_surface(-1, 600, &mut history));
        assert_eq!(state.size(), Some((800, 600)));
    }
}
