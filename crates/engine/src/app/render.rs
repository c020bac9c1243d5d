use super::{FrameHandle, Rect};

/// Draw order bucket; lower layers are drawn first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DrawLayer {
    Water,
    Background,
    Main,
}

/// What the renderer needs to draw one entity: the image to blit and the
/// screen-space box to blit it into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderableDesc {
    pub frame: FrameHandle,
    pub visual_box: Rect,
    pub layer: DrawLayer,
}

impl RenderableDesc {
    pub fn new(frame: FrameHandle, visual_box: Rect, layer: DrawLayer) -> Self {
        Self {
            frame,
            visual_box,
            layer,
        }
    }
}

/// Renderer boundary. Implementations blit; the simulation never draws.
pub trait Renderer {
    fn present(&mut self, renderables: &[RenderableDesc]);
}

/// Renderer that only keeps the size of the last presented frame.
#[derive(Debug, Default)]
pub struct NullRenderer {
    last_frame_len: usize,
    frames_presented: u64,
}

impl NullRenderer {
    pub fn last_frame_len(&self) -> usize {
        self.last_frame_len
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl Renderer for NullRenderer {
    fn present(&mut self, renderables: &[RenderableDesc]) {
        self.last_frame_len = renderables.len();
        self.frames_presented = self.frames_presented.saturating_add(1);
    }
}

/// Stable draw order: by layer, keeping submission order inside a layer.
pub fn sort_by_layer(renderables: &mut [RenderableDesc]) {
    renderables.sort_by_key(|renderable| renderable.layer);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_sort_is_stable() {
        let rect = Rect::new(0.0, 0.0, 1.0, 1.0);
        let mut renderables = vec![
            RenderableDesc::new(FrameHandle::new(1), rect, DrawLayer::Main),
            RenderableDesc::new(FrameHandle::new(2), rect, DrawLayer::Water),
            RenderableDesc::new(FrameHandle::new(3), rect, DrawLayer::Main),
            RenderableDesc::new(FrameHandle::new(4), rect, DrawLayer::Background),
        ];
        sort_by_layer(&mut renderables);
        let order: Vec<u32> = renderables.iter().map(|r| r.frame.image).collect();
        assert_eq!(order, vec![2, 4, 1, 3]);
    }
}
