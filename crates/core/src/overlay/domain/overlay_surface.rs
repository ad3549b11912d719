use crate::shared::geometry::FaceBox;

/// Port to whatever actually draws the annotation layer.
///
/// All coordinates handed to a surface are in displayed-box space; the
/// renderer owns the native→display projection.
pub trait OverlaySurface {
    /// Resizes the surface to exactly the displayed video box.
    fn set_size(&mut self, width: f64, height: f64);

    fn draw_box(&mut self, rect: &FaceBox);

    fn draw_label(&mut self, text: &str, x: f64, y: f64);

    fn clear(&mut self);

    /// Cosmetic alpha fade-out before the hard clear. Default: just
    /// clear immediately.
    fn fade_clear(&mut self) {
        self.clear();
    }
}

/// Surface that discards everything. Used by the headless runner and by
/// tests where drawing output is irrelevant.
pub struct NullOverlaySurface;

impl OverlaySurface for NullOverlaySurface {
    fn set_size(&mut self, _width: f64, _height: f64) {}
    fn draw_box(&mut self, _rect: &FaceBox) {}
    fn draw_label(&mut self, _text: &str, _x: f64, _y: f64) {}
    fn clear(&mut self) {}
}
