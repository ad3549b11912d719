use ndarray::ArrayView3;

/// Number of color channels in a captured frame (RGB).
pub const FRAME_CHANNELS: usize = 3;

/// A single captured camera frame: contiguous RGB bytes in row-major order.
///
/// Frames are transient: produced by the active stream, consumed by one
/// detection attempt, then dropped. The index counts frames since the
/// stream was opened.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: u64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: u64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * FRAME_CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// A uniformly gray frame, useful for synthetic sources and tests.
    pub fn solid(width: u32, height: u32, luma: u8, index: u64) -> Self {
        let data = vec![luma; (width as usize) * (height as usize) * FRAME_CHANNELS];
        Self::new(data, width, height, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// (height, width, channel) view for detection backends.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        let shape = (self.height as usize, self.width as usize, FRAME_CHANNELS);
        ArrayView3::from_shape(shape, &self.data)
            .expect("Frame data length must match dimensions")
    }
}
