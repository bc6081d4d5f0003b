// juliabrot-compute/src/pixel_buffer.rs

use serde::{Deserialize, Serialize};

/// Tightly packed RGBA8 image, row-major, row 0 at the top.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Opaque black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let mut data = vec![0u8; width as usize * height as usize * 4];
        for alpha in data.iter_mut().skip(3).step_by(4) {
            *alpha = 255;
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn row_bytes(&self) -> usize {
        self.width as usize * 4
    }

    pub fn row_mut(&mut self, row: u32) -> &mut [u8] {
        let stride = self.row_bytes();
        let start = row as usize * stride;
        &mut self.data[start..start + stride]
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_opaque_black() {
        let buffer = PixelBuffer::new(3, 2);
        assert_eq!(buffer.data.len(), 3 * 2 * 4);
        assert_eq!(buffer.pixel(2, 1), Some([0, 0, 0, 255]));
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 16]).is_some());
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn row_mut_addresses_one_row() {
        let mut buffer = PixelBuffer::new(4, 3);
        buffer.row_mut(1).fill(7);
        assert_eq!(buffer.pixel(0, 1), Some([7, 7, 7, 7]));
        assert_eq!(buffer.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(buffer.pixel(0, 2), Some([0, 0, 0, 255]));
    }

    #[test]
    fn pixel_out_of_bounds() {
        let buffer = PixelBuffer::new(4, 3);
        assert_eq!(buffer.pixel(4, 0), None);
        assert_eq!(buffer.pixel(0, 3), None);
    }
}
