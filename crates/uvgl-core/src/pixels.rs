//! Client memory layout of pixel transfers.
//!
//! `glTexSubImage*` reads and `glGetTexImage` writes client memory laid out
//! by the pixel-store parameters (`GL_UNPACK_*` and `GL_PACK_*`). The
//! functions here compute how many bytes such a transfer touches, so a
//! slice can be checked before its pointer reaches the driver.

use gl::types::*;

use crate::driver::{check_error, GlDriver};
use crate::error::{GlError, Result};

/// Whether the driver reads client memory or writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelDirection {
    /// Uploads, governed by `GL_UNPACK_*`.
    Unpack,
    /// Readbacks, governed by `GL_PACK_*`.
    Pack,
}

/// One direction's pixel-store parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelStore {
    pub alignment: GLint,
    pub row_length: GLint,
    pub image_height: GLint,
    pub skip_pixels: GLint,
    pub skip_rows: GLint,
    pub skip_images: GLint,
}

impl Default for PixelStore {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl PixelStore {
    /// The values every context starts with.
    pub const DEFAULT: Self = Self {
        alignment: 4,
        row_length: 0,
        image_height: 0,
        skip_pixels: 0,
        skip_rows: 0,
        skip_images: 0,
    };

    /// Read the current parameters for `direction`.
    ///
    /// `rows` selects the row-length and skip parameters, which GLES 2.0
    /// does not have. `images` selects the image-height and skip-images
    /// parameters, which only apply to 3D transfers. Parameters that are
    /// not read keep their initial value.
    pub fn query(gl: &dyn GlDriver, direction: PixelDirection, rows: bool, images: bool) -> Result<Self> {
        let names = match direction {
            PixelDirection::Unpack => [
                gl::UNPACK_ALIGNMENT,
                gl::UNPACK_ROW_LENGTH,
                gl::UNPACK_SKIP_PIXELS,
                gl::UNPACK_SKIP_ROWS,
                gl::UNPACK_IMAGE_HEIGHT,
                gl::UNPACK_SKIP_IMAGES,
            ],
            PixelDirection::Pack => [
                gl::PACK_ALIGNMENT,
                gl::PACK_ROW_LENGTH,
                gl::PACK_SKIP_PIXELS,
                gl::PACK_SKIP_ROWS,
                gl::PACK_IMAGE_HEIGHT,
                gl::PACK_SKIP_IMAGES,
            ],
        };
        let read = |pname: GLenum| -> Result<GLint> {
            let mut value = [0];
            gl.get_integer_v(pname, &mut value);
            check_error(gl, "glGetIntegerv")?;
            Ok(value[0])
        };

        let mut store = Self::DEFAULT;
        store.alignment = read(names[0])?;
        if rows {
            store.row_length = read(names[1])?;
            store.skip_pixels = read(names[2])?;
            store.skip_rows = read(names[3])?;
            if images {
                store.image_height = read(names[4])?;
                store.skip_images = read(names[5])?;
            }
        }
        Ok(store)
    }

    /// Distance in bytes between the starts of two rows.
    pub fn row_stride(&self, pixel_size: usize, width: GLsizei) -> usize {
        let pixels = if self.row_length > 0 { self.row_length } else { width };
        let bytes = dim(pixels) * pixel_size;
        let alignment = dim(self.alignment).max(1);
        bytes.div_ceil(alignment) * alignment
    }

    /// Distance in bytes between the starts of two images of a 3D transfer.
    pub fn image_stride(&self, pixel_size: usize, width: GLsizei, height: GLsizei) -> usize {
        let rows = if self.image_height > 0 { self.image_height } else { height };
        dim(rows) * self.row_stride(pixel_size, width)
    }

    /// Offset of the first byte of row `line` in image `layer`.
    pub fn row_offset(
        &self,
        pixel_size: usize,
        width: GLsizei,
        height: GLsizei,
        line: GLsizei,
        layer: GLsizei,
    ) -> usize {
        dim(self.skip_images + layer) * self.image_stride(pixel_size, width, height)
            + dim(self.skip_rows + line) * self.row_stride(pixel_size, width)
            + dim(self.skip_pixels) * pixel_size
    }

    /// Bytes of client memory a `width` × `height` × `depth` transfer spans.
    /// Empty transfers span nothing.
    pub fn required_len(&self, pixel_size: usize, width: GLsizei, height: GLsizei, depth: GLsizei) -> usize {
        if width <= 0 || height <= 0 || depth <= 0 {
            return 0;
        }
        self.row_offset(pixel_size, width, height, height - 1, depth - 1) + dim(width) * pixel_size
    }
}

fn dim(value: GLint) -> usize {
    value.max(0) as usize
}

/// Size in bytes of one client pixel of `format` and `ty`.
pub fn pixel_size(format: GLenum, ty: GLenum) -> Result<usize> {
    let packed = match ty {
        gl::UNSIGNED_BYTE_3_3_2 | gl::UNSIGNED_BYTE_2_3_3_REV => Some(1),
        gl::UNSIGNED_SHORT_5_6_5
        | gl::UNSIGNED_SHORT_5_6_5_REV
        | gl::UNSIGNED_SHORT_4_4_4_4
        | gl::UNSIGNED_SHORT_4_4_4_4_REV
        | gl::UNSIGNED_SHORT_5_5_5_1
        | gl::UNSIGNED_SHORT_1_5_5_5_REV => Some(2),
        gl::UNSIGNED_INT_8_8_8_8
        | gl::UNSIGNED_INT_8_8_8_8_REV
        | gl::UNSIGNED_INT_10_10_10_2
        | gl::UNSIGNED_INT_2_10_10_10_REV
        | gl::UNSIGNED_INT_24_8
        | gl::UNSIGNED_INT_10F_11F_11F_REV
        | gl::UNSIGNED_INT_5_9_9_9_REV => Some(4),
        gl::FLOAT_32_UNSIGNED_INT_24_8_REV => Some(8),
        _ => None,
    };
    if let Some(size) = packed {
        return Ok(size);
    }

    let component = match ty {
        gl::UNSIGNED_BYTE | gl::BYTE => 1,
        gl::UNSIGNED_SHORT | gl::SHORT | gl::HALF_FLOAT => 2,
        gl::UNSIGNED_INT | gl::INT | gl::FLOAT => 4,
        _ => {
            return Err(GlError::InvalidArgument {
                what: "pixel type",
                value: ty,
            })
        }
    };
    let components = match format {
        gl::RED
        | gl::GREEN
        | gl::BLUE
        | gl::ALPHA
        | gl::RED_INTEGER
        | gl::DEPTH_COMPONENT
        | gl::STENCIL_INDEX => 1,
        gl::RG | gl::RG_INTEGER | gl::DEPTH_STENCIL => 2,
        gl::RGB | gl::BGR | gl::RGB_INTEGER | gl::BGR_INTEGER => 3,
        gl::RGBA | gl::BGRA | gl::RGBA_INTEGER | gl::BGRA_INTEGER => 4,
        _ => {
            return Err(GlError::InvalidArgument {
                what: "pixel format",
                value: format,
            })
        }
    };
    Ok(components * component)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGl, Profile};

    #[test]
    fn rows_are_padded_to_the_alignment() {
        let store = PixelStore::DEFAULT;
        // 3 RGB8 pixels are 9 bytes, padded to 12.
        assert_eq!(store.row_stride(3, 3), 12);
        // The last row is not padded.
        assert_eq!(store.required_len(3, 3, 2, 1), 12 + 9);

        let tight = PixelStore { alignment: 1, ..store };
        assert_eq!(tight.required_len(3, 3, 2, 1), 18);
    }

    #[test]
    fn row_length_and_skips_widen_the_span() {
        let store = PixelStore {
            alignment: 1,
            row_length: 8,
            skip_pixels: 2,
            skip_rows: 1,
            ..PixelStore::DEFAULT
        };
        // One skipped row of 8 pixels, then 2 skipped pixels, then 4 pixels.
        assert_eq!(store.required_len(4, 4, 1, 1), (8 + 2 + 4) * 4);
        assert_eq!(store.row_offset(4, 4, 1, 0, 0), (8 + 2) * 4);
    }

    #[test]
    fn images_use_image_height() {
        let store = PixelStore {
            image_height: 4,
            ..PixelStore::DEFAULT
        };
        // Two images of 4 rows × 8 bytes, the last one holding 2 rows.
        assert_eq!(store.required_len(4, 2, 2, 2), 4 * 8 + 2 * 8);
    }

    #[test]
    fn empty_transfers_span_nothing() {
        assert_eq!(PixelStore::DEFAULT.required_len(4, 0, 8, 1), 0);
        assert_eq!(PixelStore::DEFAULT.required_len(4, 8, -1, 1), 0);
    }

    #[test]
    fn pixel_sizes_follow_format_and_type() {
        assert_eq!(pixel_size(gl::RGBA, gl::UNSIGNED_BYTE), Ok(4));
        assert_eq!(pixel_size(gl::RGB, gl::HALF_FLOAT), Ok(6));
        assert_eq!(pixel_size(gl::RGBA, gl::FLOAT), Ok(16));
        assert_eq!(pixel_size(gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8), Ok(4));
        assert_eq!(
            pixel_size(gl::RGBA, gl::RGBA),
            Err(GlError::InvalidArgument {
                what: "pixel type",
                value: gl::RGBA
            })
        );
    }

    #[test]
    fn query_reads_the_driver_parameters() {
        let gl = FakeGl::desktop();
        gl.seed(|s| {
            s.unpack.alignment = 1;
            s.unpack.row_length = 16;
        });
        let store = PixelStore::query(&gl, PixelDirection::Unpack, true, false).unwrap();
        assert_eq!((store.alignment, store.row_length), (1, 16));
        assert_eq!(gl.count("glGetIntegerv"), 4);

        let pack = PixelStore::query(&gl, PixelDirection::Pack, true, true).unwrap();
        assert_eq!(pack, PixelStore::DEFAULT);
    }

    #[test]
    fn es2_only_has_alignment() {
        let gl = FakeGl::new(Profile::es(2, 0));
        let store = PixelStore::query(&gl, PixelDirection::Unpack, false, false).unwrap();
        assert_eq!(store, PixelStore::DEFAULT);

        let err = PixelStore::query(&gl, PixelDirection::Unpack, true, false).unwrap_err();
        assert!(matches!(err, GlError::Driver { code: gl::INVALID_ENUM, .. }));
    }
}
