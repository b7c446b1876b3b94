use std::{fs::File, io::BufReader, path::Path};

use bridge::error::InvalidSkinError;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage, imageops};

/// A skin converted to the 64x64 layout, with the arm model detected from its pixels.
pub struct NormalizedSkin {
    image: RgbaImage,
    legacy: bool,
    slim: bool,
}

// (x, y, dx, dy, width, height) of each part copied, mirrored horizontally, into the lower half
// when upgrading a 64x32 skin. Same table the game uses.
const LEGACY_PART_COPIES: [(u32, u32, i32, i32, u32, u32); 12] = [
    (4, 16, 16, 32, 4, 4),
    (8, 16, 16, 32, 4, 4),
    (0, 20, 24, 32, 4, 12),
    (4, 20, 16, 32, 4, 12),
    (8, 20, 8, 32, 4, 12),
    (12, 20, 16, 32, 4, 12),
    (44, 16, -8, 32, 4, 4),
    (48, 16, -8, 32, 4, 4),
    (40, 20, 0, 32, 4, 12),
    (44, 20, -8, 32, 4, 12),
    (48, 20, -16, 32, 4, 12),
    (52, 20, -8, 32, 4, 12),
];

// Columns a 4px classic arm uses but a 3px slim arm leaves empty, for both arms.
const SLIM_ARM_GAPS: [(u32, u32, u32, u32); 4] =
    [(50, 16, 2, 4), (54, 20, 2, 12), (42, 48, 2, 4), (46, 52, 2, 12)];

impl NormalizedSkin {
    pub fn read_png(path: &Path) -> Result<Self, InvalidSkinError> {
        let image = {
            let file = File::open(path).map_err(InvalidSkinError::Read)?;
            image::load(BufReader::new(file), ImageFormat::Png)
                .map_err(|error| InvalidSkinError::Decode(error.to_string().into()))?
        };
        Self::new(&image)
    }

    pub fn new(image: &DynamicImage) -> Result<Self, InvalidSkinError> {
        let (width, height) = image.dimensions();
        let legacy = match (width, height) {
            (64, 64) => false,
            (64, 32) => true,
            _ => return Err(InvalidSkinError::Dimensions { width, height }),
        };

        let mut normalized = RgbaImage::new(64, 64);
        imageops::replace(&mut normalized, &image.to_rgba8(), 0, 0);
        if legacy {
            for (x, y, dx, dy, w, h) in LEGACY_PART_COPIES {
                copy_mirrored(&mut normalized, x, y, dx, dy, w, h);
            }
        }

        // 64x32 skins predate the slim model.
        let slim = !legacy
            && SLIM_ARM_GAPS
                .iter()
                .all(|&(x, y, w, h)| is_area_transparent(&normalized, x, y, w, h));

        Ok(Self {
            image: normalized,
            legacy,
            slim,
        })
    }

    pub fn is_slim(&self) -> bool {
        self.slim
    }

    /// Whether the source was in the pre-1.8 64x32 layout.
    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// RGBA8 pixels of the normalized 64x64 skin, row major.
    pub fn raw_pixels(&self) -> &[u8] {
        self.image.as_raw()
    }
}

fn copy_mirrored(image: &mut RgbaImage, x: u32, y: u32, dx: i32, dy: i32, w: u32, h: u32) {
    let target_x = x.saturating_add_signed(dx);
    let target_y = y.saturating_add_signed(dy);
    for row in 0..h {
        for col in 0..w {
            let pixel = *image.get_pixel(x + col, y + row);
            image.put_pixel(target_x + (w - 1 - col), target_y + row, pixel);
        }
    }
}

fn is_area_transparent(image: &RgbaImage, x: u32, y: u32, w: u32, h: u32) -> bool {
    (y..y + h).all(|py| (x..x + w).all(|px| image.get_pixel(px, py)[3] == 0))
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    const OPAQUE: Rgba<u8> = Rgba([200, 120, 80, 255]);

    fn classic(height: u32) -> RgbaImage {
        RgbaImage::from_pixel(64, height, OPAQUE)
    }

    fn slim() -> RgbaImage {
        let mut image = classic(64);
        for (x, y, w, h) in SLIM_ARM_GAPS {
            for py in y..y + h {
                for px in x..x + w {
                    image.put_pixel(px, py, Rgba([0, 0, 0, 0]));
                }
            }
        }
        image
    }

    #[test]
    fn opaque_arms_are_classic() {
        let skin = NormalizedSkin::new(&DynamicImage::ImageRgba8(classic(64))).unwrap();
        assert!(!skin.is_slim());
        assert!(!skin.is_legacy());
        assert_eq!(skin.raw_pixels().len(), 64 * 64 * 4);
    }

    #[test]
    fn transparent_arm_columns_are_slim() {
        let skin = NormalizedSkin::new(&DynamicImage::ImageRgba8(slim())).unwrap();
        assert!(skin.is_slim());
    }

    #[test]
    fn legacy_skin_is_upgraded_and_classic() {
        let skin = NormalizedSkin::new(&DynamicImage::ImageRgba8(classic(32))).unwrap();
        assert!(skin.is_legacy());
        assert!(!skin.is_slim());
        assert_eq!(skin.image().dimensions(), (64, 64));
        // Left arm top, mirrored from the right arm.
        assert_eq!(*skin.image().get_pixel(36, 48), OPAQUE);
        // Unused area of the lower half stays empty.
        assert_eq!(skin.image().get_pixel(0, 40)[3], 0);
    }

    #[test]
    fn legacy_skin_with_empty_arm_columns_stays_classic() {
        let mut image = classic(32);
        // Right arm columns that would mirror into every slim gap of the upgraded layout.
        for (x, y, h) in [(48, 16, 4), (50, 16, 4), (52, 20, 12), (54, 20, 12)] {
            for py in y..y + h {
                for px in x..x + 2 {
                    image.put_pixel(px, py, Rgba([0, 0, 0, 0]));
                }
            }
        }

        let skin = NormalizedSkin::new(&DynamicImage::ImageRgba8(image)).unwrap();
        assert!(skin.is_legacy());
        assert!(!skin.is_slim());
        assert!(is_area_transparent(skin.image(), 42, 48, 2, 4));
        assert!(is_area_transparent(skin.image(), 46, 52, 2, 12));
    }

    #[test]
    fn other_sizes_are_rejected() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(128, 64));
        assert!(matches!(
            NormalizedSkin::new(&image),
            Err(InvalidSkinError::Dimensions { width: 128, height: 64 })
        ));
    }

    #[test]
    fn reads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skin.png");
        slim().save(&path).unwrap();

        let skin = NormalizedSkin::read_png(&path).unwrap();
        assert!(skin.is_slim());
    }

    #[test]
    fn garbage_file_fails_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skin.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        assert!(matches!(NormalizedSkin::read_png(&path), Err(InvalidSkinError::Decode(_))));
    }

    #[test]
    fn missing_file_fails_to_read() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            NormalizedSkin::read_png(&dir.path().join("missing.png")),
            Err(InvalidSkinError::Read(_))
        ));
    }
}
