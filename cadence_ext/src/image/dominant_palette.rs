use image::DynamicImage;
use kmeans_colors::Sort;
use palette::{cast::from_component_slice, FromColor, IntoColor, Lab, Srgb, Srgba};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

const RESIZE: u32 = 128;
const RUNS: u64 = 8;
const MAX_ITERATIONS: usize = 20;
const CONVERGE: f32 = 1.0;

/// Extracts the `palette_size` most dominant colours of an image, most
/// dominant first, as `0xRRGGBB` words.
#[must_use]
pub fn extract(image: &DynamicImage, palette_size: usize) -> Vec<u32> {
    let pixels = image
        .resize(RESIZE, RESIZE, image::imageops::FilterType::Nearest)
        .to_rgba8()
        .into_raw();

    let lab = from_component_slice::<Srgba<u8>>(&pixels)
        .par_iter()
        .filter(|px| px.alpha == 255)
        .map(|px| px.into_format::<_, f32>().into_color())
        .collect::<Vec<Lab>>();
    if lab.is_empty() {
        return Vec::new();
    }

    let Some(result) = (0..RUNS)
        .map(|seed| {
            kmeans_colors::get_kmeans(palette_size, MAX_ITERATIONS, CONVERGE, false, &lab, seed)
        })
        .max_by(|a, b| a.score.total_cmp(&b.score))
    else {
        return Vec::new();
    };

    let mut centroids = Lab::sort_indexed_colors(&result.centroids, &result.indices);
    centroids.sort_unstable_by(|a, b| b.percentage.total_cmp(&a.percentage));

    centroids
        .into_iter()
        .map(|c| {
            let rgb = Srgb::from_color(c.centroid).into_format::<u8>();
            (u32::from(rgb.red) << 16) | (u32::from(rgb.green) << 8) | u32::from(rgb.blue)
        })
        .collect()
}

/// # Errors
/// When the bytes do not decode as a supported image format.
pub fn from_bytes(bytes: &[u8], palette_size: usize) -> Result<Vec<u32>, image::ImageError> {
    let image = image::load_from_memory(bytes)?;
    Ok(extract(&image, palette_size))
}

#[cfg(test)]
mod test {
    use image::{DynamicImage, Rgba, RgbaImage};

    use super::extract;

    fn flat_image(rgb: [u8; 3]) -> DynamicImage {
        let img = RgbaImage::from_pixel(16, 16, Rgba([rgb[0], rgb[1], rgb[2], 255]));
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn single_colour_image_yields_that_colour() {
        let palette = extract(&flat_image([255, 0, 0]), 1);
        assert_eq!(palette.len(), 1);
        // k-means in Lab space may round by a hair, so compare channels loosely
        let (r, g, b) = (palette[0] >> 16, (palette[0] >> 8) & 0xFF, palette[0] & 0xFF);
        assert!(r >= 250, "red channel was {r}");
        assert!(g <= 5 && b <= 5, "green/blue channels were {g}/{b}");
    }

    #[test]
    fn palette_size_bounds_the_result() {
        let mut img = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 255, 255]));
        for x in 0..8 {
            for y in 0..16 {
                img.put_pixel(x, y, Rgba([255, 255, 0, 255]));
            }
        }
        let palette = extract(&DynamicImage::ImageRgba8(img), 2);
        assert!(!palette.is_empty());
        assert!(palette.len() <= 2);
    }
}
