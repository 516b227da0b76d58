use crate::core::framebuffer::FrameBuffer;
use image::{ImageBuffer, Rgb, RgbImage};
use log::info;
use std::path::Path;

/// Converts a packed ARGB buffer into an RGB image.
pub fn argb_to_image(buffer: &[u32], width: usize, height: usize) -> Result<RgbImage, String> {
    if buffer.len() != width * height {
        return Err(format!(
            "Buffer holds {} pixels, expected {}x{}",
            buffer.len(),
            width,
            height
        ));
    }

    let mut img_buf = ImageBuffer::new(width as u32, height as u32);
    for (x, y, pixel) in img_buf.enumerate_pixels_mut() {
        let color_u32 = buffer[(y as usize) * width + (x as usize)];

        let r = ((color_u32 >> 16) & 0xFF) as u8;
        let g = ((color_u32 >> 8) & 0xFF) as u8;
        let b = (color_u32 & 0xFF) as u8;

        *pixel = Rgb([r, g, b]);
    }
    Ok(img_buf)
}

/// Presents a finished frame by writing it to an image file.
/// The format follows the file extension.
pub fn save_framebuffer<P: AsRef<Path>>(framebuffer: &FrameBuffer, path: P) -> Result<(), String> {
    let path = path.as_ref();
    let mut packed = vec![0u32; framebuffer.width * framebuffer.height];
    framebuffer.to_argb_buffer(&mut packed);

    let img = argb_to_image(&packed, framebuffer.width, framebuffer.height)?;
    img.save(path)
        .map_err(|e| format!("Failed to save image to {:?}: {}", path, e))?;

    info!("Saved frame to {:?}", path);
    Ok(())
}
