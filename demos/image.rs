use image::{GrayImage, Luma};
use qrmatrix::EcLevel;

/// Generate image which only contains a QR Code
fn main() {
    // Define width and height in pixels of one dark module in the image.
    // Be careful if your space constraints result in non integer sizes for
    // a module. In this case you might want to generate a smaller image
    // and then interpolate (rescale).
    const N: usize = 5;
    // The quiet zone around a QR Code is four modules wide.
    const QUIET: usize = 4;

    // Encode "Hello, World!" into the smallest version it fits into
    let bitmap = qrmatrix::encode("Hello, World!", EcLevel::M).unwrap();

    let width = ((bitmap.width() + 2 * QUIET) * N) as u32;
    let height = ((bitmap.height() + 2 * QUIET) * N) as u32;
    let mut image = GrayImage::from_pixel(width, height, Luma([255]));
    for (x, y) in bitmap.pixels() {
        // Write the dark module at x, y using NxN black pixels
        for i in 0..N {
            for j in 0..N {
                let x_i = (x + QUIET) * N + j;
                let y_j = (y + QUIET) * N + i;
                image.put_pixel(x_i as u32, y_j as u32, Luma([0]));
            }
        }
    }

    image.save("qr_code.png").unwrap();
}
