//! QR Code (Model 2) encoder.
//!
//! Text is encoded in the 8-bit byte mode into a symbol of version 1 to 40
//! at one of the four error correction levels. The result is an abstract
//! matrix of dark and light modules, drawing it is left to the caller.
//!
//! # Example
//!
//! ```rust
//! use qrmatrix::{EcLevel, QrCodeModel};
//!
//! let mut model = QrCodeModel::new(None, EcLevel::M);
//! model.add_data("https://example.com");
//! model.make().unwrap();
//! for row in 0..model.module_count() {
//!     for col in 0..model.module_count() {
//!         let _dark = model.is_dark(row, col).unwrap();
//!     }
//! }
//! ```
//!
//! For a quick look [encode] returns a [Bitmap] which can print itself:
//!
//! ```rust
//! # use qrmatrix::EcLevel;
//! let bitmap = qrmatrix::encode("Hello, World!", EcLevel::L).unwrap();
//! print!("{}", bitmap.unicode());
//! ```
//!
//! The mask search evaluates the eight masks on the rayon thread pool unless
//! the default feature `parallel` is disabled. Diagnostics are emitted with
//! `tracing`, no subscriber is installed.
pub mod bits;
pub mod data;
mod error;
pub mod errorcode;
mod model;
pub mod placement;
mod version;

#[cfg(test)]
mod tests;

pub use error::QrError;
pub use model::{best_mask, build_codewords, EncodeOptions, QrCodeModel};
pub use placement::mask::MaskPattern;
pub use placement::Bitmap;
pub use version::{select_version, EcLevel, Version};

/// Encode the text as a QR Code with automatic version selection.
pub fn encode(text: &str, ec_level: EcLevel) -> Result<Bitmap, QrError> {
    encode_with(text, &EncodeOptions::new(ec_level))
}

/// Encode the text as a QR Code with the given options.
pub fn encode_with(text: &str, options: &EncodeOptions) -> Result<Bitmap, QrError> {
    let mut model = QrCodeModel::with_options(options.clone());
    model.add_data(text);
    model.make_bitmap()
}
