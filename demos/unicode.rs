use qrmatrix::{EcLevel, EncodeOptions, QrCodeModel};

/// Print a QR Code for the first argument to the terminal
fn main() {
    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".into());

    let mut model = QrCodeModel::with_options(EncodeOptions::new(EcLevel::M));
    model.add_data(&text);
    if let Err(err) = model.make() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
    if let (Some(version), Some(mask)) = (model.version(), model.mask_pattern()) {
        println!("version {}, mask {}", version, mask.index());
    }
    print!("{}", model.unicode().unwrap_or_default());
}
