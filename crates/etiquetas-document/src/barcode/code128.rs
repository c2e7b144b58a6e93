// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Code 128 encoder backed by the `barcoders` crate.

use barcoders::sym::code128::Code128;
use etiquetas_core::{BarcodeSettings, EncodingError};
use tracing::{debug, instrument};

use super::raster::Rasterizer;
use super::{BarcodeEncoder, BarcodeRaster};

/// Code 128 character set B selector understood by `barcoders`.
///
/// Set B covers every printable ASCII character, which is what label
/// codes and lot numbers contain.
const CHARSET_B: char = '\u{0181}';

/// Encodes arbitrary printable ASCII as Code 128 (set B).
#[derive(Debug, Clone, Default)]
pub struct Code128Encoder {
    settings: BarcodeSettings,
}

impl Code128Encoder {
    pub fn new(settings: BarcodeSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BarcodeSettings {
        &self.settings
    }

    /// Encode `text` into its module sequence (1 = bar, 0 = space).
    pub fn modules(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        if text.is_empty() {
            return Err(EncodingError::Empty);
        }
        if let Some((position, ch)) = text.chars().enumerate().find(|(_, ch)| !is_set_b(*ch)) {
            return Err(EncodingError::UnsupportedCharacter { ch, position });
        }

        let symbol = Code128::new(&format!("{CHARSET_B}{text}"))
            .map_err(|err| EncodingError::Symbology(format!("{err:?}")))?;
        Ok(symbol.encode())
    }
}

impl BarcodeEncoder for Code128Encoder {
    #[instrument(skip(self), fields(text_len = text.len()))]
    fn encode(&self, text: &str, pixel_height: u32) -> Result<BarcodeRaster, EncodingError> {
        let modules = self.modules(text)?;
        let image = Rasterizer::new(&self.settings)
            .bars(&modules, pixel_height)
            .caption(text)
            .finish()?;

        debug!(
            modules = modules.len(),
            width = image.width(),
            height = image.height(),
            "Code 128 symbol encoded"
        );
        Ok(BarcodeRaster::new(text, pixel_height, image))
    }
}

/// Printable ASCII, the Code 128 set B repertoire.
fn is_set_b(ch: char) -> bool {
    (' '..='~').contains(&ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> Code128Encoder {
        Code128Encoder::default()
    }

    #[test]
    fn encodes_digits_and_letters() {
        let raster = encoder().encode("789", 40).expect("encode");
        assert_eq!(raster.text(), "789");
        assert_eq!(raster.pixel_height(), 40);
        assert!(raster.width() > 0);
        // Bars start after the quiet zone.
        let settings = encoder().settings().clone();
        let first_bar = settings.quiet_zone_modules * settings.module_px;
        assert_eq!(raster.image().get_pixel(first_bar, 0).0[0], 0);
    }

    #[test]
    fn encoding_is_deterministic() {
        let first = encoder().encode("L2406A-x", 60).expect("encode");
        let second = encoder().encode("L2406A-x", 60).expect("encode");
        assert_eq!(first, second);
    }

    #[test]
    fn different_text_gives_different_modules() {
        let enc = encoder();
        assert_ne!(enc.modules("123").expect("a"), enc.modules("124").expect("b"));
    }

    #[test]
    fn symbol_has_start_and_stop_patterns() {
        let modules = encoder().modules("A").expect("encode");
        // Start B, data and checksum are 11 modules each; stop is 13.
        assert!(modules.len() >= 11 * 3 + 13);
        assert_eq!((modules.len() - 13) % 11, 0);
        assert_eq!(&modules[..3], &[1, 1, 0]);
        assert_eq!(&modules[modules.len() - 2..], &[1, 1]);
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(encoder().encode("", 40), Err(EncodingError::Empty));
    }

    #[test]
    fn accented_character_is_rejected_with_position() {
        assert_eq!(
            encoder().encode("LOTÉ1", 40),
            Err(EncodingError::UnsupportedCharacter { ch: 'É', position: 3 })
        );
    }

    #[test]
    fn control_character_is_rejected() {
        assert!(matches!(
            encoder().encode("A\tB", 40),
            Err(EncodingError::UnsupportedCharacter { ch: '\t', position: 1 })
        ));
    }
}
