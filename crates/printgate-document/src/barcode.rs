// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Barcode bitmaps for label templates.
//
// Symbol encoding is delegated to `barcoders`; this module only scales the
// module sequence into a greyscale bitmap of the requested size.

use barcoders::sym::code128::Code128;
use image::{GrayImage, Luma};
use tracing::{debug, instrument};

use printgate_core::error::{PrintgateError, Result};

/// Code 128 character set selectors understood by `barcoders`.
const CHARSET_SELECTORS: [char; 3] = ['À', 'Ɓ', 'Ć'];

/// Character set B covers printable ASCII, the common case for labels.
const CHARSET_B: char = 'Ɓ';

const BAR: Luma<u8> = Luma([0]);
const SPACE: Luma<u8> = Luma([255]);

/// Capability: encode a string as a barcode bitmap.
pub trait BarcodeEncoder: Send + Sync {
    fn encode(&self, data: &str, width: u32, height: u32) -> Result<GrayImage>;
}

/// Code 128 encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct Code128Encoder;

impl BarcodeEncoder for Code128Encoder {
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    fn encode(&self, data: &str, width: u32, height: u32) -> Result<GrayImage> {
        let payload = if data.starts_with(CHARSET_SELECTORS) {
            data.to_owned()
        } else {
            format!("{CHARSET_B}{data}")
        };
        let symbol = Code128::new(payload).map_err(|e| PrintgateError::Barcode(e.to_string()))?;
        let modules = symbol.encode();
        debug!(modules = modules.len(), "barcode encoded");
        scale_modules(&modules, width, height)
    }
}

/// Stretch a 1D module sequence (1 = bar, 0 = space) to `width` x `height`.
///
/// Each module becomes an integer number of pixel columns; the leftover
/// width is split evenly as white padding on both sides.
pub fn scale_modules(modules: &[u8], width: u32, height: u32) -> Result<GrayImage> {
    let count = modules.len() as u32;
    if count == 0 || height == 0 {
        return Err(PrintgateError::Barcode("empty barcode".into()));
    }
    let factor = width / count;
    if factor == 0 {
        return Err(PrintgateError::Barcode(format!(
            "can not scale barcode to an image smaller than {count}x1"
        )));
    }
    let offset = (width - count * factor) / 2;

    Ok(GrayImage::from_fn(width, height, |x, _| {
        if x < offset {
            return SPACE;
        }
        match modules.get(((x - offset) / factor) as usize) {
            Some(1) => BAR,
            _ => SPACE,
        }
    }))
}
