//! Text rendering of sample vectors
//!
//! Two independent formatters share one value renderer:
//!
//! - data lines: one value per line, `count` lines, indices `0..count`
//! - diagnostic line: `param0=V0 || param1=V1 || ... || paramN=VN || `,
//!   indices `0..=count`
//!
//! The bounds differ on purpose. Firmware in the field prints one field
//! past the requested count in the diagnostic line, and tools reading that
//! output expect it. In both formats, indices past the end of the slice
//! render as `0.000` instead of reading out of bounds.

use core::fmt::Write;

use heapless::String;
use loadlink_hal::SerialStream;

/// Line terminator after every data line and the diagnostic line
pub const LINE_END: &[u8] = b"\r\n";

/// Separator following every diagnostic field
pub const FIELD_SEPARATOR: &str = " || ";

/// Digits after the decimal point
pub const DECIMALS: usize = 3;

/// Fits "-4294967040.000"
pub const VALUE_CAPACITY: usize = 16;

/// Fits "param" + index + "=" + value + separator
pub const FIELD_CAPACITY: usize = 48;

/// Largest magnitude rendered as a number; beyond it the value is `ovf`
pub const OVERFLOW_LIMIT: f32 = 4_294_967_040.0;

/// Rendered sample value
pub type ValueText = String<VALUE_CAPACITY>;

/// Render one value with exactly [`DECIMALS`] fractional digits
///
/// Non-finite and out-of-range values use the short markers serial
/// monitors already understand: `nan`, `inf`, `ovf`.
pub fn render_value(value: f32) -> ValueText {
    let mut text = ValueText::new();
    if value.is_nan() {
        let _ = text.push_str("nan");
    } else if value.is_infinite() {
        let _ = text.push_str("inf");
    } else if !(-OVERFLOW_LIMIT..=OVERFLOW_LIMIT).contains(&value) {
        let _ = text.push_str("ovf");
    } else {
        // -0.0 prints as "0.000"
        let value = if value == 0.0 { 0.0 } else { value };
        let _ = write!(text, "{:.*}", DECIMALS, value);
    }
    text
}

/// Render one diagnostic field, separator included
pub fn render_field(index: usize, value: f32) -> String<FIELD_CAPACITY> {
    let mut field = String::new();
    let _ = write!(
        field,
        "param{}={}{}",
        index,
        render_value(value),
        FIELD_SEPARATOR
    );
    field
}

/// Write indices `0..count` as one value per line
///
/// Always writes exactly `count` lines so the host stays frame-aligned;
/// indices past the end of the slice render as `0.000`. Returns the
/// number of lines written.
pub fn write_data_lines<S: SerialStream>(
    stream: &mut S,
    data: &[f32],
    count: usize,
) -> Result<usize, S::Error> {
    for index in 0..count {
        let value = data.get(index).copied().unwrap_or(0.0);
        stream.write_bytes(render_value(value).as_bytes())?;
        stream.write_bytes(LINE_END)?;
    }
    Ok(count)
}

/// Write the diagnostic line for indices `0..=count`
///
/// Returns the number of fields written (`count + 1`).
pub fn write_diagnostic_line<S: SerialStream>(
    stream: &mut S,
    data: &[f32],
    count: usize,
) -> Result<usize, S::Error> {
    let mut fields = 0;
    for index in 0..=count {
        // Past the end: legacy padding field
        let value = data.get(index).copied().unwrap_or(0.0);
        stream.write_bytes(render_field(index, value).as_bytes())?;
        fields += 1;
    }
    stream.write_bytes(LINE_END)?;
    Ok(fields)
}
