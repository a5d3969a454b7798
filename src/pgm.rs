//! Binary PGM (P5) image I/O.
//!
//! The reader produces a halo-padded [`Grid<f32>`] ready for the solver;
//! the writer clamps to `[0, 255]` with round-to-nearest and can emit a
//! structured key/value metadata block as `#` header comments. Only 8-bit
//! images (maxval <= 255) are supported.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

use crate::grid::Grid;

/// Largest grey value the writer emits and the reader accepts.
const PGM_MAX_VALUE: u32 = 255;

/// Errors from PGM decoding and encoding.
#[derive(Error, Debug)]
pub enum PgmError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("truncated pixel data: expected {expected} bytes, got {actual}")]
    TruncatedData { expected: usize, actual: usize },
}

/// Read the next byte, or `None` at end of stream.
fn read_byte<R: Read>(reader: &mut R) -> Result<Option<u8>, PgmError> {
    let mut buf = [0u8; 1];
    match reader.read(&mut buf)? {
        0 => Ok(None),
        _ => Ok(Some(buf[0])),
    }
}

/// Read one whitespace-delimited header token, skipping `#` comments that
/// run to the end of their line. Consumes the single delimiter that
/// terminates the token.
fn read_token<R: Read>(reader: &mut R) -> Result<String, PgmError> {
    let mut token = String::new();
    loop {
        match read_byte(reader)? {
            None => {
                if token.is_empty() {
                    return Err(PgmError::InvalidHeader(
                        "unexpected end of file in header".to_string(),
                    ));
                }
                return Ok(token);
            }
            Some(b'#') if token.is_empty() => {
                // Comment: discard to end of line.
                while let Some(byte) = read_byte(reader)? {
                    if byte == b'\n' {
                        break;
                    }
                }
            }
            Some(byte) if byte.is_ascii_whitespace() => {
                if !token.is_empty() {
                    return Ok(token);
                }
            }
            Some(byte) => token.push(byte as char),
        }
    }
}

fn parse_dimension(token: &str, name: &str) -> Result<usize, PgmError> {
    let value: usize = token
        .parse()
        .map_err(|_| PgmError::InvalidHeader(format!("{} is not a number: '{}'", name, token)))?;
    if value == 0 {
        return Err(PgmError::InvalidHeader(format!("{} must be at least 1", name)));
    }
    Ok(value)
}

/// Read a binary PGM (P5) image into a halo-padded grid.
///
/// Pixels are stored with the first grid axis running along image width
/// and the second along height, matching the row-by-row file order.
pub fn read_pgm<R: BufRead>(reader: &mut R) -> Result<Grid<f32>, PgmError> {
    let magic = read_token(reader)?;
    if magic != "P5" {
        return Err(PgmError::UnsupportedFormat(format!(
            "expected binary PGM magic 'P5', got '{}'",
            magic
        )));
    }

    let nx = parse_dimension(&read_token(reader)?, "width")?;
    let ny = parse_dimension(&read_token(reader)?, "height")?;
    let maxval: u32 = read_token(reader)?.parse().map_err(|_| {
        PgmError::InvalidHeader("maximum grey value is not a number".to_string())
    })?;
    if maxval == 0 || maxval > PGM_MAX_VALUE {
        return Err(PgmError::UnsupportedFormat(format!(
            "only 8-bit images supported, got maxval {}",
            maxval
        )));
    }

    let expected = nx * ny;
    let mut data = Vec::with_capacity(expected);
    reader.take(expected as u64).read_to_end(&mut data)?;
    if data.len() < expected {
        return Err(PgmError::TruncatedData {
            expected,
            actual: data.len(),
        });
    }

    let mut grid = Grid::new(nx, ny);
    for j in 1..=ny {
        for i in 1..=nx {
            grid[(i, j)] = data[(j - 1) * nx + (i - 1)] as f32;
        }
    }
    Ok(grid)
}

/// Read a binary PGM file from disk.
pub fn read_pgm_file<P: AsRef<Path>>(path: P) -> Result<Grid<f32>, PgmError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_pgm(&mut reader)
}

/// Quantise one sample to a byte: clamp to `[0, 255]` with
/// round-to-nearest.
fn quantise(value: f32) -> u8 {
    let rounded = value + 0.499999;
    if rounded < 0.0 {
        0
    } else if rounded > 255.0 {
        255
    } else {
        rounded as u8
    }
}

/// Write the grid interior as a binary PGM (P5) image.
///
/// Each `(key, value)` metadata pair becomes one `# key: value` header
/// comment line. Values outside `[0, 255]` are clamped during
/// quantisation; the grid itself is not modified.
pub fn write_pgm<W: Write>(
    writer: &mut W,
    grid: &Grid<f32>,
    metadata: &[(&str, String)],
) -> Result<(), PgmError> {
    let (nx, ny) = (grid.nx(), grid.ny());

    writeln!(writer, "P5")?;
    for (key, value) in metadata {
        writeln!(writer, "# {}: {}", key, value)?;
    }
    writeln!(writer, "{} {}", nx, ny)?;
    writeln!(writer, "{}", PGM_MAX_VALUE)?;

    let mut row = Vec::with_capacity(nx);
    for j in 1..=ny {
        row.clear();
        for i in 1..=nx {
            row.push(quantise(grid[(i, j)]));
        }
        writer.write_all(&row)?;
    }
    Ok(())
}

/// Write a binary PGM file to disk.
pub fn write_pgm_file<P: AsRef<Path>>(
    path: P,
    grid: &Grid<f32>,
    metadata: &[(&str, String)],
) -> Result<(), PgmError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_pgm(&mut writer, grid, metadata)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_minimal_image() {
        let bytes = b"P5\n2 2\n255\n\x00\x40\x80\xff";
        let grid = read_pgm(&mut Cursor::new(&bytes[..])).unwrap();
        assert_eq!(grid.nx(), 2);
        assert_eq!(grid.ny(), 2);
        // First file row is j = 1.
        assert_eq!(grid[(1, 1)], 0.0);
        assert_eq!(grid[(2, 1)], 64.0);
        assert_eq!(grid[(1, 2)], 128.0);
        assert_eq!(grid[(2, 2)], 255.0);
    }

    #[test]
    fn test_read_skips_header_comments() {
        let bytes = b"P5\n# made by hand\n# second comment\n1 2\n# one more\n255\n\x10\x20";
        let grid = read_pgm(&mut Cursor::new(&bytes[..])).unwrap();
        assert_eq!(grid[(1, 1)], 16.0);
        assert_eq!(grid[(1, 2)], 32.0);
    }

    #[test]
    fn test_rejects_ascii_pgm() {
        let bytes = b"P2\n2 2\n255\n0 1 2 3\n";
        let err = read_pgm(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, PgmError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_rejects_16_bit_maxval() {
        let bytes = b"P5\n2 2\n65535\n";
        let err = read_pgm(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, PgmError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_reports_truncated_data() {
        let bytes = b"P5\n2 2\n255\n\x00\x01";
        let err = read_pgm(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(
            err,
            PgmError::TruncatedData {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_write_clamps_and_rounds() {
        let mut grid = Grid::<f32>::new(4, 1);
        grid[(1, 1)] = -12.0;
        grid[(2, 1)] = 300.0;
        grid[(3, 1)] = 99.6;
        grid[(4, 1)] = 99.4;

        let mut out = Vec::new();
        write_pgm(&mut out, &grid, &[]).unwrap();

        let pixels = &out[out.len() - 4..];
        assert_eq!(pixels, &[0u8, 255, 100, 99]);
    }

    #[test]
    fn test_metadata_becomes_comment_lines() {
        let grid = Grid::<f32>::new(1, 1);
        let metadata = [("alpha", "5.0000".to_string()), ("iterations", "200".to_string())];

        let mut out = Vec::new();
        write_pgm(&mut out, &grid, &metadata).unwrap();

        let text = String::from_utf8_lossy(&out[..out.len() - 1]);
        assert!(text.contains("# alpha: 5.0000\n"));
        assert!(text.contains("# iterations: 200\n"));
    }

    #[test]
    fn test_write_read_roundtrip() {
        let mut grid = Grid::<f32>::new(3, 2);
        let mut value = 0.0f32;
        for j in 1..=2 {
            for i in 1..=3 {
                grid[(i, j)] = value;
                value += 40.0;
            }
        }

        let mut out = Vec::new();
        write_pgm(&mut out, &grid, &[("note", "roundtrip".to_string())]).unwrap();
        let back = read_pgm(&mut Cursor::new(out)).unwrap();

        for j in 1..=2 {
            for i in 1..=3 {
                assert_eq!(back[(i, j)], grid[(i, j)]);
            }
        }
    }
}
