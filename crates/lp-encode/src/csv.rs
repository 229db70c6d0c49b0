//! `x,y,r,g,b` rows of a colored trajectory, in pixel coordinates, without a
//! header row.

use std::io::{self, Write};

use csv::{ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use lp_core::{Point, Rgb};

use crate::colorize::ColoredPoint;
use crate::error::CodecError;

/// Writes one row per point.
pub fn write_csv<W: Write>(w: W, colored: &[ColoredPoint]) -> io::Result<()> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(w);
    for cp in colored {
        let Point { x, y } = cp.point;
        let Rgb { r, g, b } = cp.color;
        wtr.serialize((x, y, r, g, b))?;
    }
    wtr.flush()
}

pub fn csv_string(colored: &[ColoredPoint]) -> String {
    let mut buf = Vec::with_capacity(colored.len() * 20);
    write_csv(&mut buf, colored).expect("writing to Vec cannot fail");
    String::from_utf8(buf).expect("csv rows are ASCII")
}

/// Parses `x,y,r,g,b` rows. A leading header row (first field not starting
/// with a digit) is skipped. Rows with six fields are accepted too; the
/// leading field is a row index and is ignored.
pub fn parse_csv(text: &str) -> Result<Vec<ColoredPoint>, CodecError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut out = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line() as usize);
            CodecError::parse(line, "malformed csv record", &e.to_string())
        })?;
        if i == 0 && !record.get(0).is_some_and(|f| f.starts_with(|c: char| c.is_ascii_digit())) {
            continue;
        }
        out.push(parse_row(&record)?);
    }
    Ok(out)
}

fn parse_row(record: &StringRecord) -> Result<ColoredPoint, CodecError> {
    let line = record.position().map_or(0, |p| p.line() as usize);
    let text = record.iter().collect::<Vec<_>>().join(",");
    let fields: Vec<&str> = match record.len() {
        5 => record.iter().collect(),
        6 => record.iter().skip(1).collect(),
        _ => return Err(CodecError::parse(line, "expected 5 fields", &text)),
    };

    let coord = |s: &str| {
        s.parse::<u32>()
            .map_err(|_| CodecError::parse(line, "invalid coordinate", &text))
    };
    let channel = |s: &str| {
        s.parse::<u8>()
            .map_err(|_| CodecError::parse(line, "invalid color channel", &text))
    };
    Ok(ColoredPoint::new(
        Point::new(coord(fields[0])?, coord(fields[1])?),
        Rgb::new(channel(fields[2])?, channel(fields[3])?, channel(fields[4])?),
    ))
}
