//! OFF / COFF format support.
//!
//! Reads the Object File Format with triangle faces only. A face line may
//! carry a trailing RGB(A) color; integer components are read on the 0-255
//! scale, anything with a decimal point on the 0-1 scale. Either every face
//! has a color or none does. `#` starts a comment.
//!
//! Colored records are written as `COFF` with 0-255 components and alpha 255.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{Color, MeshRecord};

/// Load a mesh from an OFF or COFF file.
///
/// # Example
///
/// ```no_run
/// use meshqa::io::off;
///
/// let record = off::load("scan.off").unwrap();
/// println!("{} triangles", record.num_faces());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshRecord> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse(&text).map_err(|e| match e {
        ParseError::Message(message) => MeshError::load(path, message),
        ParseError::Mesh(err) => err,
    })
}

/// Save a mesh to an OFF file, or COFF if it carries face colors.
pub fn save<P: AsRef<Path>>(record: &MeshRecord, path: P) -> Result<()> {
    let path = path.as_ref();
    record.validate()?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(record, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a record in OFF / COFF form.
pub fn write<W: Write>(record: &MeshRecord, writer: &mut W) -> std::io::Result<()> {
    let header = if record.face_colors.is_some() { "COFF" } else { "OFF" };
    writeln!(writer, "{}", header)?;
    writeln!(writer, "{} {} 0", record.num_vertices(), record.num_faces())?;

    for p in &record.positions {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    for (fi, f) in record.faces.iter().enumerate() {
        match record.face_color(fi) {
            Some(c) => writeln!(
                writer,
                "3 {} {} {} {} {} {} 255",
                f[0],
                f[1],
                f[2],
                to_byte(c[0]),
                to_byte(c[1]),
                to_byte(c[2])
            )?,
            None => writeln!(writer, "3 {} {} {}", f[0], f[1], f[2])?,
        }
    }

    Ok(())
}

fn to_byte(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

enum ParseError {
    Message(String),
    Mesh(MeshError),
}

impl From<MeshError> for ParseError {
    fn from(err: MeshError) -> Self {
        ParseError::Mesh(err)
    }
}

type ParseResult<T> = std::result::Result<T, ParseError>;

fn fail<T>(line: usize, message: impl std::fmt::Display) -> ParseResult<T> {
    Err(ParseError::Message(format!("line {}: {}", line, message)))
}

/// Non-empty lines with comments stripped, paired with 1-based line numbers.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(i, line)| {
        let line = line.split('#').next().unwrap_or("");
        let tokens: Vec<&str> = line.split_whitespace().collect();
        (!tokens.is_empty()).then_some((i + 1, tokens))
    })
}

fn parse_token<T: std::str::FromStr>(line: usize, token: &str, what: &str) -> ParseResult<T> {
    token
        .parse()
        .or_else(|_| fail(line, format!("invalid {} '{}'", what, token)))
}

fn parse_color_component(line: usize, token: &str) -> ParseResult<f64> {
    if token.contains('.') || token.contains('e') || token.contains('E') {
        let value: f64 = parse_token(line, token, "color component")?;
        if !(0.0..=1.0).contains(&value) {
            return fail(line, format!("color component {} outside [0, 1]", token));
        }
        Ok(value)
    } else {
        let byte: u32 = parse_token(line, token, "color component")?;
        if byte > 255 {
            return fail(line, format!("color component {} outside [0, 255]", token));
        }
        Ok(byte as f64 / 255.0)
    }
}

/// Content lines with the number of the last line consumed, for messages.
struct Lines<It> {
    inner: It,
    last: usize,
}

impl<'a, It: Iterator<Item = (usize, Vec<&'a str>)>> Lines<It> {
    fn next_or(&mut self, missing: impl std::fmt::Display) -> ParseResult<(usize, Vec<&'a str>)> {
        match self.inner.next() {
            Some((line, tokens)) => {
                self.last = line;
                Ok((line, tokens))
            }
            None => fail(self.last, missing),
        }
    }
}

fn parse(text: &str) -> ParseResult<MeshRecord> {
    let mut lines = Lines {
        inner: content_lines(text),
        last: 1,
    };

    let (line, header) = lines.next_or("empty file")?;
    match header[0] {
        "OFF" | "COFF" => {}
        other => return fail(line, format!("invalid header '{}'", other)),
    }

    // Counts may share the header line.
    let (line, counts) = if header.len() > 1 {
        (line, header[1..].to_vec())
    } else {
        lines.next_or("missing element counts")?
    };
    if counts.len() < 2 {
        return fail(line, "expected vertex and face counts");
    }
    let num_vertices: usize = parse_token(line, counts[0], "vertex count")?;
    let num_faces: usize = parse_token(line, counts[1], "face count")?;

    let mut positions = Vec::with_capacity(num_vertices);
    for _ in 0..num_vertices {
        let (line, tokens) = lines.next_or(format!("expected {} vertices", num_vertices))?;
        if tokens.len() < 3 {
            return fail(line, "vertex needs three coordinates");
        }
        let x: f64 = parse_token(line, tokens[0], "coordinate")?;
        let y: f64 = parse_token(line, tokens[1], "coordinate")?;
        let z: f64 = parse_token(line, tokens[2], "coordinate")?;
        positions.push(Point3::new(x, y, z));
    }

    let mut faces = Vec::with_capacity(num_faces);
    let mut colors: Vec<Color> = Vec::new();
    for fi in 0..num_faces {
        let (line, tokens) = lines.next_or(format!("expected {} faces", num_faces))?;

        let arity: usize = parse_token(line, tokens[0], "face arity")?;
        if arity != 3 {
            return Err(MeshError::NonTriangularFace { face: fi, arity }.into());
        }
        if tokens.len() < 4 {
            return fail(line, "face needs three vertex indices");
        }
        let a: usize = parse_token(line, tokens[1], "vertex index")?;
        let b: usize = parse_token(line, tokens[2], "vertex index")?;
        let c: usize = parse_token(line, tokens[3], "vertex index")?;
        faces.push([a, b, c]);

        let extra = &tokens[4..];
        let has_color = extra.len() >= 3;
        if fi > 0 && has_color != (colors.len() == fi) {
            return fail(line, "face colors must be given for every face or none");
        }
        if has_color {
            colors.push([
                parse_color_component(line, extra[0])?,
                parse_color_component(line, extra[1])?,
                parse_color_component(line, extra[2])?,
            ]);
        }
    }

    let record = if colors.is_empty() {
        MeshRecord::new(positions, faces)
    } else {
        MeshRecord::with_colors(positions, faces, colors)
    };
    record.validate()?;

    log::debug!(
        "Parsed OFF mesh: {} vertices, {} faces, colors: {}",
        record.num_vertices(),
        record.num_faces(),
        record.face_colors.is_some()
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const QUAD_COFF: &str = "\
COFF
# two triangles
4 2 0
0 0 0
1 0 0
1 1 0
0 1 0
3 0 1 2 255 0 0 255
3 0 2 3 0 0 255 255
";

    fn parse_ok(text: &str) -> MeshRecord {
        match parse(text) {
            Ok(r) => r,
            Err(ParseError::Message(m)) => panic!("parse failed: {}", m),
            Err(ParseError::Mesh(e)) => panic!("parse failed: {}", e),
        }
    }

    #[test]
    fn test_parse_coff() {
        let record = parse_ok(QUAD_COFF);

        assert_eq!(record.num_vertices(), 4);
        assert_eq!(record.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(
            record.face_colors,
            Some(vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]])
        );
    }

    #[test]
    fn test_parse_plain_off() {
        let record = parse_ok("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n");
        assert_eq!(record.faces, vec![[0, 1, 2]]);
        assert!(record.face_colors.is_none());
    }

    #[test]
    fn test_counts_on_header_line() {
        let record = parse_ok("OFF 3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n");
        assert_eq!(record.num_faces(), 1);
    }

    #[test]
    fn test_non_triangle_rejected() {
        let text = "OFF\n4 1 0\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n4 0 1 2 3\n";
        match parse(text) {
            Err(ParseError::Mesh(MeshError::NonTriangularFace { face, arity })) => {
                assert_eq!(face, 0);
                assert_eq!(arity, 4);
            }
            _ => panic!("expected NonTriangularFace"),
        }
    }

    #[test]
    fn test_color_out_of_range_rejected() {
        let text = "COFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2 300 0 0 255\n";
        match parse(text) {
            Err(ParseError::Message(m)) => {
                assert!(m.starts_with("line 6"));
                assert!(m.contains("300"));
            }
            _ => panic!("expected a parse message"),
        }

        let text = "COFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2 0.5 1.5 0.0\n";
        assert!(matches!(parse(text), Err(ParseError::Message(_))));
    }

    #[test]
    fn test_float_colors() {
        let text = "COFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2 0.5 1.0 0.0\n";
        let record = parse_ok(text);
        assert_eq!(record.face_colors, Some(vec![[0.5, 1.0, 0.0]]));
    }

    #[test]
    fn test_bad_header_rejected() {
        assert!(matches!(parse("PLY\n"), Err(ParseError::Message(_))));
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let text = "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 5\n";
        assert!(matches!(
            parse(text),
            Err(ParseError::Mesh(MeshError::InvalidVertexIndex { .. }))
        ));
    }

    #[test]
    fn test_truncated_file_reports_line() {
        let text = "OFF\n3 1 0\n0 0 0\n1 0 0\n";
        match parse(text) {
            Err(ParseError::Message(m)) => assert!(m.starts_with("line 4")),
            _ => panic!("expected a parse message"),
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quad.off");

        let record = parse_ok(QUAD_COFF);
        save(&record, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, record);
    }

    #[test]
    fn test_load_error_carries_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.off");
        std::fs::write(&path, "OFF\n1 0 0\n0 0\n").unwrap();

        match load(&path) {
            Err(MeshError::LoadError { path: p, message }) => {
                assert_eq!(p, path);
                assert!(message.contains("three coordinates"));
            }
            other => panic!("expected LoadError, got {:?}", other),
        }
    }
}
