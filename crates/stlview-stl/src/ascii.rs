//! ASCII STL decoder.
//!
//! Line-oriented: each non-blank line is trimmed and classified by its
//! first token. Only `facet`, `vertex`, `endfacet` and `endsolid` carry
//! meaning; `solid`, `outer loop`, `endloop` and anything else are skipped.
//!
//! A facet is committed at `endfacet`, and only with exactly three
//! vertices. Anything else fails the whole parse.

use std::io::Read;

use stlview_mesh::{Mesh, MeshBuilder, Triangle, Vertex};
use tracing::debug;

use crate::error::{Location, Result, StlError};
use crate::source::ByteReader;
use crate::ParseOptions;

/// A facet between its `facet normal` line and its `endfacet`.
struct OpenFacet {
    normal: Vertex,
    corners: Triangle,
    count: usize,
    line: usize,
}

/// Decode an ASCII STL stream into a [`Mesh`].
pub fn parse_ascii<R: Read>(reader: &mut ByteReader<R>, options: &ParseOptions) -> Result<Mesh> {
    let mut builder = MeshBuilder::new();
    let mut open: Option<OpenFacet> = None;
    let mut line_no = 0;
    let mut ended = false;

    while let Some(line) = reader.read_line()? {
        line_no += 1;
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "facet" => {
                if let Some(prev) = &open {
                    return Err(StlError::malformed(
                        line_no,
                        format!("facet opened before the facet at line {} ended", prev.line),
                    ));
                }
                if tokens.next() != Some("normal") {
                    return Err(StlError::malformed(
                        line_no,
                        "expected 'facet normal <nx> <ny> <nz>'",
                    ));
                }
                let normal = parse_triple(&mut tokens, line_no, "facet normal")?;
                open = Some(OpenFacet {
                    normal,
                    corners: [[0.0; 3]; 3],
                    count: 0,
                    line: line_no,
                });
            }
            "vertex" => {
                let v = parse_triple(&mut tokens, line_no, "vertex")?;
                let facet = open
                    .as_mut()
                    .ok_or_else(|| StlError::malformed(line_no, "vertex outside of a facet"))?;
                if facet.count < 3 {
                    facet.corners[facet.count] = v;
                }
                facet.count += 1;
            }
            "endfacet" => {
                let facet = open
                    .take()
                    .ok_or_else(|| StlError::malformed(line_no, "endfacet without facet"))?;
                if facet.count != 3 {
                    return Err(StlError::malformed(
                        line_no,
                        format!(
                            "facet opened at line {} has {} vertices, expected 3",
                            facet.line, facet.count
                        ),
                    ));
                }
                builder.push_facet(facet.normal, facet.corners);
            }
            "endsolid" => {
                ended = true;
                break;
            }
            _ => {}
        }
    }

    if let Some(facet) = open {
        if ended {
            return Err(StlError::malformed(
                line_no,
                format!("endsolid inside the facet opened at line {}", facet.line),
            ));
        }
        return Err(StlError::truncated(
            Location::Line(line_no),
            format!("input ended inside the facet opened at line {}", facet.line),
        ));
    }

    debug!(
        triangles = builder.triangle_count(),
        lines = line_no,
        "parsed ASCII STL"
    );
    if ended && reader.has_buffered() {
        debug!("ignoring content after the first endsolid");
    }

    if options.recompute_ascii_normals {
        builder.recompute_missing_normals();
    }
    builder.build().ok_or(StlError::EmptyModel)
}

/// Parse the next three tokens as finite floats.
fn parse_triple<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    what: &str,
) -> Result<Vertex> {
    let mut out = [0.0f32; 3];
    for (i, slot) in out.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| {
            StlError::malformed(line, format!("'{what}' needs 3 coordinates, found {i}"))
        })?;
        *slot = token
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| StlError::malformed(line, format!("invalid number '{token}'")))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::io;

    /// Hands out `data` once, then fails every later read.
    struct FailAfter<'a> {
        data: &'a [u8],
    }

    impl Read for FailAfter<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "stalled"));
            }
            let n = out.len().min(self.data.len());
            out[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn parse(text: &str) -> Result<Mesh> {
        parse_ascii(&mut ByteReader::new(text.as_bytes()), &ParseOptions::default())
    }

    const TRIANGLE: &str = "solid tri
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid tri
";

    #[test]
    fn test_single_facet() {
        let mesh = parse(TRIANGLE).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.vertices(), &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(mesh.normals(), &[[0.0, 0.0, 1.0]; 3]);
        assert_eq!(mesh.bounds().max, [1.0, 1.0, 0.0]);
        assert_abs_diff_eq!(mesh.center_of_mass()[0], 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_crlf_tabs_and_exponents() {
        let text = "solid t\r\n\tfacet   normal 0.0E0 -1e+0 0\r\n\touter loop\r\n\
                    \t\tvertex 1.5e1 0 0\r\n\t\tvertex 0 2.5E-1 0\r\n\t\tvertex 0 0 -3\r\n\
                    \tendloop\r\n\tendfacet\r\nendsolid t\r\n";
        let mesh = parse(text).unwrap();
        assert_eq!(mesh.vertices()[0], [15.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices()[1], [0.0, 0.25, 0.0]);
        assert_eq!(mesh.normals()[2], [0.0, -1.0, 0.0]);
        assert_eq!(mesh.bounds().min, [0.0, 0.0, -3.0]);
    }

    #[test]
    fn test_normals_track_vertices_across_facets() {
        let text = "solid s
facet normal 1 0 0
outer loop
vertex 0 0 0
vertex 0 1 0
vertex 0 0 1
endloop
endfacet
facet normal 0 1 0
outer loop
vertex 0 0 0
vertex 0 0 1
vertex 1 0 0
endloop
endfacet
endsolid s
";
        let mesh = parse(text).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(&mesh.normals()[..3], &[[1.0, 0.0, 0.0]; 3]);
        assert_eq!(&mesh.normals()[3..], &[[0.0, 1.0, 0.0]; 3]);
    }

    #[test]
    fn test_no_facets_is_empty_model() {
        let err = parse("solid x\nendsolid").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyModel);
        let err = parse("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyModel);
    }

    #[test]
    fn test_two_vertex_facet_is_malformed() {
        let text = "solid x
facet normal 0 0 1
outer loop
vertex 0 0 0
vertex 1 0 0
endloop
endfacet
endsolid x
";
        let err = parse(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        assert!(err.to_string().contains("line 7"));
        assert!(err.to_string().contains("2 vertices"));
    }

    #[test]
    fn test_four_vertex_facet_is_malformed() {
        let text = TRIANGLE.replace("vertex 0 1 0", "vertex 0 1 0\nvertex 1 1 0");
        let err = parse(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
    }

    #[test]
    fn test_bad_number_is_malformed() {
        let text = TRIANGLE.replace("vertex 1 0 0", "vertex 1 zero 0");
        let err = parse(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        assert!(err.to_string().contains("line 5"));
        assert!(err.to_string().contains("'zero'"));
    }

    #[test]
    fn test_partial_triple_is_malformed() {
        let text = TRIANGLE.replace("vertex 1 0 0", "vertex 1 0");
        let err = parse(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);

        let text = TRIANGLE.replace("facet normal 0 0 1", "facet normal 0 0");
        let err = parse(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
    }

    #[test]
    fn test_non_finite_is_malformed() {
        let text = TRIANGLE.replace("vertex 1 0 0", "vertex NaN 0 0");
        assert_eq!(parse(&text).unwrap_err().kind(), ErrorKind::MalformedGeometry);
    }

    #[test]
    fn test_vertex_outside_facet_is_malformed() {
        let err = parse("solid x\nvertex 0 0 0\nendsolid x\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
    }

    #[test]
    fn test_unterminated_facet_is_truncated() {
        let text = "solid x\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\n";
        let err = parse(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
        assert!(err.to_string().contains("line 5"));
    }

    #[test]
    fn test_stops_at_first_endsolid() {
        let text = format!("{TRIANGLE}solid second\nfacet normal 0 0 1\nvertex 9 9 9\n");
        let mesh = parse(&text).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.bounds().max, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_missing_endsolid_is_accepted() {
        let text = TRIANGLE.replace("endsolid tri\n", "");
        assert_eq!(parse(&text).unwrap().vertex_count(), 3);
    }

    #[test]
    fn test_zero_normals_kept_by_default() {
        let text = TRIANGLE.replace("facet normal 0 0 1", "facet normal 0 0 0");
        let mesh = parse(&text).unwrap();
        assert_eq!(mesh.normals()[0], [0.0; 3]);

        let options = ParseOptions {
            recompute_ascii_normals: true,
            ..Default::default()
        };
        let mesh = parse_ascii(&mut ByteReader::new(text.as_bytes()), &options).unwrap();
        assert_relative_eq!(mesh.normals()[0][2], 1.0);
    }

    #[test]
    fn test_nested_facet_is_malformed() {
        let text = "solid x\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nfacet normal 0 0 1\n";
        let err = parse(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        assert!(err.to_string().contains("line 5"));
        assert!(err.to_string().contains("facet at line 2"));
    }

    #[test]
    fn test_endfacet_without_facet_is_malformed() {
        let err = parse("solid x\nendfacet\nendsolid x\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_endsolid_inside_facet_is_malformed() {
        let text = "solid x\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nendsolid x\n";
        let err = parse(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        assert!(err.to_string().contains("line 5"));
        assert!(err.to_string().contains("opened at line 2"));
    }

    #[test]
    fn test_no_read_past_endsolid() {
        let mut reader = ByteReader::new(FailAfter {
            data: TRIANGLE.as_bytes(),
        });
        let mesh = parse_ascii(&mut reader, &ParseOptions::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
    }
}
