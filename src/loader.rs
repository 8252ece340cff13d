//! Readers that turn input files into a validated [`Truss`].
//!
//! Two formats are understood:
//!
//! * a `;`-separated text format with an adjacency matrix, and
//! * a JSON payload listing nodes and bars explicitly.
//!
//! The text format is laid out as follows. Blank lines are ignored and every
//! field is trimmed.
//!
//! ```text
//! n; m            header: node count (m is informational)
//! id; x; y        n lines of node coordinates
//! a_0; ...; a_n   n rows of the 0/1 adjacency matrix
//! fx; fy          n lines of nodal loads
//! code            n lines of support codes (N, P, X or Y)
//! ```
//!
//! Bars are numbered from 1 in row-major order over the upper triangle of the
//! adjacency matrix.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::MaterialDefaults;
use crate::errors::{InputError, TrussEditError};
use crate::geometry::{Force, Point};
use crate::model::{Bar, Node, Support};
use crate::truss::Truss;

/// File formats accepted by [`load_path`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    /// `;`-separated text with an adjacency matrix.
    Text,
    /// JSON [`TrussPayload`].
    Json,
}

impl InputFormat {
    /// Guess the format from a file extension. Anything but `.json` is text.
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Text,
        }
    }
}

/// Identifier that may be written as a JSON string or integer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Integer identifier.
    Number(u64),
    /// Text identifier.
    Text(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(value) => write!(f, "{value}"),
            Identifier::Text(value) => f.write_str(value),
        }
    }
}

/// Node entry of a [`TrussPayload`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodePayload {
    /// Node identifier.
    pub id: Identifier,
    /// X coordinate in metres.
    pub x: f64,
    /// Y coordinate in metres.
    pub y: f64,
    /// Applied load `[fx, fy]` in newtons.
    #[serde(default)]
    pub load: [f64; 2],
    /// Support code. Required so that a forgotten support is not read as free.
    pub support: Support,
}

/// Bar entry of a [`TrussPayload`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarPayload {
    /// Bar identifier.
    pub id: Identifier,
    /// Start node identifier.
    pub start: Identifier,
    /// End node identifier.
    pub end: Identifier,
    /// Elastic modulus in pascals; [`MaterialDefaults`] when absent.
    #[serde(default)]
    pub elastic_modulus: Option<f64>,
    /// Cross-sectional area in square metres; [`MaterialDefaults`] when absent.
    #[serde(default)]
    pub area: Option<f64>,
}

/// JSON description of a truss, as received from an API client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrussPayload {
    /// Nodes in DOF order.
    pub nodes: Vec<NodePayload>,
    /// Bars.
    pub bars: Vec<BarPayload>,
}

impl TrussPayload {
    /// Validate the payload and build a [`Truss`].
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Empty`] when there are no nodes or no bars and
    /// [`InputError::Truss`] when the entities are inconsistent.
    pub fn into_truss(self, defaults: &MaterialDefaults) -> Result<Truss, InputError> {
        if self.nodes.is_empty() {
            return Err(InputError::Empty("nodes"));
        }
        if self.bars.is_empty() {
            return Err(InputError::Empty("bars"));
        }
        let mut truss = Truss::new();
        for node in self.nodes {
            truss.add_node(
                Node::new(node.id.to_string(), Point::new(node.x, node.y))
                    .with_load(Force::from(node.load))
                    .with_support(node.support),
            )?;
        }
        for bar in self.bars {
            let bar = Bar::new(
                bar.id.to_string(),
                bar.start.to_string(),
                bar.end.to_string(),
                bar.elastic_modulus.unwrap_or(defaults.elastic_modulus),
                bar.area.unwrap_or(defaults.area),
            )
            .map_err(TrussEditError::from)?;
            truss.add_bar(bar)?;
        }
        Ok(truss)
    }
}

/// Parse a JSON payload into a [`Truss`].
///
/// # Errors
///
/// Returns [`InputError::Json`] when the payload is malformed and the errors of
/// [`TrussPayload::into_truss`] otherwise.
///
/// # Examples
/// ```
/// use truss2d::{loader, MaterialDefaults};
///
/// let json = r#"{
///     "nodes": [
///         { "id": "A", "x": 0.0, "y": 0.0, "support": "P" },
///         { "id": "B", "x": 1.0, "y": 0.0, "load": [100.0, 0.0], "support": "Y" }
///     ],
///     "bars": [{ "id": 1, "start": "A", "end": "B" }]
/// }"#;
/// let truss = loader::parse_json(json, &MaterialDefaults::default()).unwrap();
/// assert_eq!(truss.bar_count(), 1);
/// assert_eq!(truss.bar("1").unwrap().area(), 0.01);
/// ```
pub fn parse_json(text: &str, defaults: &MaterialDefaults) -> Result<Truss, InputError> {
    let payload: TrussPayload = serde_json::from_str(text)?;
    payload.into_truss(defaults)
}

/// Parse the `;`-separated text format into a [`Truss`].
///
/// # Errors
///
/// Returns [`InputError::Parse`] or [`InputError::InvalidSupport`] with the
/// offending line number, and [`InputError::Truss`] when the parsed entities are
/// inconsistent (for example a repeated node id).
pub fn parse_text(text: &str, defaults: &MaterialDefaults) -> Result<Truss, InputError> {
    let mut lines = Lines::new(text);

    let (line, header) = lines.next("header `n; m`")?;
    let header = fields(header);
    if header.len() < 2 {
        return Err(parse_error(line, "header must be `n; m`"));
    }
    let node_count: usize = header[0]
        .parse()
        .map_err(|_| parse_error(line, format!("invalid node count {:?}", header[0])))?;
    if node_count == 0 {
        return Err(InputError::Empty("nodes"));
    }

    let mut nodes = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        let (line, text) = lines.next("node `id; x; y`")?;
        let parts = fields(text);
        if parts.len() < 3 {
            return Err(parse_error(line, format!("invalid node line {text:?}")));
        }
        let x = parse_number(parts[1], line)?;
        let y = parse_number(parts[2], line)?;
        nodes.push(Node::new(parts[0], Point::new(x, y)));
    }

    let mut adjacency = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        let (line, text) = lines.next("adjacency matrix row")?;
        let row = fields(text)
            .into_iter()
            .map(|field| match field {
                "0" => Ok(false),
                "1" => Ok(true),
                other => Err(parse_error(
                    line,
                    format!("adjacency entries must be 0 or 1, found {other:?}"),
                )),
            })
            .collect::<Result<Vec<bool>, InputError>>()?;
        if row.len() != node_count {
            return Err(parse_error(
                line,
                format!(
                    "adjacency row has {} columns (expected {node_count})",
                    row.len()
                ),
            ));
        }
        adjacency.push(row);
    }

    for node in &mut nodes {
        let (line, text) = lines.next("load `fx; fy`")?;
        let parts = fields(text);
        if parts.len() < 2 {
            return Err(parse_error(line, format!("invalid load line {text:?}")));
        }
        node.load = Force::new(parse_number(parts[0], line)?, parse_number(parts[1], line)?);
    }

    for node in &mut nodes {
        let (line, text) = lines.next("support code")?;
        node.support = text
            .parse()
            .map_err(|source| InputError::InvalidSupport { line, source })?;
    }

    let mut truss = Truss::new();
    let ids: Vec<String> = nodes.iter().map(|node| node.id.clone()).collect();
    for node in nodes {
        truss.add_node(node)?;
    }

    for i in 0..node_count {
        for j in (i + 1)..node_count {
            if adjacency[i][j] != adjacency[j][i] {
                warn!(
                    row = i + 1,
                    column = j + 1,
                    "adjacency matrix is not symmetric; using the upper triangle"
                );
            }
            if adjacency[i][j] {
                let bar = Bar::new(
                    (truss.bar_count() + 1).to_string(),
                    ids[i].as_str(),
                    ids[j].as_str(),
                    defaults.elastic_modulus,
                    defaults.area,
                )
                .map_err(TrussEditError::from)?;
                truss.add_bar(bar)?;
            }
        }
    }
    if truss.bar_count() == 0 {
        return Err(InputError::Empty("bars"));
    }
    debug!(
        nodes = truss.node_count(),
        bars = truss.bar_count(),
        "parsed text input"
    );
    Ok(truss)
}

/// Read a truss from a file in the given format.
///
/// # Errors
///
/// Returns [`InputError::Io`] when the file cannot be read and the errors of
/// [`parse_text`] or [`parse_json`] otherwise. Files that are not valid UTF-8
/// are read as Latin-1.
pub fn load_path(
    path: impl AsRef<Path>,
    format: InputFormat,
    defaults: &MaterialDefaults,
) -> Result<Truss, InputError> {
    let text = decode(std::fs::read(path)?);
    match format {
        InputFormat::Text => parse_text(&text, defaults),
        InputFormat::Json => parse_json(&text, defaults),
    }
}

/// Non-blank lines with their one-based line numbers.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    last_line: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.lines().enumerate(),
            last_line: 0,
        }
    }

    /// Next non-blank, trimmed line or an error naming what was expected.
    fn next(&mut self, expected: &str) -> Result<(usize, &'a str), InputError> {
        for (idx, line) in self.inner.by_ref() {
            self.last_line = idx + 1;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok((idx + 1, trimmed));
            }
        }
        Err(parse_error(
            self.last_line + 1,
            format!("unexpected end of input, expected {expected}"),
        ))
    }
}

/// Split a line on `;`, tolerating one trailing separator.
fn fields(line: &str) -> Vec<&str> {
    line.strip_suffix(';')
        .unwrap_or(line)
        .split(';')
        .map(str::trim)
        .collect()
}

/// Parse a finite number. `NaN` and `inf` are rejected here rather than left to the solver.
fn parse_number(field: &str, line: usize) -> Result<f64, InputError> {
    field
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| parse_error(line, format!("invalid number {field:?}")))
}

/// Decode file contents as UTF-8, falling back to Latin-1 for legacy files.
fn decode(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|error| {
        debug!("input is not valid UTF-8; decoding as Latin-1");
        error.into_bytes().into_iter().map(char::from).collect()
    })
}

fn parse_error(line: usize, message: impl Into<String>) -> InputError {
    InputError::Parse {
        line,
        message: message.into(),
    }
}
