//! Nodes, bars and support conditions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{BarPropertyError, SupportCodeError};
use crate::geometry::{Force, Point};

/// Elastic modulus assigned when a bar does not specify one (structural steel), in pascals.
pub const DEFAULT_ELASTIC_MODULUS: f64 = 210.0e9;

/// Cross-sectional area assigned when a bar does not specify one, in square metres.
pub const DEFAULT_AREA: f64 = 0.01;

/// Translational restraint applied at a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Support {
    /// No restraint.
    #[default]
    Free,
    /// Pinned: both translations restrained.
    Pinned,
    /// Roller that restrains only the X translation.
    RestrainX,
    /// Roller that restrains only the Y translation.
    RestrainY,
}

impl Support {
    /// Which of the (X, Y) degrees of freedom are fixed.
    #[must_use]
    pub const fn restraints(self) -> [bool; 2] {
        match self {
            Support::Free => [false, false],
            Support::Pinned => [true, true],
            Support::RestrainX => [true, false],
            Support::RestrainY => [false, true],
        }
    }

    /// Whether at least one degree of freedom is restrained.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Support::Free)
    }

    /// Canonical single-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Support::Free => "N",
            Support::Pinned => "P",
            Support::RestrainX => "X",
            Support::RestrainY => "Y",
        }
    }
}

impl FromStr for Support {
    type Err = SupportCodeError;

    /// Parse a support code, ignoring case and surrounding whitespace.
    ///
    /// # Examples
    /// ```
    /// use truss2d::Support;
    ///
    /// assert_eq!("p".parse::<Support>(), Ok(Support::Pinned));
    /// assert_eq!("XP".parse::<Support>(), Ok(Support::Pinned));
    /// assert!("Z".parse::<Support>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" | "FREE" => Ok(Support::Free),
            "P" | "PX" | "XP" | "PIN" | "PINNED" => Ok(Support::Pinned),
            "X" => Ok(Support::RestrainX),
            "Y" => Ok(Support::RestrainY),
            _ => Err(SupportCodeError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Support {
    type Error = SupportCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Support> for String {
    fn from(value: Support) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A pin joint of the truss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier, unique within a truss.
    pub id: String,
    /// Position in metres.
    pub position: Point,
    /// Applied load in newtons.
    pub load: Force,
    /// Restraint condition.
    pub support: Support,
}

impl Node {
    /// Create an unloaded, unsupported node.
    pub fn new(id: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
            load: Force::default(),
            support: Support::Free,
        }
    }

    /// Replace the applied load.
    #[must_use]
    pub fn with_load(mut self, load: Force) -> Self {
        self.load = load;
        self
    }

    /// Replace the support condition.
    #[must_use]
    pub fn with_support(mut self, support: Support) -> Self {
        self.support = support;
        self
    }
}

/// An axial member joining two nodes.
///
/// Endpoints are stored by node id; the bar always sees the current position of
/// its nodes inside the owning [`Truss`](crate::Truss).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bar {
    id: String,
    start: String,
    end: String,
    elastic_modulus: f64,
    area: f64,
}

impl Bar {
    /// Create a bar from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns [`BarPropertyError`] when `elastic_modulus` or `area` is not strictly
    /// positive, or when both endpoints name the same node.
    ///
    /// # Examples
    /// ```
    /// use truss2d::{Bar, BarPropertyError};
    ///
    /// let bar = Bar::new("AB", "A", "B", 210.0e9, 0.01).unwrap();
    /// assert_eq!(bar.start(), "A");
    ///
    /// let error = Bar::new("AB", "A", "B", 210.0e9, 0.0).unwrap_err();
    /// assert!(matches!(error, BarPropertyError::NonPositiveArea { .. }));
    /// ```
    pub fn new(
        id: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        elastic_modulus: f64,
        area: f64,
    ) -> Result<Self, BarPropertyError> {
        let id = id.into();
        let start = start.into();
        let end = end.into();
        // Written as negations so NaN is rejected as well.
        if !(elastic_modulus > 0.0) {
            return Err(BarPropertyError::NonPositiveElasticModulus {
                bar: id,
                elastic_modulus,
            });
        }
        if !(area > 0.0) {
            return Err(BarPropertyError::NonPositiveArea { bar: id, area });
        }
        if start == end {
            return Err(BarPropertyError::CoincidentEndpoints { bar: id, node: start });
        }
        Ok(Self {
            id,
            start,
            end,
            elastic_modulus,
            area,
        })
    }

    /// Create a bar with [`DEFAULT_ELASTIC_MODULUS`] and [`DEFAULT_AREA`].
    ///
    /// # Errors
    ///
    /// Returns [`BarPropertyError::CoincidentEndpoints`] when both ends name the same node.
    pub fn with_defaults(
        id: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Result<Self, BarPropertyError> {
        Self::new(id, start, end, DEFAULT_ELASTIC_MODULUS, DEFAULT_AREA)
    }

    /// Identifier of the bar.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identifier of the start node (i).
    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Identifier of the end node (j).
    #[must_use]
    pub fn end(&self) -> &str {
        &self.end
    }

    /// Elastic modulus in pascals.
    #[must_use]
    pub fn elastic_modulus(&self) -> f64 {
        self.elastic_modulus
    }

    /// Cross-sectional area in square metres.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.area
    }
}
