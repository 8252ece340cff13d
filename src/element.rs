//! Two-node axial bar element in the plane.
//!
//! Element degrees of freedom are ordered `(u_i, v_i, u_j, v_j)` in the global
//! axes. With direction cosines `c`, `s` and axial stiffness `k = EA/L`:
//!
//! ```text
//! K_e = k * [ c²   cs  -c²  -cs]
//!           [ cs   s²  -cs  -s²]
//!           [-c²  -cs   c²   cs]
//!           [-cs  -s²   cs   s²]
//! ```
//!
//! See <https://en.wikipedia.org/wiki/Direct_stiffness_method>.

use nalgebra::{Matrix4, Vector4};

use crate::errors::AnalysisError;
use crate::geometry::Point;
use crate::model::Bar;

/// A bar together with the current positions of its endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    bar: &'a Bar,
    start: Point,
    end: Point,
}

impl<'a> Element<'a> {
    /// Pair `bar` with the positions of its start and end nodes.
    #[must_use]
    pub fn new(bar: &'a Bar, start: Point, end: Point) -> Self {
        Self { bar, start, end }
    }

    /// The underlying bar.
    #[must_use]
    pub fn bar(&self) -> &'a Bar {
        self.bar
    }

    /// Distance between the endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ZeroLengthBar`] when the endpoints coincide.
    pub fn length(&self) -> Result<f64, AnalysisError> {
        let length = self.start.distance_to(self.end);
        if length > 0.0 && length.is_finite() {
            Ok(length)
        } else {
            Err(AnalysisError::ZeroLengthBar(self.bar.id().to_string()))
        }
    }

    /// Direction cosines `(c, s)` of the axis from start to end.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ZeroLengthBar`] when the endpoints coincide.
    pub fn direction_cosines(&self) -> Result<(f64, f64), AnalysisError> {
        let length = self.length()?;
        Ok((
            (self.end.x - self.start.x) / length,
            (self.end.y - self.start.y) / length,
        ))
    }

    /// Axial stiffness `EA/L`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ZeroLengthBar`] when the endpoints coincide.
    pub fn axial_stiffness(&self) -> Result<f64, AnalysisError> {
        Ok(self.bar.elastic_modulus() * self.bar.area() / self.length()?)
    }

    /// Element stiffness matrix in global-aligned element DOF order.
    ///
    /// Every off-diagonal pair is built from the same products, so the result is
    /// exactly symmetric.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ZeroLengthBar`] when the endpoints coincide.
    ///
    /// # Examples
    /// ```
    /// use truss2d::{point, Bar, Element};
    ///
    /// let bar = Bar::new("1", "A", "B", 200.0e9, 0.01).unwrap();
    /// let element = Element::new(&bar, point(0.0, 0.0), point(2.0, 0.0));
    /// let k = element.local_stiffness().unwrap();
    /// assert_eq!(k[(0, 0)], 1.0e9);
    /// assert_eq!(k[(0, 2)], -1.0e9);
    /// assert_eq!(k[(1, 1)], 0.0);
    /// ```
    pub fn local_stiffness(&self) -> Result<Matrix4<f64>, AnalysisError> {
        let (c, s) = self.direction_cosines()?;
        let k = self.axial_stiffness()?;
        let cc = c * c;
        let cs = c * s;
        let ss = s * s;

        #[rustfmt::skip]
        let unit = Matrix4::new(
             cc,  cs, -cc, -cs,
             cs,  ss, -cs, -ss,
            -cc, -cs,  cc,  cs,
            -cs, -ss,  cs,  ss,
        );
        Ok(unit * k)
    }

    /// Axial force recovered from the element displacements `(u_i, v_i, u_j, v_j)`.
    ///
    /// Positive values are tension.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ZeroLengthBar`] when the endpoints coincide.
    pub fn axial_force(&self, displacements: &Vector4<f64>) -> Result<f64, AnalysisError> {
        let (c, s) = self.direction_cosines()?;
        let k = self.axial_stiffness()?;
        let elongation = (displacements[2] * c + displacements[3] * s)
            - (displacements[0] * c + displacements[1] * s);
        Ok(k * elongation)
    }

    /// Axial stress for an axial force `axial_force`.
    #[must_use]
    pub fn stress(&self, axial_force: f64) -> f64 {
        axial_force / self.bar.area()
    }

    /// Axial strain for a stress `stress` (Hooke's law).
    #[must_use]
    pub fn strain(&self, stress: f64) -> f64 {
        stress / self.bar.elastic_modulus()
    }
}
