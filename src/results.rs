//! Post-processing of a solved system into per-node and per-bar results.

use nalgebra::Vector4;
use serde::Serialize;

use crate::errors::AnalysisError;
use crate::geometry::{Displacement, Force};
use crate::solver::Solution;
use crate::truss::{Truss, DOF_PER_NODE};

/// Response of one node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeResult {
    /// Node identifier.
    pub id: String,
    /// Solved translation in metres.
    pub displacement: Displacement,
    /// Support reaction in newtons, present when at least one direction is restrained.
    /// Unrestrained components are reported as zero.
    pub reaction: Option<Force>,
}

/// Response of one bar.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarResult {
    /// Bar identifier.
    pub id: String,
    /// Start node identifier.
    pub start: String,
    /// End node identifier.
    pub end: String,
    /// Axial force in newtons; positive in tension.
    pub axial_force: f64,
    /// Axial stress in pascals.
    pub stress: f64,
    /// Axial strain.
    pub strain: f64,
}

/// Everything a solve produces. Nodes and bars keep the truss insertion order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SolveResult {
    nodes: Vec<NodeResult>,
    bars: Vec<BarResult>,
}

impl SolveResult {
    /// Node results in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeResult] {
        &self.nodes
    }

    /// Bar results in insertion order.
    #[must_use]
    pub fn bars(&self) -> &[BarResult] {
        &self.bars
    }

    /// Displacement of a node.
    #[must_use]
    pub fn displacement(&self, node: &str) -> Option<Displacement> {
        self.nodes
            .iter()
            .find(|result| result.id == node)
            .map(|result| result.displacement)
    }

    /// Reaction at a supported node. `None` for unknown or unsupported nodes.
    #[must_use]
    pub fn reaction(&self, node: &str) -> Option<Force> {
        self.nodes
            .iter()
            .find(|result| result.id == node)
            .and_then(|result| result.reaction)
    }

    /// Reactions of all supported nodes in insertion order.
    pub fn reactions(&self) -> impl Iterator<Item = (&str, Force)> + '_ {
        self.nodes
            .iter()
            .filter_map(|result| result.reaction.map(|reaction| (result.id.as_str(), reaction)))
    }

    /// Result for a bar.
    #[must_use]
    pub fn bar(&self, id: &str) -> Option<&BarResult> {
        self.bars.iter().find(|result| result.id == id)
    }
}

/// Walk a solved system back through the nodes and bars of `truss`.
///
/// # Errors
///
/// Returns [`AnalysisError::ZeroLengthBar`] when a bar has no length.
pub fn extract(truss: &Truss, solution: &Solution) -> Result<SolveResult, AnalysisError> {
    let u = &solution.displacements;
    let r = &solution.reactions;

    let nodes = truss
        .nodes()
        .enumerate()
        .map(|(position, node)| {
            let dof_x = DOF_PER_NODE * position;
            let dof_y = dof_x + 1;
            let reaction = node.support.is_supported().then(|| {
                let [fixed_x, fixed_y] = node.support.restraints();
                Force::new(
                    if fixed_x { r[dof_x] } else { 0.0 },
                    if fixed_y { r[dof_y] } else { 0.0 },
                )
            });
            NodeResult {
                id: node.id.clone(),
                displacement: Displacement::new(u[dof_x], u[dof_y]),
                reaction,
            }
        })
        .collect();

    let bars = truss
        .elements()
        .map(|(element, dofs)| {
            let local = Vector4::new(u[dofs[0]], u[dofs[1]], u[dofs[2]], u[dofs[3]]);
            let axial_force = element.axial_force(&local)?;
            let stress = element.stress(axial_force);
            let bar = element.bar();
            Ok(BarResult {
                id: bar.id().to_string(),
                start: bar.start().to_string(),
                end: bar.end().to_string(),
                axial_force,
                stress,
                strain: element.strain(stress),
            })
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    Ok(SolveResult { nodes, bars })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    use super::*;
    use crate::geometry::point;
    use crate::model::{Bar, Node, Support};

    #[test]
    fn unrestrained_reaction_components_are_zeroed() {
        let mut truss = Truss::new();
        truss
            .add_node(Node::new("A", point(0.0, 0.0)).with_support(Support::RestrainX))
            .expect("node added");
        truss
            .add_node(Node::new("B", point(1.0, 0.0)))
            .expect("node added");
        truss
            .add_bar(Bar::new("AB", "A", "B", 100.0, 1.0).expect("valid bar"))
            .expect("bar added");

        let solution = Solution {
            displacements: DVector::from_vec(vec![0.0, 0.0, 0.01, 0.0]),
            reactions: DVector::from_vec(vec![-1.0, 1.0e-9, 1.0e-9, 0.0]),
        };
        let result = extract(&truss, &solution).expect("extracts");

        assert_eq!(result.reaction("A"), Some(Force::new(-1.0, 0.0)));
        assert_eq!(result.reaction("B"), None);
        assert_eq!(result.reactions().count(), 1);
        assert_eq!(result.displacement("B"), Some(Displacement::new(0.01, 0.0)));

        let bar = result.bar("AB").expect("bar result");
        assert_eq!(bar.start, "A");
        assert_eq!(bar.end, "B");
        assert_relative_eq!(bar.axial_force, 1.0);
        assert_relative_eq!(bar.stress, 1.0);
        assert_relative_eq!(bar.strain, 0.01);
    }
}
