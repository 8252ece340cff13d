//! Truss container and global stiffness assembly.

use std::collections::{BTreeSet, HashMap};

use nalgebra::{DMatrix, DVector};
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::{debug, info, warn};

use crate::config::SolverSettings;
use crate::element::Element;
use crate::errors::{AnalysisError, BarPropertyError, TrussEditError};
use crate::geometry::{Force, Point};
use crate::model::{Bar, Node, Support};
use crate::results::{self, SolveResult};
use crate::solver;

/// Degrees of freedom per node (Ux, Uy).
pub const DOF_PER_NODE: usize = 2;

/// Global system produced by [`Truss::assemble`].
#[derive(Clone, Debug, PartialEq)]
pub struct Assembly {
    /// Global stiffness matrix, `2n × 2n`.
    pub stiffness: DMatrix<f64>,
    /// Global load vector, `2n`.
    pub loads: DVector<f64>,
    /// Restrained degrees of freedom in ascending order, without duplicates.
    pub fixed_dofs: Vec<usize>,
}

/// Container for a planar pin-jointed truss.
///
/// Node insertion order fixes the global numbering: the node added `i`-th owns
/// degrees of freedom `2i` (Ux) and `2i + 1` (Uy). Nodes are never removed, so
/// that numbering is stable for the life of the truss.
///
/// Solving borrows the truss immutably and returns a fresh [`SolveResult`]. A
/// truss shared between threads can be solved concurrently, while edits need
/// exclusive access.
#[derive(Clone, Debug, Default)]
pub struct Truss {
    /// Nodes are graph nodes and bars are graph edges from start to end.
    graph: Graph<Node, Bar>,
    /// Node id to graph index.
    nodes_by_id: HashMap<String, NodeIndex>,
    /// Bar id to graph index.
    bars_by_id: HashMap<String, EdgeIndex>,
}

impl Truss {
    /// Create an empty truss.
    ///
    /// # Examples
    /// ```
    /// use truss2d::Truss;
    ///
    /// let truss = Truss::new();
    /// assert_eq!(truss.node_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of nodes in the truss.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of bars in the truss.
    #[must_use]
    pub fn bar_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Add a node. Its position in insertion order defines its degrees of freedom.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::DuplicateNode`] when the id is already in use and
    /// [`TrussEditError::NonFinite`] when the position or load is NaN or infinite.
    pub fn add_node(&mut self, node: Node) -> Result<(), TrussEditError> {
        if self.nodes_by_id.contains_key(&node.id) {
            return Err(TrussEditError::DuplicateNode(node.id));
        }
        check_finite(&node.id, "position", node.position.is_finite())?;
        check_finite(&node.id, "load", node.load.is_finite())?;
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.nodes_by_id.insert(id, index);
        Ok(())
    }

    /// Connect two existing nodes with a bar.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::DuplicateBar`] when the bar id is already in use,
    /// [`TrussEditError::UnknownNode`] when an endpoint has not been added yet and
    /// [`TrussEditError::InvalidBar`] when both endpoints sit at the same position.
    ///
    /// # Examples
    /// ```
    /// use truss2d::{point, Bar, Node, Truss, TrussEditError};
    ///
    /// let mut truss = Truss::new();
    /// truss.add_node(Node::new("A", point(0.0, 0.0))).unwrap();
    /// let error = truss
    ///     .add_bar(Bar::with_defaults("1", "A", "B").unwrap())
    ///     .expect_err("B has not been added");
    /// assert!(matches!(error, TrussEditError::UnknownNode { .. }));
    /// ```
    pub fn add_bar(&mut self, bar: Bar) -> Result<(), TrussEditError> {
        if self.bars_by_id.contains_key(bar.id()) {
            return Err(TrussEditError::DuplicateBar(bar.id().to_string()));
        }
        let start = self.resolve_endpoint(&bar, bar.start())?;
        let end = self.resolve_endpoint(&bar, bar.end())?;
        if self.graph[start].position == self.graph[end].position {
            return Err(BarPropertyError::ZeroLength(bar.id().to_string()).into());
        }
        let id = bar.id().to_string();
        let index = self.graph.add_edge(start, end, bar);
        self.bars_by_id.insert(id, index);
        Ok(())
    }

    /// Replace the load applied at a node.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownNodeId`] when `id` is not part of this truss
    /// and [`TrussEditError::NonFinite`] when `load` is NaN or infinite.
    pub fn set_load(&mut self, id: &str, load: Force) -> Result<(), TrussEditError> {
        let index = self.node_index(id)?;
        check_finite(id, "load", load.is_finite())?;
        self.graph[index].load = load;
        Ok(())
    }

    /// Replace the support condition at a node.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownNodeId`] when `id` is not part of this truss.
    pub fn set_support(&mut self, id: &str, support: Support) -> Result<(), TrussEditError> {
        let index = self.node_index(id)?;
        self.graph[index].support = support;
        Ok(())
    }

    /// Move a node. Attached bars follow it.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownNodeId`] when `id` is not part of this truss,
    /// [`TrussEditError::NonFinite`] when `position` is NaN or infinite and
    /// [`TrussEditError::InvalidBar`] when the move would collapse an attached bar to
    /// zero length. The truss is left unchanged on error.
    pub fn move_node(&mut self, id: &str, position: Point) -> Result<(), TrussEditError> {
        let index = self.node_index(id)?;
        check_finite(id, "position", position.is_finite())?;
        let attached = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming));
        for edge in attached {
            let other = if edge.source() == index {
                edge.target()
            } else {
                edge.source()
            };
            if self.graph[other].position == position {
                return Err(BarPropertyError::ZeroLength(edge.weight().id().to_string()).into());
            }
        }
        self.graph[index].position = position;
        Ok(())
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes_by_id.get(id).map(|&index| &self.graph[index])
    }

    /// Look up a bar by id.
    #[must_use]
    pub fn bar(&self, id: &str) -> Option<&Bar> {
        self.bars_by_id.get(id).map(|&index| &self.graph[index])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.graph.node_indices().map(move |index| &self.graph[index])
    }

    /// Bars in insertion order.
    pub fn bars(&self) -> impl Iterator<Item = &Bar> + '_ {
        self.graph.edge_indices().map(move |index| &self.graph[index])
    }

    /// Global (Ux, Uy) degree-of-freedom indices of a node.
    #[must_use]
    pub fn dof_indices(&self, id: &str) -> Option<[usize; 2]> {
        self.nodes_by_id.get(id).map(|&index| node_dofs(index))
    }

    /// Number of connected pieces the bars split the nodes into.
    ///
    /// A truss with more than one piece is only solvable when every piece is
    /// supported on its own.
    #[must_use]
    pub fn component_count(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    /// Build the global stiffness matrix, load vector and restrained degrees of freedom.
    ///
    /// Element matrices are scattered additively, so parallel bars between the same
    /// pair of nodes stack their stiffness.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ZeroLengthBar`] when a bar has no length.
    pub fn assemble(&self) -> Result<Assembly, AnalysisError> {
        let dof = self.node_count() * DOF_PER_NODE;
        let mut stiffness = DMatrix::zeros(dof, dof);
        let mut loads = DVector::zeros(dof);
        let mut fixed = BTreeSet::new();

        for index in self.graph.node_indices() {
            let node = &self.graph[index];
            let dofs = node_dofs(index);
            loads[dofs[0]] = node.load.x;
            loads[dofs[1]] = node.load.y;
            for (dof, restrained) in dofs.into_iter().zip(node.support.restraints()) {
                if restrained {
                    fixed.insert(dof);
                }
            }
        }

        for (element, dof_map) in self.elements() {
            let local = element.local_stiffness()?;
            for (row_local, &global_row) in dof_map.iter().enumerate() {
                for (col_local, &global_col) in dof_map.iter().enumerate() {
                    stiffness[(global_row, global_col)] += local[(row_local, col_local)];
                }
            }
        }

        debug!(
            nodes = self.node_count(),
            bars = self.bar_count(),
            fixed_dofs = fixed.len(),
            "assembled global stiffness matrix"
        );

        Ok(Assembly {
            stiffness,
            loads,
            fixed_dofs: fixed.into_iter().collect(),
        })
    }

    /// Analyse the truss with default [`SolverSettings`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] when a bar has zero length or the supports and
    /// bracing leave a mechanism.
    ///
    /// # Examples
    /// ```
    /// use truss2d::{force, point, Bar, Node, Support, Truss};
    ///
    /// let mut truss = Truss::new();
    /// truss.add_node(Node::new("A", point(0.0, 0.0)).with_support(Support::Pinned)).unwrap();
    /// truss
    ///     .add_node(
    ///         Node::new("B", point(1.0, 0.0))
    ///             .with_support(Support::RestrainY)
    ///             .with_load(force(1_000.0, 0.0)),
    ///     )
    ///     .unwrap();
    /// truss.add_bar(Bar::new("AB", "A", "B", 200.0e9, 0.01).unwrap()).unwrap();
    ///
    /// let result = truss.solve().unwrap();
    /// let bar = result.bar("AB").unwrap();
    /// assert!((bar.axial_force - 1_000.0).abs() < 1.0e-6);
    /// ```
    pub fn solve(&self) -> Result<SolveResult, AnalysisError> {
        self.solve_with(&SolverSettings::default())
    }

    /// Analyse the truss with explicit solver settings.
    ///
    /// # Errors
    ///
    /// See [`Truss::solve`].
    pub fn solve_with(&self, settings: &SolverSettings) -> Result<SolveResult, AnalysisError> {
        let components = self.component_count();
        if components > 1 {
            warn!(components, "truss is not connected");
        }
        let assembly = self.assemble()?;
        let solution = solver::solve(
            &assembly.stiffness,
            &assembly.loads,
            &assembly.fixed_dofs,
            settings,
        )?;
        let result = results::extract(self, &solution)?;
        info!(
            nodes = self.node_count(),
            bars = self.bar_count(),
            "truss solved"
        );
        Ok(result)
    }

    /// Every bar paired with its endpoint positions and global DOF map, in insertion order.
    pub(crate) fn elements(&self) -> impl Iterator<Item = (Element<'_>, [usize; 4])> + '_ {
        self.graph.edge_references().map(move |edge| {
            let [start_x, start_y] = node_dofs(edge.source());
            let [end_x, end_y] = node_dofs(edge.target());
            let element = Element::new(
                edge.weight(),
                self.graph[edge.source()].position,
                self.graph[edge.target()].position,
            );
            (element, [start_x, start_y, end_x, end_y])
        })
    }

    /// Resolve a node id for an edit.
    fn node_index(&self, id: &str) -> Result<NodeIndex, TrussEditError> {
        self.nodes_by_id
            .get(id)
            .copied()
            .ok_or_else(|| TrussEditError::UnknownNodeId(id.to_string()))
    }

    /// Resolve one endpoint of `bar`.
    fn resolve_endpoint(&self, bar: &Bar, node: &str) -> Result<NodeIndex, TrussEditError> {
        self.nodes_by_id
            .get(node)
            .copied()
            .ok_or_else(|| TrussEditError::UnknownNode {
                bar: bar.id().to_string(),
                node: node.to_string(),
            })
    }
}

fn check_finite(node: &str, quantity: &'static str, finite: bool) -> Result<(), TrussEditError> {
    if finite {
        Ok(())
    } else {
        Err(TrussEditError::NonFinite {
            node: node.to_string(),
            quantity,
        })
    }
}

/// Global DOF indices owned by the node at `index`.
fn node_dofs(index: NodeIndex) -> [usize; 2] {
    let base = index.index() * DOF_PER_NODE;
    [base, base + 1]
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{force, point};

    fn two_node_truss() -> Truss {
        let mut truss = Truss::new();
        truss
            .add_node(Node::new("A", point(0.0, 0.0)).with_support(Support::Pinned))
            .expect("node added");
        truss
            .add_node(Node::new("B", point(2.0, 0.0)).with_support(Support::RestrainY))
            .expect("node added");
        truss
            .add_bar(Bar::new("AB", "A", "B", 200.0e9, 0.01).expect("valid bar"))
            .expect("bar added");
        truss
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut truss = two_node_truss();
        assert_eq!(
            truss.add_node(Node::new("B", point(5.0, 5.0))),
            Err(TrussEditError::DuplicateNode("B".to_string()))
        );
        assert_eq!(
            truss.add_bar(Bar::with_defaults("AB", "B", "A").expect("valid bar")),
            Err(TrussEditError::DuplicateBar("AB".to_string()))
        );
        assert_eq!(truss.node_count(), 2);
        assert_eq!(truss.bar_count(), 1);
    }

    #[test]
    fn unknown_endpoint_is_rejected_at_insertion() {
        let mut truss = two_node_truss();
        let error = truss
            .add_bar(Bar::with_defaults("BC", "B", "C").expect("valid bar"))
            .expect_err("C is missing");
        assert_eq!(
            error,
            TrussEditError::UnknownNode {
                bar: "BC".to_string(),
                node: "C".to_string(),
            }
        );
    }

    #[test]
    fn coincident_nodes_cannot_be_joined() {
        let mut truss = two_node_truss();
        truss
            .add_node(Node::new("C", point(2.0, 0.0)))
            .expect("node added");
        let error = truss
            .add_bar(Bar::with_defaults("BC", "B", "C").expect("valid bar"))
            .expect_err("zero length");
        assert_eq!(
            error,
            TrussEditError::InvalidBar(BarPropertyError::ZeroLength("BC".to_string()))
        );
    }

    #[test]
    fn move_onto_neighbour_is_rejected() {
        let mut truss = two_node_truss();
        let error = truss
            .move_node("B", point(0.0, 0.0))
            .expect_err("would collapse AB");
        assert_eq!(
            error,
            TrussEditError::InvalidBar(BarPropertyError::ZeroLength("AB".to_string()))
        );
        assert_eq!(
            truss.node("B").map(|node| node.position),
            Some(point(2.0, 0.0))
        );
    }

    #[test]
    fn edits_on_unknown_nodes_fail() {
        let mut truss = two_node_truss();
        let unknown = TrussEditError::UnknownNodeId("Z".to_string());
        assert_eq!(truss.set_load("Z", force(1.0, 0.0)), Err(unknown.clone()));
        assert_eq!(truss.set_support("Z", Support::Free), Err(unknown.clone()));
        assert_eq!(truss.move_node("Z", point(1.0, 1.0)), Err(unknown));
    }

    #[test]
    fn non_finite_coordinates_and_loads_are_rejected() {
        let mut truss = two_node_truss();
        assert_eq!(
            truss.add_node(Node::new("C", point(f64::INFINITY, 0.0))),
            Err(TrussEditError::NonFinite {
                node: "C".to_string(),
                quantity: "position",
            })
        );
        assert_eq!(
            truss.add_node(Node::new("C", point(1.0, 1.0)).with_load(force(f64::NAN, 0.0))),
            Err(TrussEditError::NonFinite {
                node: "C".to_string(),
                quantity: "load",
            })
        );
        assert_eq!(truss.node_count(), 2);

        assert!(matches!(
            truss.set_load("B", force(0.0, f64::NEG_INFINITY)),
            Err(TrussEditError::NonFinite { quantity: "load", .. })
        ));
        assert!(matches!(
            truss.move_node("B", point(f64::NAN, 0.0)),
            Err(TrussEditError::NonFinite { quantity: "position", .. })
        ));
        let b = truss.node("B").expect("node B");
        assert_eq!(b.position, point(2.0, 0.0));
        assert_eq!(b.load, force(0.0, 0.0));
    }

    #[test]
    fn dofs_follow_insertion_order() {
        let truss = two_node_truss();
        assert_eq!(truss.dof_indices("A"), Some([0, 1]));
        assert_eq!(truss.dof_indices("B"), Some([2, 3]));
        assert_eq!(truss.dof_indices("C"), None);
    }

    #[test]
    fn assembly_scatters_element_and_loads() {
        let mut truss = two_node_truss();
        truss.set_load("B", force(5.0, -3.0)).expect("load set");
        let assembly = truss.assemble().expect("assembles");

        let k = 200.0e9 * 0.01 / 2.0;
        assert_relative_eq!(assembly.stiffness[(0, 0)], k);
        assert_relative_eq!(assembly.stiffness[(0, 2)], -k);
        assert_relative_eq!(assembly.stiffness[(2, 2)], k);
        assert_eq!(assembly.stiffness[(1, 1)], 0.0);
        assert_eq!(assembly.loads.as_slice(), &[0.0, 0.0, 5.0, -3.0]);
        assert_eq!(assembly.fixed_dofs, vec![0, 1, 3]);
    }

    #[test]
    fn parallel_bars_accumulate() {
        let mut truss = two_node_truss();
        truss
            .add_bar(Bar::new("AB2", "B", "A", 200.0e9, 0.01).expect("valid bar"))
            .expect("bar added");
        let assembly = truss.assemble().expect("assembles");
        let k = 200.0e9 * 0.01 / 2.0;
        assert_relative_eq!(assembly.stiffness[(0, 0)], 2.0 * k);
        assert_relative_eq!(assembly.stiffness[(2, 0)], -2.0 * k);
    }

    #[test]
    fn bars_see_moved_nodes() {
        let mut truss = two_node_truss();
        truss.move_node("B", point(4.0, 0.0)).expect("moved");
        let assembly = truss.assemble().expect("assembles");
        assert_relative_eq!(assembly.stiffness[(0, 0)], 200.0e9 * 0.01 / 4.0);
    }

    #[test]
    fn disconnected_pieces_are_counted() {
        let mut truss = two_node_truss();
        truss
            .add_node(Node::new("C", point(10.0, 0.0)))
            .expect("node added");
        assert_eq!(truss.component_count(), 2);
    }
}
