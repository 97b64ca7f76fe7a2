//! Global stiffness and load assembly

use std::collections::HashMap;

use log::debug;
use nalgebra::DVector;

use crate::error::EngineError;
use crate::math::{self, Mat12};
use crate::model::{Load, Structure};
use crate::section::SectionProperties;
use crate::sparse::SparseMatrixBuilder;

/// Elements shorter than this are treated as degenerate.
pub const MIN_ELEMENT_LENGTH: f64 = 1e-10;

/// Maps node ids to contiguous DOF indices in node insertion order.
pub struct DofMap {
    index_of: HashMap<u32, usize>,
}

impl DofMap {
    pub fn new(structure: &Structure) -> Self {
        let mut index_of = HashMap::with_capacity(structure.nodes.len());
        for (index, node) in structure.nodes.iter().enumerate() {
            index_of.entry(node.id).or_insert(index);
        }
        Self { index_of }
    }

    /// Ordinal of a node within the structure
    pub fn node_index(&self, id: u32) -> Option<usize> {
        self.index_of.get(&id).copied()
    }

    /// First DOF index of a node's six-DOF block
    pub fn base_dof(&self, id: u32) -> Option<usize> {
        self.node_index(id).map(|i| i * 6)
    }
}

/// Per-element matrices cached during assembly and reused for force recovery.
pub struct ElementContext {
    /// Index into `structure.elements`
    pub element_index: usize,
    /// Global DOF indices owned by the element's two nodes
    pub dofs: [usize; 12],
    pub k_local: Mat12,
    pub transformation: Mat12,
    pub properties: SectionProperties,
}

/// Assembled global system, prior to boundary reduction.
///
/// All buffers are owned by this value and scoped to one analysis
/// invocation; concurrent analyses cannot alias them.
pub struct Assembly {
    pub n_dofs: usize,
    /// COO accumulator; materialized dense or CSR downstream
    pub stiffness: SparseMatrixBuilder,
    /// Global load vector over all DOFs
    pub loads: DVector<f64>,
    /// Contexts for the elements that assembled cleanly, in input order
    pub contexts: Vec<ElementContext>,
    /// One message per element/load that had to be skipped
    pub diagnostics: Vec<String>,
}

/// Build the global stiffness matrix and load vector.
///
/// A bad element (dangling node reference, zero length, unusable section)
/// contributes a diagnostic instead of stiffness and the rest of the
/// structure still assembles. Nodes touched by no element leave zero
/// rows/columns; the solver reports the resulting singularity.
pub fn assemble(structure: &Structure, dof_map: &DofMap) -> Assembly {
    let n_dofs = structure.num_dofs();
    let mut stiffness = SparseMatrixBuilder::new(n_dofs);
    let mut loads = DVector::zeros(n_dofs);
    let mut contexts = Vec::with_capacity(structure.elements.len());
    let mut diagnostics = Vec::new();

    for (element_index, element) in structure.elements.iter().enumerate() {
        let resolve = |node_id: u32| {
            dof_map
                .node_index(node_id)
                .ok_or(EngineError::NodeNotFound(node_id))
        };

        let outcome = resolve(element.node_ids[0])
            .and_then(|i| resolve(element.node_ids[1]).map(|j| (i, j)))
            .and_then(|(i, j)| {
                let ni = &structure.nodes[i];
                let nj = &structure.nodes[j];
                let length = ni.distance_to(nj);
                if length < MIN_ELEMENT_LENGTH {
                    return Err(EngineError::DegenerateElement(element.id));
                }
                let properties = element.section.properties()?;

                let k_local = math::local_stiffness(
                    element.material.elastic_modulus,
                    element.material.shear_modulus(),
                    properties.area,
                    properties.iy,
                    properties.iz,
                    properties.j,
                    length,
                );
                let transformation = math::transformation_matrix(&ni.coords(), &nj.coords());
                Ok((i, j, k_local, transformation, properties))
            });

        match outcome {
            Ok((i, j, k_local, transformation, properties)) => {
                let k_global = transformation.transpose() * k_local * transformation;

                let mut dofs = [0usize; 12];
                for d in 0..6 {
                    dofs[d] = i * 6 + d;
                    dofs[d + 6] = j * 6 + d;
                }

                for (r, &dr) in dofs.iter().enumerate() {
                    for (c, &dc) in dofs.iter().enumerate() {
                        stiffness.add(dr, dc, k_global[(r, c)]);
                    }
                }

                contexts.push(ElementContext {
                    element_index,
                    dofs,
                    k_local,
                    transformation,
                    properties,
                });
            }
            Err(err) => {
                diagnostics.push(format!(
                    "{} {}: {err}",
                    element.kind.label(),
                    element.id
                ));
            }
        }
    }

    for load in &structure.loads {
        let Load::Point {
            node_id,
            axis,
            magnitude,
        } = load;
        match dof_map.base_dof(*node_id) {
            Some(base) => loads[base + axis.dof_offset()] += magnitude,
            None => diagnostics.push(format!(
                "load: {}",
                EngineError::NodeNotFound(*node_id)
            )),
        }
    }

    debug!(
        "assembled {} dofs, {} elements ok, {} skipped, {} stiffness entries",
        n_dofs,
        contexts.len(),
        structure.elements.len() - contexts.len(),
        stiffness.nnz()
    );

    Assembly {
        n_dofs,
        stiffness,
        loads,
        contexts,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, ElementKind, LoadAxis, Material, Node};
    use crate::section::Section;
    use approx::assert_relative_eq;

    fn cantilever() -> Structure {
        Structure {
            nodes: vec![
                Node::fixed(1, 0.0, 0.0, 0.0),
                Node::new(2, 4.0, 0.0, 0.0),
            ],
            elements: vec![Element::new(
                1,
                ElementKind::Beam,
                [1, 2],
                Material::steel(),
                Section::rectangular(0.2, 0.4),
            )],
            loads: vec![Load::point(2, LoadAxis::Y, -10_000.0)],
        }
    }

    #[test]
    fn test_assembled_matrix_is_symmetric() {
        let structure = cantilever();
        let dof_map = DofMap::new(&structure);
        let assembly = assemble(&structure, &dof_map);

        assert!(assembly.diagnostics.is_empty());
        let dense = assembly.stiffness.to_dense();
        for r in 0..assembly.n_dofs {
            for c in 0..assembly.n_dofs {
                assert_relative_eq!(dense[(r, c)], dense[(c, r)], epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_load_scatter() {
        let structure = cantilever();
        let dof_map = DofMap::new(&structure);
        let assembly = assemble(&structure, &dof_map);
        // Node 2 occupies DOFs 6..12; Y is offset 1
        assert_relative_eq!(assembly.loads[7], -10_000.0, epsilon = 1e-12);
        assert_eq!(assembly.loads.iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn test_dangling_node_reference_is_localized() {
        let mut structure = cantilever();
        structure.elements.push(Element::new(
            2,
            ElementKind::Beam,
            [2, 99],
            Material::steel(),
            Section::rectangular(0.2, 0.4),
        ));

        let dof_map = DofMap::new(&structure);
        let assembly = assemble(&structure, &dof_map);

        assert_eq!(assembly.contexts.len(), 1);
        assert_eq!(assembly.diagnostics.len(), 1);
        assert!(assembly.diagnostics[0].contains("99"));
    }

    #[test]
    fn test_zero_length_element_is_degenerate() {
        let mut structure = cantilever();
        structure.nodes.push(Node::new(3, 4.0, 0.0, 0.0));
        structure.elements.push(Element::new(
            2,
            ElementKind::Column,
            [2, 3],
            Material::steel(),
            Section::rectangular(0.2, 0.4),
        ));

        let dof_map = DofMap::new(&structure);
        let assembly = assemble(&structure, &dof_map);
        assert_eq!(assembly.contexts.len(), 1);
        assert!(assembly.diagnostics[0].contains("zero length"));
    }
}
