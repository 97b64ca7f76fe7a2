//! Recovery of displacements, forces, stresses, and safety verdicts

use nalgebra::DVector;

use crate::assembly::{Assembly, ElementContext};
use crate::math::Vec12;
use crate::model::Structure;
use crate::results::{ElementForces, ElementStress, NodeDisplacement, NodeReaction};

/// Everything the post-processor recovers from the solved displacement field.
pub struct Recovered {
    pub displacements: Vec<NodeDisplacement>,
    pub forces: Vec<ElementForces>,
    pub stresses: Vec<ElementStress>,
    pub reactions: Vec<NodeReaction>,
    pub max_displacement: f64,
    pub max_stress: f64,
    /// False when any output value is NaN or infinite
    pub all_finite: bool,
}

/// Recover outputs from the full displacement vector.
///
/// `full_displacements` covers every DOF with restrained entries already
/// forced to zero. Elements that failed assembly have no context here and
/// produce no force/stress records; surviving elements report regardless.
pub fn recover(
    structure: &Structure,
    assembly: &Assembly,
    full_displacements: &DVector<f64>,
    safety_factor: f64,
) -> Recovered {
    let mut all_finite = true;

    // Nodal displacement records, in input order
    let mut displacements = Vec::with_capacity(structure.nodes.len());
    let mut max_displacement = 0.0f64;
    for (index, node) in structure.nodes.iter().enumerate() {
        let base = index * 6;
        let record = NodeDisplacement {
            node_id: node.id,
            ux: full_displacements[base],
            uy: full_displacements[base + 1],
            uz: full_displacements[base + 2],
            rx: full_displacements[base + 3],
            ry: full_displacements[base + 4],
            rz: full_displacements[base + 5],
        };
        let peak = record.max_component();
        all_finite &= peak.is_finite();
        max_displacement = max_displacement.max(peak);
        displacements.push(record);
    }

    // Element force and stress records
    let mut forces = Vec::with_capacity(assembly.contexts.len());
    let mut stresses = Vec::with_capacity(assembly.contexts.len());
    let mut max_stress = 0.0f64;

    for context in &assembly.contexts {
        let element = &structure.elements[context.element_index];
        let f_local = local_end_forces(context, full_displacements);

        // Start-node values; axial and torsion sign-flipped so tension and
        // positive twist read positive
        let force_record = ElementForces {
            element_id: element.id,
            axial: -f_local[0],
            shear_y: f_local[1],
            shear_z: f_local[2],
            moment_y: f_local[4],
            moment_z: f_local[5],
            torsion: -f_local[3],
        };

        // Governing end moments for the stress check
        let moment_y = f_local[4].abs().max(f_local[10].abs());
        let moment_z = f_local[5].abs().max(f_local[11].abs());

        let props = &context.properties;
        let axial_stress = force_record.axial / props.area;
        let bending_stress_y = moment_y / props.sy;
        let bending_stress_z = moment_z / props.sz;

        // Extreme-fiber extremes on either side of the axis; the larger
        // magnitude governs and keeps its sign
        let tension_fiber = axial_stress + bending_stress_y + bending_stress_z;
        let compression_fiber = axial_stress - bending_stress_y - bending_stress_z;
        let combined_stress = if tension_fiber.abs() >= compression_fiber.abs() {
            tension_fiber
        } else {
            compression_fiber
        };

        let is_safe = match element.material.yield_strength {
            Some(fy) => combined_stress.abs() <= fy / safety_factor,
            None => true,
        };

        all_finite &= f_local.iter().all(|v| v.is_finite()) && combined_stress.is_finite();
        max_stress = max_stress.max(combined_stress.abs());

        forces.push(force_record);
        stresses.push(ElementStress {
            element_id: element.id,
            axial_stress,
            bending_stress_y,
            bending_stress_z,
            combined_stress,
            is_safe,
        });
    }

    let reactions = recover_reactions(structure, assembly, full_displacements);
    all_finite &= reactions
        .iter()
        .all(|r| [r.fx, r.fy, r.fz, r.mx, r.my, r.mz].iter().all(|v| v.is_finite()));

    Recovered {
        displacements,
        forces,
        stresses,
        reactions,
        max_displacement,
        max_stress,
        all_finite,
    }
}

/// Local end forces `f = k_local · (T · u_global)` for one element.
fn local_end_forces(context: &ElementContext, full_displacements: &DVector<f64>) -> Vec12 {
    let u_global = Vec12::from_fn(|i, _| full_displacements[context.dofs[i]]);
    let u_local = context.transformation * u_global;
    context.k_local * u_local
}

/// Reactions at restrained DOFs: `r = K·u − F`, grouped per supported node.
fn recover_reactions(
    structure: &Structure,
    assembly: &Assembly,
    full_displacements: &DVector<f64>,
) -> Vec<NodeReaction> {
    if structure.nodes.iter().all(|n| !n.supports.any()) {
        return Vec::new();
    }

    let internal = assembly.stiffness.mul_vector(full_displacements);

    let mut reactions = Vec::new();
    for (index, node) in structure.nodes.iter().enumerate() {
        if !node.supports.any() {
            continue;
        }
        let base = index * 6;
        let mut components = [0.0f64; 6];
        for (offset, restrained) in node.supports.as_array().into_iter().enumerate() {
            if restrained {
                let dof = base + offset;
                components[offset] = internal[dof] - assembly.loads[dof];
            }
        }
        reactions.push(NodeReaction {
            node_id: node.id,
            fx: components[0],
            fy: components[1],
            fz: components[2],
            mx: components[3],
            my: components[4],
            mz: components[5],
        });
    }
    reactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{assemble, DofMap};
    use crate::model::{Element, ElementKind, Load, LoadAxis, Material, Node};
    use crate::section::Section;

    fn cantilever() -> Structure {
        Structure {
            nodes: vec![
                Node::fixed(1, 0.0, 0.0, 0.0),
                Node::new(2, 3.0, 0.0, 0.0),
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
    fn test_zero_field_recovers_zero_everything() {
        let structure = cantilever();
        let dof_map = DofMap::new(&structure);
        let assembly = assemble(&structure, &dof_map);
        let u = DVector::zeros(assembly.n_dofs);

        let recovered = recover(&structure, &assembly, &u, 1.67);
        assert!(recovered.all_finite);
        assert_eq!(recovered.max_displacement, 0.0);
        assert_eq!(recovered.max_stress, 0.0);
        assert_eq!(recovered.forces.len(), 1);
        assert_eq!(recovered.forces[0].axial, 0.0);
        assert!(recovered.stresses[0].is_safe);
    }

    #[test]
    fn test_nan_field_is_flagged() {
        let structure = cantilever();
        let dof_map = DofMap::new(&structure);
        let assembly = assemble(&structure, &dof_map);
        let mut u = DVector::zeros(assembly.n_dofs);
        u[7] = f64::NAN;

        let recovered = recover(&structure, &assembly, &u, 1.67);
        assert!(!recovered.all_finite);
    }

    #[test]
    fn test_reaction_balances_applied_load() {
        // Pure axial pull so the reaction is easy to read off
        let mut structure = cantilever();
        structure.loads = vec![Load::point(2, LoadAxis::X, 1000.0)];

        let dof_map = DofMap::new(&structure);
        let assembly = assemble(&structure, &dof_map);

        // Exact axial solution: u = F L / (E A) at the free end
        let props = structure.elements[0].section.properties().unwrap();
        let e = structure.elements[0].material.elastic_modulus;
        let mut u = DVector::zeros(assembly.n_dofs);
        u[6] = 1000.0 * 3.0 / (e * props.area);

        let recovered = recover(&structure, &assembly, &u, 1.67);
        assert_eq!(recovered.reactions.len(), 1);
        assert!((recovered.reactions[0].fx + 1000.0).abs() < 1e-6);
    }
}
