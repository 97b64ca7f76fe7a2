//! Analysis orchestrator: the single entry point of the engine

use std::time::Instant;

use log::{debug, info, warn};
use nalgebra::DVector;

use crate::assembly::{self, DofMap};
use crate::boundary::{self, Partition};
use crate::config::AnalysisConfig;
use crate::error::EngineError;
use crate::model::Structure;
use crate::postprocess;
use crate::results::{AnalysisResult, PerformanceInfo};
use crate::solver;

/// Run one linear static analysis.
///
/// Stateless: the structure is borrowed immutably and every matrix and
/// vector is owned by this call. Malformed input never panics; it surfaces
/// as `is_valid = false` with diagnostics on the returned result.
pub fn analyze(structure: &Structure, config: &AnalysisConfig) -> AnalysisResult {
    match run(structure, config) {
        Ok(result) => result,
        Err(err) => {
            warn!("analysis rejected: {err}");
            AnalysisResult::failed(vec![err.to_string()])
        }
    }
}

fn run(structure: &Structure, config: &AnalysisConfig) -> Result<AnalysisResult, EngineError> {
    config.validate()?;

    if structure.nodes.is_empty() {
        debug!("empty structure, nothing to solve");
        return Ok(AnalysisResult::empty());
    }

    let dof_map = DofMap::new(structure);
    let partition = Partition::from_structure(structure);
    let sparse = config.wants_sparse(structure.nodes.len());

    // Assemble
    let assembly_start = Instant::now();
    let assembly = assembly::assemble(structure, &dof_map);
    let assembly_time_ms = assembly_start.elapsed().as_secs_f64() * 1000.0;

    let mut diagnostics = assembly.diagnostics.clone();

    // Reduce and solve
    let solve_start = Instant::now();
    let mut iterations = None;
    let mut convergence_warning = None;

    let full_displacements = if partition.free.is_empty() {
        // Everything restrained; the displacement field is identically zero
        DVector::zeros(assembly.n_dofs)
    } else {
        let system = boundary::reduce(&assembly.stiffness, &assembly.loads, &partition, sparse);
        let strategy = solver::for_config(config);
        debug!(
            "solving {} free of {} dofs with {} strategy ({} storage)",
            system.num_free(),
            assembly.n_dofs,
            strategy.name(),
            if sparse { "sparse" } else { "dense" }
        );

        match strategy.solve(&system) {
            Ok(outcome) => {
                iterations = outcome.iterations;
                convergence_warning = outcome.warning;
                boundary::expand_displacements(
                    &outcome.displacements,
                    &system.free,
                    assembly.n_dofs,
                )
            }
            Err(err) => {
                warn!("solve failed: {err}");
                diagnostics.push(err.to_string());
                DVector::zeros(assembly.n_dofs)
            }
        }
    };
    let solve_time_ms = solve_start.elapsed().as_secs_f64() * 1000.0;

    // Recover outputs
    let recovered = postprocess::recover(
        structure,
        &assembly,
        &full_displacements,
        config.safety_factor,
    );
    if !recovered.all_finite {
        diagnostics.push(
            EngineError::NumericOverflow("displacement, force, or stress output".to_string())
                .to_string(),
        );
    }

    let is_valid = diagnostics.is_empty();
    let performance = if config.enable_profiling || convergence_warning.is_some() {
        Some(PerformanceInfo {
            assembly_time_ms,
            solve_time_ms,
            iterations,
            convergence_warning,
        })
    } else {
        None
    };

    info!(
        "analysis complete: {} nodes, {} elements, valid = {}, max displacement = {:.3e}",
        structure.nodes.len(),
        structure.elements.len(),
        is_valid,
        recovered.max_displacement
    );

    Ok(AnalysisResult {
        displacements: recovered.displacements,
        forces: recovered.forces,
        stresses: recovered.stresses,
        reactions: recovered.reactions,
        is_valid,
        max_displacement: recovered.max_displacement,
        max_stress: recovered.max_stress,
        diagnostics,
        performance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, ElementKind, Load, LoadAxis, Material, Node};
    use crate::section::Section;

    #[test]
    fn test_empty_structure_is_valid() {
        let result = analyze(&Structure::new(), &AnalysisConfig::default());
        assert!(result.is_valid);
        assert!(result.displacements.is_empty());
        assert!(result.forces.is_empty());
        assert_eq!(result.max_displacement, 0.0);
        assert_eq!(result.max_stress, 0.0);
    }

    #[test]
    fn test_invalid_configuration_is_reported_not_thrown() {
        let config = AnalysisConfig::default().with_safety_factor(-1.0);
        let result = analyze(&Structure::new(), &config);
        assert!(!result.is_valid);
        assert!(result.diagnostics[0].contains("safety factor"));
    }

    #[test]
    fn test_unsupported_structure_reports_singularity() {
        // Two free-floating nodes joined by an element: rigid-body modes
        let structure = Structure {
            nodes: vec![Node::new(1, 0.0, 0.0, 0.0), Node::new(2, 2.0, 0.0, 0.0)],
            elements: vec![Element::new(
                1,
                ElementKind::Beam,
                [1, 2],
                Material::steel(),
                Section::rectangular(0.2, 0.2),
            )],
            loads: vec![Load::point(2, LoadAxis::Y, -1.0)],
        };

        let result = analyze(&structure, &AnalysisConfig::default());
        assert!(!result.is_valid);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.contains("singular")));
        // Still well-formed: every node has a (zeroed) displacement record
        assert_eq!(result.displacements.len(), 2);
    }

    #[test]
    fn test_fully_restrained_structure_short_circuits() {
        let structure = Structure {
            nodes: vec![
                Node::fixed(1, 0.0, 0.0, 0.0),
                Node::fixed(2, 1.0, 0.0, 0.0),
            ],
            elements: vec![Element::new(
                1,
                ElementKind::Beam,
                [1, 2],
                Material::steel(),
                Section::rectangular(0.2, 0.2),
            )],
            loads: vec![Load::point(2, LoadAxis::Y, -500.0)],
        };

        let result = analyze(&structure, &AnalysisConfig::default());
        assert!(result.is_valid);
        assert_eq!(result.max_displacement, 0.0);
    }

    #[test]
    fn test_nan_load_flags_overflow() {
        let structure = Structure {
            nodes: vec![
                Node::fixed(1, 0.0, 0.0, 0.0),
                Node::new(2, 2.0, 0.0, 0.0),
            ],
            elements: vec![Element::new(
                1,
                ElementKind::Beam,
                [1, 2],
                Material::steel(),
                Section::rectangular(0.2, 0.2),
            )],
            loads: vec![Load::point(2, LoadAxis::Y, f64::NAN)],
        };

        let result = analyze(&structure, &AnalysisConfig::default());
        assert!(!result.is_valid);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.contains("non-finite")));
    }
}
