//! Frame Engine example - portal frame under gravity and wind

use anyhow::Result;
use frame_engine::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Frame Engine Example: Portal Frame ===\n");

    //     3 -------- 4
    //     |          |
    //     |          |
    //     1          2
    //     ^          ^
    //   fixed      fixed
    let height = 4.0;
    let span = 6.0;

    let column_section = Section::rectangular(0.3, 0.3);
    let beam_section = Section::rectangular(0.2, 0.45);

    let structure = Structure {
        nodes: vec![
            Node::fixed(1, 0.0, 0.0, 0.0),
            Node::fixed(2, span, 0.0, 0.0),
            Node::new(3, 0.0, height, 0.0),
            Node::new(4, span, height, 0.0),
        ],
        elements: vec![
            Element::new(1, ElementKind::Column, [1, 3], Material::steel(), column_section.clone()),
            Element::new(2, ElementKind::Column, [2, 4], Material::steel(), column_section),
            Element::new(3, ElementKind::Beam, [3, 4], Material::steel(), beam_section),
        ],
        loads: vec![
            // 20 kN/m of roof load lumped at the beam ends
            Load::point(3, LoadAxis::Y, -span * 20_000.0 / 2.0),
            Load::point(4, LoadAxis::Y, -span * 20_000.0 / 2.0),
            // 10 kN of wind at roof level
            Load::point(3, LoadAxis::X, 10_000.0),
        ],
    };

    let config = AnalysisConfig::default().with_profiling();
    let result = analyze(&structure, &config);

    println!("Node Displacements:");
    for d in &result.displacements {
        println!(
            "  node {}: UX={:.4}mm, UY={:.4}mm, RZ={:.6}rad",
            d.node_id,
            d.ux * 1000.0,
            d.uy * 1000.0,
            d.rz
        );
    }

    println!("\nElement Forces:");
    for f in &result.forces {
        println!(
            "  element {}: P={:.2}kN, Vy={:.2}kN, Mz={:.2}kN·m",
            f.element_id,
            f.axial / 1000.0,
            f.shear_y / 1000.0,
            f.moment_z / 1000.0
        );
    }

    println!("\nElement Stresses:");
    for s in &result.stresses {
        println!(
            "  element {}: combined={:.2}MPa, safe={}",
            s.element_id,
            s.combined_stress / 1e6,
            s.is_safe
        );
    }

    println!("\nSupport Reactions:");
    for r in &result.reactions {
        println!(
            "  node {}: FX={:.2}kN, FY={:.2}kN, MZ={:.2}kN·m",
            r.node_id,
            r.fx / 1000.0,
            r.fy / 1000.0,
            r.mz / 1000.0
        );
    }

    println!("\nSummary:");
    println!("  valid: {}", result.is_valid);
    println!("  max displacement: {:.4}mm", result.max_displacement * 1000.0);
    println!("  max stress: {:.2}MPa", result.max_stress / 1e6);
    if let Some(perf) = &result.performance {
        println!(
            "  assembly: {:.3}ms, solve: {:.3}ms",
            perf.assembly_time_ms, perf.solve_time_ms
        );
    }

    println!("\n{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
