use crate::cli::SymopArgs;
use crate::error::{CliError, Result};
use nalgebra::Point3;
use pdbkit::core::geometry::cell::UnitCell;
use pdbkit::core::geometry::matrix::TransformationMatrix;
use pdbkit::core::geometry::symmetry::from_symmetry_operation;
use std::io::{self, Write};
use tracing::{debug, info};

pub async fn run(args: SymopArgs) -> Result<()> {
    let matrix = from_symmetry_operation(&args.operation)?;
    info!(operation = %args.operation, "Built fractional symmetry matrix");

    let mut out = io::stdout().lock();
    writeln!(out, "Operation: {}", args.operation)?;
    write_matrix(&mut out, "Fractional", &matrix)?;
    write_matrix(&mut out, "Inverse", &matrix.inverse()?)?;

    let cartesian = match args.cell.as_deref() {
        Some(cell) => {
            let cell = parse_cell(cell)?;
            debug!(volume = cell.volume(), "Parsed unit cell");
            let cartesian = matrix.to_cartesian(&cell)?;
            write_matrix(&mut out, "Cartesian", &cartesian)?;
            Some(cartesian)
        }
        None => None,
    };

    if let Some(point) = args.apply.as_deref() {
        let point = parse_triple(point, "point")?;
        let point = Point3::new(point[0], point[1], point[2]);
        let moved = cartesian.as_ref().unwrap_or(&matrix).transform_point(&point);
        writeln!(out, "({:.4}, {:.4}, {:.4}) -> ({:.4}, {:.4}, {:.4})", point.x, point.y, point.z, moved.x, moved.y, moved.z)?;
    }
    out.flush()?;
    Ok(())
}

fn write_matrix<W: Write>(out: &mut W, title: &str, matrix: &TransformationMatrix) -> io::Result<()> {
    writeln!(out, "{title}:")?;
    for row in 0..4 {
        let cells: Vec<String> = (0..4).map(|col| format!("{:>10.4}", matrix.get(row, col))).collect();
        writeln!(out, "  [{} ]", cells.join(""))?;
    }
    Ok(())
}

fn parse_numbers(text: &str, what: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| CliError::Argument(format!("Invalid number '{}' in {}", part.trim(), what)))
        })
        .collect()
}

fn parse_triple(text: &str, what: &str) -> Result<[f64; 3]> {
    let values = parse_numbers(text, what)?;
    values
        .try_into()
        .map_err(|values: Vec<f64>| CliError::Argument(format!("Expected 3 values for {}, found {}", what, values.len())))
}

fn parse_cell(text: &str) -> Result<UnitCell> {
    let values = parse_numbers(text, "cell")?;
    let [a, b, c, alpha, beta, gamma]: [f64; 6] = values
        .try_into()
        .map_err(|values: Vec<f64>| CliError::Argument(format!("Expected 6 values for cell, found {}", values.len())))?;
    Ok(UnitCell::new(a, b, c, alpha, beta, gamma))
}
