use crate::cli::SymmetryArgs;
use crate::commands::load_structure;
use crate::error::Result;
use crate::ui::{CliProgressHandler, UiEvent};
use nalgebra::Point3;
use pdbkit::core::models::structure::Structure;
use pdbkit::engine::progress::ProgressReporter;
use pdbkit::workflows::symmetry::{self, SymmetryCopy};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct CoordinateRow<'a> {
    operator: &'a str,
    serial: usize,
    chain: &'a str,
    x: f64,
    y: f64,
    z: f64,
}

pub async fn run(args: SymmetryArgs, config_path: Option<&Path>, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let structure = load_structure(&args.source, &args.loader, config_path, ui_sender.clone()).await?;

    let handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(handler.get_callback());
    let copies = symmetry::run(&structure, args.operators, &reporter);
    if copies.is_empty() {
        warn!("No {} operators to apply.", args.operators);
        println!("Structure has no {} operators.", args.operators);
        return Ok(());
    }
    info!(copies = copies.len(), "Applied {} operators", args.operators);

    let mut out = io::stdout().lock();
    if args.coordinates {
        write_coordinates(&structure, &copies, &mut out)?;
    } else {
        write_summary(&copies, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

fn operator_label(copy: &SymmetryCopy, index: usize) -> String {
    let operator = &copy.operator;
    operator
        .symmetry_shorthand
        .clone()
        .or_else(|| operator.id.clone())
        .unwrap_or_else(|| (index + 1).to_string())
}

fn centroid(positions: &[Point3<f64>]) -> Option<Point3<f64>> {
    if positions.is_empty() {
        return None;
    }
    let sum = positions.iter().fold(Point3::origin(), |acc, p| acc + p.coords);
    Some(sum / positions.len() as f64)
}

fn write_summary<W: Write>(copies: &[SymmetryCopy], out: &mut W) -> io::Result<()> {
    writeln!(out, "{:<10}  {:<24}  {:<8}  {:>7}  Centroid", "Operator", "Operation", "Chains", "Atoms")?;
    for (index, copy) in copies.iter().enumerate() {
        let centre = centroid(&copy.positions)
            .map(|c| format!("({:.3}, {:.3}, {:.3})", c.x, c.y, c.z))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:<10}  {:<24}  {:<8}  {:>7}  {}",
            operator_label(copy, index),
            copy.operator.operation.as_deref().unwrap_or("-"),
            copy.operator.chain_id.as_deref().unwrap_or("all"),
            copy.atoms.len(),
            centre
        )?;
    }
    Ok(())
}

fn write_coordinates<W: Write>(structure: &Structure, copies: &[SymmetryCopy], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for (index, copy) in copies.iter().enumerate() {
        let label = operator_label(copy, index);
        for (id, position) in copy.atoms.iter().zip(&copy.positions) {
            let Some(atom) = structure.atom(*id) else {
                continue;
            };
            writer.serialize(CoordinateRow {
                operator: &label,
                serial: atom.serial,
                chain: &atom.author_chain_id,
                x: position.x,
                y: position.y,
                z: position.z,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}
