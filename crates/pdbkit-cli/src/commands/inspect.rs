use crate::cli::{InspectArgs, SummaryFormat};
use crate::commands::load_structure;
use crate::error::{CliError, Result};
use crate::ui::UiEvent;
use pdbkit::core::models::structure::StructureSummary;
use std::io::{self, Write};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(args: InspectArgs, config_path: Option<&Path>, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let structure = load_structure(&args.source, &args.loader, config_path, ui_sender).await?;
    let summary = structure.summary();
    info!(
        atoms = summary.atom_count,
        chains = summary.chain_count,
        "Writing {:?} summary",
        args.format
    );

    let mut out = io::stdout().lock();
    match args.format {
        SummaryFormat::Text => write_text(&summary, &mut out)?,
        SummaryFormat::Toml => {
            let rendered =
                toml::to_string_pretty(&summary).map_err(|e| CliError::Other(anyhow::anyhow!(e)))?;
            out.write_all(rendered.as_bytes())?;
        }
        SummaryFormat::Csv => write_chain_csv(&summary, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

fn write_text<W: Write>(summary: &StructureSummary, out: &mut W) -> io::Result<()> {
    writeln!(out, "Source:   {}", summary.source)?;
    writeln!(
        out,
        "Atoms:    {} ({} hetero, {} water)",
        summary.atom_count, summary.hetero_atom_count, summary.water_atom_count
    )?;
    writeln!(out, "Bonds:    {}", summary.bond_count)?;
    writeln!(out, "Chains:   {}", summary.chain_count)?;
    if let Some(cell) = &summary.unit_cell {
        writeln!(
            out,
            "Cell:     a={:.3} b={:.3} c={:.3} alpha={:.2} beta={:.2} gamma={:.2} {}",
            cell.a, cell.b, cell.c, cell.alpha, cell.beta, cell.gamma, cell.space_group
        )?;
    }
    writeln!(
        out,
        "Operators: {} crystallographic, {} biological unit, {} non-crystallographic",
        summary.symmetry_operation_count, summary.biological_unit_matrix_count, summary.ncs_operation_count
    )?;

    writeln!(out)?;
    writeln!(out, "{:>6}  {:>7}  Name", "Entity", "Atoms")?;
    for entity in &summary.entities {
        let name = if entity.name.is_empty() { "-" } else { entity.name.as_str() };
        writeln!(out, "{:>6}  {:>7}  {}", entity.id, entity.atom_count, name)?;
    }

    writeln!(out)?;
    writeln!(out, "{:<8}  {:<8}  {:>6}  {:>7}", "Chain", "Category", "Entity", "Atoms")?;
    for chain in &summary.chains {
        writeln!(
            out,
            "{:<8}  {:<8}  {:>6}  {:>7}",
            chain.label,
            chain.category.to_string(),
            chain.entity_id,
            chain.atom_count
        )?;
    }
    Ok(())
}

fn write_chain_csv<W: Write>(summary: &StructureSummary, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for chain in &summary.chains {
        writer.serialize(chain)?;
    }
    writer.flush()?;
    Ok(())
}
