use crate::cli::BondsArgs;
use crate::commands::load_structure;
use crate::error::{CliError, Result};
use crate::ui::UiEvent;
use pdbkit::core::attributes::bond_form::{BondForm, BondFormRegistry};
use pdbkit::core::attributes::bond_radius::BondRadiusByAtomRadius;
use pdbkit::core::models::atom::Atom;
use pdbkit::core::models::structure::Structure;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct BondRow {
    atom1: usize,
    atom2: usize,
    order: String,
    form: String,
    segments: usize,
    radius: f32,
    split_radius: Option<f32>,
}

pub async fn run(args: BondsArgs, config_path: Option<&Path>, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let registry = BondFormRegistry::with_defaults();
    debug!(?registry, "Bond form registry ready");
    let form = select_form(&registry, args.form.as_deref())?;

    let structure = load_structure(&args.source, &args.loader, config_path, ui_sender).await?;
    info!(bonds = structure.bonds().len(), form = %form.kind(), "Listing bonds");

    let out = io::stdout().lock();
    write_bonds(&structure, form, args.atom_scale, out)
}

fn select_form<'r>(registry: &'r BondFormRegistry, name: Option<&str>) -> Result<&'r dyn BondForm> {
    match name {
        Some(name) => registry
            .get_by_name(name)
            .map_err(|e| CliError::Argument(e.to_string())),
        None => registry
            .default_form()
            .ok_or_else(|| CliError::Argument("No default bond form is registered".to_string())),
    }
}

fn write_bonds<W: Write>(structure: &Structure, form: &dyn BondForm, atom_scale: f32, out: W) -> Result<()> {
    let radii = BondRadiusByAtomRadius::new(|atom: &Atom| atom.element.radius() * atom_scale);
    let mut writer = csv::Writer::from_writer(out);

    for bond in structure.bonds() {
        let (Some(atom1), Some(atom2)) = (structure.atom(bond.atom1_id), structure.atom(bond.atom2_id)) else {
            continue;
        };
        let Some(radius) = radii.bond_radius(structure, bond) else {
            continue;
        };
        writer.serialize(BondRow {
            atom1: atom1.serial,
            atom2: atom2.serial,
            order: bond.order.to_string(),
            form: form.kind().to_string(),
            segments: form.segments(structure, bond).len(),
            radius,
            split_radius: radii.split_bond_radius(structure, bond),
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdbkit::core::attributes::bond_form::BondFormKind;
    use pdbkit::engine::loader::PdbLoader;
    use pdbkit::engine::progress::ProgressReporter;
    use std::io::Cursor;

    const FORMALDEHYDE: &str = "\
HETATM    1  C1  FOR A   1       0.000   0.000   0.000  1.00  0.00           C
HETATM    2  O1  FOR A   1       1.200   0.000   0.000  1.00  0.00           O
HETATM    3  H1  FOR A   1      -0.500   0.900   0.000  1.00  0.00           H
CONECT    1    2    2    3
";

    fn structure() -> Structure {
        PdbLoader::default()
            .load_reader(
                Cursor::new(FORMALDEHYDE.as_bytes().to_vec()),
                "formaldehyde.pdb",
                None,
                &ProgressReporter::new(),
            )
            .unwrap()
    }

    fn rows(form_name: Option<&str>) -> Vec<String> {
        let registry = BondFormRegistry::with_defaults();
        let form = select_form(&registry, form_name).unwrap();
        let mut out = Vec::new();
        write_bonds(&structure(), form, 0.25, &mut out).unwrap();
        String::from_utf8(out).unwrap().lines().map(String::from).collect()
    }

    #[test]
    fn order_form_draws_one_line_per_bond_order() {
        let lines = rows(Some("order"));
        assert_eq!(lines[0], "atom1,atom2,order,form,segments,radius,split_radius");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,2,Double,Order,2,"));
        assert!(lines[2].starts_with("1,3,Single,Order,1,"));
    }

    #[test]
    fn default_form_is_used_without_a_name() {
        let registry = BondFormRegistry::with_defaults();
        let form = select_form(&registry, None).unwrap();
        assert_eq!(form.kind(), registry.default_kind());
        assert_eq!(BondFormKind::ALL.len(), registry.len());
    }

    #[test]
    fn unknown_form_name_is_an_argument_error() {
        let registry = BondFormRegistry::with_defaults();
        assert!(matches!(select_form(&registry, Some("dashed")), Err(CliError::Argument(_))));
    }
}
