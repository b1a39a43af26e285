use super::config::LoaderConfig;
use super::error::LoadError;
use super::progress::{CancellationToken, Progress, ProgressReporter};
use super::source::{self, SourceLocation};
use crate::core::geometry::cell::UnitCell;
use crate::core::geometry::matrix::TransformationMatrix;
use crate::core::io::pdb::{
    self, AssemblyLine, CompoundField, ConectRecord, MatrixRowAssembler, ParseErrorKind, RecordType,
};
use crate::core::models::atom::Atom;
use crate::core::models::chain::ChainKey;
use crate::core::models::ids::AtomId;
use crate::core::models::structure::{Structure, StructureBuilder};
use crate::core::models::topology::BondOrder;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, trace, warn};

/// Only the first biological assembly is read from REMARK 350.
const BIOLOGICAL_UNIT_ID: u32 = 1;
const DEFAULT_ENTITY_ID: u32 = 1;

/// Loads PDB-format structures from paths, URLs or already open readers.
///
/// The loader holds only configuration; every call builds its own parse state and
/// returns an owned [`Structure`], so calls never observe each other.
#[derive(Debug, Clone, Default)]
pub struct PdbLoader {
    config: LoaderConfig,
    cancellation: CancellationToken,
}

impl PdbLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            cancellation: CancellationToken::new(),
        }
    }

    /// Makes loads stop with [`LoadError::Cancelled`] once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// True when `name` contains ".pdb" or ".ent" and starts with a `file:`, `http:`,
    /// `https:` or `ftp:` scheme.
    pub fn can_load(name: &str) -> bool {
        source::is_loadable_name(name)
    }

    /// True when the file exists and its `file:` URL passes [`can_load`](Self::can_load).
    pub fn can_load_path(path: &Path) -> bool {
        path.exists() && Self::can_load(&source::file_url(path))
    }

    /// True for `http:`, `https:` and `ftp:` URLs that pass [`can_load`](Self::can_load).
    pub fn can_load_url(url: &str) -> bool {
        source::url_scheme(url).is_some() && Self::can_load(url)
    }

    /// Loads a structure from a path, a `file:` URL or a network URL.
    pub fn load(&self, name: &str, reporter: &ProgressReporter) -> Result<Structure, LoadError> {
        match SourceLocation::classify(name) {
            SourceLocation::File(path) => self.load_path(&path, reporter),
            SourceLocation::Url(url) => self.load_url(&url, reporter),
        }
    }

    pub fn load_path(&self, path: &Path, reporter: &ProgressReporter) -> Result<Structure, LoadError> {
        let name = source::file_url(path);
        if !Self::can_load(&name) {
            return Err(LoadError::Unsupported(name));
        }
        let opened = source::open_path(path, &self.config)?;
        self.load_reader(opened.reader, &opened.name, opened.expected_bytes, reporter)
    }

    pub fn load_url(&self, url: &str, reporter: &ProgressReporter) -> Result<Structure, LoadError> {
        if !Self::can_load_url(url) {
            return Err(LoadError::Unsupported(url.to_string()));
        }
        let opened = source::open_url(url, &self.config)?;
        self.load_reader(opened.reader, &opened.name, opened.expected_bytes, reporter)
    }

    /// Reads PDB records from `reader` and assembles the structure.
    ///
    /// `expected_bytes` drives the percent reported after every line; when it is
    /// `None` progress is reported as indeterminate. A final
    /// [`Progress::Completed`] is emitted once the structure is built.
    pub fn load_reader<R: BufRead>(
        &self,
        mut reader: R,
        source_name: &str,
        expected_bytes: Option<u64>,
        reporter: &ProgressReporter,
    ) -> Result<Structure, LoadError> {
        info!(source = %source_name, "Loading structure");
        reporter.report(Progress::Started {
            source: source_name.to_string(),
        });

        let expected_bytes = expected_bytes.filter(|&bytes| bytes > 0);
        let message = format!("Loading {source_name}");
        let mut state = ParseState::new(&self.config);
        let mut buffer = Vec::new();
        let mut bytes_read: u64 = 0;
        let mut line_number = 0;

        loop {
            if self.cancellation.is_cancelled() {
                info!(source = %source_name, line = line_number, "Load cancelled");
                return Err(LoadError::Cancelled(source_name.to_string()));
            }

            buffer.clear();
            let read = reader
                .read_until(b'\n', &mut buffer)
                .map_err(|e| LoadError::io(source_name, e))?;
            if read == 0 {
                break;
            }
            line_number += 1;

            bytes_read += read as u64;
            let line = String::from_utf8_lossy(&buffer);
            let line = line.trim_end_matches(['\n', '\r']);
            reporter.report(Progress::Advanced {
                percent: expected_bytes.map(|total| percent_of(bytes_read, total)),
                message: message.clone(),
            });

            let flow = state
                .consume(line)
                .map_err(|kind| LoadError::Parse {
                    line: line_number,
                    kind,
                })?;
            if flow == LineFlow::Stop {
                debug!(
                    model = state.model_count,
                    "Stopping at MODEL record; later models are not loaded"
                );
                break;
            }
        }

        let structure = state.finish(source_name);
        info!(
            source = %source_name,
            atoms = structure.atoms().count(),
            bonds = structure.bonds().len(),
            chains = structure.chains().len(),
            "Structure loaded"
        );
        reporter.report(Progress::Completed);
        Ok(structure)
    }
}

fn percent_of(bytes_read: u64, total: u64) -> u8 {
    (bytes_read.saturating_mul(100) / total).min(100) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineFlow {
    Continue,
    Stop,
}

/// Everything a single load accumulates between its first and last line.
struct ParseState<'a> {
    config: &'a LoaderConfig,
    builder: StructureBuilder,
    serial_index: HashMap<usize, AtomId>,
    pending_conect: Vec<ConectRecord>,
    model_count: u32,
    current_entity: u32,
    chain_entities: HashMap<String, u32>,
    unit_cell: Option<UnitCell>,
    fractional_operators: Vec<TransformationMatrix>,
    biomolecule: Option<u32>,
    assembly_chains: Vec<String>,
    assembly_rows: MatrixRowAssembler,
    ncs_rows: MatrixRowAssembler,
    ncs_given: HashMap<u32, bool>,
}

impl<'a> ParseState<'a> {
    fn new(config: &'a LoaderConfig) -> Self {
        Self {
            config,
            builder: StructureBuilder::new(),
            serial_index: HashMap::new(),
            pending_conect: Vec::new(),
            model_count: 0,
            current_entity: 0,
            chain_entities: HashMap::new(),
            unit_cell: None,
            fractional_operators: Vec::new(),
            biomolecule: None,
            assembly_chains: Vec::new(),
            assembly_rows: MatrixRowAssembler::new(),
            ncs_rows: MatrixRowAssembler::new(),
            ncs_given: HashMap::new(),
        }
    }

    fn more_models_allowed(&self) -> bool {
        self.config.treat_models_as_subunits || self.model_count <= 1
    }

    fn consume(&mut self, line: &str) -> Result<LineFlow, ParseErrorKind> {
        match RecordType::of(line) {
            RecordType::Atom | RecordType::Hetatm => self.add_atom(line)?,
            RecordType::Model => {
                self.model_count += 1;
                if !self.more_models_allowed() {
                    return Ok(LineFlow::Stop);
                }
            }
            RecordType::Compound => self.add_compound(line)?,
            RecordType::Conect if self.config.read_connectivity => {
                self.pending_conect.push(pdb::parse_conect(line)?);
            }
            RecordType::Cryst1 => {
                let cell = pdb::parse_cryst1(line)?;
                self.builder.set_unit_cell(cell.clone());
                self.unit_cell = Some(cell);
            }
            RecordType::SymmetryRemark => match pdb::parse_symmetry_operator(line) {
                Ok(Some(operator)) => self.fractional_operators.push(operator),
                Ok(None) => {}
                Err(ParseErrorKind::InvalidSymmetryOperation { operation, source }) => {
                    warn!(%operation, error = %source, "Skipping symmetry operator that cannot be parsed");
                }
                Err(kind) => return Err(kind),
            },
            RecordType::AssemblyRemark => self.add_assembly_line(line)?,
            RecordType::Mtrix(row) => self.add_ncs_row(line, row)?,
            RecordType::Conect | RecordType::Other => {}
        }
        Ok(LineFlow::Continue)
    }

    fn add_atom(&mut self, line: &str) -> Result<(), ParseErrorKind> {
        let record = pdb::parse_atom_record(line)?;

        let entity_id = if self.chain_entities.is_empty() {
            DEFAULT_ENTITY_ID
        } else {
            self.chain_entities
                .get(&record.chain_id)
                .copied()
                .unwrap_or(DEFAULT_ENTITY_ID)
        };
        let model = (self.config.treat_models_as_subunits && self.model_count > 0)
            .then_some(self.model_count);
        let chain = ChainKey::classify(&record.chain_id, record.record, &record.residue_name, model);

        let mut atom = Atom::new(record.serial, &record.name, record.element, record.position);
        atom.alt_loc = record.alt_loc;
        atom.residue_name = record.residue_name;
        atom.chain = chain;
        atom.author_chain_id = record.chain_id;
        atom.residue_number = record.residue_number;
        atom.insertion_code = record.insertion_code;
        atom.entity_id = entity_id;
        atom.model = self.model_count;
        atom.record = record.record;
        atom.occupancy = record.occupancy;
        atom.b_factor = record.b_factor;

        let id = self.builder.add_atom(atom);
        self.serial_index.insert(record.serial, id);
        Ok(())
    }

    fn add_compound(&mut self, line: &str) -> Result<(), ParseErrorKind> {
        match pdb::parse_compound(line)? {
            Some(CompoundField::MoleculeId(id)) => self.current_entity = id,
            Some(CompoundField::Chains(chains)) => {
                for chain in chains {
                    self.chain_entities.insert(chain, self.current_entity);
                }
            }
            Some(CompoundField::Molecule(name)) => {
                self.builder.set_entity_name(self.current_entity, &name);
            }
            None => {}
        }
        Ok(())
    }

    fn add_assembly_line(&mut self, line: &str) -> Result<(), ParseErrorKind> {
        match pdb::parse_assembly_remark(line)? {
            Some(AssemblyLine::Biomolecule(id)) => self.biomolecule = Some(id),
            Some(AssemblyLine::Chains(chains)) => self.assembly_chains = chains,
            Some(AssemblyLine::MoreChains(chains)) => self.assembly_chains.extend(chains),
            Some(AssemblyLine::Operator(row)) => {
                if self.biomolecule.is_some_and(|id| id != BIOLOGICAL_UNIT_ID) {
                    return Ok(());
                }
                if let Some(mut matrix) = self.assembly_rows.push(row) {
                    if !self.assembly_chains.is_empty() {
                        matrix.chain_id = Some(self.assembly_chains.join(","));
                    }
                    self.builder.add_biological_unit_matrix(matrix);
                }
            }
            None => {}
        }
        Ok(())
    }

    fn add_ncs_row(&mut self, line: &str, row: usize) -> Result<(), ParseErrorKind> {
        let record = pdb::parse_mtrix(line, row)?;
        let serial = record.row.serial;
        *self.ncs_given.entry(serial).or_default() |= record.given;
        if let Some(matrix) = self.ncs_rows.push(record.row) {
            if self.ncs_given.remove(&serial).unwrap_or(false) {
                trace!(serial, "Skipping MTRIX operator already applied to coordinates");
            } else {
                self.builder.add_ncs_operation(matrix);
            }
        }
        Ok(())
    }

    /// Resolves connectivity and symmetry operators, then builds the structure.
    fn finish(mut self, source_name: &str) -> Structure {
        self.resolve_connectivity();

        for operator in std::mem::take(&mut self.fractional_operators) {
            let operator = match &self.unit_cell {
                Some(cell) => operator.to_cartesian(cell).unwrap_or_else(|e| {
                    warn!(
                        operation = operator.operation.as_deref().unwrap_or_default(),
                        "Keeping symmetry operator in fractional space: {e}"
                    );
                    operator
                }),
                None => operator,
            };
            self.builder.add_symmetry_operation(operator);
        }

        if self.assembly_rows.has_incomplete() || self.ncs_rows.has_incomplete() {
            warn!("Ignoring transformation matrices with missing rows");
        }
        self.builder.build(source_name)
    }

    /// Turns the collected CONECT records into bonds.
    ///
    /// Records for the same atom are merged; a partner listed `n` times becomes a bond
    /// of order `n`. Serials that never appeared in an atom record are skipped.
    fn resolve_connectivity(&mut self) {
        let mut partners_by_serial: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut position: HashMap<usize, usize> = HashMap::new();
        for record in std::mem::take(&mut self.pending_conect) {
            let index = *position.entry(record.serial).or_insert_with(|| {
                partners_by_serial.push((record.serial, Vec::new()));
                partners_by_serial.len() - 1
            });
            partners_by_serial[index].1.extend(record.partners);
        }

        for (serial, partners) in partners_by_serial {
            let Some(&atom_id) = self.serial_index.get(&serial) else {
                trace!(serial, "Skipping CONECT record for unknown atom");
                continue;
            };
            let mut seen: Vec<usize> = Vec::new();
            for &partner in &partners {
                if seen.contains(&partner) {
                    continue;
                }
                seen.push(partner);
                let Some(&partner_id) = self.serial_index.get(&partner) else {
                    trace!(serial, partner, "Skipping CONECT partner for unknown atom");
                    continue;
                };
                let multiplicity = partners.iter().filter(|&&p| p == partner).count();
                self.builder
                    .add_bond(atom_id, partner_id, BondOrder::from_multiplicity(multiplicity));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::chain::ChainCategory;
    use crate::core::models::structure::ComponentType;
    use std::io::Cursor;

    fn load_text(text: &str, config: LoaderConfig) -> Result<Structure, LoadError> {
        PdbLoader::new(config).load_reader(
            Cursor::new(text.as_bytes()),
            "memory.pdb",
            Some(text.len() as u64),
            &ProgressReporter::new(),
        )
    }

    const TWO_MODELS: &str = "\
MODEL        1
ATOM      1  N   ALA A   1       0.000   0.000   0.000  1.00  0.00           N
ENDMDL
MODEL        2
ATOM      2  N   ALA A   1       1.000   0.000   0.000  1.00  0.00           N
ENDMDL
END
";

    #[test]
    fn percent_is_capped_at_one_hundred() {
        assert_eq!(percent_of(50, 200), 25);
        assert_eq!(percent_of(500, 200), 100);
    }

    #[test]
    fn only_first_model_is_loaded_by_default() {
        let structure = load_text(TWO_MODELS, LoaderConfig::default()).unwrap();
        assert_eq!(structure.component_count(ComponentType::Atom), 1);
        assert_eq!(structure.atom_at(0).unwrap().chain_id(), "A");
    }

    #[test]
    fn models_become_subunits_when_enabled() {
        let config = LoaderConfig {
            treat_models_as_subunits: true,
            ..LoaderConfig::default()
        };
        let structure = load_text(TWO_MODELS, config).unwrap();
        let labels: Vec<String> = structure.atoms().map(|(_, atom)| atom.chain_id()).collect();
        assert_eq!(labels, vec!["A#1", "A#2"]);
        assert_eq!(structure.component_count(ComponentType::Chain), 2);
        assert_eq!(structure.atom_at(1).unwrap().author_chain_id, "A");
    }

    #[test]
    fn conect_multiplicity_sets_bond_order() {
        let text = "\
HETATM    1  C1  LIG A 101       0.000   0.000   0.000  1.00  0.00           C
HETATM    2  O1  LIG A 101       1.200   0.000   0.000  1.00  0.00           O
HETATM    3  C2  LIG A 101      -1.500   0.000   0.000  1.00  0.00           C
CONECT    1    2    2    3
CONECT    2    1    1
CONECT    3    1   99
";
        let structure = load_text(text, LoaderConfig::default()).unwrap();
        assert_eq!(structure.bonds().len(), 2);
        assert_eq!(structure.bonds()[0].order, BondOrder::Double);
        assert_eq!(structure.bonds()[1].order, BondOrder::Single);
    }

    #[test]
    fn conect_is_ignored_when_connectivity_is_disabled() {
        let text = "\
ATOM      1  C   ALA A   1       0.000   0.000   0.000  1.00  0.00           C
ATOM      2  O   ALA A   1       1.200   0.000   0.000  1.00  0.00           O
CONECT    1    2
";
        let config = LoaderConfig {
            read_connectivity: false,
            ..LoaderConfig::default()
        };
        let structure = load_text(text, config).unwrap();
        assert_eq!(structure.component_count(ComponentType::Bond), 0);
    }

    #[test]
    fn water_and_ligand_atoms_get_their_own_chains() {
        let text = "\
ATOM      1  CA  ALA A   1       0.000   0.000   0.000  1.00  0.00           C
HETATM    2 FE   HEM A 201       1.000   0.000   0.000  1.00  0.00          FE
HETATM    3  O   HOH A 301       2.000   0.000   0.000  1.00  0.00           O
";
        let structure = load_text(text, LoaderConfig::default()).unwrap();
        let categories: Vec<ChainCategory> = structure.chains().iter().map(|c| c.key.category).collect();
        assert_eq!(
            categories,
            vec![ChainCategory::Polymer, ChainCategory::Ligand, ChainCategory::Water]
        );
        assert!(structure.atoms().all(|(_, atom)| atom.author_chain_id == "A"));
    }

    #[test]
    fn parse_errors_carry_the_line_number() {
        let text = "\
HEADER    TEST
ATOM      1  CA  ALA A   1       0.000   bad     0.000  1.00  0.00           C
";
        match load_text(text, LoaderConfig::default()) {
            Err(LoadError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn cancelled_token_stops_the_load() {
        let token = CancellationToken::new();
        token.cancel();
        let loader = PdbLoader::default().with_cancellation(token);
        let result = loader.load_reader(
            Cursor::new(TWO_MODELS.as_bytes()),
            "memory.pdb",
            None,
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(LoadError::Cancelled(_))));
    }

    #[test]
    fn symmetry_operators_are_converted_with_the_unit_cell() {
        let text = "\
REMARK 290     SYMOP   SYMMETRY
REMARK 290    NNNMMM   OPERATOR
REMARK 290      1555   X,Y,Z
REMARK 290      2555   -X,-Y,Z+1/2
CRYST1   10.000   20.000   30.000  90.00  90.00  90.00 P 1 21 1      2
";
        let structure = load_text(text, LoaderConfig::default()).unwrap();
        let operators = structure.symmetry_operations();
        assert_eq!(operators.len(), 2);
        assert!((operators[0].rotation() - nalgebra::Matrix3::identity()).norm() < 1e-9);
        assert_eq!(operators[1].symmetry_shorthand.as_deref(), Some("2_555"));
        assert!((operators[1].translation().z - 15.0).abs() < 1e-6);
        assert!(operators[1].translation().x.abs() < 1e-12);
        assert!(operators[1].cell.is_some());
        assert_eq!(structure.unit_cell().unwrap().space_group, "P 1 21 1");
    }

    #[test]
    fn operators_with_combined_axes_are_skipped_without_failing_the_load() {
        let text = "\
CRYST1   50.000   50.000  100.000  90.00  90.00 120.00 P 61          6
REMARK 290     SYMOP   SYMMETRY
REMARK 290    NNNMMM   OPERATOR
REMARK 290      1555   X,Y,Z
REMARK 290      2555   -Y,X-Y,Z+1/3
REMARK 290      4555   -X,-Y,Z+1/2
ATOM      1  CA  ALA A   1      10.000   0.000   0.000  1.00  0.00           C
";
        let structure = load_text(text, LoaderConfig::default()).unwrap();
        let shorthands: Vec<Option<&str>> = structure
            .symmetry_operations()
            .iter()
            .map(|op| op.symmetry_shorthand.as_deref())
            .collect();
        assert_eq!(shorthands, vec![Some("1_555"), Some("4_555")]);
        assert_eq!(structure.component_count(ComponentType::Atom), 1);
    }

    #[test]
    fn progress_counts_raw_bytes_including_carriage_returns() {
        let text = "\
ATOM      1  CA  ALA A   1      10.000   0.000   0.000  1.00  0.00           C\r
ATOM      2  CB  ALA A   1      11.000   0.000   0.000  1.00  0.00           C\r
";
        let percents = std::sync::Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::Advanced { percent, .. } = event {
                percents.lock().unwrap().push(percent);
            }
        }));
        PdbLoader::default()
            .load_reader(Cursor::new(text.as_bytes()), "crlf.pdb", Some(text.len() as u64), &reporter)
            .unwrap();
        drop(reporter);
        assert_eq!(percents.into_inner().unwrap(), vec![Some(50), Some(100)]);
    }

    #[test]
    fn undecodable_byte_in_atom_columns_is_a_parse_error() {
        let mut bytes = b"HEADER    TEST\n".to_vec();
        bytes.extend_from_slice(b"ATOM      1  C");
        bytes.push(0xFF);
        bytes.extend_from_slice(b"  ALA A   1       1.000   2.000   3.000  1.00  0.00           C\n");
        let result = PdbLoader::default().load_reader(
            Cursor::new(bytes),
            "binary.pdb",
            None,
            &ProgressReporter::new(),
        );
        match result {
            Err(LoadError::Parse { line, kind }) => {
                assert_eq!(line, 2);
                assert_eq!(kind, ParseErrorKind::NonAsciiColumn { column: 15 });
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn biological_unit_reads_only_the_first_biomolecule() {
        let text = "\
REMARK 350 BIOMOLECULE: 1
REMARK 350 APPLY THE FOLLOWING TO CHAINS: A, B
REMARK 350   BIOMT1   1  1.000000  0.000000  0.000000        0.00000
REMARK 350   BIOMT2   1  0.000000  1.000000  0.000000        0.00000
REMARK 350   BIOMT3   1  0.000000  0.000000  1.000000        0.00000
REMARK 350 BIOMOLECULE: 2
REMARK 350 APPLY THE FOLLOWING TO CHAINS: C
REMARK 350   BIOMT1   1  1.000000  0.000000  0.000000        0.00000
REMARK 350   BIOMT2   1  0.000000  1.000000  0.000000        0.00000
REMARK 350   BIOMT3   1  0.000000  0.000000  1.000000        0.00000
";
        let structure = load_text(text, LoaderConfig::default()).unwrap();
        assert_eq!(structure.biological_unit().len(), 1);
        assert_eq!(structure.biological_unit()[0].chain_id.as_deref(), Some("A,B"));
    }

    #[test]
    fn given_ncs_operators_are_skipped() {
        let text = "\
MTRIX1   1  1.000000  0.000000  0.000000        0.00000    1
MTRIX2   1  0.000000  1.000000  0.000000        0.00000    1
MTRIX3   1  0.000000  0.000000  1.000000        0.00000    1
MTRIX1   2 -1.000000  0.000000  0.000000        5.00000
MTRIX2   2  0.000000 -1.000000  0.000000        0.00000
MTRIX3   2  0.000000  0.000000  1.000000        0.00000
";
        let structure = load_text(text, LoaderConfig::default()).unwrap();
        assert_eq!(structure.ncs_operations().len(), 1);
        assert_eq!(structure.ncs_operations()[0].id.as_deref(), Some("2"));
        assert_eq!(structure.ncs_operations()[0].translation().x, 5.0);
    }
}
