use flate2::Compression;
use flate2::write::GzEncoder;
use pdbkit::core::models::chain::ChainCategory;
use pdbkit::core::models::structure::{Component, ComponentType};
use pdbkit::core::utils::periodic::Element;
use pdbkit::engine::config::LoaderConfig;
use pdbkit::engine::error::LoadError;
use pdbkit::engine::loader::PdbLoader;
use pdbkit::engine::progress::{Progress, ProgressReporter};
use pdbkit::workflows;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::{TempDir, tempdir};

const HEMOGLOBIN: &str = "\
HEADER    OXYGEN TRANSPORT                        07-MAR-84   1ABC
COMPND    MOL_ID: 1;
COMPND   2 MOLECULE: HEMOGLOBIN ALPHA;
COMPND   3 CHAIN: A, B;
COMPND   4 MOL_ID: 2;
COMPND   5 MOLECULE: HEMOGLOBIN BETA;
COMPND   6 CHAIN: C;
ATOM      1  N   VAL A   1      10.000  10.000  10.000  1.00 20.00           N
ATOM      2  CA  VAL A   1      11.000  10.000  10.000  1.00 20.00           C
ATOM      3  CA  LEU B   2      12.000  10.000  10.000  1.00 20.00           C
ATOM      4  CA  HIS C   3      13.000  10.000  10.000  1.00 20.00           C
HETATM    5 FE   HEM C 142      14.000  10.000  10.000  1.00 20.00          FE
HETATM    6  O   HOH C 201      15.000  10.000  10.000  1.00 20.00           O
END
";

fn load_text(text: &str, config: LoaderConfig) -> Result<pdbkit::core::models::structure::Structure, LoadError> {
    PdbLoader::new(config).load_reader(
        Cursor::new(text.as_bytes().to_vec()),
        "memory.pdb",
        Some(text.len() as u64),
        &ProgressReporter::new(),
    )
}

fn write_fixture(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn compound_records_build_the_entity_map() {
    let structure = load_text(HEMOGLOBIN, LoaderConfig::default()).unwrap();

    let names: Vec<(u32, &str)> = structure
        .entity_names()
        .iter()
        .map(|(id, name)| (*id, name.as_str()))
        .collect();
    assert_eq!(names, vec![(1, "hemoglobin alpha"), (2, "hemoglobin beta")]);

    for (_, atom) in structure.atoms() {
        let expected = if atom.author_chain_id == "C" { 2 } else { 1 };
        assert_eq!(atom.entity_id, expected, "atom {}", atom.serial);
    }
}

#[test]
fn files_without_compound_records_use_entity_one() {
    let text = "ATOM      1  CA  GLY A   1       1.000   2.000   3.000  1.00  0.00           C\n";
    let structure = load_text(text, LoaderConfig::default()).unwrap();
    assert_eq!(structure.entity_name(1), Some(""));
    assert_eq!(structure.atom_at(0).unwrap().entity_id, 1);
}

#[test]
fn element_column_wins_and_name_is_the_fallback() {
    let text = "\
ATOM      1  CA  ALA A   1       1.000   2.000   3.000  1.00  0.00          CA
ATOM      2  CB  ALA A   1       1.000   2.000   3.000  1.00  0.00
HETATM    3 ZN1  ZN  A 301       1.000   2.000   3.000  1.00  0.00          ZN2+
";
    let structure = load_text(text, LoaderConfig::default()).unwrap();
    let elements: Vec<&str> = structure.atoms().map(|(_, atom)| atom.element.symbol()).collect();
    assert_eq!(elements, vec!["Ca", "C", "Zn"]);
}

#[test]
fn unknown_element_after_fallback_fails_the_whole_load() {
    let text = "\
ATOM      1  CA  ALA A   1       1.000   2.000   3.000  1.00  0.00           C
ATOM      2  XX  UNK A   2       1.000   2.000   3.000  1.00  0.00
";
    match load_text(text, LoaderConfig::default()) {
        Err(LoadError::Parse { line: 2, .. }) => {}
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn waters_and_ligands_never_share_a_chain() {
    let text = "\
HETATM    1  O   HOH A 201       1.000   2.000   3.000  1.00  0.00           O
HETATM    2  O   HOH A 202       2.000   2.000   3.000  1.00  0.00           O
HETATM    3  C1  NAG A 301       3.000   2.000   3.000  1.00  0.00           C
";
    let structure = load_text(text, LoaderConfig::default()).unwrap();
    let labels: Vec<String> = structure.atoms().map(|(_, atom)| atom.chain_id()).collect();
    assert_eq!(labels, vec!["A'~", "A'~", "A'"]);
    assert_eq!(structure.component_count(ComponentType::Chain), 2);
    assert_eq!(structure.chains()[0].key.category, ChainCategory::Water);
}

#[test]
fn progress_is_monotonic_and_completes_at_one_hundred() {
    let events = Mutex::new(Vec::new());
    let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
        events.lock().unwrap().push(event);
    }));
    PdbLoader::default()
        .load_reader(
            Cursor::new(HEMOGLOBIN.as_bytes().to_vec()),
            "memory.pdb",
            Some(HEMOGLOBIN.len() as u64),
            &reporter,
        )
        .unwrap();
    drop(reporter);

    let events = events.into_inner().unwrap();
    let percents: Vec<i32> = events.iter().filter_map(Progress::percent).collect();
    assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]), "{percents:?}");
    assert_eq!(events.last(), Some(&Progress::Completed));
    assert_eq!(percents.last(), Some(&100));
    assert_eq!(events.last().and_then(Progress::message), None);
    let advanced = events
        .iter()
        .filter(|event| matches!(event, Progress::Advanced { .. }))
        .count();
    assert_eq!(advanced, HEMOGLOBIN.lines().count());
}

#[test]
fn unknown_size_reports_indeterminate_progress() {
    let events = Mutex::new(Vec::new());
    let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
        events.lock().unwrap().push(event);
    }));
    PdbLoader::default()
        .load_reader(Cursor::new(HEMOGLOBIN.as_bytes().to_vec()), "stream", None, &reporter)
        .unwrap();
    drop(reporter);
    let events = events.into_inner().unwrap();
    assert!(
        events
            .iter()
            .filter(|event| matches!(event, Progress::Advanced { .. }))
            .all(|event| event.percent() == Some(-1))
    );
}

#[test]
fn load_path_reads_plain_and_gzip_files() {
    let dir = tempdir().unwrap();
    let plain = write_fixture(&dir, "1abc.pdb", HEMOGLOBIN);

    let gz_path = dir.path().join("1abc.pdb.gz");
    let mut encoder = GzEncoder::new(File::create(&gz_path).unwrap(), Compression::default());
    encoder.write_all(HEMOGLOBIN.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let loader = PdbLoader::default();
    let reporter = ProgressReporter::new();
    let from_plain = loader.load_path(&plain, &reporter).unwrap();
    let from_gzip = loader.load_path(&gz_path, &reporter).unwrap();

    assert_eq!(from_plain.component_count(ComponentType::Atom), 6);
    assert_eq!(from_gzip.component_count(ComponentType::Atom), 6);
    assert!(from_plain.source().starts_with("file:"));
    assert!(from_gzip.source().ends_with("1abc.pdb.gz"));
}

#[test]
fn load_by_name_accepts_paths_and_file_urls() {
    let dir = tempdir().unwrap();
    let path = write_fixture(&dir, "2xyz.ent", HEMOGLOBIN);
    let reporter = ProgressReporter::new();

    let by_path = workflows::load::run(path.to_str().unwrap(), &LoaderConfig::default(), &reporter, None).unwrap();
    let url = format!("file:{}", path.display());
    assert!(PdbLoader::can_load(&url));
    assert!(PdbLoader::can_load_path(&path));
    assert!(!PdbLoader::can_load_url(&url));
    assert!(PdbLoader::can_load_url("https://files.example.org/download/2xyz.pdb.gz"));
    let by_url = PdbLoader::default().load(&url, &reporter).unwrap();

    assert_eq!(
        by_path.component_count(ComponentType::Atom),
        by_url.component_count(ComponentType::Atom)
    );
}

#[test]
fn unusable_sources_produce_errors_not_structures() {
    let dir = tempdir().unwrap();
    let loader = PdbLoader::default();
    let reporter = ProgressReporter::new();

    let wrong_extension = write_fixture(&dir, "notes.txt", HEMOGLOBIN);
    assert!(!PdbLoader::can_load_path(&wrong_extension));
    assert!(matches!(
        loader.load_path(&wrong_extension, &reporter),
        Err(LoadError::Unsupported(_))
    ));

    let empty = write_fixture(&dir, "empty.pdb", "");
    assert!(matches!(loader.load_path(&empty, &reporter), Err(LoadError::EmptySource(_))));

    let missing = dir.path().join("missing.pdb");
    assert!(!PdbLoader::can_load_path(&missing));
    assert!(matches!(loader.load_path(&missing, &reporter), Err(LoadError::Io { .. })));

    assert!(matches!(
        loader.load("http://example.org/readme.txt", &reporter),
        Err(LoadError::Unsupported(_))
    ));
    assert!(matches!(
        loader.load("ftp://example.org/1abc.pdb", &reporter),
        Err(LoadError::UnsupportedScheme { .. })
    ));
}

#[test]
fn components_are_fetched_by_category_and_index() {
    let structure = load_text(HEMOGLOBIN, LoaderConfig::default()).unwrap();
    assert_eq!(structure.component_count(ComponentType::Atom), 6);
    assert_eq!(structure.component_count(ComponentType::Bond), 0);

    match structure.component(ComponentType::Atom, 4) {
        Some(Component::Atom(_, atom)) => {
            assert_eq!(atom.element, Element::from_symbol("FE").unwrap());
            assert_eq!(atom.chain_id(), "C'");
            assert_eq!(atom.author_chain_id, "C");
            assert_eq!(atom.residue_number, 142);
        }
        other => panic!("unexpected component {other:?}"),
    }
    assert!(structure.component(ComponentType::Atom, 6).is_none());
}
