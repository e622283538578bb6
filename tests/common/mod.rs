//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use agrorisk::model::TrainerConfig;
use agrorisk::pipeline::loader::DataSource;
use agrorisk::RiskConfig;

/// Sheet name used by directory fixtures
pub const SHEET: &str = "COLOCACIONES_BIOCREDITOS";

const REGIONS: [&str; 3] = ["Cusco", "Junín", "San Martín"];
const ACTIVITIES: [&str; 3] = ["Café", "Cacao", "Plátano"];
const YES_FORMS: [&str; 4] = ["Sí", "SI", "si", "Sí"];
const NO_FORMS: [&str; 3] = ["No", "NO", "no"];

/// Raw disbursement sheet with the real headers, seeded random content.
///
/// `omit` lists raw headers to leave out. A `PAGARE` column is always present
/// so loaders have something to drop.
pub fn create_loan_sheet(rows: usize, seed: u64, omit: &[&str]) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);

    let flag = |p: f64, rng: &mut StdRng| -> String {
        if rng.gen_bool(p) {
            YES_FORMS[rng.gen_range(0..YES_FORMS.len())].to_string()
        } else {
            NO_FORMS[rng.gen_range(0..NO_FORMS.len())].to_string()
        }
    };

    let text = |choices: &[&str], rng: &mut StdRng| -> Vec<String> {
        (0..rows)
            .map(|_| choices[rng.gen_range(0..choices.len())].to_string())
            .collect()
    };

    let region = text(&REGIONS, &mut rng);
    let activity = text(&ACTIVITIES, &mut rng);
    let sex = text(&["Masculino", "Femenino"], &mut rng);
    let destination = text(&["Capital de trabajo", "Activo fijo"], &mut rng);

    let amount: Vec<f64> = (0..rows).map(|_| rng.gen_range(2_000.0..40_000.0)).collect();
    let term: Vec<i64> = (0..rows).map(|_| [6, 12, 18, 24, 36][rng.gen_range(0..5)]).collect();
    let tea: Vec<f64> = (0..rows).map(|_| rng.gen_range(0.12..0.35)).collect();
    let area_cultivated: Vec<f64> = (0..rows).map(|_| rng.gen_range(0.5..8.0)).collect();
    let area_total: Vec<f64> = area_cultivated
        .iter()
        .map(|a| a + rng.gen_range(0.0..5.0))
        .collect();
    let saf_age: Vec<i64> = (0..rows).map(|_| rng.gen_range(1..15)).collect();

    let flags =
        |p: f64, rng: &mut StdRng| -> Vec<String> { (0..rows).map(|_| flag(p, rng)).collect() };
    let deforest = flags(0.7, &mut rng);
    let outside_anp = flags(0.8, &mut rng);
    let saf = flags(0.5, &mut rng);
    let fertilizer = flags(0.5, &mut rng);
    let pests = flags(0.4, &mut rng);
    let new_client = flags(0.3, &mut rng);

    let ids: Vec<i64> = (1..=rows as i64).collect();
    let names: Vec<String> = (0..rows).map(|i| format!("Cliente {}", i)).collect();
    let dni: Vec<String> = (0..rows).map(|i| format!("{:08}", 40_000_000 + i)).collect();
    let disbursed: Vec<String> = (0..rows).map(|i| format!("2024-{:02}-15", i % 12 + 1)).collect();
    let matures: Vec<String> = (0..rows).map(|i| format!("2025-{:02}-15", i % 12 + 1)).collect();
    let constant = |value: &str| -> Vec<String> { vec![value.to_string(); rows] };

    let columns = vec![
        Column::new("NUMERO".into(), ids),
        Column::new("REGION (1)".into(), region),
        Column::new("PROVINCIA (2)".into(), constant("La Convención")),
        Column::new("DISTRITO (3)".into(), constant("Echarati")),
        Column::new("CASERIO/SECTOR (4)".into(), constant("Sector 1")),
        Column::new("AGENCIA ENTIDAD FINANCIERA (5)".into(), constant("Agencia Echarati")),
        Column::new("NOMBRES Y APELLIDOS DEL CLIENTE (6)".into(), names),
        Column::new("SEXO PROPIETARIO DEL NEGOCIO (7)".into(), sex),
        Column::new("MONTO DEL CRÉDITO (S/.) (8)".into(), amount),
        Column::new("DNI/RUC (9)".into(), dni),
        Column::new("FECHA DESEMBOLSO (10)".into(), disbursed),
        Column::new("FECHA VENCIMIENTO (11)".into(), matures),
        Column::new("Meses".into(), term),
        Column::new(
            "DESTINO DEL CRÉDITO : ACTIVO FIJO / CAPITAL DE TRABAJO (12)".into(),
            destination,
        ),
        Column::new("ACTIVIDAD PRINCIPAL  DEL CLIENTE (13)".into(), activity),
        Column::new("TIPO DE CRÉDITO (15)".into(), constant("Convencional")),
        Column::new("TEA (16)".into(), tea),
        Column::new("COORDENADAS UTM (17)".into(), constant("18L 0745000 8580000")),
        Column::new("ÁREA TOTAL (HA) (18)".into(), area_total),
        Column::new("ÁREA A CULTIVAR (HA) (19)".into(), area_cultivated),
        Column::new("PREDIO LIBRE DEFORESTACIÓN (20)".into(), deforest),
        Column::new("PREDIO FUERA DE ZONAS DE ANP (21)".into(), outside_anp),
        Column::new("PREDIO CON (SAF) (22)".into(), saf),
        Column::new("EDAD DEL SAF (23)".into(), saf_age),
        Column::new("USO DE ABONOS SOSTENIBLES (24)".into(), fertilizer),
        Column::new("MANEJO INTEGRADO DE PLAGAS (25)".into(), pests),
        Column::new("CLIENTE  NUEVO (28)".into(), new_client),
        Column::new("PAGARE".into(), constant("P-001")),
    ];

    let kept: Vec<Column> = columns
        .into_iter()
        .filter(|c| !omit.contains(&c.name().as_str()))
        .collect();
    DataFrame::new(kept).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");
    write_csv(df, &csv_path);
    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

pub fn write_csv(df: &mut DataFrame, path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut file = std::fs::File::create(path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
}

/// Workbook-style directory: `<dir>/data/<SHEET>.csv`, artifact under `<dir>/models`
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new(sheet: &mut DataFrame) -> Self {
        let dir = TempDir::new().unwrap();
        write_csv(sheet, &dir.path().join("data").join(format!("{}.csv", SHEET)));
        Self { dir }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn artifact(&self) -> PathBuf {
        self.dir.path().join("models").join("modelo_crediticio.json")
    }

    /// Small forests so tests stay fast
    pub fn config(&self, trees: usize) -> RiskConfig {
        RiskConfig::default()
            .with_data(DataSource::new(self.data_dir(), SHEET))
            .with_artifact_path(self.artifact())
            .with_trainer(TrainerConfig::default().with_trees(trees))
    }
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}
