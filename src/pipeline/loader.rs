//! Historical loan record loader for CSV and Parquet sheets

use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::fields::{
    canonical_name, role_of, FieldRole, AGE_COLUMN, DEFAULT_AGE, DROPPED_COLUMNS,
};
use super::flags::YesNo;
use crate::error::{Result, RiskError};

/// Rows used for CSV schema inference
const INFER_SCHEMA_LENGTH: usize = 10_000;

/// Default workbook export holding one file per sheet
pub const DEFAULT_DATA_PATH: &str = "data/AVANCE_BIOCREDITOS_Y_AGROPROTECTOR";

/// Sheet with the disbursement records
pub const DEFAULT_SHEET: &str = "COLOCACIONES_BIOCREDITOS";

/// Where the historical records live.
///
/// `path` is either a single `.csv`/`.parquet` file or a directory holding one
/// file per sheet, in which case `sheet` selects `<dir>/<sheet>.csv` or
/// `<dir>/<sheet>.parquet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub path: PathBuf,
    pub sheet: String,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
        }
    }

    /// Resolve the concrete file to read
    pub fn resolve(&self) -> Result<PathBuf> {
        if self.path.is_file() {
            return Ok(self.path.clone());
        }
        if self.path.is_dir() {
            for extension in ["csv", "parquet"] {
                let candidate = self.path.join(format!("{}.{}", self.sheet, extension));
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }
        Err(RiskError::DataSourceNotFound {
            path: self.path.clone(),
            sheet: self.sheet.clone(),
        })
    }
}

impl Default for DataSource {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_PATH, DEFAULT_SHEET)
    }
}

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path) -> Result<DataFrame> {
    Ok(scan_dataset(path)?.collect()?)
}

fn scan_dataset(path: &Path) -> Result<LazyFrame> {
    if !path.is_file() {
        return Err(RiskError::DataSourceNotFound {
            path: path.to_path_buf(),
            sheet: String::new(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(INFER_SCHEMA_LENGTH))
            .finish()?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())?,
        _ => return Err(RiskError::UnsupportedFormat { extension }),
    };

    Ok(lf)
}

/// Canonical column names the sheet provides, read from its header only.
///
/// Mirrors the column set [`clean_loan_records`] produces: headers renamed,
/// ignored columns dropped, the age column always present.
pub fn source_columns(source: &DataSource) -> Result<Vec<String>> {
    let path = source.resolve()?;
    let schema = scan_dataset(&path)?.collect_schema()?;

    let mut columns: Vec<String> = schema
        .iter_names()
        .map(|header| canonical_name(header).unwrap_or(header.as_str()).to_string())
        .filter(|name| !DROPPED_COLUMNS.contains(&name.as_str()))
        .collect();
    if !columns.iter().any(|c| c == AGE_COLUMN) {
        columns.push(AGE_COLUMN.to_string());
    }
    Ok(columns)
}

/// Load the loan sheet and return a cleaned table with canonical columns
/// and no missing values.
pub fn load_loan_records(source: &DataSource) -> Result<DataFrame> {
    let path = source.resolve()?;
    info!(path = %path.display(), sheet = %source.sheet, "Loading loan records");

    let raw = load_dataset(&path)?;
    let raw_rows = raw.height();
    let cleaned = clean_loan_records(raw)?;

    info!(
        rows = cleaned.height(),
        dropped = raw_rows - cleaned.height(),
        columns = cleaned.width(),
        "Loan records ready"
    );
    Ok(cleaned)
}

/// Canonicalize a raw sheet: rename headers, drop ignored columns, synthesize
/// the age column, coerce canonical types, drop incomplete rows and normalize
/// Yes/No flags.
pub fn clean_loan_records(mut df: DataFrame) -> Result<DataFrame> {
    rename_source_columns(&mut df)?;

    for dropped in DROPPED_COLUMNS {
        if has_column(&df, dropped) {
            df = df.drop(dropped)?;
        }
    }

    // Age is optional in the sheet; a constant keeps otherwise complete rows
    if !has_column(&df, AGE_COLUMN) {
        let ages = vec![DEFAULT_AGE; df.height()];
        df.with_column(Column::new(AGE_COLUMN.into(), ages))?;
    }

    coerce_canonical_types(&mut df)?;

    let df = df.drop_nulls::<String>(None)?;
    normalize_flags(df)
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

fn rename_source_columns(df: &mut DataFrame) -> Result<()> {
    for header in column_names(df) {
        if let Some(canonical) = canonical_name(&header) {
            debug!(from = %header, to = canonical, "Renaming column");
            df.rename(&header, canonical.into())?;
        }
    }
    Ok(())
}

/// Numeric canonical columns become f64 (unparseable cells turn null and the
/// row is dropped); text canonical columns become strings.
fn coerce_canonical_types(df: &mut DataFrame) -> Result<()> {
    for name in column_names(df) {
        let target_type = match role_of(&name) {
            Some(FieldRole::Numeric) => DataType::Float64,
            Some(FieldRole::Text) => DataType::String,
            _ => continue,
        };
        let column = df.column(&name)?;
        if column.dtype() != &target_type {
            let cast = column.cast(&target_type)?;
            df.with_column(cast)?;
        }
    }
    Ok(())
}

fn normalize_flags(mut df: DataFrame) -> Result<DataFrame> {
    for name in column_names(&df) {
        if role_of(&name) != Some(FieldRole::Flag) {
            continue;
        }
        let labels = flag_labels(df.column(&name)?)?;
        df.with_column(Column::new(name.as_str().into(), labels))?;
    }
    Ok(df)
}

/// Read any flag column as `Sí`/`No` labels
fn flag_labels(col: &Column) -> Result<Vec<&'static str>> {
    let values: Vec<YesNo> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(YesNo::from_text).unwrap_or(YesNo::No))
            .collect(),
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(YesNo::from_bool).unwrap_or(YesNo::No))
            .collect(),
        dtype if dtype.is_primitive_numeric() => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(YesNo::from_number).unwrap_or(YesNo::No))
                .collect()
        }
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(YesNo::from_text).unwrap_or(YesNo::No))
                .collect()
        }
    };

    Ok(values.into_iter().map(YesNo::as_str).collect())
}
