//! Canonical field table
//!
//! One place that ties together the raw sheet headers, the canonical column
//! names used throughout the pipeline, and the scoring-payload keys with their
//! defaults.

use super::flags::YesNo;

/// How a canonical column participates in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Who the loan belongs to; never a feature
    Identity,
    /// Disbursement / maturity dates; never a feature
    Date,
    Numeric,
    Text,
    /// Yes/No answer normalized through [`YesNo`]
    Flag,
}

impl FieldRole {
    /// Whether columns with this role can be model inputs
    pub fn is_predictive(self) -> bool {
        !matches!(self, FieldRole::Identity | FieldRole::Date)
    }
}

/// A raw sheet header and the canonical column it maps to
#[derive(Debug, Clone, Copy)]
pub struct SourceColumn {
    pub header: &'static str,
    pub column: &'static str,
    pub role: FieldRole,
}

const fn source(header: &'static str, column: &'static str, role: FieldRole) -> SourceColumn {
    SourceColumn {
        header,
        column,
        role,
    }
}

/// Raw headers of the disbursement sheet, mapped 1:1 to canonical columns
pub const SOURCE_COLUMNS: &[SourceColumn] = &[
    source("NUMERO", "ID", FieldRole::Identity),
    source("REGION (1)", "REGION", FieldRole::Text),
    source("PROVINCIA (2)", "PROVINCIA", FieldRole::Text),
    source("DISTRITO (3)", "DISTRITO", FieldRole::Text),
    source("CASERIO/SECTOR (4)", "CASERIO_SECTOR", FieldRole::Text),
    source("AGENCIA ENTIDAD FINANCIERA (5)", "AGENCIA", FieldRole::Text),
    source("NOMBRES Y APELLIDOS DEL CLIENTE (6)", "NOMBRE_CLIENTE", FieldRole::Identity),
    source("SEXO PROPIETARIO DEL NEGOCIO (7)", "SEXO", FieldRole::Text),
    source("MONTO DEL CRÉDITO (S/.) (8)", "MONTO_CREDITO", FieldRole::Numeric),
    source("DNI/RUC (9)", "DNI", FieldRole::Identity),
    source("FECHA DESEMBOLSO (10)", "FECHA_DESEMBOLSO", FieldRole::Date),
    source("FECHA VENCIMIENTO (11)", "FECHA_VENCIMIENTO", FieldRole::Date),
    source("Meses", "PLAZO_MESES", FieldRole::Numeric),
    source(
        "DESTINO DEL CRÉDITO : ACTIVO FIJO / CAPITAL DE TRABAJO (12)",
        "DESTINO_CREDITO",
        FieldRole::Text,
    ),
    source("ACTIVIDAD PRINCIPAL  DEL CLIENTE (13)", "ACTIVIDAD_PRINCIPAL", FieldRole::Text),
    source("TIPO DE CRÉDITO (15)", "TIPO_CREDITO", FieldRole::Text),
    source("TEA (16)", "TEA", FieldRole::Numeric),
    source("COORDENADAS UTM (17)", "COORDENADAS", FieldRole::Text),
    source("ÁREA TOTAL (HA) (18)", "AREA_TOTAL", FieldRole::Numeric),
    source("ÁREA A CULTIVAR (HA) (19)", "AREA_CULTIVAR", FieldRole::Numeric),
    source("PREDIO LIBRE DEFORESTACIÓN (20)", "PREDIO_LIBRE_DEFOREST", FieldRole::Flag),
    source("PREDIO FUERA DE ZONAS DE ANP (21)", "PREDIO_FUERA_ANP", FieldRole::Flag),
    source("PREDIO CON (SAF) (22)", "PREDIO_SAF", FieldRole::Flag),
    source("EDAD DEL SAF (23)", "EDAD_SAF", FieldRole::Numeric),
    source("USO DE ABONOS SOSTENIBLES (24)", "USO_ABONOS", FieldRole::Flag),
    source("MANEJO INTEGRADO DE PLAGAS (25)", "MANEJO_PLAGAS", FieldRole::Flag),
    source("CLIENTE  NUEVO (28)", "CLIENTE_NUEVO", FieldRole::Flag),
];

/// Applicant age; optional in the sheet and synthesized when absent
pub const AGE_COLUMN: &str = "EDAD";

/// Age assumed for every row when the sheet has no age column
pub const DEFAULT_AGE: f64 = 35.0;

/// Columns removed on load when present
pub const DROPPED_COLUMNS: &[&str] = &["PAGARE"];

/// Canonical column names used by the labeler
pub mod col {
    pub const MONTO_CREDITO: &str = "MONTO_CREDITO";
    pub const PLAZO_MESES: &str = "PLAZO_MESES";
    pub const AREA_CULTIVAR: &str = "AREA_CULTIVAR";
    pub const CLIENTE_NUEVO: &str = "CLIENTE_NUEVO";
    pub const USO_ABONOS: &str = "USO_ABONOS";
    pub const MANEJO_PLAGAS: &str = "MANEJO_PLAGAS";
    pub const PREDIO_SAF: &str = "PREDIO_SAF";
    pub const PREDIO_LIBRE_DEFOREST: &str = "PREDIO_LIBRE_DEFOREST";
    pub const EDAD: &str = super::AGE_COLUMN;
}

/// Default applied when a payload key is omitted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayloadDefault {
    Number(f64),
    Text(&'static str),
    Flag(YesNo),
    /// Total area falls back to the cultivated area when that is given and non-zero, else 1 ha
    CultivatedAreaOr(f64),
}

/// A scoring-payload key and the canonical column it fills
#[derive(Debug, Clone, Copy)]
pub struct PayloadField {
    pub key: &'static str,
    pub column: &'static str,
    pub default: PayloadDefault,
}

impl PayloadField {
    pub fn role(&self) -> FieldRole {
        match self.default {
            PayloadDefault::Number(_) | PayloadDefault::CultivatedAreaOr(_) => FieldRole::Numeric,
            PayloadDefault::Text(_) => FieldRole::Text,
            PayloadDefault::Flag(_) => FieldRole::Flag,
        }
    }
}

const fn payload(key: &'static str, column: &'static str, default: PayloadDefault) -> PayloadField {
    PayloadField {
        key,
        column,
        default,
    }
}

/// Payload key used for the cultivated area (also the fallback for total area)
pub const CULTIVATED_AREA_KEY: &str = "area_cultivar";

/// Every field the row builder knows how to fill, in canonical sheet order
pub const PAYLOAD_FIELDS: &[PayloadField] = &[
    payload("region", "REGION", PayloadDefault::Text("Cusco")),
    payload("provincia", "PROVINCIA", PayloadDefault::Text("La Convención")),
    payload("distrito", "DISTRITO", PayloadDefault::Text("Echarati")),
    payload("caserio_sector", "CASERIO_SECTOR", PayloadDefault::Text("N/A")),
    payload("agencia", "AGENCIA", PayloadDefault::Text("Agencia Echarati")),
    payload("sexo", "SEXO", PayloadDefault::Text("Masculino")),
    payload("monto_credito", "MONTO_CREDITO", PayloadDefault::Number(0.0)),
    payload("plazo_meses", "PLAZO_MESES", PayloadDefault::Number(12.0)),
    payload("destino_credito", "DESTINO_CREDITO", PayloadDefault::Text("Capital de trabajo")),
    payload("actividad_principal", "ACTIVIDAD_PRINCIPAL", PayloadDefault::Text("Café")),
    payload("tipo_credito", "TIPO_CREDITO", PayloadDefault::Text("Convencional")),
    payload("tea", "TEA", PayloadDefault::Number(0.0)),
    payload("coordenadas", "COORDENADAS", PayloadDefault::Text("0,0")),
    payload("area_total", "AREA_TOTAL", PayloadDefault::CultivatedAreaOr(1.0)),
    payload(CULTIVATED_AREA_KEY, "AREA_CULTIVAR", PayloadDefault::Number(1.0)),
    payload("predio_libre_deforest", "PREDIO_LIBRE_DEFOREST", PayloadDefault::Flag(YesNo::No)),
    payload("predio_fuera_anp", "PREDIO_FUERA_ANP", PayloadDefault::Flag(YesNo::No)),
    payload("predio_saf", "PREDIO_SAF", PayloadDefault::Flag(YesNo::No)),
    payload("edad_saf", "EDAD_SAF", PayloadDefault::Number(1.0)),
    payload("uso_abonos", "USO_ABONOS", PayloadDefault::Flag(YesNo::No)),
    payload("manejo_plagas", "MANEJO_PLAGAS", PayloadDefault::Flag(YesNo::No)),
    payload("cliente_nuevo", "CLIENTE_NUEVO", PayloadDefault::Flag(YesNo::No)),
    payload("edad", AGE_COLUMN, PayloadDefault::Number(DEFAULT_AGE)),
];

/// Sentinel for categorical bundle columns the row builder has no payload field for
pub const UNMAPPED_CATEGORY: &str = "N/A";

/// Role of a canonical column, `None` for columns outside the canonical set
pub fn role_of(column: &str) -> Option<FieldRole> {
    if column == AGE_COLUMN {
        return Some(FieldRole::Numeric);
    }
    SOURCE_COLUMNS
        .iter()
        .find(|c| c.column == column)
        .map(|c| c.role)
}

/// Payload field filling a canonical column
pub fn payload_field(column: &str) -> Option<&'static PayloadField> {
    PAYLOAD_FIELDS.iter().find(|f| f.column == column)
}

/// Look up the canonical column for a raw header
pub fn canonical_name(header: &str) -> Option<&'static str> {
    SOURCE_COLUMNS
        .iter()
        .find(|c| c.header == header)
        .map(|c| c.column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_canonical_columns_are_unique() {
        let names: HashSet<&str> = SOURCE_COLUMNS.iter().map(|c| c.column).collect();
        assert_eq!(names.len(), SOURCE_COLUMNS.len());
        let headers: HashSet<&str> = SOURCE_COLUMNS.iter().map(|c| c.header).collect();
        assert_eq!(headers.len(), SOURCE_COLUMNS.len());
    }

    #[test]
    fn test_every_payload_field_is_predictive_and_role_consistent() {
        for field in PAYLOAD_FIELDS {
            let role = role_of(field.column).expect("payload column must be canonical");
            assert!(role.is_predictive(), "{} should be predictive", field.column);
            assert_eq!(role, field.role(), "role mismatch for {}", field.column);
        }
    }

    #[test]
    fn test_every_predictive_source_column_has_payload_field() {
        for source in SOURCE_COLUMNS.iter().filter(|c| c.role.is_predictive()) {
            assert!(
                payload_field(source.column).is_some(),
                "{} has no payload field",
                source.column
            );
        }
        assert!(payload_field(AGE_COLUMN).is_some());
    }

    #[test]
    fn test_lookups() {
        assert_eq!(canonical_name("Meses"), Some("PLAZO_MESES"));
        assert_eq!(canonical_name("CLIENTE  NUEVO (28)"), Some("CLIENTE_NUEVO"));
        assert_eq!(canonical_name("CLIENTE NUEVO (28)"), None);
        assert_eq!(role_of("DNI"), Some(FieldRole::Identity));
        assert_eq!(role_of("EDAD"), Some(FieldRole::Numeric));
        assert_eq!(role_of("EXTRA"), None);
    }
}
