//! Source columns the pipeline keeps, with the headers used by the published dataset

pub const NAME: &str = "name";
pub const STAGE: &str = "stage";
pub const WORK_TYPE: &str = "type";
pub const RESPONSIBLE_AREA: &str = "responsible_area";
pub const CONTRACT_AMOUNT: &str = "contract_amount";
pub const DISTRICT: &str = "district";
pub const NEIGHBORHOOD: &str = "neighborhood";
pub const START_DATE: &str = "start_date";
pub const INITIAL_END_DATE: &str = "initial_end_date";
pub const DURATION_MONTHS: &str = "duration_months";
pub const PERCENT_COMPLETE: &str = "percent_complete";
pub const TENDER_COMPANY: &str = "tender_company";
pub const CONTRACT_TYPE: &str = "contract_type";
pub const CONTRACT_NUMBER: &str = "contract_number";
pub const LABOR_HEADCOUNT: &str = "labor_headcount";
pub const FEATURED: &str = "featured";
pub const CASE_NUMBER: &str = "case_number";
pub const FUNDING_SOURCE: &str = "funding_source";

/// A retained column and the header it carries in the Spanish export
#[derive(Debug, Clone, Copy)]
pub struct SourceColumn {
    pub name: &'static str,
    pub alias: &'static str,
}

const fn col(name: &'static str, alias: &'static str) -> SourceColumn {
    SourceColumn { name, alias }
}

/// The 18 retained columns, in output order
pub static SOURCE_COLUMNS: &[SourceColumn] = &[
    col(NAME, "nombre"),
    col(STAGE, "etapa"),
    col(WORK_TYPE, "tipo"),
    col(RESPONSIBLE_AREA, "area_responsable"),
    col(CONTRACT_AMOUNT, "monto_contrato"),
    col(DISTRICT, "comuna"),
    col(NEIGHBORHOOD, "barrio"),
    col(START_DATE, "fecha_inicio"),
    col(INITIAL_END_DATE, "fecha_fin_inicial"),
    col(DURATION_MONTHS, "plazo_meses"),
    col(PERCENT_COMPLETE, "porcentaje_avance"),
    col(TENDER_COMPANY, "licitacion_oferta_empresa"),
    col(CONTRACT_TYPE, "contratacion_tipo"),
    col(CONTRACT_NUMBER, "nro_contratacion"),
    col(LABOR_HEADCOUNT, "mano_obra"),
    col(FEATURED, "destacada"),
    col(CASE_NUMBER, "expediente-numero"),
    col(FUNDING_SOURCE, "financiamiento"),
];

/// Rows missing any of these are dropped by the cleaner
pub static REQUIRED_COLUMNS: &[&str] = &[DISTRICT, NEIGHBORHOOD, FEATURED];

/// Resolve a raw header (canonical or Spanish) to its canonical name
pub fn canonical_name(header: &str) -> Option<&'static str> {
    let header = header.trim();
    SOURCE_COLUMNS
        .iter()
        .find(|c| c.name == header || c.alias == header)
        .map(|c| c.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("comuna"), Some(DISTRICT));
        assert_eq!(canonical_name("district"), Some(DISTRICT));
        assert_eq!(canonical_name("expediente-numero"), Some(CASE_NUMBER));
        assert_eq!(canonical_name("lat"), None);
    }

    #[test]
    fn test_eighteen_columns() {
        assert_eq!(SOURCE_COLUMNS.len(), 18);
    }
}
