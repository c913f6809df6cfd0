//! Table schema definitions for the public works database

use super::types::*;

// =============================================================================
// Reference Tables (lookup values derived from the dataset)
// =============================================================================

pub static STAGE: TableSchema = TableSchema {
    name: "stage",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Varchar(25)).unique(),
    ],
    foreign_keys: &[],
};

pub static WORK_TYPE: TableSchema = TableSchema {
    name: "work_type",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Varchar(40)).unique(),
    ],
    foreign_keys: &[],
};

pub static RESPONSIBLE_AREA: TableSchema = TableSchema {
    name: "responsible_area",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Varchar(60)).unique(),
    ],
    foreign_keys: &[],
};

pub static DISTRICT: TableSchema = TableSchema {
    name: "district",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("number", ColumnType::Integer).unique(),
    ],
    foreign_keys: &[],
};

pub static NEIGHBORHOOD: TableSchema = TableSchema {
    name: "neighborhood",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Varchar(25)).unique(),
        Column::required("district_id", ColumnType::Integer),
    ],
    foreign_keys: &[ForeignKey::new("district_id", "district")],
};

pub static COMPANY: TableSchema = TableSchema {
    name: "company",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Varchar(80)).unique(),
    ],
    foreign_keys: &[],
};

pub static CONTRACT_TYPE: TableSchema = TableSchema {
    name: "contract_type",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Varchar(40)).unique(),
    ],
    foreign_keys: &[],
};

// Some rows carry no funding label, so the name may be NULL.
pub static FUNDING_SOURCE: TableSchema = TableSchema {
    name: "funding_source",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("name", ColumnType::Varchar(30)).unique(),
    ],
    foreign_keys: &[],
};

// =============================================================================
// Fact Table
// =============================================================================

pub static PROJECT: TableSchema = TableSchema {
    name: "project",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("name", ColumnType::Varchar(100)).unique(),
        Column::new("contract_amount", ColumnType::Real),
        Column::new("start_date", ColumnType::Date),
        Column::new("initial_end_date", ColumnType::Date),
        Column::new("duration_months", ColumnType::Real),
        Column::new("percent_complete", ColumnType::Integer),
        Column::new("contract_number", ColumnType::Varchar(35)),
        Column::new("labor_headcount", ColumnType::Integer),
        Column::new("featured", ColumnType::Varchar(2)),
        Column::new("case_number", ColumnType::Varchar(50)),
        Column::required("stage_id", ColumnType::Integer),
        Column::required("work_type_id", ColumnType::Integer),
        Column::required("responsible_area_id", ColumnType::Integer),
        Column::required("district_id", ColumnType::Integer),
        Column::new("neighborhood_id", ColumnType::Integer),
        Column::new("company_id", ColumnType::Integer),
        Column::new("contract_type_id", ColumnType::Integer),
        Column::new("funding_source_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("stage_id", "stage"),
        ForeignKey::new("work_type_id", "work_type"),
        ForeignKey::new("responsible_area_id", "responsible_area"),
        ForeignKey::new("district_id", "district"),
        ForeignKey::new("neighborhood_id", "neighborhood"),
        ForeignKey::new("company_id", "company"),
        ForeignKey::new("contract_type_id", "contract_type"),
        ForeignKey::new("funding_source_id", "funding_source"),
    ],
};

// =============================================================================
// Schema Registry
// =============================================================================

/// All table schemas. Creation order is computed by `DependencyResolver`.
pub static ALL_TABLES: &[&TableSchema] = &[
    &PROJECT,
    &STAGE,
    &WORK_TYPE,
    &RESPONSIBLE_AREA,
    &NEIGHBORHOOD,
    &DISTRICT,
    &COMPANY,
    &CONTRACT_TYPE,
    &FUNDING_SOURCE,
];

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}
