/// How a column's values are stored and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
    Bool,
    /// RFC 3339 instant.
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Services,
    Appointments,
    Profiles,
}

const SERVICES: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Text),
    ("name", ColumnKind::Text),
    ("description", ColumnKind::Text),
    ("price", ColumnKind::Real),
    ("duration", ColumnKind::Integer),
    ("is_active", ColumnKind::Bool),
    ("created_at", ColumnKind::Timestamp),
];

const APPOINTMENTS: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Text),
    ("user_id", ColumnKind::Text),
    ("service_id", ColumnKind::Text),
    ("appointment_date", ColumnKind::Timestamp),
    ("notes", ColumnKind::Text),
    ("status", ColumnKind::Text),
    ("created_at", ColumnKind::Timestamp),
];

const PROFILES: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Text),
    ("user_id", ColumnKind::Text),
    ("full_name", ColumnKind::Text),
    ("phone", ColumnKind::Text),
    ("avatar_url", ColumnKind::Text),
    ("created_at", ColumnKind::Timestamp),
];

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Services => "services",
            Table::Appointments => "appointments",
            Table::Profiles => "profiles",
        }
    }

    pub fn columns(&self) -> &'static [(&'static str, ColumnKind)] {
        match self {
            Table::Services => SERVICES,
            Table::Appointments => APPOINTMENTS,
            Table::Profiles => PROFILES,
        }
    }

    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.columns()
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, kind)| *kind)
    }

    /// Resolves a column name, failing for anything outside the table's schema.
    /// Backends only ever put names that passed this check into a request.
    pub fn check_column(&self, column: &str) -> anyhow::Result<ColumnKind> {
        self.column_kind(column)
            .ok_or_else(|| anyhow::anyhow!("unknown column {}.{column}", self.name()))
    }
}
