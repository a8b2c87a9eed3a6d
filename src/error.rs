use crate::model::{Role, SourceKind};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a reconciliation pass. No partial report is produced for any of them.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The source could not be read or decoded into a sheet.
    #[error("Unable to read the {kind} file: {message}")]
    Decode { kind: SourceKind, message: String },

    /// One or more of the required columns could not be found by keyword or by position.
    #[error("Could not find the {} column(s) in the {kind} file", join_roles(.missing))]
    ColumnResolution { kind: SourceKind, missing: Vec<Role> },

    /// There are no rows below the header row.
    #[error("The {kind} file has no data rows")]
    EmptySheet { kind: SourceKind },

    #[error("No files have been processed yet")]
    NotLoaded,
}

impl ReconcileError {
    pub(crate) fn decode(kind: SourceKind, message: impl std::fmt::Display) -> Self {
        Self::Decode {
            kind,
            message: message.to_string(),
        }
    }
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = ReconcileError::ColumnResolution {
            kind: SourceKind::TimeLabor,
            missing: vec![Role::Id, Role::Hours],
        };
        assert_eq!(
            e.to_string(),
            "Could not find the id, hours column(s) in the Time & Labor file"
        );
        let e = ReconcileError::EmptySheet {
            kind: SourceKind::Tempo,
        };
        assert_eq!(e.to_string(), "The Tempo file has no data rows");
    }
}
