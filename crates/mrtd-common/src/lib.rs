//! MRTD Common - Shared data structures and utilities for eMRTD reading
//!
//! Holds the pieces every other crate agrees on: the closed set of
//! elementary files a travel document exposes, the fixed caller-facing
//! `EF_*` name table, and the date forms used by BAC key derivation.

use std::fmt;

pub mod date;

pub use date::{expand, normalize, Date6, Date8, DateError, DateKind, SUPPORTED_YEARS};

/// Elementary file identifier on an ICAO 9303 travel document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataGroupId {
    CardAccess,
    Com,
    Sod,
    Dg1,
    Dg2,
    Dg3,
    Dg4,
    Dg5,
    Dg6,
    Dg7,
    Dg8,
    Dg9,
    Dg10,
    Dg11,
    Dg12,
    Dg13,
    Dg14,
    Dg15,
    Dg16,
}

/// Caller-facing file names and the data groups they address.
///
/// `EF_CARD_ACCESS` is intentionally absent: it is never requested and
/// never reported back, even when the reader touched it during PACE.
pub const FILE_NAMES: &[(&str, DataGroupId)] = &[
    ("EF_COM", DataGroupId::Com),
    ("EF_SOD", DataGroupId::Sod),
    ("EF_DG1", DataGroupId::Dg1),
    ("EF_DG2", DataGroupId::Dg2),
    ("EF_DG3", DataGroupId::Dg3),
    ("EF_DG4", DataGroupId::Dg4),
    ("EF_DG5", DataGroupId::Dg5),
    ("EF_DG6", DataGroupId::Dg6),
    ("EF_DG7", DataGroupId::Dg7),
    ("EF_DG8", DataGroupId::Dg8),
    ("EF_DG9", DataGroupId::Dg9),
    ("EF_DG10", DataGroupId::Dg10),
    ("EF_DG11", DataGroupId::Dg11),
    ("EF_DG12", DataGroupId::Dg12),
    ("EF_DG13", DataGroupId::Dg13),
    ("EF_DG14", DataGroupId::Dg14),
    ("EF_DG15", DataGroupId::Dg15),
    ("EF_DG16", DataGroupId::Dg16),
];

impl DataGroupId {
    /// Look up a data group by its caller-facing file name (e.g. "EF_DG2").
    ///
    /// Unknown names yield `None`; callers treat that as "skip", not as an error.
    pub fn from_file_name(name: &str) -> Option<Self> {
        FILE_NAMES
            .iter()
            .find(|(file_name, _)| *file_name == name)
            .map(|(_, id)| *id)
    }

    /// Reverse lookup into the name table. First matching entry wins.
    pub fn file_name(self) -> Option<&'static str> {
        FILE_NAMES
            .iter()
            .find(|(_, id)| *id == self)
            .map(|(file_name, _)| *file_name)
    }

    /// Short label used in progress messages
    pub fn label(self) -> &'static str {
        match self {
            DataGroupId::CardAccess => "CardAccess",
            DataGroupId::Com => "COM",
            DataGroupId::Sod => "SOD",
            DataGroupId::Dg1 => "DG1",
            DataGroupId::Dg2 => "DG2",
            DataGroupId::Dg3 => "DG3",
            DataGroupId::Dg4 => "DG4",
            DataGroupId::Dg5 => "DG5",
            DataGroupId::Dg6 => "DG6",
            DataGroupId::Dg7 => "DG7",
            DataGroupId::Dg8 => "DG8",
            DataGroupId::Dg9 => "DG9",
            DataGroupId::Dg10 => "DG10",
            DataGroupId::Dg11 => "DG11",
            DataGroupId::Dg12 => "DG12",
            DataGroupId::Dg13 => "DG13",
            DataGroupId::Dg14 => "DG14",
            DataGroupId::Dg15 => "DG15",
            DataGroupId::Dg16 => "DG16",
        }
    }
}

impl fmt::Display for DataGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_file_name() {
        assert_eq!(DataGroupId::from_file_name("EF_DG2"), Some(DataGroupId::Dg2));
        assert_eq!(DataGroupId::from_file_name("EF_COM"), Some(DataGroupId::Com));
        assert_eq!(DataGroupId::from_file_name("EF_BOGUS"), None);
        // Lookup is exact, no case folding
        assert_eq!(DataGroupId::from_file_name("ef_dg2"), None);
    }

    #[test]
    fn test_card_access_is_unmapped() {
        assert_eq!(DataGroupId::from_file_name("EF_CARD_ACCESS"), None);
        assert_eq!(DataGroupId::CardAccess.file_name(), None);
    }

    #[test]
    fn test_name_table_round_trips() {
        for (name, id) in FILE_NAMES {
            assert_eq!(DataGroupId::from_file_name(name), Some(*id));
            assert_eq!(id.file_name(), Some(*name));
        }
        assert_eq!(FILE_NAMES.len(), 18);
    }

    #[test]
    fn test_labels() {
        assert_eq!(DataGroupId::Com.to_string(), "COM");
        assert_eq!(DataGroupId::Dg11.to_string(), "DG11");
    }
}
