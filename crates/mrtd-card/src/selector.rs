//! Data group selection
//!
//! Decides which elementary files a session asks the reader for, and in
//! which order. The order drives the reader's file selection sequence.

use mrtd_common::DataGroupId;
use tracing::debug;

/// Files every session reads, in this order
pub const BASE_GROUPS: [DataGroupId; 4] = [
    DataGroupId::Com,
    DataGroupId::Dg1,
    DataGroupId::Dg11,
    DataGroupId::Sod,
];

/// Face image, then fingerprints
pub const IMAGE_GROUPS: [DataGroupId; 2] = [DataGroupId::Dg2, DataGroupId::Dg5];

/// Ordered, duplicate-free list of data groups to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataGroupRequest {
    groups: Vec<DataGroupId>,
}

impl DataGroupRequest {
    /// Build a request from base groups, the image flag and extra file names.
    ///
    /// Extra names are looked up in the fixed name table in caller order.
    /// Unknown names and groups already present are skipped.
    pub fn select<S: AsRef<str>>(include_images: bool, extra_files: &[S]) -> Self {
        let mut request = Self {
            groups: BASE_GROUPS.to_vec(),
        };

        if include_images {
            request.groups.extend_from_slice(&IMAGE_GROUPS);
        }

        for name in extra_files {
            let name = name.as_ref();
            match DataGroupId::from_file_name(name) {
                Some(id) => request.push_unique(id),
                None => debug!(file = name, "Ignoring unknown extra file"),
            }
        }

        request
    }

    fn push_unique(&mut self, id: DataGroupId) {
        if !self.groups.contains(&id) {
            self.groups.push(id);
        }
    }

    pub fn groups(&self) -> &[DataGroupId] {
        &self.groups
    }

    pub fn contains(&self, id: DataGroupId) -> bool {
        self.groups.contains(&id)
    }

    /// Position of a group in the read sequence
    pub fn position(&self, id: DataGroupId) -> Option<usize> {
        self.groups.iter().position(|g| *g == id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrtd_common::DataGroupId::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn test_base_only() {
        let request = DataGroupRequest::select(false, &NONE);
        assert_eq!(request.groups(), [Com, Dg1, Dg11, Sod]);
    }

    #[test]
    fn test_with_images() {
        let request = DataGroupRequest::select(true, &NONE);
        assert_eq!(request.groups(), [Com, Dg1, Dg11, Sod, Dg2, Dg5]);
    }

    #[test]
    fn test_extra_files_dedup_and_unknown() {
        let request =
            DataGroupRequest::select(false, &["EF_DG5", "EF_DG5", "EF_BOGUS", "EF_DG1"]);
        assert_eq!(request.groups(), [Com, Dg1, Dg11, Sod, Dg5]);
    }

    #[test]
    fn test_extra_files_keep_caller_order() {
        let request = DataGroupRequest::select(true, &["EF_DG14", "EF_DG2", "EF_DG7", "EF_CARD_ACCESS"]);
        assert_eq!(request.groups(), [Com, Dg1, Dg11, Sod, Dg2, Dg5, Dg14, Dg7]);
        assert_eq!(request.position(Dg14), Some(6));
        assert!(!request.contains(CardAccess));
    }

    #[test]
    fn test_accepts_owned_strings() {
        let extra = vec!["EF_DG12".to_string()];
        let request = DataGroupRequest::select(false, &extra);
        assert_eq!(request.len(), 5);
        assert!(request.contains(Dg12));
    }
}
