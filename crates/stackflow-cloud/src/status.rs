//! Remote stack status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Last-observed status of a stack
///
/// Never cached; re-fetched every time a lifecycle decision is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum StackStatus {
    CreateInProgress,
    CreateFailed,
    CreateComplete,
    RollbackInProgress,
    RollbackFailed,
    RollbackComplete,
    DeleteInProgress,
    DeleteFailed,
    DeleteComplete,
    UpdateInProgress,
    UpdateCompleteCleanupInProgress,
    UpdateComplete,
    UpdateFailed,
    UpdateRollbackInProgress,
    UpdateRollbackFailed,
    UpdateRollbackCompleteCleanupInProgress,
    UpdateRollbackComplete,
    ReviewInProgress,
    ImportInProgress,
    ImportComplete,
    ImportRollbackInProgress,
    ImportRollbackFailed,
    ImportRollbackComplete,
    /// The control plane does not know the stack
    DoesNotExist,
    /// A status this build does not recognise
    Other(String),
}

impl StackStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StackStatus::CreateInProgress => "CREATE_IN_PROGRESS",
            StackStatus::CreateFailed => "CREATE_FAILED",
            StackStatus::CreateComplete => "CREATE_COMPLETE",
            StackStatus::RollbackInProgress => "ROLLBACK_IN_PROGRESS",
            StackStatus::RollbackFailed => "ROLLBACK_FAILED",
            StackStatus::RollbackComplete => "ROLLBACK_COMPLETE",
            StackStatus::DeleteInProgress => "DELETE_IN_PROGRESS",
            StackStatus::DeleteFailed => "DELETE_FAILED",
            StackStatus::DeleteComplete => "DELETE_COMPLETE",
            StackStatus::UpdateInProgress => "UPDATE_IN_PROGRESS",
            StackStatus::UpdateCompleteCleanupInProgress => "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
            StackStatus::UpdateComplete => "UPDATE_COMPLETE",
            StackStatus::UpdateFailed => "UPDATE_FAILED",
            StackStatus::UpdateRollbackInProgress => "UPDATE_ROLLBACK_IN_PROGRESS",
            StackStatus::UpdateRollbackFailed => "UPDATE_ROLLBACK_FAILED",
            StackStatus::UpdateRollbackCompleteCleanupInProgress => {
                "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS"
            }
            StackStatus::UpdateRollbackComplete => "UPDATE_ROLLBACK_COMPLETE",
            StackStatus::ReviewInProgress => "REVIEW_IN_PROGRESS",
            StackStatus::ImportInProgress => "IMPORT_IN_PROGRESS",
            StackStatus::ImportComplete => "IMPORT_COMPLETE",
            StackStatus::ImportRollbackInProgress => "IMPORT_ROLLBACK_IN_PROGRESS",
            StackStatus::ImportRollbackFailed => "IMPORT_ROLLBACK_FAILED",
            StackStatus::ImportRollbackComplete => "IMPORT_ROLLBACK_COMPLETE",
            StackStatus::DoesNotExist => "DOESN'T EXIST",
            StackStatus::Other(s) => s,
        }
    }

    /// Deploy takes the create path
    pub fn is_creatable(&self) -> bool {
        matches!(self, StackStatus::DeleteComplete | StackStatus::DoesNotExist)
    }

    /// Deploy takes the update path
    pub fn is_updatable(&self) -> bool {
        matches!(
            self,
            StackStatus::UpdateFailed
                | StackStatus::UpdateRollbackComplete
                | StackStatus::UpdateComplete
                | StackStatus::CreateComplete
        )
    }

    /// Destroy has nothing to do
    pub fn is_gone(&self) -> bool {
        self.is_creatable()
    }

    /// Destroy may issue a delete
    pub fn is_deletable(&self) -> bool {
        matches!(
            self,
            StackStatus::CreateComplete
                | StackStatus::UpdateComplete
                | StackStatus::RollbackComplete
                | StackStatus::UpdateRollbackComplete
                | StackStatus::UpdateRollbackFailed
                | StackStatus::RollbackFailed
                | StackStatus::DeleteFailed
        )
    }

    /// Still transitioning; polling should continue
    pub fn is_in_progress(&self) -> bool {
        self.as_str().ends_with("_IN_PROGRESS")
    }
}

impl FromStr for StackStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s {
            "CREATE_IN_PROGRESS" => StackStatus::CreateInProgress,
            "CREATE_FAILED" => StackStatus::CreateFailed,
            "CREATE_COMPLETE" => StackStatus::CreateComplete,
            "ROLLBACK_IN_PROGRESS" => StackStatus::RollbackInProgress,
            "ROLLBACK_FAILED" => StackStatus::RollbackFailed,
            "ROLLBACK_COMPLETE" => StackStatus::RollbackComplete,
            "DELETE_IN_PROGRESS" => StackStatus::DeleteInProgress,
            "DELETE_FAILED" => StackStatus::DeleteFailed,
            "DELETE_COMPLETE" => StackStatus::DeleteComplete,
            "UPDATE_IN_PROGRESS" => StackStatus::UpdateInProgress,
            "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS" => StackStatus::UpdateCompleteCleanupInProgress,
            "UPDATE_COMPLETE" => StackStatus::UpdateComplete,
            "UPDATE_FAILED" => StackStatus::UpdateFailed,
            "UPDATE_ROLLBACK_IN_PROGRESS" => StackStatus::UpdateRollbackInProgress,
            "UPDATE_ROLLBACK_FAILED" => StackStatus::UpdateRollbackFailed,
            "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS" => {
                StackStatus::UpdateRollbackCompleteCleanupInProgress
            }
            "UPDATE_ROLLBACK_COMPLETE" => StackStatus::UpdateRollbackComplete,
            "REVIEW_IN_PROGRESS" => StackStatus::ReviewInProgress,
            "IMPORT_IN_PROGRESS" => StackStatus::ImportInProgress,
            "IMPORT_COMPLETE" => StackStatus::ImportComplete,
            "IMPORT_ROLLBACK_IN_PROGRESS" => StackStatus::ImportRollbackInProgress,
            "IMPORT_ROLLBACK_FAILED" => StackStatus::ImportRollbackFailed,
            "IMPORT_ROLLBACK_COMPLETE" => StackStatus::ImportRollbackComplete,
            "DOESN'T EXIST" => StackStatus::DoesNotExist,
            other => StackStatus::Other(other.to_string()),
        };
        Ok(status)
    }
}

impl From<String> for StackStatus {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl From<StackStatus> for String {
    fn from(status: StackStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        for raw in [
            "CREATE_COMPLETE",
            "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS",
            "DELETE_COMPLETE",
            "DOESN'T EXIST",
        ] {
            let status: StackStatus = raw.parse().unwrap();
            assert!(!matches!(status, StackStatus::Other(_)), "{raw}");
            assert_eq!(status.to_string(), raw);
        }
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let status: StackStatus = "SOMETHING_NEW".parse().unwrap();
        assert_eq!(status, StackStatus::Other("SOMETHING_NEW".to_string()));
        assert_eq!(status.to_string(), "SOMETHING_NEW");
        assert!(!status.is_creatable());
        assert!(!status.is_updatable());
        assert!(!status.is_deletable());
    }

    #[test]
    fn test_deploy_branches() {
        assert!(StackStatus::DeleteComplete.is_creatable());
        assert!(StackStatus::DoesNotExist.is_creatable());

        for status in [
            StackStatus::UpdateFailed,
            StackStatus::UpdateRollbackComplete,
            StackStatus::UpdateComplete,
            StackStatus::CreateComplete,
        ] {
            assert!(status.is_updatable(), "{status}");
            assert!(!status.is_creatable(), "{status}");
        }

        for status in [
            StackStatus::RollbackInProgress,
            StackStatus::CreateInProgress,
            StackStatus::RollbackComplete,
            StackStatus::DeleteFailed,
        ] {
            assert!(!status.is_updatable() && !status.is_creatable(), "{status}");
        }
    }

    #[test]
    fn test_destroy_branches() {
        assert!(StackStatus::DoesNotExist.is_gone());
        assert!(StackStatus::DeleteFailed.is_deletable());
        assert!(StackStatus::RollbackFailed.is_deletable());
        assert!(!StackStatus::UpdateFailed.is_deletable());
        assert!(!StackStatus::DeleteInProgress.is_deletable());
    }

    #[test]
    fn test_in_progress() {
        assert!(StackStatus::UpdateCompleteCleanupInProgress.is_in_progress());
        assert!(StackStatus::ReviewInProgress.is_in_progress());
        assert!(!StackStatus::CreateComplete.is_in_progress());
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!(String::from(StackStatus::UpdateRollbackFailed), "UPDATE_ROLLBACK_FAILED");
        assert_eq!(
            StackStatus::from("ROLLBACK_IN_PROGRESS".to_string()),
            StackStatus::RollbackInProgress
        );
    }
}
