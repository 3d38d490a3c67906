use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side upload task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTask {
    pub id: Uuid,
    pub filename: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Snapshot of the server-side upload pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksInfo {
    pub pending_count: u64,
    #[serde(default)]
    pub processing_task: Option<UploadTask>,
    #[serde(default)]
    pub failed_tasks: Vec<UploadTask>,
}

impl TasksInfo {
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.pending_count == 0 && self.processing_task.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_info_from_backend() {
        let json = r#"{
            "pendingCount": 2,
            "processingTask": {
                "id": "5b0c7f5e-0f7c-4c1e-9d0a-1c3f2f9a7b11",
                "filename": "cat.jpg",
                "size": 1024,
                "tempFilePath": "/tmp/upload/5b0c7f5e"
            },
            "failedTasks": [{
                "id": "0e1a4c2d-7b1d-4a55-8a87-2d5b1f6e0c33",
                "filename": "broken.png",
                "size": 10,
                "errorMessage": "unsupported format"
            }]
        }"#;
        let info: TasksInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.pending_count, 2);
        assert_eq!(info.processing_task.as_ref().unwrap().filename, "cat.jpg");
        assert_eq!(
            info.failed_tasks[0].error_message.as_deref(),
            Some("unsupported format")
        );
        assert!(!info.is_idle());
    }

    #[test]
    fn test_tasks_info_null_processing_task() {
        let json = r#"{"pendingCount": 0, "processingTask": null, "failedTasks": []}"#;
        let info: TasksInfo = serde_json::from_str(json).unwrap();
        assert!(info.is_idle());
    }
}
