use crate::pipeline::response::PipelineResponse;

/// リクエストが途中で打ち切られた理由（終端状態）
///
/// どの失敗もステータスコードと固定メッセージに一対一で対応する
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Unauthorized,
    KeySetUnavailable,
    InvalidBody,
    InvalidBodyStructure,
    InvalidImage,
    UploadFailed,
    MissingName,
    NotFound { name: String },
    RetrieveFailed,
    ReadFailed,
    TransformFailed,
}

impl Failure {
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidBody | Self::InvalidBodyStructure | Self::InvalidImage | Self::MissingName => 400,
            Self::Unauthorized => 401,
            Self::NotFound { .. } => 404,
            Self::KeySetUnavailable
            | Self::UploadFailed
            | Self::RetrieveFailed
            | Self::ReadFailed
            | Self::TransformFailed => 500,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::KeySetUnavailable => "Unable to verify credentials".to_string(),
            Self::InvalidBody => "Invalid request body".to_string(),
            Self::InvalidBodyStructure => "Invalid request body structure".to_string(),
            Self::InvalidImage => "Invalid image".to_string(),
            Self::UploadFailed => "Error uploading image to S3".to_string(),
            Self::MissingName => "Missing 'name' parameter in the URL path".to_string(),
            Self::NotFound { name } => format!("Image with name {name} not found in S3"),
            Self::RetrieveFailed => "Failed to retrieve object from S3".to_string(),
            Self::ReadFailed => "Failed to read object content".to_string(),
            Self::TransformFailed => "Failed to rotate and resize".to_string(),
        }
    }
}

impl From<Failure> for PipelineResponse {
    fn from(failure: Failure) -> Self {
        PipelineResponse::message(failure.status(), &failure.message())
    }
}
