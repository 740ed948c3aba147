use serde_json::Value;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// トランスポート非依存のレスポンス（ステータス・Content-Type・本文）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl PipelineResponse {
    /// `{"message": "..."}` 形式の JSON レスポンス
    ///
    /// 既存クライアントが文字列比較しているため、コロンの後に空白を入れた形で固定する。
    /// メッセージ部分は JSON 文字列としてエスケープする
    pub fn message(status: u16, message: &str) -> Self {
        let escaped = Value::String(message.to_string());
        Self {
            status,
            content_type: JSON_CONTENT_TYPE,
            body: format!(r#"{{"message": {escaped}}}"#),
        }
    }

    pub fn ok(content_type: &'static str, body: String) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }
}
