use crate::constants::MAX_KEY_LENGTH;

/// オブジェクトキー（画像名）の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("key is empty")]
    Empty,

    #[error("key is too long (max {MAX_KEY_LENGTH})")]
    TooLong,

    #[error("control characters in key")]
    ControlCharacters,
}

/// オブジェクトキーを検証する
///
/// 名前は保存先のキーとしてそのまま使うため、ストレージが受け付けない値だけを弾く。
/// 空でなければ何でも受け付けていた従来の取り込み API より狭く、
/// 制御文字を含む名前と 1024 バイトを超える名前はここで拒否される
pub fn validate_key(key: &str) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }

    if key.len() > MAX_KEY_LENGTH {
        return Err(KeyError::TooLong);
    }

    if key.chars().any(char::is_control) {
        return Err(KeyError::ControlCharacters);
    }

    Ok(())
}
