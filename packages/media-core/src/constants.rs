/// 変換後画像の最大寸法（幅・高さ）
pub const MAX_DIMENSION: u32 = 4096;

/// デコードを許可する最大ピクセル数（極端な入力によるメモリ枯渇のみ防止）
pub const MAX_PIXELS: u64 = 100_000_000;

/// JPEG エンコーダのデフォルト品質（1-100）
pub const DEFAULT_QUALITY: u8 = 75;

/// 正規化後の画像の Content-Type（保存・レスポンスとも JPEG に統一）
pub const CANONICAL_CONTENT_TYPE: &str = "image/jpeg";

/// 回転＋リサイズ時のデフォルト出力サイズ
pub const DEFAULT_TARGET_WIDTH: u32 = 1280;
pub const DEFAULT_TARGET_HEIGHT: u32 = 720;

/// オブジェクトキーの最大長（バイト）
pub const MAX_KEY_LENGTH: usize = 1024;
