//! テスト用のユーティリティ
//!
//! RSA 鍵・JWKS のフィクスチャ、署名済みトークンの生成、攻撃用の生トークン組み立て、
//! サンプル画像の生成を提供する。`testutil` フィーチャでのみ公開される。
//!
//! ```toml
//! [dev-dependencies]
//! media-core = { path = "../media-core", features = ["testutil"] }
//! ```

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use image::{DynamicImage, ImageFormat};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::io::Cursor;

use crate::auth::KeySet;

pub const PRIMARY_KID: &str = "primary-key";
pub const ROTATED_KID: &str = "rotated-key";

pub const PRIMARY_PRIVATE_KEY_PEM: &str = include_str!("../tests/fixtures/rsa_primary.pem");
pub const ROTATED_PRIVATE_KEY_PEM: &str = include_str!("../tests/fixtures/rsa_rotated.pem");

/// primary の RSA 鍵と EC 鍵（検証では使われない）を含む JWKS
pub const JWKS_JSON: &str = include_str!("../tests/fixtures/jwks.json");
/// primary・rotated の RSA 鍵と EC 鍵を含む JWKS（鍵ローテーション後）
pub const JWKS_ROTATED_JSON: &str = include_str!("../tests/fixtures/jwks_rotated.json");

pub fn primary_key_set() -> KeySet {
    KeySet::from_jwks_json(JWKS_JSON.as_bytes()).expect("fixture JWKS must parse")
}

pub fn rotated_key_set() -> KeySet {
    KeySet::from_jwks_json(JWKS_ROTATED_JSON.as_bytes()).expect("fixture JWKS must parse")
}

/// 任意のクレームを RSA 秘密鍵（PEM）で署名する
pub fn sign_claims(private_key_pem: &str, algorithm: Algorithm, kid: &str, claims: &Value) -> String {
    let mut header = Header::new(algorithm);
    header.kid = Some(kid.to_string());

    let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).expect("fixture key must parse");
    jsonwebtoken::encode(&header, claims, &key).expect("failed to encode test JWT")
}

pub fn sign_with(private_key_pem: &str, algorithm: Algorithm, kid: &str) -> String {
    sign_claims(
        private_key_pem,
        algorithm,
        kid,
        &json!({"sub": "client:test-client", "iat": 1_700_000_000}),
    )
}

/// primary 鍵で RS256 署名したトークン
pub fn sign_rs256(kid: &str) -> String {
    sign_with(PRIMARY_PRIVATE_KEY_PEM, Algorithm::RS256, kid)
}

/// HS256（共有鍵）で署名したトークン
pub fn sign_hs256(kid: &str, secret: &[u8]) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(kid.to_string());

    jsonwebtoken::encode(
        &header,
        &json!({"sub": "client:test-client"}),
        &EncodingKey::from_secret(secret),
    )
    .expect("failed to encode test JWT")
}

/// ヘッダ・ペイロード・署名を直接指定してトークン文字列を組み立てる
pub fn raw_token(header: Value, payload: Value, signature_b64: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(header.to_string());
    let payload = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{payload}.{signature_b64}")
}

/// 署名の index バイト目を反転させたトークンを返す
pub fn flip_signature_byte(token: &str, index: usize) -> String {
    let (signing_input, signature_b64) = token.rsplit_once('.').expect("token must have a signature");
    let mut signature = URL_SAFE_NO_PAD.decode(signature_b64).expect("signature must be base64url");
    signature[index] ^= 0xFF;
    format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
}

/// 真っ黒な JPEG を生成する
pub fn black_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode_sample(&DynamicImage::new_rgb8(width, height), ImageFormat::Jpeg)
}

/// 真っ黒な PNG を生成する
pub fn black_png(width: u32, height: u32) -> Vec<u8> {
    encode_sample(&DynamicImage::new_rgb8(width, height), ImageFormat::Png)
}

fn encode_sample(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("failed to encode sample image");
    buf.into_inner()
}
