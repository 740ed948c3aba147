//! Bearer トークンの署名検証
//!
//! 検証手順（最初に失敗したところで結果が確定する）:
//! 1. 3 セグメントに分割し、ヘッダ・ペイロードが base64url の JSON オブジェクト、署名が base64url であること
//! 2. `alg` が RSA 系（RS256 / RS384 / RS512）であること。トークン側の宣言で
//!    検証アルゴリズムを切り替えることはしない（`none` や HS256 によるすり替えを防ぐ）
//! 3. `kid` があり、鍵セットに存在すること
//! 4. 署名が一致すること
//!
//! クレーム（`exp`, `aud` など）は検証しない。有効期限の強制が必要なら
//! 呼び出し側で追加すること。

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::auth::keyset::KeySet;

/// 検証を受け付けるアルゴリズム（RSA PKCS#1 v1.5 系のみ）
pub const ACCEPTED_ALGORITHMS: &[&str] = &["RS256", "RS384", "RS512"];

/// 1 回の検証の結果。必ずどれか 1 つになる
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    Valid,
    InvalidSignature,
    UnsupportedAlgorithm,
    KeyNotFound,
    MalformedToken,
    MissingHeader,
}

impl VerificationResult {
    /// ログ出力用の短い名前
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::InvalidSignature => "invalid_signature",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::KeyNotFound => "key_not_found",
            Self::MalformedToken => "malformed_token",
            Self::MissingHeader => "missing_header",
        }
    }
}

impl std::fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT ヘッダのうち検証に使うフィールドだけ
///
/// jsonwebtoken の `Header` は未知の alg をデシリアライズできないため自前で読む
#[derive(Debug, Deserialize)]
struct TokenHeader {
    alg: Option<String>,
    kid: Option<String>,
}

/// alg 文字列を RSA 系アルゴリズムに変換する（それ以外は None）
pub fn rsa_algorithm(alg: &str) -> Option<Algorithm> {
    match alg {
        "RS256" => Some(Algorithm::RS256),
        "RS384" => Some(Algorithm::RS384),
        "RS512" => Some(Algorithm::RS512),
        _ => None,
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Option<T> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// トークンを鍵セットで検証する
pub fn verify(raw_token: &str, key_set: &KeySet) -> VerificationResult {
    let token = raw_token.trim();
    if token.is_empty() {
        return VerificationResult::MalformedToken;
    }

    let mut segments = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return VerificationResult::MalformedToken;
    };

    let Some(header) = decode_segment::<TokenHeader>(header_b64) else {
        return VerificationResult::MalformedToken;
    };
    if decode_segment::<serde_json::Map<String, serde_json::Value>>(payload_b64).is_none() {
        return VerificationResult::MalformedToken;
    }
    if URL_SAFE_NO_PAD.decode(signature_b64).is_err() {
        return VerificationResult::MalformedToken;
    }

    let Some(alg) = header.alg.as_deref() else {
        return VerificationResult::MalformedToken;
    };
    let Some(algorithm) = rsa_algorithm(alg) else {
        tracing::debug!(alg = %alg, accepted = ?ACCEPTED_ALGORITHMS, "unsupported token algorithm");
        return VerificationResult::UnsupportedAlgorithm;
    };

    let Some(kid) = header.kid.as_deref().filter(|kid| !kid.is_empty()) else {
        return VerificationResult::MalformedToken;
    };
    let Some(key) = key_set.get(kid) else {
        return VerificationResult::KeyNotFound;
    };

    // 署名対象は "header.payload" の生文字列
    let signing_input = &token[..header_b64.len() + 1 + payload_b64.len()];
    match jsonwebtoken::crypto::verify(signature_b64, signing_input.as_bytes(), key, algorithm) {
        Ok(true) => VerificationResult::Valid,
        Ok(false) => VerificationResult::InvalidSignature,
        Err(e) => {
            tracing::debug!(kid = %kid, error = %e, "signature verification error");
            VerificationResult::InvalidSignature
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        flip_signature_byte, primary_key_set, raw_token, sign_hs256, sign_rs256, sign_with,
        PRIMARY_KID, ROTATED_KID, ROTATED_PRIVATE_KEY_PEM,
    };
    use serde_json::json;

    #[test]
    fn test_valid_token() {
        let token = sign_rs256(PRIMARY_KID);
        assert_eq!(verify(&token, &primary_key_set()), VerificationResult::Valid);
    }

    #[test]
    fn test_verification_is_deterministic() {
        let token = sign_rs256(PRIMARY_KID);
        let keys = primary_key_set();

        let first = verify(&token, &keys);
        for _ in 0..3 {
            assert_eq!(verify(&token, &keys), first);
        }
    }

    #[test]
    fn test_flipped_signature_byte() {
        let token = sign_rs256(PRIMARY_KID);
        let keys = primary_key_set();

        for index in [0, 17, 255] {
            let tampered = flip_signature_byte(&token, index);
            assert_eq!(verify(&tampered, &keys), VerificationResult::InvalidSignature);
        }
    }

    #[test]
    fn test_tampered_payload() {
        let token = sign_rs256(PRIMARY_KID);
        let parts: Vec<&str> = token.split('.').collect();
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"attacker"}"#);
        let tampered = format!("{}.{}.{}", parts[0], payload, parts[2]);

        assert_eq!(
            verify(&tampered, &primary_key_set()),
            VerificationResult::InvalidSignature
        );
    }

    #[test]
    fn test_signed_by_other_key_under_known_kid() {
        // rotated 鍵で署名したトークンに primary の kid を付けても通らない
        let token = sign_with(ROTATED_PRIVATE_KEY_PEM, Algorithm::RS256, PRIMARY_KID);
        assert_eq!(
            verify(&token, &primary_key_set()),
            VerificationResult::InvalidSignature
        );
    }

    #[test]
    fn test_other_rsa_algorithms_accepted() {
        let keys = primary_key_set();
        for algorithm in [Algorithm::RS384, Algorithm::RS512] {
            let token = sign_with(crate::testutil::PRIMARY_PRIVATE_KEY_PEM, algorithm, PRIMARY_KID);
            assert_eq!(verify(&token, &keys), VerificationResult::Valid);
        }
    }

    #[test]
    fn test_unknown_kid() {
        let token = sign_rs256(ROTATED_KID);
        assert_eq!(verify(&token, &primary_key_set()), VerificationResult::KeyNotFound);
    }

    #[test]
    fn test_symmetric_algorithm_rejected() {
        // 公開鍵を HMAC 秘密鍵として使うすり替えも含め、HS256 は常に拒否
        let token = sign_hs256(PRIMARY_KID, b"shared-secret");
        assert_eq!(
            verify(&token, &primary_key_set()),
            VerificationResult::UnsupportedAlgorithm
        );
    }

    #[test]
    fn test_non_rsa_algorithms_rejected() {
        let keys = primary_key_set();
        for alg in ["none", "HS256", "HS512", "ES256", "PS256", "EdDSA", "rs256"] {
            let token = raw_token(json!({"alg": alg, "kid": PRIMARY_KID}), json!({"sub": "x"}), "");
            assert_eq!(
                verify(&token, &keys),
                VerificationResult::UnsupportedAlgorithm,
                "alg {alg}"
            );
        }
    }

    #[test]
    fn test_missing_alg() {
        let token = raw_token(json!({"kid": PRIMARY_KID}), json!({}), "c2ln");
        assert_eq!(verify(&token, &primary_key_set()), VerificationResult::MalformedToken);
    }

    #[test]
    fn test_missing_kid() {
        let keys = primary_key_set();

        let token = raw_token(json!({"alg": "RS256"}), json!({}), "c2ln");
        assert_eq!(verify(&token, &keys), VerificationResult::MalformedToken);

        let token = raw_token(json!({"alg": "RS256", "kid": ""}), json!({}), "c2ln");
        assert_eq!(verify(&token, &keys), VerificationResult::MalformedToken);
    }

    #[test]
    fn test_malformed_structure() {
        let keys = primary_key_set();

        for token in ["", "   ", "abcdef", "a.b", "a.b.c.d", "!!!.???.***"] {
            assert_eq!(verify(token, &keys), VerificationResult::MalformedToken, "{token:?}");
        }
    }

    #[test]
    fn test_payload_must_be_json_object() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"primary-key"}"#);
        let payload = URL_SAFE_NO_PAD.encode(b"not json");
        let token = format!("{header}.{payload}.c2ln");

        assert_eq!(verify(&token, &primary_key_set()), VerificationResult::MalformedToken);
    }

    #[test]
    fn test_expired_claims_are_not_checked() {
        let token = crate::testutil::sign_claims(
            crate::testutil::PRIMARY_PRIVATE_KEY_PEM,
            Algorithm::RS256,
            PRIMARY_KID,
            &json!({"sub": "client", "exp": 1}),
        );
        assert_eq!(verify(&token, &primary_key_set()), VerificationResult::Valid);
    }

    #[test]
    fn test_empty_key_set() {
        let token = sign_rs256(PRIMARY_KID);
        assert_eq!(verify(&token, &KeySet::new()), VerificationResult::KeyNotFound);
    }

    #[test]
    fn test_accepted_algorithms_constant() {
        for alg in ACCEPTED_ALGORITHMS {
            assert!(rsa_algorithm(alg).is_some());
        }
        assert!(rsa_algorithm("none").is_none());
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        /// RSA 以外の alg（既知の名前と任意の短い文字列）
        fn arb_non_rsa_alg() -> impl Strategy<Value = String> {
            prop_oneof![
                prop::sample::select(vec![
                    "none", "HS256", "HS384", "HS512", "ES256", "ES384", "PS256", "PS512", "EdDSA",
                    "rs256", "RS", "RS1024",
                ])
                .prop_map(str::to_string),
                "[A-Za-z0-9-]{0,12}",
            ]
            .prop_filter("RSA algorithms are accepted", |alg| {
                !ACCEPTED_ALGORITHMS.contains(&alg.as_str())
            })
        }

        proptest! {
            /// 2048bit 鍵の署名（256 バイト）のどのバイトを反転しても署名不一致になる
            #[test]
            fn flipped_signature_byte_is_invalid(index in 0usize..256) {
                let tampered = flip_signature_byte(&sign_rs256(PRIMARY_KID), index);
                prop_assert_eq!(
                    verify(&tampered, &primary_key_set()),
                    VerificationResult::InvalidSignature
                );
            }

            /// RSA 以外の alg は kid や署名に関係なく拒否される
            #[test]
            fn non_rsa_alg_is_unsupported(
                alg in arb_non_rsa_alg(),
                signature in prop::collection::vec(any::<u8>(), 0..64)
            ) {
                let token = raw_token(
                    json!({"alg": alg, "kid": PRIMARY_KID}),
                    json!({"sub": "x"}),
                    &URL_SAFE_NO_PAD.encode(signature),
                );
                prop_assert_eq!(
                    verify(&token, &primary_key_set()),
                    VerificationResult::UnsupportedAlgorithm
                );
            }

            /// どんな文字列を渡しても panic せず、Valid にはならない
            #[test]
            fn arbitrary_input_is_never_valid(token in "\\PC{0,64}") {
                prop_assert_ne!(verify(&token, &primary_key_set()), VerificationResult::Valid);
            }
        }
    }
}
