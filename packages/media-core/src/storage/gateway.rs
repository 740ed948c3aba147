use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::TryStreamExt;

use crate::errors::StorageError;

/// `get` が返すオブジェクト本体（チャンクのストリーム）
pub type ObjectBody = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// オブジェクトストレージの最小インターフェース
///
/// S3・メモリ上のフェイクなど、put/get さえできればどのバックエンドでも差し替えられる。
/// `get` の NotFound はそれ以外の失敗と区別して返すこと
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// キーを指定してオブジェクトを書き込む（上書きの扱いはバックエンドに委ねる）
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// キーを指定してオブジェクトを取得する
    async fn get(&self, key: &str) -> Result<ObjectBody, StorageError>;
}

/// オブジェクト本体を最後まで読み込んでメモリ上に連結する
pub async fn read_body(mut body: ObjectBody) -> Result<Bytes, std::io::Error> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = body.try_next().await? {
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}
