//! Unix Domain Socket (UDS) ベースのシンプルな IPC モジュール。
//! `selcap` CLI ↔ `selcapd` デーモン間の通信で利用します。
use crate::error::{Result, SelcapError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SOCKET_FILENAME: &str = "selcap.sock";
const DEFAULT_SOCKET_PATH: &str = "/tmp/selcap.sock";

/// デーモンソケットパスを返します。
pub fn socket_path() -> PathBuf {
    if let Some(path) = socket_env("SELCAP_SOCKET_PATH") {
        return PathBuf::from(path);
    }

    if let Some(dir) = socket_env("SELCAP_SOCKET_DIR") {
        return PathBuf::from(dir).join(SOCKET_FILENAME);
    }

    PathBuf::from(DEFAULT_SOCKET_PATH)
}

/// CLI からデーモンへ送るコマンド列挙。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum IpcCmd {
    /// 選択テキストのキャプチャを即時実行
    Capture,
    /// 直近のキャプチャ結果を取得
    Last,
    /// ステータス取得
    Status,
    Health,
}

/// デーモンからの汎用レスポンス。
#[derive(Debug, Serialize, Deserialize)]
pub struct IpcResp {
    pub ok: bool,
    pub msg: String,
}

fn socket_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// コマンドを送信して `IpcResp` を取得する同期ユーティリティ。
///
/// 接続系の失敗は `SelcapError::IpcConnectionFailed`、ワイヤフォーマットの
/// 失敗は `SelcapError::IpcSerializationError` として返します。
pub fn send_cmd(cmd: &IpcCmd) -> Result<IpcResp> {
    use futures::{SinkExt, StreamExt};
    use tokio::net::UnixStream;
    use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SelcapError::SystemError(format!("tokio runtime build failed: {}", e)))?;

    rt.block_on(async {
        let path = socket_path();
        if !Path::new(&path).exists() {
            return Err(SelcapError::IpcConnectionFailed(
                "daemon socket not found (is selcapd running?)".to_string(),
            ));
        }

        let stream = UnixStream::connect(&path).await.map_err(|e| {
            SelcapError::IpcConnectionFailed(format!("connect {} failed: {}", path.display(), e))
        })?;
        let (r, w) = stream.into_split();
        let mut writer = FramedWrite::new(w, LinesCodec::new());
        let mut reader = FramedRead::new(r, LinesCodec::new());

        let json = serde_json::to_string(cmd)
            .map_err(|e| SelcapError::IpcSerializationError(e.to_string()))?;
        writer
            .send(json)
            .await
            .map_err(|e| SelcapError::IpcConnectionFailed(format!("send failed: {}", e)))?;

        match reader.next().await {
            Some(Ok(line)) => serde_json::from_str::<IpcResp>(&line)
                .map_err(|e| SelcapError::IpcSerializationError(e.to_string())),
            Some(Err(e)) => Err(SelcapError::IpcConnectionFailed(format!(
                "read failed: {}",
                e
            ))),
            None => Err(SelcapError::IpcConnectionFailed(
                "no response from daemon".to_string(),
            )),
        }
    })
}
