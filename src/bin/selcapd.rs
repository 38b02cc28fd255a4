//! selcapd: グローバルホットキー監視とテキストキャプチャを統括する常駐プロセス
//! （シングルスレッド Tokio ランタイム）
//!
//! # 概要
//! Cmd+ピリオドの検出でキャプチャルーチン（前面アプリ解決 → Cmd+C合成 →
//! ペーストボード読み取り）を実行し、結果をメモリ上に保持します。
//! CLI から Unix Domain Socket (UDS) 経由で受け取ったコマンドをハンドリングし、
//!  - 即時キャプチャの実行
//!  - 直近キャプチャ結果・状態の照会
//! を行います。
//!
//! *ソケットパス*: `/tmp/selcap.sock`（`SELCAP_SOCKET_PATH` で上書き可能）
//!
//! ## 実行モデル
//! - `tokio::main(flavor = "current_thread")` でシングルスレッドランタイムを起動
//! - クライアントごとの処理は `spawn_local` でローカルタスク化
//! - キーリスナーは `spawn_blocking` の専有スレッドで `rdev::listen` を実行

use std::{
    error::Error,
    fs,
    sync::{Arc, Mutex},
};

use futures::{SinkExt, StreamExt};
use tokio::{
    net::{UnixListener, UnixStream},
    sync::mpsc,
    task::{LocalSet, spawn_local},
};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use selcap::{
    application::capture_service::CaptureService,
    domain::selection::CapturedSelection,
    error::SelcapError,
    hotkey::HotkeyService,
    infrastructure::permissions::{AccessibilityPermissions, PermissionChecker, PermissionStatus},
    ipc::{IpcCmd, IpcResp, socket_path},
    utils::env::load_env,
};

// ────────────────────────────────────────────────────────

/// 直近のキャプチャ結果を保持するコンテキスト。
///
/// 保持するのは最新の1件のみで、キャプチャごとに上書きされ、
/// プロセス終了とともに消えます（永続化なし）。
#[derive(Debug, Default)]
struct CaptureCtx {
    last: Option<CapturedSelection>,
}

// ────────────────────────────────────────────────────────
// エントリポイント： single‑thread Tokio runtime
// ────────────────────────────────────────────────────────

/// エントリポイント。環境変数を読み込み、`async_main` を current‑thread ランタイムで実行します。
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    load_env();

    // `spawn_local` はこのスレッドだけで動かしたい非同期ジョブを登録する。LocalSet はその実行エンジン
    let local = LocalSet::new();
    local.run_until(async_main()).await
}

/// ソケット待受・クライアントハンドリング・ホットキー監視を起動する本体。
async fn async_main() -> Result<(), Box<dyn Error>> {
    // アクセシビリティ権限チェック（拒否でも起動は継続する。
    // 権限が付与されるまでキーリスナーにはイベントが届かないだけ）
    match AccessibilityPermissions::check_status() {
        PermissionStatus::Granted => println!("✅ Accessibility permission granted"),
        _ => {
            let err = SelcapError::PermissionDenied("accessibility not granted".to_string());
            eprintln!("⚠️  {}", err);
            eprintln!("{}", AccessibilityPermissions::get_error_message());
        }
    }

    // 既存ソケットがあれば削除して再バインド
    let socket = socket_path();
    let _ = fs::remove_file(&socket);
    let listener = UnixListener::bind(&socket)?;
    println!("selcapd listening on {}", socket.display());

    let engine = Arc::new(CaptureService::new());
    let ctx = Arc::new(Mutex::new(CaptureCtx::default()));

    // キャプチャ結果チャンネル（リスナーコールバック → デーモン状態）
    let (tx, mut rx) = mpsc::unbounded_channel::<CapturedSelection>();

    // ─── キャプチャ結果レシーバ ─────────────────────
    {
        let ctx2 = ctx.clone();
        spawn_local(async move {
            while let Some(selection) = rx.recv().await {
                if let Ok(mut c) = ctx2.lock() {
                    c.last = Some(selection);
                }
            }
        });
    }

    // ─── ホットキー監視 ────────────────────────────
    // 失敗してもIPC経由のキャプチャは使えるため、警告して続行する
    let mut hotkey = HotkeyService::new();
    if let Err(e) = hotkey.start(engine.clone(), tx.clone()).await {
        eprintln!("⚠️  Hotkey listener unavailable: {}", e);
    }

    // ─── クライアント接続ループ ──────────────────────
    loop {
        let (stream, _) = listener.accept().await?;
        let engine2 = engine.clone();
        let ctx2 = ctx.clone();
        spawn_local(async move {
            let _ = handle_client(stream, engine2, ctx2).await;
        });
    }
}

// ────────────────────────────────────────────────────────
// クライアントハンドラ
// ────────────────────────────────────────────────────────

/// 1 クライアントとの IPC セッションを処理します。
/// CLI からの JSON 文字列を `IpcCmd` にデシリアライズし、
/// キャプチャエンジンと状態を操作して `IpcResp` を返送します。
async fn handle_client(
    stream: UnixStream,
    engine: Arc<CaptureService>,
    ctx: Arc<Mutex<CaptureCtx>>,
) -> Result<(), Box<dyn Error>> {
    let (r, w) = stream.into_split();
    let mut reader = FramedRead::new(r, LinesCodec::new());
    let mut writer = FramedWrite::new(w, LinesCodec::new());

    if let Some(Ok(line)) = reader.next().await {
        let cmd: IpcCmd = serde_json::from_str(&line)?;
        let resp = handle_cmd(cmd, &engine, &ctx).unwrap_or_else(|e| IpcResp {
            ok: false,
            msg: e.to_string(),
        });

        writer.send(serde_json::to_string(&resp)?).await?;
    }
    Ok(())
}

/// IPC コマンド1件を処理してレスポンスを組み立てます。
///
/// `Capture` はホットキーと同じルーチンを同期実行します。キャプチャの
/// 失敗（前面アプリ不明・ペーストボード空など）はエラーではなく
/// 「テキストなし」の正常系として `ok: true` で返します。
fn handle_cmd(
    cmd: IpcCmd,
    engine: &Arc<CaptureService>,
    ctx: &Arc<Mutex<CaptureCtx>>,
) -> Result<IpcResp, Box<dyn Error>> {
    match cmd {
        IpcCmd::Capture => match engine.capture_selection() {
            Some(selection) => {
                let preview = selection.preview();
                if let Ok(mut c) = ctx.lock() {
                    c.last = Some(selection);
                }
                Ok(IpcResp {
                    ok: true,
                    msg: format!("captured: {}", preview),
                })
            }
            None => Ok(IpcResp {
                ok: true,
                msg: "no text captured".to_string(),
            }),
        },
        IpcCmd::Last => {
            let last = ctx
                .lock()
                .map_err(|e| format!("capture context poisoned: {}", e))?
                .last
                .clone();
            Ok(IpcResp {
                ok: true,
                msg: match last {
                    Some(selection) => selection.text,
                    None => "no capture yet".to_string(),
                },
            })
        }
        IpcCmd::Status => {
            let has_last = ctx
                .lock()
                .map_err(|e| format!("capture context poisoned: {}", e))?
                .last
                .is_some();
            Ok(IpcResp {
                ok: true,
                msg: format!("state={:?}, last_capture={}", engine.state(), has_last),
            })
        }
        IpcCmd::Health => Ok(IpcResp {
            ok: true,
            msg: "OK".to_string(),
        }),
    }
}
