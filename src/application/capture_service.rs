//! 選択テキストキャプチャサービス
//!
//! # 概要
//! チョード検出後のキャプチャルーチンを実装します。前面アプリケーションの
//! 解決、Cmd+Cキーストロークの合成、直後のペーストボード読み取りを
//! この順で同期実行し、取得テキストまたは空結果を返します。
//!
//! 失敗（前面アプリ不明・表示名なし・文字列ペイロードなし）はすべて
//! 「テキストなし + 診断メッセージ1行」に縮退し、エラーとして伝播しません。

use crate::application::traits::{CopyInjector, FrontmostResolver, PasteboardReader};
use crate::domain::selection::CapturedSelection;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(test)]
thread_local! {
    /// 診断メッセージの捕捉先（テスト専用）
    static DIAG_CAPTURE: std::cell::RefCell<Option<Vec<String>>> =
        const { std::cell::RefCell::new(None) };
}

/// 失敗条件ごとの診断メッセージを1行出力する
fn emit_diagnostic(msg: &str) {
    #[cfg(test)]
    {
        let captured = DIAG_CAPTURE.with(|sink| {
            if let Some(lines) = sink.borrow_mut().as_mut() {
                lines.push(msg.to_string());
                true
            } else {
                false
            }
        });
        if captured {
            return;
        }
    }
    println!("{}", msg);
}

/// キャプチャ処理の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// チョード一致するキー押下を待機中
    Idle,
    /// コールバック内でコピー合成 + 読み取りを実行中
    Capturing,
}

/// キャプチャルーチンと状態を保持するサービス
pub struct CaptureService {
    frontmost: Box<dyn FrontmostResolver>,
    injector: Box<dyn CopyInjector>,
    pasteboard: Box<dyn PasteboardReader>,
    state: Mutex<CaptureState>,
    posted_chords: AtomicU64,
}

impl CaptureService {
    /// 本番用の依存実装でCaptureServiceを作成
    pub fn new() -> Self {
        use crate::infrastructure::external::frontmost::SystemEventsFrontmost;
        use crate::infrastructure::external::keystroke::EnigoCopyInjector;
        use crate::infrastructure::external::pasteboard::SystemPasteboard;

        Self::with_dependencies(
            Box::new(SystemEventsFrontmost),
            Box::new(EnigoCopyInjector::new()),
            Box::new(SystemPasteboard),
        )
    }

    /// 依存を注入してCaptureServiceを作成（テスト用）
    ///
    /// # Arguments
    /// * `frontmost` - 前面アプリケーション解決の実装
    /// * `injector` - コピーキーストローク合成の実装
    /// * `pasteboard` - ペーストボード読み取りの実装
    pub fn with_dependencies(
        frontmost: Box<dyn FrontmostResolver>,
        injector: Box<dyn CopyInjector>,
        pasteboard: Box<dyn PasteboardReader>,
    ) -> Self {
        Self {
            frontmost,
            injector,
            pasteboard,
            state: Mutex::new(CaptureState::Idle),
            posted_chords: AtomicU64::new(0),
        }
    }

    /// 現在のキャプチャ状態を返す
    pub fn state(&self) -> CaptureState {
        self.state
            .lock()
            .map(|st| *st)
            .unwrap_or(CaptureState::Idle)
    }

    /// これまでに送出したコピーチョードの累計数を返す
    ///
    /// キーリスナーはキャプチャ前後でこの値を比較し、自己注入した
    /// Metaイベントのエコーを物理キー状態の追跡から除外します。
    pub fn posted_copy_chords(&self) -> u64 {
        self.posted_chords.load(Ordering::SeqCst)
    }

    /// 前面アプリケーションの選択テキストをキャプチャ
    ///
    /// キーイベントコールバック内から同期的に呼ばれ、完了まで呼び出し元
    /// スレッドをブロックします。Idle→Capturing遷移後、ルーチンが戻る際は
    /// 成功失敗に関わらず必ずIdleへ戻ります。
    ///
    /// # Returns
    /// * `Some(CapturedSelection)` - ペーストボードから文字列を取得できた場合
    /// * `None` - いずれかの失敗条件に該当した場合（診断メッセージ1行を出力）
    pub fn capture_selection(&self) -> Option<CapturedSelection> {
        if let Ok(mut st) = self.state.lock() {
            *st = CaptureState::Capturing;
        }
        let _reset = scopeguard::guard(&self.state, |state| {
            if let Ok(mut st) = state.lock() {
                *st = CaptureState::Idle;
            }
        });

        self.run_capture()
    }

    fn run_capture(&self) -> Option<CapturedSelection> {
        let app = match self.frontmost.frontmost_app() {
            Ok(app) => app,
            Err(_) => {
                emit_diagnostic("Failed to get frontmost application.");
                return None;
            }
        };

        if app.name.is_none() {
            emit_diagnostic("Failed to get frontmost application's name.");
            return None;
        }

        // コピー合成とペーストボード読み取りは同期しない（既知のレース）。
        // ターゲットアプリがコピーを処理した確認シグナルは存在せず、応答の
        // 遅いアプリでは直前のペーストボード内容が読める。ここに待機や
        // リトライを挟まないこと。挟むと観測可能な振る舞いが変わる。
        if let Err(e) = self.injector.post_copy_chord() {
            emit_diagnostic(&format!("Failed to post copy keystroke: {}", e));
            return None;
        }
        self.posted_chords.fetch_add(1, Ordering::SeqCst);

        match self.pasteboard.read_text() {
            Ok(Some(text)) => Some(CapturedSelection::new(text)),
            Ok(None) | Err(_) => {
                emit_diagnostic("Failed to read text from the pasteboard.");
                None
            }
        }
    }
}

impl Default for CaptureService {
    fn default() -> Self {
        Self::new()
    }
}
