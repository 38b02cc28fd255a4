//! キーイベント監視とキャプチャ起動を担当するKeyListener
//! rdev listenでキーダウンイベントを受動観測し、Cmd+ピリオド検出時に
//! キャプチャルーチンをコールバック内で同期実行してデーモンへ転送

use crate::application::capture_service::CaptureService;
use crate::domain::chord::{KeyDown, is_chord_matched};
use crate::domain::selection::CapturedSelection;
use rdev::{Event, EventType, Key, listen};
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::mpsc;

// グローバル状態管理（rdevコールバックは関数ポインタのため共有状態はstatic経由）
static CMD_PRESSED: OnceLock<Arc<Mutex<bool>>> = OnceLock::new();
static CAPTURE_ENGINE: OnceLock<Arc<CaptureService>> = OnceLock::new();
static RESULT_TX: OnceLock<mpsc::UnboundedSender<CapturedSelection>> = OnceLock::new();
static PENDING_META_ECHOES: OnceLock<Arc<Mutex<u8>>> = OnceLock::new();

/// キーイベントを処理してキャプチャを起動するリスナー
pub struct KeyListener {
    engine: Arc<CaptureService>,
    result_tx: mpsc::UnboundedSender<CapturedSelection>,
}

impl KeyListener {
    /// 新しいKeyListenerインスタンスを作成
    ///
    /// # Arguments
    /// * `engine` - チョード検出時に実行するキャプチャサービス
    /// * `result_tx` - キャプチャ結果をデーモンへ転送するSender
    pub fn new(
        engine: Arc<CaptureService>,
        result_tx: mpsc::UnboundedSender<CapturedSelection>,
    ) -> Self {
        Self { engine, result_tx }
    }

    /// キーイベントの受動監視を開始
    ///
    /// rdev::listenは呼び出しスレッドを専有し、正常時は戻りません。
    /// 登録されるOSレベルの入力フックに解除手段はなく、プロセス終了まで
    /// 有効なままです（init-onlyライフサイクル）。
    ///
    /// # Returns
    /// * `Ok(())` - rdev::listenが終了した場合（通常は到達しない）
    /// * `Err(String)` - グローバル状態の初期化または監視開始に失敗した場合
    pub fn start_listening(self) -> Result<(), String> {
        CMD_PRESSED
            .set(Arc::new(Mutex::new(false)))
            .map_err(|_| "CMD_PRESSED already initialized".to_string())?;

        CAPTURE_ENGINE
            .set(self.engine)
            .map_err(|_| "CAPTURE_ENGINE already initialized".to_string())?;

        RESULT_TX
            .set(self.result_tx)
            .map_err(|_| "RESULT_TX already initialized".to_string())?;

        PENDING_META_ECHOES
            .set(Arc::new(Mutex::new(0)))
            .map_err(|_| "PENDING_META_ECHOES already initialized".to_string())?;

        println!("Starting keyboard event listening...");

        if let Err(error) = listen(Self::handle_key_event) {
            return Err(format!("キーイベント監視の開始に失敗: {:?}", error));
        }

        Ok(())
    }

    /// キーイベントのハンドリング関数（rdev::listenのコールバック）
    ///
    /// 観測のみでイベントは変更されず、ピリオドキー自体も前面アプリへ
    /// そのまま届きます。チョード一致時はキャプチャをこのスレッド上で
    /// 同期実行し、完了まで後続イベントの処理をブロックします。
    ///
    /// # Arguments
    /// * `event` - rdevから受信したキーイベント
    fn handle_key_event(event: Event) {
        let cmd_state = CMD_PRESSED.get().unwrap();
        let meta_echoes = PENDING_META_ECHOES.get().unwrap();

        match event.event_type {
            EventType::KeyPress(key) => {
                // Cmdキー状態更新
                if Self::is_cmd_key(&key) {
                    Self::track_meta_press(cmd_state, meta_echoes);
                }

                // チョード判定は正規化イベントに対する純粋述語で行う
                if let Some(key_code) = Self::key_code(&key) {
                    let key_down = KeyDown::new(Self::is_cmd_pressed(cmd_state), key_code);
                    if is_chord_matched(&key_down) {
                        Self::run_capture();
                    }
                }
            }
            EventType::KeyRelease(key) => {
                if Self::is_cmd_key(&key) {
                    Self::track_meta_release(cmd_state, meta_echoes);
                }
            }
            _ => {}
        }
    }

    /// チョード検出時のキャプチャ実行と結果転送
    fn run_capture() {
        let engine = CAPTURE_ENGINE.get().unwrap();
        let result_tx = RESULT_TX.get().unwrap();
        let meta_echoes = PENDING_META_ECHOES.get().unwrap();

        let posted_before = engine.posted_copy_chords();
        let selection = engine.capture_selection();

        // 注入したMeta押下/解放は同じ入力ストリーム経由でこのコールバックへも
        // エコーされる。物理Cmd状態（ユーザーはまだホールド中）を壊さないよう、
        // コピーチョードが実際に送出された場合のみエコー2件分を追跡から除外する
        if engine.posted_copy_chords() > posted_before {
            Self::arm_meta_echoes(meta_echoes);
        }

        if let Some(selection) = selection {
            println!("Selected text: {}", selection.text);
            if let Err(e) = result_tx.send(selection) {
                eprintln!("Failed to forward captured selection: {}", e);
            }
        }
    }

    /// Meta押下イベントでCmd状態を更新（自己注入エコーは除外）
    fn track_meta_press(cmd_state: &Arc<Mutex<bool>>, meta_echoes: &Arc<Mutex<u8>>) {
        if Self::consume_meta_echo(meta_echoes) {
            return;
        }
        if let Ok(mut pressed) = cmd_state.lock() {
            *pressed = true;
        }
    }

    /// Meta解放イベントでCmd状態を更新（自己注入エコーは除外）
    fn track_meta_release(cmd_state: &Arc<Mutex<bool>>, meta_echoes: &Arc<Mutex<u8>>) {
        if Self::consume_meta_echo(meta_echoes) {
            return;
        }
        if let Ok(mut pressed) = cmd_state.lock() {
            *pressed = false;
        }
    }

    /// コピーチョード送出後に到着するMetaエコー2件（押下+解放）を予約
    fn arm_meta_echoes(meta_echoes: &Arc<Mutex<u8>>) {
        if let Ok(mut pending) = meta_echoes.lock() {
            *pending = pending.saturating_add(2);
        }
    }

    /// 予約済みエコーが残っていれば1件消費してtrueを返す
    fn consume_meta_echo(meta_echoes: &Arc<Mutex<u8>>) -> bool {
        if let Ok(mut pending) = meta_echoes.lock() {
            if *pending > 0 {
                *pending -= 1;
                return true;
            }
        }
        false
    }

    /// Cmdキー（Meta）の判定
    ///
    /// # Arguments
    /// * `key` - 判定するキー
    ///
    /// # Returns
    /// * `true` - Cmdキーの場合
    /// * `false` - Cmdキーでない場合
    fn is_cmd_key(key: &Key) -> bool {
        matches!(key, Key::MetaLeft | Key::MetaRight)
    }

    /// Cmdキーが押されているかチェック
    ///
    /// # Arguments
    /// * `cmd_state` - Cmdキーの状態を保持するMutex
    ///
    /// # Returns
    /// * `true` - Cmdキーが押されている場合
    /// * `false` - Cmdキーが押されていない場合
    fn is_cmd_pressed(cmd_state: &Arc<Mutex<bool>>) -> bool {
        cmd_state.lock().map(|pressed| *pressed).unwrap_or(false)
    }

    /// rdevキーをmacOS仮想キーコード（ANSI配列）に変換
    ///
    /// # Arguments
    /// * `key` - 変換するキー
    ///
    /// # Returns
    /// * `Some(code)` - 対応表にあるキーの場合
    /// * `None` - 修飾キー・ファンクションキー等、対応表外のキー
    ///   （ピリオドではあり得ないためチョード判定をスキップできる）
    fn key_code(key: &Key) -> Option<u16> {
        let code = match key {
            Key::KeyA => 0,
            Key::KeyS => 1,
            Key::KeyD => 2,
            Key::KeyF => 3,
            Key::KeyH => 4,
            Key::KeyG => 5,
            Key::KeyZ => 6,
            Key::KeyX => 7,
            Key::KeyC => 8,
            Key::KeyV => 9,
            Key::KeyB => 11,
            Key::KeyQ => 12,
            Key::KeyW => 13,
            Key::KeyE => 14,
            Key::KeyR => 15,
            Key::KeyY => 16,
            Key::KeyT => 17,
            Key::Num1 => 18,
            Key::Num2 => 19,
            Key::Num3 => 20,
            Key::Num4 => 21,
            Key::Num6 => 22,
            Key::Num5 => 23,
            Key::Equal => 24,
            Key::Num9 => 25,
            Key::Num7 => 26,
            Key::Minus => 27,
            Key::Num8 => 28,
            Key::Num0 => 29,
            Key::RightBracket => 30,
            Key::KeyO => 31,
            Key::KeyU => 32,
            Key::LeftBracket => 33,
            Key::KeyI => 34,
            Key::KeyP => 35,
            Key::Return => 36,
            Key::KeyL => 37,
            Key::KeyJ => 38,
            Key::Quote => 39,
            Key::KeyK => 40,
            Key::SemiColon => 41,
            Key::BackSlash => 42,
            Key::Comma => 43,
            Key::Slash => 44,
            Key::KeyN => 45,
            Key::KeyM => 46,
            Key::Dot => 47,
            Key::Tab => 48,
            Key::Space => 49,
            Key::BackQuote => 50,
            Key::Backspace => 51,
            Key::Escape => 53,
            _ => return None,
        };
        Some(code)
    }
}
