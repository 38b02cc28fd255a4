//! グローバルホットキー監視のメインサービス
//! selcapdプロセスに統合されるHotkeyServiceを提供

use crate::application::capture_service::CaptureService;
use crate::domain::selection::CapturedSelection;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

pub mod key_listener;

use key_listener::KeyListener;

/// ホットキーサービスエラー型
#[derive(Debug, Clone)]
pub enum HotkeyError {
    /// rdev監視の初期化に失敗
    ListenInitFailed(String),
    /// 既に監視中
    AlreadyListening,
    /// キャプチャ結果チャンネルがクローズされている
    ChannelClosed(String),
    /// システム要件が満たされていない
    SystemRequirementNotMet(String),
}

impl fmt::Display for HotkeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotkeyError::ListenInitFailed(msg) => {
                write!(f, "❌ キーボードフック初期化エラー: {}", msg)
            }
            HotkeyError::AlreadyListening => {
                write!(f, "❌ ホットキー監視は既に開始されています")
            }
            HotkeyError::ChannelClosed(msg) => {
                write!(f, "❌ キャプチャ結果チャンネルが切断されています: {}", msg)
            }
            HotkeyError::SystemRequirementNotMet(msg) => {
                write!(f, "❌ システム要件エラー: {}", msg)
            }
        }
    }
}

impl std::error::Error for HotkeyError {}

/// ホットキー監視の管理を行うサービス
pub struct HotkeyService {
    enabled: bool,
    listener: Option<tokio::task::JoinHandle<Result<(), String>>>,
}

impl HotkeyService {
    /// 新しいHotkeyServiceインスタンスを作成
    pub fn new() -> Self {
        Self {
            enabled: false,
            listener: None,
        }
    }

    /// システム要件をチェック
    pub fn check_system_requirements() -> Result<(), HotkeyError> {
        // macOS以外のプラットフォームはサポート対象外
        #[cfg(not(target_os = "macos"))]
        {
            return Err(HotkeyError::SystemRequirementNotMet(
                "ホットキー機能はmacOSでのみサポートされています".to_string(),
            ));
        }

        #[cfg(target_os = "macos")]
        {
            Ok(())
        }
    }

    /// ホットキー監視を開始
    ///
    /// rdev::listenを専有するブロッキングスレッドを起動します。OSレベルの
    /// 入力フックはinit-onlyライフサイクルで、一度登録されるとプロセス終了
    /// まで解除されません。
    ///
    /// # Arguments
    /// * `engine` - チョード検出時に実行するキャプチャサービス
    /// * `result_tx` - キャプチャ結果をデーモンへ転送するSender
    ///
    /// # Returns
    /// * `Ok(())` - 正常に開始された場合
    /// * `Err(HotkeyError)` - 各種エラー（システム要件、チャンネル切断等）
    pub async fn start(
        &mut self,
        engine: Arc<CaptureService>,
        result_tx: mpsc::UnboundedSender<CapturedSelection>,
    ) -> Result<(), HotkeyError> {
        if self.enabled {
            return Err(HotkeyError::AlreadyListening);
        }

        Self::check_system_requirements()?;

        if result_tx.is_closed() {
            return Err(HotkeyError::ChannelClosed(
                "receiver already dropped".to_string(),
            ));
        }

        let listener = KeyListener::new(engine, result_tx);
        let handle = tokio::task::spawn_blocking(move || listener.start_listening());

        self.listener = Some(handle);
        self.enabled = true;

        println!("HotkeyService started successfully");
        Ok(())
    }

    /// ホットキー監視を停止
    ///
    /// デーモン終了時のブックキーピング用。監視タスクはabortされますが、
    /// rdevが登録したOSレベルの入力フック自体は解除されません
    /// （プロセス終了まで有効なままの意図的なリーク）。
    pub async fn stop(&mut self) -> Result<(), HotkeyError> {
        if !self.enabled {
            return Ok(()); // 既に停止済み
        }

        if let Some(handle) = self.listener.take() {
            handle.abort();

            // タスクの完了を待機（タイムアウト付き）
            match tokio::time::timeout(tokio::time::Duration::from_millis(1000), handle).await {
                Ok(_) => {
                    println!("KeyListener task completed gracefully");
                }
                Err(_) => {
                    println!("KeyListener task terminated (timeout)");
                }
            }
        }

        self.enabled = false;
        println!("HotkeyService stopped");
        Ok(())
    }

    /// サービスが有効かどうかを返す
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for HotkeyService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hotkey_service_new() {
        let service = HotkeyService::new();
        assert!(!service.is_enabled());
    }

    #[tokio::test]
    async fn test_hotkey_service_default() {
        let service = HotkeyService::default();
        assert!(!service.is_enabled());
    }

    #[tokio::test]
    async fn test_stop_when_not_started() {
        let mut service = HotkeyService::new();
        let result = service.stop().await;
        assert!(result.is_ok());
        assert!(!service.is_enabled());
    }

    #[tokio::test]
    async fn test_channel_closed_error() {
        let mut service = HotkeyService::new();
        let (tx, rx) = mpsc::unbounded_channel();

        // チャンネルを閉じる
        drop(rx);

        let result = service
            .start(Arc::new(CaptureService::new()), tx)
            .await;

        #[cfg(target_os = "macos")]
        assert!(matches!(result, Err(HotkeyError::ChannelClosed(_))));

        #[cfg(not(target_os = "macos"))]
        assert!(matches!(
            result,
            Err(HotkeyError::SystemRequirementNotMet(_))
        ));
    }

    #[test]
    fn test_system_requirements_check() {
        let result = HotkeyService::check_system_requirements();

        #[cfg(target_os = "macos")]
        {
            assert!(result.is_ok());
        }

        #[cfg(not(target_os = "macos"))]
        {
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_hotkey_error_display() {
        let errors = vec![
            HotkeyError::ListenInitFailed("test".to_string()),
            HotkeyError::AlreadyListening,
            HotkeyError::ChannelClosed("test".to_string()),
            HotkeyError::SystemRequirementNotMet("test".to_string()),
        ];

        for error in errors {
            let display = format!("{}", error);
            assert!(display.contains("❌"));
        }
    }
}
