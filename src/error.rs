//! 統一エラーハンドリング
//!
//! このモジュールは selcap アプリケーション全体で使用する統一エラー型を定義します。
//! キャプチャ処理内の失敗（前面アプリ不明・ペーストボード空など）はエラーではなく
//! 診断メッセージ + 空結果として扱うため、ここには含まれません。

use crate::hotkey::HotkeyError;
use thiserror::Error;

/// selcap アプリケーション全体で使用する統一エラー型
#[derive(Debug, Error)]
pub enum SelcapError {
    // ========================================
    // ホットキー監視関連エラー
    // ========================================
    #[error("Key listener init failed: {0}")]
    ListenerInitFailed(String),

    #[error("Key listener already active")]
    ListenerAlreadyActive,

    #[error("Capture channel closed: {0}")]
    CaptureChannelClosed(String),

    // ========================================
    // キャプチャ基盤エラー（シーム実装が返す下位エラー）
    // ========================================
    #[error("Keystroke injection failed: {0}")]
    InjectionFailed(String),

    #[error("Pasteboard unavailable: {0}")]
    PasteboardUnavailable(String),

    #[error("Frontmost application query failed: {0}")]
    FrontmostQueryFailed(String),

    // ========================================
    // IPC関連エラー
    // ========================================
    #[error("IPC connection failed: {0}")]
    IpcConnectionFailed(String),

    #[error("IPC serialization error: {0}")]
    IpcSerializationError(String),

    // ========================================
    // 権限・システムエラー
    // ========================================
    #[error("Accessibility permission denied: {0}")]
    PermissionDenied(String),

    #[error("System error: {0}")]
    SystemError(String),
}

/// 統一Result型エイリアス
pub type Result<T> = std::result::Result<T, SelcapError>;

// ========================================
// 既存エラー型からの自動変換実装
// ========================================

/// HotkeyError からの変換
impl From<HotkeyError> for SelcapError {
    fn from(error: HotkeyError) -> Self {
        match error {
            HotkeyError::ListenInitFailed(msg) => SelcapError::ListenerInitFailed(msg),
            HotkeyError::AlreadyListening => SelcapError::ListenerAlreadyActive,
            HotkeyError::ChannelClosed(msg) => SelcapError::CaptureChannelClosed(msg),
            HotkeyError::SystemRequirementNotMet(msg) => SelcapError::SystemError(msg),
        }
    }
}

// ========================================
// 後方互換性の維持
// ========================================

/// String からの変換（既存の文字列エラーとの互換性）
impl From<String> for SelcapError {
    fn from(message: String) -> Self {
        SelcapError::SystemError(message)
    }
}

/// &str からの変換（便利メソッド）
impl From<&str> for SelcapError {
    fn from(message: &str) -> Self {
        SelcapError::SystemError(message.to_string())
    }
}

/// String への変換（既存の文字列エラーとの互換性）
impl From<SelcapError> for String {
    fn from(error: SelcapError) -> Self {
        error.to_string()
    }
}

// ========================================
// ヘルパー関数
// ========================================

impl SelcapError {
    /// エラーが再試行可能かどうかを判定
    pub fn is_retryable(&self) -> bool {
        matches!(self, SelcapError::IpcConnectionFailed(_))
    }

    /// エラーがユーザーアクションで解決可能かどうかを判定
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            SelcapError::PermissionDenied(_) | SelcapError::ListenerInitFailed(_)
        )
    }

    /// エラーの重要度レベルを取得（ログレベル代替）
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SelcapError::PermissionDenied(_) => ErrorSeverity::Error,

            SelcapError::ListenerInitFailed(_) => ErrorSeverity::Error,

            SelcapError::IpcConnectionFailed(_) => ErrorSeverity::Warning,

            _ => ErrorSeverity::Debug,
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Debug,
    Info,
    Warning,
    Error,
}
