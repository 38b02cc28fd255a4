//! Application層の抽象化トレイト定義
//! OS入力ストリーム・ペーストボードへの依存を抽象化し、
//! アクセシビリティ権限なしでテスト可能な構造を提供します

use crate::error::Result;

/// 前面アプリケーション情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmostApp {
    /// OSが報告する表示名（解決できない場合はNone）
    pub name: Option<String>,
}

/// 前面アプリケーション問い合わせの抽象化
pub trait FrontmostResolver: Send + Sync {
    /// 現在キーボードフォーカスを持つアプリケーションを返す
    ///
    /// 前面アプリケーション自体が解決できない場合はErr
    fn frontmost_app(&self) -> Result<FrontmostApp>;
}

/// コピーキーストローク合成の抽象化
pub trait CopyInjector: Send + Sync {
    /// Cmd+Cキーイベント列を実ハードウェアと同じ入力ストリームへ送出
    ///
    /// 送出順序: 修飾キーdown → Cキーdown → Cキーup → 修飾キーup
    fn post_copy_chord(&self) -> Result<()>;
}

/// システムペーストボード読み取りの抽象化
pub trait PasteboardReader: Send + Sync {
    /// 現在の文字列ペイロードを返す
    ///
    /// ペーストボードに文字列が無い場合はOk(None)
    fn read_text(&self) -> Result<Option<String>>;
}
