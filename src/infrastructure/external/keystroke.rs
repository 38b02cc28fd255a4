//! Cmd+C キーストローク合成モジュール
//!
//! 実ハードウェアと同じHIDイベントストリームへコピーチョードを送出します。
//! rdevのイベントループと常駐Enigoインスタンスは競合するため、
//! キャプチャごとに短命のEnigoインスタンスを生成して使い捨てます。

use crate::application::traits::CopyInjector;
use crate::error::{Result, SelcapError};
use enigo::{
    Direction::{Press, Release},
    Enigo, Key, Keyboard, Settings,
};

/// Cキーの仮想キーコード（ANSI配列、kVK_ANSI_C）
const C_VIRTUAL_KEY: u32 = 8;

/// Enigoを使用するコピーキーストローク注入の本番実装
pub struct EnigoCopyInjector {
    settings: Settings,
}

impl EnigoCopyInjector {
    /// 新しいEnigoCopyInjectorを作成
    pub fn new() -> Self {
        Self {
            settings: Settings {
                mac_delay: 20,
                ..Default::default()
            },
        }
    }
}

impl Default for EnigoCopyInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl CopyInjector for EnigoCopyInjector {
    /// Cmd+Cのキーイベント列を送出します。
    ///
    /// 修飾down → Cdown → Cup → 修飾up の4イベントを発行して戻るだけで、
    /// ターゲットアプリがコピーを処理したかは確認しません。
    fn post_copy_chord(&self) -> Result<()> {
        let mut enigo = Enigo::new(&self.settings)
            .map_err(|e| SelcapError::InjectionFailed(format!("Enigo init error: {}", e)))?;

        enigo
            .key(Key::Meta, Press)
            .map_err(|e| SelcapError::InjectionFailed(format!("Meta press failed: {}", e)))?;
        enigo
            .key(Key::Other(C_VIRTUAL_KEY), Press)
            .map_err(|e| SelcapError::InjectionFailed(format!("C press failed: {}", e)))?;
        enigo
            .key(Key::Other(C_VIRTUAL_KEY), Release)
            .map_err(|e| SelcapError::InjectionFailed(format!("C release failed: {}", e)))?;
        enigo
            .key(Key::Meta, Release)
            .map_err(|e| SelcapError::InjectionFailed(format!("Meta release failed: {}", e)))?;

        Ok(())
    }
}
