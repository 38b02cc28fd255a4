//! システムペーストボード読み取りモジュール。
//! arboard を優先し、失敗時は pbpaste サブプロセスへフォールバックします。
use crate::application::traits::PasteboardReader;
use crate::error::{Result, SelcapError};
use arboard::Clipboard;
use std::process::Command;

/// システムペーストボードを読み取る本番実装
pub struct SystemPasteboard;

impl PasteboardReader for SystemPasteboard {
    /// 現在の文字列ペイロードを返します。
    ///
    /// # Returns
    /// * `Ok(Some(text))` - 文字列ペイロードがある場合（加工なし）
    /// * `Ok(None)` - ペーストボードに文字列が無い場合
    /// * `Err` - arboard・pbpaste の双方が利用できない場合
    fn read_text(&self) -> Result<Option<String>> {
        if let Ok(mut cb) = Clipboard::new() {
            match cb.get_text() {
                Ok(text) => return Ok(Some(text)),
                Err(arboard::Error::ContentNotAvailable) => return Ok(None),
                Err(_) => {} // pbpaste フォールバックへ
            }
        }
        read_via_pbpaste()
    }
}

/// pbpaste サブプロセスからペーストボード文字列を取得します。
fn read_via_pbpaste() -> Result<Option<String>> {
    let output = Command::new("pbpaste")
        .output()
        .map_err(|e| SelcapError::PasteboardUnavailable(format!("pbpaste spawn failed: {}", e)))?;

    if !output.status.success() {
        return Err(SelcapError::PasteboardUnavailable(
            "pbpaste exited with failure".to_string(),
        ));
    }

    // pbpaste は文字列ペイロードが無いとき何も出力しない
    let text = String::from_utf8_lossy(&output.stdout).to_string();
    Ok(if text.is_empty() { None } else { Some(text) })
}
