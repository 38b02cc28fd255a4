/// ピリオドキーのmacOS仮想キーコード（ANSI配列、kVK_ANSI_Period）
pub const PERIOD_KEY_CODE: u16 = 47;

/// キー押下イベントの正規化形
///
/// rdevのイベントは修飾キー状態を持たないため、リスナー側でCmdキーの
/// 押下/解放を追跡し、判定時点の状態を埋め込んだこの形に変換します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDown {
    /// Commandキーが押されているか
    pub command: bool,
    /// macOS仮想キーコード
    pub key_code: u16,
}

impl KeyDown {
    /// 新しいKeyDownイベントを作成します。
    pub fn new(command: bool, key_code: u16) -> Self {
        Self { command, key_code }
    }
}

/// キャプチャ発火チョード（Cmd+ピリオド）に一致するか判定する純粋述語
///
/// 副作用なし。Commandビットが立っていて、かつキーコードがピリオド（47）の
/// 場合のみtrueを返します。
pub fn is_chord_matched(event: &KeyDown) -> bool {
    event.command && event.key_code == PERIOD_KEY_CODE
}
