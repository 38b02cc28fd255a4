/// ホットキー1回分のキャプチャ結果
///
/// コピーシミュレート直後にペーストボードから読み取ったテキスト。
/// トリガーごとに作り直され、永続化されず、次のトリガーで上書きされます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedSelection {
    /// ペーストボードから読み取った文字列
    pub text: String,
}

impl CapturedSelection {
    /// 新しいCapturedSelectionを作成します。
    pub fn new(text: String) -> Self {
        Self { text }
    }

    /// CLI表示用のプレビューを返します。
    ///
    /// テキストは最大30文字に切り詰められ、それ以上の場合は"..."が追加されます。
    pub fn preview(&self) -> String {
        self.text.chars().take(30).collect::<String>()
            + if self.text.chars().count() > 30 {
                "..."
            } else {
                ""
            }
    }
}
