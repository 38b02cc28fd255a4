use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "Selection capture client (selcapd control)")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// 選択テキストのキャプチャを即時実行（ホットキーと同じルーチン）
    Capture,
    /// 直近のキャプチャ結果を表示
    Last,
    /// デーモン状態取得
    Status,
    /// ヘルスチェック
    Health,
}
