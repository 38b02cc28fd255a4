//! selcap CLI: `selcapd` デーモンの簡易コントローラ。
//! `Capture` / `Last` / `Status` / `Health` の各コマンドを `ipc::send_cmd` で送信します。
use clap::Parser;
use selcap::ipc::{IpcCmd, send_cmd};
use selcap::utils::env::load_env;

mod cli;

use cli::{Cli, Cmd};

fn main() {
    load_env();

    let cli = Cli::parse();

    // サブコマンド省略時はキャプチャを実行
    let cmd = match cli.cmd.unwrap_or(Cmd::Capture) {
        Cmd::Capture => IpcCmd::Capture,
        Cmd::Last => IpcCmd::Last,
        Cmd::Status => IpcCmd::Status,
        Cmd::Health => IpcCmd::Health,
    };

    match send_cmd(&cmd) {
        Ok(resp) if resp.ok => println!("{}", resp.msg),
        Ok(resp) => {
            eprintln!("Error: {}", resp.msg);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
