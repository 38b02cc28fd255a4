//! 前面アプリケーション問い合わせユーティリティ。
//! System Events への osascript 呼び出しで前面プロセス名を解決します。
use crate::application::traits::{FrontmostApp, FrontmostResolver};
use crate::error::{Result, SelcapError};
use std::process::{Command, Output};
#[cfg(test)]
use std::sync::OnceLock;

#[cfg(test)]
type OsaScriptRunner = Box<dyn Fn(String) -> std::io::Result<Output> + Send + Sync>;

#[cfg(test)]
static TEST_OSASCRIPT_RUNNER: OnceLock<OsaScriptRunner> = OnceLock::new();

#[cfg(test)]
fn set_test_osascript_runner(
    runner: impl Fn(String) -> std::io::Result<Output> + Send + Sync + 'static,
) {
    let _ = TEST_OSASCRIPT_RUNNER.set(Box::new(runner));
}

fn run_osascript(script: String) -> std::io::Result<Output> {
    #[cfg(test)]
    if let Some(runner) = TEST_OSASCRIPT_RUNNER.get() {
        // テスト差し替えがある場合のみ使用する必要があるため Option で有無判定する
        return runner(script);
    }
    // テスト差し替えがない場合は本番実装を使う（通常運用では差し替え不要）
    Command::new("osascript").arg("-e").arg(script).output()
}

const FRONTMOST_NAME_SCRIPT: &str =
    r#"tell application "System Events" to get name of first application process whose frontmost is true"#;

/// System Events 経由で前面アプリケーションを解決するリゾルバ
pub struct SystemEventsFrontmost;

impl FrontmostResolver for SystemEventsFrontmost {
    /// 前面アプリケーションを問い合わせます。
    ///
    /// # Returns
    /// * `Ok(FrontmostApp)` - 解決できた場合（表示名が空なら `name: None`）
    /// * `Err` - 前面プロセス自体が解決できない場合
    fn frontmost_app(&self) -> Result<FrontmostApp> {
        let output = run_osascript(FRONTMOST_NAME_SCRIPT.to_string()).map_err(|e| {
            SelcapError::FrontmostQueryFailed(format!("osascript execution failed: {}", e))
        })?;

        if !output.status.success() {
            let err = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SelcapError::FrontmostQueryFailed(err));
        }

        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(FrontmostApp {
            name: if name.is_empty() { None } else { Some(name) },
        })
    }
}
