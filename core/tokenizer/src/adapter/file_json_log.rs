//! Log 実装（ファイルへの JSONL 追記 / stderr / 何もしない）
//!
//! ログの出力先はファイルのみ。エラー時のコンソール表示（stderr）とは別。

use crate::error::Error;
use crate::ports::outbound::{Log, LogRecord};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// ファイルへ JSONL を追記する Log 実装
pub struct FileJsonLog {
    path: PathBuf,
}

impl FileJsonLog {
    /// ログファイルパスへ追記する logger を生成する。
    /// 親ディレクトリが無ければ作成する（初回書き込み時）。
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Log for FileJsonLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io_msg(format!("{}: {}", parent.display(), e)))?;
        }
        let mut w = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io_msg(format!("{}: {}", self.path.display(), e)))?;
        let line = serde_json::to_string(record)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
        w.flush()?;
        Ok(())
    }
}

/// 人間向けに 1 行で stderr へ出す Log 実装（--verbose 用）
#[derive(Debug, Clone, Default)]
pub struct StderrLog;

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let mut line = format!("[{}] {} {}", record.level.as_str(), record.ts, record.message);
        if let Some(fields) = &record.fields {
            let summary = serde_json::to_string(fields)?;
            line.push(' ');
            line.push_str(&summary);
        }
        eprintln!("{}", line);
        Ok(())
    }
}

/// 何も出力しない Log 実装（既定・テスト用）
#[derive(Debug, Clone, Default)]
pub struct NoopLog;

impl Log for NoopLog {
    fn log(&self, _record: &LogRecord) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::LogLevel;

    #[test]
    fn test_noop_log() {
        let rec = LogRecord::new(LogLevel::Info, "cli", "lifecycle", "test");
        assert!(NoopLog.log(&rec).is_ok());
    }

    #[test]
    fn test_file_json_log_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("tkn.jsonl");
        let log = FileJsonLog::new(&path);

        log.log(&LogRecord::new(LogLevel::Info, "cli", "lifecycle", "command started"))
            .unwrap();
        log.log(
            &LogRecord::new(LogLevel::Error, "cli", "error", "boom")
                .field("exit_code", serde_json::json!(76)),
        )
        .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["level"], "error");
        assert_eq!(second["fields"]["exit_code"], 76);
    }
}
