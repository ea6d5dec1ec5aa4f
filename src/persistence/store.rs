//! 对话持久化
//!
//! 将对话历史写入/从 JSON 文件加载，用于跨进程或跨会话恢复。

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::message::Message;
use crate::persistence::{decode_messages, encode_messages};

/// 单文件 JSON 持久化
#[derive(Debug)]
pub struct ConversationPersistence {
    path: PathBuf,
}

impl ConversationPersistence {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 从 JSON 文件加载对话历史；文件不存在时返回空 Vec
    pub fn load(&self) -> anyhow::Result<Vec<Message>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(decode_messages(reader)?)
    }

    /// 将对话历史写入 JSON 文件；父目录不存在时自动创建
    pub fn save(&self, messages: &[Message]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        encode_messages(&mut writer, messages)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ConversationPersistence::new(tmp.path().join("nested/dir/history.json"));
        assert!(store.load().unwrap().is_empty());

        let history = vec![Message::user("hello"), Message::agent("hi there")];
        store.save(&history).unwrap();
        assert_eq!(store.load().unwrap(), history);
    }

    #[test]
    fn test_load_corrupt_file_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");
        std::fs::write(&path, r#"[{"kind": "hologram"}]"#).unwrap();
        assert!(ConversationPersistence::new(&path).load().is_err());
    }
}
