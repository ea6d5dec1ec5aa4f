//! 应用配置：从 config/agent.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `BEE_REACT__*` 覆盖（双下划线表示嵌套，如 `BEE_REACT__SKILLS__DONT_REPEAT_TURNS=3`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::AgentError;
use crate::react::prompts::DEFAULT_PERSONALITY;
use crate::skills::DEFAULT_HISTORY_WINDOW;

/// 应用配置根
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentSection,
    pub skills: SkillsSection,
}

/// [agent] 段：人格与 ReAct 步数上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    pub personality: String,
    /// ReAct 循环中最多执行几轮工具调度；未设置表示不限
    pub max_react_steps: Option<usize>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            personality: DEFAULT_PERSONALITY.to_string(),
            max_react_steps: None,
        }
    }
}

/// [skills] 段：技能目录、防重复窗口、相关性模型可见的对话条数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkillsSection {
    pub dir: Option<PathBuf>,
    /// 最近 N 条驻留记录中出现过的技能不再被选中；<= 0 关闭
    pub dont_repeat_turns: i64,
    pub history_window: usize,
}

impl Default for SkillsSection {
    fn default() -> Self {
        Self {
            dir: None,
            dont_repeat_turns: 0,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}

/// 加载配置，环境变量 BEE_REACT__* 可覆盖
///
/// 1. config/agent.toml 或 ../config/agent.toml（存在则作为第一源）
/// 2. 若传入 config_path，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, AgentError> {
    let mut builder = config::Config::builder();

    for name in ["config/agent", "../config/agent"] {
        if std::path::Path::new(&format!("{}.toml", name)).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(path) = config_path {
        builder = builder.add_source(config::File::from(path).required(false));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("BEE_REACT")
            .separator("__")
            .try_parsing(true),
    );

    Ok(builder.build()?.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.agent.personality, DEFAULT_PERSONALITY);
        assert!(cfg.agent.max_react_steps.is_none());
        assert_eq!(cfg.skills.dont_repeat_turns, 0);
        assert_eq!(cfg.skills.history_window, 10);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("agent.toml");
        std::fs::write(
            &path,
            "[agent]\npersonality = \"You are Bee.\"\nmax_react_steps = 5\n\n[skills]\ndont_repeat_turns = 3\n",
        )
        .unwrap();
        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.agent.personality, "You are Bee.");
        assert_eq!(cfg.agent.max_react_steps, Some(5));
        assert_eq!(cfg.skills.dont_repeat_turns, 3);
        assert_eq!(cfg.skills.history_window, 10);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("agent.toml");
        std::fs::write(&path, "[agent\npersonality = ").unwrap();
        let err = load_config(Some(path)).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }
}
