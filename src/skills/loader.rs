//! 技能加载器
//!
//! 从技能目录加载技能目录（catalog）：
//! ```text
//! skills/
//! ├── weather/
//! │   ├── skill.toml      # [skill] key / when / remain_for
//! │   └── content.md      # 插入后展示给推理后端的正文
//! └── ...
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::message::Skill;

/// skill.toml 的 [skill] 段
#[derive(Debug, Clone, Deserialize)]
pub struct SkillMeta {
    pub key: String,
    #[serde(default)]
    pub when: String,
    #[serde(default)]
    pub remain_for: u32,
}

#[derive(Debug, Deserialize)]
struct SkillToml {
    skill: SkillMeta,
}

/// 技能加载器
pub struct SkillLoader {
    skills_dir: PathBuf,
}

impl SkillLoader {
    pub fn new(skills_dir: impl AsRef<Path>) -> Self {
        Self {
            skills_dir: skills_dir.as_ref().to_path_buf(),
        }
    }

    /// 加载目录下所有技能，按 key 排序；目录不存在时返回空
    pub fn load_all(&self) -> anyhow::Result<Vec<Skill>> {
        let mut skills = Vec::new();
        if !self.skills_dir.exists() {
            return Ok(skills);
        }

        for entry in std::fs::read_dir(&self.skills_dir)?.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            match self.load_skill(&path) {
                Ok(Some(skill)) => skills.push(skill),
                Ok(None) => {}
                Err(e) => tracing::warn!(dir = %path.display(), error = %e, "skip invalid skill"),
            }
        }

        skills.sort_by(|a, b| a.key.cmp(&b.key));
        tracing::info!("Loaded {} skills", skills.len());
        Ok(skills)
    }

    /// 加载单个技能；没有 skill.toml 的目录返回 None
    fn load_skill(&self, dir: &Path) -> anyhow::Result<Option<Skill>> {
        let skill_toml = dir.join("skill.toml");
        if !skill_toml.exists() {
            return Ok(None);
        }
        let meta = toml::from_str::<SkillToml>(&std::fs::read_to_string(&skill_toml)?)?.skill;
        let content = std::fs::read_to_string(dir.join("content.md")).unwrap_or_default();
        Ok(Some(Skill {
            key: meta.key,
            when: meta.when,
            content,
            remain_for: meta.remain_for,
        }))
    }
}
