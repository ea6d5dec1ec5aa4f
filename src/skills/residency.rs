//! 技能驻留：衰减上一轮的驻留集合，合并本轮新选中的技能

use crate::core::AgentError;
use crate::message::{last_residency, InsertedSkill, Message, Skill};

use super::SkillSelector;

/// 拆分技能：有适用条件的进入动态目录，其余为常驻技能
pub fn split_skills(skills: Vec<Skill>) -> (Vec<Skill>, Vec<Skill>) {
    skills.into_iter().partition(Skill::is_conditional)
}

/// 上一条驻留记录衰减一轮后的结果
pub fn carry_forward(history: &[Message]) -> Vec<InsertedSkill> {
    last_residency(history)
        .iter()
        .filter_map(InsertedSkill::decayed)
        .collect()
}

/// 合并：衰减后的沿用集合 ∪ 新选中（新选中以自身 remain_for 重新计数，同 key 时覆盖沿用项）
pub fn merge_residency(carried: Vec<InsertedSkill>, selected: Vec<Skill>) -> Vec<InsertedSkill> {
    let mut merged: Vec<InsertedSkill> = carried
        .into_iter()
        .filter(|c| !selected.iter().any(|s| s.key == c.skill.key))
        .collect();
    merged.extend(selected.into_iter().map(InsertedSkill::fresh));
    merged
}

/// 计算本轮驻留集合：先衰减沿用，再交给选择器挑新技能
pub async fn next_residency(
    selector: &dyn SkillSelector,
    catalog: &[Skill],
    history: &[Message],
) -> Result<Vec<InsertedSkill>, AgentError> {
    let carried = carry_forward(history);
    let selected = selector.select_skills(catalog, history).await?;
    Ok(merge_residency(carried, selected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::REMAIN_FOREVER;

    #[test]
    fn test_split_by_condition() {
        let (dynamic, persistent) = split_skills(vec![
            Skill::new("always", "a"),
            Skill::new("sometimes", "b").with_when("rarely"),
        ]);
        assert_eq!(dynamic[0].key, "sometimes");
        assert_eq!(persistent[0].key, "always");
    }

    #[test]
    fn test_carry_forward_decays_and_drops() {
        let history = vec![Message::SkillResidency {
            skills: vec![
                InsertedSkill {
                    skill: Skill::new("two", "c"),
                    now_remain_for: 2,
                },
                InsertedSkill {
                    skill: Skill::new("zero", "c"),
                    now_remain_for: 0,
                },
                InsertedSkill::forever(Skill::new("pinned", "c")),
            ],
        }];
        let carried = carry_forward(&history);
        assert_eq!(carried.len(), 2);
        assert_eq!(carried[0].key(), "two");
        assert_eq!(carried[0].now_remain_for, 1);
        assert_eq!(carried[1].now_remain_for, REMAIN_FOREVER);
    }

    #[test]
    fn test_merge_reselection_resets_counter() {
        let carried = vec![InsertedSkill {
            skill: Skill::new("k", "c").with_remain_for(3),
            now_remain_for: 1,
        }];
        let merged = merge_residency(carried, vec![Skill::new("k", "c").with_remain_for(3)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].now_remain_for, 3);
    }
}
