//! 静态提示词：系统模板、阶段切换指令
//!
//! 全部是编译期常量，进程内只读。系统模板中的 `{{personality}}` / `{{skills}}`
//! 在编码时以历史折叠出的当前人格与驻留技能替换。

use crate::message::InsertedSkill;

pub const DEFAULT_PERSONALITY: &str = "Your name is CRAIG, a helpful assistant.";

pub const DEFAULT_SYSTEM_TEMPLATE: &str = r#"{{personality}}

You work in two phases every time the user speaks to you.

1. Reason-action phase. You think step by step and may call tools. Every response in this phase
   MUST be a single json object of the form:
   {"reasoning": "<your private thoughts>", "tool_calls": [{"tool_name": "<name>", "tool_args": [{"arg_name": "<name>", "arg_value": <any json>}]}]}
   Tool results are given back to you after each response. When you have everything you need,
   respond with an empty "tool_calls" list.
2. Final answer phase. Your response is shown to the user verbatim, in any format you like.

You will be told when the phase changes. Only use tools that have been announced to you.
{{skills}}"#;

pub const REASON_ACT_INSTRUCTION: &str = "**Mode Change**\nYou are now in reason-action mode. Use the reason-action json format when answering here. The user will not see the following responses.";

pub const ANSWER_USER_INSTRUCTION: &str = "**Mode Change**\nYou are now in final answer mode. Your full response will be shown to the user. You can respond in any format.";

pub const TOOL_RESPONSE_SEPARATOR: &str = "\n==========\n";

/// 渲染系统模板；没有驻留技能时 skills 段为空
pub fn render_system_prompt(
    template: &str,
    personality: &str,
    skills: &[InsertedSkill],
) -> String {
    let skills_block = if skills.is_empty() {
        String::new()
    } else {
        let bodies: Vec<&str> = skills.iter().map(|s| s.skill.content.as_str()).collect();
        format!(
            "\nBelow is some potentially useful information (some of this may not be relevant):\n\n{}\n",
            bodies.join("\n\n")
        )
    };
    template
        .replace("{{personality}}", personality)
        .replace("{{skills}}", &skills_block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Skill;

    #[test]
    fn test_render_without_skills() {
        let out = render_system_prompt("P={{personality}}|{{skills}}|", "Bee", &[]);
        assert_eq!(out, "P=Bee||");
    }

    #[test]
    fn test_render_with_skills() {
        let skills = vec![
            InsertedSkill::fresh(Skill::new("a", "alpha body")),
            InsertedSkill::forever(Skill::new("b", "beta body")),
        ];
        let out = render_system_prompt(DEFAULT_SYSTEM_TEMPLATE, DEFAULT_PERSONALITY, &skills);
        assert!(out.starts_with(DEFAULT_PERSONALITY));
        assert!(out.contains("alpha body\n\nbeta body"));
        assert!(!out.contains("{{"));
    }
}
