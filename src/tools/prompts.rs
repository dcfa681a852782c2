use serde_json::{json, Value};

/// Static prompt template served through `prompts/list` and `prompts/get`.
#[derive(Debug, Clone, Copy)]
pub struct Prompt {
    pub name: &'static str,
    pub description: &'static str,
    pub argument_hint: &'static str,
    pub content: &'static str,
}

pub static PROMPTS: &[Prompt] = &[
    Prompt {
        name: "pitch",
        description: "Create a compelling 60-second elevator pitch based on your validated business model and required artifacts",
        argument_hint: "User input arguments for the pitch",
        content: include_str!("prompts/pitch.md"),
    },
    Prompt {
        name: "business_plan",
        description: "Create a comprehensive business plan for your startup",
        argument_hint: "User input arguments for the business plan",
        content: include_str!("prompts/business_plan.md"),
    },
];

pub fn find(name: &str) -> Option<&'static Prompt> {
    PROMPTS.iter().find(|p| p.name == name)
}

impl Prompt {
    fn listing(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "arguments": [{
                "name": "arguments",
                "description": self.argument_hint,
                "required": false,
            }],
        })
    }

    /// `prompts/get` result body.
    pub fn messages(&self) -> Value {
        json!({
            "description": self.description,
            "messages": [{
                "role": "user",
                "content": { "type": "text", "text": self.content },
            }],
        })
    }
}

/// `prompts/list` result body.
pub fn list_json() -> Value {
    let prompts: Vec<Value> = PROMPTS.iter().map(Prompt::listing).collect();
    json!({ "prompts": prompts })
}
