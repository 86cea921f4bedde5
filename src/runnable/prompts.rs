use std::any::Any;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::format::{self, FormatError, TemplateFormat};
use super::{Runnable, RunnableRef, insert_metadata, lc_id};
use crate::load::{Kwargs, LoadError};

/// A single string template.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub template: String,
    pub input_variables: Vec<String>,
    pub template_format: TemplateFormat,
    pub metadata: Option<Map<String, Value>>,
}

impl PromptTemplate {
    /// Build a template, inferring its input variables.
    pub fn from_template(
        template: impl Into<String>,
        template_format: TemplateFormat,
    ) -> Result<Self, FormatError> {
        let template = template.into();
        let input_variables = format::input_variables(&template, template_format)?;
        Ok(Self {
            template,
            input_variables,
            template_format,
            metadata: None,
        })
    }

    pub fn format(&self, values: &Map<String, Value>) -> Result<String, FormatError> {
        format::render(&self.template, self.template_format, values)
    }

    pub(crate) fn construct(mut kwargs: Kwargs) -> Result<RunnableRef, LoadError> {
        Ok(Arc::new(Self::from_kwargs(&mut kwargs)?))
    }

    fn from_kwargs(kwargs: &mut Kwargs) -> Result<Self, LoadError> {
        let template = kwargs.required_string("template")?;
        let template_format = template_format(kwargs)?;
        let input_variables = if kwargs.contains("input_variables") {
            kwargs.strings("input_variables")?
        } else {
            format::input_variables(&template, template_format)?
        };

        Ok(Self {
            template,
            input_variables,
            template_format,
            metadata: kwargs.json_map("metadata")?,
        })
    }
}

impl Runnable for PromptTemplate {
    fn lc_id(&self) -> Vec<String> {
        lc_id(&["langchain", "prompts", "prompt", "PromptTemplate"])
    }

    fn lc_kwargs(&self) -> Map<String, Value> {
        let mut kwargs = Map::new();
        kwargs.insert("input_variables".into(), self.input_variables.clone().into());
        kwargs.insert("template".into(), self.template.clone().into());
        kwargs.insert("template_format".into(), self.template_format.as_str().into());
        insert_metadata(&mut kwargs, &self.metadata);
        kwargs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Human,
    System,
    Ai,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::System => "system",
            Self::Ai => "ai",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Human => "HumanMessagePromptTemplate",
            Self::System => "SystemMessagePromptTemplate",
            Self::Ai => "AIMessagePromptTemplate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "human" | "user" => Some(Self::Human),
            "system" => Some(Self::System),
            "ai" | "assistant" => Some(Self::Ai),
            _ => None,
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// One templated message of a chat prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePromptTemplate {
    pub role: MessageRole,
    pub prompt: PromptTemplate,
}

impl MessagePromptTemplate {
    pub(crate) fn construct(role: MessageRole, mut kwargs: Kwargs) -> Result<RunnableRef, LoadError> {
        let prompt = kwargs.required_object("prompt")?;
        let prompt = kwargs.downcast::<PromptTemplate>("prompt", &prompt)?;
        Ok(Arc::new(Self { role, prompt }))
    }
}

impl Runnable for MessagePromptTemplate {
    fn lc_id(&self) -> Vec<String> {
        lc_id(&["langchain", "prompts", "chat", self.role.class_name()])
    }

    fn lc_kwargs(&self) -> Map<String, Value> {
        let mut kwargs = Map::new();
        kwargs.insert("prompt".into(), self.prompt.to_manifest());
        kwargs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Slot filled with a list of messages supplied at format time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagesPlaceholder {
    pub variable_name: String,
    pub optional: bool,
}

impl MessagesPlaceholder {
    pub(crate) fn construct(mut kwargs: Kwargs) -> Result<RunnableRef, LoadError> {
        Ok(Arc::new(Self {
            variable_name: kwargs.required_string("variable_name")?,
            optional: kwargs.bool("optional")?.unwrap_or(false),
        }))
    }

    fn format(&self, values: &Map<String, Value>) -> Result<Vec<ChatMessage>, FormatError> {
        let invalid = || FormatError::InvalidPlaceholder {
            name: self.variable_name.clone(),
        };
        let items = match values.get(&self.variable_name) {
            None | Some(Value::Null) if self.optional => return Ok(Vec::new()),
            None | Some(Value::Null) => {
                return Err(FormatError::MissingVariable {
                    name: self.variable_name.clone(),
                });
            }
            Some(Value::Array(items)) => items,
            Some(_) => return Err(invalid()),
        };

        items
            .iter()
            .map(|item| match item {
                Value::String(content) => Ok(ChatMessage {
                    role: MessageRole::Human.as_str().to_string(),
                    content: content.clone(),
                }),
                Value::Object(obj) => {
                    let role = obj
                        .get("role")
                        .or_else(|| obj.get("type"))
                        .and_then(Value::as_str)
                        .ok_or_else(invalid)?;
                    let content = obj.get("content").and_then(Value::as_str).ok_or_else(invalid)?;
                    Ok(ChatMessage {
                        role: MessageRole::parse(role)
                            .map(|r| r.as_str().to_string())
                            .unwrap_or_else(|| role.to_string()),
                        content: content.to_string(),
                    })
                }
                _ => Err(invalid()),
            })
            .collect()
    }
}

impl Runnable for MessagesPlaceholder {
    fn lc_id(&self) -> Vec<String> {
        lc_id(&["langchain", "prompts", "chat", "MessagesPlaceholder"])
    }

    fn lc_kwargs(&self) -> Map<String, Value> {
        let mut kwargs = Map::new();
        kwargs.insert("variable_name".into(), self.variable_name.clone().into());
        kwargs.insert("optional".into(), self.optional.into());
        kwargs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessageTemplate {
    Message(MessagePromptTemplate),
    Placeholder(MessagesPlaceholder),
}

impl ChatMessageTemplate {
    fn to_manifest(&self) -> Value {
        match self {
            Self::Message(m) => m.to_manifest(),
            Self::Placeholder(p) => p.to_manifest(),
        }
    }

    fn input_variables(&self) -> Vec<String> {
        match self {
            Self::Message(m) => m.prompt.input_variables.clone(),
            Self::Placeholder(p) if p.optional => Vec::new(),
            Self::Placeholder(p) => vec![p.variable_name.clone()],
        }
    }
}

/// A prompt made of a list of message templates.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPromptTemplate {
    pub messages: Vec<ChatMessageTemplate>,
    pub input_variables: Vec<String>,
    pub template_format: TemplateFormat,
    pub metadata: Option<Map<String, Value>>,
}

impl ChatPromptTemplate {
    pub fn from_messages<'a>(
        messages: impl IntoIterator<Item = (MessageRole, &'a str)>,
        template_format: TemplateFormat,
    ) -> Result<Self, FormatError> {
        let messages = messages
            .into_iter()
            .map(|(role, template)| {
                Ok(ChatMessageTemplate::Message(MessagePromptTemplate {
                    role,
                    prompt: PromptTemplate::from_template(template, template_format)?,
                }))
            })
            .collect::<Result<Vec<_>, FormatError>>()?;

        let mut prompt = Self {
            messages,
            input_variables: Vec::new(),
            template_format,
            metadata: None,
        };
        prompt.input_variables = prompt.infer_input_variables();
        Ok(prompt)
    }

    /// Append a messages placeholder.
    pub fn with_placeholder(mut self, variable_name: impl Into<String>, optional: bool) -> Self {
        self.messages
            .push(ChatMessageTemplate::Placeholder(MessagesPlaceholder {
                variable_name: variable_name.into(),
                optional,
            }));
        self.input_variables = self.infer_input_variables();
        self
    }

    pub fn format_messages(&self, values: &Map<String, Value>) -> Result<Vec<ChatMessage>, FormatError> {
        let mut out = Vec::with_capacity(self.messages.len());
        for message in &self.messages {
            match message {
                ChatMessageTemplate::Message(m) => out.push(ChatMessage {
                    role: m.role.as_str().to_string(),
                    content: m.prompt.format(values)?,
                }),
                ChatMessageTemplate::Placeholder(p) => out.extend(p.format(values)?),
            }
        }
        Ok(out)
    }

    pub(crate) fn construct(mut kwargs: Kwargs) -> Result<RunnableRef, LoadError> {
        let messages = kwargs
            .objects("messages")?
            .iter()
            .map(|obj| {
                if let Some(m) = obj.downcast_ref::<MessagePromptTemplate>() {
                    Ok(ChatMessageTemplate::Message(m.clone()))
                } else if let Some(p) = obj.downcast_ref::<MessagesPlaceholder>() {
                    Ok(ChatMessageTemplate::Placeholder(p.clone()))
                } else {
                    Err(LoadError::InvalidField {
                        class: kwargs.class().to_string(),
                        field: "messages".to_string(),
                        expected: "message prompt templates".to_string(),
                        found: obj.class_name(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let template_format = template_format(&mut kwargs)?;
        let mut prompt = Self {
            messages,
            input_variables: Vec::new(),
            template_format,
            metadata: kwargs.json_map("metadata")?,
        };
        prompt.input_variables = if kwargs.contains("input_variables") {
            kwargs.strings("input_variables")?
        } else {
            prompt.infer_input_variables()
        };
        Ok(Arc::new(prompt))
    }

    fn infer_input_variables(&self) -> Vec<String> {
        let mut vars: Vec<String> = Vec::new();
        for var in self.messages.iter().flat_map(ChatMessageTemplate::input_variables) {
            if !vars.contains(&var) {
                vars.push(var);
            }
        }
        vars
    }
}

impl Runnable for ChatPromptTemplate {
    fn lc_id(&self) -> Vec<String> {
        lc_id(&["langchain", "prompts", "chat", "ChatPromptTemplate"])
    }

    fn lc_kwargs(&self) -> Map<String, Value> {
        let mut kwargs = Map::new();
        kwargs.insert("input_variables".into(), self.input_variables.clone().into());
        kwargs.insert(
            "messages".into(),
            Value::Array(self.messages.iter().map(ChatMessageTemplate::to_manifest).collect()),
        );
        kwargs.insert("template_format".into(), self.template_format.as_str().into());
        insert_metadata(&mut kwargs, &self.metadata);
        kwargs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }
}

fn template_format(kwargs: &mut Kwargs) -> Result<TemplateFormat, LoadError> {
    match kwargs.string("template_format")? {
        Some(f) => Ok(TemplateFormat::parse(&f)?),
        None => Ok(TemplateFormat::default()),
    }
}
