use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use prompthub::hub::{self, NamedModelClass, PullOptions};
use prompthub::model::PromptCommit;
use prompthub::runnable::{
    ChatMessageTemplate, ChatModel, ChatPromptTemplate, PromptTemplate, Runnable,
    RunnableSequence,
};

use crate::cli::{Overrides, connect};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    config_dir: Option<&Path>,
    overrides: &Overrides,
    prompt: String,
    include_model: bool,
    model_class: Option<String>,
    secrets: Vec<(String, String)>,
    json: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let model_class = match model_class {
        Some(name) => Some(Arc::new(NamedModelClass::new(name)?) as Arc<dyn hub::ModelClass>),
        None => None,
    };
    let options = PullOptions {
        include_model,
        model_class,
        secrets: secrets.into_iter().collect(),
        ..Default::default()
    };

    let client = connect(config_dir, overrides)?;
    let commit = hub::pull_manifest(&client, &prompt, include_model)
        .await
        .with_context(|| format!("failed to pull '{prompt}'"))?;
    let runnable = hub::load_commit(&commit, &options)?;

    if let Some(path) = &output {
        let text = serde_json::to_string_pretty(&commit.manifest)?;
        std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote manifest");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&commit.manifest)?);
    } else if output.is_none() {
        print_summary(&commit, runnable.as_ref());
    }
    Ok(())
}

fn print_summary(commit: &PromptCommit, runnable: &dyn Runnable) {
    println!("Prompt:    {}/{}", commit.owner, commit.repo);
    println!("Commit:    {}", commit.commit_hash);
    println!("Type:      {}", runnable.class_name());

    if let Some(prompt) = runnable.downcast_ref::<RunnableSequence>() {
        if let Some(chat) = prompt.find::<ChatPromptTemplate>() {
            print_chat(chat);
        } else if let Some(template) = prompt.find::<PromptTemplate>() {
            print_template(template);
        }
        if let Some(model) = prompt.find::<ChatModel>() {
            print_model(model);
        }
    } else if let Some(chat) = runnable.downcast_ref::<ChatPromptTemplate>() {
        print_chat(chat);
    } else if let Some(template) = runnable.downcast_ref::<PromptTemplate>() {
        print_template(template);
    } else if let Some(model) = runnable.downcast_ref::<ChatModel>() {
        print_model(model);
    }
}

fn print_template(template: &PromptTemplate) {
    println!("Format:    {}", template.template_format);
    print_variables(&template.input_variables);
    println!("Template:");
    println!("  {}", template.template);
}

fn print_chat(chat: &ChatPromptTemplate) {
    println!("Format:    {}", chat.template_format);
    print_variables(&chat.input_variables);
    println!("Messages:");
    for message in &chat.messages {
        match message {
            ChatMessageTemplate::Message(m) => {
                println!("  - {}: {}", m.role.as_str(), m.prompt.template)
            }
            ChatMessageTemplate::Placeholder(p) if p.optional => {
                println!("  - placeholder: {{{}}} (optional)", p.variable_name)
            }
            ChatMessageTemplate::Placeholder(p) => {
                println!("  - placeholder: {{{}}}", p.variable_name)
            }
        }
    }
}

fn print_variables(vars: &[String]) {
    if vars.is_empty() {
        println!("Variables: (none)");
    } else {
        println!("Variables: {}", vars.join(", "));
    }
}

fn print_model(model: &ChatModel) {
    match model.model_name() {
        Some(name) => println!("Model:     {} ({name})", model.class_name()),
        None => println!("Model:     {}", model.class_name()),
    }
}
