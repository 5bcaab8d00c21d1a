use anyhow::Result;
use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use serde::Deserialize;

// NOTE:
// Prompt wording lives in lang/<lang>/story_prompts.json and is rendered
// with minijinja. User text is passed as a template variable, so braces
// in a theme or outline are never interpreted.

#[derive(Deserialize)]
struct StoryPromptFile {
    outline: String,
    storyline: String,
    story: String,
}

macro_rules! prompt_file {
    ($lang:literal) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/lang/",
            $lang,
            "/story_prompts.json"
        ))
    };
}

static ZH_PROMPTS: Lazy<StoryPromptFile> = Lazy::new(|| {
    serde_json::from_str(prompt_file!("zh")).expect("invalid story prompt config")
});

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(Environment::new);

/// The three generation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryTask {
    Outline,
    Storyline,
    Story,
}

impl StoryTask {
    /// Key of the generated text in the success body.
    pub fn output_field(self) -> &'static str {
        match self {
            StoryTask::Outline => "outline",
            StoryTask::Storyline => "storyline",
            StoryTask::Story => "story",
        }
    }

    pub fn missing_input_detail(self) -> &'static str {
        match self {
            StoryTask::Outline => "缺少故事主题。",
            StoryTask::Storyline => "缺少故事大纲。",
            StoryTask::Story => "缺少故事大纲或故事线。",
        }
    }

    pub fn failure_detail(self) -> &'static str {
        match self {
            StoryTask::Outline => "无法生成故事大纲。",
            StoryTask::Storyline => "无法生成故事线。",
            StoryTask::Story => "无法生成完整的故事内容。",
        }
    }
}

/// Validated-or-not user input for one task, borrowed from the request body.
#[derive(Debug, Clone, Copy)]
pub enum StoryInput<'a> {
    Outline { theme: &'a str },
    Storyline { outline: &'a str },
    Story { outline: &'a str, storyline: &'a str },
}

impl<'a> StoryInput<'a> {
    pub fn task(&self) -> StoryTask {
        match self {
            StoryInput::Outline { .. } => StoryTask::Outline,
            StoryInput::Storyline { .. } => StoryTask::Storyline,
            StoryInput::Story { .. } => StoryTask::Story,
        }
    }

    /// True when any required field is the empty string.
    pub fn is_incomplete(&self) -> bool {
        match *self {
            StoryInput::Outline { theme } => theme.is_empty(),
            StoryInput::Storyline { outline } => outline.is_empty(),
            StoryInput::Story { outline, storyline } => outline.is_empty() || storyline.is_empty(),
        }
    }

    /// System prompt for the model.
    pub fn prompt(&self) -> Result<String> {
        let prompts = &*ZH_PROMPTS;
        let rendered = match *self {
            StoryInput::Outline { theme } => {
                TEMPLATES.render_str(&prompts.outline, context! { theme => theme })?
            }
            StoryInput::Storyline { outline } => {
                TEMPLATES.render_str(&prompts.storyline, context! { outline => outline })?
            }
            StoryInput::Story { outline, storyline } => TEMPLATES.render_str(
                &prompts.story,
                context! { outline => outline, storyline => storyline },
            )?,
        };
        Ok(rendered)
    }

    /// User message sent alongside the prompt. For full stories this is the
    /// outline and storyline joined without a separator.
    pub fn user_content(&self) -> String {
        match *self {
            StoryInput::Outline { theme } => theme.to_string(),
            StoryInput::Storyline { outline } => outline.to_string(),
            StoryInput::Story { outline, storyline } => format!("{outline}{storyline}"),
        }
    }
}
