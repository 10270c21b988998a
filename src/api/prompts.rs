//! Prompt Construction
//!
//! Natural-language instructions for each generation operation. Cardinality
//! is stated explicitly because the model does not reliably honor the schema
//! alone.

use crate::api::types::{Character, Story};

/// Prompt for `count` story ideas seeded by `idea`
pub fn story_ideas(idea: &str, style: &str, count: usize) -> String {
    format!(
        "Task: create EXACTLY {count} story ideas (NEVER create more than {count} ideas).

Input:
- Seed idea: \"{idea}\"
- Style: \"{style}\"

Output requirements:
For each idea, provide:
- \"title\": the story title (English or the language of the seed idea, as fits)
- \"summary\": a short summary."
    )
}

/// Prompt for the `count` central characters of `story`
pub fn character_details(story: &Story, count: usize, style: &str) -> String {
    format!(
        "Based on the story titled \"{title}\" with the summary \"{summary}\", identify and create the {count} MAIN characters of the story.

**IMPORTANT:** Focus on the central characters. If the story is about creatures such as monsters or animals, those creatures are the characters to create.

For each character, provide a \"name\" and a \"prompt\" (a detailed English description of appearance and personality in the {style} style, for AI image generation).",
        title = story.title,
        summary = story.summary,
    )
}

/// Bulleted `- name: prompt` listing of the cast
pub fn character_listing(characters: &[Character]) -> String {
    characters
        .iter()
        .map(|c| format!("- {}: {}", c.name, c.prompt))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parameters for [`script`]
#[derive(Debug, Clone, Copy)]
pub struct ScriptPrompt<'a> {
    pub story: &'a Story,
    pub characters: &'a [Character],
    pub duration_secs: u32,
    pub scene_count: usize,
    pub narration_language: &'a str,
    pub primary_language: &'a str,
}

/// Prompt for a video script split into `scene_count` scenes
pub fn script(params: ScriptPrompt<'_>) -> String {
    format!(
        "As a screenwriter, write a script for a {duration}-second video.

**Information:**
- Title: {title}
- Summary: {summary}
- Characters:
{characters}

**Requirements:**
1. Write a \"summary\" of the script.
2. Split it into exactly {scenes} \"scenes\".
3. Each scene has: \"id\", \"description\" (in {primary}), \"narration\" (voice-over in {narration}), \"veo_prompt\" (in English, must contain the name of at least one character), \"characters_present\" (list of characters in the scene).",
        duration = params.duration_secs,
        title = params.story.title,
        summary = params.story.summary,
        characters = character_listing(params.characters),
        scenes = params.scene_count,
        primary = params.primary_language,
        narration = params.narration_language,
    )
}
