//! Prompt templates sent to the model.

use solace_types::models::{ChatContext, RECOMMENDATION_COUNT};

/// Safety classification for a community post or comment. For comments the
/// parent post is passed as `context` so replies are judged in thread.
pub fn classification(content: &str, context: Option<&str>) -> String {
    let context_block = match context {
        Some(parent) => format!("The text is a reply to this post:\n\"\"\"\n{parent}\n\"\"\"\n\n"),
        None => String::new(),
    };

    format!(
        "You are the safety reviewer for a peer-support mental wellness community.\n\
         Classify the user's text into exactly one category:\n\
         - urgent_risk: the writer expresses intent or plans of self-harm or suicide, or is in immediate danger.\n\
         - harmful_instruction: the text gives or requests instructions for self-harm, suicide, \
         disordered eating, or harming others.\n\
         - support_needed: the writer is struggling and would benefit from encouragement, \
         but there is no immediate danger.\n\
         - safe: anything else.\n\n\
         {context_block}\
         Text to classify:\n\"\"\"\n{content}\n\"\"\"\n\n\
         Reply with JSON only, no prose: {{\"category\": \"<category>\", \"reason\": \"<one short sentence>\"}}"
    )
}

/// Short empathetic note shown before the author decides to post anyway.
pub fn support_message(content: &str) -> String {
    format!(
        "Someone is about to share the following in a peer-support community:\n\
         \"\"\"\n{content}\n\"\"\"\n\n\
         Write two or three warm, non-judgmental sentences addressed to them. Acknowledge how \
         they feel, remind them they are not alone, and gently suggest reaching out to someone \
         they trust. Do not give medical advice. Reply with the message only."
    )
}

/// Mood score for a diary page, from plain text.
pub fn sentiment(text: &str) -> String {
    format!(
        "Read this diary entry and rate the writer's overall mood from 1 (very low) to 10 \
         (very positive).\n\"\"\"\n{text}\n\"\"\"\n\n\
         Reply with JSON only: {{\"score\": <integer 1-10>, \"analysis\": \"<one or two gentle sentences>\"}}"
    )
}

/// Roll the running emotional summary forward with a new entry and
/// regenerate the recommendation list.
pub fn summary_update(previous_summary: Option<&str>, entry_text: &str, mood_score: Option<u8>) -> String {
    let previous = previous_summary.unwrap_or("No history yet.");
    let mood = mood_score
        .map(|s| format!("{s}/10"))
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "You maintain a short private summary of a journaling user's emotional history.\n\n\
         Current summary:\n\"\"\"\n{previous}\n\"\"\"\n\n\
         New diary entry (mood {mood}):\n\"\"\"\n{entry_text}\n\"\"\"\n\n\
         Update the summary in at most five sentences, keeping older patterns that still matter. \
         Then suggest exactly {RECOMMENDATION_COUNT} small, practical wellbeing activities tailored to them.\n\
         Reply with JSON only: {{\"summary\": \"...\", \"recommendations\": [\"...\"]}}"
    )
}

/// One chat turn. `history` holds earlier (user, assistant) pairs, oldest first.
pub fn chat(context: &ChatContext, history: &[(String, String)], message: &str) -> String {
    let mut prompt = String::from(
        "You are a supportive wellness companion. Be warm, concise and practical. You are not a \
         therapist; if the user mentions being in danger, encourage them to contact local \
         emergency services or a crisis line.\n\n",
    );

    if let Some(name) = &context.display_name {
        prompt.push_str(&format!("The user's name is {name}.\n"));
    }
    if !context.recent_moods.is_empty() {
        let moods: Vec<String> = context.recent_moods.iter().map(u8::to_string).collect();
        prompt.push_str(&format!("Recent mood scores (1-10, newest last): {}.\n", moods.join(", ")));
    }
    if let Some(summary) = &context.summary {
        prompt.push_str(&format!("What you know about them: {summary}\n"));
    }

    if !history.is_empty() {
        prompt.push_str("\nConversation so far:\n");
        for (user, assistant) in history {
            prompt.push_str(&format!("User: {user}\nCompanion: {assistant}\n"));
        }
    }

    prompt.push_str(&format!("\nUser: {message}\nCompanion:"));
    prompt
}
