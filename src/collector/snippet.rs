use crate::constants::collector::{NEGATIVE_WORDS, POSITIVE_WORDS};
use crate::data::{Sentiment, Snippet, Source};
use crate::random::RandomStream;
use crate::utils::truncate_chars;

const MAX_SNIPPET_CHARS: usize = 140;
const NEUTRAL_WORDS: [&str; 5] = ["mixed", "steady", "measured", "routine", "cautious"];

const NEWS_TEMPLATES: [&str; 3] = [
    "{phrase}: analysts describe {word} momentum",
    "Report on {phrase} draws {word} coverage",
    "Industry brief - {phrase} outlook reads {word}",
];
const SOCIAL_TEMPLATES: [&str; 3] = [
    "Just caught up on {phrase}, feeling {word}",
    "#{tag} thread: {word} takes on {phrase}",
    "Anyone else following {phrase}? Pretty {word} so far",
];
const VIDEO_TEMPLATES: [&str; 3] = [
    "Watch: {phrase} explained ({word} reactions)",
    "Livestream recap on {phrase} - chat was {word}",
    "Deep dive into {phrase}, comments mostly {word}",
];

/// Compose a short display line for one record. Consumes draws from `stream`.
pub(crate) fn compose(
    phrase: &str,
    source: Source,
    sentiment: Sentiment,
    stream: &mut RandomStream,
) -> Snippet {
    let templates = match source {
        Source::News => &NEWS_TEMPLATES,
        Source::Social => &SOCIAL_TEMPLATES,
        Source::Video => &VIDEO_TEMPLATES,
    };
    let words: &[&str] = match sentiment {
        Sentiment::Positive => &POSITIVE_WORDS,
        Sentiment::Negative => &NEGATIVE_WORDS,
        Sentiment::Neutral => &NEUTRAL_WORDS,
    };
    let template = templates[stream.next_index(templates.len())];
    let word = words[stream.next_index(words.len())];
    let tag: String = phrase
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    // Phrase goes in last so placeholder-like text in it stays literal.
    let body = template
        .replace("{word}", word)
        .replace("{tag}", &tag)
        .replace("{phrase}", phrase);
    truncate_chars(&format!("[{source}] {body}"), MAX_SNIPPET_CHARS)
}
