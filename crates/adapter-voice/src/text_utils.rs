//! Text chunking for length-limited TTS endpoints.
//!
//! Lengths are counted in characters, not bytes, because the endpoint limit
//! is a character limit and replies are often non-ASCII.

/// Split text into chunks of at most `max_chars` characters.
///
/// Splits at sentence boundaries (`.`, `!`, `?` followed by whitespace),
/// merging short sentences up to the limit. Sentences that are still too
/// long are split at clause punctuation, then at word boundaries, and a
/// single word longer than the limit is cut.
#[must_use]
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }

    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        let sentence_len = char_len(&sentence);

        if !current.is_empty() && char_len(&current) + 1 + sentence_len > max_chars {
            chunks.push(std::mem::take(&mut current));
        }

        if sentence_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(split_long_sentence(&sentence, max_chars));
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

// ── Internal helpers ───────────────────────────────────────────────

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|next| next.is_whitespace()) {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}

/// Split an overly long sentence at clause punctuation.
fn split_long_sentence(sentence: &str, max_chars: usize) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut current = String::new();

    for part in sentence.split_inclusive(&[',', ';', ':', '—', '–'][..]) {
        if !current.is_empty() && char_len(&current) + char_len(part) > max_chars {
            clauses.push(std::mem::take(&mut current).trim().to_string());
        }
        current.push_str(part);
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        clauses.push(trimmed.to_string());
    }

    clauses
        .into_iter()
        .filter(|c| !c.is_empty())
        .flat_map(|clause| {
            if char_len(&clause) > max_chars {
                hard_split(&clause, max_chars)
            } else {
                vec![clause]
            }
        })
        .collect()
}

/// Last-resort split at word boundaries, cutting words that cannot fit.
fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = char_len(word);
        if !current.is_empty() && char_len(&current) + 1 + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
        }

        if word_len > max_chars {
            let letters: Vec<char> = word.chars().collect();
            let mut pieces = letters.chunks(max_chars).map(|p| p.iter().collect::<String>());
            // All but the last piece are full; the last may share a chunk with what follows.
            let last = pieces.next_back().unwrap_or_default();
            chunks.extend(pieces);
            current = last;
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
