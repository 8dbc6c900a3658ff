use crate::script::Script;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub const SUBTITLE_CHARS: usize = 100;
pub const CAPTION_CHARS: usize = 150;

const NARRATION_LEAD_SECS: u32 = 2;

/// Character-count truncation; cuts mid-word.
fn head_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Subtitle line: double quotes become single quotes, then the first 100
/// characters.
pub fn subtitle_text(narration: &str) -> String {
    head_chars(&narration.replace('"', "'"), SUBTITLE_CHARS)
}

/// Caption for the post: one line, first 150 characters.
pub fn caption_text(narration: &str) -> String {
    let flat = narration.replace("\r\n", " ").replace('\n', " ");
    head_chars(&flat, CAPTION_CHARS)
}

fn seconds_to_srt(secs: u32) -> String {
    format!(
        "{:02}:{:02}:{:02},000",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Two cues: the call-to-action for the whole reel, and the narration
/// excerpt inset by two seconds on each side.
pub fn render_srt(script: &Script, duration_secs: u32) -> String {
    let lead = NARRATION_LEAD_SECS.min(duration_secs / 2);
    format!(
        "1\n{} --> {}\n{}\n\n2\n{} --> {}\n{}\n",
        seconds_to_srt(0),
        seconds_to_srt(duration_secs),
        script.call_to_action(),
        seconds_to_srt(lead),
        seconds_to_srt(duration_secs - lead),
        subtitle_text(script.narration()),
    )
}

pub async fn write_overlay(script: &Script, duration_secs: u32, out_srt: &Path) -> Result<()> {
    let mut out = fs::File::create(out_srt)
        .await
        .with_context(|| format!("create overlay: {}", out_srt.display()))?;
    out.write_all(render_srt(script, duration_secs).as_bytes())
        .await?;
    out.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtitle_swaps_quotes_and_cuts_at_hundred_chars() {
        let narration = format!("Say \"hello\" {}", "x".repeat(200));
        let sub = subtitle_text(&narration);
        assert!(sub.starts_with("Say 'hello' "));
        assert_eq!(sub.chars().count(), SUBTITLE_CHARS);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let narration = "é".repeat(120);
        assert_eq!(subtitle_text(&narration).chars().count(), 100);
        assert_eq!(caption_text(&narration).chars().count(), 120);
    }

    #[test]
    fn caption_flattens_newlines() {
        assert_eq!(caption_text("line one\nline two\r\nthree"), "line one line two three");
    }

    #[test]
    fn srt_has_two_timed_cues() {
        let script =
            Script::build("Records", "Records give you value equality for free.").unwrap();
        let srt = render_srt(&script, 30);
        let expected = "1\n00:00:00,000 --> 00:00:30,000\nFollow for more Records tips daily! 👍\n\n\
                        2\n00:00:02,000 --> 00:00:28,000\nRecords give you value equality for free.\n";
        assert_eq!(srt, expected);
    }

    #[tokio::test]
    async fn overlay_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.srt");
        let script = Script::build("Spans", "Spans slice without copying.").unwrap();
        write_overlay(&script, 30, &path).await.unwrap();
        let body = fs::read_to_string(&path).await.unwrap();
        assert!(body.contains("00:00:02,000 --> 00:00:28,000"));
    }
}
