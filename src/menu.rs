use crate::config::VideoSettings;
use crate::overlay::caption_text;
use crate::pipeline::ReelArtifacts;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Zero-based index into the topic list.
    Preset(usize),
    Custom,
    Invalid,
}

/// Maps the user's line to a menu entry; entries are numbered from 1 and
/// the entry after the last topic asks for a custom one.
pub fn parse_choice(input: &str, topic_count: usize) -> MenuChoice {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=topic_count).contains(&n) => MenuChoice::Preset(n - 1),
        Ok(n) if n == topic_count + 1 => MenuChoice::Custom,
        _ => MenuChoice::Invalid,
    }
}

pub fn render_menu(topics: &[&str]) -> String {
    let mut out = String::from("SELECT A TOPIC\n\n");
    for (i, topic) in topics.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, topic));
    }
    out.push_str(&format!("{}. Enter custom topic\n", topics.len() + 1));
    out
}

pub fn banner(os_name: &str) -> String {
    format!(
        "AUTONOMOUS .NET REEL GENERATOR\n  Multi-AI with smart fallback\n  Running on: {}\n",
        os_name
    )
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut len = bytes as f64;
    let mut order = 0;
    while len >= 1024.0 && order < UNITS.len() - 1 {
        order += 1;
        len /= 1024.0;
    }
    let number = format!("{:.2}", len);
    let number = number.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", number, UNITS[order])
}

pub fn success_report(
    reel: &ReelArtifacts,
    video: &VideoSettings,
    output_dir: &Path,
    file_size: Option<u64>,
) -> String {
    let script = &reel.script;
    let mut out = String::new();

    if reel.video.placeholder {
        out.push_str("REEL ASSEMBLY INCOMPLETE - placeholder written\n\n");
    } else {
        out.push_str("REEL GENERATED SUCCESSFULLY & READY TO UPLOAD\n\n");
    }

    out.push_str(&format!("Video Location: {}\n", reel.video.path.display()));
    if let Some(meta) = &reel.metadata {
        out.push_str(&format!("Metadata: {}\n", meta.display()));
    }
    if let Some(srt) = &reel.subtitles {
        out.push_str(&format!("Subtitles: {}\n", srt.display()));
    }

    out.push_str("\nReel Details:\n");
    out.push_str(&format!("   Topic: {}\n", script.topic()));
    out.push_str(&format!("   Script source: {}\n", reel.provider.label()));
    out.push_str(&format!(
        "   Format: MP4 ({} - Instagram Reels)\n",
        video.resolution()
    ));
    out.push_str(&format!(
        "   Duration: ~{} seconds\n",
        script.estimated_duration_secs()
    ));
    out.push_str(&format!("   Script Words: {}\n", script.word_count()));
    for point in script.key_points() {
        out.push_str(&format!("   - {}\n", point));
    }

    out.push_str("\nUPLOAD TO INSTAGRAM:\n");
    out.push_str("   1. Open Instagram app or website\n");
    out.push_str("   2. Create > Reel\n");
    out.push_str(&format!(
        "   3. Upload the MP4 file from: {}\n",
        output_dir.display()
    ));
    out.push_str("   4. Add caption:\n");
    out.push_str(&format!("      \"{}\"\n", caption_text(script.narration())));
    out.push_str(&format!("      {}\n", script.call_to_action()));
    out.push_str("   5. Add hashtags: #DotNet #CSharp #SoftwareDeveloper\n");
    out.push_str("   6. Post!\n");

    if let Some(size) = file_size {
        out.push_str(&format!("\nFile Size: {}\n", format_bytes(size)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_choices_map_to_presets_then_custom() {
        assert_eq!(parse_choice("1", 7), MenuChoice::Preset(0));
        assert_eq!(parse_choice(" 7 \n", 7), MenuChoice::Preset(6));
        assert_eq!(parse_choice("8", 7), MenuChoice::Custom);
        assert_eq!(parse_choice("9", 7), MenuChoice::Invalid);
        assert_eq!(parse_choice("0", 7), MenuChoice::Invalid);
        assert_eq!(parse_choice("docker", 7), MenuChoice::Invalid);
        assert_eq!(parse_choice("", 7), MenuChoice::Invalid);
    }

    #[test]
    fn menu_ends_with_custom_entry() {
        let menu = render_menu(&["A", "B"]);
        assert!(menu.contains("1. A\n2. B\n3. Enter custom topic\n"));
    }

    #[test]
    fn bytes_use_binary_units_and_trim_zeros() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 1024 * 300), "5.29 MB");
    }
}
