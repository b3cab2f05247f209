use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, ensure};
use bttrfly_card::{CardParams, MAX_TEXTURE_SIDE};
use clap::Parser;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(about = "Floating product card and virtual monitor viewer", version)]
pub struct Args {
    /// Card preset JSON (dimensions, buttons, markdown or markdown_path, texture size)
    #[arg(long)]
    pub card_preset: Option<PathBuf>,

    /// Regular TTF/OTF face used for the markdown texture
    #[arg(long)]
    pub font_regular: Option<PathBuf>,

    /// Bold face; falls back to the regular face when absent
    #[arg(long)]
    pub font_bold: Option<PathBuf>,

    /// Italic face; falls back to the regular face when absent
    #[arg(long)]
    pub font_italic: Option<PathBuf>,

    /// When set, write the rendered markdown texture to disk (PNG)
    #[arg(long)]
    pub dump_texture: Option<PathBuf>,

    /// Run the virtual monitor through a scripted session and print its timeline
    #[arg(long)]
    pub monitor_demo: bool,

    /// When set, write the monitor demo event log as JSON
    #[arg(long, requires = "monitor_demo")]
    pub monitor_log_json: Option<PathBuf>,

    /// Local hour (0-23) used to pick the demo greeting instead of the wall clock
    #[arg(long)]
    pub greeting_hour: Option<u32>,

    /// Seed for the demo greeting pick
    #[arg(long, default_value_t = 0)]
    pub greeting_seed: u64,

    /// Sound clip played when the lock screen is clicked
    #[arg(long)]
    pub unlock_sound: Option<PathBuf>,

    /// Skip creating a winit window/event loop; useful for headless automation
    #[arg(long)]
    pub headless: bool,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if let Some(hour) = self.greeting_hour {
            ensure!(hour < 24, "greeting hour must be between 0 and 23 (got {hour})");
        }
        ensure!(
            self.font_regular.is_some() || (self.font_bold.is_none() && self.font_italic.is_none()),
            "--font-bold/--font-italic require --font-regular"
        );
        Ok(())
    }
}

/// On-disk card preset. Card fields sit at the top level; `markdown_path`
/// replaces the inline markdown and resolves relative to the preset file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CardPreset {
    #[serde(flatten)]
    pub card: CardParams,
    #[serde(default)]
    pub markdown_path: Option<PathBuf>,
}

pub fn load_card_preset(path: &Path) -> Result<CardParams> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading card preset {}", path.display()))?;
    let preset: CardPreset = serde_json::from_str(&data)
        .with_context(|| format!("parsing card preset {}", path.display()))?;

    let mut card = preset.card;
    if let Some(markdown_path) = preset.markdown_path {
        let resolved = match path.parent() {
            Some(dir) if markdown_path.is_relative() => dir.join(&markdown_path),
            _ => markdown_path,
        };
        card.markdown = fs::read_to_string(&resolved)
            .with_context(|| format!("reading card markdown {}", resolved.display()))?;
    }

    ensure!(
        card.width > 0.0 && card.height > 0.0,
        "card preset {} has non-positive dimensions",
        path.display()
    );
    ensure!(
        card.texture_width > 0 && card.texture_height > 0,
        "card preset {} has an empty texture size",
        path.display()
    );
    ensure!(
        card.texture_width <= MAX_TEXTURE_SIDE && card.texture_height <= MAX_TEXTURE_SIDE,
        "card preset {} texture {}x{} exceeds {MAX_TEXTURE_SIDE} per side",
        path.display(),
        card.texture_width,
        card.texture_height
    );
    Ok(card)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_reads_markdown_relative_to_itself() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("guide.md"), "# Hello\n- [x] Done").expect("write markdown");
        let preset = dir.path().join("card.json");
        fs::write(
            &preset,
            r#"{ "width": 3.0, "show_mac_buttons": false, "markdown_path": "guide.md" }"#,
        )
        .expect("write preset");

        let card = load_card_preset(&preset).expect("load preset");
        assert_eq!(card.width, 3.0);
        assert_eq!(card.height, 4.5);
        assert!(!card.show_mac_buttons);
        assert_eq!(card.markdown, "# Hello\n- [x] Done");
    }

    #[test]
    fn preset_rejects_degenerate_cards() {
        let dir = tempfile::tempdir().expect("tempdir");
        let preset = dir.path().join("card.json");
        fs::write(&preset, r#"{ "height": 0 }"#).expect("write preset");
        assert!(load_card_preset(&preset).is_err());
    }

    #[test]
    fn preset_rejects_oversized_textures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let preset = dir.path().join("card.json");
        fs::write(&preset, r#"{ "texture_width": 20000, "texture_height": 20000 }"#)
            .expect("write preset");
        let err = load_card_preset(&preset).expect_err("oversized texture accepted");
        assert!(err.to_string().contains("exceeds"), "{err}");

        fs::write(&preset, r#"{ "texture_width": 4096, "texture_height": 4096 }"#)
            .expect("write preset");
        assert!(load_card_preset(&preset).is_ok());
    }

    #[test]
    fn greeting_hour_is_validated() {
        let args = Args::parse_from(["bttrfly_viewer", "--greeting-hour", "24"]);
        assert!(args.validate().is_err());
        let args = Args::parse_from(["bttrfly_viewer", "--monitor-demo", "--greeting-hour", "7"]);
        assert!(args.validate().is_ok());
    }
}
