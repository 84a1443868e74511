//! Classification of entry media links for embedding.

use serde::Serialize;

/// How a media link is rendered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedKind {
    #[default]
    None,
    YouTube,
    Video,
    Iframe,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EmbedInfo {
    pub kind: EmbedKind,
    /// Embeddable URL; `None` when there is nothing to show.
    pub url: Option<String>,
}

const VIDEO_EXTENSIONS: [&str; 4] = [".mp4", ".webm", ".ogg", ".mov"];

impl EmbedInfo {
    fn new(kind: EmbedKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: Some(url.into()),
        }
    }

    /// Classify a link. YouTube watch and short links are rewritten to the `/embed/` form;
    /// direct video files are played as-is; anything else falls back to an iframe.
    pub fn from_link(link: Option<&str>) -> Self {
        let link = match link.map(str::trim) {
            Some(l) if !l.is_empty() => l,
            _ => return Self::default(),
        };

        if link.contains("youtube.com/embed/") {
            return Self::new(EmbedKind::YouTube, link);
        }
        if let Some(video_id) = youtube_video_id(link) {
            return Self::new(
                EmbedKind::YouTube,
                format!("https://www.youtube.com/embed/{video_id}"),
            );
        }

        let lower = link.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return Self::new(EmbedKind::Video, link);
        }

        Self::new(EmbedKind::Iframe, link)
    }
}

/// Video id from `youtube.com/watch?v=ID&...` or `youtu.be/ID?...`.
fn youtube_video_id(link: &str) -> Option<&str> {
    let (rest, terminator) = if let Some((_, rest)) = link.split_once("youtube.com/watch?v=") {
        (rest, '&')
    } else if let Some((_, rest)) = link.split_once("youtu.be/") {
        (rest, '?')
    } else {
        return None;
    };
    let id = rest.split(terminator).next().unwrap_or_default();
    (!id.is_empty()).then_some(id)
}
