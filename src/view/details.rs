//! Details panel contents for the selected task
//!
//! Built read-only from the selected [`Task`] each time the panel is
//! populated. The auxiliary content (an embedded video or a plain web page
//! link) is derived from the title and notes and never written back.

use crate::models::{Task, TaskKey};
use crate::utils::format_local;
use crate::view::rows::format_active_date;
use chrono_tz::Tz;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AuxContent {
    Video { video_id: String, url: String },
    WebPage { url: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsView {
    pub key: TaskKey,
    pub title: String,
    pub task_list_name: String,
    pub updated: String,
    pub date_label: &'static str,
    pub active_date: Option<String>,
    pub notes: Option<String>,
    pub web_view_link: Option<String>,
    pub priority: String,
    pub can_complete: bool,
    pub can_delete: bool,
    pub can_open_link: bool,
    pub aux: Option<AuxContent>,
}

impl DetailsView {
    pub fn from_task(task: &Task, tz: &Tz) -> Self {
        let combined = format!("{} {}", task.title, task.notes.as_deref().unwrap_or(""));
        Self {
            key: task.key(),
            title: task.title.clone(),
            task_list_name: task.task_list_name.clone(),
            updated: format_local(task.updated, tz),
            date_label: task.active_date_label(),
            active_date: format_active_date(task, tz),
            notes: task.notes.clone(),
            web_view_link: task.web_view_link.clone(),
            priority: task.priority.clone(),
            can_complete: !task.is_completed(),
            can_delete: true,
            can_open_link: task.web_view_link.is_some(),
            aux: detect_aux_content(&combined),
        }
    }
}

fn video_regex() -> &'static Regex {
    static VIDEO_REGEX: OnceLock<Regex> = OnceLock::new();
    VIDEO_REGEX.get_or_init(|| {
        Regex::new(
            r"(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:\S*?&)?v=|embed/|v/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})",
        )
        .expect("Valid regex pattern")
    })
}

fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| Regex::new(r"https?://\S+").expect("Valid regex pattern"))
}

/// Extract an 11-character YouTube video id from free text
pub fn extract_video_id(text: &str) -> Option<String> {
    video_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First http(s) link in the text, unless it points at a video host
pub fn first_web_link(text: &str) -> Option<String> {
    let link = url_regex().find(text)?.as_str();
    if link.contains("youtube.com") || link.contains("youtu.be") {
        None
    } else {
        Some(link.to_string())
    }
}

pub fn detect_aux_content(text: &str) -> Option<AuxContent> {
    if let Some(video_id) = extract_video_id(text) {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        return Some(AuxContent::Video { video_id, url });
    }
    first_web_link(text).map(|url| AuxContent::WebPage { url })
}
