//! Headless presentation: звук и уведомления уходят в лог.

use bevy::prelude::*;

use super::{AudioService, NotificationService};

pub struct ConsoleAudio;

impl AudioService for ConsoleAudio {
    fn play_one_shot(&self, clips: &[String], origin: &Transform, volume: f32) {
        let Some(clip) = clips.first() else {
            return;
        };
        crate::log(&format!(
            "🔊 {} (of {}) at {:?}, volume {:.2}",
            clip,
            clips.len(),
            origin.translation,
            volume
        ));
    }
}

pub struct ConsoleNotifications;

impl NotificationService for ConsoleNotifications {
    fn show(&self, message: &str, duration: f32) {
        crate::log_info(&format!("💬 {} ({:.1}s)", message, duration));
    }
}
