//! Desktop actions and their shell-command dispatch.

use async_trait::async_trait;

/// An OS-level action produced by the gesture controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    PrevDesktop,
    NextDesktop,
    MissionControl,
    /// Move the cursor; coordinates are normalized to `[0, 1]`.
    MoveCursor { x: f32, y: f32 },
    LeftClick,
    /// The controller switched between gesture and pointer mode.
    ToggleMode,
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Unparseable command template: {0}")]
    BadTemplate(String),
    #[error("Failed to spawn automation command: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Sink for gesture actions.
#[async_trait]
pub trait DesktopControl: Send + Sync {
    async fn perform(&self, action: GestureAction) -> Result<(), ActionError>;
}

/// Shell command templates for each action.
///
/// `{x}` and `{y}` in the cursor template are replaced with pixel
/// coordinates. Defaults target macOS (osascript + cliclick); overriding
/// the templates retargets xdotool or anything else on `$PATH`.
#[derive(Debug, Clone)]
pub struct CommandTemplates {
    pub prev_desktop: String,
    pub next_desktop: String,
    pub mission_control: String,
    pub move_cursor: String,
    pub left_click: String,
}

impl Default for CommandTemplates {
    fn default() -> Self {
        Self {
            prev_desktop:
                r#"osascript -e 'tell application "System Events" to key code 123 using control down'"#
                    .to_owned(),
            next_desktop:
                r#"osascript -e 'tell application "System Events" to key code 124 using control down'"#
                    .to_owned(),
            mission_control:
                r#"osascript -e 'tell application "System Events" to key code 126 using control down'"#
                    .to_owned(),
            move_cursor: "cliclick m:{x},{y}".to_owned(),
            left_click: "cliclick c:.".to_owned(),
        }
    }
}

/// Dispatches actions by spawning OS automation commands.
pub struct ShellControl {
    templates: CommandTemplates,
    screen_width: u32,
    screen_height: u32,
}

impl ShellControl {
    #[must_use]
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            templates: CommandTemplates::default(),
            screen_width,
            screen_height,
        }
    }

    #[must_use]
    pub fn with_templates(mut self, templates: CommandTemplates) -> Self {
        self.templates = templates;
        self
    }

    fn command_for(&self, action: GestureAction) -> Option<String> {
        match action {
            GestureAction::PrevDesktop => Some(self.templates.prev_desktop.clone()),
            GestureAction::NextDesktop => Some(self.templates.next_desktop.clone()),
            GestureAction::MissionControl => Some(self.templates.mission_control.clone()),
            GestureAction::LeftClick => Some(self.templates.left_click.clone()),
            GestureAction::MoveCursor { x, y } => {
                // x = 1.0 must land on the last addressable pixel, not one
                // past it.
                #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let px = ((x.clamp(0.0, 1.0) * self.screen_width as f32) as u32)
                    .min(self.screen_width.saturating_sub(1));
                #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let py = ((y.clamp(0.0, 1.0) * self.screen_height as f32) as u32)
                    .min(self.screen_height.saturating_sub(1));
                Some(
                    self.templates
                        .move_cursor
                        .replace("{x}", &px.to_string())
                        .replace("{y}", &py.to_string()),
                )
            }
            GestureAction::ToggleMode => None,
        }
    }
}

#[async_trait]
impl DesktopControl for ShellControl {
    async fn perform(&self, action: GestureAction) -> Result<(), ActionError> {
        let Some(command) = self.command_for(action) else {
            return Ok(());
        };
        let parts =
            shlex::split(&command).ok_or_else(|| ActionError::BadTemplate(command.clone()))?;
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| ActionError::BadTemplate(command.clone()))?;

        tracing::debug!(%command, "Dispatching desktop action");
        let mut child = tokio::process::Command::new(program).args(args).spawn()?;
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::warn!(%status, "Automation command failed");
                }
                Err(e) => tracing::warn!("Automation command lost: {e}"),
                Ok(_) => {}
            }
        });
        Ok(())
    }
}
