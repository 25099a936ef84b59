// src/views/home.rs
use crate::models::{ApprovalStatus, Capabilities, CapabilityState};

/// What the home screen offers for one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityAction {
    Apply,
    InReview,
    Continue,
    Reapply,
}

impl CapabilityAction {
    /// Button text, or `None` when the capability is waiting on review.
    pub fn label(&self, role: &str) -> Option<String> {
        match self {
            CapabilityAction::Apply => Some(format!("Apply as {role}")),
            CapabilityAction::InReview => None,
            CapabilityAction::Continue => Some(format!("Continue as {role}")),
            CapabilityAction::Reapply => Some(format!("Re-apply as {role}")),
        }
    }

    pub fn status_text(&self) -> Option<&'static str> {
        match self {
            CapabilityAction::Apply => None,
            CapabilityAction::InReview => Some("Application under review"),
            CapabilityAction::Continue => Some("Application approved"),
            CapabilityAction::Reapply => Some("Application rejected"),
        }
    }
}

pub fn capability_action(state: &CapabilityState) -> CapabilityAction {
    if !state.exists {
        return CapabilityAction::Apply;
    }
    match state.approval_status {
        Some(ApprovalStatus::Approved) => CapabilityAction::Continue,
        Some(ApprovalStatus::Rejected) => CapabilityAction::Reapply,
        // Anything else is still with the reviewers
        _ => CapabilityAction::InReview,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeMenu {
    pub rider: bool,
    pub driver: CapabilityAction,
    pub fleet_owner: CapabilityAction,
}

impl HomeMenu {
    pub fn from_capabilities(capabilities: &Capabilities) -> Self {
        Self {
            rider: capabilities.rider,
            driver: capability_action(&capabilities.driver),
            fleet_owner: capability_action(&capabilities.fleet_owner),
        }
    }

    /// Lines as the terminal shows them.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.rider {
            lines.push("Rider: Continue as Rider".to_string());
        }
        for (title, role, action) in [
            ("Driver", "Driver", self.driver),
            ("Fleet owner", "Fleet Owner", self.fleet_owner),
        ] {
            let text = match (action.label(role), action.status_text()) {
                (Some(label), Some(status)) => format!("{label} ({status})"),
                (Some(label), None) => label,
                (None, Some(status)) => status.to_string(),
                (None, None) => continue,
            };
            lines.push(format!("{title}: {text}"));
        }
        lines
    }
}
