//! Contact detection between agents
//!
//! Contacts are circle overlaps on the ground plane. Height is ignored so a
//! bobbing pursuer in the house still sits where its shadow is.

use glam::Vec3;

use super::pursuer::PursuerState;
use super::sdf::{ground, sd_circle};

/// Result of a pursuer touching the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Pursuer is not dangerous and not edible
    None,
    /// A chasing or scattering pursuer caught the player
    PlayerCaught,
    /// A frightened pursuer was caught by the player
    PursuerEaten,
}

/// Two agents overlap if `b` lies inside the circle of radius `reach` around `a`
#[inline]
pub fn touching(a: Vec3, b: Vec3, reach: f32) -> bool {
    sd_circle(ground(b), ground(a), reach) <= 0.0
}

/// What a contact means for a pursuer in `state`
pub fn classify_contact(state: PursuerState) -> Contact {
    match state {
        PursuerState::Chase | PursuerState::Scatter => Contact::PlayerCaught,
        PursuerState::Frightened => Contact::PursuerEaten,
        PursuerState::InHouse | PursuerState::ExitingHouse | PursuerState::Eaten => Contact::None,
    }
}
